use crate::Bid;

/// The three actions a page can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Toggle,
    Upvote,
    Downvote,
}

impl ActionKind {
    /// Whether a successful response should make the page reload.
    pub fn reloads_on_success(self) -> bool {
        matches!(self, ActionKind::Upvote | ActionKind::Downvote)
    }

    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Toggle => "toggle",
            ActionKind::Upvote => "upvote",
            ActionKind::Downvote => "downvote",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single user action, ready to be turned into a POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRequest {
    /// Checkbox flipped: enable or disable a module for the current user.
    Toggle { bid: Bid, enable: bool },
    Upvote { bid: Bid },
    Downvote { bid: Bid },
}

impl ActionRequest {
    pub fn toggle(bid: impl Into<Bid>, enable: bool) -> Self {
        Self::Toggle { bid: bid.into(), enable }
    }

    pub fn upvote(bid: impl Into<Bid>) -> Self {
        Self::Upvote { bid: bid.into() }
    }

    pub fn downvote(bid: impl Into<Bid>) -> Self {
        Self::Downvote { bid: bid.into() }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Toggle { .. } => ActionKind::Toggle,
            Self::Upvote { .. } => ActionKind::Upvote,
            Self::Downvote { .. } => ActionKind::Downvote,
        }
    }

    pub fn bid(&self) -> &Bid {
        match self {
            Self::Toggle { bid, .. } | Self::Upvote { bid } | Self::Downvote { bid } => bid,
        }
    }

    /// Form fields in the order they are sent.
    ///
    /// The enable flag goes over the wire as `1`/`0`, not `true`/`false`.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Toggle { bid, enable } => vec![
                ("bid", bid.to_string()),
                ("enable", if *enable { "1" } else { "0" }.to_string()),
            ],
            Self::Upvote { bid } | Self::Downvote { bid } => vec![("bid", bid.to_string())],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_fields_encode_flag_as_digit() {
        let on = ActionRequest::toggle("42", true);
        assert_eq!(
            on.form_fields(),
            vec![("bid", "42".to_string()), ("enable", "1".to_string())]
        );
        let off = ActionRequest::toggle("42", false);
        assert_eq!(off.form_fields()[1], ("enable", "0".to_string()));
    }

    #[test]
    fn votes_only_carry_bid() {
        assert_eq!(
            ActionRequest::upvote("7").form_fields(),
            vec![("bid", "7".to_string())]
        );
        assert_eq!(
            ActionRequest::downvote("7").form_fields(),
            vec![("bid", "7".to_string())]
        );
    }

    #[test]
    fn only_votes_reload() {
        assert!(!ActionKind::Toggle.reloads_on_success());
        assert!(ActionKind::Upvote.reloads_on_success());
        assert!(ActionKind::Downvote.reloads_on_success());
    }

    #[test]
    fn kind_and_bid_accessors() {
        let req = ActionRequest::downvote(9u64);
        assert_eq!(req.kind(), ActionKind::Downvote);
        assert_eq!(req.bid().as_str(), "9");
    }
}
