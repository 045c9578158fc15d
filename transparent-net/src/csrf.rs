//! CSRF token lookup and method classification.

use percent_encoding::percent_decode_str;

/// Methods that never carry the CSRF header.
const SAFE_METHODS: [&str; 4] = ["GET", "HEAD", "OPTIONS", "TRACE"];

/// Look up `name` in a `document.cookie` style string.
///
/// Entries are `;`-separated and may carry surrounding whitespace. The first
/// entry that starts with `name=` wins; its value is percent-decoded.
pub fn get_cookie(cookies: &str, name: &str) -> Option<String> {
    if cookies.is_empty() {
        return None;
    }
    cookies.split(';').find_map(|entry| {
        entry
            .trim()
            .strip_prefix(name)
            .and_then(|rest| rest.strip_prefix('='))
            .map(|raw| percent_decode_str(raw).decode_utf8_lossy().into_owned())
    })
}

/// True for methods that do not need CSRF protection.
///
/// Matching is exact: `get` is not safe.
pub fn is_safe_method(method: &str) -> bool {
    SAFE_METHODS.contains(&method)
}

/// Token read from the cookie store. Never empty.
#[derive(Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Read the token from a cookie string.
    pub fn from_cookies(cookies: &str, cookie_name: &str) -> Option<Self> {
        get_cookie(cookies, cookie_name).and_then(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CsrfToken({} chars)", self.0.len())
    }
}
