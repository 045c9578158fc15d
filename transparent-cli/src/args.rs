//! Command-line parsing.

use std::path::PathBuf;

use transparent_types::ActionRequest;

pub const USAGE: &str = "\
usage: transparent [--verbose] [--config PATH] [--page URL] [--cookie STRING]
                   toggle BID on|off | upvote BID | downvote BID";

#[derive(Debug, Default, PartialEq)]
pub struct Args {
    pub verbose: bool,
    pub config: Option<PathBuf>,
    pub page: Option<String>,
    pub cookie: Option<String>,
    pub action: Option<ActionRequest>,
}

pub fn parse(args: &[String]) -> Result<Args, String> {
    let mut parsed = Args::default();
    let mut positional = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--verbose" | "-v" => parsed.verbose = true,
            "--config" => parsed.config = Some(PathBuf::from(value_for(&mut iter, arg)?)),
            "--page" => parsed.page = Some(value_for(&mut iter, arg)?),
            "--cookie" => parsed.cookie = Some(value_for(&mut iter, arg)?),
            other if other.starts_with("--") => return Err(format!("unknown flag {}", other)),
            other => positional.push(other.to_string()),
        }
    }

    parsed.action = parse_action(&positional)?;
    Ok(parsed)
}

fn value_for<'a>(
    iter: &mut impl Iterator<Item = &'a String>,
    flag: &str,
) -> Result<String, String> {
    iter.next().cloned().ok_or_else(|| format!("{} needs a value", flag))
}

fn parse_action(positional: &[String]) -> Result<Option<ActionRequest>, String> {
    let words: Vec<&str> = positional.iter().map(String::as_str).collect();
    match words.as_slice() {
        [] => Ok(None),
        ["toggle", bid, state] => Ok(Some(ActionRequest::toggle(*bid, parse_switch(state)?))),
        ["upvote", bid] => Ok(Some(ActionRequest::upvote(*bid))),
        ["downvote", bid] => Ok(Some(ActionRequest::downvote(*bid))),
        [command, ..] => Err(format!("bad arguments for '{}'", command)),
    }
}

fn parse_switch(s: &str) -> Result<bool, String> {
    match s.to_lowercase().as_str() {
        "on" | "1" | "true" | "enable" => Ok(true),
        "off" | "0" | "false" | "disable" => Ok(false),
        _ => Err(format!("expected on or off, got '{}'", s)),
    }
}
