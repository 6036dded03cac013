//! Mention and snowflake parsing
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use regex::Regex;
use std::sync::OnceLock;

use super::{ChannelId, UserId};

fn user_mention_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^<@!?(\d{15,20})>$|^(\d{15,20})$").expect("valid regex"))
}

fn channel_mention_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^<#(\d{15,20})>$|^(\d{15,20})$").expect("valid regex"))
}

fn capture_id(re: &Regex, raw: &str) -> Option<u64> {
    let caps = re.captures(raw.trim())?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .and_then(|m| m.as_str().parse().ok())
}

/// `<@id>`, `<@!id>` or a bare snowflake
pub fn parse_user_mention(raw: &str) -> Option<UserId> {
    capture_id(user_mention_re(), raw).map(UserId)
}

/// `<#id>` or a bare snowflake
pub fn parse_channel_mention(raw: &str) -> Option<ChannelId> {
    capture_id(channel_mention_re(), raw).map(ChannelId)
}
