//! Command arguments
//!
//! Both invocation shapes end up as the same [`Arguments`] map. Text
//! invocations are parsed positionally against the option schema; structured
//! invocations arrive as named values that only need checking.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use std::collections::HashMap;

use anyhow::Result;
use log::warn;

use super::definition::{CommandDefinition, CommandOption, OptionKind};
use crate::core::ArgumentError;
use crate::gateway::{parse_channel_mention, ChannelId, ChatGateway, GuildId, MemberInfo, OptionValue};

#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    Member(MemberInfo),
    Channel(ChannelId),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: HashMap<String, ArgValue>,
    /// Raw text tokens after the command name; empty for structured invocations
    raw: Vec<String>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: ArgValue) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.values.get(name)? {
            ArgValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn get_integer(&self, name: &str) -> Option<i64> {
        match self.values.get(name)? {
            ArgValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.values.get(name)? {
            ArgValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn get_member(&self, name: &str) -> Option<&MemberInfo> {
        match self.values.get(name)? {
            ArgValue::Member(m) => Some(m),
            _ => None,
        }
    }

    pub fn get_channel(&self, name: &str) -> Option<ChannelId> {
        match self.values.get(name)? {
            ArgValue::Channel(c) => Some(*c),
            _ => None,
        }
    }

    pub fn raw(&self) -> &[String] {
        &self.raw
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn missing(option: &CommandOption, prefix: &str, def: &CommandDefinition) -> ArgumentError {
    let message = option.missing_message.clone().unwrap_or_else(|| {
        format!(
            "Missing argument `{}`. Usage: `{}{}`",
            option.name, prefix, def.usage
        )
    });
    ArgumentError::Missing {
        name: option.name.clone(),
        message,
    }
}

fn invalid(option: &CommandOption, message: String) -> ArgumentError {
    ArgumentError::Invalid {
        name: option.name.clone(),
        message,
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn check_choice(option: &CommandOption, value: &str) -> Result<(), ArgumentError> {
    if option.choices.is_empty() || option.choices.iter().any(|c| c.eq_ignore_ascii_case(value)) {
        Ok(())
    } else {
        Err(invalid(
            option,
            format!(
                "`{}` must be one of: {}",
                option.name,
                option.choices.join(", ")
            ),
        ))
    }
}

/// Parse text tokens positionally against the definition's options.
///
/// User options are resolved through the gateway; a token that matches no
/// member fails with [`ArgumentError::TargetNotFound`]. Lookup failures are
/// logged and treated the same way.
pub async fn parse_text_arguments(
    def: &CommandDefinition,
    tokens: &[String],
    prefix: &str,
    guild: Option<GuildId>,
    gateway: &dyn ChatGateway,
) -> Result<Arguments, ArgumentError> {
    let mut args = Arguments {
        values: HashMap::new(),
        raw: tokens.to_vec(),
    };
    let mut position = 0;

    for option in &def.options {
        let raw = if option.rest {
            let rest = tokens.get(position..).unwrap_or_default().join(" ");
            position = tokens.len();
            Some(rest).filter(|s| !s.is_empty())
        } else {
            let token = tokens.get(position).cloned();
            position += 1;
            token
        };

        let Some(raw) = raw else {
            if option.required {
                return Err(missing(option, prefix, def));
            }
            continue;
        };

        let value = match option.kind {
            OptionKind::String => {
                check_choice(option, &raw)?;
                ArgValue::String(raw)
            }
            OptionKind::Integer => ArgValue::Integer(raw.parse().map_err(|_| {
                invalid(option, format!("`{}` must be a whole number.", option.name))
            })?),
            OptionKind::Boolean => ArgValue::Boolean(parse_bool(&raw).ok_or_else(|| {
                invalid(option, format!("`{}` must be yes or no.", option.name))
            })?),
            OptionKind::Channel => ArgValue::Channel(parse_channel_mention(&raw).ok_or_else(|| {
                invalid(option, format!("`{}` must be a channel mention.", option.name))
            })?),
            OptionKind::User => {
                let not_found = || ArgumentError::TargetNotFound {
                    name: option.name.clone(),
                };
                let guild = guild.ok_or_else(not_found)?;
                match gateway.find_member(guild, &raw).await {
                    Ok(Some(member)) => ArgValue::Member(member),
                    Ok(None) => return Err(not_found()),
                    Err(e) => {
                        warn!("Member lookup for `{}` failed: {:#}", raw, e);
                        return Err(not_found());
                    }
                }
            }
        };
        args.insert(&option.name, value);
    }

    Ok(args)
}

/// Check named option values against the definition's options
pub fn structured_arguments(
    def: &CommandDefinition,
    options: &[(String, OptionValue)],
) -> Result<Arguments, ArgumentError> {
    let mut args = Arguments::new();

    for option in &def.options {
        let value = options
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&option.name))
            .map(|(_, value)| value);

        let Some(value) = value else {
            if option.required {
                return Err(missing(option, "/", def));
            }
            continue;
        };

        let value = match value {
            OptionValue::String(s) => {
                check_choice(option, s)?;
                ArgValue::String(s.clone())
            }
            OptionValue::Integer(i) => ArgValue::Integer(*i),
            OptionValue::Boolean(b) => ArgValue::Boolean(*b),
            OptionValue::Channel(c) => ArgValue::Channel(*c),
            OptionValue::User { member: Some(member), .. } => ArgValue::Member(member.clone()),
            OptionValue::User { member: None, .. } => {
                return Err(ArgumentError::TargetNotFound {
                    name: option.name.clone(),
                })
            }
        };
        args.insert(&option.name, value);
    }

    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::UserId;
    use crate::test_support::{member, MockGateway};

    const GUILD: GuildId = GuildId(1);

    fn kick_like() -> CommandDefinition {
        CommandDefinition::new("kick", "moderation", "Kicks the member.")
            .usage("kick <mention | id> <reason>")
            .option(
                CommandOption::new("user", OptionKind::User, "Member to kick")
                    .required()
                    .missing_message("Please provide a user to kick."),
            )
            .option(
                CommandOption::new("reason", OptionKind::String, "Reason")
                    .required()
                    .rest()
                    .missing_message("Please provide a reason to kick."),
            )
    }

    fn tokens(raw: &str) -> Vec<String> {
        raw.split_whitespace().map(String::from).collect()
    }

    #[tokio::test]
    async fn test_text_mention_resolves_to_member() {
        let gateway = MockGateway::new();
        gateway.add_member(member(GUILD, UserId(200000000000000001), "target"));

        let args = parse_text_arguments(
            &kick_like(),
            &tokens("<@200000000000000001> spamming the chat"),
            "!",
            Some(GUILD),
            &gateway,
        )
        .await
        .unwrap();

        assert_eq!(args.get_member("user").unwrap().user.name, "target");
        assert_eq!(args.get_str("reason"), Some("spamming the chat"));
        assert_eq!(args.raw().len(), 4);
    }

    #[tokio::test]
    async fn test_text_unknown_member_is_target_not_found() {
        let gateway = MockGateway::new();
        let err = parse_text_arguments(
            &kick_like(),
            &tokens("<@200000000000000001> spamming"),
            "!",
            Some(GUILD),
            &gateway,
        )
        .await
        .unwrap_err();
        assert_eq!(err, ArgumentError::TargetNotFound { name: "user".to_string() });
    }

    #[tokio::test]
    async fn test_text_missing_arguments_in_order() {
        let gateway = MockGateway::new();
        gateway.add_member(member(GUILD, UserId(200000000000000001), "target"));

        let err = parse_text_arguments(&kick_like(), &[], "!", Some(GUILD), &gateway)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Please provide a user to kick.");

        let err = parse_text_arguments(
            &kick_like(),
            &tokens("<@200000000000000001>"),
            "!",
            Some(GUILD),
            &gateway,
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Please provide a reason to kick.");
    }

    #[tokio::test]
    async fn test_text_default_missing_message_has_usage() {
        let def = CommandDefinition::new("config", "admin", "Settings")
            .usage("config <setting> <value>")
            .option(CommandOption::new("setting", OptionKind::String, "Setting").required());
        let err = parse_text_arguments(&def, &[], "?", None, &MockGateway::new())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing argument `setting`. Usage: `?config <setting> <value>`"
        );
    }

    #[tokio::test]
    async fn test_text_invalid_integer_and_choice() {
        let def = CommandDefinition::new("roll", "fun", "Roll")
            .option(CommandOption::new("sides", OptionKind::Integer, "Sides"))
            .option(CommandOption::new("mode", OptionKind::String, "Mode").choice("fast"));
        let gateway = MockGateway::new();

        let err = parse_text_arguments(&def, &tokens("six"), "!", None, &gateway)
            .await
            .unwrap_err();
        assert!(matches!(err, ArgumentError::Invalid { .. }));

        let err = parse_text_arguments(&def, &tokens("6 slow"), "!", None, &gateway)
            .await
            .unwrap_err();
        assert!(matches!(err, ArgumentError::Invalid { .. }));

        let args = parse_text_arguments(&def, &tokens("6 FAST"), "!", None, &gateway)
            .await
            .unwrap();
        assert_eq!(args.get_integer("sides"), Some(6));
    }

    #[test]
    fn test_structured_member_option() {
        let target = member(GUILD, UserId(5), "target");
        let options = vec![
            (
                "user".to_string(),
                OptionValue::User {
                    id: UserId(5),
                    member: Some(target.clone()),
                },
            ),
            ("reason".to_string(), OptionValue::String("spam".to_string())),
        ];
        let args = structured_arguments(&kick_like(), &options).unwrap();
        assert_eq!(args.get_member("user"), Some(&target));
        assert_eq!(args.get_str("reason"), Some("spam"));
        assert!(args.raw().is_empty());
    }

    #[test]
    fn test_structured_user_outside_guild() {
        let options = vec![
            ("user".to_string(), OptionValue::User { id: UserId(5), member: None }),
            ("reason".to_string(), OptionValue::String("spam".to_string())),
        ];
        let err = structured_arguments(&kick_like(), &options).unwrap_err();
        assert!(matches!(err, ArgumentError::TargetNotFound { .. }));
    }
}
