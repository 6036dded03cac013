//! Command definitions
//!
//! A definition is the static description of one command: how it is named,
//! which guards apply and what arguments it takes. The same definition
//! drives text parsing, slash registration and the help listing.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use std::time::Duration;

use crate::gateway::Permissions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    String,
    Integer,
    Boolean,
    /// A guild member, given as a mention or id on the text path
    User,
    Channel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOption {
    pub name: String,
    pub description: String,
    pub kind: OptionKind,
    pub required: bool,
    /// Text path only: swallow every remaining token
    pub rest: bool,
    /// Reply used when a required option is absent
    pub missing_message: Option<String>,
    pub choices: Vec<String>,
}

impl CommandOption {
    pub fn new(name: &str, kind: OptionKind, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            kind,
            required: false,
            rest: false,
            missing_message: None,
            choices: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn rest(mut self) -> Self {
        self.rest = true;
        self
    }

    pub fn missing_message(mut self, message: &str) -> Self {
        self.missing_message = Some(message.to_string());
        self
    }

    pub fn choice(mut self, value: &str) -> Self {
        self.choices.push(value.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDefinition {
    pub name: String,
    pub aliases: Vec<String>,
    pub category: String,
    pub description: String,
    /// Usage line without the prefix, e.g. `kick <mention | id> <reason>`
    pub usage: String,
    pub examples: Vec<String>,
    pub member_permissions: Permissions,
    pub bot_permissions: Permissions,
    pub cooldown: Duration,
    pub guild_only: bool,
    pub owner_only: bool,
    pub premium_only: bool,
    pub enabled: bool,
    /// Whether the command is offered as a slash command
    pub slash: bool,
    pub options: Vec<CommandOption>,
}

impl CommandDefinition {
    pub fn new(name: &str, category: &str, description: &str) -> Self {
        Self {
            name: name.to_lowercase(),
            aliases: Vec::new(),
            category: category.to_string(),
            description: description.to_string(),
            usage: name.to_lowercase(),
            examples: Vec::new(),
            member_permissions: Permissions::empty(),
            bot_permissions: Permissions::empty(),
            cooldown: Duration::ZERO,
            guild_only: false,
            owner_only: false,
            premium_only: false,
            enabled: true,
            slash: true,
            options: Vec::new(),
        }
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_lowercase());
        self
    }

    pub fn usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    pub fn example(mut self, example: &str) -> Self {
        self.examples.push(example.to_string());
        self
    }

    pub fn member_permissions(mut self, permissions: Permissions) -> Self {
        self.member_permissions = permissions;
        self
    }

    pub fn bot_permissions(mut self, permissions: Permissions) -> Self {
        self.bot_permissions = permissions;
        self
    }

    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn guild_only(mut self) -> Self {
        self.guild_only = true;
        self
    }

    pub fn owner_only(mut self) -> Self {
        self.owner_only = true;
        self
    }

    pub fn premium_only(mut self) -> Self {
        self.premium_only = true;
        self
    }

    pub fn text_only(mut self) -> Self {
        self.slash = false;
        self
    }

    pub fn option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }

    /// Name followed by every alias
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}
