//! # Slash Commands (/)
//!
//! Slash command builders generated from command definitions, and their
//! registration with the platform.
//!
//! - **Version**: 3.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 3.0.0: Builders derived from each definition's option schema
//! - 1.0.0: Reorganized from monolithic slash_commands.rs

use anyhow::Result;
use log::info;
use serenity::builder::CreateApplicationCommand;
use serenity::http::Http;
use serenity::model::application::command::{Command, CommandOptionType};
use serenity::model::id::GuildId;

use super::definition::{CommandDefinition, OptionKind};
use super::registry::CommandRegistry;
use crate::core::truncate;

/// Platform limit for command and option descriptions
const DESCRIPTION_LIMIT: usize = 100;

fn option_type(kind: OptionKind) -> CommandOptionType {
    match kind {
        OptionKind::String => CommandOptionType::String,
        OptionKind::Integer => CommandOptionType::Integer,
        OptionKind::Boolean => CommandOptionType::Boolean,
        OptionKind::User => CommandOptionType::User,
        OptionKind::Channel => CommandOptionType::Channel,
    }
}

/// Builds the slash command for one definition
pub fn create_slash_command(def: &CommandDefinition) -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name(&def.name)
        .description(truncate(&def.description, DESCRIPTION_LIMIT));

    if !def.member_permissions.is_empty() {
        command.default_member_permissions(def.member_permissions);
    }
    if def.guild_only {
        command.dm_permission(false);
    }

    for opt in &def.options {
        command.create_option(|option| {
            option
                .name(&opt.name)
                .description(truncate(&opt.description, DESCRIPTION_LIMIT))
                .kind(option_type(opt.kind))
                .required(opt.required);
            for choice in &opt.choices {
                option.add_string_choice(choice, choice);
            }
            option
        });
    }

    command
}

/// Creates slash commands for every enabled, slash-capable command
pub fn create_slash_commands(registry: &CommandRegistry) -> Vec<CreateApplicationCommand> {
    registry
        .commands()
        .iter()
        .filter(|cmd| cmd.definition.slash)
        .map(|cmd| create_slash_command(&cmd.definition))
        .collect()
}

/// Registers all slash commands globally
pub async fn register_global_commands(http: impl AsRef<Http>, registry: &CommandRegistry) -> Result<()> {
    let slash_commands = create_slash_commands(registry);
    let count = slash_commands.len();

    Command::set_global_application_commands(http, |commands| {
        for command in slash_commands {
            commands.add_application_command(command);
        }
        commands
    })
    .await?;

    info!("Global slash commands registered successfully ({} commands)", count);
    Ok(())
}

/// Registers all slash commands for a specific guild (faster for testing)
pub async fn register_guild_commands(
    http: impl AsRef<Http>,
    guild_id: GuildId,
    registry: &CommandRegistry,
) -> Result<()> {
    let slash_commands = create_slash_commands(registry);
    let count = slash_commands.len();

    guild_id
        .set_application_commands(http, |commands| {
            for command in slash_commands {
                commands.add_application_command(command);
            }
            commands
        })
        .await?;

    info!(
        "Guild slash commands registered for guild {} ({} commands)",
        guild_id, count
    );
    Ok(())
}
