//! Help command handler

use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::definition::{CommandDefinition, CommandOption, OptionKind};
use crate::commands::handler::CommandHandler;
use crate::commands::invocation::InvocationContext;
use crate::core::{colors, Embed};

pub struct HelpHandler;

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Overview of every enabled command, grouped by category
fn overview(ctx: &CommandContext, prefix: &str) -> Embed {
    let mut categories: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for command in ctx.registry.commands() {
        categories
            .entry(command.definition.category.clone())
            .or_default()
            .push(format!("`{}`", command.definition.name));
    }

    let mut embed = Embed::new()
        .title("Commands")
        .color(colors::BLUE)
        .footer(format!("Use {}help <command> for details", prefix));
    for (category, names) in categories {
        embed = embed.field(capitalize(&category), names.join(" "), false);
    }
    embed
}

fn details(def: &CommandDefinition, prefix: &str) -> Embed {
    let mut lines = Vec::new();
    if !def.aliases.is_empty() {
        lines.push(format!("**Aliases:** {}", def.aliases.join(", ")));
    }
    lines.push(format!("**Description:** {}", def.description));
    lines.push(format!("**Usage:** `{}{}`", prefix, def.usage));
    if !def.examples.is_empty() {
        let examples: Vec<String> = def
            .examples
            .iter()
            .map(|e| format!("`{}{}`", prefix, e))
            .collect();
        lines.push(format!("**Examples:** {}", examples.join(", ")));
    }
    if !def.cooldown.is_zero() {
        lines.push(format!("**Cooldown:** {}s", def.cooldown.as_secs_f32()));
    }

    Embed::new()
        .title(format!("Command: {}", def.name))
        .color(colors::BLUE)
        .description(lines.join("\n"))
}

#[async_trait]
impl CommandHandler for HelpHandler {
    fn definition(&self) -> CommandDefinition {
        CommandDefinition::new("help", "info", "Shows all commands, or the details of one command.")
            .alias("h")
            .usage("help [command]")
            .example("help kick")
            .option(CommandOption::new("command", OptionKind::String, "The command to look up"))
    }

    async fn handle(&self, ctx: Arc<CommandContext>, inv: &InvocationContext) -> Result<()> {
        let prefix = inv.prefix().to_string();
        let Some(name) = inv.args.get_str("command") else {
            inv.reply(overview(&ctx, &prefix)).await?;
            return Ok(());
        };

        match ctx.registry.resolve(name) {
            Some(command) => {
                inv.reply(details(&command.definition, &prefix)).await?;
            }
            None => {
                inv.notify(format!("I don't know a command called `{}`.", name))
                    .await;
            }
        }
        Ok(())
    }
}
