//! Outbound reply model and Discord text limits
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Add `Reply`, the platform-neutral payload every send/edit takes
//! - 1.0.0: Truncation helpers for message and embed limits

use super::embeds::Embed;

/// Discord embed description limit
pub const EMBED_LIMIT: usize = 4096;
/// Discord message content limit
pub const MESSAGE_LIMIT: usize = 2000;

/// Content of one outbound message: text, an embed, or both.
///
/// `ephemeral` is only honoured by structured interaction responses; plain
/// channel sends ignore it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reply {
    pub content: Option<String>,
    pub embed: Option<Embed>,
    pub ephemeral: bool,
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(truncate_for_message(&content.into())),
            ..Default::default()
        }
    }

    pub fn embed(embed: Embed) -> Self {
        Self {
            embed: Some(embed),
            ..Default::default()
        }
    }

    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }

    /// Plain text view used by logs and tests
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(content) = &self.content {
            parts.push(content.clone());
        }
        if let Some(embed) = &self.embed {
            parts.extend(embed.title.clone());
            parts.extend(embed.description.clone());
            parts.extend(embed.author.clone());
            parts.extend(embed.footer.as_ref().map(|f| f.text.clone()));
            for field in &embed.fields {
                parts.push(format!("{}: {}", field.name, field.value));
            }
        }
        parts.join("\n")
    }
}

impl From<&str> for Reply {
    fn from(content: &str) -> Self {
        Reply::text(content)
    }
}

impl From<String> for Reply {
    fn from(content: String) -> Self {
        Reply::text(content)
    }
}

impl From<Embed> for Reply {
    fn from(embed: Embed) -> Self {
        Reply::embed(embed)
    }
}

/// Truncate text to `limit` bytes on a UTF-8 boundary, adding an ellipsis if cut
pub fn truncate(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    let mut end = limit.saturating_sub(3); // Room for "..."
    while !text.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

/// Truncate text to fit embed limit, adding ellipsis if needed
pub fn truncate_for_embed(text: &str) -> String {
    truncate(text, EMBED_LIMIT)
}

/// Truncate text to fit message limit, adding ellipsis if needed
pub fn truncate_for_message(text: &str) -> String {
    truncate(text, MESSAGE_LIMIT)
}
