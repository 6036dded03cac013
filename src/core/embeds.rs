//! Embed builder for bot responses
//!
//! Commands and flows describe embeds with this platform-neutral type; the
//! gateway adapter turns it into a serenity `CreateEmbed` at send time.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Replace direct `CreateEmbed` construction with a neutral model
//! - 1.0.0: Shared embed construction helpers

use chrono::{DateTime, Utc};

use super::response::{truncate, truncate_for_embed};

pub mod colors {
    pub const BLUE: u32 = 0x3498DB;
    pub const GREEN: u32 = 0x2ECC71;
    pub const RED: u32 = 0xE74C3C;
    pub const WHITE: u32 = 0xFFFFFF;
}

const TITLE_LIMIT: usize = 256;
const FIELD_NAME_LIMIT: usize = 256;
const FIELD_VALUE_LIMIT: usize = 1024;
const FOOTER_LIMIT: usize = 2048;

#[derive(Debug, Clone, PartialEq)]
pub struct EmbedFooter {
    pub text: String,
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Embed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub color: Option<u32>,
    pub footer: Option<EmbedFooter>,
    pub thumbnail: Option<String>,
    pub fields: Vec<EmbedField>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Embed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(truncate(&title.into(), TITLE_LIMIT));
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(truncate_for_embed(&text.into()));
        self
    }

    pub fn author(mut self, name: impl Into<String>) -> Self {
        self.author = Some(truncate(&name.into(), TITLE_LIMIT));
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(EmbedFooter {
            text: truncate(&text.into(), FOOTER_LIMIT),
            icon_url: None,
        });
        self
    }

    pub fn footer_with_icon(mut self, text: impl Into<String>, icon_url: Option<String>) -> Self {
        self.footer = Some(EmbedFooter {
            text: truncate(&text.into(), FOOTER_LIMIT),
            icon_url,
        });
        self
    }

    pub fn thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail = Some(url.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: truncate(&name.into(), FIELD_NAME_LIMIT),
            value: truncate(&value.into(), FIELD_VALUE_LIMIT),
            inline,
        });
        self
    }

    pub fn timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.timestamp = Some(at);
        self
    }
}
