//! Message content - text plus the data derived from it

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s<>()\[\]{}"']+"#).expect("static regex compile"));

static MENTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<@(\d+)>").expect("static regex compile"));

/// Body of a chat message
///
/// Links are extracted once, at construction, and travel with the value.
/// Equality is by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContent {
    text: String,
    mentions: Vec<Snowflake>,
    links: Vec<String>,
    formatted: bool,
}

impl MessageContent {
    /// Maximum number of characters in a message
    pub const MAX_LENGTH: usize = 4000;

    /// Build content with explicit mentions
    pub fn new(
        text: impl Into<String>,
        mentions: Vec<Snowflake>,
        formatted: bool,
    ) -> Result<Self, DomainError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DomainError::EmptyContent);
        }
        if text.chars().count() > Self::MAX_LENGTH {
            return Err(DomainError::ContentTooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let links = extract_links(&text);
        let mut mentions = mentions;
        mentions.sort_unstable();
        mentions.dedup();

        Ok(Self {
            text,
            mentions,
            links,
            formatted,
        })
    }

    /// Plain text whose `<@id>` tokens become mentions
    pub fn from_text(text: impl Into<String>) -> Result<Self, DomainError> {
        let text = text.into();
        let mentions = extract_mentions(&text);
        Self::new(text, mentions, false)
    }

    /// Rebuild stored content without re-deriving anything
    pub fn from_parts(
        text: String,
        mentions: Vec<Snowflake>,
        links: Vec<String>,
        formatted: bool,
    ) -> Self {
        Self {
            text,
            mentions,
            links,
            formatted,
        }
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn mentions(&self) -> &[Snowflake] {
        &self.mentions
    }

    #[inline]
    pub fn links(&self) -> &[String] {
        &self.links
    }

    #[inline]
    pub fn is_formatted(&self) -> bool {
        self.formatted
    }

    pub fn mentions_user(&self, user_id: Snowflake) -> bool {
        self.mentions.binary_search(&user_id).is_ok()
    }
}

fn extract_links(text: &str) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();
    for m in URL_RE.find_iter(text) {
        let link = m
            .as_str()
            .trim_end_matches(['.', ',', ';', ':', '!', '?'])
            .to_string();
        if !links.contains(&link) {
            links.push(link);
        }
    }
    links
}

fn extract_mentions(text: &str) -> Vec<Snowflake> {
    MENTION_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .filter_map(|m| Snowflake::parse(m.as_str()).ok())
        .collect()
}
