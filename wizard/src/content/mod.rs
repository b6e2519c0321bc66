//! Event content assistance
//!
//! Titles, descriptions, and marketing copy are drafted by an external text
//! generator when one is configured and answers in time, and by local
//! templates otherwise. Either way the caller always gets usable text.

use feastflow_core::effect::EffectId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub mod fallback;
pub mod generate;
pub mod prompts;
mod reducer;

pub use generate::generate_with_fallback;
pub use reducer::{ContentAction, ContentReducer, ContentState};

/// What kind of copy is being drafted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Event title
    Title,
    /// Event description
    Description,
    /// Social media copy
    Marketing,
}

impl ContentKind {
    /// Every kind
    pub const ALL: [Self; 3] = [Self::Title, Self::Description, Self::Marketing];

    /// Lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Marketing => "marketing",
        }
    }

    /// Key under which generation of this kind can be cancelled
    #[must_use]
    pub fn effect_id(self) -> EffectId {
        EffectId::new(format!("content-{}", self.as_str()))
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(Self::Title),
            "description" => Ok(Self::Description),
            "marketing" => Ok(Self::Marketing),
            other => Err(format!("unknown content kind: {other}")),
        }
    }
}

/// Placeholder event type when none was given
pub const DEFAULT_EVENT_TYPE: &str = "Community Event";
/// Placeholder location when none was given
pub const DEFAULT_LOCATION: &str = "your area";
/// Placeholder event name when none was given
pub const DEFAULT_EVENT_NAME: &str = "Your Event";

/// What the copy is about
///
/// Blank fields are replaced by neutral placeholders when read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationContext {
    /// Event type, e.g. "Food Festival"
    pub event_type: String,
    /// Neighbourhood or city
    pub location: String,
    /// Event name or title
    pub event_name: String,
}

impl GenerationContext {
    /// Create a context
    #[must_use]
    pub fn new(
        event_type: impl Into<String>,
        location: impl Into<String>,
        event_name: impl Into<String>,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            location: location.into(),
            event_name: event_name.into(),
        }
    }

    /// Event type, or the placeholder
    #[must_use]
    pub fn event_type(&self) -> &str {
        non_blank(&self.event_type).unwrap_or(DEFAULT_EVENT_TYPE)
    }

    /// Location, or the placeholder
    #[must_use]
    pub fn location(&self) -> &str {
        non_blank(&self.location).unwrap_or(DEFAULT_LOCATION)
    }

    /// Event name, or the placeholder
    #[must_use]
    pub fn event_name(&self) -> &str {
        non_blank(&self.event_name).unwrap_or(DEFAULT_EVENT_NAME)
    }
}

fn non_blank(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Where a piece of content came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    /// The external text generator
    Live,
    /// Local templates
    Fallback,
    /// Typed or edited by the user
    Manual,
}

/// How content provenance is shown to the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceLabeling {
    /// Tell the user whether the generator or templates wrote it
    #[default]
    Disclose,
    /// Use the same label for both
    Conceal,
}

impl SourceLabeling {
    /// Label shown next to content from `source`
    #[must_use]
    pub const fn label(self, source: ContentSource) -> &'static str {
        match (self, source) {
            (_, ContentSource::Manual) => "Edited by you",
            (Self::Disclose, ContentSource::Live) => "AI generated",
            (Self::Disclose, ContentSource::Fallback) => "Generated from smart templates",
            (Self::Conceal, _) => "Content generated",
        }
    }
}

impl FromStr for SourceLabeling {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "disclose" => Ok(Self::Disclose),
            "conceal" => Ok(Self::Conceal),
            other => Err(format!("unknown source labeling: {other}")),
        }
    }
}

/// One drafted piece of content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedContent {
    /// The text
    pub text: String,
    /// Where it came from
    pub source: ContentSource,
}

impl GeneratedContent {
    /// Content from the external generator
    #[must_use]
    pub fn live(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: ContentSource::Live,
        }
    }

    /// Content from local templates
    #[must_use]
    pub fn fallback(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: ContentSource::Fallback,
        }
    }

    /// Content written by the user
    #[must_use]
    pub fn manual(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: ContentSource::Manual,
        }
    }
}

/// Latest content per kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedContentResult {
    entries: BTreeMap<ContentKind, GeneratedContent>,
}

impl GeneratedContentResult {
    /// Content for a kind
    #[must_use]
    pub fn get(&self, kind: ContentKind) -> Option<&GeneratedContent> {
        self.entries.get(&kind)
    }

    /// Replace the content for a kind
    pub fn insert(&mut self, kind: ContentKind, content: GeneratedContent) {
        self.entries.insert(kind, content);
    }

    /// Drop the content for a kind
    pub fn remove(&mut self, kind: ContentKind) -> Option<GeneratedContent> {
        self.entries.remove(&kind)
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Whether nothing has been drafted
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in kind order
    pub fn iter(&self) -> impl Iterator<Item = (ContentKind, &GeneratedContent)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }
}
