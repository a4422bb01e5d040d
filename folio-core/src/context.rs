//! Externally supplied event data consumed by data-bound blocks.
//!
//! The context is fully assembled by the embedding application before a
//! render starts; rendering itself never fetches anything.

use serde::{Deserialize, Serialize};

/// Summary of the event a page is bound to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    /// Event name.
    #[serde(default)]
    pub name: String,
    /// Event description.
    #[serde(default)]
    pub description: String,
    /// Logo URL, if the organizer uploaded one.
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// One agenda session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Session title.
    #[serde(default)]
    pub title: String,
    /// Calendar date, already formatted for display.
    #[serde(default)]
    pub date: String,
    /// Start time, already formatted for display.
    #[serde(default)]
    pub start_time: String,
    /// End time, already formatted for display.
    #[serde(default)]
    pub end_time: String,
    /// Speaker name.
    #[serde(default)]
    pub speaker: String,
    /// Session description.
    #[serde(default)]
    pub description: String,
}

/// One speaker profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeakerRecord {
    /// Speaker name.
    #[serde(default)]
    pub name: String,
    /// Job title.
    #[serde(default)]
    pub title: String,
    /// Company or affiliation.
    #[serde(default)]
    pub company: String,
    /// Short biography.
    #[serde(default)]
    pub bio: String,
    /// Photo URL, if available.
    #[serde(default)]
    pub photo_url: Option<String>,
}

/// Scalar context fields a prop binding can draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextField {
    /// The event name.
    EventName,
    /// The event description.
    EventDescription,
    /// The event logo URL.
    EventLogoUrl,
}

/// Read-only bundle of event data for one render pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventContext {
    /// Event summary.
    #[serde(default)]
    pub event: EventSummary,
    /// Agenda sessions in display order.
    #[serde(default)]
    pub sessions: Vec<SessionRecord>,
    /// Speaker profiles in display order.
    #[serde(default)]
    pub speakers: Vec<SpeakerRecord>,
}

impl EventContext {
    /// Look up a scalar field, treating empty strings as absent.
    #[must_use]
    pub fn field(&self, field: ContextField) -> Option<&str> {
        let value = match field {
            ContextField::EventName => Some(self.event.name.as_str()),
            ContextField::EventDescription => Some(self.event.description.as_str()),
            ContextField::EventLogoUrl => self.event.logo_url.as_deref(),
        };
        value.filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fields_read_as_absent() {
        let ctx = EventContext::default();
        assert_eq!(ctx.field(ContextField::EventName), None);
        assert_eq!(ctx.field(ContextField::EventLogoUrl), None);
    }

    #[test]
    fn test_populated_fields_resolve() {
        let ctx = EventContext {
            event: EventSummary {
                name: "RustConf".to_string(),
                description: "Three days of Rust".to_string(),
                logo_url: Some("https://example.com/logo.png".to_string()),
            },
            ..EventContext::default()
        };
        assert_eq!(ctx.field(ContextField::EventName), Some("RustConf"));
        assert_eq!(
            ctx.field(ContextField::EventLogoUrl),
            Some("https://example.com/logo.png")
        );
    }
}
