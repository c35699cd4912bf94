//! Core domain types: chat messages and site variants.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::timestamp;

/// Current schema version for the site `manifest.json` format.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// A chat message as parsed from an export or loaded from JSON.
///
/// The `id` is optional at this stage; [`Message`] is the post-assignment form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
    /// Pre-assigned identifier, if the source already carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Wall-clock send time (exports carry no timezone).
    #[serde(with = "timestamp::serde_ts")]
    pub ts: NaiveDateTime,
    /// Display name of the sender.
    pub author: String,
    /// Message body, possibly multi-line.
    pub text: String,
}

/// A chat message with its stable 1-based identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    #[serde(with = "timestamp::serde_ts")]
    pub ts: NaiveDateTime,
    pub author: String,
    pub text: String,
}

// ---------------------------------------------------------------------------
// Variant
// ---------------------------------------------------------------------------

/// The three site flavours built from the same transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Internal logistics hub: rehearsals, gigs, tasks, gear.
    Operational,
    /// Songwriting hub: songs, setlists, recordings.
    Creative,
    /// Public promo site; strictest redaction.
    Public,
}

/// A page of the generated site: file slug plus navigation label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    pub slug: &'static str,
    pub label: &'static str,
}

const fn page(slug: &'static str, label: &'static str) -> PageSpec {
    PageSpec { slug, label }
}

const OPERATIONAL_PAGES: &[PageSpec] = &[
    page("index", "Home"),
    page("rehearsals", "Rehearsals"),
    page("gigs", "Gigs"),
    page("tasks", "Tasks"),
    page("decisions", "Decisions"),
    page("gear", "Gear"),
    page("links", "Links"),
    page("review", "Review"),
];

const CREATIVE_PAGES: &[PageSpec] = &[
    page("index", "Home"),
    page("songs", "Songs"),
    page("setlists", "Setlists"),
    page("recordings", "Recordings"),
    page("decisions", "Decisions"),
    page("review", "Review"),
];

const PUBLIC_PAGES: &[PageSpec] = &[
    page("index", "Home"),
    page("shows", "Shows"),
    page("media", "Media"),
    page("contact", "Contact"),
    page("review", "Review"),
];

/// Character budget per extraction chunk, shared by all variants.
pub const DEFAULT_MAX_CHARS: usize = 12_000;

impl Variant {
    pub const ALL: [Variant; 3] = [Variant::Operational, Variant::Creative, Variant::Public];

    /// Stable key used in logs, cache keys, and `manifest.json`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Operational => "operational",
            Self::Creative => "creative",
            Self::Public => "public",
        }
    }

    /// A silence of at least this many minutes always starts a new chunk.
    pub fn min_gap_minutes(&self) -> i64 {
        match self {
            Self::Operational => 180,
            Self::Creative => 240,
            Self::Public => 360,
        }
    }

    /// Fixed page set, in navigation order.
    pub fn pages(&self) -> &'static [PageSpec] {
        match self {
            Self::Operational => OPERATIONAL_PAGES,
            Self::Creative => CREATIVE_PAGES,
            Self::Public => PUBLIC_PAGES,
        }
    }

    pub fn default_title(&self) -> &'static str {
        match self {
            Self::Operational => "Band Ops Hub",
            Self::Creative => "Band Creative Hub",
            Self::Public => "Band",
        }
    }

    pub fn default_out_dir(&self) -> &'static str {
        match self {
            Self::Operational => "site_ops",
            Self::Creative => "site_creative",
            Self::Public => "site_public",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "operational" | "ops" => Ok(Self::Operational),
            "creative" => Ok(Self::Creative),
            "public" => Ok(Self::Public),
            other => Err(format!(
                "unknown variant '{other}': expected 'ops', 'creative', or 'public'"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn raw_message_roundtrip_without_id() {
        let json = r#"{"ts":"2024-01-01T12:00:00","author":"Ada","text":"Book studio?"}"#;
        let msg: RawMessage = serde_json::from_str(json).expect("deserialize");
        assert_eq!(msg.id, None);
        assert_eq!(
            msg.ts,
            NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap()
        );

        let back = serde_json::to_string(&msg).expect("serialize");
        assert_eq!(back, json);
    }

    #[test]
    fn raw_message_requires_author() {
        let json = r#"{"ts":"2024-01-01T12:00:00","text":"hi"}"#;
        assert!(serde_json::from_str::<RawMessage>(json).is_err());
    }

    #[test]
    fn page_sets_are_fixed() {
        let slugs = |v: Variant| v.pages().iter().map(|p| p.slug).collect::<Vec<_>>();
        assert_eq!(
            slugs(Variant::Operational),
            ["index", "rehearsals", "gigs", "tasks", "decisions", "gear", "links", "review"]
        );
        assert_eq!(
            slugs(Variant::Creative),
            ["index", "songs", "setlists", "recordings", "decisions", "review"]
        );
        assert_eq!(
            slugs(Variant::Public),
            ["index", "shows", "media", "contact", "review"]
        );
    }

    #[test]
    fn gap_tuning_per_variant() {
        assert_eq!(Variant::Operational.min_gap_minutes(), 180);
        assert_eq!(Variant::Creative.min_gap_minutes(), 240);
        assert_eq!(Variant::Public.min_gap_minutes(), 360);
    }

    #[test]
    fn variant_from_str_accepts_short_names() {
        assert_eq!("ops".parse::<Variant>().unwrap(), Variant::Operational);
        assert_eq!("Public".parse::<Variant>().unwrap(), Variant::Public);
        assert!("promo".parse::<Variant>().is_err());
    }
}
