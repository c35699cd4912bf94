//! Public knowledge: promo-safe facts only.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use bandsite_shared::Variant;

use crate::Knowledge;
use crate::merge::{merge_list, merge_scalar, merge_set};
use crate::records::{OpenQuestion, Sources};
use crate::schema::{list_of, nullable_string, object, open_question, sources, string, string_list};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PublicBand {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub genre_keywords: BTreeSet<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub members_public: BTreeSet<String>,
    #[serde(default)]
    pub short_bio: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Show {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub sources: Sources,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MediaItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub sources: Sources,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PressItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blurb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quotes: Option<String>,
    #[serde(default)]
    pub sources: Sources,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContactEntry {
    pub public_contact_text: String,
    #[serde(default)]
    pub sources: Sources,
}

/// Knowledge document behind the public site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PublicKnowledge {
    #[serde(default)]
    pub band: PublicBand,
    #[serde(default)]
    pub shows: Vec<Show>,
    #[serde(default)]
    pub media: Vec<MediaItem>,
    #[serde(default)]
    pub press: Vec<PressItem>,
    #[serde(default)]
    pub contact: Vec<ContactEntry>,
    #[serde(default)]
    pub open_questions: Vec<OpenQuestion>,
}

impl Knowledge for PublicKnowledge {
    const VARIANT: Variant = Variant::Public;

    fn merge(mut self, fragment: Self) -> Self {
        let band = fragment.band;
        merge_scalar(&mut self.band.name, band.name);
        merge_scalar(&mut self.band.tagline, band.tagline);
        merge_scalar(&mut self.band.city, band.city);
        merge_scalar(&mut self.band.short_bio, band.short_bio);
        merge_set(&mut self.band.genre_keywords, band.genre_keywords);
        merge_set(&mut self.band.members_public, band.members_public);

        merge_list(&mut self.shows, fragment.shows);
        merge_list(&mut self.media, fragment.media);
        merge_list(&mut self.press, fragment.press);
        merge_list(&mut self.contact, fragment.contact);
        merge_list(&mut self.open_questions, fragment.open_questions);
        self
    }

    fn record_counts(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("shows", self.shows.len()),
            ("media", self.media.len()),
            ("press", self.press.len()),
            ("contact", self.contact.len()),
            ("open_questions", self.open_questions.len()),
        ]
    }

    fn schema() -> Value {
        object(&[
            (
                "band",
                object(&[
                    ("name", string()),
                    ("tagline", string()),
                    ("genre_keywords", string_list()),
                    ("city", string()),
                    ("members_public", string_list()),
                    ("short_bio", string()),
                ]),
            ),
            (
                "shows",
                list_of(object(&[
                    ("date", nullable_string()),
                    ("venue", nullable_string()),
                    ("city", nullable_string()),
                    ("notes", nullable_string()),
                    ("sources", sources()),
                ])),
            ),
            (
                "media",
                list_of(object(&[
                    ("label", nullable_string()),
                    ("url", string()),
                    ("notes", nullable_string()),
                    ("sources", sources()),
                ])),
            ),
            (
                "press",
                list_of(object(&[
                    ("blurb", nullable_string()),
                    ("quotes", nullable_string()),
                    ("sources", sources()),
                ])),
            ),
            (
                "contact",
                list_of(object(&[("public_contact_text", string()), ("sources", sources())])),
            ),
            ("open_questions", open_question()),
        ])
    }
}
