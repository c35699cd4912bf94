//! Creative knowledge: songs in progress, setlists, and recordings.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use bandsite_shared::Variant;

use crate::Knowledge;
use crate::merge::merge_list;
use crate::records::{Decision, OpenQuestion, Sources};
use crate::schema::{
    decision, list_of, nullable_enum, nullable_string, object, open_question, sources, string,
    string_list,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SongStatus {
    Idea,
    InProgress,
    Ready,
    Parked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Song {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SongStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempo_bpm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lyrics_notes: Option<String>,
    #[serde(default)]
    pub todo: Vec<String>,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub sources: Sources,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Setlist {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default)]
    pub songs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub sources: Sources,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Recording {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub sources: Sources,
}

/// Knowledge document behind the creative site. No scalar or set fields:
/// every key is an append-only list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreativeKnowledge {
    #[serde(default)]
    pub songs: Vec<Song>,
    #[serde(default)]
    pub setlists: Vec<Setlist>,
    #[serde(default)]
    pub recordings: Vec<Recording>,
    #[serde(default)]
    pub decisions: Vec<Decision>,
    #[serde(default)]
    pub open_questions: Vec<OpenQuestion>,
}

impl Knowledge for CreativeKnowledge {
    const VARIANT: Variant = Variant::Creative;

    fn merge(mut self, fragment: Self) -> Self {
        merge_list(&mut self.songs, fragment.songs);
        merge_list(&mut self.setlists, fragment.setlists);
        merge_list(&mut self.recordings, fragment.recordings);
        merge_list(&mut self.decisions, fragment.decisions);
        merge_list(&mut self.open_questions, fragment.open_questions);
        self
    }

    fn record_counts(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("songs", self.songs.len()),
            ("setlists", self.setlists.len()),
            ("recordings", self.recordings.len()),
            ("decisions", self.decisions.len()),
            ("open_questions", self.open_questions.len()),
        ]
    }

    fn schema() -> Value {
        object(&[
            (
                "songs",
                list_of(object(&[
                    ("title", string()),
                    (
                        "status",
                        nullable_enum(&["idea", "in_progress", "ready", "parked"]),
                    ),
                    ("key", nullable_string()),
                    ("tempo_bpm", nullable_string()),
                    ("structure_notes", nullable_string()),
                    ("parts_notes", nullable_string()),
                    ("lyrics_notes", nullable_string()),
                    ("todo", string_list()),
                    ("links", string_list()),
                    ("sources", sources()),
                ])),
            ),
            (
                "setlists",
                list_of(object(&[
                    ("name", nullable_string()),
                    ("context", nullable_string()),
                    ("songs", string_list()),
                    ("notes", nullable_string()),
                    ("sources", sources()),
                ])),
            ),
            (
                "recordings",
                list_of(object(&[
                    ("title", nullable_string()),
                    ("url", string()),
                    ("notes", nullable_string()),
                    ("sources", sources()),
                ])),
            ),
            ("decisions", decision()),
            ("open_questions", open_question()),
        ])
    }
}
