//! Operational knowledge: logistics for running the band.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use bandsite_shared::Variant;

use crate::Knowledge;
use crate::merge::{merge_list, merge_scalar, merge_set};
use crate::records::{Decision, Link, OpenQuestion, Sources};
use crate::schema::{
    decision, list_of, nullable_enum, nullable_string, object, open_question, sources, string,
    string_list,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpsBand {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub members: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rehearsal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub agenda: Vec<String>,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub sources: Sources,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Gig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_time: Option<String>,
    #[serde(default)]
    pub setlist: Vec<String>,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub sources: Sources,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Open,
    Done,
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Task {
    pub task: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub sources: Sources,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GearItem {
    pub item: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub who: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub sources: Sources,
}

/// Knowledge document behind the operational site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpsKnowledge {
    #[serde(default)]
    pub band: OpsBand,
    #[serde(default)]
    pub rehearsals: Vec<Rehearsal>,
    #[serde(default)]
    pub gigs: Vec<Gig>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub decisions: Vec<Decision>,
    #[serde(default)]
    pub gear: Vec<GearItem>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub open_questions: Vec<OpenQuestion>,
}

impl Knowledge for OpsKnowledge {
    const VARIANT: Variant = Variant::Operational;

    fn merge(mut self, fragment: Self) -> Self {
        merge_scalar(&mut self.band.name, fragment.band.name);
        merge_set(&mut self.band.members, fragment.band.members);
        merge_list(&mut self.rehearsals, fragment.rehearsals);
        merge_list(&mut self.gigs, fragment.gigs);
        merge_list(&mut self.tasks, fragment.tasks);
        merge_list(&mut self.decisions, fragment.decisions);
        merge_list(&mut self.gear, fragment.gear);
        merge_list(&mut self.links, fragment.links);
        merge_list(&mut self.open_questions, fragment.open_questions);
        self
    }

    fn record_counts(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("rehearsals", self.rehearsals.len()),
            ("gigs", self.gigs.len()),
            ("tasks", self.tasks.len()),
            ("decisions", self.decisions.len()),
            ("gear", self.gear.len()),
            ("links", self.links.len()),
            ("open_questions", self.open_questions.len()),
        ]
    }

    fn schema() -> Value {
        object(&[
            (
                "band",
                object(&[("name", string()), ("members", string_list())]),
            ),
            (
                "rehearsals",
                list_of(object(&[
                    ("date", nullable_string()),
                    ("time", nullable_string()),
                    ("location", nullable_string()),
                    ("agenda", string_list()),
                    ("notes", string_list()),
                    ("sources", sources()),
                ])),
            ),
            (
                "gigs",
                list_of(object(&[
                    ("date", nullable_string()),
                    ("time", nullable_string()),
                    ("venue", nullable_string()),
                    ("call_time", nullable_string()),
                    ("setlist", string_list()),
                    ("notes", string_list()),
                    ("sources", sources()),
                ])),
            ),
            (
                "tasks",
                list_of(object(&[
                    ("task", string()),
                    ("owner", nullable_string()),
                    ("due", nullable_string()),
                    ("status", nullable_enum(&["open", "done", "blocked"])),
                    ("sources", sources()),
                ])),
            ),
            ("decisions", decision()),
            (
                "gear",
                list_of(object(&[
                    ("item", string()),
                    ("who", nullable_string()),
                    ("when", nullable_string()),
                    ("notes", nullable_string()),
                    ("sources", sources()),
                ])),
            ),
            (
                "links",
                list_of(object(&[
                    ("url", string()),
                    ("label", nullable_string()),
                    ("sources", sources()),
                ])),
            ),
            ("open_questions", open_question()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fragment(value: Value) -> OpsKnowledge {
        serde_json::from_value(value).expect("valid fragment")
    }

    #[test]
    fn empty_document_has_fixed_keys() {
        let value = serde_json::to_value(OpsKnowledge::default()).expect("serialize");
        let keys: Vec<&String> = value.as_object().expect("object").keys().collect();
        assert_eq!(keys.len(), 8);
        assert_eq!(value["band"], json!({"name": "", "members": []}));
    }

    #[test]
    fn band_name_first_non_empty_wins() {
        let doc = OpsKnowledge::default()
            .merge(fragment(json!({"band": {"name": "", "members": []}})))
            .merge(fragment(json!({"band": {"name": "Y", "members": []}})))
            .merge(fragment(json!({"band": {"name": "Z", "members": []}})));
        assert_eq!(doc.band.name, "Y");
    }

    #[test]
    fn members_union_sorted() {
        let doc = OpsKnowledge::default()
            .merge(fragment(json!({"band": {"name": "", "members": ["Lin", "Ada"]}})))
            .merge(fragment(json!({"band": {"name": "", "members": ["Ada", "Cy"]}})));
        let value = serde_json::to_value(&doc).expect("serialize");
        assert_eq!(value["band"]["members"], json!(["Ada", "Cy", "Lin"]));
    }

    #[test]
    fn lists_append_in_fold_order() {
        let a = fragment(json!({
            "tasks": [{"task": "book studio", "status": "open", "sources": [1]}],
            "gear": [{"item": "PA", "who": "Cy", "sources": [2]}]
        }));
        let b = fragment(json!({
            "tasks": [
                {"task": "print flyers", "sources": [5]},
                {"task": "book studio", "status": "done", "sources": [6]}
            ]
        }));

        let folded = OpsKnowledge::default().merge(a.clone()).merge(b.clone());

        let mut combined = a.clone();
        combined.tasks.extend(b.tasks.clone());
        combined.gear.extend(b.gear.clone());
        let at_once = OpsKnowledge::default().merge(combined);

        assert_eq!(folded, at_once);
        let tasks: Vec<&str> = folded.tasks.iter().map(|t| t.task.as_str()).collect();
        assert_eq!(tasks, ["book studio", "print flyers", "book studio"]);
        assert_eq!(folded.tasks[2].status, Some(TaskStatus::Done));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = serde_json::from_value::<OpsKnowledge>(json!({"setlists": []}));
        assert!(result.is_err());
    }

    #[test]
    fn invalid_task_status_is_rejected() {
        let result = serde_json::from_value::<OpsKnowledge>(
            json!({"tasks": [{"task": "x", "status": "maybe", "sources": []}]}),
        );
        assert!(result.is_err());
    }

    #[test]
    fn schema_lists_every_key() {
        let schema = OpsKnowledge::schema();
        assert_eq!(schema["required"].as_array().expect("array").len(), 8);
        assert_eq!(
            schema["properties"]["tasks"]["items"]["properties"]["status"]["enum"],
            json!(["open", "done", "blocked", null])
        );
    }
}
