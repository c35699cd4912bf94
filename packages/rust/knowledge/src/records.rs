//! Record types shared by more than one variant.

use serde::{Deserialize, Serialize};

/// Message IDs cited by an extracted record. Carried through, not validated.
pub type Sources = Vec<u64>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Decision {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub decision: String,
    #[serde(default)]
    pub sources: Sources,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenQuestion {
    pub question: String,
    #[serde(default)]
    pub sources: Sources,
}

/// A labelled URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Link {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub sources: Sources,
}
