//! Knowledge documents for the three site variants and the rules for
//! folding per-chunk fragments into one document.
//!
//! Each variant has a fixed-shape document type implementing [`Knowledge`].
//! Fragments returned by the extraction collaborator deserialize into the
//! same type, so an unexpected key or a wrong enum value is rejected before
//! merging.

pub mod creative;
mod merge;
pub mod ops;
pub mod prompts;
pub mod public;
pub mod records;
mod schema;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use bandsite_shared::{BandsiteError, Result, Variant};

pub use creative::CreativeKnowledge;
pub use ops::OpsKnowledge;
pub use public::PublicKnowledge;

/// A variant's knowledge document.
///
/// `Default` is the empty template the fold starts from. `merge` must keep
/// the key set fixed, only ever grow list fields, and never overwrite a
/// populated scalar.
pub trait Knowledge:
    Default + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const VARIANT: Variant;

    /// Fold one fragment into the accumulated document.
    fn merge(self, fragment: Self) -> Self;

    /// Lengths of the list fields, keyed by field name.
    fn record_counts(&self) -> Vec<(&'static str, usize)>;

    /// JSON schema the extraction collaborator must conform to.
    fn schema() -> Value;

    /// Total records across all list fields.
    fn total_records(&self) -> usize {
        self.record_counts().iter().map(|(_, n)| n).sum()
    }

    /// Compact JSON of the empty template, embedded in extraction prompts.
    fn empty_json() -> Result<String> {
        serde_json::to_string(&Self::default())
            .map_err(|e| BandsiteError::Serialization(e.to_string()))
    }

    /// Strict conversion of a collaborator reply into a fragment.
    fn from_fragment(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| {
            BandsiteError::collaborator(
                "extraction",
                format!("{} fragment does not match schema: {e}", Self::VARIANT),
            )
        })
    }
}

/// Left fold of fragments, in order, starting from the empty template.
pub fn fold_fragments<K: Knowledge>(fragments: impl IntoIterator<Item = K>) -> K {
    fragments.into_iter().fold(K::default(), K::merge)
}
