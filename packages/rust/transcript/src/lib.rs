//! Transcript handling: export parsing, message IDs, redaction, and chunking.
//!
//! Everything here is pure and synchronous. The pipeline in `bandsite-core`
//! runs these stages in order before any text reaches an extraction call.

pub mod chunker;
pub mod ids;
pub mod json;
pub mod parser;
pub mod sanitize;

pub use chunker::{Chunk, ChunkOptions, chunk_messages, render_line};
pub use ids::assign_ids;
pub use json::{load_messages_json, parse_messages_json, write_messages_json};
pub use parser::{parse_export, parse_export_file};
pub use sanitize::{Sanitizer, redact_contacts, sanitize_public};
