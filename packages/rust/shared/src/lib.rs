//! Shared types, error model, and configuration for bandsite.
//!
//! This crate is the foundation depended on by all other bandsite crates.
//! It provides:
//! - [`BandsiteError`] — the unified error type
//! - Domain types ([`RawMessage`], [`Message`], [`Variant`], [`PageSpec`])
//! - Timestamp parsing shared by the export parser and message JSON
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod timestamp;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CacheConfig, LlmConfig, PipelineConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from, resolve_api_key,
};
pub use error::{BandsiteError, Result};
pub use types::{
    CURRENT_SCHEMA_VERSION, DEFAULT_MAX_CHARS, Message, PageSpec, RawMessage, Variant,
};
