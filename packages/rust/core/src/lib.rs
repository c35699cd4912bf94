//! Pipeline orchestration for bandsite.
//!
//! Ties the transcript, knowledge, collaborator and site crates together
//! into the end-to-end `build` workflow, plus the fragment cache and the
//! atomic site writer it relies on.

pub mod assembler;
pub mod cache;
pub mod pipeline;
