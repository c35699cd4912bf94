//! Static HTML rendering for generated band sites.
//!
//! Pages are written by the text generator as Markdown; this crate turns
//! that Markdown into a small HTML subset and wraps it in a shared page
//! shell with navigation.

mod markdown;
mod page;

pub use markdown::{escape_html, markdown_to_html};
pub use page::{NavLink, render_page};
