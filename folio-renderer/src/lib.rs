//! # Folio Renderer
//!
//! Deterministic rendering for Folio page documents: one depth-first walk
//! per render call, no suspension points, no network. Contextual data (the
//! event an attendee is looking at) arrives fully resolved before rendering
//! starts.
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               folio-renderer                │
//! ├──────────────────────┬──────────────────────┤
//! │  Render Walk         │  Standard Blocks     │
//! │  - Prop merging      │  - Layout & content  │
//! │  - Context bindings  │  - Data-bound blocks │
//! │  - Placeholders      │  - Two-column layout │
//! ├──────────────────────┴──────────────────────┤
//! │  HTML Output                                │
//! │  - Escaping, stable attribute order         │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The walk never fails: malformed pages render the empty-page state, and a
//! node whose type is missing from the registry renders a diagnostic
//! placeholder while the rest of the tree carries on.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod html;
pub mod standard;
pub mod tree;

pub use html::render_to_string;
pub use standard::{standard_registry, COLUMNS_TYPE, COLUMN_TYPE};
pub use tree::{RenderConfig, RenderSession, DEFAULT_MAX_DEPTH};

/// Renderer crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
