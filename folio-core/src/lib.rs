//! # Folio Core
//!
//! Document model for the Folio page builder. A page is a tree of typed
//! nodes; this crate owns that tree and everything needed to read, edit, and
//! describe it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 folio-core                  │
//! ├──────────────────────┬──────────────────────┤
//! │  Document Tree       │  Dialect Adapter     │
//! │  - Nodes & ids       │  - Direct tree       │
//! │  - Invariant audit   │  - Wrapped envelope  │
//! │  - Canonical writes  │  - Legacy upgrade    │
//! ├──────────────────────┼──────────────────────┤
//! │  Type Registry       │  Editing             │
//! │  - Capabilities      │  - Atomic mutations  │
//! │  - Composition rules │  - Reserved slots    │
//! └──────────────────────┴──────────────────────┘
//! ```
//!
//! Rendering lives in `folio-renderer`; this crate defines the render output
//! tree and the per-type render contract so both sides share one vocabulary.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod context;
pub mod dialect;
pub mod error;
pub mod node;
pub mod ops;
pub mod output;
pub mod registry;
pub mod rules;
pub mod slots;
pub mod store;
pub mod width;

pub use context::{ContextField, EventContext, EventSummary, SessionRecord, SpeakerRecord};
pub use dialect::{parse, parse_value, LegacyKind};
pub use error::{CoreResult, DocumentError, DocumentViolation};
pub use node::{validate_node_id, Document, Node, NodeId, MAX_NODE_ID_LEN, ROOT_KEY};
pub use ops::{EditSession, Mutation, MutationOutcome, RejectReason};
pub use output::{RenderElement, RenderNode};
pub use registry::{
    BlockContext, BlockRender, CapabilityDescriptor, PropBinding, ReservedSlots, SettingKind,
    SettingsField, TypeRegistry,
};
pub use rules::{
    CompositionRules, ContainerRules, ContentBlockRules, RegionSlotRules, TwoRegionRules,
};
pub use slots::{SlotIndex, SlotPair, LEFT_SLOT_SUFFIX, RIGHT_SLOT_SUFFIX};
pub use store::{validate_session_id, DocumentStore, StoreError, DEFAULT_SESSION};
pub use width::{Breakpoint, WidthSpec, WidthToken, DEFAULT_WIDTH};

/// Core crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
