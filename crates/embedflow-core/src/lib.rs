//! embedflow-core: host-embedded attachment tooling for markdown notes.
//!
//! This crate provides the text engine behind contextual attachment
//! actions in a note editor: given the raw document text, a position
//! mapped from a rendered element, and a target identifier, it locates the
//! exact character span of the markdown link that produced the element and
//! rewrites only that span — a width annotation update, or removal of the
//! link altogether. Around that core sit the drag-resize gesture machine,
//! the deletion planner driven by the host's backlink index, and the
//! clipboard copy flow.
//!
//! Two embed syntaxes are handled, each with per-context rules:
//! - wiki embeds `![[name|size]]`, size on the link target
//! - inline embeds `![alt|size](url)`, size on the alt text
//!
//! with `\|` escaping inside table rows and block-scoped matching for
//! tables and callouts. When the same target occurs more than once in the
//! scanned range, the engine refuses to edit rather than guess.
//!
//! The host supplies everything durable through traits: document buffer
//! ([`HostDocument`]), file storage ([`platform::Vault`]), backlink index
//! ([`platform::LinkIndex`]), notices, clipboard, and blob fetching. All
//! matching and rewriting is synchronous and pure.

pub mod actions;
pub mod apply;
pub mod block;
pub mod delete;
pub mod document;
pub mod error;
pub mod execute;
pub mod link;
pub mod media;
pub mod platform;
pub mod resize;
pub mod settings;
pub mod types;

pub use actions::{EmbedAction, EmbedContext};
pub use apply::{ApplyOutcome, apply_unique_edit};
pub use block::collect_block_matches;
pub use delete::{
    DeletionPlan, ReferenceInfo, ReferenceState, check_reference_info, plan_deletion,
    plan_note_purge,
};
pub use document::{HostDocument, LineRef, RopeDocument};
pub use error::{FlowError, PlatformError, Result};
pub use execute::{Host, apply_width, execute_action};
pub use link::{file_base_name, find_links, match_external_links, match_internal_links};
pub use media::{BlobLoadPolicy, load_image_blob, proxy_url};
pub use resize::{
    Edge, ElementBox, LinkKey, MoveUpdate, Point, ResizeConstraints, ResizeSession,
    resolve_link_key,
};
pub use settings::{DeleteDestination, Settings};
pub use smol_str::SmolStr;
pub use types::{BlockKind, EmbedKind, LinkKind, LinkOccurrence, Span, TextPosition};
