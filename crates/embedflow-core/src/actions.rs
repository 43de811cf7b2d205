//! Host-facing request types.
//!
//! The host's event glue (context menu entries, drag handlers) translates
//! DOM events into these semantic requests; `execute` carries them out.
//! Positions come from the host's rendered-node-to-offset mapping, which
//! the engine treats as ground truth.

use crate::resize::LinkKey;
use crate::types::{BlockKind, EmbedKind};

/// Where in the document an action originates.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct EmbedContext {
    /// Char offset of the rendered element's source position.
    pub position: usize,
    /// Block context, chosen by the host from DOM ancestry.
    pub block: BlockKind,
    pub kind: EmbedKind,
}

/// A semantic operation on an embedded attachment.
#[derive(Clone, Debug, PartialEq)]
pub enum EmbedAction {
    /// Remove the link text and, when the reference plan allows, the
    /// underlying file.
    RemoveAttachment {
        /// Rendered base file name (`name.ext`), as extracted from the
        /// element's `src`.
        base_name: String,
        context: EmbedContext,
    },
    /// Rewrite the width annotation of the link that produced the element.
    /// A width of 0 removes the annotation.
    ApplyWidth {
        key: LinkKey,
        width: u32,
        context: EmbedContext,
    },
    /// Copy the attachment's image bytes to the clipboard.
    CopyAttachment { source_url: String },
    /// Delete a note together with the attachments only it references.
    PurgeNote { note_path: String },
}
