//! Reference counting and deletion planning.
//!
//! Whether removing a link should also remove the underlying file depends
//! on who else references it. The answer is computed fresh from the host
//! index on every request. Link-text removal always happens before any
//! file-system action: a failed file removal then leaves an orphaned but
//! harmless file, whereas the reverse order could leave a dangling link to
//! a file that is already gone.

use smol_str::SmolStr;

use crate::platform::LinkIndex;

/// How widely a candidate attachment is referenced.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum ReferenceState {
    Unreferenced,
    /// Exactly one link in the whole vault — the one being deleted.
    ReferencedOnce,
    /// Several links, or more than one from a single document.
    ReferencedMultiple,
}

/// Result of consulting the link index for one attachment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceInfo {
    pub state: ReferenceState,
    /// Referencing documents, the current document first when it is one.
    pub referencing_documents: Vec<SmolStr>,
}

/// Count references to `target_path` across every document in the index.
pub fn check_reference_info<I>(index: &I, target_path: &str, current_document: &str) -> ReferenceInfo
where
    I: LinkIndex + ?Sized,
{
    let mut documents: Vec<SmolStr> = Vec::new();
    let mut total = 0usize;

    for document in index.documents() {
        for (path, count) in index.links_from(&document) {
            if path != target_path {
                continue;
            }
            total += count;
            if document == current_document {
                documents.insert(0, document.clone());
            } else {
                documents.push(document.clone());
            }
            // More than one link from a single document is already
            // ambiguous enough to keep the file.
            if count > 1 {
                return ReferenceInfo {
                    state: ReferenceState::ReferencedMultiple,
                    referencing_documents: documents,
                };
            }
        }
    }

    let state = match total {
        0 => ReferenceState::Unreferenced,
        1 => ReferenceState::ReferencedOnce,
        _ => ReferenceState::ReferencedMultiple,
    };
    tracing::trace!(
        target: "embedflow::delete",
        target_path,
        total,
        ?state,
        "reference check"
    );
    ReferenceInfo {
        state,
        referencing_documents: documents,
    }
}

/// What a deletion request should do to link text and file.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct DeletionPlan {
    /// Remove only the link text, leaving the file in place.
    pub remove_link_only: bool,
    /// Remove the underlying file after the link text.
    pub remove_file: bool,
}

/// Decide the deletion plan for an attachment.
pub fn plan_deletion(info: &ReferenceInfo) -> DeletionPlan {
    match info.state {
        ReferenceState::Unreferenced | ReferenceState::ReferencedOnce => DeletionPlan {
            remove_link_only: false,
            remove_file: true,
        },
        ReferenceState::ReferencedMultiple => DeletionPlan {
            remove_link_only: true,
            remove_file: false,
        },
    }
}

/// Attachments of `note` that no other document references.
///
/// Deleting a note together with its attachments must keep any file that a
/// different document still links to.
pub fn plan_note_purge<I>(index: &I, note: &str) -> Vec<SmolStr>
where
    I: LinkIndex + ?Sized,
{
    let others: Vec<SmolStr> = index
        .documents()
        .into_iter()
        .filter(|doc| doc != note)
        .collect();

    index
        .links_from(note)
        .into_iter()
        .map(|(target, _)| target)
        .filter(|target| {
            !others.iter().any(|doc| {
                index
                    .links_from(doc)
                    .iter()
                    .any(|(path, _)| path == target)
            })
        })
        .collect()
}
