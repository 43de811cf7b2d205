//! Carrying out embed actions against the host collaborators.
//!
//! This is the central dispatch point. Each flow is synchronous within the
//! event-handler turn: matching and rewriting complete before control
//! returns, so editor transactions stay atomic and undo-coherent. The only
//! operations that may take time are the collaborator calls themselves
//! (file removal, blob fetch), each a single in-flight operation per user
//! action.

use std::time::Duration;

use crate::actions::{EmbedAction, EmbedContext};
use crate::apply::{ApplyOutcome, apply_unique_edit};
use crate::block::collect_block_matches;
use crate::delete::{check_reference_info, plan_deletion, plan_note_purge};
use crate::document::HostDocument;
use crate::error::{FlowError, Result};
use crate::link::{find_links, match_external_links, match_internal_links};
use crate::media::{BlobLoadPolicy, load_image_blob};
use crate::platform::{
    BlobFetcher, ClipboardSink, LinkIndex, Notifier, RenderPostProcess, Vault,
};
use crate::resize::LinkKey;
use crate::settings::{DeleteDestination, Settings};
use crate::types::{BlockKind, EmbedKind, LinkOccurrence};

/// Auto-dismiss delay for success notices.
pub const SUCCESS_NOTICE: Duration = Duration::from_millis(1800);
/// Informational notice when other references keep a file alive.
const SHARED_REFS_NOTICE: Duration = Duration::from_millis(3500);
/// Notice for the empty-folder cleanup that can follow a file removal.
const FOLDER_NOTICE: Duration = Duration::from_millis(3000);

/// The collaborators one action executes against.
///
/// `document` is None when no compatible editor view is active; flows then
/// abort silently (a detached gesture step is not a user-visible error).
pub struct Host<'a> {
    pub document: Option<&'a mut dyn HostDocument>,
    pub vault: &'a mut dyn Vault,
    pub index: &'a dyn LinkIndex,
    pub notifier: &'a mut dyn Notifier,
    pub clipboard: &'a mut dyn ClipboardSink,
    pub fetcher: &'a mut dyn BlobFetcher,
    /// Optional render patch hook; the flows work the same without one.
    pub post_process: Option<&'a mut dyn RenderPostProcess>,
    pub settings: &'a Settings,
    /// Path of the document the action originates in.
    pub current_document: &'a str,
}

/// Execute one embed action.
///
/// [`FlowError::DetachedContext`] is swallowed here: a pane that closed
/// mid-gesture is a no-op, not an error.
pub fn execute_action(action: &EmbedAction, host: &mut Host<'_>) -> Result<()> {
    let outcome = match action {
        EmbedAction::RemoveAttachment { base_name, context } => {
            remove_attachment(host, base_name, context)
        }
        EmbedAction::ApplyWidth {
            key,
            width,
            context,
        } => apply_width(host, key, *width, context).map(|_| ()),
        EmbedAction::CopyAttachment { source_url } => copy_attachment(host, source_url),
        EmbedAction::PurgeNote { note_path } => purge_note(host, note_path),
    };
    match outcome {
        Err(FlowError::DetachedContext) => {
            tracing::trace!(target: "embedflow::execute", ?action, "detached context, no-op");
            Ok(())
        }
        other => other,
    }
}

/// Matches for the anchor line or its enclosing block.
fn collect_matches<D>(
    doc: &D,
    anchor_line: usize,
    block: BlockKind,
    match_fn: impl Fn(&str) -> Vec<LinkOccurrence>,
) -> Vec<(usize, LinkOccurrence)>
where
    D: HostDocument + ?Sized,
{
    match block {
        BlockKind::Plain => doc
            .line(anchor_line)
            .map(|text| {
                match_fn(&text)
                    .into_iter()
                    .map(|occ| (anchor_line, occ))
                    .collect()
            })
            .unwrap_or_default(),
        BlockKind::Table | BlockKind::Callout => {
            collect_block_matches(doc, anchor_line, block, match_fn)
        }
    }
}

/// Remove the link under `context` and, when the reference plan allows,
/// the file it points to. Link text goes first, always.
fn remove_attachment(host: &mut Host<'_>, base_name: &str, context: &EmbedContext) -> Result<()> {
    let base = base_name.strip_prefix('/').unwrap_or(base_name);
    let target_path = host.index.resolve_base_name(host.current_document, base);

    let plan = target_path.as_deref().map(|path| {
        let info = check_reference_info(host.index, path, host.current_document);
        (plan_deletion(&info), info)
    });

    let Some(doc) = host.document.as_deref_mut() else {
        return Err(FlowError::DetachedContext);
    };
    let Some(anchor) = doc.line_at(context.position) else {
        host.notifier
            .notify("Failed to find the link text, please remove it manually.", None);
        return Ok(());
    };

    let in_table = context.block == BlockKind::Table;
    let matches = collect_matches(doc, anchor.index, context.block, |line| {
        find_links(line, base)
    });

    match apply_unique_edit(doc, &matches, in_table) {
        ApplyOutcome::NotFound => {
            // Persistent: silently losing track of a link risks data loss.
            host.notifier
                .notify("Failed to find the link text, please remove it manually.", None);
            return Ok(());
        }
        ApplyOutcome::Ambiguous { .. } => {
            host.notifier.notify(
                "Found multiple identical links here, please remove the right one manually.",
                None,
            );
            return Ok(());
        }
        ApplyOutcome::Applied { .. } => {}
    }

    let Some((plan, _info)) = plan else {
        // Link text is gone; without a resolvable file there is nothing
        // else to do.
        tracing::debug!(target: "embedflow::delete", base, "no vault file resolved");
        return Ok(());
    };

    if plan.remove_file {
        let path = target_path.as_deref().unwrap_or(base);
        clear_attachment(host, path, context.kind)?;
    } else {
        host.notifier.notify(
            "Other references to this file exist; removed only the link.",
            Some(SHARED_REFS_NOTICE),
        );
    }
    Ok(())
}

/// Remove one file by the configured destination, cleaning up a folder the
/// file was the last occupant of. Failures become notices; the link text
/// already removed stays removed.
fn clear_attachment(host: &mut Host<'_>, path: &str, kind: EmbedKind) -> Result<()> {
    let noun = kind.noun();
    let parent = host.vault.parent_folder(path);
    let lone_occupant = parent
        .as_deref()
        .map(|folder| host.vault.child_count(folder) == 1)
        .unwrap_or(false);

    let destination = host.settings.delete_destination;
    if let Err(err) = remove_by_destination(host.vault, destination, path) {
        tracing::debug!(target: "embedflow::delete", path, %err, "file removal failed");
        host.notifier
            .notify(&format!("Failed to delete the {noun}!"), Some(SUCCESS_NOTICE));
        return Err(FlowError::FileSystem(err));
    }

    let done = match destination {
        DeleteDestination::Permanent => format!("{noun} deleted permanently!"),
        DeleteDestination::VaultTrash => format!("{noun} moved to the vault trash!"),
        DeleteDestination::SystemTrash => format!("{noun} moved to the system trash!"),
    };
    host.notifier.notify(&done, Some(SUCCESS_NOTICE));

    if lone_occupant && let Some(folder) = parent {
        match remove_by_destination(host.vault, destination, &folder) {
            Ok(()) => host
                .notifier
                .notify("Attachment folder removed as well.", Some(FOLDER_NOTICE)),
            Err(err) => {
                tracing::debug!(target: "embedflow::delete", %folder, %err, "folder cleanup failed");
            }
        }
    }
    Ok(())
}

fn remove_by_destination(
    vault: &mut dyn Vault,
    destination: DeleteDestination,
    path: &str,
) -> std::result::Result<(), crate::error::PlatformError> {
    match destination {
        DeleteDestination::Permanent => vault.delete(path),
        DeleteDestination::VaultTrash => vault.trash(path, false),
        DeleteDestination::SystemTrash => vault.trash(path, true),
    }
}

/// Rewrite the width annotation of the link under `context`.
///
/// Resize flows call this per throttled sample; `NotFound` is returned, not
/// surfaced, so a drag over stale content stays quiet.
pub fn apply_width(
    host: &mut Host<'_>,
    key: &LinkKey,
    width: u32,
    context: &EmbedContext,
) -> Result<ApplyOutcome> {
    let Some(doc) = host.document.as_deref_mut() else {
        return Err(FlowError::DetachedContext);
    };
    let Some(anchor) = doc.line_at(context.position) else {
        return Ok(ApplyOutcome::NotFound);
    };

    let in_table = context.block == BlockKind::Table;
    let matches = collect_matches(doc, anchor.index, context.block, |line| match key {
        LinkKey::Internal { name } => match_internal_links(line, name, width, in_table),
        LinkKey::External { url, alt } => match_external_links(line, url, alt, width, in_table),
    });

    let outcome = apply_unique_edit(doc, &matches, in_table);
    if outcome.is_applied()
        && let Some(post) = host.post_process.as_deref_mut()
    {
        post.width_applied(context.kind, width);
    }
    Ok(outcome)
}

/// Copy an attachment's image bytes to the clipboard.
fn copy_attachment(host: &mut Host<'_>, source_url: &str) -> Result<()> {
    let policy = BlobLoadPolicy::default();
    let bytes = match load_image_blob(host.fetcher, source_url, &policy) {
        Ok(bytes) => bytes,
        Err(err) => {
            host.notifier
                .notify("Failed to copy the file!", Some(SUCCESS_NOTICE));
            return Err(err);
        }
    };
    if let Err(err) = host.clipboard.write_image(&bytes) {
        host.notifier
            .notify("Failed to copy the file!", Some(SUCCESS_NOTICE));
        return Err(FlowError::FileSystem(err));
    }
    host.notifier
        .notify("Copied to clipboard!", Some(SUCCESS_NOTICE));
    Ok(())
}

/// Delete a note and the attachments only it references.
fn purge_note(host: &mut Host<'_>, note_path: &str) -> Result<()> {
    let doomed = plan_note_purge(host.index, note_path);
    let mut removed = 0usize;
    for path in &doomed {
        if clear_attachment(host, path, EmbedKind::GenericEmbed).is_ok() {
            removed += 1;
        }
    }

    remove_by_destination(host.vault, host.settings.delete_destination, note_path)
        .map_err(FlowError::FileSystem)?;
    host.notifier.notify(
        &format!("Note deleted together with {removed} attachment(s)."),
        Some(SUCCESS_NOTICE),
    );
    Ok(())
}
