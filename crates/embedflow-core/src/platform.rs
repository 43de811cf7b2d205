//! Host collaborator seams.
//!
//! These traits define the interface between the engine and the host
//! application (vault storage, link index, notices, clipboard). The engine
//! holds no durable state of its own; everything it needs to persist or
//! display goes through one of these. In-memory implementations back the
//! test suite and double as references for host authors.

use std::collections::BTreeMap;
use std::time::Duration;

use smol_str::SmolStr;

use crate::error::PlatformError;
use crate::types::EmbedKind;

/// User-facing notices.
///
/// `timeout` of None means the notice persists until dismissed, used where
/// silent data loss would otherwise go unnoticed.
pub trait Notifier {
    fn notify(&mut self, message: &str, timeout: Option<Duration>);
}

/// File storage operations. All destructive; all may fail.
pub trait Vault {
    /// Move a file (or folder) to the vault trash, or the system trash when
    /// `system` is set.
    fn trash(&mut self, path: &str, system: bool) -> Result<(), PlatformError>;

    /// Remove a file (or folder) permanently.
    fn delete(&mut self, path: &str) -> Result<(), PlatformError>;

    /// Parent folder of a path, if it has one.
    fn parent_folder(&self, path: &str) -> Option<SmolStr>;

    /// Number of direct children of a folder.
    fn child_count(&self, folder: &str) -> usize;
}

/// The host-maintained backlink index: for each document, the files it
/// references and how many links point at each.
///
/// Reference information is computed fresh per request — the index can
/// change between invocations, so results are never cached here.
pub trait LinkIndex {
    fn documents(&self) -> Vec<SmolStr>;

    /// `(target path, link count)` pairs for one document.
    fn links_from(&self, document: &str) -> Vec<(SmolStr, usize)>;

    /// Resolve a rendered element's base file name to a vault path, using
    /// the current document's own references.
    fn resolve_base_name(&self, current_document: &str, base_name: &str) -> Option<SmolStr> {
        let base = base_name.strip_prefix('/').unwrap_or(base_name);
        self.links_from(current_document)
            .into_iter()
            .map(|(path, _)| path)
            .find(|path| path.contains(base))
    }
}

/// Clipboard write access.
pub trait ClipboardSink {
    fn write_image(&mut self, bytes: &[u8]) -> Result<(), PlatformError>;
}

/// Fetches attachment bytes from a URL within a time budget.
///
/// The budget is the remaining share of the flow deadline; implementations
/// must give up once it elapses rather than hang.
pub trait BlobFetcher {
    fn fetch(&mut self, url: &str, budget: Duration) -> Result<Vec<u8>, PlatformError>;
}

/// Optional hook for hosts that patch rendered output after a width lands
/// (e.g. syncing a video element's width attribute). The engine works the
/// same whether or not one is present.
pub trait RenderPostProcess {
    fn width_applied(&mut self, kind: EmbedKind, width: u32);
}

// === In-memory implementations ===

/// Records notices instead of displaying them.
#[derive(Default)]
pub struct MemoryNotifier {
    pub messages: Vec<(String, Option<Duration>)>,
}

impl Notifier for MemoryNotifier {
    fn notify(&mut self, message: &str, timeout: Option<Duration>) {
        self.messages.push((message.to_string(), timeout));
    }
}

/// A flat set of file paths with `/`-separated folders.
#[derive(Default)]
pub struct MemoryVault {
    files: Vec<SmolStr>,
    /// Paths moved to trash, with the system-trash flag.
    pub trashed: Vec<(SmolStr, bool)>,
    /// Paths removed permanently.
    pub deleted: Vec<SmolStr>,
    /// When set, operations on this path fail.
    pub fail_on: Option<SmolStr>,
}

impl MemoryVault {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        Self {
            files: paths.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.iter().any(|f| f == path)
    }

    fn remove(&mut self, path: &str) -> Result<(), PlatformError> {
        if self.fail_on.as_deref() == Some(path) {
            return Err(PlatformError::from(format!("cannot remove '{path}'")));
        }
        // A folder path removes everything under it.
        let prefix = format!("{path}/");
        self.files.retain(|f| f != path && !f.starts_with(&prefix));
        Ok(())
    }
}

impl Vault for MemoryVault {
    fn trash(&mut self, path: &str, system: bool) -> Result<(), PlatformError> {
        self.remove(path)?;
        self.trashed.push((SmolStr::new(path), system));
        Ok(())
    }

    fn delete(&mut self, path: &str) -> Result<(), PlatformError> {
        self.remove(path)?;
        self.deleted.push(SmolStr::new(path));
        Ok(())
    }

    fn parent_folder(&self, path: &str) -> Option<SmolStr> {
        path.rfind('/').map(|idx| SmolStr::new(&path[..idx]))
    }

    fn child_count(&self, folder: &str) -> usize {
        let prefix = format!("{folder}/");
        self.files
            .iter()
            .filter(|f| {
                f.strip_prefix(&prefix)
                    .is_some_and(|rest| !rest.contains('/'))
            })
            .count()
    }
}

/// Backlink index backed by nested maps.
#[derive(Default)]
pub struct MemoryIndex {
    links: BTreeMap<SmolStr, BTreeMap<SmolStr, usize>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `document` links to `target` `count` times.
    pub fn insert(&mut self, document: &str, target: &str, count: usize) -> &mut Self {
        self.links
            .entry(SmolStr::new(document))
            .or_default()
            .insert(SmolStr::new(target), count);
        self
    }
}

impl LinkIndex for MemoryIndex {
    fn documents(&self) -> Vec<SmolStr> {
        self.links.keys().cloned().collect()
    }

    fn links_from(&self, document: &str) -> Vec<(SmolStr, usize)> {
        self.links
            .get(document)
            .map(|targets| {
                targets
                    .iter()
                    .map(|(path, count)| (path.clone(), *count))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Records written images.
#[derive(Default)]
pub struct MemoryClipboard {
    pub images: Vec<Vec<u8>>,
}

impl ClipboardSink for MemoryClipboard {
    fn write_image(&mut self, bytes: &[u8]) -> Result<(), PlatformError> {
        self.images.push(bytes.to_vec());
        Ok(())
    }
}
