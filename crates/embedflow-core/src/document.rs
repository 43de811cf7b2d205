//! Host document access.
//!
//! `HostDocument` is the seam to the editor that owns the note text. The
//! engine never mutates a cached copy of the document: every edit goes
//! through [`HostDocument::replace_range`] so the host's undo stack and
//! concurrent rendering stay coherent. [`RopeDocument`] is the bundled
//! implementation, used by native hosts and the test suite.
//!
//! All offsets are Unicode scalar values (chars), not bytes.

use smol_str::SmolStr;

use crate::types::TextPosition;

/// One line of the document, located by character offset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineRef {
    /// Line text without the trailing line break.
    pub text: SmolStr,
    /// Zero-based line index.
    pub index: usize,
    /// Char offset of the line start within the document.
    pub start: usize,
}

/// Text access and mutation on the host's document buffer.
pub trait HostDocument {
    /// Number of lines in the document.
    fn line_count(&self) -> usize;

    /// Line text without its trailing line break. None when out of range.
    fn line(&self, index: usize) -> Option<SmolStr>;

    /// Locate the line containing a document-wide char offset.
    fn line_at(&self, char_offset: usize) -> Option<LineRef>;

    /// Replace the text between two positions.
    ///
    /// This is the only mutation primitive; a disambiguated edit issues
    /// exactly one call.
    fn replace_range(&mut self, from: TextPosition, to: TextPosition, text: &str);

    /// Replace a full line, preserving its line break.
    fn replace_line(&mut self, index: usize, text: &str) {
        if let Some(old) = self.line(index) {
            let end = old.chars().count();
            self.replace_range(
                TextPosition::new(index, 0),
                TextPosition::new(index, end),
                text,
            );
        }
    }
}

/// Ropey-backed document for hosts without a native buffer and for tests.
///
/// O(log n) edits and offset conversions.
#[derive(Clone, Default)]
pub struct RopeDocument {
    rope: ropey::Rope,
}

impl RopeDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_str(text: &str) -> Self {
        Self {
            rope: ropey::Rope::from_str(text),
        }
    }

    /// Full document text.
    pub fn content(&self) -> String {
        self.rope.to_string()
    }

    /// Access the underlying rope for advanced operations.
    pub fn rope(&self) -> &ropey::Rope {
        &self.rope
    }

    fn position_to_char(&self, pos: TextPosition) -> usize {
        self.rope.line_to_char(pos.line) + pos.ch
    }
}

impl HostDocument for RopeDocument {
    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn line(&self, index: usize) -> Option<SmolStr> {
        if index >= self.rope.len_lines() {
            return None;
        }
        let line = self.rope.line(index).to_string();
        Some(SmolStr::new(line.trim_end_matches(['\n', '\r'])))
    }

    fn line_at(&self, char_offset: usize) -> Option<LineRef> {
        if char_offset > self.rope.len_chars() {
            return None;
        }
        let index = self.rope.char_to_line(char_offset);
        let start = self.rope.line_to_char(index);
        Some(LineRef {
            text: self.line(index)?,
            index,
            start,
        })
    }

    fn replace_range(&mut self, from: TextPosition, to: TextPosition, text: &str) {
        let start = self.position_to_char(from);
        let end = self.position_to_char(to);
        self.rope.remove(start..end);
        self.rope.insert(start, text);
    }
}

impl From<&str> for RopeDocument {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}
