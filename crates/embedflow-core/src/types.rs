//! Core types shared across the attachment engine.
//!
//! These types are host-agnostic. Spans and positions are measured in
//! Unicode scalar values (chars), never bytes or UTF-16 units, matching the
//! addressing of the host document seam.

use std::ops::Range;

use smol_str::SmolStr;

/// Half-open character span within a single line.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct Span {
    pub from: usize,
    pub to: usize,
}

impl Span {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    pub fn len(&self) -> usize {
        self.to.saturating_sub(self.from)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_range(&self) -> Range<usize> {
        self.from..self.to
    }
}

/// Which embed syntax produced an occurrence.
///
/// Wiki embeds (`![[target|suffix]]`) carry their size annotation on the
/// link target; inline embeds (`![alt|size](target)`) carry it on the alt
/// text. The rewrite rules differ accordingly.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Wiki,
    Inline,
}

/// Classification of the rendered element an action originates from.
///
/// A closed set: every consumer matches exhaustively instead of branching on
/// host tag-name strings.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum EmbedKind {
    Image,
    Video,
    Audio,
    Iframe,
    GenericEmbed,
}

impl EmbedKind {
    /// Noun used in user-facing notices.
    pub fn noun(&self) -> &'static str {
        match self {
            EmbedKind::Image => "Image",
            EmbedKind::Video | EmbedKind::Audio | EmbedKind::Iframe | EmbedKind::GenericEmbed => {
                "File"
            }
        }
    }
}

/// Line context of the clicked embed.
///
/// Chosen by the host from rendered-DOM ancestry (closest table vs. closest
/// callout), never inferred from the text itself. A line belongs to at most
/// one block kind per action.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Plain,
    Table,
    Callout,
}

/// A located, parsed attachment reference within one line of source text.
///
/// Invariant: `span.from < span.to <= line length` and `raw_text` equals the
/// line's slice at `span`, bracketing the full construct including the
/// leading `!`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkOccurrence {
    /// The exact substring matched, full link syntax included.
    pub raw_text: SmolStr,
    /// Character offsets within the line, half-open.
    pub span: Span,
    pub kind: LinkKind,
    /// The link target as written (percent-encoding preserved).
    pub target: SmolStr,
    /// Existing numeric `width` / `width|height` annotation, if any.
    pub size_suffix: Option<SmolStr>,
    /// Text to put in place of `raw_text`; empty for link removal.
    pub replacement: String,
}

/// A position in the host document: zero-based line, char column.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct TextPosition {
    pub line: usize,
    pub ch: usize,
}

impl TextPosition {
    pub fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_bounds() {
        let span = Span::new(3, 10);
        assert_eq!(span.len(), 7);
        assert!(!span.is_empty());
        assert_eq!(span.to_range(), 3..10);

        assert!(Span::new(4, 4).is_empty());
    }

    #[test]
    fn test_embed_kind_noun() {
        assert_eq!(EmbedKind::Image.noun(), "Image");
        assert_eq!(EmbedKind::Video.noun(), "File");
        assert_eq!(EmbedKind::GenericEmbed.noun(), "File");
    }
}
