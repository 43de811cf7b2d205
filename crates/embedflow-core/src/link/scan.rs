//! Line tokenizer for embedded-link syntax.
//!
//! Scanning is a greedy left-to-right pass over one line: each call to
//! `next` finds the first match at or after the end of the previous one, so
//! occurrences never overlap. This is targeted pattern matching, not
//! markdown parsing — block structure is the host renderer's problem.

use lazy_regex::{Lazy, Regex, lazy_regex};

use crate::types::{LinkKind, Span};

/// `![[target|suffix]]` — the body may not contain brackets.
static WIKI_EMBED_RE: Lazy<Regex> = lazy_regex!(r"!\[\[[^\[\]]*?\]\]");

/// `![alt](target)` — the alt may not contain brackets; the target may not
/// contain whitespace, parentheses, brackets, braces, or quotes.
static INLINE_EMBED_RE: Lazy<Regex> = lazy_regex!(r"!\[[^\[\]]*?\]\([^\s)(\[\]{}']*\)");

/// One raw syntactic candidate on a line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LinkToken<'a> {
    pub text: &'a str,
    /// Char offsets within the line.
    pub span: Span,
    pub kind: LinkKind,
}

/// Iterator over non-overlapping link candidates of one syntax variant.
pub(crate) struct LinkTokenizer<'a> {
    line: &'a str,
    kind: LinkKind,
    /// Byte offset to resume scanning from.
    at: usize,
    /// Char offset corresponding to `at`, to avoid re-counting the prefix.
    chars_before: usize,
}

impl<'a> LinkTokenizer<'a> {
    pub fn new(line: &'a str, kind: LinkKind) -> Self {
        Self {
            line,
            kind,
            at: 0,
            chars_before: 0,
        }
    }

    fn pattern(kind: LinkKind) -> &'static Regex {
        match kind {
            LinkKind::Wiki => &WIKI_EMBED_RE,
            LinkKind::Inline => &INLINE_EMBED_RE,
        }
    }
}

impl<'a> Iterator for LinkTokenizer<'a> {
    type Item = LinkToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let m = Self::pattern(self.kind).find_at(self.line, self.at)?;

        let from = self.chars_before + self.line[self.at..m.start()].chars().count();
        let len = m.as_str().chars().count();

        self.at = m.end();
        self.chars_before = from + len;

        Some(LinkToken {
            text: m.as_str(),
            span: Span::new(from, from + len),
            kind: self.kind,
        })
    }
}
