//! Locating attachment links on a line and computing their rewrites.
//!
//! The matchers are pure functions over one line of text. They run a
//! whole-line containment guard first (a fast path only — absence here says
//! nothing about other lines), then tokenize each syntax variant
//! independently and keep the occurrences whose content actually includes
//! the target identifier. Filenames with spaces appear verbatim in wiki
//! links but percent-encoded in inline links, so containment is checked in
//! both encodings, plus fully decoded as a fallback.
//!
//! Rewrites never touch the link target text, so percent-encoding in the
//! output is preserved exactly.

mod rewrite;
mod scan;

use lazy_regex::{Lazy, Regex, lazy_regex};
use percent_encoding::percent_decode_str;
use smol_str::SmolStr;

use crate::types::{LinkKind, LinkOccurrence};

use rewrite::{pure_caption, rewrite_inline, rewrite_wiki, split_inline, split_wiki_body, wiki_size_suffix};
use scan::{LinkToken, LinkTokenizer};

/// `name.ext` at the end of a path, with an optional leading slash.
static FILE_BASE_NAME_RE: Lazy<Regex> = lazy_regex!(r"/?([^/\n]+\.\w+)");

/// Extract the base file name (`name.ext`) from an embed `src` path.
pub fn file_base_name(src: &str) -> Option<SmolStr> {
    FILE_BASE_NAME_RE
        .captures(src)
        .and_then(|c| c.get(1))
        .map(|m| SmolStr::new(m.as_str()))
}

pub(crate) fn percent_decode(text: &str) -> String {
    percent_decode_str(text).decode_utf8_lossy().to_string()
}

/// The identifier being searched for, in every encoding it may appear under.
struct TargetForms {
    raw: String,
    encoded: String,
    decoded: String,
}

impl TargetForms {
    fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            encoded: raw.replace(' ', "%20"),
            decoded: percent_decode(raw),
        }
    }

    /// Whole-line guard. Absence of a match here does not imply the
    /// identifier is absent from a different line.
    fn line_may_contain(&self, line: &str) -> bool {
        line.contains(&self.raw) || line.contains(&self.encoded)
    }

    /// Per-occurrence containment, checked even though the line guard
    /// passed: guards operate on the whole line, matching per occurrence.
    fn occurs_in(&self, text: &str) -> bool {
        text.contains(&self.raw)
            || text.contains(&self.encoded)
            || percent_decode(text).contains(&self.decoded)
    }
}

fn occurrence(token: &LinkToken<'_>, target: &str, size: Option<SmolStr>, replacement: String) -> LinkOccurrence {
    debug_assert!(token.span.from < token.span.to);
    LinkOccurrence {
        raw_text: SmolStr::new(token.text),
        span: token.span,
        kind: token.kind,
        target: SmolStr::new(target),
        size_suffix: size,
        replacement,
    }
}

/// Find every wiki or inline embed of `target_name` on `line` and compute
/// its width rewrite. `new_width` of 0 removes the annotation.
pub fn match_internal_links(
    line: &str,
    target_name: &str,
    new_width: u32,
    in_table: bool,
) -> Vec<LinkOccurrence> {
    let forms = TargetForms::new(target_name);
    if !forms.line_may_contain(line) {
        return Vec::new();
    }

    let mut found = Vec::new();

    for token in LinkTokenizer::new(line, LinkKind::Wiki) {
        if !forms.occurs_in(token.text) {
            continue;
        }
        let Some((target, suffix)) = split_wiki_body(token.text, in_table) else {
            continue;
        };
        let Some(replacement) = rewrite_wiki(token.text, new_width, in_table) else {
            continue;
        };
        found.push(occurrence(&token, &target, wiki_size_suffix(&suffix), replacement));
    }

    for token in LinkTokenizer::new(line, LinkKind::Inline) {
        if !forms.occurs_in(token.text) {
            continue;
        }
        let Some((alt, target)) = split_inline(token.text) else {
            continue;
        };
        let (_, size) = pure_caption(alt, in_table);
        let Some(replacement) = rewrite_inline(token.text, new_width, in_table) else {
            continue;
        };
        found.push(occurrence(&token, target, size, replacement));
    }

    tracing::trace!(
        target: "embedflow::link",
        target_name,
        new_width,
        in_table,
        count = found.len(),
        "matched internal links"
    );
    found
}

/// Find every inline embed of an external `url` on `line` and compute its
/// width rewrite. When `alt` is non-empty, occurrences must also carry that
/// caption, which disambiguates repeated embeds of one URL.
pub fn match_external_links(
    line: &str,
    url: &str,
    alt: &str,
    new_width: u32,
    in_table: bool,
) -> Vec<LinkOccurrence> {
    let forms = TargetForms::new(url);
    if !forms.line_may_contain(line) {
        return Vec::new();
    }

    let mut found = Vec::new();
    for token in LinkTokenizer::new(line, LinkKind::Inline) {
        let Some((token_alt, target)) = split_inline(token.text) else {
            continue;
        };
        if !forms.occurs_in(target) {
            continue;
        }
        let (caption, size) = pure_caption(token_alt, in_table);
        if !alt.is_empty() && caption != alt {
            continue;
        }
        let Some(replacement) = rewrite_inline(token.text, new_width, in_table) else {
            continue;
        };
        found.push(occurrence(&token, target, size, replacement));
    }

    tracing::trace!(
        target: "embedflow::link",
        url,
        new_width,
        in_table,
        count = found.len(),
        "matched external links"
    );
    found
}

/// Find every embed of `target_name` on `line`, both syntaxes, with an
/// empty replacement: the removal form used by the deletion flow.
pub fn find_links(line: &str, target_name: &str) -> Vec<LinkOccurrence> {
    let forms = TargetForms::new(target_name);
    if !forms.line_may_contain(line) {
        return Vec::new();
    }

    let mut found = Vec::new();

    for token in LinkTokenizer::new(line, LinkKind::Wiki) {
        if !forms.occurs_in(token.text) {
            continue;
        }
        let Some((target, suffix)) = split_wiki_body(token.text, false) else {
            continue;
        };
        // A table-row wiki target keeps a trailing backslash when split
        // without normalization; drop it for the parsed target.
        let target = target.trim_end_matches('\\');
        found.push(occurrence(&token, target, wiki_size_suffix(&suffix), String::new()));
    }

    for token in LinkTokenizer::new(line, LinkKind::Inline) {
        if !forms.occurs_in(token.text) {
            continue;
        }
        let Some((alt, target)) = split_inline(token.text) else {
            continue;
        };
        let (_, size) = pure_caption(alt, false);
        found.push(occurrence(&token, target, size, String::new()));
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Span;

    #[test]
    fn test_single_occurrence_exact_span() {
        let line = "Some text ![[photo.jpg|100]] more text";
        let found = match_internal_links(line, "photo.jpg", 250, false);
        assert_eq!(found.len(), 1);
        let occ = &found[0];
        assert_eq!(occ.raw_text, "![[photo.jpg|100]]");
        assert_eq!(occ.span, Span::new(10, 28));
        assert_eq!(occ.kind, LinkKind::Wiki);
        assert_eq!(occ.target, "photo.jpg");
        assert_eq!(occ.size_suffix.as_deref(), Some("100"));
        assert_eq!(occ.replacement, "![[photo.jpg|250]]");
    }

    #[test]
    fn test_absent_target_returns_empty() {
        assert!(match_internal_links("no links here", "pic.png", 100, false).is_empty());
        assert!(match_internal_links("![[other.png]]", "pic.png", 100, false).is_empty());
    }

    #[test]
    fn test_guard_passes_but_occurrence_filtered() {
        // The line contains the name outside any link; the only link points
        // elsewhere, so nothing matches.
        let line = "pic.png is shown by ![[other.png]]";
        assert!(match_internal_links(line, "pic.png", 100, false).is_empty());
    }

    #[test]
    fn test_spaced_name_matches_encoded_inline() {
        let line = "![](a%20b.png)";
        let found = match_internal_links(line, "a b.png", 120, false);
        assert_eq!(found.len(), 1);
        // Percent-encoding in the target is preserved by the rewrite.
        assert_eq!(found[0].replacement, "![120](a%20b.png)");
    }

    #[test]
    fn test_spaced_name_matches_raw_wiki() {
        let line = "![[a b.png|90]]";
        let found = match_internal_links(line, "a b.png", 120, false);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].replacement, "![[a b.png|120]]");
    }

    #[test]
    fn test_duplicate_links_all_reported() {
        let line = "![[pic.png]] and ![[pic.png]]";
        let found = match_internal_links(line, "pic.png", 100, false);
        assert_eq!(found.len(), 2);
        assert_ne!(found[0].span, found[1].span);
    }

    #[test]
    fn test_external_match_with_alt_filter() {
        let line = "![one](https://host/img.png) ![two](https://host/img.png)";
        let all = match_external_links(line, "https://host/img.png", "", 320, false);
        assert_eq!(all.len(), 2);

        let filtered = match_external_links(line, "https://host/img.png", "two", 320, false);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].replacement, "![two|320](https://host/img.png)");
    }

    #[test]
    fn test_external_table_rewrite() {
        let line = "| ![my pic|150](a%20b.png) |";
        let found = match_external_links(line, "a%20b.png", "my pic", 75, true);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].replacement, r"![my pic\|75](a%20b.png)");
    }

    #[test]
    fn test_find_links_for_removal() {
        let line = "a ![[pic.png|100]] b ![pic](pic.png) c";
        let found = find_links(line, "pic.png");
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|o| o.replacement.is_empty()));
        assert_eq!(found[0].kind, LinkKind::Wiki);
        assert_eq!(found[1].kind, LinkKind::Inline);
    }

    #[test]
    fn test_file_base_name() {
        assert_eq!(file_base_name("folder/sub/pic.png").as_deref(), Some("pic.png"));
        assert_eq!(file_base_name("/pic.png").as_deref(), Some("pic.png"));
        assert_eq!(file_base_name("pic.png").as_deref(), Some("pic.png"));
        assert_eq!(file_base_name("no-extension"), None);
    }
}
