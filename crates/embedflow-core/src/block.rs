//! Contiguous-block scanning for table rows and callouts.
//!
//! A block is the maximal run of consecutive lines around the anchor whose
//! start matches the membership predicate, scanned forward and backward
//! independently. The anchor line is visited exactly once, in the forward
//! pass.

use lazy_regex::{Lazy, Regex, lazy_regex};

use crate::document::HostDocument;
use crate::types::{BlockKind, LinkOccurrence};

static TABLE_ROW_RE: Lazy<Regex> = lazy_regex!(r"^\s*\|");
static CALLOUT_RE: Lazy<Regex> = lazy_regex!(r"^>");

/// Line-start membership predicate for a block kind. None for `Plain`,
/// which has no block extent.
fn membership(kind: BlockKind) -> Option<&'static Regex> {
    match kind {
        BlockKind::Plain => None,
        BlockKind::Table => Some(&TABLE_ROW_RE),
        BlockKind::Callout => Some(&CALLOUT_RE),
    }
}

/// Collect matches from every line of the block containing `anchor_line`.
///
/// For `Plain` the scan degenerates to the anchor line alone. Matches are
/// tagged with their line index; nothing is deduplicated across directions.
pub fn collect_block_matches<D, F>(
    doc: &D,
    anchor_line: usize,
    kind: BlockKind,
    match_fn: F,
) -> Vec<(usize, LinkOccurrence)>
where
    D: HostDocument + ?Sized,
    F: Fn(&str) -> Vec<LinkOccurrence>,
{
    let mut found = Vec::new();

    let Some(predicate) = membership(kind) else {
        if let Some(text) = doc.line(anchor_line) {
            found.extend(match_fn(&text).into_iter().map(|occ| (anchor_line, occ)));
        }
        return found;
    };

    // Forward, anchor inclusive.
    let mut index = anchor_line;
    while index < doc.line_count() {
        let Some(text) = doc.line(index) else { break };
        if !predicate.is_match(&text) {
            break;
        }
        found.extend(match_fn(&text).into_iter().map(|occ| (index, occ)));
        index += 1;
    }

    // Backward from the line above the anchor.
    let mut index = anchor_line;
    while index > 0 {
        index -= 1;
        let Some(text) = doc.line(index) else { break };
        if !predicate.is_match(&text) {
            break;
        }
        found.extend(match_fn(&text).into_iter().map(|occ| (index, occ)));
    }

    tracing::trace!(
        target: "embedflow::block",
        anchor_line,
        ?kind,
        count = found.len(),
        "block scan"
    );
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::RopeDocument;
    use crate::link::find_links;

    fn doc(lines: &[&str]) -> RopeDocument {
        RopeDocument::from_str(&lines.join("\n"))
    }

    #[test]
    fn test_forward_scan_stops_at_block_boundary() {
        let doc = doc(&[
            "| ![[a.png]] |",
            "| row |",
            "| ![[b.png]] |",
            "after the table ![[a.png]]",
            "| detached row ![[a.png]] |",
        ]);
        let found = collect_block_matches(&doc, 1, BlockKind::Table, |line| {
            find_links(line, "a.png")
        });
        // Row 3 breaks the run; rows 3 and 4 are never visited.
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, 0);
    }

    #[test]
    fn test_backward_scan_stops_at_boundary() {
        let doc = doc(&[
            "plain text",
            "> callout ![[a.png]]",
            "> callout ![[a.png]]",
            "plain again",
        ]);
        let found = collect_block_matches(&doc, 2, BlockKind::Callout, |line| {
            find_links(line, "a.png")
        });
        assert_eq!(found.len(), 2);
        let mut lines: Vec<usize> = found.iter().map(|(i, _)| *i).collect();
        lines.sort_unstable();
        assert_eq!(lines, vec![1, 2]);
    }

    #[test]
    fn test_anchor_visited_once() {
        let doc = doc(&["| ![[a.png]] |"]);
        let found = collect_block_matches(&doc, 0, BlockKind::Table, |line| {
            find_links(line, "a.png")
        });
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_plain_matches_anchor_only() {
        let doc = doc(&["![[a.png]]", "![[a.png]]"]);
        let found = collect_block_matches(&doc, 0, BlockKind::Plain, |line| {
            find_links(line, "a.png")
        });
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, 0);
    }

    #[test]
    fn test_indented_table_rows_are_members() {
        let doc = doc(&["  | ![[a.png]] |", "| row |"]);
        let found = collect_block_matches(&doc, 1, BlockKind::Table, |line| {
            find_links(line, "a.png")
        });
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, 0);
    }
}
