//! Single-edit disambiguation.
//!
//! The engine never guesses which of several identical links produced the
//! clicked element: anything other than exactly one candidate leaves the
//! document untouched and is reported back. Ambiguity and absence are
//! terminal for the invocation — no retries, no heuristics.

use crate::document::HostDocument;
use crate::types::{LinkOccurrence, TextPosition};

/// Result of attempting a disambiguated edit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The unique match was rewritten in place.
    Applied { line: usize },
    /// Target absent from the scan range; nothing touched.
    NotFound,
    /// Multiple equally-valid candidates; nothing touched.
    Ambiguous { count: usize },
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied { .. })
    }
}

/// Apply the single edit described by `matches`, if unambiguous.
///
/// Exactly one range-replace is issued. Table rows are rewritten as a whole
/// line (`prefix + replacement + suffix`): cell edits change the line
/// length, and whole-line replacement keeps the offset semantics of
/// multi-cell lines unambiguous.
pub fn apply_unique_edit<D>(
    doc: &mut D,
    matches: &[(usize, LinkOccurrence)],
    in_table: bool,
) -> ApplyOutcome
where
    D: HostDocument + ?Sized,
{
    let (line_index, occurrence) = match matches {
        [] => return ApplyOutcome::NotFound,
        [single] => single,
        many => {
            return ApplyOutcome::Ambiguous { count: many.len() };
        }
    };

    if in_table {
        let Some(text) = doc.line(*line_index) else {
            return ApplyOutcome::NotFound;
        };
        let prefix: String = text.chars().take(occurrence.span.from).collect();
        let suffix: String = text.chars().skip(occurrence.span.to).collect();
        let rebuilt = format!("{prefix}{}{suffix}", occurrence.replacement);
        doc.replace_line(*line_index, &rebuilt);
    } else {
        doc.replace_range(
            TextPosition::new(*line_index, occurrence.span.from),
            TextPosition::new(*line_index, occurrence.span.to),
            &occurrence.replacement,
        );
    }

    tracing::debug!(
        target: "embedflow::apply",
        line = line_index,
        raw = %occurrence.raw_text,
        replacement = %occurrence.replacement,
        "applied link edit"
    );
    ApplyOutcome::Applied { line: *line_index }
}
