//! Width-annotation rewrite rules.
//!
//! Wiki embeds carry the size as a pipe-delimited suffix on the link target
//! (`![[pic.png|320]]`); inline embeds carry it on the alt text
//! (`![alt|320](url)`). Inside table rows every literal `|` must appear as
//! `\|`, so table bodies are normalized before splitting and re-escaped on
//! output. A width of 0 removes the annotation entirely.

use smol_str::SmolStr;

const ESCAPED_PIPE: &str = r"\|";

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Stale suffix elements: purely numeric (old width/height) or blank.
fn is_numeric_or_blank(s: &str) -> bool {
    let trimmed = s.trim();
    trimmed.is_empty() || is_numeric(trimmed)
}

fn separator(in_table: bool) -> &'static str {
    if in_table { ESCAPED_PIPE } else { "|" }
}

// === Wiki embeds ===

/// Split a wiki token into target and suffix elements, normalizing `\|`
/// separators when the token sits in a table row.
pub(crate) fn split_wiki_body(raw: &str, in_table: bool) -> Option<(String, Vec<String>)> {
    let body = raw.strip_prefix("![[")?.strip_suffix("]]")?;
    let normalized = if in_table {
        body.replace(ESCAPED_PIPE, "|")
    } else {
        body.to_string()
    };
    let mut parts = normalized.split('|').map(str::to_string);
    let target = parts.next().unwrap_or_default();
    Some((target, parts.collect()))
}

/// Existing numeric annotation of a wiki suffix (`320` or `320|240`).
pub(crate) fn wiki_size_suffix(suffix: &[String]) -> Option<SmolStr> {
    let numeric: Vec<&str> = suffix
        .iter()
        .map(|s| s.trim())
        .filter(|s| is_numeric(s))
        .collect();
    if numeric.is_empty() {
        None
    } else {
        Some(SmolStr::new(numeric.join("|")))
    }
}

/// Rebuild a wiki token with a new width, dropping stale numeric suffixes
/// and keeping captions. Returns None when the token is not wiki syntax.
pub(crate) fn rewrite_wiki(raw: &str, new_width: u32, in_table: bool) -> Option<String> {
    let (target, suffix) = split_wiki_body(raw, in_table)?;
    let sep = separator(in_table);

    let mut out = String::from("![[");
    out.push_str(&target);
    for part in suffix.iter().filter(|p| !is_numeric_or_blank(p)) {
        out.push_str(sep);
        out.push_str(part);
    }
    if new_width > 0 {
        out.push_str(sep);
        out.push_str(&new_width.to_string());
    }
    out.push_str("]]");
    Some(out)
}

// === Inline embeds ===

/// Split an inline token into alt and target. The alt cannot contain
/// brackets, so the first `](` is the boundary.
pub(crate) fn split_inline(raw: &str) -> Option<(&str, &str)> {
    let rest = raw.strip_prefix("![")?;
    let close = rest.find("](")?;
    let target = rest[close + 2..].strip_suffix(')')?;
    Some((&rest[..close], target))
}

/// Reduce an alt text to its caption, stripping a trailing `|digits` or
/// `|digits|digits` size annotation. A purely numeric or blank alt is the
/// bare-width shorthand and reduces to an empty caption. Also reports the
/// stripped size.
pub(crate) fn pure_caption(alt: &str, in_table: bool) -> (String, Option<SmolStr>) {
    let mut alt = if in_table {
        alt.replace(ESCAPED_PIPE, "|")
    } else {
        alt.to_string()
    };

    let mut stripped: Vec<String> = Vec::new();
    for _ in 0..2 {
        let Some(idx) = alt.rfind('|') else { break };
        if !is_numeric(&alt[idx + 1..]) {
            break;
        }
        stripped.insert(0, alt[idx + 1..].to_string());
        alt.truncate(idx);
    }

    if is_numeric_or_blank(&alt) {
        if is_numeric(alt.trim()) {
            stripped.insert(0, alt.trim().to_string());
        }
        alt.clear();
    }

    let size = if stripped.is_empty() {
        None
    } else {
        Some(SmolStr::new(stripped.join("|")))
    };
    (alt, size)
}

/// Rebuild an inline token with a new width on the alt text.
///
/// An empty caption emits the bare-width shorthand: `![w](target)` outside
/// tables, `![\|w](target)` inside them (the escaped form round-trips
/// byte-identically and introduces no unescaped pipe).
pub(crate) fn rewrite_inline(raw: &str, new_width: u32, in_table: bool) -> Option<String> {
    let (alt, target) = split_inline(raw)?;
    let (caption, _) = pure_caption(alt, in_table);
    let sep = separator(in_table);

    let caption_out = if in_table {
        caption.replace('|', ESCAPED_PIPE)
    } else {
        caption
    };

    let alt_out = match (caption_out.is_empty(), new_width) {
        (true, 0) => String::new(),
        (true, w) if in_table => format!("{ESCAPED_PIPE}{w}"),
        (true, w) => w.to_string(),
        (false, 0) => caption_out,
        (false, w) => format!("{caption_out}{sep}{w}"),
    };

    Some(format!("![{alt_out}]({target})"))
}
