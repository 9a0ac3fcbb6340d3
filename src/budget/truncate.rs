//! Content-aware truncation of tables and prose.
//!
//! Lengths are counted in characters, never bytes, and every cut lands on a
//! character boundary.

use std::sync::LazyLock;

use regex::Regex;

use crate::convert::table::{BLOCK_SEPARATOR, ROW_SEPARATOR, TABLE_CLOSE};

pub const TABLES_TRUNCATED_NOTICE: &str =
    "\n''(Tables truncated. See full metadata at source.)''";

pub const TABLES_OMITTED: &str =
    "''Tables omitted due to URL length limits. See full metadata at source.''";

pub const DESCRIPTION_TRUNCATED_NOTICE: &str =
    "\n\n''(Description truncated. See full metadata at source.)''";

pub const ELLIPSIS: &str = "...";

const PARAGRAPH_SEPARATOR: &str = "\n\n";

static SENTENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^.!?]+[.!?]+").unwrap());

pub(crate) fn char_len(src: &str) -> usize {
    src.chars().count()
}

fn take_chars(src: &str, n: usize) -> &str {
    match src.char_indices().nth(n) {
        Some((end, _)) => &src[..end],
        None => src,
    }
}

fn fits(candidate: &str, max_length: usize) -> bool {
    char_len(candidate) <= max_length
}

/// Shrinks wikitable blocks to `max_length` characters.
///
/// Whole trailing blocks go first, then trailing rows of the first block.
/// When not even the header row fits, a fixed omission sentence is returned
/// instead, which may itself be longer than `max_length`.
pub fn truncate_tables(tables: &str, max_length: usize) -> String {
    if tables.is_empty() || fits(tables, max_length) {
        return tables.to_owned();
    }

    let blocks = tables.split(BLOCK_SEPARATOR).collect::<Vec<_>>();
    for keep in (1..blocks.len()).rev() {
        let candidate = format!(
            "{}{TABLES_TRUNCATED_NOTICE}",
            blocks[..keep].join(BLOCK_SEPARATOR)
        );
        if fits(&candidate, max_length) {
            return candidate;
        }
    }

    let lines = blocks[0].lines().collect::<Vec<_>>();
    for cut in (1..lines.len()).rev() {
        if lines[cut] != ROW_SEPARATOR {
            continue;
        }
        let kept = &lines[..cut];
        if !kept.iter().any(|line| line.starts_with("{|")) {
            continue;
        }
        let candidate = format!(
            "{}\n{TABLE_CLOSE}{TABLES_TRUNCATED_NOTICE}",
            kept.join("\n")
        );
        if fits(&candidate, max_length) {
            return candidate;
        }
    }

    TABLES_OMITTED.to_owned()
}

/// Shrinks prose to `max_length` characters.
///
/// Cuts at paragraph boundaries when at least one paragraph fits, otherwise
/// at sentence boundaries, otherwise mid-text. Every cut is marked with
/// [`DESCRIPTION_TRUNCATED_NOTICE`].
pub fn truncate_description(description: &str, max_length: usize) -> String {
    if fits(description, max_length) {
        return description.to_owned();
    }
    let notice_len = char_len(DESCRIPTION_TRUNCATED_NOTICE);
    if max_length < notice_len {
        return DESCRIPTION_TRUNCATED_NOTICE.to_owned();
    }

    if let Some(kept) = accumulate(
        description.split(PARAGRAPH_SEPARATOR),
        PARAGRAPH_SEPARATOR,
        max_length - notice_len,
    ) {
        return format!("{kept}{DESCRIPTION_TRUNCATED_NOTICE}");
    }

    let marker_len = char_len(ELLIPSIS) + notice_len;
    if max_length < marker_len {
        return DESCRIPTION_TRUNCATED_NOTICE.to_owned();
    }

    if let Some(kept) = accumulate(
        SENTENCE.find_iter(description).map(|m| m.as_str()),
        "",
        max_length - marker_len,
    ) {
        return format!("{}{ELLIPSIS}{DESCRIPTION_TRUNCATED_NOTICE}", kept.trim_end());
    }

    let kept = take_chars(description, max_length - marker_len);
    format!("{}{ELLIPSIS}{DESCRIPTION_TRUNCATED_NOTICE}", kept.trim_end())
}

/// Joins leading pieces while the result stays within `limit`.
///
/// Returns `None` when not even the first piece fits.
fn accumulate<'s>(
    pieces: impl Iterator<Item = &'s str>,
    separator: &str,
    limit: usize,
) -> Option<String> {
    let mut kept = String::new();
    for piece in pieces {
        let candidate = if kept.is_empty() {
            piece.to_owned()
        } else {
            format!("{kept}{separator}{piece}")
        };
        if !fits(&candidate, limit) {
            break;
        }
        kept = candidate;
    }
    (!kept.trim().is_empty()).then_some(kept)
}
