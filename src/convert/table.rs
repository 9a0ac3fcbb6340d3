use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;
use tracing::debug;

use super::inline;

pub const TABLE_OPEN: &str = "{| class=\"wikitable\"";
pub const TABLE_CLOSE: &str = "|}";
pub const ROW_SEPARATOR: &str = "|-";
/// Blank line between consecutive table blocks.
pub const BLOCK_SEPARATOR: &str = "\n\n";

pub(super) static TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<table\b[^>]*>(.*?)</table\s*>").unwrap());

static ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr\s*>").unwrap());

static CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<(th|td)\b[^>]*>(.*?)</(?:th|td)\s*>").unwrap());

static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Header,
    Data,
}

impl CellKind {
    fn marker(self) -> char {
        match self {
            CellKind::Header => '!',
            CellKind::Data => '|',
        }
    }
}

/// Cell content lives on a single wikitable line, so line breaks fold to spaces.
fn cell_text(src: &str) -> String {
    let src = inline::emphasis(src);
    let src = LINE_BREAK.replace_all(&src, " ");
    let src = inline::strip_tags(&src);
    let src = inline::drop_degenerate_quotes(&src);
    let src = inline::decode_entities(&src);
    WHITESPACE.replace_all(&src, " ").trim().to_owned()
}

/// Converts the inner HTML of one `<table>` into a wikitable block.
///
/// Returns `None` when the table has no cells at all.
pub(super) fn convert_table(inner: &str) -> Option<String> {
    let rows = ROW
        .captures_iter(inner)
        .map(|row| {
            CELL.captures_iter(&row[1])
                .map(|cell| {
                    let kind = if cell[1].eq_ignore_ascii_case("th") {
                        CellKind::Header
                    } else {
                        CellKind::Data
                    };
                    let text = cell_text(&cell[2]);
                    format!("{} {text}", kind.marker()).trim_end().to_owned()
                })
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect::<Vec<_>>();
    if rows.is_empty() {
        debug!("skipping table without cells");
        return None;
    }

    let mut lines = vec![TABLE_OPEN.to_owned()];
    for (i, cells) in rows.into_iter().enumerate() {
        if i > 0 {
            lines.push(ROW_SEPARATOR.to_owned());
        }
        lines.extend(cells);
    }
    lines.push(TABLE_CLOSE.to_owned());
    Some(lines.join("\n"))
}

/// Converts every `<table>` in document order and joins the blocks.
pub(super) fn extract_tables(html: &str) -> String {
    TABLE
        .captures_iter(html)
        .filter_map(|table| convert_table(&table[1]))
        .join(BLOCK_SEPARATOR)
}
