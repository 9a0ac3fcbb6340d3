//! HTML description → wiki markup.
//!
//! Only the narrow subset record descriptions actually use is understood:
//! emphasis, paragraphs, line breaks, list items and tables. Everything else
//! is stripped down to its text. Tables are pulled out before anything else
//! so they can be budgeted separately from the prose.
//!
//! Nested tables are not supported: the outer table ends at the first
//! `</table>` and whatever follows degrades to plain text.

use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;

mod inline;
pub mod table;

static PARAGRAPH_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<p\b[^>]*>").unwrap());

static PARAGRAPH_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</p\s*>").unwrap());

static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());

static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<li\b[^>]*>").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertedText {
    /// Prose in wiki markup, one non-empty trimmed line per line.
    pub description: String,
    /// Wikitable blocks separated by [`table::BLOCK_SEPARATOR`].
    pub tables: String,
}

impl ConvertedText {
    /// Appends another conversion's tables after ours, keeping block order.
    pub fn append_tables(&mut self, tables: &str) {
        if tables.is_empty() {
            return;
        }
        if !self.tables.is_empty() {
            self.tables.push_str(table::BLOCK_SEPARATOR);
        }
        self.tables.push_str(tables);
    }
}

pub fn convert<'a>(html: impl Into<Option<&'a str>>) -> ConvertedText {
    let Some(html) = html.into().filter(|html| !html.is_empty()) else {
        return ConvertedText::default();
    };

    let tables = table::extract_tables(html);
    let prose = table::TABLE.replace_all(html, "\n");

    let prose = inline::emphasis(&prose);
    let prose = PARAGRAPH_CLOSE.replace_all(&prose, "\n\n");
    let prose = PARAGRAPH_OPEN.replace_all(&prose, "");
    let prose = LINE_BREAK.replace_all(&prose, "\n");
    let prose = LIST_ITEM.replace_all(&prose, "\n* ");
    let prose = inline::strip_tags(&prose);
    let prose = inline::drop_degenerate_quotes(&prose);
    let prose = inline::decode_entities(&prose);

    let description = prose
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .join("\n");

    ConvertedText {
        description,
        tables,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(convert(""), ConvertedText::default());
        assert_eq!(convert(None::<&str>), ConvertedText::default());
    }

    #[test]
    fn test_bold_paragraph() {
        let converted = convert("<p>This is <strong>bold</strong> text</p>");
        assert_eq!(converted.description, "This is '''bold''' text");
        assert_eq!(converted.tables, "");
    }

    #[test]
    fn test_italic_and_breaks() {
        let converted = convert("<p>An <em>italic</em> word<br>next <i>line</i><br />last</p>");
        assert_eq!(converted.description, "An ''italic'' word\nnext ''line''\nlast");
    }

    #[test]
    fn test_paragraphs_collapse_to_lines() {
        let converted = convert("<p>First</p>\n\n<p>  Second  </p>");
        assert_eq!(converted.description, "First\nSecond");
    }

    #[test]
    fn test_list_items() {
        let converted = convert("<p>Contents:</p><ul><li>one</li><li>two</li></ul>");
        assert_eq!(converted.description, "Contents:\n* one\n* two");
    }

    #[test]
    fn test_empty_emphasis_is_dropped() {
        let converted = convert("<p>a<strong></strong>b<em></em>c</p>");
        assert_eq!(converted.description, "abc");
    }

    #[test]
    fn test_unknown_tags_are_stripped() {
        let converted = convert(
            "<div class=\"x\"><span>kept</span> <a href=\"https://example.org\">link</a></div>",
        );
        assert_eq!(converted.description, "kept link");
    }

    #[test]
    fn test_entities_decode_after_stripping() {
        let converted = convert("<p>&lt;script&gt; &amp; &Delta;T &quot;q&quot; it&#39;s</p>");
        assert_eq!(converted.description, "<script> & ΔT \"q\" it's");
    }

    #[test]
    fn test_malformed_html_keeps_text() {
        let converted = convert("<p>open <strong>never closed <em>x</p");
        assert_eq!(converted.description, "open never closed x</p");
    }

    #[test]
    fn test_table_isolation() {
        let converted = convert(
            "<p>Before the table.</p>\
             <table><tr><th>Study</th></tr><tr><td>Ultrastructure of cells</td></tr></table>\
             <p>After the table.</p>",
        );
        assert_eq!(converted.description, "Before the table.\nAfter the table.");
        assert!(!converted.description.contains("wikitable"));
        assert!(converted.tables.starts_with(table::TABLE_OPEN));
        assert!(converted.tables.contains("! Study"));
        assert!(converted.tables.contains("| Ultrastructure of cells"));
        assert!(converted.tables.ends_with(table::TABLE_CLOSE));
    }

    #[test]
    fn test_append_tables() {
        let mut converted = ConvertedText::default();
        converted.append_tables("");
        assert_eq!(converted.tables, "");
        converted.append_tables("A");
        converted.append_tables("B");
        assert_eq!(converted.tables, "A\n\nB");
    }
}
