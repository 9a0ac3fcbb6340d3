use std::fmt::Write;

/// Fields every rendering of the template carries, whatever gets truncated.
#[derive(Debug, Clone, Copy)]
pub struct Skeleton<'a> {
    pub title: &'a str,
    pub date: &'a str,
    pub source: &'a str,
    pub authors: &'a str,
    pub record_id: &'a str,
    pub categories: &'a [String],
}

/// The parts of the template the budget ladder is allowed to cut.
#[derive(Debug, Clone, Copy, Default)]
pub struct Content<'a> {
    pub description: &'a str,
    pub notes: Option<&'a str>,
    pub tables: &'a str,
}

pub const RECORD_MARKER: &str = "<!-- zenodo-record:";

/// Escapes record text placed inside a template argument.
///
/// A bare `|` would start a new argument and braces could close the
/// surrounding `{{en}}` or `{{Information}}` call early. Braces become
/// character references so they cannot pair up with template syntax.
fn escape_argument(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    for c in src.chars() {
        match c {
            '|' => out.push_str("{{!}}"),
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            c => out.push(c),
        }
    }
    out
}

impl Skeleton<'_> {
    pub fn render(&self, content: Content<'_>) -> String {
        let mut body = String::new();
        if !self.title.is_empty() {
            write!(body, "'''{}'''", escape_argument(self.title)).ok();
        }
        for part in [Some(content.description), content.notes]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
        {
            if !body.is_empty() {
                body.push_str("\n\n");
            }
            body.push_str(&escape_argument(part));
        }

        let mut out = String::new();
        writeln!(out, "=={{{{int:filedesc}}}}==").ok();
        writeln!(out, "{{{{Information").ok();
        writeln!(out, "|description={{{{en|1={body}}}}}").ok();
        writeln!(out, "|date={}", self.date).ok();
        writeln!(out, "|source={}", self.source).ok();
        writeln!(out, "|author={}", self.authors).ok();
        writeln!(out, "|permission=").ok();
        writeln!(out, "|other versions=").ok();
        writeln!(out, "}}}}").ok();
        writeln!(out, "{RECORD_MARKER} {} -->", self.record_id).ok();
        if !content.tables.is_empty() {
            writeln!(out).ok();
            writeln!(out, "{}", content.tables).ok();
        }
        if !self.categories.is_empty() {
            writeln!(out).ok();
            for category in self.categories {
                writeln!(out, "[[Category:{category}]]").ok();
            }
        }
        out
    }
}
