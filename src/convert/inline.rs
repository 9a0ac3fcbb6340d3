use std::{borrow::Cow, sync::LazyLock};

use regex::{Captures, Regex};

static STRONG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<strong\b[^>]*>(.*?)</strong\s*>").unwrap());

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<b\b[^>]*>(.*?)</b\s*>").unwrap());

static EM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<em\b[^>]*>(.*?)</em\s*>").unwrap());

static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<i\b[^>]*>(.*?)</i\s*>").unwrap());

static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

static QUOTE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"'{2,}").unwrap());

/// Rewrites `<strong>`/`<b>` to `'''…'''` and `<em>`/`<i>` to `''…''`.
pub(crate) fn emphasis(src: &str) -> String {
    let src = STRONG.replace_all(src, "'''$1'''");
    let src = BOLD.replace_all(&src, "'''$1'''");
    let src = EM.replace_all(&src, "''$1''");
    ITALIC.replace_all(&src, "''$1''").into_owned()
}

pub(crate) fn strip_tags(src: &str) -> Cow<'_, str> {
    ANY_TAG.replace_all(src, "")
}

/// Drops quote runs that cannot be wiki emphasis.
///
/// Stripping an empty `<strong></strong>` leaves `''''''` behind, which
/// MediaWiki would render as stray apostrophes. Only runs of exactly two
/// or three quotes survive; a lone apostrophe is ordinary text.
pub(crate) fn drop_degenerate_quotes(src: &str) -> Cow<'_, str> {
    QUOTE_RUN.replace_all(src, |caps: &Captures| match caps[0].len() {
        2 | 3 => caps[0].to_owned(),
        _ => String::new(),
    })
}

/// Decodes named and numeric character references.
///
/// The entity table is the full HTML5 set compiled into `html_escape`, so the
/// output does not depend on the environment the tool runs in.
pub(crate) fn decode_entities(src: &str) -> Cow<'_, str> {
    html_escape::decode_html_entities(src)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emphasis_variants() {
        assert_eq!(emphasis("<strong>a</strong> <b>b</b>"), "'''a''' '''b'''");
        assert_eq!(emphasis("<em>a</em> <i class=\"x\">b</i>"), "''a'' ''b''");
    }

    #[test]
    fn test_emphasis_ignores_lookalike_tags() {
        let src = "<br><img src=\"x\"><blockquote>q</blockquote>";
        assert_eq!(emphasis(src), src);
    }

    #[test]
    fn test_drop_degenerate_quotes() {
        assert_eq!(drop_degenerate_quotes("a''''''b"), "ab");
        assert_eq!(drop_degenerate_quotes("''''"), "");
        assert_eq!(drop_degenerate_quotes("'''x''' ''y''"), "'''x''' ''y''");
        assert_eq!(drop_degenerate_quotes("don't"), "don't");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(
            decode_entities("&amp; &lt;a&gt; &quot;q&quot; &#39;s&#39; &Delta;&delta;"),
            "& <a> \"q\" 's' Δδ"
        );
    }
}
