//! Inline HTML handling for mixed-content records
//!
//! PubMed abstracts and titles embed <i>, <b>, <u>, <sub>, and <sup> tags,
//! sometimes entity-escaped one or two levels deep. Strict mode deletes all
//! of them; mixed mode repairs escaped forms back to real tags. Lookahead
//! and lookbehind helpers let the tokenizer and block reader treat these
//! tags as part of content rather than markup.

use once_cell::sync::Lazy;

/// Lookahead at a '<' inside content: if the following bytes form an inline
/// open, close, or empty tag (i, b, u, sub, sup), return the byte length of
/// that tag, otherwise 0.
pub fn html_ahead(text: &str, pos: usize) -> usize {
    let t = text.as_bytes();
    let max = t.len() - pos;

    let is_ibu = |ch: u8| ch == b'i' || ch == b'b' || ch == b'u';
    let is_pb = |ch: u8| ch == b'p' || ch == b'b';

    if max > 2 && t[pos + 2] == b'>' {
        // <i>
        if is_ibu(t[pos + 1]) {
            return 3;
        }
    } else if max > 3 && t[pos + 3] == b'>' {
        // </i> or <i/>
        if t[pos + 1] == b'/' && is_ibu(t[pos + 2]) {
            return 4;
        }
        if t[pos + 2] == b'/' && is_ibu(t[pos + 1]) {
            return 4;
        }
    } else if max > 4 && t[pos + 4] == b'>' {
        // <sub> or <sup>
        if t[pos + 1] == b's' && t[pos + 2] == b'u' && is_pb(t[pos + 3]) {
            return 5;
        }
    } else if max > 5 && t[pos + 5] == b'>' {
        // </sub> or <sub/>
        if t[pos + 1] == b'/' && t[pos + 2] == b's' && t[pos + 3] == b'u' && is_pb(t[pos + 4]) {
            return 6;
        }
        if t[pos + 4] == b'/' && t[pos + 1] == b's' && t[pos + 2] == b'u' && is_pb(t[pos + 3]) {
            return 6;
        }
    }

    0
}

/// Lookbehind at a '>' in a raw buffer: true if the bytes before it form an
/// inline open, close, or empty tag, meaning this '>' is not a safe block
/// cut point.
pub fn html_behind(bufr: &[u8], pos: usize) -> bool {
    let is_ibu = |ch: u8| ch == b'i' || ch == b'b' || ch == b'u';
    let is_pb = |ch: u8| ch == b'p' || ch == b'b';

    if pos > 1 && bufr[pos - 2] == b'<' {
        // <i
        if is_ibu(bufr[pos - 1]) {
            return true;
        }
    } else if pos > 2 && bufr[pos - 3] == b'<' {
        // </i or <i/
        if bufr[pos - 2] == b'/' && is_ibu(bufr[pos - 1]) {
            return true;
        }
        if bufr[pos - 1] == b'/' && is_ibu(bufr[pos - 2]) {
            return true;
        }
    } else if pos > 3 && bufr[pos - 4] == b'<' {
        // <sub
        if bufr[pos - 3] == b's' && bufr[pos - 2] == b'u' && is_pb(bufr[pos - 1]) {
            return true;
        }
    } else if pos > 4 && bufr[pos - 5] == b'<' {
        // </sub or <sub/
        if bufr[pos - 4] == b'/' && bufr[pos - 3] == b's' && bufr[pos - 2] == b'u'
            && is_pb(bufr[pos - 1])
        {
            return true;
        }
        if bufr[pos - 1] == b'/' && bufr[pos - 4] == b's' && bufr[pos - 3] == b'u'
            && is_pb(bufr[pos - 2])
        {
            return true;
        }
    }

    false
}

/// True if the string contains a literal angle bracket, or escaped forms
/// (&lt; / &gt; / &amp;) that could hide one.
pub fn has_angle_bracket(s: &str) -> bool {
    let mut has_amp = false;
    let mut has_semi = false;

    for ch in s.bytes() {
        match ch {
            b'<' | b'>' => return true,
            b'&' => has_amp = true,
            b';' => has_semi = true,
            _ => {}
        }
    }

    if has_amp && has_semi {
        return s.contains("&lt;") || s.contains("&gt;") || s.contains("&amp;");
    }

    false
}

const INLINE_TAGS: [&str; 5] = ["i", "b", "u", "sub", "sup"];

/// Literal replacement pairs covering zero, one, and two levels of entity
/// encoding. Strip mode replaces with "", repair mode with the plain form.
static INLINE_LITERALS: Lazy<Vec<(String, String)>> = Lazy::new(|| {
    let mut table = Vec::new();
    for tag in INLINE_TAGS {
        let plain = [
            (format!("<{tag}>"), format!("<{tag}>")),
            (format!("</{tag}>"), format!("</{tag}>")),
            (format!("<{tag}/>"), format!("<{tag}/>")),
            (format!("<{tag} />"), format!("<{tag}/>")),
        ];
        for (form, fixed) in plain {
            // unescaped, singly escaped, doubly escaped
            table.push((form.clone(), fixed.clone()));
            let once = form.replace('<', "&lt;").replace('>', "&gt;");
            table.push((once.clone(), fixed.clone()));
            let twice = once.replace('&', "&amp;");
            table.push((twice, fixed));
        }
    }
    table.push(("&amp;amp;".to_string(), "&amp;".to_string()));
    table
});

fn replace_inline(s: &str, strip: bool) -> String {
    let mut out = String::with_capacity(s.len());
    let bytes = s.as_bytes();
    let mut idx = 0;

    'outer: while idx < bytes.len() {
        let ch = bytes[idx];
        if ch == b'<' || ch == b'&' {
            for (from, to) in INLINE_LITERALS.iter() {
                if s[idx..].starts_with(from.as_str()) {
                    // escaped-ampersand repair applies in both modes
                    if !strip || from == "&amp;amp;" {
                        out.push_str(to);
                    }
                    idx += from.len();
                    continue 'outer;
                }
            }
        }
        // copy verbatim through the next candidate start
        let start = idx;
        idx += 1;
        while idx < bytes.len() && bytes[idx] != b'<' && bytes[idx] != b'&' {
            idx += 1;
        }
        out.push_str(&s[start..idx]);
    }

    out
}

/// Delete inline HTML tags in all encoded forms (strict mode).
pub fn strip_inline_tags(s: &str) -> String {
    replace_inline(s, true)
}

/// Restore escaped inline HTML tags to real tags (mixed mode).
pub fn repair_inline_tags(s: &str) -> String {
    replace_inline(s, false)
}

/// Trim empty inline tag pairs and unbalanced inline tags from the ends of a
/// string, repeating until stable.
pub fn trim_flanking_inline_tags(s: &str) -> &str {
    const BAD_PREFIX: [&str; 10] = [
        "<i></i>", "<b></b>", "<u></u>", "<sup></sup>", "<sub></sub>", "</i>", "</b>", "</u>",
        "</sup>", "</sub>",
    ];
    const BAD_SUFFIX: [&str; 10] = [
        "<i></i>", "<b></b>", "<u></u>", "<sup></sup>", "<sub></sub>", "<i>", "<b>", "<u>",
        "<sup>", "<sub>",
    ];

    if !s.contains('<') {
        return s;
    }

    let mut str = s;
    let mut go_on = true;
    while go_on {
        go_on = false;
        for tag in BAD_PREFIX {
            if let Some(rest) = str.strip_prefix(tag) {
                str = rest;
                go_on = true;
            }
        }
        for tag in BAD_SUFFIX {
            if let Some(rest) = str.strip_suffix(tag) {
                str = rest;
                go_on = true;
            }
        }
    }

    str
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_ahead() {
        assert_eq!(html_ahead("<i>text", 0), 3);
        assert_eq!(html_ahead("</i>text", 0), 4);
        assert_eq!(html_ahead("<sub>2</sub>", 0), 5);
        assert_eq!(html_ahead("</sup>", 0), 6);
        assert_eq!(html_ahead("<Element>", 0), 0);
    }

    #[test]
    fn test_html_behind() {
        assert!(html_behind(b"text<i>", 6));
        assert!(html_behind(b"text</sub>", 9));
        assert!(!html_behind(b"<PMID>", 5));
    }

    #[test]
    fn test_strip_inline_tags() {
        assert_eq!(strip_inline_tags("a <i>b</i> c"), "a b c");
        assert_eq!(strip_inline_tags("x&lt;sup&gt;2&lt;/sup&gt;"), "x2");
        assert_eq!(strip_inline_tags("A &amp;amp; B"), "A &amp; B");
    }

    #[test]
    fn test_repair_inline_tags() {
        assert_eq!(repair_inline_tags("x&lt;sup&gt;2&lt;/sup&gt;"), "x<sup>2</sup>");
        assert_eq!(repair_inline_tags("&amp;lt;i&amp;gt;y&amp;lt;/i&amp;gt;"), "<i>y</i>");
    }

    #[test]
    fn test_trim_flanking_inline_tags() {
        assert_eq!(trim_flanking_inline_tags("<i></i>text<sup>"), "text");
        assert_eq!(trim_flanking_inline_tags("</b>middle"), "middle");
        assert_eq!(trim_flanking_inline_tags("a<i>b</i>c"), "a<i>b</i>c");
    }

    #[test]
    fn strip_is_idempotent() {
        let once = strip_inline_tags("a <i>b</i> &lt;u&gt;c&lt;/u&gt;");
        assert_eq!(strip_inline_tags(&once), once);
    }
}
