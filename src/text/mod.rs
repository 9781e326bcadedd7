//! Text normalization passes
//!
//! Independent, composable string cleanups applied to element contents and
//! attribute text: whitespace compression, punctuation trimming, accent
//! folding, Unicode super/subscript mapping, inline-HTML repair, and ASCII
//! escaping. Each pass is idempotent.

mod html;
mod markup;

pub use html::{
    has_angle_bracket, html_ahead, html_behind, repair_inline_tags, strip_inline_tags,
    trim_flanking_inline_tags,
};
pub use markup::{
    fold_accents, has_accent_runes, has_markup_runes, remove_unicode_markup,
    simulate_unicode_markup,
};

/// Content cleanup switches shared by the tree builder and the stream
/// verbs. Strict mode strips inline HTML, mixed mode keeps it as markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFilters {
    pub strict: bool,
    pub mixed: bool,
    pub accent: bool,
    pub ascii: bool,
}

impl TextFilters {
    /// True when inline HTML tags should survive inside content runs.
    #[inline]
    pub fn html_aware(&self) -> bool {
        self.strict || self.mixed
    }
}

/// True if any character is not XML whitespace.
#[inline]
pub fn is_not_just_whitespace(s: &str) -> bool {
    s.bytes()
        .any(|b| !matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0c'))
}

/// True if any character is outside 7-bit ASCII.
#[inline]
pub fn is_not_ascii(s: &str) -> bool {
    !s.is_ascii()
}

/// True if the string contains an ampersand or any non-ASCII character,
/// meaning entity decoding may be required.
#[inline]
pub fn has_amp_or_not_ascii(s: &str) -> bool {
    s.bytes().any(|b| b == b'&' || b > 127)
}

/// True if every character is an uppercase letter or digit (variable names).
pub fn is_all_caps_or_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// True if the string looks numeric, allowing punctuation that appears in
/// formulas and ranges. Used to exclude numbers from indexing.
pub fn is_all_numeric(s: &str) -> bool {
    s.chars().all(|c| {
        c.is_ascii_digit()
            || matches!(
                c,
                '.' | '+' | '-' | '*' | '/' | ',' | '$' | '#' | '%' | '(' | ')'
            )
    })
}

/// True if any whitespace character other than plain space is present.
pub fn has_bad_space(s: &str) -> bool {
    s.chars().any(|c| c.is_whitespace() && c != ' ')
}

/// Map every Unicode whitespace codepoint to a plain ASCII space.
pub fn cleanup_bad_spaces(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect()
}

/// Collapse runs of whitespace into single spaces.
pub fn compress_runs_of_spaces(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_space = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Iteratively strip leading/trailing punctuation and unmatched flanking
/// parentheses or brackets until the string stops changing.
pub fn trim_punctuation(s: &str) -> &str {
    let mut str = s;

    let is_edge = |b: u8| matches!(b, b'.' | b',' | b':' | b';' | b'=' | b'\'' | b'"');

    loop {
        let before = str.len();
        let bytes = str.as_bytes();
        let max = bytes.len();

        if max > 0 && (is_edge(bytes[0]) || bytes[0] == b')' || bytes[0] == b']') {
            str = &str[1..];
        }
        let bytes = str.as_bytes();
        let max = bytes.len();
        if max > 0 && (is_edge(bytes[max - 1]) || bytes[max - 1] == b'(' || bytes[max - 1] == b'[')
        {
            str = &str[..max - 1];
        }

        let bytes = str.as_bytes();
        let max = bytes.len();
        if max > 1 && bytes[0] == b'(' && bytes[max - 1] == b')' {
            str = &str[1..max - 1];
        }
        let bytes = str.as_bytes();
        let max = bytes.len();
        if max > 1 && bytes[0] == b'[' && bytes[max - 1] == b']' {
            str = &str[1..max - 1];
        }

        let has_left_p = str.contains('(');
        let has_right_p = str.contains(')');
        let bytes = str.as_bytes();
        let max = bytes.len();
        if max > 1 && bytes[0] == b'(' && bytes[1] == b'(' && !has_right_p {
            str = &str[2..];
        }
        let bytes = str.as_bytes();
        let max = bytes.len();
        if max > 1 && bytes[max - 1] == b')' && bytes[max - 2] == b')' && !has_left_p {
            str = &str[..max - 2];
        }
        let bytes = str.as_bytes();
        let max = bytes.len();
        if max > 0 && bytes[0] == b'(' && !has_right_p {
            str = &str[1..];
        }
        let bytes = str.as_bytes();
        let max = bytes.len();
        if max > 1 && bytes[max - 1] == b')' && !has_left_p {
            str = &str[..max - 1];
        }

        let has_left_b = str.contains('[');
        let has_right_b = str.contains(']');
        let bytes = str.as_bytes();
        let max = bytes.len();
        if max > 0 && bytes[0] == b'[' && !has_right_b {
            str = &str[1..];
        }
        let bytes = str.as_bytes();
        let max = bytes.len();
        if max > 1 && bytes[max - 1] == b']' && !has_left_b {
            str = &str[..max - 1];
        }

        if str.len() == before || str.is_empty() {
            break;
        }
    }

    str
}

/// Replace every codepoint above 127 with a numeric character reference.
pub fn unicode_to_ascii(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if (c as u32) > 127 {
            out.push_str("&#x");
            out.push_str(&format!("{:X}", c as u32));
            out.push(';');
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert backslash escapes in command-line separator arguments.
///
/// Recognizes \n, \r, \t, \f, and \a; any other escaped character is kept
/// verbatim.
pub fn convert_slash(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;
    for c in s.chars() {
        if escaped {
            match c {
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                't' => out.push('\t'),
                'f' => out.push('\x0c'),
                'a' => out.push('\x07'),
                other => out.push(other),
            }
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else {
            out.push(c);
        }
    }
    out
}

/// Split at the first occurrence of a separator; without one, the whole
/// string lands on the left.
#[inline]
pub fn split_left(s: &str, sep: char) -> (&str, &str) {
    match s.split_once(sep) {
        Some((l, r)) => (l, r),
        None => (s, ""),
    }
}

/// Split at the first occurrence of a separator; without one, the whole
/// string lands on the right.
#[inline]
pub fn split_right(s: &str, sep: char) -> (&str, &str) {
    match s.split_once(sep) {
        Some((l, r)) => (l, r),
        None => ("", s),
    }
}

/// String-separator variants used when the separator is a full tag.
#[inline]
pub fn split_left_str<'a>(s: &'a str, sep: &str) -> (&'a str, &'a str) {
    match s.split_once(sep) {
        Some((l, r)) => (l, r),
        None => (s, ""),
    }
}

#[inline]
pub fn split_right_str<'a>(s: &'a str, sep: &str) -> (&'a str, &'a str) {
    match s.split_once(sep) {
        Some((l, r)) => (l, r),
        None => ("", s),
    }
}

/// HTML-escape the five XML-special characters.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Decode entity references: the five named XML entities plus decimal and
/// hexadecimal character references. Unknown references pass through.
pub fn unescape_xml(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let bytes = s.as_bytes();
    let mut idx = 0;

    while idx < bytes.len() {
        if bytes[idx] != b'&' {
            let start = idx;
            while idx < bytes.len() && bytes[idx] != b'&' {
                idx += 1;
            }
            out.push_str(&s[start..idx]);
            continue;
        }
        let rest = &s[idx..];
        let semi = match rest.find(';') {
            // entity references are short, give up past a reasonable bound
            Some(p) if p <= 10 => p,
            _ => {
                out.push('&');
                idx += 1;
                continue;
            }
        };
        let entity = &rest[1..semi];
        let replaced = match entity {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => {
                if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X"))
                {
                    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
                } else if let Some(dec) = entity.strip_prefix('#') {
                    dec.parse::<u32>().ok().and_then(char::from_u32)
                } else {
                    None
                }
            }
        };
        match replaced {
            Some(c) => {
                out.push(c);
                idx += semi + 1;
            }
            None => {
                out.push('&');
                idx += 1;
            }
        }
    }

    out
}

/// Title-case each word after lowercasing, for the -title operation.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphanumeric() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_runs_of_spaces() {
        assert_eq!(compress_runs_of_spaces("a  b\t\nc"), "a b c");
        assert_eq!(compress_runs_of_spaces("  x  "), " x ");
    }

    #[test]
    fn test_cleanup_bad_spaces() {
        assert_eq!(cleanup_bad_spaces("a\u{00a0}b\tc"), "a b c");
    }

    #[test]
    fn test_trim_punctuation() {
        assert_eq!(trim_punctuation("word."), "word");
        assert_eq!(trim_punctuation("(word)"), "word");
        assert_eq!(trim_punctuation("((word"), "word");
        assert_eq!(trim_punctuation("word,;"), "word");
        assert_eq!(trim_punctuation("C(17)H(21)"), "C(17)H(21)");
        assert_eq!(trim_punctuation("[word"), "word");
    }

    #[test]
    fn trim_punctuation_is_idempotent() {
        for s in [".,word:;", "(a(b))", "[x]", "''quoted''"] {
            let once = trim_punctuation(s);
            assert_eq!(trim_punctuation(once), once);
        }
    }

    #[test]
    fn test_convert_slash() {
        assert_eq!(convert_slash("a\\tb\\n"), "a\tb\n");
        assert_eq!(convert_slash("plain"), "plain");
        assert_eq!(convert_slash("\\-dash"), "-dash");
    }

    #[test]
    fn test_unescape_xml() {
        assert_eq!(unescape_xml("&lt;i&gt; &amp; more"), "<i> & more");
        assert_eq!(unescape_xml("&#65;&#x42;"), "AB");
        assert_eq!(unescape_xml("no entities"), "no entities");
        assert_eq!(unescape_xml("&unknown; stays"), "&unknown; stays");
    }

    #[test]
    fn test_unicode_to_ascii() {
        assert_eq!(unicode_to_ascii("caf\u{00e9}"), "caf&#xE9;");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("DNA, bacterial"), "Dna, Bacterial");
    }

    #[test]
    fn test_is_all_caps_or_digits() {
        assert!(is_all_caps_or_digits("ACC2"));
        assert!(!is_all_caps_or_digits("Acc"));
        assert!(!is_all_caps_or_digits(""));
    }
}
