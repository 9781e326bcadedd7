//! Unicode super/subscript and accent handling
//!
//! Two concerns: mapping the Unicode superscript/subscript blocks either to
//! plain digits or to <sup>/<sub> spans, and folding accented letters to
//! their ASCII base forms (canonical decomposition plus a supplemental table
//! for letters with strokes and for ligatures).

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// ASCII equivalent of a Unicode superscript or subscript character.
fn markup_rune(c: char) -> Option<char> {
    let mapped = match c {
        '\u{00B2}' => '2',
        '\u{00B3}' => '3',
        '\u{00B9}' => '1',
        '\u{2070}' => '0',
        '\u{2071}' => '1',
        '\u{2074}' => '4',
        '\u{2075}' => '5',
        '\u{2076}' => '6',
        '\u{2077}' => '7',
        '\u{2078}' => '8',
        '\u{2079}' => '9',
        '\u{207A}' => '+',
        '\u{207B}' => '-',
        '\u{207C}' => '=',
        '\u{207D}' => '(',
        '\u{207E}' => ')',
        '\u{207F}' => 'n',
        '\u{2080}' => '0',
        '\u{2081}' => '1',
        '\u{2082}' => '2',
        '\u{2083}' => '3',
        '\u{2084}' => '4',
        '\u{2085}' => '5',
        '\u{2086}' => '6',
        '\u{2087}' => '7',
        '\u{2088}' => '8',
        '\u{2089}' => '9',
        '\u{208A}' => '+',
        '\u{208B}' => '-',
        '\u{208C}' => '=',
        '\u{208D}' => '(',
        '\u{208E}' => ')',
        _ => return None,
    };
    Some(mapped)
}

/// Letters with stroke or bar that canonical decomposition leaves alone.
fn accent_rune(c: char) -> Option<char> {
    let mapped = match c {
        '\u{00D8}' => 'O',
        '\u{00F0}' => 'd',
        '\u{00F8}' => 'o',
        '\u{0111}' => 'd',
        '\u{0131}' => 'i',
        '\u{0141}' => 'L',
        '\u{0142}' => 'l',
        '\u{02BC}' => '\'',
        _ => return None,
    };
    Some(mapped)
}

/// Ligatures expanded to their letter sequences.
fn ligature_runes(c: char) -> Option<&'static str> {
    let mapped = match c {
        '\u{00DF}' => "ss",
        '\u{00E6}' => "ae",
        '\u{FB00}' => "ff",
        '\u{FB01}' => "fi",
        '\u{FB02}' => "fl",
        '\u{FB03}' => "ffi",
        '\u{FB04}' => "ffl",
        '\u{FB05}' => "ft",
        '\u{FB06}' => "st",
        _ => return None,
    };
    Some(mapped)
}

/// Quick min-to-max check for Unicode superscript or subscript characters.
#[inline]
pub fn has_markup_runes(s: &str) -> bool {
    s.chars().any(|c| {
        ('\u{00B2}'..='\u{00B9}').contains(&c) || ('\u{2070}'..='\u{208E}').contains(&c)
    })
}

/// Quick range check for stroke letters and ligatures left by normalization.
#[inline]
pub fn has_accent_runes(s: &str) -> bool {
    s.chars().any(|c| {
        ('\u{00D8}'..='\u{02BC}').contains(&c) || ('\u{FB00}'..='\u{FB06}').contains(&c)
    })
}

/// Map Unicode superscripts and subscripts to plain ASCII equivalents.
pub fn remove_unicode_markup(s: &str) -> String {
    s.chars().map(|c| markup_rune(c).unwrap_or(c)).collect()
}

/// Map Unicode superscripts and subscripts to <sup>/<sub> spans for
/// mixed-content output.
pub fn simulate_unicode_markup(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if ('\u{00B2}'..='\u{00B9}').contains(&c) || ('\u{2070}'..='\u{207F}').contains(&c) {
            if let Some(r) = markup_rune(c) {
                out.push_str("<sup>");
                out.push(r);
                out.push_str("</sup>");
                continue;
            }
        } else if ('\u{2080}'..='\u{208E}').contains(&c) {
            if let Some(r) = markup_rune(c) {
                out.push_str("<sub>");
                out.push(r);
                out.push_str("</sub>");
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Fold accented characters to ASCII base forms.
///
/// NFD decomposition with combining marks removed, recomposed to NFC, then
/// the supplemental stroke and ligature tables for characters canonical
/// decomposition does not touch.
pub fn fold_accents(s: &str) -> String {
    let stripped: String = s.nfd().filter(|c| !is_combining_mark(*c)).nfc().collect();

    if !has_accent_runes(&stripped) {
        return stripped;
    }

    let mut out = String::with_capacity(stripped.len());
    for c in stripped.chars() {
        if let Some(r) = accent_rune(c) {
            out.push(r);
        } else if let Some(lig) = ligature_runes(c) {
            out.push_str(lig);
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_unicode_markup() {
        assert_eq!(remove_unicode_markup("H\u{2082}O"), "H2O");
        assert_eq!(remove_unicode_markup("x\u{00B2}"), "x2");
    }

    #[test]
    fn test_simulate_unicode_markup() {
        assert_eq!(simulate_unicode_markup("H\u{2082}O"), "H<sub>2</sub>O");
        assert_eq!(simulate_unicode_markup("x\u{00B2}"), "x<sup>2</sup>");
    }

    #[test]
    fn test_fold_accents() {
        assert_eq!(fold_accents("caf\u{00e9}"), "cafe");
        assert_eq!(fold_accents("M\u{00fc}ller"), "Muller");
        assert_eq!(fold_accents("\u{00d8}rsted"), "Orsted");
        assert_eq!(fold_accents("stra\u{00df}e"), "strasse");
        assert_eq!(fold_accents("\u{0141}\u{00f3}d\u{017a}"), "Lodz");
    }

    #[test]
    fn fold_accents_is_idempotent() {
        let once = fold_accents("\u{00c5}ngstr\u{00f6}m \u{00e6}on");
        assert_eq!(fold_accents(&once), once);
    }
}
