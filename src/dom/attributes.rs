//! Attribute parsing
//!
//! Raw attribute text is kept verbatim on each node and split into
//! (name, value) pairs only when first queried. The format inside a start
//! tag is forgiving: whitespace around '=' and between pairs, double-quoted
//! values.

/// Split raw attribute text into (name, value) pairs.
pub fn parse_attributes(attrb: &str) -> Vec<(String, String)> {
    if attrb.is_empty() {
        return Vec::new();
    }

    let bytes = attrb.as_bytes();
    let attlen = bytes.len();
    let mut pairs = Vec::new();

    let mut start = 0usize;
    let mut idx = 0usize;
    let mut tag: Option<String> = None;

    // names end at '=', values at the closing double quote
    while idx < attlen {
        match bytes[idx] {
            b'=' => {
                let mut s = start;
                while s < attlen && matches!(bytes[s], b' ' | b'\n' | b'\t' | b'\r' | b'\x0c') {
                    s += 1;
                }
                tag = Some(attrb[s..idx].to_string());
                // skip past equal sign and leading double quote
                idx += 2;
                start = idx;
            }
            b'"' => {
                if let Some(name) = tag.take() {
                    pairs.push((name, attrb[start..idx].to_string()));
                }
                // skip past trailing double quote and possible space
                idx += 2;
                start = idx;
            }
            _ => idx += 1,
        }
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pairs() {
        let pairs = parse_attributes("Status=\"MEDLINE\" Owner=\"NLM\"");
        assert_eq!(
            pairs,
            vec![
                ("Status".to_string(), "MEDLINE".to_string()),
                ("Owner".to_string(), "NLM".to_string()),
            ]
        );
    }

    #[test]
    fn tolerates_extra_whitespace() {
        let pairs = parse_attributes("  a=\"1\"   b=\"two words\" ");
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1], ("b".to_string(), "two words".to_string()));
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(parse_attributes("").is_empty());
        assert!(parse_attributes("novalue").is_empty());
    }
}
