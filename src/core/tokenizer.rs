//! Record tokenizer
//!
//! Pull tokenizer over a single partitioned record string. Every record
//! produced by the partitioner ends at a '>' character, which acts as a
//! sentinel for the scan loops. Processing instructions, DOCTYPE lines,
//! comments, and CDATA sections are skipped; in HTML-aware mode a '<' that
//! opens an inline formatting tag is treated as part of the surrounding
//! content run.

use crate::core::tables::{IN_BLANK, IN_ELEMENT, IN_FIRST};
use crate::text::html_ahead;
use memchr::memmem;
use tracing::warn;

/// One token from a record string. Name and attribute text borrow from the
/// record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordToken<'a> {
    /// Element start tag with raw attribute text (may be empty)
    Start { name: &'a str, attrs: &'a str },
    /// Self-closing element
    SelfClose { name: &'a str, attrs: &'a str },
    /// Element end tag
    Stop { name: &'a str },
    /// Text content, trailing whitespace trimmed
    Content(&'a str),
    /// End of record
    Closed,
}

/// Pull tokenizer for one record string.
pub struct RecordTokenizer<'a> {
    text: &'a str,
    idx: usize,
    html_aware: bool,
}

impl<'a> RecordTokenizer<'a> {
    /// Create a tokenizer over a record string.
    pub fn new(text: &'a str, html_aware: bool) -> Self {
        RecordTokenizer {
            text,
            idx: 0,
            html_aware,
        }
    }

    /// Current byte position in the record.
    #[inline]
    pub fn position(&self) -> usize {
        self.idx
    }

    /// Get the next token, looping internally past skipped constructs.
    pub fn next_token(&mut self) -> RecordToken<'a> {
        let text = self.text.as_bytes();
        let txtlen = text.len();

        loop {
            let mut idx = self.idx;

            // skip past leading blanks
            while idx < txtlen && IN_BLANK[text[idx] as usize] {
                idx += 1;
            }

            if idx >= txtlen {
                self.idx = idx;
                return RecordToken::Closed;
            }

            let ch = text[idx];

            if ch == b'<' && (!self.html_aware || html_ahead(self.text, idx) == 0) {
                idx += 1;
                if idx >= txtlen {
                    self.idx = idx;
                    return RecordToken::Closed;
                }
                let ch = text[idx];

                if IN_FIRST[ch as usize] {
                    // element name
                    let start = idx;
                    idx += 1;
                    while idx < txtlen && IN_ELEMENT[text[idx] as usize] {
                        idx += 1;
                    }
                    let name = &self.text[start..idx];
                    if idx >= txtlen {
                        self.idx = idx;
                        return RecordToken::Closed;
                    }

                    match text[idx] {
                        b'>' => {
                            self.idx = idx + 1;
                            return RecordToken::Start { name, attrs: "" };
                        }
                        b'/' => {
                            // self-closing element without attributes
                            idx += 1;
                            if idx >= txtlen || text[idx] != b'>' {
                                warn!("self-closing element missing right angle bracket");
                            }
                            self.idx = (idx + 1).min(txtlen);
                            return RecordToken::SelfClose { name, attrs: "" };
                        }
                        b' ' | b'\t' | b'\n' | b'\r' | b'\x0c' => {
                            // attributes
                            idx += 1;
                            let start = idx;
                            while idx < txtlen && text[idx] != b'<' && text[idx] != b'>' {
                                idx += 1;
                            }
                            if idx >= txtlen || text[idx] != b'>' {
                                warn!("attributes not followed by right angle bracket");
                                self.idx = idx.min(txtlen);
                                return RecordToken::Closed;
                            }
                            if text[idx - 1] == b'/' {
                                let attrs = &self.text[start..idx - 1];
                                self.idx = idx + 1;
                                return RecordToken::SelfClose { name, attrs };
                            }
                            let attrs = &self.text[start..idx];
                            self.idx = idx + 1;
                            return RecordToken::Start { name, attrs };
                        }
                        other => {
                            warn!("unexpected punctuation '{}' in XML element", other as char);
                            self.idx = idx;
                            return RecordToken::Start { name, attrs: "" };
                        }
                    }
                }

                // punctuation character immediately after the angle bracket
                match ch {
                    b'/' => {
                        idx += 1;
                        let start = idx;
                        if idx < txtlen && IN_FIRST[text[idx] as usize] {
                            idx += 1;
                            while idx < txtlen && IN_ELEMENT[text[idx] as usize] {
                                idx += 1;
                            }
                            let name = &self.text[start..idx];
                            if idx >= txtlen || text[idx] != b'>' {
                                warn!("unexpected characters after end element name");
                            }
                            while idx < txtlen && text[idx] != b'>' {
                                idx += 1;
                            }
                            self.idx = (idx + 1).min(txtlen);
                            return RecordToken::Stop { name };
                        }
                        warn!("unexpected punctuation after '</' in XML element");
                        self.idx = idx;
                    }
                    b'?' => {
                        // skip ?xml and processing instructions
                        idx += 1;
                        while idx < txtlen && text[idx] != b'>' {
                            idx += 1;
                        }
                        self.idx = (idx + 1).min(txtlen);
                    }
                    b'!' => {
                        // skip !DOCTYPE, comments, and CDATA sections
                        idx += 1;
                        let rest = &self.text[idx..];
                        let skip_to: Option<&[u8]> = if rest.starts_with("[CDATA[") {
                            Some(b"]]>")
                        } else if rest.starts_with("--") {
                            Some(b"-->")
                        } else {
                            None
                        };
                        if let Some(marker) = skip_to {
                            // may contain internal angle brackets
                            match memmem::find(rest.as_bytes(), marker) {
                                Some(found) => {
                                    self.idx = idx + found + marker.len();
                                }
                                None => {
                                    self.idx = txtlen;
                                    return RecordToken::Closed;
                                }
                            }
                        } else {
                            while idx < txtlen && text[idx] != b'>' {
                                idx += 1;
                            }
                            self.idx = (idx + 1).min(txtlen);
                        }
                    }
                    other => {
                        warn!("unexpected punctuation '{}' in XML element", other as char);
                        self.idx = idx + 1;
                    }
                }
                continue;
            } else if ch != b'>' {
                // content run
                let start = idx;
                loop {
                    while idx < txtlen && text[idx] != b'<' && text[idx] != b'>' {
                        idx += 1;
                    }
                    if idx < txtlen && text[idx] == b'<' && self.html_aware {
                        let advance = html_ahead(self.text, idx);
                        if advance > 0 {
                            idx += advance;
                            continue;
                        }
                    }
                    break;
                }

                // trim back past trailing blanks
                let mut lst = idx;
                while lst > start && IN_BLANK[text[lst - 1] as usize] {
                    lst -= 1;
                }

                self.idx = idx;
                return RecordToken::Content(&self.text[start..lst]);
            }

            // bare '>' is malformed, step past it
            self.idx = idx + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(xml: &str) -> Vec<RecordToken<'_>> {
        let mut tk = RecordTokenizer::new(xml, false);
        let mut out = Vec::new();
        loop {
            let t = tk.next_token();
            if t == RecordToken::Closed {
                break;
            }
            out.push(t);
        }
        out
    }

    #[test]
    fn test_simple_record() {
        let toks = collect("<Rec><Id>42</Id></Rec>");
        assert_eq!(
            toks,
            vec![
                RecordToken::Start { name: "Rec", attrs: "" },
                RecordToken::Start { name: "Id", attrs: "" },
                RecordToken::Content("42"),
                RecordToken::Stop { name: "Id" },
                RecordToken::Stop { name: "Rec" },
            ]
        );
    }

    #[test]
    fn test_attributes_and_self_closing() {
        let toks = collect("<A x=\"1\"><B v=\"t\"/><C/></A>");
        assert_eq!(
            toks,
            vec![
                RecordToken::Start { name: "A", attrs: "x=\"1\"" },
                RecordToken::SelfClose { name: "B", attrs: "v=\"t\"" },
                RecordToken::SelfClose { name: "C", attrs: "" },
                RecordToken::Stop { name: "A" },
            ]
        );
    }

    #[test]
    fn test_skips_pi_comment_cdata() {
        let toks = collect("<?xml version=\"1.0\"?><R><!-- note --><![CDATA[<x>]]><K>v</K></R>");
        assert_eq!(
            toks,
            vec![
                RecordToken::Start { name: "R", attrs: "" },
                RecordToken::Start { name: "K", attrs: "" },
                RecordToken::Content("v"),
                RecordToken::Stop { name: "K" },
                RecordToken::Stop { name: "R" },
            ]
        );
    }

    #[test]
    fn test_content_trailing_space_trimmed() {
        let toks = collect("<R>text  \n</R>");
        assert!(toks.contains(&RecordToken::Content("text")));
    }

    #[test]
    fn test_html_aware_content() {
        let mut tk = RecordTokenizer::new("<T>bold <b>x</b> done</T>", true);
        assert_eq!(tk.next_token(), RecordToken::Start { name: "T", attrs: "" });
        assert_eq!(tk.next_token(), RecordToken::Content("bold <b>x</b> done"));
        assert_eq!(tk.next_token(), RecordToken::Stop { name: "T" });
    }
}
