//! Streaming tokenizer
//!
//! Tokenizes an entire input stream block by block, tracking line numbers
//! for diagnostics and resuming CDATA sections, comments, and DOCTYPE
//! declarations that span block boundaries. Feeds the whole-stream verbs
//! (format, outline, synopsis, verify, filter), which never build a record
//! tree.

use std::io::Read;

use memchr::memmem;
use tracing::warn;

use crate::core::tables::{ALT_BLANK, IN_ELEMENT, IN_FIRST};
use crate::reader::BlockReader;
use crate::text::html_ahead;

/// One event from the stream. Content is owned because the underlying block
/// buffer is replaced as the stream advances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Start { name: String, attrs: String },
    SelfClose { name: String, attrs: String },
    Stop { name: String },
    Content(String),
    CData(String),
    Comment(String),
    Doctype(String),
    Closed,
}

/// Continuation kinds for multi-block constructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    CData,
    Comment,
    Doctype,
}

impl Pending {
    fn marker(self) -> &'static str {
        match self {
            Pending::CData => "]]>",
            Pending::Comment => "-->",
            Pending::Doctype => ">",
        }
    }

    fn event(self, text: String) -> StreamEvent {
        match self {
            Pending::CData => StreamEvent::CData(text),
            Pending::Comment => StreamEvent::Comment(text),
            Pending::Doctype => StreamEvent::Doctype(text),
        }
    }
}

/// Streaming tokenizer over a block reader.
pub struct StreamTokenizer<R: Read> {
    rdr: BlockReader<R>,
    text: String,
    idx: usize,
    line: usize,
    blocks: usize,
    pending: Option<Pending>,
    html_aware: bool,
}

impl<R: Read> StreamTokenizer<R> {
    /// Create a streaming tokenizer. HTML-aware mode keeps inline
    /// formatting tags inside content runs.
    pub fn new(rdr: BlockReader<R>, html_aware: bool) -> Self {
        StreamTokenizer {
            rdr,
            text: String::new(),
            idx: 0,
            line: 1,
            blocks: 0,
            pending: None,
            html_aware,
        }
    }

    /// Line number of the most recent event.
    #[inline]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Number of reader blocks consumed so far.
    #[inline]
    pub fn blocks_read(&self) -> usize {
        self.blocks
    }

    fn count_lines(&mut self, from: usize, to: usize) {
        let count = self.text.as_bytes()[from..to]
            .iter()
            .filter(|&&b| b == b'\n')
            .count();
        self.line += count;
    }

    fn trimmed(s: &str) -> String {
        s.trim().to_string()
    }

    /// Resume a CDATA/comment/DOCTYPE section left open by the previous
    /// block. Returns the event carrying this block's portion.
    fn resume_pending(&mut self, pending: Pending) -> StreamEvent {
        let marker = pending.marker();
        match memmem::find(self.text.as_bytes(), marker.as_bytes()) {
            None => {
                // no stop signal in this block, stay in pending state
                self.count_lines(0, self.text.len());
                let str = Self::trimmed(&self.text);
                self.text.clear();
                self.idx = 0;
                pending.event(str)
            }
            Some(found) => {
                self.count_lines(0, found);
                let str = Self::trimmed(&self.text[..found]);
                self.idx = found + marker.len();
                self.pending = None;
                pending.event(str)
            }
        }
    }

    /// Pull the next event, reading further blocks as needed.
    pub fn next_event(&mut self) -> StreamEvent {
        loop {
            if self.text.is_empty() {
                self.text = self.rdr.next_block();
                self.idx = 0;
                if self.text.is_empty() {
                    return StreamEvent::Closed;
                }
                self.blocks += 1;
                if let Some(pending) = self.pending {
                    return self.resume_pending(pending);
                }
            }

            let text = self.text.as_bytes();
            let txtlen = text.len();
            let mut idx = self.idx;

            // every block ends with '>', past the end means next block
            if idx >= txtlen {
                self.text.clear();
                continue;
            }

            // skip past leading blanks, counting newlines
            loop {
                while idx < txtlen && ALT_BLANK[text[idx] as usize] {
                    idx += 1;
                }
                if idx >= txtlen || text[idx] != b'\n' {
                    break;
                }
                self.line += 1;
                idx += 1;
            }

            if idx >= txtlen {
                self.text.clear();
                continue;
            }

            let ch = text[idx];

            if ch == b'<' && (!self.html_aware || html_ahead(&self.text, idx) == 0) {
                idx += 1;
                if idx >= txtlen {
                    self.text.clear();
                    continue;
                }
                let ch = text[idx];

                if IN_FIRST[ch as usize] {
                    let start = idx;
                    idx += 1;
                    while idx < txtlen && IN_ELEMENT[text[idx] as usize] {
                        idx += 1;
                    }
                    let name = self.text[start..idx].to_string();
                    if idx >= txtlen {
                        self.text.clear();
                        continue;
                    }

                    match text[idx] {
                        b'>' => {
                            self.idx = idx + 1;
                            return StreamEvent::Start {
                                name,
                                attrs: String::new(),
                            };
                        }
                        b'/' => {
                            idx += 1;
                            if idx >= txtlen || text[idx] != b'>' {
                                warn!(
                                    line = self.line,
                                    "self-closing element missing right angle bracket"
                                );
                            }
                            self.idx = (idx + 1).min(txtlen);
                            return StreamEvent::SelfClose {
                                name,
                                attrs: String::new(),
                            };
                        }
                        b' ' | b'\t' | b'\r' | b'\x0c' | b'\n' => {
                            if text[idx] == b'\n' {
                                self.line += 1;
                            }
                            idx += 1;
                            let start = idx;
                            while idx < txtlen && text[idx] != b'<' && text[idx] != b'>' {
                                if text[idx] == b'\n' {
                                    self.line += 1;
                                }
                                idx += 1;
                            }
                            if idx >= txtlen || text[idx] != b'>' {
                                warn!(
                                    line = self.line,
                                    "attributes not followed by right angle bracket"
                                );
                                self.text.clear();
                                continue;
                            }
                            if text[idx - 1] == b'/' {
                                let attrs = self.text[start..idx - 1].to_string();
                                self.idx = idx + 1;
                                return StreamEvent::SelfClose { name, attrs };
                            }
                            let attrs = self.text[start..idx].to_string();
                            self.idx = idx + 1;
                            return StreamEvent::Start { name, attrs };
                        }
                        other => {
                            warn!(
                                line = self.line,
                                "unexpected punctuation '{}' in XML element", other as char
                            );
                            self.idx = idx;
                            return StreamEvent::Start {
                                name,
                                attrs: String::new(),
                            };
                        }
                    }
                }

                match ch {
                    b'/' => {
                        idx += 1;
                        let start = idx;
                        if idx < txtlen && IN_FIRST[text[idx] as usize] {
                            idx += 1;
                            while idx < txtlen && IN_ELEMENT[text[idx] as usize] {
                                idx += 1;
                            }
                            let name = self.text[start..idx].to_string();
                            if idx >= txtlen || text[idx] != b'>' {
                                warn!(
                                    line = self.line,
                                    "unexpected characters after end element name"
                                );
                                while idx < txtlen && text[idx] != b'>' {
                                    idx += 1;
                                }
                            }
                            self.idx = (idx + 1).min(txtlen);
                            return StreamEvent::Stop { name };
                        }
                        warn!(line = self.line, "unexpected punctuation after '</'");
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
                        idx += 1;
                        let start;
                        let rest = &self.text[idx..];
                        let pending = if rest.starts_with("[CDATA[") {
                            start = idx + 7;
                            Some(Pending::CData)
                        } else if rest.starts_with("--") {
                            start = idx + 2;
                            Some(Pending::Comment)
                        } else if rest.starts_with("DOCTYPE") {
                            start = idx;
                            Some(Pending::Doctype)
                        } else {
                            start = idx;
                            None
                        };

                        match pending {
                            Some(pending) => {
                                let marker = pending.marker();
                                match memmem::find(&text[idx..], marker.as_bytes()) {
                                    None => {
                                        // block stops inside the section
                                        self.count_lines(start, txtlen);
                                        let str = Self::trimmed(&self.text[start..]);
                                        self.text.clear();
                                        self.pending = Some(pending);
                                        return pending.event(str);
                                    }
                                    Some(found) => {
                                        let end = idx + found;
                                        self.count_lines(start, end.max(start));
                                        let str = if end > start {
                                            Self::trimmed(&self.text[start..end])
                                        } else {
                                            String::new()
                                        };
                                        self.idx = end + marker.len();
                                        return pending.event(str);
                                    }
                                }
                            }
                            None => {
                                // skip any other declaration
                                while idx < txtlen && text[idx] != b'>' {
                                    if text[idx] == b'\n' {
                                        self.line += 1;
                                    }
                                    idx += 1;
                                }
                                self.idx = (idx + 1).min(txtlen);
                            }
                        }
                    }
                    other => {
                        warn!(
                            line = self.line,
                            "unexpected punctuation '{}' in XML element", other as char
                        );
                        self.idx = idx + 1;
                    }
                }
                continue;
            } else if ch != b'>' {
                // content run
                let start = idx;
                loop {
                    while idx < txtlen && text[idx] != b'<' && text[idx] != b'>' && text[idx] != b'\n'
                    {
                        idx += 1;
                    }
                    if idx < txtlen && text[idx] == b'<' && self.html_aware {
                        let advance = html_ahead(&self.text, idx);
                        if advance > 0 {
                            idx += advance;
                            continue;
                        }
                    }
                    if idx >= txtlen || text[idx] != b'\n' {
                        break;
                    }
                    self.line += 1;
                    idx += 1;
                }

                let mut lst = idx;
                while lst > start && (ALT_BLANK[text[lst - 1] as usize] || text[lst - 1] == b'\n') {
                    lst -= 1;
                }

                self.idx = idx;
                return StreamEvent::Content(self.text[start..lst].to_string());
            }

            // bare '>' in stream is malformed, step past it
            self.idx = idx + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ReaderOptions;
    use std::io::Cursor;

    fn events(xml: &str) -> Vec<StreamEvent> {
        let rdr = BlockReader::new(
            Cursor::new(xml.as_bytes().to_vec()),
            ReaderOptions::default(),
        );
        let mut tk = StreamTokenizer::new(rdr, false);
        let mut out = Vec::new();
        loop {
            let ev = tk.next_event();
            if ev == StreamEvent::Closed {
                break;
            }
            out.push(ev);
        }
        out
    }

    #[test]
    fn stream_events_in_order() {
        let evs = events("<A><B attr=\"v\">text</B><C/></A>");
        assert_eq!(
            evs,
            vec![
                StreamEvent::Start {
                    name: "A".into(),
                    attrs: String::new()
                },
                StreamEvent::Start {
                    name: "B".into(),
                    attrs: "attr=\"v\"".into()
                },
                StreamEvent::Content("text".into()),
                StreamEvent::Stop { name: "B".into() },
                StreamEvent::SelfClose {
                    name: "C".into(),
                    attrs: String::new()
                },
                StreamEvent::Stop { name: "A".into() },
            ]
        );
    }

    #[test]
    fn cdata_and_comment_events() {
        let evs = events("<R><![CDATA[raw <x>]]><!-- note --></R>");
        assert!(evs.contains(&StreamEvent::CData("raw <x>".into())));
        assert!(evs.contains(&StreamEvent::Comment("note".into())));
    }

    #[test]
    fn doctype_event() {
        let evs = events("<!DOCTYPE PubmedArticleSet><R>x</R>");
        assert!(matches!(&evs[0], StreamEvent::Doctype(d) if d.starts_with("DOCTYPE")));
    }

    #[test]
    fn line_numbers_advance() {
        let rdr = BlockReader::new(
            Cursor::new(b"<A>\n<B>\n</B>\n</A>".to_vec()),
            ReaderOptions::default(),
        );
        let mut tk = StreamTokenizer::new(rdr, false);
        while tk.next_event() != StreamEvent::Closed {}
        assert_eq!(tk.line(), 4);
    }

    #[test]
    fn pi_is_skipped() {
        let evs = events("<?xml version=\"1.0\"?><R>x</R>");
        assert_eq!(
            evs[0],
            StreamEvent::Start {
                name: "R".into(),
                attrs: String::new()
            }
        );
    }
}
