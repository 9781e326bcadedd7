//! Structure reports
//!
//! -outline prints the nesting structure of the input, -synopsis prints
//! unique element paths, and -verify checks well-formedness, reporting
//! mismatched tags, misplaced contents, and (with a pattern) the deepest
//! nesting and the record spanning the most reader blocks.

use std::collections::BTreeSet;
use std::io::{self, Read, Write};

use crate::core::{StreamEvent, StreamTokenizer};
use crate::stream::is_wrapper_set;
use crate::text::TextFilters;

/// Print an indented outline of the element structure.
pub fn outline_stream<R: Read>(
    tk: &mut StreamTokenizer<R>,
    out: &mut dyn Write,
) -> io::Result<()> {
    let mut indent = 0usize;

    loop {
        match tk.next_event() {
            StreamEvent::Start { name, .. } => {
                if is_wrapper_set(&name) {
                    continue;
                }
                for _ in 0..indent {
                    out.write_all(b"  ")?;
                }
                writeln!(out, "{name}")?;
                indent += 1;
            }
            StreamEvent::SelfClose { name, .. } => {
                for _ in 0..indent {
                    out.write_all(b"  ")?;
                }
                writeln!(out, "{name}")?;
            }
            StreamEvent::Stop { .. } => {
                indent = indent.saturating_sub(1);
            }
            StreamEvent::Closed => return Ok(()),
            _ => {}
        }
    }
}

/// Print unique slash-separated element paths in sorted order.
pub fn synopsis_stream<R: Read>(
    tk: &mut StreamTokenizer<R>,
    out: &mut dyn Write,
) -> io::Result<()> {
    let mut paths: BTreeSet<String> = BTreeSet::new();
    let mut stack: Vec<String> = Vec::new();

    loop {
        match tk.next_event() {
            StreamEvent::Start { name, .. } => {
                if is_wrapper_set(&name) {
                    continue;
                }
                let path = if stack.is_empty() {
                    name.clone()
                } else {
                    format!("{}/{}", stack.join("/"), name)
                };
                paths.insert(path);
                stack.push(name);
            }
            StreamEvent::SelfClose { name, .. } => {
                let path = if stack.is_empty() {
                    name
                } else {
                    format!("{}/{}", stack.join("/"), name)
                };
                paths.insert(path);
            }
            StreamEvent::Stop { .. } => {
                stack.pop();
            }
            StreamEvent::Closed => break,
            _ => {}
        }
    }

    for path in paths {
        writeln!(out, "{path}")?;
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VerifyState {
    Start,
    Stop,
    Char,
    Other,
}

/// Mixed-content tags must nest properly inside one content run.
fn unbalanced_html(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut stack: Vec<&str> = Vec::new();
    let mut in_tag = false;
    let mut start = 0usize;

    for (idx, &ch) in bytes.iter().enumerate() {
        if ch == b'<' {
            if in_tag {
                return true;
            }
            in_tag = true;
            start = idx;
        } else if ch == b'>' {
            if !in_tag {
                return true;
            }
            in_tag = false;
            let curr = &text[start + 1..idx];
            if let Some(curr) = curr.strip_prefix('/') {
                match stack.pop() {
                    Some(prev) if prev == curr => {}
                    _ => return true,
                }
            } else {
                stack.push(curr);
            }
        }
    }

    in_tag || !stack.is_empty()
}

/// Report structural problems; with a pattern, also report the deepest
/// nesting line and the record with the longest span.
pub fn verify_stream<R: Read>(
    tk: &mut StreamTokenizer<R>,
    pattern: &str,
    filters: &TextFilters,
    out: &mut dyn Write,
) -> io::Result<()> {
    let mut max_depth = 0usize;
    let mut depth_line = 0usize;
    let mut max_blocks = 0usize;
    let mut block_line = 0usize;
    let mut start_block = 0usize;
    let mut start_line = 0usize;
    // nesting stack of open element names
    let mut stack: Vec<String> = Vec::new();
    let mut status = VerifyState::Start;

    loop {
        let event = tk.next_event();
        let line = tk.line();

        if stack.len() > max_depth {
            max_depth = stack.len();
            depth_line = line;
        }

        match event {
            StreamEvent::Start { name, .. } => {
                if status == VerifyState::Char {
                    writeln!(out, "<{name}> not expected after contents, line {line}")?;
                }
                if !pattern.is_empty() && name == pattern {
                    start_block = tk.blocks_read();
                    start_line = line;
                }
                stack.push(name);
                status = VerifyState::Start;
            }
            StreamEvent::SelfClose { .. } => {
                status = VerifyState::Other;
            }
            StreamEvent::Stop { name } => {
                if !pattern.is_empty() && name == pattern {
                    let span = tk.blocks_read() - start_block + 1;
                    if span > max_blocks {
                        max_blocks = span;
                        block_line = start_line;
                    }
                }
                match stack.pop() {
                    Some(open) => {
                        if open != name {
                            writeln!(out, "Expected </{open}>, found </{name}>, line {line}")?;
                        }
                    }
                    None => {
                        writeln!(out, "Unexpected </{name}> at end of XML, line {line}")?;
                    }
                }
                status = VerifyState::Stop;
            }
            StreamEvent::Content(text) => {
                if status == VerifyState::Stop {
                    let parent = stack.last().map(String::as_str).unwrap_or("");
                    writeln!(out, "Contents not expected before </{parent}>, line {line}")?;
                }
                if (filters.strict || filters.mixed) && unbalanced_html(&text) {
                    writeln!(out, "Unbalanced mixed-content tags, line {line}")?;
                }
                status = VerifyState::Char;
            }
            StreamEvent::CData(_) | StreamEvent::Comment(_) => {
                status = VerifyState::Other;
            }
            StreamEvent::Doctype(_) => {}
            StreamEvent::Closed => {
                if !stack.is_empty() {
                    writeln!(out, "Unexpected end of data")?;
                }
                break;
            }
        }
    }

    if !pattern.is_empty() {
        writeln!(out, "Maximum nesting ({max_depth} levels) at line {depth_line}")?;
        writeln!(out, "Longest pattern ({max_blocks} blocks) at line {block_line}")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{BlockReader, ReaderOptions};
    use std::io::Cursor;

    fn tokens(xml: &str) -> StreamTokenizer<Cursor<Vec<u8>>> {
        let rdr = BlockReader::new(
            Cursor::new(xml.as_bytes().to_vec()),
            ReaderOptions::default(),
        );
        StreamTokenizer::new(rdr, false)
    }

    #[test]
    fn outline_indents_nesting() {
        let mut tk = tokens("<A><B><C>x</C></B></A>");
        let mut out = Vec::new();
        outline_stream(&mut tk, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "A\n  B\n    C\n");
    }

    #[test]
    fn outline_skips_wrapper_sets() {
        let mut tk = tokens("<PubmedArticleSet><A>x</A></PubmedArticleSet>");
        let mut out = Vec::new();
        outline_stream(&mut tk, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "A\n");
    }

    #[test]
    fn synopsis_lists_unique_paths() {
        let mut tk = tokens("<A><B>1</B><B>2</B><C/></A>");
        let mut out = Vec::new();
        synopsis_stream(&mut tk, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "A\nA/B\nA/C\n");
    }

    #[test]
    fn verify_accepts_well_formed() {
        let mut tk = tokens("<A><B>x</B></A>");
        let mut out = Vec::new();
        verify_stream(&mut tk, "", &TextFilters::default(), &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn verify_reports_mismatched_tag() {
        let mut tk = tokens("<A><B>x</C></A>");
        let mut out = Vec::new();
        verify_stream(&mut tk, "", &TextFilters::default(), &mut out).unwrap();
        let report = String::from_utf8(out).unwrap();
        assert!(report.contains("Expected </B>, found </C>"));
    }

    #[test]
    fn verify_reports_depth_with_pattern() {
        let mut tk = tokens("<A><B><C>x</C></B></A>");
        let mut out = Vec::new();
        verify_stream(&mut tk, "A", &TextFilters::default(), &mut out).unwrap();
        let report = String::from_utf8(out).unwrap();
        assert!(report.contains("Maximum nesting (3 levels)"));
    }

    #[test]
    fn unbalanced_html_detection() {
        assert!(!unbalanced_html("plain text"));
        assert!(!unbalanced_html("a <i>b</i> c"));
        assert!(unbalanced_html("a <i>b c"));
        assert!(unbalanced_html("a </i> b"));
    }
}
