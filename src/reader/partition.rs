//! Pattern partitioner
//!
//! Scans the block stream for <Pattern> ... </Pattern> spans with a
//! Boyer-Moore-Horspool skip table and hands each complete record to a
//! callback together with its 1-based index and byte offset. Nesting depth
//! is tracked so self-nested patterns yield the outermost span. The
//! heterogeneous mode (-pattern Parent/*) anchors on the parent element and
//! emits each child object met at depth one, rebuilding the skip table as
//! child names change.

use std::io::Read;

use crate::reader::block::BlockReader;

/// Skip table sized to one pattern name.
struct Scanner {
    pattern: Vec<u8>,
    char_skip: [usize; 256],
}

impl Scanner {
    fn new(pattern: &str) -> Option<Scanner> {
        if pattern.is_empty() {
            return None;
        }
        let pattern = pattern.as_bytes().to_vec();
        let patlen = pattern.len();
        let last = patlen - 1;

        let mut char_skip = [patlen; 256];
        for (i, &ch) in pattern.iter().take(last).enumerate() {
            char_skip[ch as usize] = last - i;
        }

        Some(Scanner { pattern, char_skip })
    }

    /// Candidate must sit inside an element tag: <pattern ...>, </pattern ...>,
    /// or <pattern ... />.
    fn is_an_element(text: &[u8], lf: isize, rt: usize, mx: usize) -> bool {
        let left_ok = (lf >= 0 && text[lf as usize] == b'<')
            || (lf > 0 && text[lf as usize] == b'/' && text[lf as usize - 1] == b'<');
        if !left_ok {
            return false;
        }
        (rt < mx && (text[rt] == b'>' || text[rt] == b' '))
            || (rt + 1 < mx && text[rt] == b'/' && text[rt + 1] == b'>')
    }

    /// Modified Boyer-Moore-Horspool search. Returns (next scan position,
    /// index of the opening '<', index just past the closing '>').
    fn find_next_match(&self, text: &[u8], offset: usize) -> Option<(usize, usize, usize)> {
        let txtlen = text.len();
        let patlen = self.pattern.len();
        if txtlen < patlen {
            return None;
        }
        let max = txtlen - patlen;
        let last = patlen - 1;

        let mut i = offset;
        while i <= max {
            let mut j = last as isize;
            let mut k = i + last;
            while j >= 0 && text[k] == self.pattern[j as usize] {
                j -= 1;
                if k == 0 {
                    break;
                }
                k -= 1;
            }
            if j < 0 && Self::is_an_element(text, i as isize - 1, i + patlen, txtlen) {
                // find positions of flanking brackets
                let mut lf = i.saturating_sub(1);
                while lf > 0 && text[lf] != b'<' {
                    lf -= 1;
                }
                let mut rt = i + patlen;
                while rt < txtlen && text[rt] != b'>' {
                    rt += 1;
                }
                return Some((i + 1, lf, rt + 1));
            }
            // displacement table shifts the pattern one or more positions
            let ch = text[i + last];
            i += self.char_skip[ch as usize];
        }

        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatternMatch {
    None,
    Start,
    SelfClose,
    Stop,
}

/// Classify the next pattern-name element at or after pos. Returns the
/// match kind, the position of interest (span start for start tags, span
/// end for stop tags), and the next scan position.
fn next_pattern(scr: &Scanner, text: &[u8], pos: usize) -> (PatternMatch, usize, usize) {
    match scr.find_next_match(text, pos) {
        None => (PatternMatch::None, 0, 0),
        Some((next, start, stop)) => {
            if text[start + 1] == b'/' {
                (PatternMatch::Stop, stop, next + 1)
            } else if stop >= 2 && text[stop - 2] == b'/' {
                (PatternMatch::SelfClose, start, next + 1)
            } else {
                (PatternMatch::Start, start, next + 1)
            }
        }
    }
}

/// Partition the block stream by pattern, invoking the callback once per
/// record with (1-based index, byte offset, record string).
pub fn partition_pattern<R: Read>(
    pat: &str,
    star: bool,
    rdr: &mut BlockReader<R>,
    proc: &mut dyn FnMut(usize, u64, &str),
) {
    if pat.is_empty() {
        return;
    }
    if star {
        partition_star(pat, rdr, proc);
    } else {
        partition_normal(pat, rdr, proc);
    }
}

/// -pattern Object construct
fn partition_normal<R: Read>(
    pat: &str,
    rdr: &mut BlockReader<R>,
    proc: &mut dyn FnMut(usize, u64, &str),
) {
    let scr = match Scanner::new(pat) {
        Some(s) => s,
        None => return,
    };

    // current depth of pattern objects
    let mut level = 0usize;
    let mut in_pattern = false;
    let mut accumulator = String::new();
    let mut offset = 0u64;
    let mut rec = 0usize;

    loop {
        let line = rdr.next_block();
        if line.is_empty() {
            return;
        }
        let bytes = line.as_bytes();

        let mut begin = 0usize;
        let mut next = 0usize;

        loop {
            let (matched, pos, nxt) = next_pattern(&scr, bytes, next);
            next = nxt;
            match matched {
                PatternMatch::Start => {
                    if level == 0 {
                        in_pattern = true;
                        begin = pos;
                        offset = rdr.position() + pos as u64;
                    }
                    level += 1;
                }
                PatternMatch::Stop => {
                    level = level.saturating_sub(1);
                    if level == 0 {
                        in_pattern = false;
                        accumulator.push_str(&line[begin..pos]);
                        if !accumulator.is_empty() {
                            rec += 1;
                            proc(rec, offset, &accumulator);
                        }
                        accumulator.clear();
                    }
                }
                PatternMatch::SelfClose => {}
                PatternMatch::None => {
                    if in_pattern {
                        accumulator.push_str(&line[begin..]);
                    }
                    break;
                }
            }
        }
    }
}

/// -pattern Parent/* construct, works with catenated files but not with
/// recursive or self-closing children (preprocess those with -format).
fn partition_star<R: Read>(
    pat: &str,
    rdr: &mut BlockReader<R>,
    proc: &mut dyn FnMut(usize, u64, &str),
) {
    let mut scr = match Scanner::new(pat) {
        Some(s) => s,
        None => return,
    };

    let mut level = 0usize;
    let mut in_pattern = false;
    let mut accumulator = String::new();
    let mut offset = 0u64;
    let mut rec = 0usize;

    let mut line;
    let mut next = 0usize;
    let mut matched;

    // read to the first parent start tag
    loop {
        next = 0;
        line = rdr.next_block();
        if line.is_empty() {
            return;
        }
        let (m, _, nxt) = next_pattern(&scr, line.as_bytes(), next);
        matched = m;
        next = nxt;
        if matched == PatternMatch::Start {
            break;
        }
    }

    // name of the next child element, "/" for the parent stop tag
    fn next_element(text: &str, pos: usize, pat: &str) -> String {
        let bytes = text.as_bytes();
        let mut tag_start = None;
        for (i, &b) in bytes.iter().enumerate().skip(pos) {
            if b == b'<' {
                tag_start = Some(i + 1);
                break;
            }
        }
        let start = match tag_start {
            Some(s) if s < bytes.len() => s,
            _ => return String::new(),
        };
        if bytes[start] == b'/' {
            if text[start + 1..].starts_with(pat) {
                // parent stop tag, continue in case of catenated files
                return "/".to_string();
            }
            return String::new();
        }
        for (i, &b) in bytes.iter().enumerate().skip(start) {
            if b == b'>' || b == b' ' || b == b'/' {
                return text[start..i].to_string();
            }
        }
        String::new()
    }

    let mut last = pat.to_string();

    loop {
        let mut tag = next_element(&line, next, pat);
        if tag.is_empty() {
            next = 0;
            line = rdr.next_block();
            if line.is_empty() {
                break;
            }
            tag = next_element(&line, next, pat);
        }
        if tag.is_empty() {
            return;
        }

        // check for catenated parent set files
        if tag == "/" {
            scr = match Scanner::new(pat) {
                Some(s) => s,
                None => return,
            };
            last = pat.to_string();
            // confirm the parent stop tag just found
            let (m, _, nxt) = next_pattern(&scr, line.as_bytes(), next);
            next = nxt;
            if m != PatternMatch::Stop {
                return;
            }
            // look for a new parent start tag
            loop {
                let (m, _, nxt) = next_pattern(&scr, line.as_bytes(), next);
                next = nxt;
                if m == PatternMatch::Start {
                    matched = m;
                    break;
                }
                next = 0;
                line = rdr.next_block();
                if line.is_empty() {
                    matched = PatternMatch::None;
                    break;
                }
            }
            if matched != PatternMatch::Start {
                return;
            }
            continue;
        }

        if tag != last {
            scr = match Scanner::new(&tag) {
                Some(s) => s,
                None => return,
            };
            last = tag;
        }

        let mut begin = 0usize;
        loop {
            let (m, pos, nxt) = next_pattern(&scr, line.as_bytes(), next);
            next = nxt;
            match m {
                PatternMatch::Start => {
                    if level == 0 {
                        in_pattern = true;
                        begin = pos;
                        offset = rdr.position() + pos as u64;
                    }
                    level += 1;
                }
                PatternMatch::Stop => {
                    level = level.saturating_sub(1);
                    if level == 0 {
                        in_pattern = false;
                        accumulator.push_str(&line[begin..pos]);
                        if !accumulator.is_empty() {
                            rec += 1;
                            proc(rec, offset, &accumulator);
                        }
                        accumulator.clear();
                        break;
                    }
                }
                _ => {
                    if in_pattern {
                        accumulator.push_str(&line[begin..]);
                    }
                    begin = 0;
                    next = 0;
                    line = rdr.next_block();
                    if line.is_empty() {
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::block::ReaderOptions;
    use std::io::Cursor;

    fn run(xml: &str, pat: &str, star: bool) -> Vec<(usize, String)> {
        let mut rdr = BlockReader::new(
            Cursor::new(xml.as_bytes().to_vec()),
            ReaderOptions::default(),
        );
        let mut out = Vec::new();
        partition_pattern(pat, star, &mut rdr, &mut |rec, _ofs, text| {
            out.push((rec, text.to_string()));
        });
        out
    }

    #[test]
    fn carves_each_record() {
        let xml = "<Set><Rec><Id>1</Id></Rec><Rec><Id>2</Id></Rec></Set>";
        let recs = run(xml, "Rec", false);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0], (1, "<Rec><Id>1</Id></Rec>".to_string()));
        assert_eq!(recs[1], (2, "<Rec><Id>2</Id></Rec>".to_string()));
    }

    #[test]
    fn records_are_substrings_of_input() {
        let xml = "<S><R a=\"x\"><V>q</V></R>\n<R><V>w</V></R></S>";
        for (_, rec) in run(xml, "R", false) {
            assert!(xml.contains(&rec));
        }
    }

    #[test]
    fn nested_pattern_returns_outermost_span() {
        let xml = "<Taxon><Id>9606</Id><Taxon><Id>9605</Id></Taxon></Taxon>";
        let recs = run(xml, "Taxon", false);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].1, xml);
    }

    #[test]
    fn name_boundary_is_respected() {
        // RecordSet must not match Record
        let xml = "<RecordSet><Record><Id>7</Id></Record></RecordSet>";
        let recs = run(xml, "Record", false);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].1, "<Record><Id>7</Id></Record>");
    }

    #[test]
    fn attributes_on_pattern_tag() {
        let xml = "<S><Rec status=\"ok\"><Id>3</Id></Rec></S>";
        let recs = run(xml, "Rec", false);
        assert_eq!(recs[0].1, "<Rec status=\"ok\"><Id>3</Id></Rec>");
    }

    #[test]
    fn star_mode_emits_heterogeneous_children() {
        let xml = "<Parent><Alpha><X>1</X></Alpha><Beta><Y>2</Y></Beta></Parent>";
        let recs = run(xml, "Parent", true);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].1, "<Alpha><X>1</X></Alpha>");
        assert_eq!(recs[1].1, "<Beta><Y>2</Y></Beta>");
    }

    #[test]
    fn star_mode_handles_catenated_sets() {
        let xml = "<P><A><X>1</X></A></P><P><B><Y>2</Y></B></P>";
        let recs = run(xml, "P", true);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].1, "<A><X>1</X></A>");
        assert_eq!(recs[1].1, "<B><Y>2</Y></B>");
    }

    #[test]
    fn offsets_are_monotonic() {
        let xml = "<S><R>a</R><R>b</R><R>c</R></S>";
        let mut rdr = BlockReader::new(
            Cursor::new(xml.as_bytes().to_vec()),
            ReaderOptions::default(),
        );
        let mut offsets = Vec::new();
        partition_pattern("R", false, &mut rdr, &mut |_, ofs, _| offsets.push(ofs));
        let mut sorted = offsets.clone();
        sorted.sort_unstable();
        assert_eq!(offsets, sorted);
    }
}
