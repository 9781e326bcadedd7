//! Block reader
//!
//! Fills a fixed buffer from an input stream and yields strings that always
//! end at a '>' character, retaining the unterminated tail as a remainder
//! for the next call. A reserved prefix holds the carried remainder so a
//! single allocation serves the whole run. In HTML-aware mode a '>' closing
//! an inline formatting tag is not accepted as a cut point.

use std::io::Read;

use memchr::memrchr_iter;
use tracing::warn;

use crate::text::{cleanup_bad_spaces, compress_runs_of_spaces, has_bad_space, html_behind};

/// 64 KiB matches the largest chunk a pipe delivers per read; the extra
/// 16 KiB in front is reserved for copying the previous remainder.
pub const BLOCK_SIZE: usize = 65536;
pub const CARRY_SIZE: usize = 16384;

/// Per-run reader switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReaderOptions {
    /// Collapse runs of whitespace on each block
    pub compress_spaces: bool,
    /// Map non-space whitespace codepoints to plain spaces
    pub cleanup_spaces: bool,
    /// Do not cut blocks inside inline HTML formatting tags
    pub html_aware: bool,
}

/// Buffered reader yielding '>'-terminated block strings.
pub struct BlockReader<R: Read> {
    reader: R,
    buffer: Vec<u8>,
    remainder: Vec<u8>,
    position: u64,
    delta: usize,
    closed: bool,
    options: ReaderOptions,
}

impl<R: Read> BlockReader<R> {
    /// Create a block reader over a byte source.
    pub fn new(reader: R, options: ReaderOptions) -> Self {
        BlockReader {
            reader,
            buffer: vec![0; BLOCK_SIZE + CARRY_SIZE],
            remainder: Vec::new(),
            position: 0,
            delta: 0,
            closed: false,
            options,
        }
    }

    /// File offset bookkeeping used to label records with byte offsets.
    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// True once the source is exhausted.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Read one buffer, trim at the last safe '>', and retain the remainder.
    /// Returns the block bytes plus a continue flag set when no '>' was
    /// found and the caller must concatenate with subsequent reads.
    fn next_buffer(&mut self) -> Option<(Vec<u8>, bool)> {
        if self.closed {
            return None;
        }

        // prepend previous remainder to beginning of buffer
        let m = self.remainder.len();
        if m > CARRY_SIZE {
            // remainder larger than the reserved section, hand it back whole
            // and signal the need to keep reading
            let carried = std::mem::take(&mut self.remainder);
            return Some((carried, true));
        }
        self.buffer[..m].copy_from_slice(&self.remainder);
        self.remainder.clear();

        let n = match self.reader.read(&mut self.buffer[m..]) {
            Ok(n) => n,
            Err(err) => {
                warn!("read error: {err}");
                self.closed = true;
                return None;
            }
        };

        if n == 0 {
            self.closed = true;
            if m == 0 {
                return None;
            }
            // final remainder has no terminating '>', discard as malformed
            return None;
        }

        self.position += self.delta as u64;
        self.delta = n;

        let filled = n + m;
        let bufr = &self.buffer[..filled];

        // scan backwards for the last '>' that is a legal cut point
        let mut cut = None;
        for pos in memrchr_iter(b'>', bufr) {
            if self.options.html_aware && html_behind(bufr, pos) {
                continue;
            }
            cut = Some(pos);
            break;
        }

        match cut {
            Some(pos) => {
                self.remainder.extend_from_slice(&bufr[pos + 1..]);
                Some((bufr[..pos + 1].to_vec(), false))
            }
            // no '>' found, signal need to continue reading long content
            None => Some((bufr.to_vec(), true)),
        }
    }

    /// Return the next block string, concatenating reads until the block
    /// ends at a '>'. Empty result means the stream is exhausted.
    pub fn next_block(&mut self) -> String {
        let (mut bytes, mut cont) = match self.next_buffer() {
            Some(r) => r,
            None => return String::new(),
        };

        while cont {
            match self.next_buffer() {
                Some((more, more_cont)) => {
                    bytes.extend_from_slice(&more);
                    cont = more_cont;
                }
                // no sentinel in multi-block buffer at end of file
                None => return String::new(),
            }
        }

        let mut line = String::from_utf8_lossy(&bytes).into_owned();

        if self.options.compress_spaces {
            line = compress_runs_of_spaces(&line);
        }
        if self.options.cleanup_spaces && has_bad_space(&line) {
            line = cleanup_bad_spaces(&line);
        }

        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn drain<R: Read>(mut rdr: BlockReader<R>) -> Vec<String> {
        let mut out = Vec::new();
        loop {
            let block = rdr.next_block();
            if block.is_empty() {
                break;
            }
            out.push(block);
        }
        out
    }

    #[test]
    fn blocks_end_at_angle_bracket() {
        let xml = "<a><b>text</b></a>".as_bytes().to_vec();
        let rdr = BlockReader::new(Cursor::new(xml), ReaderOptions::default());
        for block in drain(rdr) {
            assert!(block.ends_with('>'));
        }
    }

    #[test]
    fn concatenation_recovers_input_up_to_last_bracket() {
        let xml = "<r><x>one</x><x>two</x></r>tail-without-bracket";
        let rdr = BlockReader::new(
            Cursor::new(xml.as_bytes().to_vec()),
            ReaderOptions::default(),
        );
        let all: String = drain(rdr).concat();
        assert_eq!(all, "<r><x>one</x><x>two</x></r>");
    }

    struct TrickleReader {
        data: Vec<u8>,
        pos: usize,
        step: usize,
    }

    impl Read for TrickleReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.data.len() {
                return Ok(0);
            }
            let end = (self.pos + self.step).min(self.data.len());
            let n = end - self.pos;
            buf[..n].copy_from_slice(&self.data[self.pos..end]);
            self.pos = end;
            Ok(n)
        }
    }

    #[test]
    fn trickled_input_yields_same_content() {
        let xml = "<set><rec><id>1</id></rec><rec><id>2</id></rec></set>";
        let rdr = BlockReader::new(
            TrickleReader {
                data: xml.as_bytes().to_vec(),
                pos: 0,
                step: 7,
            },
            ReaderOptions::default(),
        );
        let all: String = drain(rdr).concat();
        assert_eq!(all, xml);
    }

    #[test]
    fn html_aware_backs_off_inline_tags() {
        // the only '>' characters close inline tags, so no cut is legal and
        // the next read must extend the block
        let xml = "<T>alpha <i>beta</i> gamma</T>";
        let rdr = BlockReader::new(
            Cursor::new(xml.as_bytes().to_vec()),
            ReaderOptions {
                html_aware: true,
                ..Default::default()
            },
        );
        let blocks = drain(rdr);
        assert_eq!(blocks.concat(), xml);
        for block in blocks {
            assert!(!block.ends_with("<i>") && !block.ends_with("</i>"));
        }
    }

    #[test]
    fn compress_spaces_option() {
        let xml = "<a>one   two</a>";
        let rdr = BlockReader::new(
            Cursor::new(xml.as_bytes().to_vec()),
            ReaderOptions {
                compress_spaces: true,
                ..Default::default()
            },
        );
        assert_eq!(drain(rdr).concat(), "<a>one two</a>");
    }
}
