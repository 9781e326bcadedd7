//! Concurrent record pipeline
//!
//! Producer, worker pools, and order-restoring sink connected by bounded
//! channels. Every stage owns its output sender; dropping the last sender
//! closes the channel, which is the shutdown signal for the next stage.
//! Records are labeled with a monotonically increasing index at the
//! producer and re-serialized by the unshuffler's min-heap, so output order
//! always matches input order regardless of worker count.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};
use std::io::{BufRead, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::archive::{fetch_record, save_posting, Stasher};
use crate::dom::{scan_identifier, IndexTarget};
use crate::query::{execute_query, Block, QueryOptions};
use crate::reader::{partition_pattern, BlockReader};
use crate::text::split_left;

/// One record traveling between stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extract {
    pub index: usize,
    pub ident: String,
    pub text: String,
}

impl PartialOrd for Extract {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Extract {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.index.cmp(&other.index)
    }
}

/// Channel and pool sizing shared by all stages.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// bounded channel depth
    pub chan_depth: usize,
    /// workers per fan-out stage
    pub num_serve: usize,
    /// unshuffler look-ahead bound
    pub heap_size: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            chan_depth: 16,
            num_serve: 4,
            heap_size: 16,
        }
    }
}

impl PipelineOptions {
    fn channel(&self) -> (Sender<Extract>, Receiver<Extract>) {
        bounded(self.chan_depth.max(1))
    }
}

/// Partition the block stream and send each record with its index.
pub fn create_producer<R: Read + Send + 'static>(
    pat: &str,
    star: bool,
    mut rdr: BlockReader<R>,
    opts: &PipelineOptions,
) -> Receiver<Extract> {
    let (tx, rx) = opts.channel();
    let pat = pat.to_string();

    thread::spawn(move || {
        partition_pattern(&pat, star, &mut rdr, &mut |rec, _ofs, text| {
            let _ = tx.send(Extract {
                index: rec,
                ident: String::new(),
                text: text.to_string(),
            });
        });
    });

    rx
}

/// Read identifier lines, labeling each with its line number.
pub fn create_uid_reader<R: BufRead + Send + 'static>(
    input: R,
    opts: &PipelineOptions,
) -> Receiver<Extract> {
    let (tx, rx) = opts.channel();

    thread::spawn(move || {
        for (idx, line) in input.lines().enumerate() {
            let file = match line {
                Ok(l) => l,
                Err(_) => break,
            };
            let _ = tx.send(Extract {
                index: idx + 1,
                ident: String::new(),
                text: file,
            });
        }
    });

    rx
}

/// Read uid TAB term lines, grouping uids of adjacent equal terms.
pub fn create_term_list_reader<R: BufRead + Send + 'static>(
    input: R,
    opts: &PipelineOptions,
) -> Receiver<Extract> {
    let (tx, rx) = opts.channel();

    thread::spawn(move || {
        let mut buffer = String::new();
        let mut prev = String::new();
        let mut count = 0usize;
        let mut idx = 0usize;
        let mut term = String::new();

        for line in input.lines() {
            let line = match line {
                Ok(l) => l,
                Err(_) => break,
            };
            idx += 1;

            let (uid, t) = split_left(&line, '\t');
            let t = t.to_string();

            if !prev.is_empty() && prev != t {
                let _ = tx.send(Extract {
                    index: idx,
                    ident: prev.clone(),
                    text: std::mem::take(&mut buffer),
                });
                count = 0;
            }

            buffer.push_str(uid);
            buffer.push('\n');
            count += 1;

            prev = t.clone();
            term = t;
        }

        if count > 0 {
            let _ = tx.send(Extract {
                index: idx,
                ident: term,
                text: buffer,
            });
        }
    });

    rx
}

/// Worker pool running the extraction executor on each record.
pub fn create_consumers(
    cmds: Arc<Block>,
    qopts: Arc<QueryOptions>,
    parent: &str,
    opts: &PipelineOptions,
    inp: Receiver<Extract>,
) -> Receiver<Extract> {
    let (tx, rx) = opts.channel();
    let parent = parent.to_string();

    for _ in 0..opts.num_serve.max(1) {
        let cmds = Arc::clone(&cmds);
        let qopts = Arc::clone(&qopts);
        let parent = parent.clone();
        let inp = inp.clone();
        let tx = tx.clone();

        thread::spawn(move || {
            for ext in inp.iter() {
                if ext.text.is_empty() {
                    let _ = tx.send(ext);
                    continue;
                }
                let str = execute_query(&ext.text, &parent, ext.index, &cmds, &qopts);
                // send even if empty so the unshuffler sees every index
                let _ = tx.send(Extract {
                    index: ext.index,
                    ident: String::new(),
                    text: str,
                });
            }
        });
    }

    rx
}

/// Worker pool extracting only the identifier, passing the record through.
pub fn create_examiners(
    target: Arc<IndexTarget>,
    html_aware: bool,
    parent: &str,
    opts: &PipelineOptions,
    inp: Receiver<Extract>,
) -> Receiver<Extract> {
    let (tx, rx) = opts.channel();
    let parent = parent.to_string();

    for _ in 0..opts.num_serve.max(1) {
        let target = Arc::clone(&target);
        let parent = parent.clone();
        let inp = inp.clone();
        let tx = tx.clone();

        thread::spawn(move || {
            for ext in inp.iter() {
                if ext.text.is_empty() {
                    let _ = tx.send(ext);
                    continue;
                }
                let id = scan_identifier(&ext.text, &parent, &target, html_aware);
                let _ = tx.send(Extract {
                    index: ext.index,
                    ident: id,
                    text: ext.text,
                });
            }
        });
    }

    rx
}

/// Restore input order with a min-heap keyed by record index. Up to
/// heap_size out-of-order items are buffered before each flush attempt.
pub fn create_unshuffler(opts: &PipelineOptions, inp: Receiver<Extract>) -> Receiver<Extract> {
    let (tx, rx) = opts.channel();
    let heap_size = opts.heap_size.max(1);

    thread::spawn(move || {
        let mut heap: BinaryHeap<Reverse<Extract>> = BinaryHeap::new();

        // index of the next desired result
        let mut next = 1usize;
        let mut delay = 0usize;

        for ext in inp.iter() {
            heap.push(Reverse(ext));

            // read several values before checking for the next record
            if delay < heap_size {
                delay += 1;
                continue;
            }
            delay = 0;

            while let Some(Reverse(curr)) = heap.pop() {
                if curr.index > next {
                    // not ready yet, push back and wait for more input
                    heap.push(Reverse(curr));
                    break;
                }
                if curr.index == next {
                    next += 1;
                }
                if tx.send(curr).is_err() {
                    return;
                }
            }
        }

        // send the remainder of the heap in order
        while let Some(Reverse(curr)) = heap.pop() {
            if tx.send(curr).is_err() {
                return;
            }
        }
    });

    rx
}

/// Drop the earlier of two adjacent records with the same identifier.
pub fn create_uniquer(opts: &PipelineOptions, inp: Receiver<Extract>) -> Receiver<Extract> {
    let (tx, rx) = opts.channel();

    thread::spawn(move || {
        let mut prev = Extract::default();

        for curr in inp.iter() {
            if !prev.text.is_empty() && prev.ident != curr.ident {
                if tx.send(prev).is_err() {
                    return;
                }
                prev = curr;
            } else {
                prev = curr;
            }
        }

        if !prev.text.is_empty() {
            let _ = tx.send(prev);
        }
    });

    rx
}

/// Drop records whose identifier appears in the skip set.
pub fn create_deleter(
    should_skip: HashSet<String>,
    opts: &PipelineOptions,
    inp: Receiver<Extract>,
) -> Receiver<Extract> {
    let (tx, rx) = opts.channel();

    thread::spawn(move || {
        for curr in inp.iter() {
            if should_skip.contains(&curr.ident) {
                continue;
            }
            if tx.send(curr).is_err() {
                return;
            }
        }
    });

    rx
}

/// Worker pool writing records into the archive. Emits one report line per
/// record: the identifier, plus the CRC32 when hashing is on.
pub fn create_stashers(
    stasher: Arc<Stasher>,
    hash: bool,
    opts: &PipelineOptions,
    inp: Receiver<Extract>,
) -> Receiver<String> {
    let (tx, rx) = bounded::<String>(opts.chan_depth.max(1));

    for _ in 0..opts.num_serve.max(1) {
        let stasher = Arc::clone(&stasher);
        let inp = inp.clone();
        let tx = tx.clone();

        thread::spawn(move || {
            for ext in inp.iter() {
                let hsh = stasher.store(&ext.text, &ext.ident, ext.index);
                let mut res = ext.ident;
                if hash {
                    res.push('\t');
                    res.push_str(&hsh);
                }
                res.push('\n');
                if tx.send(res).is_err() {
                    return;
                }
            }
        });
    }

    rx
}

/// Worker pool loading archived records named by incoming identifiers.
pub fn create_fetchers(
    root: PathBuf,
    gzip: bool,
    opts: &PipelineOptions,
    inp: Receiver<Extract>,
) -> Receiver<Extract> {
    let (tx, rx) = opts.channel();

    for _ in 0..opts.num_serve.max(1) {
        let root = root.clone();
        let inp = inp.clone();
        let tx = tx.clone();

        thread::spawn(move || {
            for ext in inp.iter() {
                // fetch misses are skipped silently
                let text = match fetch_record(&root, &ext.text, gzip) {
                    Some(t) => t,
                    None => continue,
                };
                let _ = tx.send(Extract {
                    index: ext.index,
                    ident: ext.text,
                    text,
                });
            }
        });
    }

    rx
}

/// Worker pool appending grouped postings lists.
pub fn create_posters(
    root: PathBuf,
    opts: &PipelineOptions,
    inp: Receiver<Extract>,
) -> Receiver<String> {
    let (tx, rx) = bounded::<String>(opts.chan_depth.max(1));

    for _ in 0..opts.num_serve.max(1) {
        let root = root.clone();
        let inp = inp.clone();
        let tx = tx.clone();

        thread::spawn(move || {
            for ext in inp.iter() {
                save_posting(&root, &ext.ident, &ext.text);
                if tx.send(ext.ident).is_err() {
                    return;
                }
            }
        });
    }

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::parse_arguments;
    use crate::reader::ReaderOptions;
    use std::io::Cursor;

    fn options(workers: usize) -> PipelineOptions {
        PipelineOptions {
            chan_depth: workers.max(1),
            num_serve: workers,
            heap_size: 16,
        }
    }

    fn synthetic_records(n: usize) -> String {
        let mut xml = String::from("<Set>");
        for i in 1..=n {
            xml.push_str(&format!("<Rec><Id>{i}</Id></Rec>"));
        }
        xml.push_str("</Set>");
        xml
    }

    #[test]
    fn producer_labels_records_in_order() {
        let xml = synthetic_records(50);
        let rdr = BlockReader::new(
            Cursor::new(xml.into_bytes()),
            ReaderOptions::default(),
        );
        let out = create_producer("Rec", false, rdr, &options(1));
        let records: Vec<Extract> = out.iter().collect();
        assert_eq!(records.len(), 50);
        for (i, rec) in records.iter().enumerate() {
            assert_eq!(rec.index, i + 1);
        }
    }

    #[test]
    fn unshuffler_restores_order() {
        let opts = options(1);
        let (tx, inp) = bounded(64);
        // adversarial arrival order
        let mut indices: Vec<usize> = (1..=40).collect();
        indices.reverse();
        indices.swap(0, 20);
        for idx in indices {
            tx.send(Extract {
                index: idx,
                ident: String::new(),
                text: format!("r{idx}"),
            })
            .unwrap();
        }
        drop(tx);

        let out = create_unshuffler(&opts, inp);
        let order: Vec<usize> = out.iter().map(|e| e.index).collect();
        assert_eq!(order, (1..=40).collect::<Vec<_>>());
    }

    #[test]
    fn extraction_order_is_independent_of_worker_count() {
        let xml = synthetic_records(500);
        let args: Vec<String> = ["-pattern", "Rec", "-element", "Id"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let cmds = Arc::new(parse_arguments(&args, "Rec").unwrap());
        let qopts = Arc::new(QueryOptions {
            farm_size: 64,
            ..Default::default()
        });

        for workers in [1, 8] {
            let opts = options(workers);
            let rdr = BlockReader::new(
                Cursor::new(xml.clone().into_bytes()),
                ReaderOptions::default(),
            );
            let xmlq = create_producer("Rec", false, rdr, &opts);
            let tblq = create_consumers(Arc::clone(&cmds), Arc::clone(&qopts), "", &opts, xmlq);
            let unsq = create_unshuffler(&opts, tblq);

            let ids: Vec<String> = unsq.iter().map(|e| e.text.trim().to_string()).collect();
            let expected: Vec<String> = (1..=500).map(|i| i.to_string()).collect();
            assert_eq!(ids, expected, "workers = {workers}");
        }
    }

    #[test]
    fn unshuffler_stress_ten_thousand_records() {
        let xml = synthetic_records(10_000);
        let args: Vec<String> = ["-pattern", "Rec", "-element", "Id"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let cmds = Arc::new(parse_arguments(&args, "Rec").unwrap());
        let qopts = Arc::new(QueryOptions {
            farm_size: 64,
            ..Default::default()
        });

        let opts = PipelineOptions {
            chan_depth: 8,
            num_serve: 8,
            heap_size: 16,
        };
        let rdr = BlockReader::new(Cursor::new(xml.into_bytes()), ReaderOptions::default());
        let xmlq = create_producer("Rec", false, rdr, &opts);
        let tblq = create_consumers(cmds, qopts, "", &opts, xmlq);
        let unsq = create_unshuffler(&opts, tblq);

        let mut expected = 1usize;
        for ext in unsq.iter() {
            assert_eq!(ext.text.trim(), expected.to_string());
            expected += 1;
        }
        assert_eq!(expected, 10_001);
    }

    #[test]
    fn uniquer_drops_earlier_duplicates() {
        let opts = options(1);
        let (tx, inp) = bounded(16);
        for (idx, id, text) in [
            (1, "A", "first"),
            (2, "A", "second"),
            (3, "B", "third"),
        ] {
            tx.send(Extract {
                index: idx,
                ident: id.to_string(),
                text: text.to_string(),
            })
            .unwrap();
        }
        drop(tx);

        let out: Vec<Extract> = create_uniquer(&opts, inp).iter().collect();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text, "second");
        assert_eq!(out[1].text, "third");
    }

    #[test]
    fn deleter_skips_listed_identifiers() {
        let opts = options(1);
        let (tx, inp) = bounded(16);
        for (idx, id) in [(1, "keep"), (2, "drop"), (3, "keep2")] {
            tx.send(Extract {
                index: idx,
                ident: id.to_string(),
                text: "x".to_string(),
            })
            .unwrap();
        }
        drop(tx);

        let skip: HashSet<String> = ["drop".to_string()].into_iter().collect();
        let out: Vec<Extract> = create_deleter(skip, &opts, inp).iter().collect();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|e| e.ident != "drop"));
    }

    #[test]
    fn term_list_reader_groups_adjacent_terms() {
        let opts = options(1);
        let input = Cursor::new(b"1\talpha\n2\talpha\n3\tbeta\n".to_vec());
        let out: Vec<Extract> = create_term_list_reader(input, &opts).iter().collect();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].ident, "alpha");
        assert_eq!(out[0].text, "1\n2\n");
        assert_eq!(out[1].ident, "beta");
        assert_eq!(out[1].text, "3\n");
    }

    #[test]
    fn archive_pipeline_stores_and_fetches() {
        use tempfile::TempDir;

        let dir = TempDir::new().unwrap();
        let opts = options(4);
        let xml = synthetic_records(25);
        let rdr = BlockReader::new(
            Cursor::new(xml.into_bytes()),
            ReaderOptions::default(),
        );

        let target = Arc::new(IndexTarget::parse("Rec/Id"));
        let xmlq = create_producer("Rec", false, rdr, &opts);
        let idnq = create_examiners(target, false, "", &opts, xmlq);
        let unsq = create_unshuffler(&opts, idnq);
        let unqq = create_uniquer(&opts, unsq);
        let stasher = Arc::new(Stasher::new(dir.path(), false, false));
        let stsq = create_stashers(stasher, false, &opts, unqq);

        let stored: Vec<String> = stsq.iter().collect();
        assert_eq!(stored.len(), 25);

        // now fetch them back through the retrieval stages
        let ids = (1..=25).map(|i| format!("{i}\n")).collect::<String>();
        let uidq = create_uid_reader(Cursor::new(ids.into_bytes()), &opts);
        let strq = create_fetchers(dir.path().to_path_buf(), false, &opts, uidq);
        let unsq = create_unshuffler(&opts, strq);

        let fetched: Vec<Extract> = unsq.iter().collect();
        assert_eq!(fetched.len(), 25);
        for (i, rec) in fetched.iter().enumerate() {
            assert!(rec.text.contains(&format!("<Id>{}</Id>", i + 1)));
        }
    }
}
