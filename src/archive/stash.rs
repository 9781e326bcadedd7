//! Record stasher and fetcher
//!
//! Writes one record per file under the archive trie. A shared in-use map
//! guarantees at most one writer per identifier: a later index waiting on
//! an earlier one retries for five seconds, an earlier index yielding to a
//! later one skips its write. Payloads are normalized before writing and
//! the normalized bytes may be CRC32-hashed for a verification table.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::warn;

use crate::archive::trie::archive_trie;
use crate::text::{split_left_str, split_right_str};

enum LockState {
    Okay,
    Wait,
    Bail,
}

/// Archive writer shared by the stasher worker pool.
pub struct Stasher {
    root: PathBuf,
    gzip: bool,
    hash: bool,
    /// identifier -> record index currently being written
    in_use: Mutex<HashMap<String, usize>>,
}

impl Stasher {
    pub fn new(root: &Path, gzip: bool, hash: bool) -> Stasher {
        Stasher {
            root: root.to_path_buf(),
            gzip,
            hash,
            in_use: Mutex::new(HashMap::new()),
        }
    }

    fn file_suffix(&self) -> &'static str {
        if self.gzip {
            ".xml.gz"
        } else {
            ".xml"
        }
    }

    fn lock_file(&self, id: &str, index: usize) -> LockState {
        let mut in_use = self.in_use.lock().unwrap();
        match in_use.get(id) {
            Some(&idx) => {
                if idx < index {
                    // a later version is being written elsewhere, skip
                    LockState::Bail
                } else {
                    // an earlier version is being written, wait
                    LockState::Wait
                }
            }
            None => {
                in_use.insert(id.to_string(), index);
                LockState::Okay
            }
        }
    }

    fn free_file(&self, id: &str) {
        let mut in_use = self.in_use.lock().unwrap();
        in_use.remove(id);
    }

    /// Save one record, returning the CRC32 string when hashing is on.
    /// Empty result means the write was skipped or failed.
    pub fn store(&self, text: &str, id: &str, index: usize) -> String {
        let trie = match archive_trie(id) {
            Some(t) => t,
            None => return String::new(),
        };

        let mut attempts = 5;
        loop {
            match self.lock_file(id, index) {
                LockState::Okay => break,
                LockState::Wait => {
                    thread::sleep(Duration::from_secs(1));
                    attempts -= 1;
                    if attempts < 1 {
                        warn!("unable to save '{id}'");
                        return String::new();
                    }
                }
                LockState::Bail => return String::new(),
            }
        }

        let res = self.write_record(text, id, &trie);
        self.free_file(id);
        res
    }

    fn write_record(&self, text: &str, id: &str, trie: &str) -> String {
        let dpath = self.root.join(trie);
        if let Err(err) = fs::create_dir_all(&dpath) {
            warn!("{err}");
            return String::new();
        }
        let fpath = dpath.join(format!("{id}{}", self.file_suffix()));

        let mut file = match File::create(&fpath) {
            Ok(f) => f,
            Err(err) => {
                warn!("{err}");
                return String::new();
            }
        };

        let mut str = normalize_record(text);
        if !str.ends_with('\n') {
            str.push('\n');
        }

        let mut res = String::new();
        if self.hash {
            let mut hasher = crc32fast::Hasher::new();
            hasher.update(str.as_bytes());
            res = hasher.finalize().to_string();
        }

        let written = if self.gzip {
            let mut zpr = GzEncoder::new(&mut file, Compression::best());
            match zpr.write_all(str.as_bytes()) {
                Ok(()) => zpr.finish().map(|_| ()),
                Err(err) => Err(err),
            }
        } else {
            file.write_all(str.as_bytes())
        };
        if let Err(err) = written {
            warn!("{err}");
            return String::new();
        }

        if let Err(err) = file.sync_all() {
            warn!("{err}");
        }

        res
    }
}

/// Normalization applied before every archive write: drop whitespace-only
/// lines and <?...?> preface lines, remove single spaces adjacent to angle
/// brackets, re-terminate every line with LF.
pub fn normalize_record(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("<?") && line.ends_with("?>") {
            continue;
        }
        let line = line.replace("> ", ">").replace(" <", "<");
        out.push_str(&line);
        out.push('\n');
    }

    out
}

/// Load a stored record, trying .xml first and .xml.gz transparently.
/// Missing records are skipped silently.
pub fn fetch_record(root: &Path, id: &str, gzip: bool) -> Option<String> {
    let trie = archive_trie(id)?;

    let suffix = if gzip { ".xml.gz" } else { ".xml" };
    let mut fpath = root.join(&trie).join(format!("{id}{suffix}"));
    let mut iszip = gzip;

    if !fpath.exists() && !gzip {
        fpath = root.join(&trie).join(format!("{id}.xml.gz"));
        iszip = true;
    }

    let mut file = File::open(&fpath).ok()?;
    let mut buf = String::new();

    if iszip {
        let mut zpr = GzDecoder::new(&mut file);
        zpr.read_to_string(&mut buf).ok()?;
    } else {
        file.read_to_string(&mut buf).ok()?;
    }

    Some(buf)
}

/// Outcome of comparing an incoming record against the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    New,
    Updated,
    Unchanged,
}

/// Compare a record against its stored counterpart, optionally ignoring
/// the contents of one named subtree on both sides.
pub fn compare_record(record: &str, root: &Path, id: &str, ignore: &str) -> Comparison {
    let trie = match archive_trie(id) {
        Some(t) => t,
        None => return Comparison::Unchanged,
    };
    let fpath = root.join(&trie).join(format!("{id}.xml"));

    if !fpath.exists() {
        return Comparison::New;
    }

    let mut stored = match fs::read_to_string(&fpath) {
        Ok(s) => s,
        Err(_) => return Comparison::Unchanged,
    };
    if stored.ends_with('\n') {
        stored.pop();
    }

    if !ignore.is_empty() {
        // ignore differences inside the named object
        let ltag = format!("<{ignore}>");
        let (sleft, _) = split_left_str(record, &ltag);
        let (tleft, _) = split_left_str(&stored, &ltag);

        let rtag = format!("</{ignore}>");
        let (_, srght) = split_right_str(record, &rtag);
        let (_, trght) = split_right_str(&stored, &rtag);

        if sleft == tleft && srght == trght {
            return Comparison::Unchanged;
        }
    } else if record == stored {
        return Comparison::Unchanged;
    }

    Comparison::Updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn normalize_drops_blank_and_preface_lines() {
        let text = "<?xml version=\"1.0\"?>\n\n  <Rec> \n  <Id>1</Id>\n</Rec>";
        assert_eq!(normalize_record(text), "<Rec>\n<Id>1</Id>\n</Rec>\n");
    }

    #[test]
    fn normalize_is_idempotent() {
        let text = "<Rec>\n <Id> 1 </Id>\n</Rec>\n";
        let once = normalize_record(text);
        assert_eq!(normalize_record(&once), once);
    }

    #[test]
    fn store_then_fetch_round_trips() {
        let dir = TempDir::new().unwrap();
        let stasher = Stasher::new(dir.path(), false, false);
        let record = "<Rec>\n<Id>6301692</Id>\n</Rec>";
        stasher.store(record, "6301692", 1);
        let fetched = fetch_record(dir.path(), "6301692", false).unwrap();
        assert_eq!(fetched, normalize_record(record));
    }

    #[test]
    fn gzip_round_trip_with_plain_fallback() {
        let dir = TempDir::new().unwrap();
        let stasher = Stasher::new(dir.path(), true, true);
        let record = "<Rec><Id>AAQ05867.1</Id></Rec>";
        let hash = stasher.store(record, "AAQ05867.1", 1);
        assert!(!hash.is_empty());
        // fetch without -gzip falls back to the .xml.gz file
        let fetched = fetch_record(dir.path(), "AAQ05867.1", false).unwrap();
        assert_eq!(fetched, normalize_record(record));
    }

    #[test]
    fn hash_matches_crc32_of_normalized_bytes() {
        let dir = TempDir::new().unwrap();
        let stasher = Stasher::new(dir.path(), false, true);
        let record = "<Rec><Id>77</Id></Rec>";
        let hash = stasher.store(record, "77", 1);
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(normalize_record(record).as_bytes());
        assert_eq!(hash, hasher.finalize().to_string());
    }

    #[test]
    fn newer_index_wins_race() {
        let dir = TempDir::new().unwrap();
        let stasher = Arc::new(Stasher::new(dir.path(), false, false));

        // simulate a newer version mid-write; the older write must skip
        stasher
            .in_use
            .lock()
            .unwrap()
            .insert("90210".to_string(), 7);
        let res = stasher.store("<Rec>old</Rec>", "90210", 3);
        assert!(res.is_empty());
        assert!(fetch_record(dir.path(), "90210", false).is_none());
        stasher.in_use.lock().unwrap().remove("90210");

        stasher.store("<Rec>new</Rec>", "90210", 7);
        assert_eq!(
            fetch_record(dir.path(), "90210", false).unwrap(),
            "<Rec>new</Rec>\n"
        );
    }

    #[test]
    fn concurrent_writers_single_file() {
        let dir = TempDir::new().unwrap();
        let stasher = Arc::new(Stasher::new(dir.path(), false, false));

        let mut handles = Vec::new();
        for index in 1..=4 {
            let stasher = Arc::clone(&stasher);
            handles.push(thread::spawn(move || {
                let text = format!("<Rec><V>{index}</V></Rec>");
                stasher.store(&text, "555", index);
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        let stored = fetch_record(dir.path(), "555", false).unwrap();
        assert!(stored.starts_with("<Rec><V>"));
        assert!(stasher.in_use.lock().unwrap().is_empty());
    }

    #[test]
    fn compare_reports_new_updated_unchanged() {
        let dir = TempDir::new().unwrap();
        let stasher = Stasher::new(dir.path(), false, false);

        let record = "<Rec><Id>42</Id></Rec>";
        assert_eq!(
            compare_record(record, dir.path(), "42", ""),
            Comparison::New
        );

        stasher.store(record, "42", 1);
        let stored = "<Rec><Id>42</Id></Rec>";
        assert_eq!(
            compare_record(stored, dir.path(), "42", ""),
            Comparison::Unchanged
        );

        let modified = "<Rec><Id>42</Id><New>x</New></Rec>";
        assert_eq!(
            compare_record(modified, dir.path(), "42", ""),
            Comparison::Updated
        );
    }

    #[test]
    fn compare_ignores_named_subtree() {
        let dir = TempDir::new().unwrap();
        let stasher = Stasher::new(dir.path(), false, false);
        stasher.store("<Rec><Id>9</Id><Date>old</Date></Rec>", "9", 1);

        // a change confined to the ignored subtree is invisible
        let incoming = "<Rec><Id>9</Id><Date>new</Date></Rec>";
        assert_eq!(
            compare_record(incoming, dir.path(), "9", "Date"),
            Comparison::Unchanged
        );
        assert_eq!(
            compare_record(incoming, dir.path(), "9", ""),
            Comparison::Updated
        );
        // a change outside the ignored subtree still registers
        let incoming = "<Rec><Id>10</Id><Date>old</Date></Rec>";
        assert_eq!(
            compare_record(incoming, dir.path(), "9", "Date"),
            Comparison::Updated
        );
    }
}
