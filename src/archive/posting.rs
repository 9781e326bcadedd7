//! Postings writer
//!
//! Appends grouped UID lists to uids.txt files under the per-character
//! radix trie of the term. Appending keeps earlier postings for the same
//! term from successive input batches.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use tracing::warn;

use crate::archive::trie::postings_trie;

/// Append one term's UID list to its postings file.
pub fn save_posting(root: &Path, term: &str, uids: &str) {
    let trie = match postings_trie(term) {
        Some(t) => t,
        None => return,
    };

    let dpath = root.join(trie);
    if let Err(err) = fs::create_dir_all(&dpath) {
        warn!("{err}");
        return;
    }
    let fpath = dpath.join("uids.txt");

    let mut file = match OpenOptions::new().append(true).create(true).open(&fpath) {
        Ok(f) => f,
        Err(err) => {
            warn!("{err}");
            return;
        }
    };

    let result = if uids.ends_with('\n') {
        file.write_all(uids.as_bytes())
    } else {
        file.write_all(uids.as_bytes())
            .and_then(|_| file.write_all(b"\n"))
    };
    if let Err(err) = result.and_then(|_| file.sync_all()) {
        warn!("{err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn posting_appends_under_radix_path() {
        let dir = TempDir::new().unwrap();
        save_posting(dir.path(), "tnf", "101\n102\n");
        save_posting(dir.path(), "tnf", "103\n");
        let path = dir.path().join("t/n/f/uids.txt");
        let body = fs::read_to_string(path).unwrap();
        assert_eq!(body, "101\n102\n103\n");
    }

    #[test]
    fn posting_folds_term_characters() {
        let dir = TempDir::new().unwrap();
        save_posting(dir.path(), "heat shock", "7\n");
        assert!(dir.path().join("h/e/a/t/_/s/h/o/c/k/uids.txt").exists());
    }
}
