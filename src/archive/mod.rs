//! Record archive
//!
//! Content-addressed on-disk store of individual records. Identifiers map
//! deterministically to a sharded directory trie; writes are guarded by a
//! per-identifier lock map with at-most-one-writer discipline; payloads are
//! normalized to LF-terminated lines and optionally gzip-compressed.
//! Postings files live under a separate per-character radix trie.

pub mod posting;
pub mod stash;
pub mod trie;

pub use posting::save_posting;
pub use stash::{compare_record, fetch_record, Comparison, Stasher};
pub use trie::{archive_trie, postings_trie};
