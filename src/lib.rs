//! xsieve - Streaming XML record extraction
//!
//! Subsystems:
//! - reader: block reader + pattern partitioner for unbounded input
//! - core: byte-table tokenizers (per-record and streaming)
//! - dom: arena-allocated record trees
//! - query: compiled extraction command tree and its executor
//! - pipeline: producer / worker pool / order-restoring heap stages
//! - archive: trie-addressed on-disk record store
//! - stream: whole-stream verbs (format, outline, synopsis, verify, filter)

pub mod archive;
pub mod cli;
pub mod core;
pub mod dom;
pub mod pipeline;
pub mod query;
pub mod reader;
pub mod sample;
pub mod stream;
pub mod text;

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;
