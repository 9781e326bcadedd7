//! Tokenization core
//!
//! Byte tables plus two tokenizers sharing them: a sentinel-based pull
//! tokenizer over one record string, and a streaming tokenizer that tracks
//! line numbers and resumes CDATA/comment sections across reader blocks.

pub mod streamer;
pub mod tables;
pub mod tokenizer;

pub use streamer::{StreamEvent, StreamTokenizer};
pub use tokenizer::{RecordToken, RecordTokenizer};
