//! Whole-stream verbs
//!
//! Streaming operations that run over the entire input without building
//! record trees: reformatting, structure outline, unique element paths,
//! well-formedness verification, and content editing.

pub mod filter;
pub mod format;
pub mod survey;

pub use filter::{filter_stream, FilterAction, FilterTarget};
pub use format::{copy_stream, format_stream, FormatOptions, FormatStyle};
pub use survey::{outline_stream, synopsis_stream, verify_stream};

/// Wrapper set elements left out of outline and synopsis reports.
pub(crate) fn is_wrapper_set(name: &str) -> bool {
    matches!(
        name,
        "eSummaryResult"
            | "eLinkResult"
            | "eInfoResult"
            | "PubmedArticleSet"
            | "DocumentSummarySet"
            | "INSDSet"
            | "Entrezgene-Set"
            | "TaxaSet"
    )
}
