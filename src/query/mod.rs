//! Extraction query language
//!
//! The argument-driven command grammar compiled into a Block tree, and the
//! executor that walks that tree against each record's node tree.

pub mod clause;
pub mod compiler;
pub mod conditions;
pub mod exec;
pub mod explore;
pub mod ops;

pub use compiler::parse_arguments;
pub use exec::{execute_query, process_commands, QueryOptions};
pub use explore::explore_elements;
pub use ops::{Block, OpType, Operation, Step};
