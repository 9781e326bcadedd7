//! Record trees
//!
//! Arena-allocated node trees built from the record tokenizer. One arena
//! lives per record per worker; dropping it frees the whole tree. Nodes
//! carry the element name, the parent's name for cheap parent/child
//! predicates, raw attribute text parsed into pairs on first query, and
//! first-child / next-sibling links.

pub mod attributes;
pub mod builder;
pub mod node;
pub mod subtree;

pub use attributes::parse_attributes;
pub use builder::{build_tree, scan_identifier, IndexTarget};
pub use node::{Node, NodeArena, NodeId};
pub use subtree::{print_subtree, IndentStyle};
