//! Arena-allocated XML nodes
//!
//! NodeId (u32) handles into a slab-chained arena. Slabs have a fixed
//! capacity so node addresses stay stable while the tree grows, and the
//! whole record tree is freed by dropping the arena.

use std::cell::OnceCell;

/// Compact node identifier (index into arena)
pub type NodeId = u32;

/// Default slab capacity, overridable with -farm.
pub const DEFAULT_FARM_SIZE: usize = 64;

/// One element in a record tree.
#[derive(Debug, Default)]
pub struct Node {
    /// Element name
    pub name: String,
    /// Name of the parent element, for parent/child predicates
    pub parent_name: String,
    /// Text contents, empty for containers
    pub contents: String,
    /// Attribute text stored verbatim
    pub attributes: String,
    /// Attribute pairs, parsed from the raw text on first query
    pub attribs: OnceCell<Vec<(String, String)>>,
    /// First child in document order
    pub first_child: Option<NodeId>,
    /// Next sibling in document order
    pub next_sibling: Option<NodeId>,
}

impl Node {
    /// Attribute pairs, parsing and caching the raw text on first call.
    pub fn attribute_pairs(&self) -> &[(String, String)] {
        self.attribs
            .get_or_init(|| super::attributes::parse_attributes(&self.attributes))
    }

    /// True if this node has child elements.
    #[inline]
    pub fn has_children(&self) -> bool {
        self.first_child.is_some()
    }
}

/// Slab-chained node arena ("farm").
pub struct NodeArena {
    slabs: Vec<Vec<Node>>,
    farm_size: usize,
}

impl NodeArena {
    /// Create an arena with the given slab capacity.
    pub fn new(farm_size: usize) -> Self {
        let farm_size = farm_size.max(4);
        NodeArena {
            slabs: vec![Vec::with_capacity(farm_size)],
            farm_size,
        }
    }

    /// Allocate a node, chaining a fresh slab when the current one fills.
    pub fn alloc(&mut self, name: &str, attributes: &str, parent_name: &str) -> NodeId {
        let slab_count = self.slabs.len();
        if self.slabs[slab_count - 1].len() >= self.farm_size {
            self.slabs.push(Vec::with_capacity(self.farm_size));
        }
        let slab = self.slabs.last_mut().unwrap();
        slab.push(Node {
            name: name.to_string(),
            parent_name: parent_name.to_string(),
            attributes: attributes.to_string(),
            ..Default::default()
        });

        ((self.slabs.len() - 1) * self.farm_size + self.slabs.last().unwrap().len() - 1) as NodeId
    }

    /// Borrow a node by id.
    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        let idx = id as usize;
        &self.slabs[idx / self.farm_size][idx % self.farm_size]
    }

    /// Mutably borrow a node by id.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        let idx = id as usize;
        &mut self.slabs[idx / self.farm_size][idx % self.farm_size]
    }

    /// Number of allocated nodes.
    pub fn len(&self) -> usize {
        (self.slabs.len() - 1) * self.farm_size + self.slabs.last().map_or(0, Vec::len)
    }

    /// True when nothing has been allocated.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate the children of a node in document order.
    pub fn children(&self, id: NodeId) -> ChildIter<'_> {
        ChildIter {
            arena: self,
            next: self.get(id).first_child,
        }
    }
}

/// Iterator over sibling-linked children.
pub struct ChildIter<'a> {
    arena: &'a NodeArena,
    next: Option<NodeId>,
}

impl<'a> Iterator for ChildIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.arena.get(id).next_sibling;
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_spans_slabs() {
        let mut arena = NodeArena::new(4);
        let ids: Vec<NodeId> = (0..10)
            .map(|i| arena.alloc(&format!("n{i}"), "", "p"))
            .collect();
        assert_eq!(arena.len(), 10);
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(arena.get(*id).name, format!("n{i}"));
        }
    }

    #[test]
    fn attribute_pairs_parse_once() {
        let mut arena = NodeArena::new(4);
        let id = arena.alloc("n", "a=\"1\" b=\"2\"", "");
        let node = arena.get(id);
        let pairs = node.attribute_pairs();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0], ("a".to_string(), "1".to_string()));
        // second call returns the cached parse
        assert_eq!(node.attribute_pairs().as_ptr(), pairs.as_ptr());
    }

    #[test]
    fn child_iteration_in_document_order() {
        let mut arena = NodeArena::new(8);
        let root = arena.alloc("r", "", "");
        let a = arena.alloc("a", "", "r");
        let b = arena.alloc("b", "", "r");
        arena.get_mut(root).first_child = Some(a);
        arena.get_mut(a).next_sibling = Some(b);
        let kids: Vec<String> = arena
            .children(root)
            .map(|id| arena.get(id).name.clone())
            .collect();
        assert_eq!(kids, vec!["a", "b"]);
    }
}
