//! Tree builder and identifier scan
//!
//! Builds an arena tree from the record tokenizer, applying per-run content
//! cleanup while contents are copied in. Self-closing tags without
//! attributes carry no information and are dropped; with attributes they
//! become leaf children. The identifier scan walks the same token stream
//! without building a tree, returning the first element or attribute value
//! matching the archive index target.

use crate::core::{RecordToken, RecordTokenizer};
use crate::dom::node::{NodeArena, NodeId};
use crate::text::{
    fold_accents, has_angle_bracket, has_markup_runes, is_not_ascii, remove_unicode_markup,
    simulate_unicode_markup, split_left, split_right, strip_inline_tags, trim_flanking_inline_tags,
    unicode_to_ascii, TextFilters,
};

/// Cleanup applied to contents as the tree is built.
fn filter_contents(name: &str, filters: &TextFilters) -> String {
    let mut text = name.to_string();
    if filters.strict {
        if has_markup_runes(&text) {
            text = remove_unicode_markup(&text);
        }
        if has_angle_bracket(&text) {
            text = strip_inline_tags(&text);
        }
    }
    if filters.mixed {
        if has_markup_runes(&text) {
            text = simulate_unicode_markup(&text);
        }
        if has_angle_bracket(&text) {
            text = strip_inline_tags(&text);
        }
        text = trim_flanking_inline_tags(&text).to_string();
    }
    if filters.accent && is_not_ascii(&text) {
        text = fold_accents(&text);
    }
    if filters.ascii && is_not_ascii(&text) {
        text = unicode_to_ascii(&text);
    }
    text
}

fn parse_level(
    arena: &mut NodeArena,
    tk: &mut RecordTokenizer<'_>,
    name: &str,
    attrs: &str,
    parent_name: &str,
    filters: &TextFilters,
) -> NodeId {
    let node = arena.alloc(name, attrs, parent_name);
    let mut last_child: Option<NodeId> = None;

    let mut attach = |arena: &mut NodeArena, obj: NodeId, last: &mut Option<NodeId>| {
        if arena.get(node).first_child.is_none() {
            arena.get_mut(node).first_child = Some(obj);
        }
        if let Some(prev) = *last {
            arena.get_mut(prev).next_sibling = Some(obj);
        }
        *last = Some(obj);
    };

    loop {
        match tk.next_token() {
            RecordToken::Closed => break,
            RecordToken::Start {
                name: child,
                attrs: child_attrs,
            } => {
                let obj = parse_level(arena, tk, child, child_attrs, name, filters);
                attach(arena, obj, &mut last_child);
            }
            RecordToken::Stop { .. } => return node,
            RecordToken::Content(text) => {
                arena.get_mut(node).contents = filter_contents(text, filters);
            }
            RecordToken::SelfClose {
                name: child,
                attrs: child_attrs,
            } => {
                // a bare self-closing tag has no semantic content
                if child_attrs.is_empty() {
                    continue;
                }
                let obj = arena.alloc(child, child_attrs, name);
                attach(arena, obj, &mut last_child);
            }
        }
    }

    node
}

/// Parse one record string into an arena tree. Returns the arena and the
/// root node id, or None for an empty record.
pub fn build_tree(
    text: &str,
    parent_name: &str,
    filters: &TextFilters,
    farm_size: usize,
) -> Option<(NodeArena, NodeId)> {
    let mut tk = RecordTokenizer::new(text, filters.html_aware());

    // loop until the first start tag
    let (name, attrs) = loop {
        match tk.next_token() {
            RecordToken::Closed => return None,
            RecordToken::Start { name, attrs } => break (name, attrs),
            _ => {}
        }
    };

    let mut arena = NodeArena::new(farm_size);
    let root = parse_level(&mut arena, &mut tk, name, attrs, parent_name, filters);
    Some((arena, root))
}

/// Archive index target parsed from a Parent/Element@attribute spec.
#[derive(Debug, Clone, Default)]
pub struct IndexTarget {
    pub parent: String,
    pub element: String,
    pub attrib: String,
}

impl IndexTarget {
    /// Parse a Parent/Element@attribute spec; each component is optional.
    pub fn parse(spec: &str) -> IndexTarget {
        let (parent, rest) = split_right(spec, '/');
        let (element, attrib) = split_left(rest, '@');
        IndexTarget {
            parent: parent.to_string(),
            element: element.to_string(),
            attrib: attrib.to_string(),
        }
    }
}

fn scan_level(
    tk: &mut RecordTokenizer<'_>,
    name: &str,
    attrs: &str,
    parent_name: &str,
    target: &IndexTarget,
) -> String {
    // check for an attribute match on the current element
    if !attrs.is_empty() && !target.attrib.is_empty() && attrs.contains(&target.attrib)
        && (target.element.is_empty() || name == target.element)
        && (target.parent.is_empty() || parent_name == target.parent)
    {
        for (tag, value) in super::attributes::parse_attributes(attrs) {
            if tag == target.attrib {
                return value;
            }
        }
    }

    loop {
        match tk.next_token() {
            RecordToken::Closed => break,
            RecordToken::Start {
                name: child,
                attrs: child_attrs,
            } => {
                let id = scan_level(tk, child, child_attrs, name, target);
                if !id.is_empty() {
                    return id;
                }
            }
            RecordToken::SelfClose { .. } => {}
            RecordToken::Stop { .. } => return String::new(),
            RecordToken::Content(text) => {
                if (target.element.is_empty() || name == target.element)
                    && (target.parent.is_empty() || parent_name == target.parent)
                    && target.attrib.is_empty()
                {
                    return text.to_string();
                }
            }
        }
    }

    String::new()
}

/// Extract the identifier for one record without building a tree.
pub fn scan_identifier(
    text: &str,
    parent_name: &str,
    target: &IndexTarget,
    html_aware: bool,
) -> String {
    let mut tk = RecordTokenizer::new(text, html_aware);

    let (name, attrs) = loop {
        match tk.next_token() {
            RecordToken::Closed => return String::new(),
            RecordToken::Start { name, attrs } => break (name, attrs),
            _ => {}
        }
    };

    scan_level(&mut tk, name, attrs, parent_name, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_linked_tree() {
        let xml = "<Rec><A>1</A><B><C>2</C></B></Rec>";
        let (arena, root) = build_tree(xml, "", &TextFilters::default(), 16).unwrap();
        let root_node = arena.get(root);
        assert_eq!(root_node.name, "Rec");
        let kids: Vec<&str> = arena
            .children(root)
            .map(|id| arena.get(id).name.as_str())
            .collect();
        assert_eq!(kids, vec!["A", "B"]);
        let b = arena.children(root).nth(1).unwrap();
        let c = arena.children(b).next().unwrap();
        assert_eq!(arena.get(c).contents, "2");
        assert_eq!(arena.get(c).parent_name, "B");
    }

    #[test]
    fn bare_self_closing_tags_are_dropped() {
        let xml = "<R><Empty/><Keep value=\"x\"/></R>";
        let (arena, root) = build_tree(xml, "", &TextFilters::default(), 16).unwrap();
        let kids: Vec<&str> = arena
            .children(root)
            .map(|id| arena.get(id).name.as_str())
            .collect();
        assert_eq!(kids, vec!["Keep"]);
    }

    #[test]
    fn strict_mode_strips_inline_html() {
        let xml = "<R><T>bold <b>word</b> here</T></R>";
        let filters = TextFilters {
            strict: true,
            ..Default::default()
        };
        let (arena, root) = build_tree(xml, "", &filters, 16).unwrap();
        let t = arena.children(root).next().unwrap();
        assert_eq!(arena.get(t).contents, "bold word here");
    }

    #[test]
    fn index_target_parse() {
        let t = IndexTarget::parse("MedlineCitation/PMID");
        assert_eq!(t.parent, "MedlineCitation");
        assert_eq!(t.element, "PMID");
        assert_eq!(t.attrib, "");

        let t = IndexTarget::parse("Rec@uid");
        assert_eq!(t.element, "Rec");
        assert_eq!(t.attrib, "uid");

        let t = IndexTarget::parse("PMID");
        assert_eq!(t.parent, "");
        assert_eq!(t.element, "PMID");
    }

    #[test]
    fn scans_element_identifier() {
        let xml = "<Rec><Head><PMID>12345</PMID></Head></Rec>";
        let target = IndexTarget::parse("Head/PMID");
        assert_eq!(scan_identifier(xml, "", &target, false), "12345");
        let miss = IndexTarget::parse("Other/PMID");
        assert_eq!(scan_identifier(xml, "", &miss, false), "");
    }

    #[test]
    fn scans_attribute_identifier() {
        let xml = "<Rec uid=\"NP_060051.2\"><Body>x</Body></Rec>";
        let target = IndexTarget::parse("Rec@uid");
        assert_eq!(scan_identifier(xml, "", &target, false), "NP_060051.2");
    }
}
