//! Subtree printing
//!
//! Serializes a node subtree for the star extraction ("*" through "****").
//! Styles range from a compact single line to fully indented output;
//! WRAPPED additionally puts each attribute on its own line. Nodes that
//! would serialize as empty self-closing tags are suppressed.

use crate::dom::node::{NodeArena, NodeId};
use crate::text::{compress_runs_of_spaces, is_not_just_whitespace};

/// Output styles selected by the number of stars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IndentStyle {
    Compact,
    Flush,
    Indent,
    Subtree,
    Wrapped,
}

impl IndentStyle {
    /// Map a star count (1..) to a style, clamping at the ends.
    pub fn from_stars(count: usize) -> IndentStyle {
        match count {
            0 | 1 => IndentStyle::Compact,
            2 => IndentStyle::Flush,
            3 => IndentStyle::Indent,
            4 => IndentStyle::Subtree,
            _ => IndentStyle::Wrapped,
        }
    }
}

const INDENT_SPACES: [&str; 10] = [
    "",
    "  ",
    "    ",
    "      ",
    "        ",
    "          ",
    "            ",
    "              ",
    "                ",
    "                  ",
];

fn do_indent(out: &mut String, mut indent: usize) {
    while indent > 9 {
        out.push_str("                    ");
        indent -= 10;
    }
    out.push_str(INDENT_SPACES[indent]);
}

/// Serialize a subtree in the requested style, appending to out.
pub fn print_subtree(arena: &NodeArena, node: NodeId, style: IndentStyle, print_attrs: bool, out: &mut String) {
    // WRAPPED is SUBTREE plus attribute wrapping
    let wrapped = style == IndentStyle::Wrapped;
    let style = if wrapped { IndentStyle::Subtree } else { style };

    // INDENT is offset by two spaces to allow for the parent tag
    let (style, initial) = match style {
        IndentStyle::Subtree => (IndentStyle::Indent, 0),
        other => (other, 1),
    };

    do_subtree(arena, node, style, wrapped, print_attrs, initial, out);
}

fn do_subtree(
    arena: &NodeArena,
    id: NodeId,
    style: IndentStyle,
    wrapped: bool,
    print_attrs: bool,
    depth: usize,
    out: &mut String,
) {
    let curr = arena.get(id);

    // suppress what would be an empty self-closing tag
    if !is_not_just_whitespace(&curr.attributes) && curr.contents.is_empty() && !curr.has_children()
    {
        return;
    }

    if style == IndentStyle::Indent {
        do_indent(out, depth);
    }

    out.push('<');
    out.push_str(&curr.name);

    if print_attrs {
        let attr = compress_runs_of_spaces(curr.attributes.trim());
        if !attr.is_empty() {
            if wrapped {
                let bytes = attr.as_bytes();
                let attlen = bytes.len();
                let mut start = 0;
                let mut idx = 0;
                while idx < attlen {
                    match bytes[idx] {
                        b'=' => {
                            out.push('\n');
                            do_indent(out, depth);
                            out.push(' ');
                            out.push_str(&attr[start..idx]);
                            idx += 2;
                            start = idx;
                        }
                        b'"' => {
                            out.push_str("=\"");
                            out.push_str(&attr[start..idx]);
                            out.push('"');
                            idx += 2;
                            start = idx;
                        }
                        _ => idx += 1,
                    }
                }
                out.push('\n');
                do_indent(out, depth);
            } else {
                out.push(' ');
                out.push_str(&attr);
            }
        }
    }

    if curr.contents.is_empty() && !curr.has_children() {
        out.push_str("/>");
        if style != IndentStyle::Compact {
            out.push('\n');
        }
        return;
    }

    out.push('>');

    if !curr.contents.is_empty() {
        out.push_str(&curr.contents);
    } else {
        if style != IndentStyle::Compact {
            out.push('\n');
        }
        for child in arena.children(id) {
            do_subtree(arena, child, style, wrapped, print_attrs, depth + 1, out);
        }
        if style == IndentStyle::Indent {
            do_indent(out, depth);
        }
    }

    out.push_str("</");
    out.push_str(&curr.name);
    out.push('>');

    if style != IndentStyle::Compact {
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::builder::build_tree;
    use crate::text::TextFilters;

    fn tree(xml: &str) -> (NodeArena, NodeId) {
        build_tree(xml, "", &TextFilters::default(), 16).unwrap()
    }

    #[test]
    fn compact_is_single_line() {
        let (arena, root) = tree("<R><A>1</A><B>2</B></R>");
        let mut out = String::new();
        print_subtree(&arena, root, IndentStyle::Compact, true, &mut out);
        assert_eq!(out, "<R><A>1</A><B>2</B></R>");
    }

    #[test]
    fn indent_nests_children() {
        let (arena, root) = tree("<R><A>1</A></R>");
        let mut out = String::new();
        print_subtree(&arena, root, IndentStyle::Indent, true, &mut out);
        assert_eq!(out, "  <R>\n    <A>1</A>\n  </R>\n");
    }

    #[test]
    fn subtree_starts_flush() {
        let (arena, root) = tree("<R><A>1</A></R>");
        let mut out = String::new();
        print_subtree(&arena, root, IndentStyle::Subtree, true, &mut out);
        assert_eq!(out, "<R>\n  <A>1</A>\n</R>\n");
    }

    #[test]
    fn attributes_can_be_suppressed() {
        let (arena, root) = tree("<R s=\"x\"><A>1</A></R>");
        let mut out = String::new();
        print_subtree(&arena, root, IndentStyle::Compact, false, &mut out);
        assert_eq!(out, "<R><A>1</A></R>");
    }

    #[test]
    fn wrapped_splits_attributes() {
        let (arena, root) = tree("<R a=\"1\" b=\"2\"><A>x</A></R>");
        let mut out = String::new();
        print_subtree(&arena, root, IndentStyle::Wrapped, true, &mut out);
        assert!(out.contains("\n a=\"1\""));
        assert!(out.contains("\n b=\"2\""));
    }

    #[test]
    fn from_stars_clamps() {
        assert_eq!(IndentStyle::from_stars(1), IndentStyle::Compact);
        assert_eq!(IndentStyle::from_stars(4), IndentStyle::Subtree);
        assert_eq!(IndentStyle::from_stars(9), IndentStyle::Wrapped);
    }
}
