//! Element exploration
//!
//! Visits descendants of a node whose parent/name/attribute address matches
//! a Step, reporting each value to a callback. A "*" or "**" parent enables
//! deep exploration of recursive data; otherwise traversal does not
//! re-enter a matched subtree. A leading colon on any component acts as a
//! namespace-prefix wildcard. Matched containers and attributed
//! self-closing elements report an empty string so presence tests and
//! counts still see them.

use crate::dom::{NodeArena, NodeId};
use crate::text::{has_amp_or_not_ascii, unescape_xml};

/// Wildcard match: a leading colon matches any namespace prefix.
#[inline]
fn wild_suffix(name: &str, pattern: &str) -> bool {
    pattern.starts_with(':') && name.ends_with(pattern)
}

/// Report values of elements matching the address to the callback.
#[allow(clippy::too_many_arguments)]
pub fn explore_elements(
    arena: &NodeArena,
    curr: NodeId,
    mask: &str,
    prnt: &str,
    match_name: &str,
    attrib: &str,
    wildcard: bool,
    level: usize,
    proc: &mut dyn FnMut(&str, usize),
) {
    // **/Object performs deep exploration of recursive data
    let (prnt, deep) = if prnt == "**" || prnt == "*" {
        ("", true)
    } else {
        (prnt, false)
    };

    explore(
        arena, curr, mask, prnt, match_name, attrib, wildcard, deep, "", level, proc,
    );
}

#[allow(clippy::too_many_arguments)]
fn explore(
    arena: &NodeArena,
    id: NodeId,
    mask: &str,
    prnt: &str,
    match_name: &str,
    attrib: &str,
    wildcard: bool,
    deep: bool,
    skip: &str,
    level: usize,
    proc: &mut dyn FnMut(&str, usize),
) {
    let curr = arena.get(id);

    if !deep && !skip.is_empty() && curr.name == skip {
        // do not explore within a recursive object
        return;
    }

    let name_hits = curr.name == match_name
        || (wildcard && wild_suffix(&curr.name, match_name))
        || (match_name.is_empty() && !attrib.is_empty());

    if name_hits {
        let parent_hits = prnt.is_empty()
            || curr.parent_name == prnt
            || (wildcard && wild_suffix(&curr.parent_name, prnt));

        if parent_hits {
            if !attrib.is_empty() {
                for (tag, value) in curr.attribute_pairs() {
                    if tag == attrib || (wildcard && wild_suffix(tag, attrib)) {
                        proc(value, level);
                        return;
                    }
                }
            } else if !curr.contents.is_empty() {
                // entity decoding is delayed until contents are requested
                if has_amp_or_not_ascii(&curr.contents) {
                    let decoded = unescape_xml(&curr.contents);
                    proc(&decoded, level);
                } else {
                    proc(&curr.contents, level);
                }
                return;
            } else if curr.has_children() {
                // a container sends an empty string to increment the count,
                // then exploration continues below it
                proc("", level);
            } else if !curr.attributes.is_empty() {
                // attributed self-closing object indicates presence
                proc("", level);
                return;
            }
        }
    }

    for child in arena.children(id) {
        // inner exploration is subject to recursive object exclusion; the
        // reported level stays that of the exploration context
        explore(
            arena, child, mask, prnt, match_name, attrib, wildcard, deep, mask, level, proc,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::build_tree;
    use crate::text::TextFilters;

    fn collect(xml: &str, prnt: &str, match_name: &str, attrib: &str) -> Vec<String> {
        let (arena, root) = build_tree(xml, "", &TextFilters::default(), 16).unwrap();
        let mut out = Vec::new();
        explore_elements(
            &arena,
            root,
            "",
            prnt,
            match_name,
            attrib,
            false,
            1,
            &mut |s, _| out.push(s.to_string()),
        );
        out
    }

    #[test]
    fn finds_all_matching_elements() {
        let xml = "<R><K>1</K><M><K>2</K></M></R>";
        assert_eq!(collect(xml, "", "K", ""), vec!["1", "2"]);
    }

    #[test]
    fn parent_constraint_filters() {
        let xml = "<R><K>1</K><M><K>2</K></M></R>";
        assert_eq!(collect(xml, "M", "K", ""), vec!["2"]);
    }

    #[test]
    fn attribute_values_are_reported() {
        let xml = "<R><A uid=\"x1\">t</A><A uid=\"x2\">u</A></R>";
        assert_eq!(collect(xml, "", "A", "uid"), vec!["x1", "x2"]);
    }

    #[test]
    fn container_reports_presence() {
        let xml = "<R><List><Item>1</Item></List></R>";
        let hits = collect(xml, "", "List", "");
        assert_eq!(hits, vec![""]);
    }

    #[test]
    fn entities_decoded_on_demand() {
        let xml = "<R><T>&lt;1..67</T></R>";
        assert_eq!(collect(xml, "", "T", ""), vec!["<1..67"]);
    }

    #[test]
    fn recursive_subtree_not_reentered() {
        // inner Taxon is masked when exploring with mask equal to match
        let xml = "<Taxon><Id>1</Id><Taxon><Id>2</Id></Taxon></Taxon>";
        let (arena, root) = build_tree(xml, "", &TextFilters::default(), 16).unwrap();
        let mut out = Vec::new();
        explore_elements(&arena, root, "Taxon", "", "Id", "", false, 1, &mut |s, _| {
            out.push(s.to_string())
        });
        assert_eq!(out, vec!["1"]);
    }

    #[test]
    fn deep_exploration_reenters() {
        let xml = "<Taxon><Id>1</Id><Taxon><Id>2</Id></Taxon></Taxon>";
        let (arena, root) = build_tree(xml, "", &TextFilters::default(), 16).unwrap();
        let mut out = Vec::new();
        explore_elements(&arena, root, "Taxon", "**", "Id", "", false, 1, &mut |s, _| {
            out.push(s.to_string())
        });
        assert_eq!(out, vec!["1", "2"]);
    }
}
