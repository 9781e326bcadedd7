//! Conditional evaluation
//!
//! Walks a block's condition list as a disjunctive-normal-form machine.
//! -if and -match open a Match clause, -unless and -avoid open an Avoid
//! clause, -and raises the requirement, -or does not. Between clauses the
//! previous clause must have been satisfied. Individual conditions test an
//! element or a stored variable, optionally against a string or integer
//! comparator.

use std::collections::HashMap;

use crate::dom::{NodeArena, NodeId};
use crate::query::explore::explore_elements;
use crate::query::ops::{OpType, Operation, Step};

/// String comparisons fold both sides to ASCII uppercase; numeric
/// comparisons require both sides to parse as signed integers.
fn test_constraint(
    arena: &NodeArena,
    curr: NodeId,
    mask: &str,
    level: usize,
    str: &str,
    constraint: &Step,
) -> bool {
    if str.is_empty() {
        return false;
    }

    match constraint.kind {
        OpType::Equals | OpType::Contains | OpType::StartsWith | OpType::EndsWith
        | OpType::IsNot => {
            let str = str.to_ascii_uppercase();
            let val = constraint.value.to_ascii_uppercase();
            match constraint.kind {
                OpType::Equals => str == val,
                OpType::Contains => str.contains(&val),
                OpType::StartsWith => str.starts_with(&val),
                OpType::EndsWith => str.ends_with(&val),
                OpType::IsNot => str != val,
                _ => false,
            }
        }
        OpType::Gt | OpType::Ge | OpType::Lt | OpType::Le | OpType::Eq | OpType::Ne => {
            let mut val = constraint.value.clone();

            // the right side may be an element reference, optionally
            // prefixed to derive a count, length, or depth
            if !constraint.parent.is_empty()
                || !constraint.match_name.is_empty()
                || !constraint.attrib.is_empty()
            {
                let mut explore = |proc: &mut dyn FnMut(&str, usize)| {
                    explore_elements(
                        arena,
                        curr,
                        mask,
                        &constraint.parent,
                        &constraint.match_name,
                        &constraint.attrib,
                        constraint.wild,
                        level,
                        proc,
                    );
                };
                match val.bytes().next() {
                    Some(b'#') => {
                        let mut count = 0usize;
                        explore(&mut |_, _| count += 1);
                        val = count.to_string();
                    }
                    Some(b'%') => {
                        let mut length = 0usize;
                        explore(&mut |s, _| length += s.len());
                        val = length.to_string();
                    }
                    Some(b'^') => {
                        let mut depth = 0usize;
                        explore(&mut |_, lvl| depth = lvl);
                        val = depth.to_string();
                    }
                    _ => {
                        let mut found = String::new();
                        explore(&mut |s, _| {
                            if !s.is_empty() && s.parse::<i64>().is_ok() {
                                found = s.to_string();
                            }
                        });
                        if !found.is_empty() {
                            val = found;
                        }
                    }
                }
            }

            let x = str.parse::<i64>();
            let y = val.parse::<i64>();
            let (x, y) = match (x, y) {
                (Ok(x), Ok(y)) => (x, y),
                // both arguments must resolve to integers
                _ => return false,
            };

            match constraint.kind {
                OpType::Gt => x > y,
                OpType::Ge => x >= y,
                OpType::Lt => x < y,
                OpType::Le => x <= y,
                OpType::Eq => x == y,
                OpType::Ne => x != y,
                _ => false,
            }
        }
        _ => false,
    }
}

/// Test one condition's stages: the element or variable stage, then an
/// optional comparator stage.
fn match_found(
    arena: &NodeArena,
    curr: NodeId,
    mask: &str,
    index: usize,
    level: usize,
    variables: &HashMap<String, String>,
    stages: &[Step],
) -> bool {
    let stage = match stages.first() {
        Some(s) => s,
        None => return false,
    };
    let constraint = stages.get(1);

    let mut explore = |proc: &mut dyn FnMut(&str, usize)| {
        explore_elements(
            arena,
            curr,
            mask,
            &stage.parent,
            &stage.match_name,
            &stage.attrib,
            stage.wild,
            level,
            proc,
        );
    };

    let mut found = false;
    let mut number = String::new();

    match stage.kind {
        OpType::Element => {
            explore(&mut |s, _| {
                // container matches send empty strings; test each selected
                // element individually when a value is specified
                let hit = match constraint {
                    None => true,
                    Some(c) => test_constraint(arena, curr, mask, level, s, c),
                };
                if hit {
                    found = true;
                }
            });
        }
        OpType::Variable => {
            if let Some(val) = variables.get(&stage.match_name) {
                let hit = match constraint {
                    None => true,
                    Some(c) => test_constraint(arena, curr, mask, level, val, c),
                };
                if hit {
                    found = true;
                }
            }
        }
        OpType::Count => {
            let mut count = 0usize;
            explore(&mut |_, _| {
                count += 1;
                found = true;
            });
            number = count.to_string();
        }
        OpType::Length => {
            let mut length = 0usize;
            explore(&mut |s, _| {
                length += s.len();
                found = true;
            });
            number = length.to_string();
        }
        OpType::Depth => {
            let mut depth = 0usize;
            explore(&mut |_, lvl| {
                depth = lvl;
                found = true;
            });
            number = depth.to_string();
        }
        OpType::Index => {
            number = index.to_string();
            found = true;
        }
        _ => {}
    }

    if number.is_empty() {
        return found;
    }

    match constraint {
        None => true,
        Some(c) => test_constraint(arena, curr, mask, level, &number, c),
    }
}

/// Evaluate the full condition list against one node.
pub fn conditions_satisfied(
    conditions: &[Operation],
    arena: &NodeArena,
    curr: NodeId,
    mask: &str,
    index: usize,
    level: usize,
    variables: &HashMap<String, String>,
) -> bool {
    let mut required = 0usize;
    let mut observed = 0usize;
    let mut forbidden = 0usize;
    let mut is_match = false;
    let mut is_avoid = false;

    for op in conditions {
        match op.kind {
            OpType::If | OpType::Match | OpType::And | OpType::Or => {
                if matches!(op.kind, OpType::If | OpType::Match) {
                    // close out the previous clause before opening another
                    if is_match && observed < required {
                        return false;
                    }
                    if is_avoid && forbidden > 0 {
                        return false;
                    }
                    required = 0;
                    observed = 0;
                    forbidden = 0;
                    is_match = true;
                    is_avoid = false;
                }
                if matches!(op.kind, OpType::If | OpType::Match | OpType::And) {
                    required += 1;
                }
                if match_found(arena, curr, mask, index, level, variables, &op.stages) {
                    observed += 1;
                    // record presence of a forbidden element in -unless clauses
                    forbidden += 1;
                }
            }
            OpType::Unless | OpType::Avoid => {
                if is_match && observed < required {
                    return false;
                }
                if is_avoid && forbidden > 0 {
                    return false;
                }
                required = 0;
                observed = 0;
                forbidden = 0;
                is_match = false;
                is_avoid = true;
                if match_found(arena, curr, mask, index, level, variables, &op.stages) {
                    forbidden += 1;
                }
            }
            _ => {}
        }
    }

    if is_match && observed < required {
        return false;
    }
    if is_avoid && forbidden > 0 {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::build_tree;
    use crate::query::compiler::parse_arguments;
    use crate::text::TextFilters;

    fn check(xml: &str, args: &[&str]) -> bool {
        let v: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let blk = parse_arguments(&v, &v[1]).unwrap();
        let (arena, root) = build_tree(xml, "", &TextFilters::default(), 16).unwrap();
        conditions_satisfied(
            &blk.conditions,
            &arena,
            root,
            &blk.match_name,
            1,
            1,
            &HashMap::new(),
        )
    }

    #[test]
    fn presence_test() {
        let xml = "<R><K>v</K></R>";
        assert!(check(xml, &["-pattern", "R", "-if", "K", "-element", "K"]));
        assert!(!check(xml, &["-pattern", "R", "-if", "Z", "-element", "K"]));
    }

    #[test]
    fn absence_test() {
        let xml = "<R><K>v</K></R>";
        assert!(check(xml, &["-pattern", "R", "-unless", "Z", "-element", "K"]));
        assert!(!check(xml, &["-pattern", "R", "-unless", "K", "-element", "K"]));
    }

    #[test]
    fn string_comparison_is_case_insensitive() {
        let xml = "<R><K>Value</K></R>";
        assert!(check(
            xml,
            &["-pattern", "R", "-if", "K", "-equals", "VALUE", "-element", "K"]
        ));
        assert!(check(
            xml,
            &["-pattern", "R", "-if", "K", "-starts-with", "val", "-element", "K"]
        ));
        assert!(!check(
            xml,
            &["-pattern", "R", "-if", "K", "-equals", "other", "-element", "K"]
        ));
    }

    #[test]
    fn count_comparison() {
        let xml = "<R><F>1</F><F>2</F><F>3</F><F>4</F></R>";
        assert!(check(
            xml,
            &["-pattern", "R", "-if", "#F", "-ge", "3", "-element", "F"]
        ));
        assert!(!check(
            xml,
            &["-pattern", "R", "-if", "#F", "-gt", "4", "-element", "F"]
        ));
    }

    #[test]
    fn non_numeric_comparison_fails() {
        let xml = "<R><K>abc</K></R>";
        assert!(!check(
            xml,
            &["-pattern", "R", "-if", "K", "-gt", "3", "-element", "K"]
        ));
    }

    #[test]
    fn and_raises_requirement() {
        let xml = "<R><A>1</A></R>";
        assert!(!check(
            xml,
            &["-pattern", "R", "-if", "A", "-and", "B", "-element", "A"]
        ));
        let xml = "<R><A>1</A><B>2</B></R>";
        assert!(check(
            xml,
            &["-pattern", "R", "-if", "A", "-and", "B", "-element", "A"]
        ));
    }

    #[test]
    fn or_does_not_raise_requirement() {
        let xml = "<R><B>2</B></R>";
        assert!(check(
            xml,
            &["-pattern", "R", "-if", "A", "-or", "B", "-element", "B"]
        ));
    }
}
