//! Command execution
//!
//! Walks the compiled Block tree against one record's node tree.
//! process_instructions runs a block's command list, threading the sticky
//! tab and ret separators and the customization state through each clause.
//! process_commands explores the nodes selected by a block's visit path,
//! applies its conditions, and recurses into child blocks. execute_query is
//! the per-record entry used by the worker pool.

use std::collections::HashMap;

use crate::dom::{build_tree, NodeArena, NodeId};
use crate::query::clause::process_clause;
use crate::query::conditions::conditions_satisfied;
use crate::query::ops::{Block, OpType, Operation};
use crate::text::TextFilters;

/// Per-run executor settings.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub filters: TextFilters,
    pub farm_size: usize,
    /// literal printed before each record's output
    pub hd: String,
    /// literal printed after each record's output
    pub tl: String,
}

/// Run one block's command list against the current node. Returns the
/// updated sticky tab and ret separators.
#[allow(clippy::too_many_arguments)]
pub fn process_instructions(
    commands: &[Operation],
    arena: &NodeArena,
    curr: NodeId,
    mask: &str,
    mut tab: String,
    mut ret: String,
    index: usize,
    level: usize,
    variables: &mut HashMap<String, String>,
    accum: &mut dyn FnMut(&str),
) -> (String, String) {
    let mut sep = "\t".to_string();
    let mut pfx = String::new();
    let mut sfx = String::new();
    let mut def = String::new();

    let mut col = "\t".to_string();
    let mut lin = "\n".to_string();

    let mut varname = String::new();

    for op in commands {
        let str = &op.value;

        match op.kind {
            OpType::Element
            | OpType::First
            | OpType::Last
            | OpType::Encode
            | OpType::Upper
            | OpType::Lower
            | OpType::Title
            | OpType::Terms
            | OpType::Words
            | OpType::Pairs
            | OpType::Letters
            | OpType::Indices
            | OpType::Num
            | OpType::Len
            | OpType::Sum
            | OpType::Min
            | OpType::Max
            | OpType::Inc
            | OpType::Dec
            | OpType::Sub
            | OpType::Avg
            | OpType::Dev
            | OpType::ZeroBased
            | OpType::OneBased
            | OpType::UcscBased => {
                if let Some(txt) = process_clause(
                    arena, curr, &op.stages, mask, &tab, &pfx, &sfx, &sep, &def, op.kind, index,
                    level, variables,
                ) {
                    tab = col.clone();
                    ret = lin.clone();
                    accum(&txt);
                }
            }
            OpType::Tab => col = str.clone(),
            OpType::Ret => lin = str.clone(),
            OpType::Pfx => pfx = str.clone(),
            OpType::Sfx => sfx = str.clone(),
            OpType::Sep => sep = str.clone(),
            OpType::Lbl => {
                accum(&tab);
                accum(str);
                tab = col.clone();
                ret = lin.clone();
            }
            OpType::Pfc => {
                // preface clears the pending tab and sets the prefix at once
                pfx = str.clone();
                tab.clear();
            }
            OpType::Clr => {
                tab.clear();
            }
            OpType::Rst => {
                pfx.clear();
                sfx.clear();
                sep = "\t".to_string();
                def.clear();
            }
            OpType::Def => def = str.clone(),
            OpType::Variable => varname = str.clone(),
            OpType::Value => {
                let length = str.len();
                if length > 1 && str.starts_with('(') && str.ends_with(')') {
                    // a literal inside parentheses is stored verbatim;
                    // empty parentheses store an empty string that still
                    // satisfies -if &VARIABLE
                    variables.insert(varname.clone(), str[1..length - 1].to_string());
                } else if str.is_empty() {
                    // empty string unsets the variable
                    variables.remove(&varname);
                } else if let Some(txt) = process_clause(
                    arena, curr, &op.stages, mask, "", &pfx, &sfx, &sep, &def, op.kind, index,
                    level, variables,
                ) {
                    variables.insert(varname.clone(), txt);
                }
                varname.clear();
            }
            _ => {}
        }
    }

    (tab, ret)
}

/// Node visitor state for one block's exploration. The parent component is
/// owned because a "*" parent is cleared once exploration passes the first
/// matched level, enabling nested exploration of recursive data.
struct Explorer<'a> {
    arena: &'a NodeArena,
    match_name: &'a str,
    prnt: String,
    wildcard: bool,
    deep: bool,
}

impl<'a> Explorer<'a> {
    fn visit(
        &mut self,
        id: NodeId,
        mut indx: usize,
        levl: usize,
        proc: &mut dyn FnMut(NodeId, usize, usize),
    ) -> usize {
        let curr = self.arena.get(id);

        let name_hits = curr.name == self.match_name
            || self.match_name == "*"
            || (self.wildcard
                && self.match_name.starts_with(':')
                && curr.name.ends_with(self.match_name));

        if name_hits {
            let parent_hits = self.prnt.is_empty()
                || curr.parent_name == self.prnt
                || (self.wildcard
                    && self.prnt.starts_with(':')
                    && curr.parent_name.ends_with(&self.prnt));

            if parent_hits {
                proc(id, indx, levl);
                indx += 1;

                if !self.deep {
                    // do not explore within a matched subtree
                    return indx;
                }
            }
        }

        // clearing a "*" parent allows nested exploration of recursive data
        if self.prnt == "*" {
            self.prnt.clear();
        }

        let mut child = self.arena.get(id).first_child;
        while let Some(c) = child {
            indx = self.visit(c, indx, levl + 1, proc);
            child = self.arena.get(c).next_sibling;
        }

        indx
    }
}

/// Explore nodes selected by the block, apply conditions, execute commands,
/// and recurse into child blocks.
#[allow(clippy::too_many_arguments)]
pub fn process_commands(
    block: &Block,
    arena: &NodeArena,
    curr: NodeId,
    tab: String,
    ret: String,
    index: usize,
    level: usize,
    variables: &mut HashMap<String, String>,
    accum: &mut dyn FnMut(&str),
) -> (String, String) {
    let prnt = block.parent.as_str();
    let match_name = block.match_name.as_str();

    // leading colon indicates a namespace prefix wildcard
    let wildcard = prnt.starts_with(':') || match_name.starts_with(':');

    // **/Object performs deep exploration of recursive data
    let (prnt, deep) = if prnt == "**" {
        ("*", true)
    } else {
        (prnt, false)
    };

    let mut explorer = Explorer {
        arena,
        match_name,
        prnt: prnt.to_string(),
        wildcard,
        deep,
    };

    let mut tab = tab;
    let mut ret = ret;

    let mut process_node =
        |node: NodeId, idx: usize, lvl: usize, tab: &mut String, ret: &mut String| {
            if conditions_satisfied(&block.conditions, arena, node, match_name, idx, lvl, variables)
            {
                if !block.commands.is_empty() {
                    let (t, r) = process_instructions(
                        &block.commands,
                        arena,
                        node,
                        match_name,
                        std::mem::take(tab),
                        std::mem::take(ret),
                        idx,
                        lvl,
                        variables,
                        accum,
                    );
                    *tab = t;
                    *ret = r;
                }

                for sub in &block.subtasks {
                    let (t, r) = process_commands(
                        sub,
                        arena,
                        node,
                        std::mem::take(tab),
                        std::mem::take(ret),
                        1,
                        lvl,
                        variables,
                        accum,
                    );
                    *tab = t;
                    *ret = r;
                }
            } else if !block.failure.is_empty() {
                // commands after the -else statement
                let (t, r) = process_instructions(
                    &block.failure,
                    arena,
                    node,
                    match_name,
                    std::mem::take(tab),
                    std::mem::take(ret),
                    idx,
                    lvl,
                    variables,
                    accum,
                );
                *tab = t;
                *ret = r;
            }
        };

    if block.position.is_empty() {
        explorer.visit(curr, index, level, &mut |node, idx, lvl| {
            process_node(node, idx, lvl, &mut tab, &mut ret);
        });
    } else {
        let mut single: Option<(NodeId, usize, usize)> = None;

        match block.position.as_str() {
            "first" => {
                explorer.visit(curr, index, level, &mut |node, idx, lvl| {
                    if single.is_none() {
                        single = Some((node, idx, lvl));
                    }
                });
            }
            "last" => {
                explorer.visit(curr, index, level, &mut |node, idx, lvl| {
                    single = Some((node, idx, lvl));
                });
            }
            other => {
                // numeric positions were validated during compilation
                if let Ok(number) = other.parse::<usize>() {
                    let mut pos = 0usize;
                    explorer.visit(curr, index, level, &mut |node, idx, lvl| {
                        pos += 1;
                        if pos == number {
                            single = Some((node, idx, lvl));
                        }
                    });
                }
            }
        }

        if let Some((node, idx, lvl)) = single {
            process_node(node, idx, lvl, &mut tab, &mut ret);
        }
    }

    (tab, ret)
}

/// Execute the compiled command tree against one record string, returning
/// the record's formatted output (empty when nothing was produced).
pub fn execute_query(
    text: &str,
    parent: &str,
    index: usize,
    cmds: &Block,
    opts: &QueryOptions,
) -> String {
    let (arena, root) = match build_tree(text, parent, &opts.filters, opts.farm_size.max(4)) {
        Some(pair) => pair,
        None => return String::new(),
    };

    // variables live for one record
    let mut variables: HashMap<String, String> = HashMap::new();

    let mut buffer = String::new();
    let mut ok = false;

    if !opts.hd.is_empty() {
        buffer.push_str(&opts.hd);
    }

    let (_, ret) = process_commands(
        cmds,
        &arena,
        root,
        String::new(),
        String::new(),
        index,
        1,
        &mut variables,
        &mut |str| {
            if !str.is_empty() {
                ok = true;
                buffer.push_str(str);
            }
        },
    );

    if !opts.tl.is_empty() {
        buffer.push_str(&opts.tl);
    }

    if !ret.is_empty() {
        ok = true;
        buffer.push_str(&ret);
    }

    let mut txt = buffer;

    // remove a leading newline left by a -pfx construct
    if txt.starts_with('\n') {
        txt.remove(0);
    }

    if !ok {
        return String::new();
    }

    txt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::compiler::parse_arguments;
    use crate::sample::{INSD_SEQ_SAMPLE, PUBMED_ARTICLE_SAMPLE};

    fn run(xml: &str, args: &[&str]) -> String {
        let v: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let pattern = v[v.iter().position(|a| a == "-pattern").unwrap() + 1].clone();
        let (pat, _) = crate::text::split_left(&pattern, '/');
        let cmds = parse_arguments(&v, pat).unwrap();
        let opts = QueryOptions {
            farm_size: 64,
            ..Default::default()
        };
        execute_query(xml, "", 1, &cmds, &opts)
    }

    #[test]
    fn basic_element_extraction() {
        let out = run(
            PUBMED_ARTICLE_SAMPLE,
            &[
                "-pattern",
                "PubmedArticle",
                "-element",
                "MedlineCitation/PMID",
                "-block",
                "Author",
                "-sep",
                " ",
                "-element",
                "Initials,LastName",
            ],
        );
        assert_eq!(out, "6301692\tMA Krasnow\tNR Cozzarelli\n");
    }

    #[test]
    fn conditional_with_numeric_bound() {
        let out = run(
            INSD_SEQ_SAMPLE,
            &[
                "-pattern",
                "INSDSeq",
                "-if",
                "#INSDFeature",
                "-ge",
                "3",
                "-element",
                "INSDSeq_accession-version",
            ],
        );
        assert_eq!(out, "AAQ05867.1\n");
    }

    #[test]
    fn variable_capture_and_reuse() {
        // the prefix set by -pfc applies to every following clause, so the
        // stored accession and the name group land on separate lines; the
        // comma-group form "&ACC",Initials,LastName joins them instead
        let out = run(
            PUBMED_ARTICLE_SAMPLE,
            &[
                "-pattern",
                "PubmedArticle",
                "-ACC",
                "MedlineCitation/PMID",
                "-block",
                "Author",
                "-pfc",
                "\\n",
                "-element",
                "&ACC",
                "Initials,LastName",
            ],
        );
        assert_eq!(out, "6301692\t\nMA\tKrasnow\n6301692\t\nNR\tCozzarelli\n");
    }

    #[test]
    fn variable_in_comma_group_shares_the_row() {
        let out = run(
            PUBMED_ARTICLE_SAMPLE,
            &[
                "-pattern",
                "PubmedArticle",
                "-ACC",
                "MedlineCitation/PMID",
                "-block",
                "Author",
                "-pfc",
                "\\n",
                "-sep",
                " ",
                "-element",
                "&ACC,Initials,LastName",
            ],
        );
        assert_eq!(out, "6301692 MA Krasnow\n6301692 NR Cozzarelli\n");
    }

    #[test]
    fn ucsc_coordinates_on_mat_peptide() {
        let out = run(
            INSD_SEQ_SAMPLE,
            &[
                "-pattern",
                "INSDSeq",
                "-group",
                "INSDFeature",
                "-if",
                "INSDFeature_key",
                "-equals",
                "mat_peptide",
                "-block",
                "INSDInterval",
                "-ucsc-based",
                "INSDInterval_from",
                "INSDInterval_to",
            ],
        );
        assert_eq!(out, "40\t67\n");
    }

    #[test]
    fn else_branch_runs_on_failure() {
        let out = run(
            "<R><K>v</K></R>",
            &["-pattern", "R", "-if", "Z", "-element", "K", "-else", "-lbl", "none"],
        );
        assert_eq!(out, "none\n");
    }

    #[test]
    fn position_first_selects_one() {
        let out = run(
            "<R><A><N>1</N></A><A><N>2</N></A></R>",
            &["-pattern", "R", "-block", "A", "-position", "first", "-element", "N"],
        );
        assert_eq!(out, "1\n");
    }

    #[test]
    fn position_last_selects_one() {
        let out = run(
            "<R><A><N>1</N></A><A><N>2</N></A></R>",
            &["-pattern", "R", "-block", "A", "-position", "last", "-element", "N"],
        );
        assert_eq!(out, "2\n");
    }

    #[test]
    fn def_placeholder_fills_missing() {
        let out = run(
            "<R><A><N>1</N></A><A><M>x</M></A></R>",
            &["-pattern", "R", "-block", "A", "-def", "-", "-element", "N"],
        );
        assert_eq!(out, "1\t-\n");
    }

    #[test]
    fn no_output_returns_empty() {
        let out = run("<R><K>v</K></R>", &["-pattern", "R", "-element", "Z"]);
        assert_eq!(out, "");
    }

    #[test]
    fn heterogeneous_star_visit() {
        let out = run(
            "<S><R><K>1</K></R></S>",
            &["-pattern", "S", "-block", "S/*", "-element", "K"],
        );
        assert_eq!(out, "1\n");
    }
}
