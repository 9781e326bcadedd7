//! Argument compiler
//!
//! Two-phase compile of the command-line vector into an immutable Block
//! tree. Phase A groups arguments by exploration level precedence
//! (-pattern outermost, -unit innermost), producing the block skeleton.
//! Phase B splits each block's run into leading conditionals, extraction
//! and customization commands, and an optional -else branch, parsing every
//! operand into Steps and rewriting sequence-coordinate selectors.
//!
//! Errors abort the compile with a specific message; there is no recovery.

use anyhow::{bail, Result};

use crate::query::ops::{
    arg_kind, parse_flag, ArgKind, Block, OpType, Operation, ParsedFlag, SeqEnd, Step,
    EXPLORATION_LEVELS, SEQUENCE_KINDS,
};
use crate::text::{convert_slash, is_all_caps_or_digits, split_left, split_right};

/// Block under construction, with the raw argument runs still attached.
#[derive(Debug, Default)]
struct RawBlock {
    visit: String,
    parent: String,
    match_name: String,
    working: Vec<String>,
    parsed: Vec<String>,
    position: String,
    conditions: Vec<Operation>,
    commands: Vec<Operation>,
    failure: Vec<Operation>,
    subtasks: Vec<RawBlock>,
}

impl RawBlock {
    fn finish(self) -> Block {
        Block {
            visit: self.visit,
            parent: self.parent,
            match_name: self.match_name,
            position: self.position,
            conditions: self.conditions,
            commands: self.commands,
            failure: self.failure,
            subtasks: self.subtasks.into_iter().map(RawBlock::finish).collect(),
        }
    }
}

/// Find the highest exploration level (at or below start) present in the
/// argument run.
fn find_next_level(args: &[String], start: usize) -> Option<usize> {
    if args.len() < 2 {
        return None;
    }
    let mut level = start;
    loop {
        let (lc, uc) = EXPLORATION_LEVELS[level];
        if args.iter().any(|a| a == lc || a == uc) {
            return Some(level);
        }
        if level == 0 {
            return None;
        }
        level -= 1;
    }
}

/// Group the arguments of one exploration command into a block, splitting
/// off the run that belongs to deeper levels.
fn subset_commands(args: &[String]) -> RawBlock {
    let mut visit = String::new();
    let mut rest: &[String] = args;

    if args.len() > 1 {
        visit = args[1].clone();
        rest = &args[2..];
    }

    let mut partition = 0;
    for (cur, str) in rest.iter().enumerate() {
        partition = cur + 1;
        if !str.starts_with('-') {
            continue;
        }
        if arg_kind(str) == Some(ArgKind::Exploration) {
            partition = cur;
            break;
        }
    }

    // colon in any component indicates a namespace prefix
    let (prnt, match_name) = split_right(&visit, '/');

    RawBlock {
        parent: prnt.to_string(),
        match_name: match_name.to_string(),
        visit,
        parsed: rest[..partition].to_vec(),
        working: rest[partition..].to_vec(),
        ..Default::default()
    }
}

/// Phase A: build the exploration skeleton recursively.
fn parse_commands(parent: &mut RawBlock, start_level: usize) {
    let arguments = std::mem::take(&mut parent.working);

    let level = match find_next_level(&arguments, start_level) {
        Some(level) => level,
        None => {
            parent.working = arguments;
            return;
        }
    };
    let (lc, uc) = EXPLORATION_LEVELS[level];

    let mut cur = 0;
    for (idx, txt) in arguments.iter().enumerate() {
        if (txt == lc || txt == uc) && idx != 0 {
            let mut blk = subset_commands(&arguments[cur..idx]);
            if level > 0 {
                parse_commands(&mut blk, level - 1);
            }
            parent.subtasks.push(blk);
            cur = idx;
        }
    }

    if cur < arguments.len() {
        let mut blk = subset_commands(&arguments[cur..]);
        if level > 0 {
            parse_commands(&mut blk, level - 1);
        }
        parent.subtasks.push(blk);
    }
}

/// Split Parent/Match@attrib and flag the namespace-prefix wildcard.
fn split_address(item: &str) -> (String, String, String, bool) {
    let (prnt, rest) = split_right(item, '/');
    let (match_name, attrib) = split_left(rest, '@');
    let wildcard =
        prnt.starts_with(':') || match_name.starts_with(':') || attrib.starts_with(':');
    (
        prnt.to_string(),
        match_name.to_string(),
        attrib.to_string(),
        wildcard,
    )
}

/// Parse one conditional operand into the leading step of an operation.
fn parse_condition_step(op: &mut Operation, element_colon_value: bool) -> Result<()> {
    let mut str = op.value.clone();
    let mut kind = OpType::Element;

    // pound, percent, or caret prefix derives a number from the exploration
    if str.len() > 1 {
        match str.as_bytes()[0] {
            b'&' => {
                if is_all_caps_or_digits(&str[1..]) {
                    kind = OpType::Variable;
                    str = str[1..].to_string();
                } else if str.contains(':') {
                    bail!("Unsupported construct '{str}', use -if &VARIABLE -equals VALUE instead");
                } else {
                    bail!("Unrecognized variable '{str}'");
                }
            }
            b'#' => {
                kind = OpType::Count;
                str = str[1..].to_string();
            }
            b'%' => {
                kind = OpType::Length;
                str = str[1..].to_string();
            }
            b'^' => {
                kind = OpType::Depth;
                str = str[1..].to_string();
            }
            _ => {}
        }
    } else if str == "+" {
        kind = OpType::Index;
    }

    let (mut prnt, mut match_name, mut attrib, wildcard) = split_address(&str);
    let mut val = String::new();

    if element_colon_value {
        // deprecated element:value construct for -match and -avoid
        let (m, v) = split_left(&str, ':');
        val = v.to_string();
        let (p, rest) = split_right(m, '/');
        let (mn, at) = split_left(rest, '@');
        prnt = p.to_string();
        match_name = mn.to_string();
        attrib = at.to_string();
    }

    op.stages.push(Step {
        kind,
        value: str,
        parent: prnt,
        match_name,
        attrib,
        wild: wildcard,
    });

    if !val.is_empty() {
        op.stages.push(Step::literal(OpType::Equals, &val));
    }

    Ok(())
}

/// Parse the leading conditional segment of a block.
fn parse_conditionals(block: &mut RawBlock, arguments: &[String]) -> Result<Vec<Operation>> {
    let max = arguments.len();
    if max < 1 {
        return Ok(Vec::new());
    }

    let txt = &arguments[0];
    if txt != "-if" && txt != "-unless" && txt != "-match" && txt != "-avoid" && txt != "-position"
    {
        bail!("Missing -if command before '{txt}'");
    }
    if txt == "-position" && max > 2 {
        bail!("Cannot combine -position with -if or -unless commands");
    }
    let txt = &arguments[max - 1];
    if txt.starts_with('-') {
        bail!("Item missing after {txt} command");
    }

    let mut cond: Vec<Operation> = Vec::with_capacity(max);
    let mut status: Option<OpType> = None;
    let mut op_open = false;
    let mut element_colon_value = false;

    // conditionals alternate between command and object/value
    let mut expect_dash = true;
    let mut last = String::new();

    for raw in arguments {
        let mut str = raw.clone();

        if expect_dash {
            if !str.starts_with('-') {
                bail!("Unexpected '{str}' argument after '{last}'");
            }
            expect_dash = false;
        } else {
            if str.starts_with('-') {
                bail!("Unexpected '{str}' command after '{last}'");
            }
            expect_dash = true;
        }
        last = str.clone();

        match status {
            None => match parse_flag(&str) {
                ParsedFlag::Op(op) => status = Some(op),
                ParsedFlag::Unrecognized => bail!("Unrecognized argument '{str}'"),
                ParsedFlag::Variable | ParsedFlag::NotFlag => {
                    bail!("Unexpected argument '{str}'")
                }
            },
            Some(OpType::Position) => {
                block.position = str;
                status = None;
            }
            Some(kind @ (OpType::If | OpType::Unless | OpType::Match | OpType::Avoid
            | OpType::And | OpType::Or)) => {
                if matches!(kind, OpType::Match | OpType::Avoid) {
                    element_colon_value = true;
                }
                let mut op = Operation {
                    kind,
                    value: str,
                    stages: Vec::new(),
                };
                parse_condition_step(&mut op, element_colon_value)?;
                cond.push(op);
                op_open = true;
                status = None;
            }
            Some(kind @ (OpType::Equals | OpType::Contains | OpType::StartsWith
            | OpType::EndsWith | OpType::IsNot)) => {
                if !op_open {
                    bail!("Unexpected adjacent string match constraints");
                }
                if str.len() > 1 && str.starts_with('\\') {
                    // leading backslash protects a dash
                    str = str[1..].to_string();
                }
                let op = cond.last_mut().unwrap();
                op.stages.push(Step::literal(kind, &str));
                op_open = false;
                status = None;
            }
            Some(kind @ (OpType::Gt | OpType::Ge | OpType::Lt | OpType::Le | OpType::Eq
            | OpType::Ne)) => {
                if !op_open {
                    bail!("Unexpected adjacent numeric match constraints");
                }
                if str.len() > 1 && str.starts_with('\\') {
                    // leading backslash protects a minus sign
                    str = str[1..].to_string();
                }
                if str.is_empty() {
                    bail!("Empty numeric match constraints");
                }
                let ch = str.as_bytes()[0];
                let op = cond.last_mut().unwrap();
                if ch.is_ascii_digit() || ch == b'-' || ch == b'+' {
                    // literal numeric constant
                    op.stages.push(Step::literal(kind, &str));
                } else {
                    // numeric test allows an element as the second argument
                    let orig = str.clone();
                    let mut body = str.as_str();
                    let mut ch = ch;
                    if ch == b'#' || ch == b'%' || ch == b'^' {
                        body = &str[1..];
                        if body.is_empty() {
                            bail!("Unexpected numeric match constraints");
                        }
                        ch = body.as_bytes()[0];
                    }
                    if ch.is_ascii_alphabetic() {
                        let (prnt, match_name, attrib, wildcard) = split_address(body);
                        op.stages.push(Step {
                            kind,
                            value: orig,
                            parent: prnt,
                            match_name,
                            attrib,
                            wild: wildcard,
                        });
                    } else {
                        bail!("Unexpected numeric match constraints");
                    }
                }
                op_open = false;
                status = None;
            }
            Some(_) => bail!("Unexpected argument '{str}'"),
        }
    }

    Ok(cond)
}

/// Parse one extraction operand into steps, handling comma groups, special
/// leading characters, and sequence-coordinate rewriting.
fn parse_steps(op: &mut Operation, pattern: &str) -> Result<()> {
    let stat = op.kind;
    let str = op.value.clone();

    // comma-separated element names form one prefix-separator-suffix group
    for piece in str.split(',') {
        let mut item = piece.to_string();
        let mut kind = stat;

        if item.len() > 1 {
            match item.as_bytes()[0] {
                b'&' => {
                    if is_all_caps_or_digits(&item[1..]) {
                        kind = OpType::Variable;
                        item = item[1..].to_string();
                    } else {
                        bail!("Unrecognized variable '{item}'");
                    }
                }
                b'#' => {
                    kind = OpType::Count;
                    item = item[1..].to_string();
                }
                b'%' => {
                    kind = OpType::Length;
                    item = item[1..].to_string();
                }
                b'^' => {
                    kind = OpType::Depth;
                    item = item[1..].to_string();
                }
                b'*' => {
                    kind = OpType::Star;
                }
                _ => {}
            }
        } else {
            match item.as_str() {
                "*" => kind = OpType::Star,
                "+" => kind = OpType::Index,
                "$" => kind = OpType::Dollar,
                "@" => kind = OpType::AtSign,
                _ => {}
            }
        }

        let (prnt, match_name, attrib, wildcard) = split_address(&item);

        // sequence coordinate adjustments
        if matches!(kind, OpType::ZeroBased | OpType::OneBased | OpType::UcscBased) {
            let mut seq = format!("{pattern}:");
            if !attrib.is_empty() {
                seq.push('@');
                seq.push_str(&attrib);
            } else if !match_name.is_empty() {
                seq.push_str(&match_name);
            }
            let seqtype = match SEQUENCE_KINDS.get(seq.as_str()) {
                Some(k) => *k,
                None => {
                    bail!("Element '{item}' is not suitable for sequence coordinate conversion")
                }
            };
            kind = match kind {
                OpType::ZeroBased => {
                    // 1-based coordinates decrement to the 0-based value
                    if seqtype.based == 1 {
                        OpType::Dec
                    } else {
                        OpType::Element
                    }
                }
                OpType::OneBased => {
                    // 0-based coordinates increment to the 1-based value
                    if seqtype.based == 0 {
                        OpType::Inc
                    } else {
                        OpType::Element
                    }
                }
                _ => {
                    // half-open intervals: start is 0-based, stop is 1-based
                    if seqtype.based == 0 && seqtype.which == SeqEnd::Stop {
                        OpType::Inc
                    } else if seqtype.based == 1 && seqtype.which == SeqEnd::Start {
                        OpType::Dec
                    } else {
                        OpType::Element
                    }
                }
            };
        }

        op.stages.push(Step {
            kind,
            value: item,
            parent: prnt,
            match_name,
            attrib,
            wild: wildcard,
        });
    }

    Ok(())
}

const VALUE_OPS: [OpType; 25] = [
    OpType::Element,
    OpType::First,
    OpType::Last,
    OpType::Encode,
    OpType::Upper,
    OpType::Lower,
    OpType::Title,
    OpType::Terms,
    OpType::Words,
    OpType::Pairs,
    OpType::Letters,
    OpType::Indices,
    OpType::Num,
    OpType::Len,
    OpType::Sum,
    OpType::Min,
    OpType::Max,
    OpType::Inc,
    OpType::Dec,
    OpType::Sub,
    OpType::Avg,
    OpType::Dev,
    OpType::ZeroBased,
    OpType::OneBased,
    OpType::UcscBased,
];

const TEXT_OPS: [OpType; 8] = [
    OpType::Tab,
    OpType::Ret,
    OpType::Pfx,
    OpType::Sfx,
    OpType::Sep,
    OpType::Lbl,
    OpType::Pfc,
    OpType::Def,
];

/// Parse the extraction/customization segment of a block.
fn parse_extractions(arguments: &[String], pattern: &str) -> Result<Vec<Operation>> {
    let max = arguments.len();
    if max < 1 {
        return Ok(Vec::new());
    }

    let txt = &arguments[0];
    if !txt.starts_with('-') {
        bail!("Missing -element command before '{txt}'");
    }
    let txt = &arguments[max - 1];
    if txt.starts_with('-') {
        if txt == "-rst" {
            bail!("Unexpected position for {txt} command");
        } else if txt == "-clr" {
        } else if max < 2 || arguments[max - 2] != "-lbl" {
            bail!("Item missing after {txt} command");
        }
    }

    let mut comm: Vec<Operation> = Vec::with_capacity(max);
    let mut status: Option<OpType> = None;

    // classify the next flag, recording variable stores and bare commands
    let next_status = |str: &str, comm: &mut Vec<Operation>| -> Result<Option<OpType>> {
        match parse_flag(str) {
            ParsedFlag::Variable => {
                comm.push(Operation {
                    kind: OpType::Variable,
                    value: str[1..].to_string(),
                    stages: Vec::new(),
                });
                Ok(Some(OpType::Value))
            }
            ParsedFlag::Op(op @ (OpType::Clr | OpType::Rst)) => {
                comm.push(Operation {
                    kind: op,
                    value: String::new(),
                    stages: Vec::new(),
                });
                Ok(None)
            }
            ParsedFlag::Op(op) if VALUE_OPS.contains(&op) || TEXT_OPS.contains(&op) => {
                Ok(Some(op))
            }
            ParsedFlag::NotFlag => bail!("No -element before '{str}'"),
            ParsedFlag::Unrecognized => bail!("Unrecognized argument '{str}'"),
            ParsedFlag::Op(_) => bail!("Misplaced {str} command"),
        }
    };

    let mut idx = 0;
    while idx < max {
        let str = &arguments[idx];
        idx += 1;

        if arg_kind(str) == Some(ArgKind::Conditional) {
            bail!("Misplaced {str} command");
        }

        match status {
            None => {
                status = next_status(str, &mut comm)?;
            }
            Some(kind) if VALUE_OPS.contains(&kind) => {
                let mut str = str.clone();
                loop {
                    if str.starts_with('-') {
                        break;
                    }
                    // one operation per operand, even under a single -element
                    let mut op = Operation {
                        kind,
                        value: str.clone(),
                        stages: Vec::new(),
                    };
                    parse_steps(&mut op, pattern)?;
                    comm.push(op);
                    if idx >= max {
                        break;
                    }
                    str = arguments[idx].clone();
                    idx += 1;
                }
                status = None;
                if str.starts_with('-') && idx < max {
                    status = next_status(&str, &mut comm)?;
                }
            }
            Some(kind) if TEXT_OPS.contains(&kind) => {
                comm.push(Operation {
                    kind,
                    value: convert_slash(str),
                    stages: Vec::new(),
                });
                status = None;
            }
            Some(OpType::Value) => {
                let mut op = Operation {
                    kind: OpType::Value,
                    value: str.clone(),
                    stages: Vec::new(),
                };
                parse_steps(&mut op, pattern)?;
                comm.push(op);
                status = None;
            }
            Some(_) => {
                status = None;
            }
        }
    }

    Ok(comm)
}

/// Phase B: convert parsed argument runs into operation lists, recursing
/// through child blocks.
fn parse_operations(block: &mut RawBlock, pattern: &str) -> Result<()> {
    let args = std::mem::take(&mut block.parsed);

    // junction between conditional and extraction commands
    let mut partition = 0;
    for (cur, str) in args.iter().enumerate() {
        partition = cur + 1;
        if !str.starts_with('-') {
            continue;
        }
        if arg_kind(str) != Some(ArgKind::Conditional) {
            partition = cur;
            break;
        }
    }

    let conditionals = &args[..partition];
    let rest = &args[partition..];

    // junction at the -else command
    let mut partition = 0;
    let mut found_else = false;
    for (cur, str) in rest.iter().enumerate() {
        partition = cur + 1;
        if !str.starts_with('-') {
            continue;
        }
        if str == "-else" {
            partition = cur;
            found_else = true;
            break;
        }
    }

    let extractions = &rest[..partition];
    let mut alternative = &rest[partition..];
    if let Some(first) = alternative.first() {
        if first == "-else" {
            alternative = &alternative[1..];
        }
    }

    block.conditions = parse_conditionals(block, conditionals)?;
    block.commands = parse_extractions(extractions, pattern)?;
    block.failure = parse_extractions(alternative, pattern)?;

    if !block.position.is_empty()
        && block.position != "first"
        && block.position != "last"
        && block.position.parse::<usize>().is_err()
    {
        bail!("Unrecognized position '{}'", block.position);
    }

    if found_else
        && (conditionals.is_empty() || alternative.is_empty() || !block.subtasks.is_empty())
    {
        bail!("Misplaced -else command");
    }

    for sub in &mut block.subtasks {
        parse_operations(sub, pattern)?;
    }

    Ok(())
}

/// Compile the argument vector into a Block tree rooted at the single
/// -pattern command.
pub fn parse_arguments(args: &[String], pattern: &str) -> Result<Block> {
    let mut head = RawBlock {
        working: args.to_vec(),
        ..Default::default()
    };

    parse_commands(&mut head, EXPLORATION_LEVELS.len() - 1);

    if head.subtasks.len() != 1 {
        bail!("Problem parsing command-line arguments");
    }

    // skip past the empty placeholder
    let mut head = head.subtasks.into_iter().next().unwrap();

    parse_operations(&mut head, pattern)?;

    // reality checks for a single -pattern and at least one extraction
    let mut no_element = true;
    let mut num_patterns = 0;
    for txt in args {
        if arg_kind(txt) == Some(ArgKind::Extraction) {
            no_element = false;
        }
        if txt == "-pattern" || txt == "-Pattern" {
            num_patterns += 1;
        }
    }
    if num_patterns < 1 {
        bail!("No -pattern in command-line arguments");
    }
    if num_patterns > 1 {
        bail!("Only one -pattern command is permitted");
    }
    if no_element {
        bail!("No -element statement in argument list");
    }

    Ok(head.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(args: &[&str]) -> Result<Block> {
        let v: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let pattern = v
            .iter()
            .position(|a| a == "-pattern")
            .map(|i| v[i + 1].clone())
            .unwrap_or_default();
        let (pat, _) = crate::text::split_left(&pattern, '/');
        parse_arguments(&v, pat)
    }

    #[test]
    fn compiles_flat_pattern() {
        let blk = compile(&["-pattern", "PubmedArticle", "-element", "MedlineCitation/PMID"])
            .unwrap();
        assert_eq!(blk.visit, "PubmedArticle");
        assert_eq!(blk.commands.len(), 1);
        let op = &blk.commands[0];
        assert_eq!(op.kind, OpType::Element);
        assert_eq!(op.stages[0].parent, "MedlineCitation");
        assert_eq!(op.stages[0].match_name, "PMID");
    }

    #[test]
    fn nested_blocks_attach_to_pattern() {
        let blk = compile(&[
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
        ])
        .unwrap();
        assert_eq!(blk.subtasks.len(), 1);
        let author = &blk.subtasks[0];
        assert_eq!(author.visit, "Author");
        // -sep then one comma-group element command
        assert_eq!(author.commands.len(), 2);
        assert_eq!(author.commands[0].kind, OpType::Sep);
        assert_eq!(author.commands[1].stages.len(), 2);
    }

    #[test]
    fn conditional_chain_with_numeric_bound() {
        let blk = compile(&[
            "-pattern",
            "INSDSeq",
            "-if",
            "#INSDFeature",
            "-ge",
            "3",
            "-element",
            "INSDSeq_accession-version",
        ])
        .unwrap();
        assert_eq!(blk.conditions.len(), 1);
        let cond = &blk.conditions[0];
        assert_eq!(cond.kind, OpType::If);
        assert_eq!(cond.stages[0].kind, OpType::Count);
        assert_eq!(cond.stages[1].kind, OpType::Ge);
        assert_eq!(cond.stages[1].value, "3");
    }

    #[test]
    fn variable_capture_compiles() {
        let blk = compile(&[
            "-pattern",
            "PubmedArticle",
            "-ACC",
            "MedlineCitation/PMID",
            "-element",
            "&ACC",
        ])
        .unwrap();
        assert_eq!(blk.commands[0].kind, OpType::Variable);
        assert_eq!(blk.commands[0].value, "ACC");
        assert_eq!(blk.commands[1].kind, OpType::Value);
        assert_eq!(blk.commands[2].stages[0].kind, OpType::Variable);
        assert_eq!(blk.commands[2].stages[0].match_name, "ACC");
    }

    #[test]
    fn ucsc_rewrite_on_insd_interval() {
        let blk = compile(&[
            "-pattern",
            "INSDSeq",
            "-ucsc-based",
            "INSDInterval_from",
            "INSDInterval_to",
        ])
        .unwrap();
        // from is 1-based start, decremented; to is 1-based stop, unchanged
        assert_eq!(blk.commands[0].stages[0].kind, OpType::Dec);
        assert_eq!(blk.commands[1].stages[0].kind, OpType::Element);
    }

    #[test]
    fn zero_based_rewrite_on_docsum() {
        let blk = compile(&[
            "-pattern",
            "DocumentSummary",
            "-1-based",
            "ChrStart",
        ])
        .unwrap();
        assert_eq!(blk.commands[0].stages[0].kind, OpType::Inc);
    }

    #[test]
    fn rejects_unknown_coordinate_element() {
        let err = compile(&["-pattern", "INSDSeq", "-0-based", "INSDSeq_length"])
            .unwrap_err()
            .to_string();
        assert!(err.contains("not suitable for sequence coordinate conversion"));
    }

    #[test]
    fn rejects_multiple_patterns() {
        let err = compile(&[
            "-pattern", "A", "-element", "X", "-pattern", "B", "-element", "Y",
        ])
        .unwrap_err()
        .to_string();
        assert!(err.contains("Only one -pattern"));
    }

    #[test]
    fn rejects_position_with_if() {
        let err = compile(&[
            "-pattern", "A", "-position", "first", "-if", "X", "-element", "X",
        ])
        .unwrap_err()
        .to_string();
        assert!(err.contains("Cannot combine -position"));
    }

    #[test]
    fn rejects_trailing_operandless_command() {
        let err = compile(&["-pattern", "A", "-element"]).unwrap_err().to_string();
        assert!(err.contains("Item missing after"));
    }

    #[test]
    fn else_branch_parses() {
        let blk = compile(&[
            "-pattern", "A", "-if", "X", "-element", "X", "-else", "-lbl", "none",
        ])
        .unwrap();
        assert_eq!(blk.failure.len(), 1);
        assert_eq!(blk.failure[0].kind, OpType::Lbl);
    }

    #[test]
    fn star_and_index_selectors() {
        let blk = compile(&["-pattern", "A", "-element", "*", "+", "$", "@"]).unwrap();
        let kinds: Vec<OpType> = blk.commands.iter().map(|c| c.stages[0].kind).collect();
        assert_eq!(
            kinds,
            vec![OpType::Star, OpType::Index, OpType::Dollar, OpType::AtSign]
        );
    }
}
