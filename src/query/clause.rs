//! Clause evaluation
//!
//! Executes one value-producing command against the current node. The
//! comma-separated element list under a single command forms one
//! prefix-separator-suffix emission group; the group's values are joined
//! with the separator and wrapped with the prefix and suffix. If nothing is
//! produced, the -def placeholder applies.

use std::collections::HashMap;

use crate::dom::{print_subtree, IndentStyle, NodeArena, NodeId};
use crate::query::explore::explore_elements;
use crate::query::ops::{is_stop_word, OpType, Step};
use crate::text::{
    cleanup_bad_spaces, escape_xml, fold_accents, has_angle_bracket, has_bad_space,
    has_markup_runes, is_all_numeric, is_not_ascii, remove_unicode_markup, strip_inline_tags,
    title_case, trim_punctuation, unescape_xml,
};

/// Run each stage of the clause, reporting raw values to the accumulator.
#[allow(clippy::too_many_arguments)]
fn process_element(
    arena: &NodeArena,
    curr: NodeId,
    stages: &[Step],
    mask: &str,
    index: usize,
    level: usize,
    variables: &HashMap<String, String>,
    acc: &mut dyn FnMut(&str),
) {
    for stage in stages {
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

        match stage.kind {
            OpType::Element
            | OpType::Terms
            | OpType::Words
            | OpType::Pairs
            | OpType::Letters
            | OpType::Indices
            | OpType::Value
            | OpType::Len
            | OpType::Sum
            | OpType::Min
            | OpType::Max
            | OpType::Sub
            | OpType::Avg
            | OpType::Dev => {
                explore(&mut |s, _| {
                    if !s.is_empty() {
                        acc(s);
                    }
                });
            }
            OpType::First => {
                let mut single = String::new();
                explore(&mut |s, _| {
                    if single.is_empty() {
                        single = s.to_string();
                    }
                });
                if !single.is_empty() {
                    acc(&single);
                }
            }
            OpType::Last => {
                let mut single = String::new();
                explore(&mut |s, _| single = s.to_string());
                if !single.is_empty() {
                    acc(&single);
                }
            }
            OpType::Encode => {
                explore(&mut |s, _| {
                    if !s.is_empty() {
                        acc(&escape_xml(s));
                    }
                });
            }
            OpType::Upper => {
                explore(&mut |s, _| {
                    if !s.is_empty() {
                        acc(&s.to_uppercase());
                    }
                });
            }
            OpType::Lower => {
                explore(&mut |s, _| {
                    if !s.is_empty() {
                        acc(&s.to_lowercase());
                    }
                });
            }
            OpType::Title => {
                explore(&mut |s, _| {
                    if !s.is_empty() {
                        acc(&title_case(s));
                    }
                });
            }
            OpType::Variable => {
                // use value of stored variable
                if let Some(val) = variables.get(&stage.match_name) {
                    acc(val);
                }
            }
            OpType::Num | OpType::Count => {
                let mut count = 0usize;
                explore(&mut |_, _| count += 1);
                acc(&count.to_string());
            }
            OpType::Length => {
                let mut length = 0usize;
                explore(&mut |s, _| length += s.len());
                acc(&length.to_string());
            }
            OpType::Depth => {
                explore(&mut |_, lvl| {
                    acc(&lvl.to_string());
                });
            }
            OpType::Index => {
                acc(&index.to_string());
            }
            OpType::Inc => {
                explore(&mut |s, _| {
                    if let Ok(num) = s.parse::<i64>() {
                        acc(&(num + 1).to_string());
                    }
                });
            }
            OpType::Dec => {
                explore(&mut |s, _| {
                    if let Ok(num) = s.parse::<i64>() {
                        acc(&(num - 1).to_string());
                    }
                });
            }
            OpType::Star => {
                // star count selects the subtree style, '@' drops attributes
                let mut stars = 0usize;
                let mut print_attrs = true;
                for ch in stage.value.chars() {
                    if ch == '*' {
                        stars += 1;
                    } else if ch == '@' {
                        print_attrs = false;
                    }
                }
                let style = IndentStyle::from_stars(stars);
                let mut txt = String::new();
                print_subtree(arena, curr, style, print_attrs, &mut txt);
                if !txt.is_empty() {
                    acc(&txt);
                }
            }
            OpType::Dollar => {
                for child in arena.children(curr) {
                    acc(&arena.get(child).name);
                }
            }
            OpType::AtSign => {
                for (tag, _) in arena.get(curr).attribute_pairs() {
                    acc(tag);
                }
            }
            _ => {}
        }
    }
}

/// Evaluate one clause, returning the formatted emission group or None if
/// nothing was produced and no default applies.
#[allow(clippy::too_many_arguments)]
pub fn process_clause(
    arena: &NodeArena,
    curr: NodeId,
    stages: &[Step],
    mask: &str,
    prev: &str,
    pfx: &str,
    sfx: &str,
    sep: &str,
    def: &str,
    status: OpType,
    index: usize,
    level: usize,
    variables: &HashMap<String, String>,
) -> Option<String> {
    let mut ok = false;
    let mut buffer = String::new();
    buffer.push_str(prev);
    buffer.push_str(pfx);
    let mut between = "";

    let mut run = |acc: &mut dyn FnMut(&str)| {
        process_element(arena, curr, stages, mask, index, level, variables, acc);
    };

    match status {
        OpType::Element
        | OpType::Encode
        | OpType::Upper
        | OpType::Lower
        | OpType::Title
        | OpType::Value
        | OpType::Num
        | OpType::Inc
        | OpType::Dec
        | OpType::ZeroBased
        | OpType::OneBased
        | OpType::UcscBased => {
            run(&mut |s| {
                if !s.is_empty() {
                    ok = true;
                    buffer.push_str(between);
                    buffer.push_str(s);
                    between = sep;
                }
            });
        }
        OpType::First => {
            let mut single = String::new();
            run(&mut |s| {
                ok = true;
                if single.is_empty() {
                    single = s.to_string();
                }
            });
            if !single.is_empty() {
                buffer.push_str(between);
                buffer.push_str(&single);
            }
        }
        OpType::Last => {
            let mut single = String::new();
            run(&mut |s| {
                ok = true;
                single = s.to_string();
            });
            if !single.is_empty() {
                buffer.push_str(between);
                buffer.push_str(&single);
            }
        }
        OpType::Terms => {
            run(&mut |s| {
                for word in s.split_whitespace() {
                    let mut item = word;
                    // trim trailing period, comma, colon, and semicolon
                    while item.len() > 1 {
                        match item.as_bytes()[item.len() - 1] {
                            b'.' | b',' | b':' | b';' => item = &item[..item.len() - 1],
                            _ => break,
                        }
                    }
                    ok = true;
                    buffer.push_str(between);
                    buffer.push_str(item);
                    between = sep;
                }
            });
        }
        OpType::Words => {
            run(&mut |s| {
                for word in s.split(|c: char| !c.is_alphanumeric()) {
                    if word.is_empty() {
                        continue;
                    }
                    ok = true;
                    buffer.push_str(between);
                    buffer.push_str(&word.to_lowercase());
                    between = sep;
                }
            });
        }
        OpType::Pairs => {
            run(&mut |s| {
                let words: Vec<String> = s
                    .split(|c: char| !c.is_alphanumeric())
                    .filter(|w| !w.is_empty())
                    .map(|w| w.to_lowercase())
                    .collect();
                if words.len() > 1 {
                    let mut past = String::new();
                    for item in words {
                        if is_stop_word(&item) {
                            // stop words interrupt the bigram chain
                            past.clear();
                            continue;
                        }
                        if !past.is_empty() {
                            ok = true;
                            buffer.push_str(between);
                            buffer.push_str(&past);
                            buffer.push(' ');
                            buffer.push_str(&item);
                            between = sep;
                        }
                        past = item;
                    }
                }
            });
        }
        OpType::Letters => {
            run(&mut |s| {
                for ch in s.chars() {
                    ok = true;
                    buffer.push_str(between);
                    buffer.push(ch);
                    between = sep;
                }
            });
        }
        OpType::Indices => {
            let mut term: Vec<String> = Vec::new();
            let mut pair: Vec<String> = Vec::new();

            {
                let mut add_to_index = |item: &str, past: &str| -> String {
                    if item.is_empty() {
                        return String::new();
                    }
                    if is_stop_word(item) {
                        // stop word interrupts the overlapping pair chain
                        return String::new();
                    }
                    ok = true;
                    let item = escape_xml(item);
                    term.push(item.clone());
                    if !past.is_empty() {
                        pair.push(format!("{past} {item}"));
                    }
                    item
                };

                run(&mut |s| {
                    let mut str = s.to_string();
                    if is_not_ascii(&str) {
                        str = fold_accents(&str);
                    }
                    str = str.to_lowercase();
                    if has_bad_space(&str) {
                        str = cleanup_bad_spaces(&str);
                    }
                    if has_markup_runes(&str) {
                        str = remove_unicode_markup(&str);
                    }
                    if has_angle_bracket(&str) {
                        str = strip_inline_tags(&str);
                    }

                    // break terms at spaces, allowing hyphenated terms
                    for item in str.split_whitespace() {
                        let item = unescape_xml(item);
                        // allow parentheses in chemical formulas
                        let item = trim_punctuation(&item);
                        if is_all_numeric(item) {
                            continue;
                        }
                        add_to_index(item, "");
                    }

                    // break words at non-alphanumeric punctuation
                    let mut past = String::new();
                    for item in str.split(|c: char| !c.is_alphanumeric()) {
                        // anything starting with a digit breaks the chain
                        if item.is_empty() || item.as_bytes()[0].is_ascii_digit() {
                            past.clear();
                            continue;
                        }
                        past = add_to_index(item, &past);
                    }
                });
            }

            if ok {
                term.sort();
                pair.sort();

                let mut last: &str = "";
                for item in &term {
                    if item.as_str() == last {
                        continue;
                    }
                    buffer.push_str("      <NORM>");
                    buffer.push_str(item);
                    buffer.push_str("</NORM>\n");
                    last = item.as_str();
                }

                let mut last: &str = "";
                for item in &pair {
                    if item.as_str() == last {
                        continue;
                    }
                    buffer.push_str("      <PAIR>");
                    buffer.push_str(item);
                    buffer.push_str("</PAIR>\n");
                    last = item.as_str();
                }
            }
        }
        OpType::Len => {
            let mut length = 0usize;
            run(&mut |s| {
                ok = true;
                length += s.len();
            });
            buffer.push_str(between);
            buffer.push_str(&length.to_string());
        }
        OpType::Sum => {
            let mut sum = 0i64;
            run(&mut |s| {
                if let Ok(value) = s.parse::<i64>() {
                    sum += value;
                    ok = true;
                }
            });
            if ok {
                buffer.push_str(between);
                buffer.push_str(&sum.to_string());
            }
        }
        OpType::Min => {
            let mut min = 0i64;
            run(&mut |s| {
                if let Ok(value) = s.parse::<i64>() {
                    if !ok || value < min {
                        min = value;
                    }
                    ok = true;
                }
            });
            if ok {
                buffer.push_str(between);
                buffer.push_str(&min.to_string());
            }
        }
        OpType::Max => {
            let mut max = 0i64;
            run(&mut |s| {
                if let Ok(value) = s.parse::<i64>() {
                    if !ok || value > max {
                        max = value;
                    }
                    ok = true;
                }
            });
            if ok {
                buffer.push_str(between);
                buffer.push_str(&max.to_string());
            }
        }
        OpType::Sub => {
            let mut first = 0i64;
            let mut second = 0i64;
            let mut count = 0usize;
            run(&mut |s| {
                if let Ok(value) = s.parse::<i64>() {
                    count += 1;
                    if count == 1 {
                        first = value;
                    } else if count == 2 {
                        second = value;
                    }
                }
            });
            // difference requires exactly two values
            if count == 2 {
                ok = true;
                buffer.push_str(between);
                buffer.push_str(&(first - second).to_string());
            }
        }
        OpType::Avg => {
            let mut sum = 0i64;
            let mut count = 0i64;
            run(&mut |s| {
                if let Ok(value) = s.parse::<i64>() {
                    sum += value;
                    count += 1;
                    ok = true;
                }
            });
            if ok {
                let avg = (sum as f64 / count as f64) as i64;
                buffer.push_str(between);
                buffer.push_str(&avg.to_string());
            }
        }
        OpType::Dev => {
            // Welford one-pass standard deviation
            let mut count = 0i64;
            let mut mean = 0.0f64;
            let mut m2 = 0.0f64;
            run(&mut |s| {
                if let Ok(value) = s.parse::<i64>() {
                    count += 1;
                    let x = value as f64;
                    let delta = x - mean;
                    mean += delta / count as f64;
                    m2 += delta * (x - mean);
                }
            });
            // at least two samples required
            if count > 1 {
                ok = true;
                let vrc = m2 / (count - 1) as f64;
                let dev = vrc.sqrt() as i64;
                buffer.push_str(between);
                buffer.push_str(&dev.to_string());
            }
        }
        _ => {}
    }

    // use the default value if nothing was written
    if !ok && !def.is_empty() {
        ok = true;
        buffer.push_str(def);
    }

    buffer.push_str(sfx);

    if !ok {
        return None;
    }

    Some(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::build_tree;
    use crate::query::compiler::parse_arguments;
    use crate::text::TextFilters;

    fn clause(xml: &str, op_args: &[&str], status: OpType) -> Option<String> {
        let mut args = vec!["-pattern".to_string(), "R".to_string()];
        args.extend(op_args.iter().map(|s| s.to_string()));
        let blk = parse_arguments(&args, "R").unwrap();
        let op = blk
            .commands
            .iter()
            .find(|c| c.kind == status)
            .expect("operation present");
        let (arena, root) = build_tree(xml, "", &TextFilters::default(), 16).unwrap();
        process_clause(
            &arena,
            root,
            &op.stages,
            &blk.match_name,
            "",
            "",
            "",
            "\t",
            "",
            op.kind,
            1,
            1,
            &HashMap::new(),
        )
    }

    #[test]
    fn element_emits_all_matches() {
        let xml = "<R><K>1</K><K>2</K></R>";
        assert_eq!(clause(xml, &["-element", "K"], OpType::Element).unwrap(), "1\t2");
    }

    #[test]
    fn first_and_last() {
        let xml = "<R><K>1</K><K>2</K><K>3</K></R>";
        assert_eq!(clause(xml, &["-first", "K"], OpType::First).unwrap(), "1");
        assert_eq!(clause(xml, &["-last", "K"], OpType::Last).unwrap(), "3");
    }

    #[test]
    fn numeric_aggregates() {
        let xml = "<R><N>4</N><N>6</N><N>8</N></R>";
        assert_eq!(clause(xml, &["-sum", "N"], OpType::Sum).unwrap(), "18");
        assert_eq!(clause(xml, &["-min", "N"], OpType::Min).unwrap(), "4");
        assert_eq!(clause(xml, &["-max", "N"], OpType::Max).unwrap(), "8");
        assert_eq!(clause(xml, &["-avg", "N"], OpType::Avg).unwrap(), "6");
        assert_eq!(clause(xml, &["-dev", "N"], OpType::Dev).unwrap(), "2");
    }

    #[test]
    fn sub_requires_exactly_two() {
        let xml = "<R><N>10</N><N>4</N></R>";
        assert_eq!(clause(xml, &["-sub", "N"], OpType::Sub).unwrap(), "6");
        let xml = "<R><N>10</N><N>4</N><N>1</N></R>";
        assert!(clause(xml, &["-sub", "N"], OpType::Sub).is_none());
    }

    #[test]
    fn terms_trim_trailing_punctuation() {
        let xml = "<R><T>alpha, beta; gamma.</T></R>";
        assert_eq!(
            clause(xml, &["-terms", "T"], OpType::Terms).unwrap(),
            "alpha\tbeta\tgamma"
        );
    }

    #[test]
    fn words_lowercase_and_split() {
        let xml = "<R><T>Site-specific DNA</T></R>";
        assert_eq!(
            clause(xml, &["-words", "T"], OpType::Words).unwrap(),
            "site\tspecific\tdna"
        );
    }

    #[test]
    fn pairs_skip_stop_words() {
        let xml = "<R><T>relaxation of the supercoiled plasmid</T></R>";
        assert_eq!(
            clause(xml, &["-pairs", "T"], OpType::Pairs).unwrap(),
            "supercoiled plasmid"
        );
    }

    #[test]
    fn letters_emit_each_char() {
        let xml = "<R><T>abc</T></R>";
        assert_eq!(
            clause(xml, &["-letters", "T"], OpType::Letters).unwrap(),
            "a\tb\tc"
        );
    }

    #[test]
    fn indices_emit_sorted_unique_terms() {
        let xml = "<R><T>beta alpha beta</T></R>";
        let out = clause(xml, &["-indices", "T"], OpType::Indices).unwrap();
        let alpha = out.find("<NORM>alpha</NORM>").unwrap();
        let beta = out.find("<NORM>beta</NORM>").unwrap();
        assert!(alpha < beta);
        assert_eq!(out.matches("<NORM>beta</NORM>").count(), 1);
        assert!(out.contains("<PAIR>alpha beta</PAIR>"));
    }

    #[test]
    fn count_and_length() {
        let xml = "<R><K>ab</K><K>cde</K></R>";
        assert_eq!(clause(xml, &["-num", "K"], OpType::Num).unwrap(), "2");
        assert_eq!(clause(xml, &["-len", "K"], OpType::Len).unwrap(), "5");
    }

    #[test]
    fn inc_and_dec() {
        let xml = "<R><N>41</N></R>";
        assert_eq!(clause(xml, &["-inc", "N"], OpType::Inc).unwrap(), "42");
        assert_eq!(clause(xml, &["-dec", "N"], OpType::Dec).unwrap(), "40");
    }

    #[test]
    fn star_prints_subtree() {
        let xml = "<R><K>1</K></R>";
        let out = clause(xml, &["-element", "*"], OpType::Element).unwrap();
        assert_eq!(out, "<R><K>1</K></R>");
    }

    #[test]
    fn dollar_and_atsign() {
        let xml = "<R a=\"1\" b=\"2\"><K>1</K><M>2</M></R>";
        let mut args = vec!["-pattern".to_string(), "R".to_string()];
        args.extend(["-element", "$"].iter().map(|s| s.to_string()));
        let blk = parse_arguments(&args, "R").unwrap();
        let (arena, root) = build_tree(xml, "", &TextFilters::default(), 16).unwrap();
        let out = process_clause(
            &arena,
            root,
            &blk.commands[0].stages,
            "R",
            "",
            "",
            "",
            "\t",
            "",
            OpType::Element,
            1,
            1,
            &HashMap::new(),
        )
        .unwrap();
        assert_eq!(out, "K\tM");
    }

    #[test]
    fn default_applies_when_empty() {
        let xml = "<R><K>1</K></R>";
        let mut args = vec!["-pattern".to_string(), "R".to_string()];
        args.extend(["-element", "Z"].iter().map(|s| s.to_string()));
        let blk = parse_arguments(&args, "R").unwrap();
        let (arena, root) = build_tree(xml, "", &TextFilters::default(), 16).unwrap();
        let out = process_clause(
            &arena,
            root,
            &blk.commands[0].stages,
            "R",
            "",
            "",
            "",
            "\t",
            "-",
            OpType::Element,
            1,
            1,
            &HashMap::new(),
        );
        assert_eq!(out.unwrap(), "-");
    }
}
