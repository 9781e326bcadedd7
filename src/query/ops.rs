//! Operation vocabulary
//!
//! The closed set of command types recognized by the argument compiler,
//! flag-name lookup, exploration level precedence, the sequence-coordinate
//! conversion table, and the stop-word set used by PAIRS and INDICES. The
//! tables are read-only after first use and shared by all workers.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

/// Command type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpType {
    Element,
    First,
    Last,
    Encode,
    Upper,
    Lower,
    Title,
    Terms,
    Words,
    Pairs,
    Letters,
    Indices,
    Pfx,
    Sfx,
    Sep,
    Tab,
    Ret,
    Lbl,
    Clr,
    Pfc,
    Rst,
    Def,
    Position,
    If,
    Unless,
    Match,
    Avoid,
    And,
    Or,
    Equals,
    Contains,
    StartsWith,
    EndsWith,
    IsNot,
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
    Num,
    Len,
    Sum,
    Min,
    Max,
    Inc,
    Dec,
    Sub,
    Avg,
    Dev,
    ZeroBased,
    OneBased,
    UcscBased,
    Else,
    Variable,
    Value,
    Star,
    Dollar,
    AtSign,
    Count,
    Length,
    Depth,
    Index,
}

/// Broad argument classes used when segmenting a block's argument run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Exploration,
    Conditional,
    Extraction,
    Customization,
}

/// Exploration nesting levels, outermost last. Different names allow
/// multiple levels of nested loops in a linear command line; capitalized
/// variants are accepted for backward compatibility.
pub const EXPLORATION_LEVELS: [(&str, &str); 8] = [
    ("-unit", "-Unit"),
    ("-subset", "-Subset"),
    ("-section", "-Section"),
    ("-block", "-Block"),
    ("-branch", "-Branch"),
    ("-group", "-Group"),
    ("-division", "-Division"),
    ("-pattern", "-Pattern"),
];

static ARG_KINDS: Lazy<HashMap<&'static str, ArgKind>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for (lc, uc) in EXPLORATION_LEVELS {
        m.insert(lc, ArgKind::Exploration);
        m.insert(uc, ArgKind::Exploration);
    }
    for flag in [
        "-position",
        "-if",
        "-unless",
        "-match",
        "-avoid",
        "-and",
        "-or",
        "-equals",
        "-contains",
        "-starts-with",
        "-ends-with",
        "-is-not",
        "-gt",
        "-ge",
        "-lt",
        "-le",
        "-eq",
        "-ne",
    ] {
        m.insert(flag, ArgKind::Conditional);
    }
    for flag in [
        "-element",
        "-first",
        "-last",
        "-encode",
        "-upper",
        "-lower",
        "-title",
        "-terms",
        "-words",
        "-pairs",
        "-letters",
        "-indices",
        "-num",
        "-len",
        "-sum",
        "-min",
        "-max",
        "-inc",
        "-dec",
        "-sub",
        "-avg",
        "-dev",
        "-0-based",
        "-zero-based",
        "-1-based",
        "-one-based",
        "-ucsc",
        "-ucsc-based",
        "-ucsc-coords",
        "-bed-based",
        "-bed-coords",
        "-else",
    ] {
        m.insert(flag, ArgKind::Extraction);
    }
    for flag in [
        "-pfx", "-sfx", "-sep", "-tab", "-ret", "-lbl", "-clr", "-pfc", "-rst", "-def",
    ] {
        m.insert(flag, ArgKind::Customization);
    }
    m
});

static OP_TYPES: Lazy<HashMap<&'static str, OpType>> = Lazy::new(|| {
    let mut m = HashMap::new();
    let entries = [
        ("-element", OpType::Element),
        ("-first", OpType::First),
        ("-last", OpType::Last),
        ("-encode", OpType::Encode),
        ("-upper", OpType::Upper),
        ("-lower", OpType::Lower),
        ("-title", OpType::Title),
        ("-terms", OpType::Terms),
        ("-words", OpType::Words),
        ("-pairs", OpType::Pairs),
        ("-letters", OpType::Letters),
        ("-indices", OpType::Indices),
        ("-pfx", OpType::Pfx),
        ("-sfx", OpType::Sfx),
        ("-sep", OpType::Sep),
        ("-tab", OpType::Tab),
        ("-ret", OpType::Ret),
        ("-lbl", OpType::Lbl),
        ("-clr", OpType::Clr),
        ("-pfc", OpType::Pfc),
        ("-rst", OpType::Rst),
        ("-def", OpType::Def),
        ("-position", OpType::Position),
        ("-if", OpType::If),
        ("-unless", OpType::Unless),
        ("-match", OpType::Match),
        ("-avoid", OpType::Avoid),
        ("-and", OpType::And),
        ("-or", OpType::Or),
        ("-equals", OpType::Equals),
        ("-contains", OpType::Contains),
        ("-starts-with", OpType::StartsWith),
        ("-ends-with", OpType::EndsWith),
        ("-is-not", OpType::IsNot),
        ("-gt", OpType::Gt),
        ("-ge", OpType::Ge),
        ("-lt", OpType::Lt),
        ("-le", OpType::Le),
        ("-eq", OpType::Eq),
        ("-ne", OpType::Ne),
        ("-num", OpType::Num),
        ("-len", OpType::Len),
        ("-sum", OpType::Sum),
        ("-min", OpType::Min),
        ("-max", OpType::Max),
        ("-inc", OpType::Inc),
        ("-dec", OpType::Dec),
        ("-sub", OpType::Sub),
        ("-avg", OpType::Avg),
        ("-dev", OpType::Dev),
        ("-0-based", OpType::ZeroBased),
        ("-zero-based", OpType::ZeroBased),
        ("-1-based", OpType::OneBased),
        ("-one-based", OpType::OneBased),
        ("-ucsc", OpType::UcscBased),
        ("-ucsc-based", OpType::UcscBased),
        ("-ucsc-coords", OpType::UcscBased),
        ("-bed-based", OpType::UcscBased),
        ("-bed-coords", OpType::UcscBased),
        ("-else", OpType::Else),
    ];
    for (k, v) in entries {
        m.insert(k, v);
    }
    m
});

/// Classification of one raw argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedFlag {
    Op(OpType),
    /// -NAME with an all-caps/digits name stores a variable
    Variable,
    /// dash argument that matches nothing
    Unrecognized,
    /// not a dash argument
    NotFlag,
}

/// Argument class lookup; None for values and unknown flags.
pub fn arg_kind(flag: &str) -> Option<ArgKind> {
    ARG_KINDS.get(flag).copied()
}

/// Parse one command-line flag into an operation type.
pub fn parse_flag(flag: &str) -> ParsedFlag {
    if let Some(op) = OP_TYPES.get(flag) {
        return ParsedFlag::Op(*op);
    }
    if flag.len() > 1 && flag.starts_with('-') {
        if crate::text::is_all_caps_or_digits(&flag[1..]) {
            return ParsedFlag::Variable;
        }
        return ParsedFlag::Unrecognized;
    }
    ParsedFlag::NotFlag
}

/// Which end of an interval a coordinate selector names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqEnd {
    Start,
    Stop,
    Pos,
}

/// Native base and role of a registered sequence coordinate.
#[derive(Debug, Clone, Copy)]
pub struct SequenceKind {
    pub based: u8,
    pub which: SeqEnd,
}

/// Registered pattern:selector coordinates eligible for -0-based, -1-based,
/// and -ucsc-based conversion.
pub static SEQUENCE_KINDS: Lazy<HashMap<&'static str, SequenceKind>> = Lazy::new(|| {
    use SeqEnd::*;
    let mut m = HashMap::new();
    let entries = [
        ("INSDSeq:INSDInterval_from", 1, Start),
        ("INSDSeq:INSDInterval_to", 1, Stop),
        ("DocumentSummary:ChrStart", 0, Start),
        ("DocumentSummary:ChrStop", 0, Stop),
        ("DocumentSummary:Chr_start", 1, Start),
        ("DocumentSummary:Chr_end", 1, Stop),
        ("DocumentSummary:Chr_inner_start", 1, Start),
        ("DocumentSummary:Chr_inner_end", 1, Stop),
        ("DocumentSummary:Chr_outer_start", 1, Start),
        ("DocumentSummary:Chr_outer_end", 1, Stop),
        ("DocumentSummary:start", 1, Start),
        ("DocumentSummary:stop", 1, Stop),
        ("DocumentSummary:display_start", 1, Start),
        ("DocumentSummary:display_stop", 1, Stop),
        ("Entrezgene:Seq-interval_from", 0, Start),
        ("Entrezgene:Seq-interval_to", 0, Stop),
        ("GenomicInfoType:ChrStart", 0, Start),
        ("GenomicInfoType:ChrStop", 0, Stop),
        ("Rs:@aaPosition", 0, Pos),
        ("Rs:@asnFrom", 0, Start),
        ("Rs:@asnTo", 0, Stop),
        ("Rs:@end", 0, Stop),
        ("Rs:@leftContigNeighborPos", 0, Start),
        ("Rs:@physMapInt", 0, Pos),
        ("Rs:@protLoc", 0, Pos),
        ("Rs:@rightContigNeighborPos", 0, Stop),
        ("Rs:@start", 0, Start),
        ("Rs:@structLoc", 0, Pos),
    ];
    for (k, based, which) in entries {
        m.insert(k, SequenceKind { based, which });
    }
    m
});

/// English stop words, units, and single-character tokens that break PAIRS
/// bigram chains and are excluded from INDICES terms.
pub static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    let words = [
        "!", "\"", "#", "$", "%", "&", "'", "(", ")", "*", "+", ",", "-", ".", "/", ":", ";",
        "<", "=", ">", "?", "@", "[", "\\", "]", "^", "_", "`", "{", "|", "}", "~", "a", "about",
        "again", "all", "almost", "also", "although", "always", "among", "an", "and", "another",
        "any", "are", "as", "at", "be", "because", "been", "before", "being", "between", "both",
        "but", "by", "can", "could", "did", "do", "does", "done", "due", "during", "each",
        "either", "enough", "especially", "etc", "for", "found", "from", "further", "had", "has",
        "have", "having", "here", "how", "however", "i", "if", "in", "into", "is", "it", "its",
        "itself", "just", "kg", "km", "made", "mainly", "make", "may", "mg", "might", "ml", "mm",
        "most", "mostly", "must", "nearly", "neither", "no", "nor", "obtained", "of", "often",
        "on", "our", "overall", "perhaps", "pmid", "quite", "rather", "really", "regarding",
        "seem", "seen", "several", "should", "show", "showed", "shown", "shows", "significantly",
        "since", "so", "some", "such", "than", "that", "the", "their", "theirs", "them", "then",
        "there", "therefore", "these", "they", "this", "those", "through", "thus", "to", "upon",
        "use", "used", "using", "various", "very", "was", "we", "were", "what", "when", "which",
        "while", "with", "within", "without", "would",
    ];
    words.into_iter().collect()
});

/// Stop word test shared by PAIRS and INDICES.
#[inline]
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(word)
}

/// One parsed element address or literal comparator operand.
#[derive(Debug, Clone)]
pub struct Step {
    pub kind: OpType,
    pub value: String,
    pub parent: String,
    pub match_name: String,
    pub attrib: String,
    pub wild: bool,
}

impl Step {
    /// A literal step with no address components.
    pub fn literal(kind: OpType, value: &str) -> Step {
        Step {
            kind,
            value: value.to_string(),
            parent: String::new(),
            match_name: String::new(),
            attrib: String::new(),
            wild: false,
        }
    }
}

/// One command with its parsed steps.
#[derive(Debug, Clone)]
pub struct Operation {
    pub kind: OpType,
    pub value: String,
    pub stages: Vec<Step>,
}

/// Compiled exploration block: a visit path, optional position constraint,
/// condition list, command list, -else branch, and nested child blocks.
/// Immutable after compilation.
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub visit: String,
    pub parent: String,
    pub match_name: String,
    pub position: String,
    pub conditions: Vec<Operation>,
    pub commands: Vec<Operation>,
    pub failure: Vec<Operation>,
    pub subtasks: Vec<Block>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_lookup() {
        assert_eq!(parse_flag("-element"), ParsedFlag::Op(OpType::Element));
        assert_eq!(parse_flag("-ACC"), ParsedFlag::Variable);
        assert_eq!(parse_flag("-bogus"), ParsedFlag::Unrecognized);
        assert_eq!(parse_flag("PMID"), ParsedFlag::NotFlag);
    }

    #[test]
    fn arg_kind_lookup() {
        assert_eq!(arg_kind("-pattern"), Some(ArgKind::Exploration));
        assert_eq!(arg_kind("-if"), Some(ArgKind::Conditional));
        assert_eq!(arg_kind("-element"), Some(ArgKind::Extraction));
        assert_eq!(arg_kind("-sep"), Some(ArgKind::Customization));
        assert_eq!(arg_kind("value"), None);
    }

    #[test]
    fn coordinate_aliases_share_type() {
        assert_eq!(parse_flag("-0-based"), ParsedFlag::Op(OpType::ZeroBased));
        assert_eq!(parse_flag("-zero-based"), ParsedFlag::Op(OpType::ZeroBased));
        assert_eq!(parse_flag("-ucsc-coords"), ParsedFlag::Op(OpType::UcscBased));
        assert_eq!(parse_flag("-bed-based"), ParsedFlag::Op(OpType::UcscBased));
    }

    #[test]
    fn stop_words_include_units_and_punctuation() {
        assert!(is_stop_word("the"));
        assert!(is_stop_word("kg"));
        assert!(is_stop_word("pmid"));
        assert!(is_stop_word("("));
        assert!(!is_stop_word("resolvase"));
    }

    #[test]
    fn sequence_table_entries() {
        let k = SEQUENCE_KINDS.get("INSDSeq:INSDInterval_from").unwrap();
        assert_eq!(k.based, 1);
        assert_eq!(k.which, SeqEnd::Start);
        let k = SEQUENCE_KINDS.get("DocumentSummary:ChrStop").unwrap();
        assert_eq!(k.based, 0);
        assert_eq!(k.which, SeqEnd::Stop);
    }
}
