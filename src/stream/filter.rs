//! Streaming content editor
//!
//! -filter rewrites the stream inside a named pattern element: retaining,
//! removing, encoding, decoding, shrinking, expanding, or accent-folding a
//! chosen object class (attributes, content, CDATA, comments, the whole
//! object, or its container tags). Everything outside the pattern passes
//! through, one construct per line.

use std::io::{self, Read, Write};

use crate::core::{StreamEvent, StreamTokenizer};
use crate::text::{compress_runs_of_spaces, escape_xml, fold_accents, is_not_ascii, unescape_xml};

/// Edit applied to the selected target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterAction {
    Retain,
    Remove,
    Encode,
    Decode,
    Shrink,
    Expand,
    Accent,
}

impl FilterAction {
    /// Parse the action argument.
    pub fn parse(s: &str) -> Option<FilterAction> {
        let action = match s {
            "retain" => FilterAction::Retain,
            "remove" => FilterAction::Remove,
            "encode" => FilterAction::Encode,
            "decode" => FilterAction::Decode,
            "shrink" => FilterAction::Shrink,
            "expand" => FilterAction::Expand,
            "accent" => FilterAction::Accent,
            _ => return None,
        };
        Some(action)
    }
}

/// Object class the action applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterTarget {
    Attributes,
    Content,
    Cdata,
    Comment,
    Object,
    Container,
}

impl FilterTarget {
    /// Parse the target argument.
    pub fn parse(s: &str) -> Option<FilterTarget> {
        let target = match s {
            "attribute" | "attributes" => FilterTarget::Attributes,
            "content" | "contents" => FilterTarget::Content,
            "cdata" | "CDATA" => FilterTarget::Cdata,
            "comment" | "comments" => FilterTarget::Comment,
            "object" => FilterTarget::Object,
            "container" => FilterTarget::Container,
            _ => return None,
        };
        Some(target)
    }
}

/// Split for expand mode: '|' first, then ',', then whitespace.
fn expand_words(name: &str) -> Vec<&str> {
    if name.contains('|') {
        name.split('|').collect()
    } else if name.contains(',') {
        name.split(',').collect()
    } else {
        name.split_whitespace().collect()
    }
}

/// Apply the edit to one text payload; None removes it.
fn edit_text(name: &str, action: FilterAction) -> Option<String> {
    match action {
        FilterAction::Retain => Some(name.to_string()),
        FilterAction::Remove => None,
        FilterAction::Encode => Some(escape_xml(name)),
        FilterAction::Decode => Some(unescape_xml(name)),
        FilterAction::Shrink => Some(compress_runs_of_spaces(name)),
        FilterAction::Accent => {
            if is_not_ascii(name) {
                Some(fold_accents(name))
            } else {
                Some(name.to_string())
            }
        }
        FilterAction::Expand => Some(name.to_string()),
    }
}

/// Run the filter over the whole stream.
pub fn filter_stream<R: Read>(
    tk: &mut StreamTokenizer<R>,
    pattern: &str,
    action: FilterAction,
    target: FilterTarget,
    out: &mut dyn Write,
) -> io::Result<()> {
    let mut in_pattern = false;
    let mut prev_name = String::new();
    let mut buffer = String::new();

    loop {
        match tk.next_event() {
            StreamEvent::Start { name, attrs } => {
                prev_name = name.clone();
                if name == pattern {
                    in_pattern = true;
                    if target == FilterTarget::Container && action == FilterAction::Remove {
                        continue;
                    }
                }
                if in_pattern && target == FilterTarget::Object && action == FilterAction::Remove {
                    continue;
                }
                buffer.push('<');
                buffer.push_str(&name);
                if !attrs.is_empty()
                    && !(target == FilterTarget::Attributes && action == FilterAction::Remove)
                {
                    let attrs = compress_runs_of_spaces(attrs.trim());
                    buffer.push(' ');
                    buffer.push_str(&attrs);
                }
                buffer.push_str(">\n");
            }
            StreamEvent::SelfClose { name, attrs } => {
                if in_pattern && target == FilterTarget::Object && action == FilterAction::Remove {
                    continue;
                }
                buffer.push('<');
                buffer.push_str(&name);
                if !attrs.is_empty()
                    && !(target == FilterTarget::Attributes && action == FilterAction::Remove)
                {
                    let attrs = compress_runs_of_spaces(attrs.trim());
                    buffer.push(' ');
                    buffer.push_str(&attrs);
                }
                buffer.push_str("/>\n");
            }
            StreamEvent::Stop { name } => {
                if name == pattern {
                    in_pattern = false;
                    if action == FilterAction::Remove
                        && (target == FilterTarget::Object || target == FilterTarget::Container)
                    {
                        continue;
                    }
                }
                if in_pattern && target == FilterTarget::Object && action == FilterAction::Remove {
                    continue;
                }
                buffer.push_str("</");
                buffer.push_str(&name);
                buffer.push_str(">\n");
            }
            StreamEvent::Content(name) => {
                if in_pattern && target == FilterTarget::Object && action == FilterAction::Remove {
                    continue;
                }
                if in_pattern && target == FilterTarget::Content && action == FilterAction::Expand
                {
                    // rewrap each word in a copy of the enclosing element
                    let mut between = String::new();
                    for item in expand_words(&name) {
                        let mut item = item;
                        while item.len() > 1 {
                            match item.as_bytes()[item.len() - 1] {
                                b'.' | b',' | b':' | b';' => item = &item[..item.len() - 1],
                                _ => break,
                            }
                        }
                        let item = item.trim();
                        if !item.is_empty() {
                            buffer.push_str(&between);
                            buffer.push_str(item);
                            buffer.push('\n');
                            between = format!("</{prev_name}>\n<{prev_name}>\n");
                        }
                    }
                    continue;
                }
                let name = if in_pattern && target == FilterTarget::Content {
                    match edit_text(&name, action) {
                        Some(name) => name,
                        None => continue,
                    }
                } else {
                    name
                };
                buffer.push_str(name.trim());
                buffer.push('\n');
            }
            StreamEvent::CData(_) | StreamEvent::Comment(_)
                if in_pattern
                    && target == FilterTarget::Object
                    && action == FilterAction::Remove =>
            {
                continue;
            }
            StreamEvent::CData(name) => {
                // cdata requires an explicit retain or edit to survive
                if in_pattern && target == FilterTarget::Cdata {
                    if let Some(name) = edit_text(&name, action) {
                        buffer.push_str(name.trim());
                        buffer.push('\n');
                    }
                }
            }
            StreamEvent::Comment(name) => {
                if in_pattern && target == FilterTarget::Comment {
                    if let Some(name) = edit_text(&name, action) {
                        buffer.push_str(name.trim());
                        buffer.push('\n');
                    }
                }
            }
            StreamEvent::Doctype(_) => {}
            StreamEvent::Closed => break,
        }

        if buffer.len() > 65536 {
            out.write_all(buffer.as_bytes())?;
            buffer.clear();
        }
    }

    out.write_all(buffer.as_bytes())?;
    Ok(())
}
