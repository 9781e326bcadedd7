//! Streaming reformat
//!
//! Rewrites XML for readability without building record trees. Styles:
//! copy (block passthrough with cleanup), compact (one record per line),
//! flush (no indentation), indent (default), expand (each attribute on its
//! own line). A fresh <?xml?> line and DOCTYPE are emitted, inner copies of
//! the wrapper tag from concatenated sets are removed, and empty start/end
//! pairs collapse to self-closing or disappear.

use std::io::{self, Read, Write};

use crate::core::{StreamEvent, StreamTokenizer};
use crate::reader::BlockReader;
use crate::text::{
    compress_runs_of_spaces, fold_accents, has_angle_bracket, has_markup_runes, is_not_ascii,
    is_not_just_whitespace, remove_unicode_markup, repair_inline_tags, simulate_unicode_markup,
    strip_inline_tags, trim_flanking_inline_tags, unicode_to_ascii, TextFilters,
};

/// Output arrangement for the -format verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatStyle {
    /// fast block copy with cleanup only
    Copy,
    /// one record per line
    Compact,
    /// no indentation
    Flush,
    #[default]
    Indent,
    /// each attribute on its own line
    Expand,
}

/// Parsed -format arguments.
#[derive(Debug, Clone, Default)]
pub struct FormatOptions {
    pub style: FormatStyle,
    /// replacement body for the <?xml?> line
    pub xml: Option<String>,
    /// replacement body for the DOCTYPE line; None with custom_doctype set
    /// takes the doctype from the input
    pub doctype: Option<String>,
    pub custom_doctype: bool,
}

/// Content cleanup shared by copy mode and content events.
fn filter_text(str: &str, filters: &TextFilters) -> String {
    let mut str = str.to_string();
    if filters.strict {
        if has_markup_runes(&str) {
            str = remove_unicode_markup(&str);
        }
        if has_angle_bracket(&str) {
            str = strip_inline_tags(&str);
        }
    }
    if filters.mixed {
        if has_markup_runes(&str) {
            str = simulate_unicode_markup(&str);
        }
        if has_angle_bracket(&str) {
            str = repair_inline_tags(&str);
        }
        str = trim_flanking_inline_tags(&str).to_string();
    }
    if filters.accent && is_not_ascii(&str) {
        str = fold_accents(&str);
    }
    if filters.ascii && is_not_ascii(&str) {
        str = unicode_to_ascii(&str);
    }
    str
}

/// Fast block copy, applying cleanup flags only.
pub fn copy_stream<R: Read>(
    rdr: &mut BlockReader<R>,
    filters: &TextFilters,
    out: &mut dyn Write,
) -> io::Result<()> {
    loop {
        let str = rdr.next_block();
        if str.is_empty() {
            break;
        }
        out.write_all(filter_text(&str, filters).as_bytes())?;
    }
    out.write_all(b"\n")?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    NotSet,
    Start,
    Stop,
    Char,
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

/// Reformat the stream per the selected style.
pub fn format_stream<R: Read>(
    tk: &mut StreamTokenizer<R>,
    options: &FormatOptions,
    filters: &TextFilters,
    out: &mut dyn Write,
) -> io::Result<()> {
    let comp_recrd = options.style == FormatStyle::Compact;
    let flush_left = options.style == FormatStyle::Flush;
    let wrap_attrs = options.style == FormatStyle::Expand;
    let ret = if comp_recrd { "" } else { "\n" };

    let mut buffer = String::new();
    let mut indent = 0usize;
    // first start tag, placed in the doctype line unless overridden
    let mut parent = String::new();
    let mut status = Status::NotSet;
    let mut frst = true;
    let mut doctype = options.doctype.clone().unwrap_or_default();

    // delay the right bracket of a start tag to allow self-closing form
    let mut needs_right_bracket = String::new();
    // delay printing a start tag with no attributes, suppressing the pair
    // entirely if the end tag follows immediately
    let mut just_start_name = String::new();
    let mut just_start_indent = 0usize;

    let mut closing_tag = String::new();

    fn do_indent(buffer: &mut String, mut indt: usize, comp: bool, flush: bool) {
        if comp || flush {
            return;
        }
        while indt > 9 {
            buffer.push_str("                    ");
            indt -= 10;
        }
        buffer.push_str(INDENT_SPACES[indt]);
    }

    macro_rules! delayed_name {
        () => {
            if !needs_right_bracket.is_empty() {
                buffer.push('>');
                needs_right_bracket.clear();
            }
            if !just_start_name.is_empty() {
                do_indent(&mut buffer, just_start_indent, comp_recrd, flush_left);
                buffer.push('<');
                buffer.push_str(&just_start_name);
                buffer.push('>');
                just_start_name.clear();
            }
        };
    }

    let print_attributes =
        |buffer: &mut String, attr: &str, indent: usize, filters: &TextFilters| {
            let mut attr = compress_runs_of_spaces(attr.trim());
            if filters.accent && is_not_ascii(&attr) {
                attr = fold_accents(&attr);
            }
            if filters.ascii && is_not_ascii(&attr) {
                attr = unicode_to_ascii(&attr);
            }

            if wrap_attrs {
                let bytes = attr.as_bytes();
                let attlen = bytes.len();
                let mut start = 0;
                let mut idx = 0;
                while idx < attlen {
                    match bytes[idx] {
                        b'=' => {
                            buffer.push('\n');
                            do_indent(buffer, indent, comp_recrd, flush_left);
                            buffer.push(' ');
                            buffer.push_str(&attr[start..idx]);
                            idx += 2;
                            start = idx;
                        }
                        b'"' => {
                            buffer.push_str("=\"");
                            buffer.push_str(&attr[start..idx]);
                            buffer.push('"');
                            idx += 2;
                            start = idx;
                        }
                        _ => idx += 1,
                    }
                }
                buffer.push('\n');
                do_indent(buffer, indent, comp_recrd, flush_left);
            } else {
                buffer.push(' ');
                buffer.push_str(&attr);
            }
        };

    loop {
        let event = tk.next_event();

        match event {
            StreamEvent::Start { name, attrs } => {
                delayed_name!();
                if status == Status::Start {
                    buffer.push_str(ret);
                }
                // remove inner copies of </parent><parent> wrapper tags
                if !parent.is_empty() && name == parent && indent == 1 {
                    continue;
                }

                // first start tag prints the xml and doctype lines
                if indent == 0 && parent.is_empty() {
                    parent = name.clone();

                    match &options.xml {
                        Some(xml) => {
                            let mut xml = xml.trim();
                            xml = xml.strip_prefix('<').unwrap_or(xml);
                            xml = xml.strip_prefix('?').unwrap_or(xml);
                            xml = xml.strip_prefix("xml").unwrap_or(xml);
                            xml = xml.strip_suffix("?>").unwrap_or(xml);
                            let xml = xml.trim();
                            buffer.push_str("<?xml ");
                            buffer.push_str(xml);
                            buffer.push_str("?>");
                        }
                        None => buffer.push_str("<?xml version=\"1.0\"?>"),
                    }
                    buffer.push('\n');

                    if !doctype.is_empty() {
                        let mut dt = doctype.trim();
                        dt = dt.strip_prefix('<').unwrap_or(dt);
                        dt = dt.strip_prefix('!').unwrap_or(dt);
                        dt = dt.strip_prefix("DOCTYPE").unwrap_or(dt);
                        dt = dt.strip_suffix('>').unwrap_or(dt);
                        let dt = dt.trim();
                        buffer.push_str("<!DOCTYPE ");
                        buffer.push_str(dt);
                        buffer.push('>');
                    } else {
                        buffer.push_str("<!DOCTYPE ");
                        buffer.push_str(&parent);
                        buffer.push('>');
                    }
                    buffer.push('\n');

                    // closing tag is queued since inner wrapper copies are
                    // filtered from here on
                    closing_tag = format!("</{parent}>\n");
                }

                if !attrs.is_empty() {
                    do_indent(&mut buffer, indent, comp_recrd, flush_left);
                    buffer.push('<');
                    buffer.push_str(&name);
                    print_attributes(&mut buffer, &attrs, indent, filters);
                    needs_right_bracket = name;
                } else {
                    just_start_name = name;
                    just_start_indent = indent;
                }

                if comp_recrd && frst && indent == 0 {
                    frst = false;
                    delayed_name!();
                    buffer.push('\n');
                }

                indent += 1;
                status = Status::Start;
            }
            StreamEvent::SelfClose { name, attrs } => {
                delayed_name!();
                if status == Status::Start {
                    buffer.push_str(ret);
                }

                // suppress a self-closing tag without attributes
                if !attrs.is_empty() {
                    do_indent(&mut buffer, indent, comp_recrd, flush_left);
                    buffer.push('<');
                    buffer.push_str(&name);
                    print_attributes(&mut buffer, &attrs, indent, filters);
                    buffer.push_str("/>");
                    buffer.push_str(ret);
                }

                status = Status::Stop;
            }
            StreamEvent::Stop { name } => {
                if !needs_right_bracket.is_empty() {
                    if status == Status::Start && name == needs_right_bracket {
                        // end immediately follows start with attributes
                        buffer.push_str("/>");
                        buffer.push_str(ret);
                        needs_right_bracket.clear();
                        indent = indent.saturating_sub(1);
                        status = Status::Stop;
                        continue;
                    }
                    buffer.push('>');
                    needs_right_bracket.clear();
                }
                if !just_start_name.is_empty() {
                    if status == Status::Start && name == just_start_name {
                        // empty start-end pair with no attributes, suppress
                        just_start_name.clear();
                        indent = indent.saturating_sub(1);
                        status = Status::Stop;
                        continue;
                    }
                    do_indent(&mut buffer, just_start_indent, comp_recrd, flush_left);
                    buffer.push('<');
                    buffer.push_str(&just_start_name);
                    buffer.push('>');
                    just_start_name.clear();
                }

                if !parent.is_empty() && name == parent && indent == 1 {
                    continue;
                }
                indent = indent.saturating_sub(1);
                if status != Status::Char && status != Status::Start {
                    do_indent(&mut buffer, indent, comp_recrd, flush_left);
                }
                buffer.push_str("</");
                buffer.push_str(&name);
                buffer.push('>');
                buffer.push_str(ret);
                status = Status::Stop;
                if comp_recrd && indent == 1 {
                    buffer.push('\n');
                }
            }
            StreamEvent::Content(name) => {
                delayed_name!();
                if !name.is_empty() && is_not_just_whitespace(&name) {
                    let text = filter_text(&name, filters);
                    buffer.push_str(text.trim());
                    status = Status::Char;
                }
            }
            StreamEvent::CData(_) | StreamEvent::Comment(_) => {}
            StreamEvent::Doctype(name) => {
                if options.custom_doctype && doctype.is_empty() {
                    doctype = name;
                }
            }
            StreamEvent::Closed => {
                delayed_name!();
                if !closing_tag.is_empty() {
                    buffer.push_str(&closing_tag);
                }
                break;
            }
        }

        if buffer.len() > 65536 {
            out.write_all(buffer.as_bytes())?;
            buffer.clear();
        }
    }

    out.write_all(buffer.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{BlockReader, ReaderOptions};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn reformat(xml: &str, style: FormatStyle) -> String {
        let rdr = BlockReader::new(
            Cursor::new(xml.as_bytes().to_vec()),
            ReaderOptions::default(),
        );
        let mut tk = StreamTokenizer::new(rdr, false);
        let options = FormatOptions {
            style,
            ..Default::default()
        };
        let mut out = Vec::new();
        format_stream(&mut tk, &options, &TextFilters::default(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn indent_style_nests() {
        let out = reformat("<A><B>text</B></A>", FormatStyle::Indent);
        assert_eq!(
            out,
            "<?xml version=\"1.0\"?>\n<!DOCTYPE A>\n<A>\n  <B>text</B>\n</A>\n"
        );
    }

    #[test]
    fn flush_style_left_aligns() {
        let out = reformat("<A><B>text</B></A>", FormatStyle::Flush);
        assert_eq!(
            out,
            "<?xml version=\"1.0\"?>\n<!DOCTYPE A>\n<A>\n<B>text</B>\n</A>\n"
        );
    }

    #[test]
    fn empty_pair_collapses() {
        let out = reformat("<A><B></B><C>x</C></A>", FormatStyle::Indent);
        assert!(!out.contains("<B>"));
        assert!(out.contains("<C>x</C>"));
    }

    #[test]
    fn attributed_empty_pair_becomes_self_closing() {
        let out = reformat("<A><B v=\"1\"></B></A>", FormatStyle::Indent);
        assert!(out.contains("<B v=\"1\"/>"));
    }

    #[test]
    fn inner_wrapper_copies_removed() {
        let out = reformat("<Set><R>1</R></Set><Set><R>2</R></Set>", FormatStyle::Indent);
        assert_eq!(out.matches("<Set>").count(), 1);
        assert_eq!(out.matches("</Set>").count(), 1);
        assert!(out.contains("<R>1</R>"));
        assert!(out.contains("<R>2</R>"));
    }

    #[test]
    fn custom_xml_line() {
        let rdr = BlockReader::new(
            Cursor::new(b"<A><B>x</B></A>".to_vec()),
            ReaderOptions::default(),
        );
        let mut tk = StreamTokenizer::new(rdr, false);
        let options = FormatOptions {
            xml: Some("<?xml version=\"1.0\" encoding=\"UTF-8\"?>".to_string()),
            ..Default::default()
        };
        let mut out = Vec::new();
        format_stream(&mut tk, &options, &TextFilters::default(), &mut out).unwrap();
        let txt = String::from_utf8(out).unwrap();
        assert!(txt.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
    }

    #[test]
    fn copy_mode_passes_through() {
        let mut rdr = BlockReader::new(
            Cursor::new(b"<A><B>x</B></A>".to_vec()),
            ReaderOptions::default(),
        );
        let mut out = Vec::new();
        copy_stream(&mut rdr, &TextFilters::default(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "<A><B>x</B></A>\n");
    }
}
