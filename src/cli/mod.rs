//! Command-line dispatch
//!
//! Parses the order-free global options, dispatches documentation verbs and
//! whole-stream commands, and wires the producer / worker / unshuffler
//! stages for the extraction, indexing, archiving, and retrieval modes.
//! All argument and I/O errors propagate to the binary entry, which prints
//! the diagnostic and exits with status 1.

pub mod docs;

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::archive::{archive_trie, compare_record, Comparison, Stasher};
use crate::core::StreamTokenizer;
use crate::dom::{scan_identifier, IndexTarget};
use crate::pipeline::{
    create_consumers, create_deleter, create_examiners, create_fetchers, create_posters,
    create_producer, create_stashers, create_term_list_reader, create_uid_reader,
    create_uniquer, create_unshuffler, Extract, PipelineOptions,
};
use crate::query::{execute_query, parse_arguments, QueryOptions};
use crate::reader::{partition_pattern, BlockReader, ReaderOptions};
use crate::sample;
use crate::stream::{
    copy_stream, filter_stream, format_stream, outline_stream, synopsis_stream, verify_stream,
    FilterAction, FilterTarget, FormatOptions, FormatStyle,
};
use crate::text::{
    compress_runs_of_spaces, convert_slash, remove_unicode_markup, split_left, TextFilters,
};

/// Global options read before the command verb.
#[derive(Debug, Default)]
struct GlobalOptions {
    num_procs: usize,
    server_ratio: usize,
    num_servers: usize,
    chan_depth: usize,
    heap_size: usize,
    farm_size: usize,
    file_name: String,
    index: String,
    stash: String,
    skip: String,
    posting: String,
    phrase: String,
    zipp: bool,
    hshv: bool,
    trei: bool,
    cmpr: bool,
    cmpr_type: String,
    ignr: String,
    msng: bool,
    mpty: bool,
    idnt: bool,
    do_compress: bool,
    do_cleanup: bool,
    filters: TextFilters,
}

fn get_numeric_arg(args: &mut Vec<String>, name: &str, zer: usize, min: usize, max: usize) -> Result<usize> {
    if args.len() < 2 {
        bail!("{name} is missing");
    }
    let value: i64 = args[1]
        .parse()
        .map_err(|_| anyhow::anyhow!("{name} ({}) is not an integer", args[1]))?;
    args.remove(1);

    if value < 1 {
        return Ok(zer);
    }
    Ok((value as usize).clamp(min, max))
}

fn get_string_arg(args: &mut Vec<String>, name: &str) -> Result<String> {
    if args.len() < 2 {
        bail!("{name} is missing");
    }
    Ok(args.remove(1))
}

/// Consume concurrency, cleanup, and archive flags in any order.
fn parse_global_options(args: &mut Vec<String>) -> Result<GlobalOptions> {
    let ncpu = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);

    let mut opts = GlobalOptions {
        server_ratio: 4,
        heap_size: 16,
        farm_size: 64,
        ..Default::default()
    };

    let mut max_procs = ncpu;
    let mut def_procs = 0usize;
    let mut flgs = String::new();

    while !args.is_empty() {
        match args[0].as_str() {
            // concurrency overrides can be sent by wrapper scripts
            "-maxcpu" => {
                max_procs = get_numeric_arg(args, "Maximum number of processors", 1, 1, ncpu)?;
            }
            "-defcpu" => {
                def_procs = get_numeric_arg(args, "Default number of processors", ncpu, 1, ncpu)?;
            }
            "-proc" => {
                opts.num_procs = get_numeric_arg(args, "Number of processors", ncpu, 1, ncpu)?;
            }
            "-cons" => {
                opts.server_ratio =
                    get_numeric_arg(args, "Parser to processor ratio", 4, 1, 32)?;
            }
            "-serv" => {
                opts.num_servers = get_numeric_arg(args, "Concurrent parser count", 0, ncpu, 128)?;
            }
            "-chan" => {
                opts.chan_depth =
                    get_numeric_arg(args, "Communication channel depth", 0, ncpu, 128)?;
            }
            "-heap" => {
                opts.heap_size = get_numeric_arg(args, "Unshuffler heap size", 8, 8, 64)?;
            }
            "-farm" => {
                opts.farm_size = get_numeric_arg(args, "Node buffer length", 4, 4, 2048)?;
            }
            "-gogc" => {
                // no collector to tune, accepted for wrapper compatibility
                let _ = get_numeric_arg(args, "Garbage collection percentage", 0, 100, 1000)?;
            }
            "-input" => opts.file_name = get_string_arg(args, "Input file name")?,
            "-index" => opts.index = get_string_arg(args, "Index element")?,
            "-archive" | "-stash" => opts.stash = get_string_arg(args, "Archive path")?,
            "-skip" => opts.skip = get_string_arg(args, "Skip file")?,
            "-posting" | "-postings" => opts.posting = get_string_arg(args, "Posting path")?,
            "-phrase" => opts.phrase = get_string_arg(args, "Selection phrase")?,
            "-gzip" => opts.zipp = true,
            "-hash" => opts.hshv = true,
            "-trie" | "-tries" => opts.trei = true,
            "-compress" => opts.do_compress = true,
            "-spaces" | "-cleanup" => opts.do_cleanup = true,
            "-strict" => opts.filters.strict = true,
            "-mixed" | "-relaxed" => opts.filters.mixed = true,
            "-accent" | "-plain" => opts.filters.accent = true,
            "-ascii" => opts.filters.ascii = true,
            "-flag" | "-flags" => flgs = get_string_arg(args, "Flags argument")?,
            "-prepare" => {
                opts.cmpr = true;
                if args.len() > 1 && !args[1].starts_with('-') {
                    opts.cmpr_type = args.remove(1);
                }
            }
            "-ignore" => opts.ignr = get_string_arg(args, "-ignore value")?,
            "-missing" => opts.msng = true,
            "-empty" => opts.mpty = true,
            "-ident" => opts.idnt = true,
            _ => break,
        }

        args.remove(0);
    }

    match flgs.as_str() {
        "strict" => opts.filters.strict = true,
        "mixed" => opts.filters.mixed = true,
        "none" | "default" | "" => {}
        other => bail!("Unrecognized -flag value '{other}'"),
    }

    // four to six workers measure best on typical record mixtures
    if opts.num_procs == 0 {
        opts.num_procs = if def_procs > 0 { def_procs } else { 4 };
    }
    opts.num_procs = opts.num_procs.min(ncpu).min(max_procs);

    if opts.num_servers == 0 {
        opts.num_servers = opts.num_procs * opts.server_ratio;
    }
    opts.num_servers = opts.num_servers.clamp(1, 128);

    if opts.chan_depth == 0 {
        opts.chan_depth = opts.num_servers;
    }

    Ok(opts)
}

/// Expand a leading ~/ to the home directory.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return Path::new(&home).join(rest);
        }
    }
    PathBuf::from(path)
}

/// Print one documentation blob; true when a verb was handled.
fn documentation(args: &[String], out: &mut dyn Write) -> Result<bool> {
    let verb = match args.first() {
        Some(v) => v.as_str(),
        None => return Ok(false),
    };

    match verb {
        "-version" => writeln!(out, "{}", docs::VERSION)?,
        "-help" => writeln!(out, "xsieve {}\n{}", docs::VERSION, docs::HELP)?,
        "-examples" | "-example" => writeln!(out, "xsieve {}\n{}", docs::VERSION, docs::EXAMPLES)?,
        "-extras" | "-extra" => writeln!(out, "xsieve {}\n{}", docs::VERSION, docs::EXTRAS)?,
        "-advanced" => writeln!(out, "xsieve {}\n{}", docs::VERSION, docs::ADVANCED)?,
        "-internal" | "-internals" => {
            writeln!(out, "xsieve {}\n{}", docs::VERSION, docs::INTERNAL)?
        }
        "-keys" => writeln!(out, "{}", docs::KEYS)?,
        "-unix" => writeln!(out, "{}", docs::UNIX)?,
        "-sample" | "-samples" => {
            let which = args.get(1).map(String::as_str).unwrap_or("");
            let blob = match which {
                "protein" | "sequence" | "insd" => sample::INSD_SEQ_SAMPLE,
                "gene" | "docsum" => sample::GENE_DOCSUM_SAMPLE,
                _ => sample::PUBMED_ARTICLE_SAMPLE,
            };
            writeln!(out, "{blob}")?;
        }
        _ => return Ok(false),
    }

    Ok(true)
}

/// Normalize a phrase or record for the -phrase substring test. Keeps
/// angle brackets, spaced out, for boundary-sensitive hits.
fn cleanup_phrase(str: &str, keep_plus: bool) -> String {
    let mut buffer = String::with_capacity(str.len());
    for ch in str.chars() {
        if ch.is_alphanumeric() {
            buffer.push(ch);
        } else if ch == '<' || ch == '>' || (ch == '+' && keep_plus) {
            buffer.push(' ');
            buffer.push(ch);
            buffer.push(' ');
        } else {
            buffer.push(' ');
        }
    }
    buffer
}

/// Run with the full argument vector; the binary maps errors to exit 1.
pub fn run(mut args: Vec<String>) -> Result<()> {
    if args.is_empty() {
        bail!("No command-line arguments supplied to xsieve");
    }

    let opts = parse_global_options(&mut args)?;

    // retrieval, trie, and posting modes run without a command verb
    let verbless = (!opts.stash.is_empty() && opts.index.is_empty())
        || opts.trei
        || !opts.posting.is_empty();
    if args.is_empty() && !verbless {
        bail!("Insufficient command-line arguments supplied to xsieve");
    }

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    // DOCUMENTATION COMMANDS

    if documentation(&args, &mut out)? {
        out.flush()?;
        return Ok(());
    }

    // INPUT SOURCE

    if args.len() > 1 {
        for str in &args[1..] {
            if str == "-input" {
                bail!("Misplaced -input command");
            }
        }
    }

    let stdin_piped = !std::io::stdin().is_terminal();

    let input: Box<dyn Read + Send> = if opts.file_name.is_empty() {
        if !stdin_piped {
            bail!("No XML input data supplied to xsieve");
        }
        Box::new(std::io::stdin())
    } else {
        if stdin_piped {
            bail!(
                "Input data from both stdin and file '{}'",
                opts.file_name
            );
        }
        let file = File::open(&opts.file_name)
            .with_context(|| format!("Unable to open input file '{}'", opts.file_name))?;
        Box::new(file)
    };

    let reader_options = ReaderOptions {
        compress_spaces: opts.do_compress,
        cleanup_spaces: opts.do_cleanup,
        html_aware: opts.filters.html_aware(),
    };

    let pipeline_options = PipelineOptions {
        chan_depth: opts.chan_depth,
        num_serve: opts.num_servers,
        heap_size: opts.heap_size,
    };

    // WHOLE-STREAM COMMANDS

    match args.first().map(String::as_str).unwrap_or("") {
        "-format" => {
            let format_options = parse_format_args(&args[1..])?;
            if format_options.style == FormatStyle::Copy {
                let mut rdr = BlockReader::new(input, reader_options);
                copy_stream(&mut rdr, &opts.filters, &mut out)?;
            } else {
                let rdr = BlockReader::new(input, reader_options);
                let mut tk = StreamTokenizer::new(rdr, opts.filters.html_aware());
                format_stream(&mut tk, &format_options, &opts.filters, &mut out)?;
            }
            out.flush()?;
            return Ok(());
        }
        "-outline" => {
            let rdr = BlockReader::new(input, reader_options);
            let mut tk = StreamTokenizer::new(rdr, opts.filters.html_aware());
            outline_stream(&mut tk, &mut out)?;
            out.flush()?;
            return Ok(());
        }
        "-synopsis" => {
            let rdr = BlockReader::new(input, reader_options);
            let mut tk = StreamTokenizer::new(rdr, opts.filters.html_aware());
            synopsis_stream(&mut tk, &mut out)?;
            out.flush()?;
            return Ok(());
        }
        "-verify" | "-validate" => {
            let pattern = args.get(1).cloned().unwrap_or_default();
            let rdr = BlockReader::new(input, reader_options);
            let mut tk = StreamTokenizer::new(rdr, opts.filters.html_aware());
            verify_stream(&mut tk, &pattern, &opts.filters, &mut out)?;
            out.flush()?;
            return Ok(());
        }
        "-filter" => {
            let rest = &args[1..];
            if rest.is_empty() {
                bail!("Insufficient command-line arguments supplied to xsieve -filter");
            }
            let pattern = rest[0].clone();
            if rest.len() < 3 {
                bail!("No object name supplied to xsieve -filter");
            }
            let action = FilterAction::parse(&rest[1])
                .ok_or_else(|| {
                    anyhow::anyhow!("Unrecognized action '{}' supplied to xsieve -filter", rest[1])
                })?;
            let target = FilterTarget::parse(&rest[2])
                .ok_or_else(|| {
                    anyhow::anyhow!("Unrecognized target '{}' supplied to xsieve -filter", rest[2])
                })?;
            let rdr = BlockReader::new(input, reader_options);
            let mut tk = StreamTokenizer::new(rdr, opts.filters.html_aware());
            filter_stream(&mut tk, &pattern, action, target, &mut out)?;
            out.flush()?;
            return Ok(());
        }
        _ => {}
    }

    // OUTPUT WRAPPERS

    let mut head = String::new();
    let mut tail = String::new();
    let mut hd = String::new();
    let mut tl = String::new();

    loop {
        let target = match args.first().map(String::as_str) {
            Some("-head") => &mut head,
            Some("-tail") => &mut tail,
            Some("-hd") => &mut hd,
            Some("-tl") => &mut tl,
            _ => break,
        };
        if args.len() < 2 {
            bail!("Pattern missing after {} command", args[0]);
        }
        *target = convert_slash(&args[1]);
        args.drain(..2);
        if args.is_empty() && opts.stash.is_empty() && !opts.trei && opts.posting.is_empty() {
            bail!("Insufficient command-line arguments supplied to xsieve");
        }
    }

    // IDENTIFIER TO TRIE PATH

    if opts.trei {
        let sfx = if opts.zipp { ".xml.gz" } else { ".xml" };
        for line in BufReader::new(input).lines() {
            let file = line?;
            let trie = match archive_trie(&file) {
                Some(t) => t,
                None => continue,
            };
            writeln!(out, "{trie}/{file}{sfx}")?;
        }
        out.flush()?;
        return Ok(());
    }

    // POSTINGS FILES

    if !opts.posting.is_empty() {
        let root = expand_home(&opts.posting);
        let trml = create_term_list_reader(BufReader::new(input), &pipeline_options);
        let pstr = create_posters(root, &pipeline_options, trml);
        for _ in pstr.iter() {}
        out.flush()?;
        return Ok(());
    }

    let stash_root = expand_home(&opts.stash);

    // MISSING RECORD CHECK

    if !opts.stash.is_empty() && opts.msng {
        let sfx = if opts.zipp { ".xml.gz" } else { ".xml" };
        for line in BufReader::new(input).lines() {
            let file = line?;
            let trie = match archive_trie(&file) {
                Some(t) => t,
                None => continue,
            };
            let mut fpath = stash_root.join(&trie).join(format!("{file}{sfx}"));
            if !fpath.exists() && !opts.zipp {
                fpath = stash_root.join(&trie).join(format!("{file}.xml.gz"));
            }
            if !fpath.exists() {
                writeln!(out, "{file}")?;
            }
        }
        out.flush()?;
        return Ok(());
    }

    // RECORD RETRIEVAL BY IDENTIFIER

    if !opts.stash.is_empty() && opts.index.is_empty() {
        let uidq = create_uid_reader(BufReader::new(input), &pipeline_options);
        let strq = create_fetchers(stash_root, opts.zipp, &pipeline_options, uidq);
        let unsq = create_unshuffler(&pipeline_options, strq);

        if !head.is_empty() {
            writeln!(out, "{head}")?;
        }
        for curr in unsq.iter() {
            if curr.text.is_empty() {
                continue;
            }
            if !hd.is_empty() {
                writeln!(out, "{hd}")?;
            }
            if opts.hshv {
                let mut hasher = crc32fast::Hasher::new();
                hasher.update(curr.text.as_bytes());
                writeln!(out, "{}\t{}", curr.ident, hasher.finalize())?;
            } else {
                out.write_all(curr.text.as_bytes())?;
                if !curr.text.ends_with('\n') {
                    out.write_all(b"\n")?;
                }
            }
            if !tl.is_empty() {
                writeln!(out, "{tl}")?;
            }
        }
        if !tail.is_empty() {
            writeln!(out, "{tail}")?;
        }
        out.flush()?;
        return Ok(());
    }

    // PATTERN ARGUMENT

    if args.is_empty() {
        bail!("Insufficient command-line arguments supplied to xsieve");
    }

    if args[0] == "-record" || args[0] == "-Record" {
        args[0] = "-pattern".to_string();
    }
    if args[0] != "-pattern" && args[0] != "-Pattern" {
        bail!("No -pattern in command-line arguments");
    }
    if args.len() < 2 || args[1].is_empty() {
        bail!("Item missing after -pattern command");
    }

    let top_pat = args[1].clone();
    if top_pat.starts_with('-') {
        bail!("Misplaced {top_pat} command");
    }

    // -pattern Parent/* construct for heterogeneous data
    let (top_pattern, star) = split_left(&top_pat, '/');
    let top_pattern = top_pattern.to_string();
    let star = match star {
        "" => false,
        "*" => true,
        _ => bail!("-pattern Parent/Child construct is not supported"),
    };
    let parent = if star { top_pattern.clone() } else { String::new() };

    let index_target = IndexTarget::parse(&opts.index);
    let html_aware = opts.filters.html_aware();

    // ARCHIVE COMPARISON

    if !opts.stash.is_empty() && !opts.index.is_empty() && opts.cmpr {
        let do_report = match opts.cmpr_type.as_str() {
            "" | "report" => true,
            "release" => false,
            _ => bail!("-prepare argument must be release or report"),
        };

        if !head.is_empty() {
            writeln!(out, "{head}")?;
        }

        let mut rdr = BlockReader::new(input, reader_options);
        let mut failure: Option<std::io::Error> = None;
        partition_pattern(&top_pattern, star, &mut rdr, &mut |_rec, _ofs, str| {
            if failure.is_some() {
                return;
            }
            let id = scan_identifier(str, &parent, &index_target, html_aware);
            if id.is_empty() {
                return;
            }
            let verdict = compare_record(str, &stash_root, &id, &opts.ignr);
            let result = (|| -> std::io::Result<()> {
                match (do_report, verdict) {
                    (true, Comparison::New) => writeln!(out, "NW {id}")?,
                    (true, Comparison::Updated) => writeln!(out, "UP {id}")?,
                    (true, Comparison::Unchanged) => writeln!(out, "NO {id}")?,
                    (false, Comparison::Unchanged) => {}
                    (false, _) => {
                        if !hd.is_empty() {
                            writeln!(out, "{hd}")?;
                        }
                        writeln!(out, "{str}")?;
                        if !tl.is_empty() {
                            writeln!(out, "{tl}")?;
                        }
                    }
                }
                Ok(())
            })();
            if let Err(err) = result {
                failure = Some(err);
            }
        });
        if let Some(err) = failure {
            return Err(err.into());
        }

        if !tail.is_empty() {
            writeln!(out, "{tail}")?;
        }
        out.flush()?;
        return Ok(());
    }

    // ARCHIVE POPULATION

    if !opts.stash.is_empty() && !opts.index.is_empty() {
        let rdr = BlockReader::new(input, reader_options);
        let xmlq = create_producer(&top_pattern, star, rdr, &pipeline_options);
        let idnq = create_examiners(
            Arc::new(index_target),
            html_aware,
            &parent,
            &pipeline_options,
            xmlq,
        );
        let unsq = create_unshuffler(&pipeline_options, idnq);
        let unqq = create_uniquer(&pipeline_options, unsq);
        let delq = if opts.skip.is_empty() {
            unqq
        } else {
            let skip_file = File::open(&opts.skip).context("Unable to read skip file")?;
            let mut should_skip: HashSet<String> = HashSet::new();
            for line in BufReader::new(skip_file).lines() {
                should_skip.insert(line?);
            }
            create_deleter(should_skip, &pipeline_options, unqq)
        };
        let stasher = Arc::new(Stasher::new(&stash_root, opts.zipp, opts.hshv));
        let stsq = create_stashers(stasher, opts.hshv, &pipeline_options, delq);

        for str in stsq.iter() {
            if opts.hshv {
                out.write_all(str.as_bytes())?;
            }
        }
        out.flush()?;
        return Ok(());
    }

    // RECORD INDEX REPORT

    if !opts.index.is_empty() {
        // optional file label after the pattern argument
        let mut lbl = String::new();
        if args.len() > 3 && args[2] == "-lbl" {
            lbl = args[3].trim().to_string();
            if let Some(rest) = lbl.strip_prefix("medline") {
                lbl = rest.to_string();
            }
            if let Some(rest) = lbl.strip_suffix(".xml.gz") {
                lbl = rest.to_string();
            }
            lbl = lbl.trim().to_string();
        }

        let mut rdr = BlockReader::new(input, reader_options);
        let mut failure: Option<std::io::Error> = None;
        partition_pattern(&top_pattern, star, &mut rdr, &mut |rec, ofs, str| {
            if failure.is_some() {
                return;
            }
            let id = scan_identifier(str, &parent, &index_target, html_aware);
            if id.is_empty() {
                return;
            }
            let result = if lbl.is_empty() {
                writeln!(out, "{id}\t{rec}\t{ofs}\t{}", str.len())
            } else {
                writeln!(out, "{id}\t{rec}\t{ofs}\t{}\t{lbl}", str.len())
            };
            if let Err(err) = result {
                failure = Some(err);
            }
        });
        if let Some(err) = failure {
            return Err(err.into());
        }
        out.flush()?;
        return Ok(());
    }

    // PHRASE FILTER

    if !opts.phrase.is_empty() && args.len() == 2 {
        let mut phrs = cleanup_phrase(&opts.phrase, true);
        phrs = compress_runs_of_spaces(phrs.trim());
        phrs = remove_unicode_markup(&phrs);
        phrs = phrs.to_uppercase();

        // plus-separated clauses are all required
        let clauses: Vec<String> = phrs.split(" + ").map(str::to_string).collect();

        if !head.is_empty() {
            writeln!(out, "{head}")?;
        }

        let mut rdr = BlockReader::new(input, reader_options);
        let mut failure: Option<std::io::Error> = None;
        partition_pattern(&top_pattern, star, &mut rdr, &mut |_rec, _ofs, str| {
            if failure.is_some() {
                return;
            }
            let mut srch = cleanup_phrase(str, false);
            srch = srch.to_uppercase();
            srch = compress_runs_of_spaces(&srch);
            srch = remove_unicode_markup(&srch);
            srch = srch.to_uppercase();

            if clauses.iter().any(|item| !srch.contains(item.as_str())) {
                return;
            }

            let result = (|| -> std::io::Result<()> {
                if !hd.is_empty() {
                    writeln!(out, "{hd}")?;
                }
                out.write_all(str.as_bytes())?;
                if !str.ends_with('\n') {
                    out.write_all(b"\n")?;
                }
                if !tl.is_empty() {
                    writeln!(out, "{tl}")?;
                }
                Ok(())
            })();
            if let Err(err) = result {
                failure = Some(err);
            }
        });
        if let Some(err) = failure {
            return Err(err.into());
        }

        if !tail.is_empty() {
            writeln!(out, "{tail}")?;
        }
        out.flush()?;
        return Ok(());
    }

    // COMPILE EXTRACTION ARGUMENTS

    let cmds = parse_arguments(&args, &top_pattern)?;

    let query_options = Arc::new(QueryOptions {
        filters: opts.filters,
        farm_size: opts.farm_size,
        hd: hd.clone(),
        tl: tl.clone(),
    });

    // SINGLE RECORD SELECTED BY -position DIRECTLY UNDER -pattern

    if cmds.visit == top_pat && !cmds.position.is_empty() {
        let mut rdr = BlockReader::new(input, reader_options);
        let mut qry = String::new();
        let mut idx = 0usize;

        match cmds.position.as_str() {
            "first" => {
                partition_pattern(&top_pattern, star, &mut rdr, &mut |rec, _ofs, str| {
                    if rec == 1 {
                        qry = str.to_string();
                        idx = rec;
                    }
                });
            }
            "last" => {
                partition_pattern(&top_pattern, star, &mut rdr, &mut |rec, _ofs, str| {
                    qry = str.to_string();
                    idx = rec;
                });
            }
            other => {
                let number: usize = other
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Unrecognized position '{other}'"))?;
                partition_pattern(&top_pattern, star, &mut rdr, &mut |rec, _ofs, str| {
                    if rec == number {
                        qry = str.to_string();
                        idx = rec;
                    }
                });
            }
        }

        if qry.is_empty() {
            out.flush()?;
            return Ok(());
        }

        // clear the position so the condition test does not run again
        let mut single = cmds.clone();
        single.position = String::new();

        let res = execute_query(&qry, &parent, idx, &single, &query_options);
        if !res.is_empty() {
            writeln!(out, "{res}")?;
        }
        out.flush()?;
        return Ok(());
    }

    // FULL EXTRACTION PIPELINE

    let rdr = BlockReader::new(input, reader_options);
    let xmlq = create_producer(&top_pattern, star, rdr, &pipeline_options);
    let tblq = create_consumers(
        Arc::new(cmds),
        Arc::clone(&query_options),
        &parent,
        &pipeline_options,
        xmlq,
    );
    let unsq = create_unshuffler(&pipeline_options, tblq);

    let mut buffer = String::new();
    let mut okay = false;

    if !head.is_empty() {
        buffer.push_str(&head);
        buffer.push('\n');
    }

    for curr in unsq.iter() {
        print_result(&curr, &opts, &mut buffer, &mut okay);
        if buffer.len() > 65536 {
            out.write_all(buffer.as_bytes())?;
            buffer.clear();
            // head already printed, suppress the no-output check
            okay = true;
        }
    }

    if !tail.is_empty() {
        buffer.push_str(&tail);
        buffer.push('\n');
    }

    // head and tail are not printed when there was no extraction output
    if okay {
        out.write_all(buffer.as_bytes())?;
    }

    out.flush()?;
    Ok(())
}

/// Append one record's output, honoring the -empty and -ident flags.
fn print_result(curr: &Extract, opts: &GlobalOptions, buffer: &mut String, okay: &mut bool) {
    if opts.mpty {
        if curr.text.is_empty() {
            *okay = true;
            buffer.push_str(&curr.index.to_string());
            buffer.push('\n');
        }
    } else if !curr.text.is_empty() {
        *okay = true;
        if opts.idnt {
            buffer.push_str(&curr.index.to_string());
            buffer.push('\t');
        }
        buffer.push_str(&curr.text);
    }
}

/// Parse the arguments after -format: an optional style keyword followed by
/// optional -xml and -doctype overrides.
fn parse_format_args(rest: &[String]) -> Result<FormatOptions> {
    let mut options = FormatOptions::default();
    let mut rest = rest;

    if let Some(first) = rest.first() {
        let mut in_switch = true;
        match first.as_str() {
            "compact" | "compacted" | "compress" | "compressed" | "terse" | "*" => {
                options.style = FormatStyle::Compact;
            }
            "flush" | "flushed" | "left" => options.style = FormatStyle::Flush,
            "expand" | "expanded" | "verbose" | "@" => options.style = FormatStyle::Expand,
            "indent" | "indented" | "normal" => options.style = FormatStyle::Indent,
            "copy" => options.style = FormatStyle::Copy,
            _ => in_switch = false,
        }
        if in_switch {
            rest = &rest[1..];
        }
    }

    while let Some(first) = rest.first() {
        match first.as_str() {
            "-xml" => {
                if rest.len() < 2 || rest[1].starts_with('-') {
                    bail!("-xml argument is missing");
                }
                options.xml = Some(rest[1].clone());
                rest = &rest[2..];
            }
            "-doctype" => {
                options.custom_doctype = true;
                rest = &rest[1..];
                if let Some(value) = rest.first() {
                    if !value.starts_with('-') {
                        options.doctype = Some(value.clone());
                        rest = &rest[1..];
                    }
                }
            }
            _ => bail!("Unrecognized option after -format command"),
        }
    }

    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_options_consume_leading_flags() {
        let mut args: Vec<String> = [
            "-proc", "2", "-heap", "32", "-gzip", "-pattern", "Rec", "-element", "Id",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let opts = parse_global_options(&mut args).unwrap();
        assert!(opts.zipp);
        assert_eq!(opts.heap_size, 32);
        assert_eq!(args[0], "-pattern");
    }

    #[test]
    fn numeric_arg_clamps() {
        let mut args: Vec<String> = ["-heap", "500", "-pattern"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let opts = parse_global_options(&mut args).unwrap();
        assert_eq!(opts.heap_size, 64);

        let mut args: Vec<String> = ["-heap", "0", "-pattern"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let opts = parse_global_options(&mut args).unwrap();
        assert_eq!(opts.heap_size, 8);
    }

    #[test]
    fn rejects_non_integer_numeric() {
        let mut args: Vec<String> = ["-proc", "many"].iter().map(|s| s.to_string()).collect();
        let err = parse_global_options(&mut args).unwrap_err().to_string();
        assert!(err.contains("is not an integer"));
    }

    #[test]
    fn flag_argument_sets_mode() {
        let mut args: Vec<String> = ["-flag", "mixed", "-pattern"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let opts = parse_global_options(&mut args).unwrap();
        assert!(opts.filters.mixed);

        let mut args: Vec<String> = ["-flag", "bogus"].iter().map(|s| s.to_string()).collect();
        assert!(parse_global_options(&mut args).is_err());
    }

    #[test]
    fn format_args_parse_style_and_overrides() {
        let rest: Vec<String> = ["compact"].iter().map(|s| s.to_string()).collect();
        let options = parse_format_args(&rest).unwrap();
        assert_eq!(options.style, FormatStyle::Compact);

        let rest: Vec<String> = ["-doctype", "PubmedArticleSet"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let options = parse_format_args(&rest).unwrap();
        assert!(options.custom_doctype);
        assert_eq!(options.doctype.as_deref(), Some("PubmedArticleSet"));

        let rest: Vec<String> = ["bogus"].iter().map(|s| s.to_string()).collect();
        assert!(parse_format_args(&rest).is_err());
    }

    #[test]
    fn phrase_cleanup_keeps_brackets() {
        let cleaned = cleanup_phrase("<Title>TNF-alpha</Title>", false);
        assert!(cleaned.contains(" < "));
        assert!(cleaned.contains(" > "));
        assert!(cleaned.contains("TNF alpha"));
    }
}
