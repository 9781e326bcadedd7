//! Documentation verbs
//!
//! Fixed text blobs printed by -help and its companions. Each verb prints
//! its blob and exits successfully.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP: &str = r##"
Overview

  xsieve partitions an XML stream into records, converts each record into a
  navigable tree, and runs a declarative extraction language over every
  record in parallel, restoring input order on output.

Data Source

  -input        Read XML from file instead of stdin

Exploration Argument Hierarchy

  -pattern      Name of record element to partition on (required, once)
  -division     Outer grouping inside a pattern
  -group        Grouping construct
  -branch       Grouping construct
  -block        Grouping construct
  -section      Grouping construct
  -subset       Grouping construct
  -unit         Innermost grouping construct

  Each level visits elements named by its Parent/Match argument. A "*"
  match visits heterogeneous children, "**/Name" explores recursively, and
  a leading colon on any component matches any namespace prefix.

Conditional Execution

  -if           Element or &VARIABLE must be present, or pass the test
  -unless       Inverse of -if
  -and          Additional required condition
  -or           Alternative condition
  -position     Select first, last, or numbered instance of current block

  String constraints: -equals, -contains, -starts-with, -ends-with, -is-not
  Numeric constraints: -gt, -ge, -lt, -le, -eq, -ne
  Object counts: "#Element", string lengths "%Element", depths "^Element"

Format Customization

  -ret          Override line separator (default newline)
  -tab          Override column separator (default tab)
  -sep          Separator between elements of a comma group
  -pfx          Prefix before next element value
  -sfx          Suffix after next element value
  -lbl          Insert literal text
  -clr          Clear pending tab separator
  -pfc          Preface: clear pending tab and set prefix in one command
  -rst          Reset prefix, suffix, separator, and default
  -def          Default placeholder printed when a clause yields no value

Element Selection

  -element      Contents of every matching element
  -first        Contents of the first match
  -last         Contents of the last match
  -encode       XML-encoded contents
  -upper        Upper-case contents
  -lower        Lower-case contents
  -title        Title-case contents
  -terms        Whitespace-separated terms, trailing punctuation trimmed
  -words        Lower-case alphanumeric words
  -pairs        Adjacent word bigrams, stop words break the chain
  -letters      Individual characters
  -indices      Sorted unique <NORM> and <PAIR> index lines

  Numeric: -num, -len, -sum, -min, -max, -inc, -dec, -sub, -avg, -dev
  Coordinates: -0-based, -1-based, -ucsc-based on registered selectors

  Special selectors inside -element:
    "*"         Print the current subtree (more stars increase indent)
    "+"         Index of the current object
    "$"         Names of child elements
    "@"         Names of attributes
    "&NAME"     Value of a stored variable
    "Parent/Child@attribute" addresses an element or attribute

Variables

  -NAME         Store the next clause result under NAME (all caps)

Record Archive

  -archive      Root of the trie-addressed record store
  -index        Parent/Element@attribute identifier address
  -gzip         Compress stored records
  -hash         Print identifier and CRC32 lines
  -skip         File of identifiers to exclude while archiving
  -prepare      report | release comparison against the archive
  -ignore       Subtree excluded from -prepare comparison
  -missing      Print identifiers with no stored record
  -trie         Print the directory path for each identifier

Whole-Stream Commands

  -format       copy | compact | flush | indent | expand
  -outline      Nesting outline of the input
  -synopsis     Unique element paths
  -verify       Well-formedness report (optionally with a pattern)
  -filter       Streaming content edit (see -extras)
  -phrase       Keep records containing all "+"-separated phrases

Output Wrappers

  -head         Text before all results
  -tail         Text after all results
  -hd           Text before each record's results
  -tl           Text after each record's results

Documentation

  -help         This overview
  -examples     Sample commands
  -extras       Filter actions and maintenance commands
  -advanced     Performance and cleanup options
  -internal     Implementation notes
  -sample       Print an embedded sample record
"##;

pub const EXAMPLES: &str = r##"
Basic Extraction

  xsieve -pattern PubmedArticle -element MedlineCitation/PMID \
    -block Author -sep " " -element Initials,LastName

Conditional Execution

  xsieve -pattern INSDSeq -if "#INSDFeature" -ge 3 \
    -element INSDSeq_accession-version

Saving Data in Variables

  xsieve -pattern PubmedArticle -ACC MedlineCitation/PMID \
    -block Author -pfc "\n" -element "&ACC" Initials,LastName

Sequence Coordinates

  xsieve -pattern INSDSeq -group INSDFeature \
    -if INSDFeature_key -equals mat_peptide \
    -block INSDInterval -ucsc-based INSDInterval_from INSDInterval_to

Record Index

  xsieve -index MedlineCitation/PMID -pattern PubmedArticle < file.xml

Local Archive

  xsieve -archive /data/pubmed -index MedlineCitation/PMID \
    -pattern PubmedArticle -gzip -hash < updatefiles.xml

  echo 6301692 | xsieve -archive /data/pubmed -gzip

Reformatting

  xsieve -format indent < compact.xml
  xsieve -filter Abstract remove content < records.xml
"##;

pub const EXTRAS: &str = r#"
Filter Actions

  -filter Pattern ACTION TARGET

  ACTION:  retain | remove | encode | decode | shrink | expand | accent
  TARGET:  object | container | attributes | content | cdata | comment

Archive Maintenance

  -prepare report   Print NW / UP / NO lines comparing input to archive
  -prepare release  Print new or updated records themselves
  -ignore Element   Exclude one subtree from the comparison
  -missing          Print identifiers with no archived record
  -trie             Print trie paths for identifiers
  -posting PATH     Append grouped uid lists under a term radix trie
"#;

pub const ADVANCED: &str = r#"
Performance

  -proc   Number of worker threads (default 4, capped at CPU count)
  -cons   Consumer-to-worker ratio (default 4)
  -serv   Explicit consumer count (overrides -cons, maximum 128)
  -chan   Channel depth (default equals consumer count)
  -heap   Unshuffler look-ahead bound (default 16)
  -farm   Node arena slab capacity (default 64)
  -gogc   Accepted for wrapper compatibility, ignored

Data Cleanup

  -compress   Collapse runs of spaces in each input block
  -spaces     Convert non-space whitespace to plain spaces
  -strict     Remove embedded i, b, u, sub, and sup formatting tags
  -mixed      Keep mixed-content formatting tags, repairing escapes
  -flag       strict | mixed | none, settable by wrapper scripts
  -accent     Fold accented letters to ASCII
  -ascii      Escape non-ASCII characters as numeric references
"#;

pub const INTERNAL: &str = r#"
Processing Stages

  BlockReader   Buffered reads ending at a safe '>' boundary
  Partitioner   Boyer-Moore-Horspool scan for pattern boundaries
  Tokenizer     Byte-table pull tokenizer over each record
  TreeBuilder   Arena-allocated name/content/sibling node tree
  Compiler      Argument vector to immutable command-block tree
  Executor      Block-tree walk with conditions and variables
  Unshuffler    Min-heap restoring record order after the worker pool
  Stasher       Per-identifier locked writes into the archive trie

Archive Layout

  Identifier NP_060051.2 maps to NP_/06/00/51/NP_060051.2.xml
  Postings term "tnf" maps to t/n/f/uids.txt
"#;

pub const KEYS: &str = r#"
  ctrl-a     Beginning of line
  ctrl-e     End of line
  ctrl-k     Delete to end of line
  ctrl-u     Delete entire line
  ctrl-w     Delete previous word
  tab        Complete file name
"#;

pub const UNIX: &str = r#"
  cat        Print file contents
  cut        Remove fields from lines
  grep       Match patterns in lines
  head       Print first lines
  sort       Sort lines
  tail       Print last lines
  tr         Substitute characters
  uniq       Remove repeated lines
  wc         Count lines, words, and characters
"#;
