//! xsieve binary entry
//!
//! e.g., xsieve -pattern PubmedArticle -element MedlineCitation/PMID
//!         -block Author -sep " " -element Initials,LastName

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    match xsieve::cli::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("\nERROR: {err}");
            ExitCode::FAILURE
        }
    }
}
