//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{ArgGroup, Parser};

/// Fetch full-text documents for PubMed identifiers.
///
/// Each identifier is followed through the NCBI link-out redirector to its
/// publisher page, where a fixed set of site strategies looks for the PDF.
/// Identifiers that cannot be fetched are written to a failure ledger.
#[derive(Parser, Debug)]
#[command(name = "reprint")]
#[command(author, version, about)]
#[command(group(ArgGroup::new("source").required(true).args(["pmids", "pmids_file"])))]
pub struct Args {
    /// Comma-separated list of identifiers to fetch
    #[arg(short = 'p', long, value_name = "CSV")]
    pub pmids: Option<String>,

    /// File with one identifier per line, optionally followed by a name
    #[arg(short = 'f', long, value_name = "PATH")]
    pub pmids_file: Option<PathBuf>,

    /// Output directory for fetched documents (created if missing)
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Output file for identifiers that failed to fetch
    #[arg(short, long, value_name = "PATH")]
    pub errors: Option<PathBuf>,

    /// Maximum attempts per identifier, including the first (1-20)
    #[arg(short = 'm', long, value_parser = clap::value_parser!(u32).range(1..=20))]
    pub max_tries: Option<u32>,

    /// Identifiers processed at once (1-16, 1 = sequential)
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u8).range(1..=16))]
    pub concurrency: Option<u8>,

    /// Base delay before retrying a transient failure in milliseconds (0-60000)
    #[arg(long, value_parser = clap::value_parser!(u64).range(0..=60_000))]
    pub retry_delay_ms: Option<u64>,

    /// Config file (default: $XDG_CONFIG_HOME/reprint/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Redirector URL template; `{id}` is replaced by the identifier
    #[arg(long, value_name = "TEMPLATE")]
    pub redirector: Option<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
