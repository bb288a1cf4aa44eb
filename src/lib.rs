//! Reprint Core Library
//!
//! Turns lists of PubMed identifiers into full-text documents on disk by
//! following the NCBI link-out redirector to the publisher's landing page and
//! scraping it with a fixed, ordered set of site strategies.
//!
//! # Architecture
//!
//! Leaf-first:
//! - [`parser`] - Identifier lists and identifier files
//! - [`fetch`] - HTTP GETs behind the [`fetch::PageFetcher`] trait
//! - [`finder`] - Site strategies that locate a document URL on a landing page
//! - [`download`] - Writing fetched documents to the output directory
//! - [`resolver`] - One identifier end-to-end: skip check, redirector, strategies, save
//! - [`batch`] - Retry controller, batch driver and failure ledger

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod batch;
pub mod download;
pub mod fetch;
pub mod finder;
mod identifier;
pub mod parser;
pub mod resolver;
pub mod user_agent;

// Re-export commonly used types
pub use batch::{
    BatchDriver, BatchError, BatchReport, BatchStats, FailureLedger, RetryPolicy, RetryReport,
    with_retry,
};
pub use download::{DocumentStore, DownloadError};
pub use fetch::{FetchError, FetchResult, HttpFetcher, PageFetcher};
pub use finder::{Candidate, Finder, FinderSet, build_default_finder_set};
pub use identifier::Identifier;
pub use parser::{ParseError, ParseResult, parse_identifier_lines, parse_identifier_list};
pub use resolver::{Outcome, ResolveError, Resolver, UnresolvedReason};
