// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - harvest: crawl one or both ICD collections into CSV files
// - entity: fetch a single node and show what would be extracted from it
//
// We use clap's "derive" API: the CLI is described by Rust structs and
// enums, and the #[...] attributes tell clap how to parse each field.
//
// Rust concepts:
// - Structs: group the arguments of one command
// - Enums: one variant per subcommand ("harvest OR entity")
// - Derive macros: Parser, Subcommand, Args and ValueEnum generate the parsing code
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

// Defaults live in config.rs so the CLI and HarvestConfig::default() agree
use crate::config::{
    HarvestConfig, HarvestMode, DEFAULT_BASE_URL, DEFAULT_LINEARIZATION, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_DEPTH, DEFAULT_RELEASE, DEFAULT_RETRY_DELAY_MS,
};

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure --help and --version output
#[derive(Parser, Debug)]
#[command(
    name = "icd-harvest",
    version = "0.1.0",
    about = "Crawl a local ICD-11 API and flatten its entity tree into CSV",
    long_about = "icd-harvest walks the Foundation and/or MMS hierarchies of a locally hosted \
                  ICD-API, one request per entity, and writes every entity it reaches as a CSV row."
)]
pub struct Cli {
    // #[command(subcommand)] means this field holds one of the Commands variants
    #[command(subcommand)]
    pub command: Commands,
}

// This enum defines our subcommands (harvest, entity)
//
// The fields inside each variant become the arguments for that subcommand.
// The /// doc comments double as the --help text.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl ICD collections and write them to CSV
    ///
    /// Example: icd-harvest harvest --mode both --out-dir data/
    Harvest {
        /// Which collection(s) to crawl
        ///
        /// value_enum lets clap accept exactly: foundation, mms, both
        #[arg(long, value_enum, default_value_t = HarvestMode::Mms)]
        mode: HarvestMode,

        /// ICD-11 release of the MMS linearization
        #[arg(long, default_value = DEFAULT_RELEASE)]
        release: String,

        /// Linearization name under the release
        #[arg(long, default_value = DEFAULT_LINEARIZATION)]
        linearization: String,

        /// Directory the CSV files are written to
        ///
        /// clap turns the field name out_dir into the flag --out-dir
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Deepest level still fetched; anything below is dropped
        ///
        /// Top-level branches are depth 0
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,

        // flatten pulls the ApiArgs fields in as if they were written here
        #[command(flatten)]
        api: ApiArgs,
    },

    /// Fetch one entity and print the extracted record
    ///
    /// Example: icd-harvest entity http://id.who.int/icd/entity/257068234 --json
    Entity {
        /// Entity URI (WHO cloud URIs are rewritten to --base-url)
        ///
        /// This is a positional argument (required, no flag needed)
        uri: String,

        /// Output the record as JSON instead of a table
        ///
        /// This is an optional flag: --json
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        api: ApiArgs,
    },
}

/// Connection settings shared by every subcommand.
//
// #[derive(Args)] makes a reusable group of arguments. Both subcommands
// flatten it, so --base-url and the retry flags are defined only once.
#[derive(Args, Debug)]
pub struct ApiArgs {
    /// Base address of the local ICD API
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Attempts per request before giving up on a transport failure
    ///
    /// A non-2xx answer is never retried, whatever this is set to
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,

    /// Pause between attempts, in milliseconds
    #[arg(long, default_value_t = DEFAULT_RETRY_DELAY_MS)]
    pub retry_delay_ms: u64,
}

impl ApiArgs {
    /// Starts a config from these settings, everything else at its default.
    pub fn to_config(&self) -> HarvestConfig {
        HarvestConfig {
            // &self only borrows the args, so the String has to be cloned
            base_url: self.base_url.clone(),
            max_attempts: self.max_attempts,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            ..HarvestConfig::default()
        }
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. default_value vs default_value_t?
//    - default_value takes a string that clap parses like user input
//    - default_value_t takes an already-typed Rust value (usize, u32, an enum)
//
// 2. Why PathBuf for --out-dir instead of String?
//    - PathBuf is the owned path type; it joins file names with the
//      platform's separator and keeps non-UTF-8 paths intact
//
// 3. Why are tests using try_parse_from instead of parse?
//    - parse() exits the process on bad input
//    - try_parse_from() returns a Result the test can inspect
// -----------------------------------------------------------------------------
