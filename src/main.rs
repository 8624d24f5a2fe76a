// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (RUST_LOG, default "info")
// 2. Parse command-line arguments using clap
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code
//
// Exit codes:
//   0 = harvest finished (however many subtrees were dropped on the way)
//   1 = `entity` could not fetch the requested node
//   2 = configuration or output error
//
// Rust concepts used:
// - async/await: every entity is one HTTP request, and reqwest is async
// - Result<T, E>: for error handling (T = success type, E = error type)
// - match: pattern matching to pick the subcommand and destructure its fields
// =============================================================================

// Module declarations - tells Rust about our other source files
mod api;     // src/api/ - HTTP client and JSON -> Entity extraction
mod cli;     // src/cli.rs - command-line parsing
mod config;  // src/config.rs - run settings and defaults
mod crawl;   // src/crawl/ - tree walk and CSV-writing orchestration
mod output;  // src/output.rs - CSV writer

// anyhow::Result is like std::result::Result but can carry any error type,
// so the ? operator works on reqwest, csv and io errors alike
use anyhow::Result;
use clap::Parser; // Parser trait enables the parse() method
use tracing_subscriber::EnvFilter;

// Import items we need from our modules
use api::{EntitySource, IcdClient}; // EntitySource must be in scope to call .fetch()
use cli::{Cli, Commands};
use config::{HarvestConfig, HarvestMode};
use crawl::TreeCrawler;

// The #[tokio::main] attribute transforms our async main into a real main function
// It creates a tokio runtime and runs our async code inside it
#[tokio::main]
async fn main() {
    // Route tracing events to stderr. RUST_LOG=debug shows every fetched URI,
    // indented by depth; the default "info" shows per-branch progress.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Run our application logic and capture the exit code
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole anyhow context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    // std::process::exit() terminates the program with the given code.
    // It skips destructors, which is fine here: everything has been flushed
    // by the time run() returns.
    std::process::exit(exit_code);
}

// This is the main application logic
// Returns:
//   Ok(code) = the exit code the handler chose
//   Err      = configuration or I/O problem (exit code 2)
async fn run() -> Result<i32> {
    // Parse command-line arguments into our Cli struct
    // This will automatically handle --help, --version, etc.
    let cli = Cli::parse();

    // Match on which subcommand was used
    match cli.command {
        Commands::Harvest {
            mode,
            release,
            linearization,
            out_dir,
            max_depth,
            api,
        } => {
            // Start from the shared connection settings, then fill in the
            // harvest-only fields. `..api.to_config()` copies everything we
            // didn't name explicitly (struct update syntax).
            let config = HarvestConfig {
                release,
                linearization,
                output_dir: out_dir,
                max_depth,
                ..api.to_config()
            };
            handle_harvest(&config, mode).await
        }
        Commands::Entity { uri, json, api } => handle_entity(&uri, json, &api.to_config()).await,
    }
}

// Handles the 'harvest' subcommand
// Parameters:
//   config: where to connect, where to write, how deep to go
//   mode: which collection(s) to crawl
async fn handle_harvest(config: &HarvestConfig, mode: HarvestMode) -> Result<i32> {
    // Fail fast on a base URL that could never work, before any request
    config.validate()?;

    println!("🏥 Starting ICD-11 harvest from {}", config.base());
    println!("📊 Mode: {:?}, max depth: {}", mode, config.max_depth);

    // The crawler owns the client; one client means one connection pool
    let client = IcdClient::new(config)?;
    let crawler = TreeCrawler::new(client, config.max_depth);

    // Walk every selected collection and write the CSV files
    let summary = crawl::run_harvest(&crawler, config, mode).await?;

    // Print one line per file written, then the total
    println!();
    for (path, rows) in &summary.files {
        println!("   📄 {} ({} rows)", path.display(), rows);
    }
    println!("✅ Harvest completed! Total entities: {}", summary.total_entities);

    // Dropped subtrees are not an error: the run reports what it collected
    Ok(0)
}

// Handles the 'entity' subcommand
// Parameters:
//   uri: the entity to fetch (WHO URIs are rewritten to the local server)
//   json: whether to output JSON format
//   config: connection settings
async fn handle_entity(uri: &str, json: bool, config: &HarvestConfig) -> Result<i32> {
    config.validate()?;

    let client = IcdClient::new(config)?;

    // A failed fetch is an expected outcome here, so it becomes exit code 1
    // rather than an Err
    let data = match client.fetch(uri).await {
        Ok(data) => data,
        Err(e) => {
            eprintln!("❌ {}", e);
            return Ok(1);
        }
    };

    // Same extraction the crawler uses; a single node has no parent
    let entity = api::extract_entity(&data, "");
    let children = api::child_uris(&data);

    if json {
        // Serialize the entity to JSON and print
        println!("{}", serde_json::to_string_pretty(&entity)?);
    } else {
        // Print human-readable table
        print_entity(&entity, children.len());
    }

    Ok(0)
}

// Prints one entity as a two-column table in the terminal
fn print_entity(entity: &api::Entity, child_count: usize) {
    // An array of (label, value) pairs keeps the table in CSV column order
    let rows = [
        ("id", entity.id.as_str()),
        ("code", entity.code.as_str()),
        ("title", entity.title.as_str()),
        ("definition", entity.definition.as_str()),
        ("browserUrl", entity.browser_url.as_str()),
        ("codingNote", entity.coding_note.as_str()),
        ("synonyms", entity.synonyms.as_str()),
        ("isLeaf", api::leaf_flag(entity.is_leaf)),
    ];

    // Print table header
    println!("{:<12} {}", "FIELD", "VALUE");
    println!("{}", "=".repeat(72));

    // {:<12} pads the field name to 12 characters, left-aligned
    for (field, value) in rows {
        println!("{:<12} {}", field, value);
    }

    println!();
    println!("🌳 Children: {}", child_count);
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why return Result<i32> from run() instead of calling exit() inside it?
//    - Handlers stay ordinary functions that return values
//    - main() is the only place that decides how the process ends
//
// 2. What does `..api.to_config()` do?
//    - Struct update syntax: build a HarvestConfig from the named fields,
//      taking every other field from another HarvestConfig value
//
// 3. Why `{:?}` for the mode?
//    - HarvestMode derives Debug, which prints the variant name (e.g. Mms)
// -----------------------------------------------------------------------------
