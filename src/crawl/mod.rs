// src/crawl/mod.rs
// =============================================================================
// This module handles crawling the ICD entity tree and writing the results.
//
// Submodules:
// - tree: depth-first walk of one collection
// - harvest: runs the selected collections and writes one CSV per collection
// - mock: an in-memory EntitySource, compiled only for tests
//
// Features:
// - One request per entity, one outstanding request at a time
// - A depth ceiling bounds runaway or cyclic trees
// - Failed nodes are skipped, and the rest of the crawl carries on
//
// Rust concepts:
// - Generics: TreeCrawler<S> works with any S that implements EntitySource
// - Test-only modules: `#[cfg(test)] mod mock;` never ships in the binary
// =============================================================================

mod harvest;
mod tree;

#[cfg(test)]
mod mock;

// Re-export what main.rs needs
pub use harvest::run_harvest;
pub use tree::TreeCrawler;
