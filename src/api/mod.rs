// src/api/mod.rs
// =============================================================================
// This module talks to the ICD-11 API and makes sense of what it returns.
//
// Submodules:
// - client: HTTP fetching with URI localization and retries
// - entity: Mapping raw JSON nodes onto flat Entity records
//
// This file (mod.rs) is the module root. It picks which items the rest of
// the crate gets to see.
//
// Rust concepts:
// - mod: declares a submodule that lives in its own file
// - pub use: re-exports an item so callers write `api::IcdClient`
//   instead of `api::client::IcdClient`
// - #[cfg(test)]: the item only exists when compiling tests
// =============================================================================

mod client;
mod entity;

pub use client::{EntitySource, IcdClient};
pub use entity::{child_uris, extract_entity, leaf_flag, Entity};

// Only the in-memory test source builds FetchError values outside client.rs
#[cfg(test)]
pub use client::FetchError;
