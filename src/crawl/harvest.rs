// src/crawl/harvest.rs
// =============================================================================
// Runs a full harvest: walks each selected collection, writes one CSV per
// collection, and in "both" mode a combined CSV as well.
//
// A collection that yields nothing is logged and skipped rather than written
// as an empty file. Fetch failures never surface here; they have already been
// turned into missing subtrees by the crawler.
//
// How it works:
// 1. For each selected collection, build its root URL and crawl it
// 2. Save the collection's rows to its own file
// 3. Keep the rows around for the combined file
// 4. In "both" mode, write everything collected to icd11_complete.csv
//
// Rust concepts:
// - Generic functions: run_harvest works with any EntitySource
// - &mut: save() updates the summary the caller owns
// - ? operator: a CSV write failure stops the run and becomes exit code 2
// =============================================================================

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use super::TreeCrawler;
use crate::api::{Entity, EntitySource};
use crate::config::{HarvestConfig, HarvestMode, COMBINED_FILE_NAME};
use crate::output::write_entities;

/// What a harvest produced.
#[derive(Debug, Default)]
pub struct HarvestSummary {
    /// Every file written, with its row count
    pub files: Vec<(PathBuf, usize)>,
    /// Entities collected across all selected collections
    pub total_entities: usize,
}

pub async fn run_harvest<S: EntitySource>(
    crawler: &TreeCrawler<S>,
    config: &HarvestConfig,
    mode: HarvestMode,
) -> Result<HarvestSummary> {
    // Summary of what was written, filled in as files are saved
    let mut summary = HarvestSummary::default();
    let mut all_entities: Vec<Entity> = Vec::new();

    // `&collection` destructures the &Collection the slice hands out;
    // Collection is Copy, so this is a cheap copy
    for &collection in mode.collections() {
        info!("=== Scraping {} ===", collection.label());
        let root_url = collection.root_url(config);
        let entities = crawler.harvest_root(&root_url, collection.label()).await;

        // Only collections that produced rows feed the combined file
        if save(config, collection.file_name(), &entities, &mut summary)? {
            all_entities.extend(entities);
        }
    }

    summary.total_entities = all_entities.len();

    if mode.writes_combined() {
        save(config, COMBINED_FILE_NAME, &all_entities, &mut summary)?;
    }

    Ok(summary)
}

// Returns false when there was nothing to write
fn save(
    config: &HarvestConfig,
    file_name: &str,
    entities: &[Entity],
    summary: &mut HarvestSummary,
) -> Result<bool> {
    if entities.is_empty() {
        info!("No entities to save for {}", file_name);
        return Ok(false);
    }

    let path = config.output_path(file_name);
    write_entities(&path, entities)?;
    info!("Saved {} entities to {}", entities.len(), path.display());

    summary.files.push((path, entities.len()));
    Ok(true)
}
