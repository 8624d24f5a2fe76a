// src/crawl/tree.rs
// =============================================================================
// This module walks the ICD entity tree depth-first.
//
// How it works:
// 1. Fetch a collection root (it is not emitted itself)
// 2. For each child URI, fetch the node and extract its Entity
// 3. Recurse into that node's children, passing its id down as the parent
// 4. Stop descending once the depth ceiling is passed
//
// Failure policy:
// - A node that cannot be fetched contributes nothing, and neither does
//   anything below it. Its siblings are unaffected.
// - Passing the depth ceiling is logged and silently truncates the branch.
//   This is what bounds a cyclic or runaway tree, since nothing is
//   de-duplicated.
//
// Rust concepts:
// - BoxFuture: a heap-allocated future, needed for async recursion
// - Lifetimes: traverse<'a> ties the returned future to the borrowed inputs
// - Vec::extend: appends a child's subtree in traversal (pre-)order
// =============================================================================

use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, info, warn};

use crate::api::{child_uris, extract_entity, Entity, EntitySource};

/// Depth-first crawler over an [`EntitySource`].
pub struct TreeCrawler<S> {
    source: S,
    max_depth: usize,
}

impl<S: EntitySource> TreeCrawler<S> {
    pub fn new(source: S, max_depth: usize) -> Self {
        Self { source, max_depth }
    }

    #[cfg(test)]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Collects every entity reachable from `uri`, in pre-order.
    ///
    /// Boxed because the future recurses into itself.
    pub fn traverse<'a>(
        &'a self,
        uri: &'a str,
        parent_id: &'a str,
        depth: usize,
    ) -> BoxFuture<'a, Vec<Entity>> {
        async move {
            if depth > self.max_depth {
                warn!(uri, depth, "Max depth reached");
                return Vec::new();
            }

            debug!("{}Fetching: {}", "  ".repeat(depth), uri);
            let data = match self.source.fetch(uri).await {
                Ok(data) => data,
                Err(e) => {
                    warn!(error = %e, "Dropping subtree");
                    return Vec::new();
                }
            };

            let entity = extract_entity(&data, parent_id);
            let node_id = entity.id.clone();
            let mut entities = vec![entity];

            for child_uri in child_uris(&data) {
                let subtree = self.traverse(&child_uri, &node_id, depth + 1).await;
                entities.extend(subtree);
            }

            entities
        }
        .boxed()
    }

    /// Walks every top-level branch under a collection root.
    ///
    /// Top-level entities get an empty parent. If the root itself cannot be
    /// fetched the whole collection comes back empty.
    pub async fn harvest_root(&self, root_uri: &str, label: &str) -> Vec<Entity> {
        let root = match self.source.fetch(root_uri).await {
            Ok(root) => root,
            Err(e) => {
                warn!(error = %e, "Failed to fetch {} root", label);
                return Vec::new();
            }
        };

        let branches = child_uris(&root);
        let mut all_entities = Vec::new();

        for (i, branch_uri) in branches.iter().enumerate() {
            info!("Processing {} branch {}/{}", label, i + 1, branches.len());
            let entities = self.traverse(branch_uri, "", 0).await;
            info!("Collected {} entities from this branch", entities.len());
            all_entities.extend(entities);
        }

        all_entities
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why does traverse return a BoxFuture instead of being an async fn?
//    - An async fn compiles to a state machine that contains its own awaits
//    - Calling itself would make that state machine infinitely large
//    - Boxing the recursive future gives it a fixed size (one pointer)
//
// 2. Why does the recursion pass &node_id down instead of a clone per child?
//    - Each child only borrows the parent id for as long as its own walk runs
//    - The borrow ends before the next sibling starts
//
// 3. Why is there no visited set?
//    - Output keeps one row per visit, so a node linked from two parents
//      shows up twice, once under each parent
//    - The depth ceiling is the only thing that stops a cycle
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::IcdClient;
    use crate::config::HarvestConfig;
    use crate::crawl::mock::MockSource;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_root_with_one_failing_child() {
        let source = MockSource::new()
            .with_node("root", json!({ "child": ["A", "B"] }))
            .with_node(
                "A",
                json!({ "@id": "A", "code": "X1", "title": "Foo", "child": [] }),
            )
            .with_failure("B");
        let crawler = TreeCrawler::new(source, 50);

        let entities = crawler.harvest_root("root", "Test").await;

        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].id, "A");
        assert_eq!(entities[0].code, "X1");
        assert_eq!(entities[0].title, "Foo");
        assert_eq!(entities[0].parent, "");
        assert!(entities[0].is_leaf);
    }

    #[tokio::test]
    async fn test_unreachable_child_over_http_is_dropped() {
        // B lives on a port nobody listens on, so every attempt is refused
        let dead = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dead_uri = format!("http://{}/icd/entity/B", dead.local_addr().unwrap());
        drop(dead);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let root = json!({ "child": [format!("{}/icd/entity/A", base), dead_uri] });
        let app = Router::new()
            .route("/icd/entity", get(move || async move { Json(root) }))
            .route(
                "/icd/entity/A",
                get(|| async {
                    Json(json!({ "@id": "A", "code": "X1", "title": "Foo", "child": [] }))
                }),
            );
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = HarvestConfig {
            base_url: base.clone(),
            retry_delay: Duration::from_millis(10),
            ..HarvestConfig::default()
        };
        let crawler = TreeCrawler::new(IcdClient::new(&config).unwrap(), config.max_depth);

        let entities = crawler
            .harvest_root(&format!("{}/icd/entity", base), "Test")
            .await;

        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].id, "A");
        assert_eq!(entities[0].code, "X1");
        assert_eq!(entities[0].parent, "");
        assert!(entities[0].is_leaf);
    }

    #[tokio::test]
    async fn test_parent_is_id_of_linking_node() {
        let source = MockSource::new()
            .with_node("root", json!({ "child": ["uri-1"] }))
            .with_node("uri-1", json!({ "@id": "chapter", "child": ["uri-2", "uri-3"] }))
            .with_node("uri-2", json!({ "@id": "block", "child": ["uri-4"] }))
            .with_node("uri-3", json!({ "@id": "leaf-b", "child": [] }))
            .with_node("uri-4", json!({ "@id": "leaf-a", "child": [] }));
        let crawler = TreeCrawler::new(source, 50);

        let entities = crawler.harvest_root("root", "Test").await;

        let pairs: Vec<(&str, &str)> = entities
            .iter()
            .map(|e| (e.id.as_str(), e.parent.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("chapter", ""),
                ("block", "chapter"),
                ("leaf-a", "block"),
                ("leaf-b", "chapter"),
            ]
        );

        let leaves: Vec<&str> = entities
            .iter()
            .filter(|e| e.is_leaf)
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(leaves, vec!["leaf-a", "leaf-b"]);
    }

    #[tokio::test]
    async fn test_failed_subtree_is_dropped_but_siblings_survive() {
        let source = MockSource::new()
            .with_node("root", json!({ "child": ["good", "bad"] }))
            .with_node("good", json!({ "@id": "good", "child": ["good-child"] }))
            .with_node("good-child", json!({ "@id": "good-child", "child": [] }))
            .with_failure("bad")
            // Reachable only through "bad", so it must never be fetched
            .with_node("bad-child", json!({ "@id": "bad-child", "child": [] }));
        let crawler = TreeCrawler::new(source, 50);

        let entities = crawler.harvest_root("root", "Test").await;

        let ids: Vec<&str> = entities.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["good", "good-child"]);
        assert!(!crawler.source().requested().contains(&"bad-child".to_string()));
    }

    #[tokio::test]
    async fn test_depth_ceiling_truncates_branch() {
        // A chain n0 -> n1 -> ... -> n59
        let mut source = MockSource::new().with_node("root", json!({ "child": ["n0"] }));
        for i in 0..60 {
            source = source.with_node(
                &format!("n{}", i),
                json!({ "@id": format!("n{}", i), "child": [format!("n{}", i + 1)] }),
            );
        }
        let crawler = TreeCrawler::new(source, 50);

        let entities = crawler.harvest_root("root", "Test").await;

        // Depths 0..=50 are kept, depth 51 is cut before it is fetched
        assert_eq!(entities.len(), 51);
        assert_eq!(entities.last().unwrap().id, "n50");
        assert!(!crawler.source().requested().contains(&"n51".to_string()));
    }

    #[tokio::test]
    async fn test_cycle_is_bounded_by_depth() {
        let source = MockSource::new()
            .with_node("root", json!({ "child": ["loop"] }))
            .with_node("loop", json!({ "@id": "loop", "child": ["loop"] }));
        let crawler = TreeCrawler::new(source, 3);

        let entities = crawler.harvest_root("root", "Test").await;

        assert_eq!(entities.len(), 4);
        assert_eq!(entities[0].parent, "");
        assert!(entities[1..].iter().all(|e| e.parent == "loop"));
    }

    #[tokio::test]
    async fn test_failed_root_yields_nothing() {
        let source = MockSource::new().with_failure("root");
        let crawler = TreeCrawler::new(source, 50);

        assert!(crawler.harvest_root("root", "Test").await.is_empty());
    }
}
