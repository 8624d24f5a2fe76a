// src/crawl/mock.rs
// In-memory EntitySource used by the crawler tests.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::api::{EntitySource, FetchError};

/// Serves canned nodes by URI and records every request it sees.
///
/// Unknown URIs answer 404; URIs marked with `with_failure` answer 503.
#[derive(Default)]
pub struct MockSource {
    nodes: HashMap<String, Value>,
    failing: HashSet<String>,
    requested: Mutex<Vec<String>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, uri: &str, node: Value) -> Self {
        self.nodes.insert(uri.to_string(), node);
        self
    }

    pub fn with_failure(mut self, uri: &str) -> Self {
        self.failing.insert(uri.to_string());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl EntitySource for MockSource {
    async fn fetch(&self, uri: &str) -> Result<Value, FetchError> {
        self.requested.lock().unwrap().push(uri.to_string());

        if self.failing.contains(uri) {
            return Err(FetchError::Status {
                url: uri.to_string(),
                status: StatusCode::SERVICE_UNAVAILABLE,
            });
        }

        self.nodes.get(uri).cloned().ok_or_else(|| FetchError::Status {
            url: uri.to_string(),
            status: StatusCode::NOT_FOUND,
        })
    }
}
