// src/api/client.rs
// =============================================================================
// This module fetches entity JSON from the ICD API.
//
// Key functionality:
// - Rewrites WHO cloud URIs (id.who.int) to the local server
// - Sends the headers the ICD API requires on every request
// - Retries transport failures a fixed number of times, including a
//   connection that drops while the body is still being read
// - Treats any non-2xx status as "no data" without retrying
//
// The crawler only sees the EntitySource trait, so it can be driven by an
// in-memory source in tests.
//
// Rust concepts:
// - Traits: EntitySource describes "something that can fetch a node"
// - async-trait: lets a trait declare async methods that work with generics
// - thiserror: derives Display and Error for our FetchError enum
// - loop/break with a value: the retry loop hands back the body it read
// =============================================================================

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::config::HarvestConfig;

/// Hosts the API hands out in `@id` and `child` links.
const WHO_HOSTS: [&str; 2] = ["https://id.who.int", "http://id.who.int"];

/// Why a node could not be fetched.
//
// #[derive(Error)] comes from thiserror. Each #[error("...")] attribute
// becomes the Display message, and #[source] links the underlying error
// so logging can show the whole chain.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection-level failure (sending the request or reading the body)
    /// that survived every retry
    #[error("request to {url} failed after {attempts} attempt(s): {source}")]
    Transport {
        url: String,
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },
    /// Server answered with a non-success status (never retried)
    #[error("HTTP {status}: {url}")]
    Status { url: String, status: StatusCode },
    /// 2xx response whose body is not JSON
    #[error("invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    /// 2xx response that carries no entity object
    #[error("no entity data in response from {url}")]
    EmptyBody { url: String },
}

/// Anything that can resolve an entity URI to its JSON node.
//
// Plain async fns in traits can't promise their futures are Send, which
// the boxed recursive crawl needs. #[async_trait] rewrites each method to
// return Pin<Box<dyn Future + Send>>, which solves that for us.
#[async_trait]
pub trait EntitySource: Send + Sync {
    async fn fetch(&self, uri: &str) -> Result<Value, FetchError>;
}

/// Rewrites a WHO cloud URI onto `base_url`; other URIs pass through.
///
/// Example:
///   localize_uri("http://id.who.int/icd/entity/1", "http://localhost")
///   -> "http://localhost/icd/entity/1"
pub fn localize_uri(uri: &str, base_url: &str) -> String {
    for host in WHO_HOSTS {
        // strip_prefix returns Some(rest) only if the string starts with host
        if let Some(path) = uri.strip_prefix(host) {
            return format!("{}{}", base_url.trim_end_matches('/'), path);
        }
    }
    uri.to_string()
}

/// HTTP-backed [`EntitySource`] for a local ICD-API deployment.
#[derive(Debug, Clone)]
pub struct IcdClient {
    client: Client,
    base_url: String,
    max_attempts: u32,
    retry_delay: Duration,
}

impl IcdClient {
    pub fn new(config: &HarvestConfig) -> Result<Self> {
        // Every request carries the same content negotiation headers,
        // so bake them into the client once
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        // HeaderName::from_static needs lowercase; HTTP header names are
        // case-insensitive, so the server still sees API-Version
        headers.insert(
            HeaderName::from_static("api-version"),
            HeaderValue::from_str(&config.api_version)
                .with_context(|| format!("Invalid API-Version '{}'", config.api_version))?,
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.language)
                .with_context(|| format!("Invalid Accept-Language '{}'", config.language))?,
        );

        // No explicit timeout: the client default applies
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base().to_string(),
            // Zero attempts would never send anything
            max_attempts: config.max_attempts.max(1),
            retry_delay: config.retry_delay,
        })
    }
}

#[async_trait]
impl EntitySource for IcdClient {
    async fn fetch(&self, uri: &str) -> Result<Value, FetchError> {
        // Step 1: point WHO URIs at the local server
        let url = localize_uri(uri, &self.base_url);

        // Step 2: send the request and read the whole body, retrying on
        // transport errors. A drop while reading the body is a transport
        // error too, so the body read lives inside the loop.
        let mut attempt = 1;
        let body = loop {
            let result = match self.client.get(&url).send().await {
                Ok(response) => {
                    // A status is an answer, not a transport failure: give up now
                    let status = response.status();
                    if !status.is_success() {
                        return Err(FetchError::Status { url, status });
                    }
                    response.bytes().await
                }
                Err(e) => Err(e),
            };

            match result {
                Ok(bytes) => break bytes,
                Err(source) if attempt < self.max_attempts => {
                    warn!(url = %url, attempt, error = %source, "Request failed, retrying");
                    tokio::time::sleep(self.retry_delay).await;
                    attempt += 1;
                }
                Err(source) => {
                    return Err(FetchError::Transport {
                        url,
                        attempts: attempt,
                        source,
                    })
                }
            }
        };

        // Step 3: parse the bytes we got. Bad JSON is not retried.
        let body: Value = match serde_json::from_slice(&body) {
            Ok(body) => body,
            Err(source) => return Err(FetchError::Decode { url, source }),
        };

        // Step 4: only a non-empty JSON object counts as an entity
        match &body {
            Value::Object(map) if !map.is_empty() => Ok(body),
            _ => Err(FetchError::EmptyBody { url }),
        }
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why read the body with bytes() instead of response.json()?
//    - json() reads and parses in one step, so a dropped connection and a
//      malformed document come back as the same kind of error
//    - Reading the bytes first separates the two: read errors are retried,
//      parse errors are not
//
// 2. What is `Err(source) if attempt < self.max_attempts`?
//    - A match guard: the arm only matches when the condition holds
//    - Otherwise matching falls through to the next `Err(source)` arm
//
// 3. Why does `return Err(FetchError::Status { url, status })` move url?
//    - We are leaving the function, so nothing else needs url afterwards
//    - The borrow taken by client.get(&url) already ended when send() finished
// -----------------------------------------------------------------------------
