//! Checkpoint existence probes
//!
//! Local roots are checked on the filesystem. Roots containing `s3://` are
//! probed over HTTP against an S3-compatible endpoint.
//!
//! The remote probe only answers [`Presence::Yes`] or [`Presence::No`]:
//! access-denied responses, other error statuses and transport failures are
//! all reported as `No`, without retry. A permission problem or a flaky
//! network therefore looks exactly like a missing checkpoint.
//!
//! Requests are unsigned. Buckets must allow anonymous reads (or sit behind
//! a proxy that signs requests); a private bucket answers 403 to every probe
//! and each test-mode model is skipped as "checkpoint not found".

use crate::error::{Error, Result};
use std::path::Path;
use std::time::Duration;

/// Environment variable naming the S3-compatible endpoint
pub const S3_ENDPOINT_ENV: &str = "GANBENCH_S3_ENDPOINT";

const DEFAULT_S3_ENDPOINT: &str = "http://127.0.0.1:9000";

/// Outcome of an existence probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Yes,
    No,
}

impl Presence {
    pub fn exists(self) -> bool {
        self == Presence::Yes
    }
}

impl From<bool> for Presence {
    fn from(exists: bool) -> Self {
        if exists {
            Presence::Yes
        } else {
            Presence::No
        }
    }
}

/// Storage backend able to answer "does this checkpoint exist"
///
/// Implementations never authenticate on their own; a backend that cannot
/// read the object reports it as absent.
pub trait CheckpointStorage {
    /// Probe `path`; backend failures map to [`Presence::No`]
    fn exists(&self, path: &str) -> Presence;

    /// Join a root and a relative key
    fn join_path(&self, root: &str, relative: &str) -> String;

    fn name(&self) -> &str;
}

/// Local filesystem backend
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl CheckpointStorage for LocalStorage {
    fn exists(&self, path: &str) -> Presence {
        Path::new(path).exists().into()
    }

    fn join_path(&self, root: &str, relative: &str) -> String {
        Path::new(root).join(relative).to_string_lossy().into_owned()
    }

    fn name(&self) -> &str {
        "local"
    }
}

/// S3-compatible object storage probed with unsigned `HEAD` requests
///
/// No credentials are sent; see the module docs for private buckets.
pub struct ObjectStorage {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl ObjectStorage {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("ganbench/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Storage(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { endpoint: endpoint.into().trim_end_matches('/').to_string(), client })
    }

    /// Endpoint from `GANBENCH_S3_ENDPOINT`, or a local default
    pub fn from_env() -> Result<Self> {
        let endpoint =
            std::env::var(S3_ENDPOINT_ENV).unwrap_or_else(|_| DEFAULT_S3_ENDPOINT.to_string());
        Self::new(endpoint)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// HTTP URL for an `s3://bucket/key` URI
    pub fn object_url(&self, uri: &str) -> Option<String> {
        let rest = &uri[uri.find("s3://")? + "s3://".len()..];
        let (bucket, key) = rest.split_once('/')?;
        if bucket.is_empty() || key.is_empty() {
            return None;
        }
        Some(format!("{}/{bucket}/{key}", self.endpoint))
    }
}

impl CheckpointStorage for ObjectStorage {
    fn exists(&self, path: &str) -> Presence {
        let Some(url) = self.object_url(path) else {
            return Presence::No;
        };
        match self.client.head(&url).send() {
            Ok(response) => response.status().is_success().into(),
            Err(_) => Presence::No,
        }
    }

    fn join_path(&self, root: &str, relative: &str) -> String {
        format!("{}/{}", root.trim_end_matches('/'), relative.trim_start_matches('/'))
    }

    fn name(&self) -> &str {
        "s3"
    }
}

/// Whether a checkpoint root lives on remote object storage
pub fn is_remote_root(root: &str) -> bool {
    root.contains("s3://")
}

/// Pick the backend for a checkpoint root
pub fn storage_for_root(root: &str) -> Result<Box<dyn CheckpointStorage>> {
    if is_remote_root(root) {
        Ok(Box::new(ObjectStorage::from_env()?))
    } else {
        Ok(Box::new(LocalStorage))
    }
}
