use log::{debug, info};
use serde_json::Value;

use crate::error::Result;

/// Snapshot of an upstream response used to detect change.
///
/// Compared by exact equality of its canonical JSON serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(Self(serde_json::to_string(value)?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Outcome of [`FreshnessCache::check_and_update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    /// The stored document is still valid.
    Hit(String),
    /// The document must be rendered again and then committed.
    Miss,
}

/// Single-slot cache for the rendered dashboard.
///
/// Holds at most one `(fingerprint, document)` pair for the lifetime of the
/// process. There is no TTL and no eviction: an entry is replaced only when
/// the fingerprint changes.
///
/// A miss records the new fingerprint straight away and drops the previous
/// document, so a hit always returns the document committed for exactly the
/// current fingerprint. If the render that follows a miss fails, nothing is
/// committed and the next check misses again.
///
/// The cache itself is not synchronised. Callers serving several connections
/// keep it behind a lock held across check, render and commit.
#[derive(Debug, Default)]
pub struct FreshnessCache {
    fingerprint: Option<Fingerprint>,
    document: Option<String>,
}

impl FreshnessCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check_and_update(&mut self, current: Fingerprint) -> Freshness {
        if self.fingerprint.as_ref() == Some(&current) {
            if let Some(document) = &self.document {
                info!("Fingerprint unchanged, serving cached dashboard");
                return Freshness::Hit(document.clone());
            }
        }

        debug!("Fingerprint changed, dashboard must be rendered");
        self.fingerprint = Some(current);
        self.document = None;
        Freshness::Miss
    }

    /// Stores the document rendered for the fingerprint of the last miss.
    pub fn commit(&mut self, document: String) {
        info!("Saving dashboard in cache ({} bytes)", document.len());
        self.document = Some(document);
    }

    #[cfg(test)]
    fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }
}
