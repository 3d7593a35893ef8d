//! Immutable configuration snapshots.
//!
//! A [`Config`] is a read-only key/value bundle owned by the caller. One
//! instance may back many executions; every derivation (`with_*`) produces
//! a new snapshot and leaves the original untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Configuration key under which a submission's unique id is recorded.
pub const SUBMISSION_ID_KEY: &str = "sluice.submission.id";

/// Immutable key/value configuration bundle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Flat string entries, ordered for stable snapshots.
    entries: BTreeMap<String, String>,
    /// Optional application name used to tag plans built under this config.
    app_name: Option<String>,
}

impl Config {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the application name.
    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    /// The application name, if one was set.
    pub fn app_name(&self) -> Option<&str> {
        self.app_name.as_deref()
    }

    /// Add or replace a string entry.
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Look up an entry.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Derive a snapshot carrying the unique id for one submission.
    ///
    /// The id namespaces this submission's entries so that concurrent plans
    /// built over the same caller-owned configuration cannot collide.
    pub fn with_unique_id(&self, id: Uuid) -> Self {
        self.clone().with_entry(SUBMISSION_ID_KEY, id.to_string())
    }

    /// The submission id recorded by [`Config::with_unique_id`], if any.
    pub fn unique_id(&self) -> Option<&str> {
        self.get(SUBMISSION_ID_KEY)
    }

    /// Iterate over all entries in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
