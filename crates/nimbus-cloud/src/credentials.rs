//! Shared credential store for provisioned nodes

use crate::error::{CloudError, Result};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Login credentials of a node
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub identity: String,
    pub credential: String,
}

impl Credentials {
    pub fn new(identity: impl Into<String>, credential: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            credential: credential.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identity", &self.identity)
            .field("credential", &"********")
            .finish()
    }
}

/// Store key for a node's credentials
pub fn node_key(id: &str) -> String {
    format!("node#{}", id)
}

/// Credentials keyed by node, shared across a compute session
///
/// Each key is written once. A second write for the same key is refused
/// instead of replacing a credential that was already handed out.
#[derive(Debug, Default)]
pub struct CredentialStore {
    entries: DashMap<String, Credentials>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert if absent, else fail with [`CloudError::CredentialConflict`]
    pub fn insert_new(&self, key: impl Into<String>, credentials: Credentials) -> Result<()> {
        match self.entries.entry(key.into()) {
            Entry::Occupied(entry) => Err(CloudError::CredentialConflict(entry.key().clone())),
            Entry::Vacant(entry) => {
                tracing::debug!("Stored credentials for {}", entry.key());
                entry.insert(credentials);
                Ok(())
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<Credentials> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }
}
