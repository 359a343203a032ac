//! Schema provider interface
//!
//! Live database connectivity lives outside the core. A provider turns a
//! connection descriptor into a [`Schema`] snapshot or fails with
//! [`SchemawiseError::Connection`] / [`SchemawiseError::Introspection`].

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Result, Schema, SchemawiseError};

/// Connection descriptor, e.g. `sqlite:///var/lib/app.db` or `postgresql://host/db`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionDescriptor(String);

impl ConnectionDescriptor {
    /// Parses a descriptor; an empty string is rejected
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(SchemawiseError::ParameterValidation(
                "connection descriptor must not be empty".to_string(),
            ));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URL scheme, lowercased (`sqlite`, `postgresql`, ...). Bare paths have none.
    pub fn scheme(&self) -> Option<String> {
        self.0
            .split_once("://")
            .map(|(scheme, _)| scheme.to_lowercase())
    }

    /// Everything after `scheme://`, or the whole descriptor for bare paths
    pub fn location(&self) -> &str {
        match self.0.split_once("://") {
            Some((_, rest)) => rest,
            None => &self.0,
        }
    }
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Produces schema snapshots from a live database
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &str;

    /// Returns true if this provider understands the descriptor
    fn accepts(&self, descriptor: &ConnectionDescriptor) -> bool;

    /// Introspects the database behind the descriptor
    async fn extract_schema(&self, descriptor: &ConnectionDescriptor) -> Result<Schema>;
}
