//! Versioned state snapshots
//!
//! A snapshot is a JSON document holding the four learned state structures
//! (usage records, context history, performance histories, adaptive weights)
//! plus the configuration they were produced under.
//!
//! ## Versioning
//!
//! Every snapshot carries a `version` field. Loading:
//! - a newer version than [`SNAPSHOT_VERSION`] fails with
//!   [`SnapshotError::SchemaMismatch`]
//! - an older version is upgraded one step at a time by [`migrate`]
//!   before it is deserialized
//!
//! Version 0 is the unversioned layout (no `version` or `saved_at` field).
//! Bumping the schema means adding a step to [`migrate`] and incrementing
//! [`SNAPSHOT_VERSION`].

use crate::config::{BimfuseConfig, validate_config};
use crate::models::{DocumentUsage, QueryContext};
use crate::selector::{AdaptiveWeights, PerformanceHistory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Schema version written by this build
pub const SNAPSHOT_VERSION: u32 = 1;

/// Errors reading or writing a snapshot
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The file could not be read or written
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a well-formed snapshot document
    #[error("Snapshot parse error: {0}")]
    Parse(String),

    /// The snapshot was written by a newer schema
    #[error("Snapshot schema version {found} is newer than supported version {supported}")]
    SchemaMismatch { found: u32, supported: u32 },

    /// The snapshot parsed but its content violates an invariant
    #[error("Invalid snapshot: {0}")]
    Invalid(String),
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        SnapshotError::Parse(err.to_string())
    }
}

/// What a load did
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// State was replaced by the snapshot
    Restored {
        saved_at: DateTime<Utc>,
        documents: usize,
        contexts: usize,
    },
    /// The snapshot was unusable and state was reset to empty
    Reset { reason: String },
}

impl LoadOutcome {
    /// Whether the snapshot was applied
    pub fn is_restored(&self) -> bool {
        matches!(self, LoadOutcome::Restored { .. })
    }
}

/// Serialized engine state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StateSnapshot {
    /// Schema version
    pub version: u32,
    /// When the snapshot was taken
    pub saved_at: DateTime<Utc>,
    /// Configuration in effect when saving
    pub config: BimfuseConfig,
    /// Usage records, sorted by document id
    pub usage: Vec<DocumentUsage>,
    /// Context history, oldest first
    pub context: Vec<QueryContext>,
    /// Performance histories
    pub performance: PerformanceHistory,
    /// Adaptive weights
    pub weights: AdaptiveWeights,
}

impl StateSnapshot {
    /// Write the snapshot as pretty JSON.
    ///
    /// The document is written to a sibling temporary file which is then
    /// renamed over `path`, so a crash never leaves a truncated snapshot.
    pub async fn write(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(self)?;
        let tmp = temp_path(path);
        tokio::fs::write(&tmp, json).await?;
        if let Err(e) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        tracing::debug!(path = %path.display(), version = self.version, "Snapshot written");
        Ok(())
    }

    /// Read, migrate and validate a snapshot
    pub async fn read(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        Self::from_slice(&bytes)
    }

    /// Parse, migrate and validate a snapshot document
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let value: Value = serde_json::from_slice(bytes)?;
        if !value.is_object() {
            return Err(SnapshotError::Parse(
                "snapshot root must be an object".to_string(),
            ));
        }

        let found = match value.get("version") {
            None => 0,
            Some(v) => v
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| SnapshotError::Invalid(format!("bad version field: {}", v)))?,
        };
        if found > SNAPSHOT_VERSION {
            return Err(SnapshotError::SchemaMismatch {
                found,
                supported: SNAPSHOT_VERSION,
            });
        }

        let snapshot: StateSnapshot = serde_json::from_value(migrate(value, found)?)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Check invariants that the type system does not enforce
    pub fn validate(&self) -> Result<(), SnapshotError> {
        for record in &self.usage {
            if record.doc_id.is_empty() {
                return Err(SnapshotError::Invalid(
                    "usage record with empty doc_id".to_string(),
                ));
            }
            for (field, value) in [
                ("context_relevance", record.context_relevance),
                ("forgetting_score", record.forgetting_score),
            ] {
                if !(0.0..=1.0).contains(&value) {
                    return Err(SnapshotError::Invalid(format!(
                        "{} of '{}' is outside [0, 1]: {}",
                        field, record.doc_id, value
                    )));
                }
            }
        }
        for sample in self.performance.samples() {
            if !(0.0..=1.0).contains(&sample.score) {
                return Err(SnapshotError::Invalid(format!(
                    "performance score of '{}' is outside [0, 1]: {}",
                    sample.backend_name, sample.score
                )));
            }
        }
        for (backend, weight) in self.weights.iter() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(SnapshotError::Invalid(format!(
                    "weight of '{}' is invalid: {}",
                    backend, weight
                )));
            }
        }
        validate_config(&self.config)
            .map_err(|e| SnapshotError::Invalid(format!("embedded configuration: {}", e)))
    }
}

/// Upgrade a snapshot document from `from_version` to [`SNAPSHOT_VERSION`]
pub fn migrate(mut value: Value, from_version: u32) -> Result<Value, SnapshotError> {
    let mut version = from_version;
    while version < SNAPSHOT_VERSION {
        value = match version {
            0 => migrate_v0_to_v1(value)?,
            other => {
                return Err(SnapshotError::Invalid(format!(
                    "no migration from version {}",
                    other
                )));
            }
        };
        version += 1;
        tracing::debug!(version, "Migrated snapshot");
    }
    Ok(value)
}

/// Version 0 had no `version` or `saved_at` field
fn migrate_v0_to_v1(mut value: Value) -> Result<Value, SnapshotError> {
    let object = value
        .as_object_mut()
        .ok_or_else(|| SnapshotError::Parse("snapshot root must be an object".to_string()))?;
    object.insert("version".to_string(), Value::from(1u32));
    object
        .entry("saved_at")
        .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
    Ok(value)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "snapshot".into());
    name.push(".tmp");
    path.with_file_name(name)
}
