//! Project serialization with versioning and migration.
//!
//! JSON with a schema version field. Deserialization runs the migration
//! chain and then a single normalization pass — persisted optional fields
//! are defaulted once here, not at read sites.

use framecut_core::{FramecutError, Result};
use serde::{Deserialize, Serialize};

use crate::project::Project;

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Versioned project file wrapper.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectFile {
    /// Schema version for migration.
    pub version: u32,
    /// The project data.
    pub project: Project,
    /// Application version that wrote this file.
    pub app_version: String,
}

impl ProjectFile {
    /// Create a new project file from a project.
    pub fn new(project: Project) -> Self {
        Self {
            version: CURRENT_VERSION,
            project,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| FramecutError::Serialization(format!("failed to serialize project: {e}")))
    }

    /// Deserialize from JSON bytes, applying migrations and the one-shot
    /// load normalization.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_slice(data)
            .map_err(|e| FramecutError::Serialization(format!("invalid JSON: {e}")))?;

        let version = raw.get("version").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
        if version > CURRENT_VERSION {
            return Err(FramecutError::Serialization(format!(
                "project file version {version} is newer than supported version {CURRENT_VERSION}"
            )));
        }

        let migrated = migrate(raw, version)?;
        let mut file: Self = serde_json::from_value(migrated)
            .map_err(|e| FramecutError::Serialization(format!("failed to parse project: {e}")))?;
        file.project.normalize_loaded();
        Ok(file)
    }
}

/// Apply sequential migrations from `from_version` to CURRENT_VERSION.
fn migrate(mut data: serde_json::Value, from_version: u32) -> Result<serde_json::Value> {
    let mut version = from_version;

    while version < CURRENT_VERSION {
        match version {
            0 => {
                // v0 → v1: bare project payload, no wrapper
                if data.get("version").is_none() {
                    data = serde_json::json!({
                        "version": 1,
                        "project": data,
                        "app_version": "0.1.0",
                    });
                }
                version = 1;
            }
            _ => {
                return Err(FramecutError::Serialization(format!(
                    "no migration path from version {version}"
                )));
            }
        }
    }

    Ok(data)
}
