//! JSON summary of a region build.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::dag::CompiledDag;
use crate::range::Family;
use crate::{Error, Result};

/// Per-family section of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyReport {
    pub family: String,
    pub ranges: usize,
    pub nodes_before: usize,
    pub nodes_after: usize,
    pub passes: usize,
    pub size: usize,
    /// SHA-256 of the DAG blob, lowercase hex
    pub sha256: String,
}

impl FamilyReport {
    pub fn new(family: Family, compiled: &CompiledDag) -> Self {
        Self {
            family: family.name().to_string(),
            ranges: compiled.stats.ranges,
            nodes_before: compiled.stats.reduce.nodes_before,
            nodes_after: compiled.stats.reduce.nodes_after,
            passes: compiled.stats.reduce.passes,
            size: compiled.stats.size,
            sha256: sha256_hex(&compiled.bytes),
        }
    }
}

/// Report written next to the artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub name: String,
    /// Unix timestamp of the build
    pub generated_at: u64,
    pub families: Vec<FamilyReport>,
}

impl BuildReport {
    pub fn new(name: &str, families: Vec<FamilyReport>) -> Self {
        Self {
            name: name.to_string(),
            generated_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            families,
        }
    }

    /// Load a report file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Pretty JSON form of the report.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Save the report as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Lowercase hex SHA-256 digest.
pub fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
