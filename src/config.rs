//! Build configuration loaded from YAML.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// One region build: which lists to read and where to write the artifacts.
///
/// ```yaml
/// name: euro
/// inputs:
///   - euro_v4.txt
///   - euro_v6.txt.gz
/// output-dir: output
/// prefix-lists: true
/// report: true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildConfig {
    /// Artifact file stem
    pub name: String,
    /// CIDR list files, relative to the config file
    pub inputs: Vec<PathBuf>,
    /// Output directory, relative to the config file
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Also write the fixed-width prefix lists
    #[serde(default = "default_true")]
    pub prefix_lists: bool,
    /// Also write the JSON build report
    #[serde(default = "default_true")]
    pub report: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_true() -> bool {
    true
}

impl BuildConfig {
    /// Parse a config from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, resolving relative paths against its directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Self::from_yaml(&fs::read_to_string(path)?)?;
        if let Some(base) = path.parent() {
            config.resolve(base);
        }
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Config("name must not be empty".to_string()));
        }
        if self.name.contains(['/', '\\']) {
            return Err(Error::Config(format!("invalid name: {}", self.name)));
        }
        if self.inputs.is_empty() {
            return Err(Error::Config("at least one input is required".to_string()));
        }
        Ok(())
    }

    fn resolve(&mut self, base: &Path) {
        for input in &mut self.inputs {
            if input.is_relative() {
                *input = base.join(&*input);
            }
        }
        if self.output_dir.is_relative() {
            self.output_dir = base.join(&self.output_dir);
        }
    }
}
