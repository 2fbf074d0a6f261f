//! Stack configuration
//!
//! Loaded from `~/.config/mailstack/config.toml` (or `-c PATH`). Every field
//! has a default, so a missing file or a partial file is fine. Command-line
//! and environment overrides are applied on top via [`Overrides`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::resource::AttributeType;

const CONFIG_FILE: &str = "config.toml";

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("mailstack"))
}

/// Resolve the config file path: `path` with `~` expanded, or the default
pub fn config_path(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(p) => Ok(expand_path(&p.to_string_lossy())),
        None => Ok(config_dir()?.join(CONFIG_FILE)),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    pub stack: StackSection,
    pub function: FunctionSection,
    pub table: TableSection,
    pub output: OutputSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackSection {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Bucket the artifact is uploaded to; derived from account/region if unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_bucket: Option<String>,
}

impl Default for StackSection {
    fn default() -> Self {
        Self {
            name: "DeploymentStack".to_string(),
            description: None,
            account: None,
            region: None,
            asset_bucket: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionSection {
    pub artifact: String,
    pub runtime: String,
    pub handler: String,
}

impl Default for FunctionSection {
    fn default() -> Self {
        Self {
            artifact: "target/lambda/testing-rust-email-lambda".to_string(),
            runtime: "provided.al2023".to_string(),
            handler: "whatev".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSection {
    pub name: String,
    pub partition_key: String,
    pub partition_key_type: AttributeType,
}

impl Default for TableSection {
    fn default() -> Self {
        Self {
            name: "Emails".to_string(),
            partition_key: "Id".to_string(),
            partition_key_type: AttributeType::String,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Directory the cloud assembly is written to
    pub dir: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: "cdk.out".to_string(),
        }
    }
}

/// Values given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub stack_name: Option<String>,
    pub account: Option<String>,
    pub region: Option<String>,
    pub artifact: Option<String>,
    pub runtime: Option<String>,
    pub handler: Option<String>,
}

impl StackConfig {
    /// Load from `path`
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, self.to_toml()?)
            .with_context(|| format!("Could not write {}", path.display()))
    }

    /// Apply overrides; unset overrides keep the file value
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(name) = overrides.stack_name {
            self.stack.name = name;
        }
        if overrides.account.is_some() {
            self.stack.account = overrides.account;
        }
        if overrides.region.is_some() {
            self.stack.region = overrides.region;
        }
        if let Some(artifact) = overrides.artifact {
            self.function.artifact = artifact;
        }
        if let Some(runtime) = overrides.runtime {
            self.function.runtime = runtime;
        }
        if let Some(handler) = overrides.handler {
            self.function.handler = handler;
        }
    }

    /// Artifact path with `~` expanded
    pub fn artifact_path(&self) -> PathBuf {
        expand_path(&self.function.artifact)
    }

    /// Output directory with `~` expanded
    pub fn output_dir(&self) -> PathBuf {
        expand_path(&self.output.dir)
    }
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}
