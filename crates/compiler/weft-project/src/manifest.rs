use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

/// Contents of a `weft.toml` file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeftToml {
    pub project: ProjectManifest,
    #[serde(default)]
    pub codegen: CodegenSettings,
}

/// The `[project]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectManifest {
    /// Name of the application
    pub name: String,
    /// Version of the application
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

/// The `[codegen]` table. The compiler core never interprets these settings;
/// it hands them to the code generators next to the tier specs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CodegenSettings {
    /// Output directory, relative to the project root
    pub out_dir: PathBuf,
    /// Port of the generated API server
    pub server_port: u16,
    pub database: Database,
}

impl Default for CodegenSettings {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from(".weft/out"),
            server_port: 3001,
            database: Database::Sqlite,
        }
    }
}

/// Database engine targeted by the generated schema
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    #[default]
    Sqlite,
    Postgresql,
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite => write!(f, "sqlite"),
            Self::Postgresql => write!(f, "postgresql"),
        }
    }
}

impl WeftToml {
    /// Load manifest from a file path
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_file_content(&content)
    }

    pub fn from_file_content(content: &str) -> anyhow::Result<Self> {
        let manifest: Self = toml::from_str(content).map_err(|e| {
            tracing::error!("Failed to parse TOML: {}", e);
            e
        })?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.project.name.trim().is_empty() {
            bail!("project name must not be empty");
        }
        if self.codegen.server_port == 0 {
            bail!("codegen.server_port must be a non-zero port");
        }
        if self.codegen.out_dir.is_absolute() {
            bail!(
                "codegen.out_dir must be relative to the project root, got {}",
                self.codegen.out_dir.display()
            );
        }
        Ok(())
    }
}
