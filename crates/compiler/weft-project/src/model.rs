use std::path::PathBuf;

use crate::manifest::CodegenSettings;

/// Represents a Weft project on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// Path to the project manifest (weft.toml)
    pub manifest_path: PathBuf,
    /// Root directory of the project
    pub root_directory: PathBuf,
    /// Name of the project
    pub name: String,
    pub version: String,
    pub codegen: CodegenSettings,
}

impl Project {
    /// Where generated code goes
    pub fn output_directory(&self) -> PathBuf {
        self.root_directory.join(&self.codegen.out_dir)
    }
}
