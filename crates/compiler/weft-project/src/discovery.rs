use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, trace};

use crate::{Project, WeftToml};

/// File name of a project manifest
pub const MANIFEST_FILE_NAME: &str = "weft.toml";

/// Discovers a Weft project from a given path
///
/// This function will:
/// 1. Search upward from the given path to find a weft.toml file
/// 2. Parse the manifest to get project configuration
/// 3. Return a Project struct with all necessary information
///
/// ## Arguments
/// * `start_path` - Path to start searching from (can be a file or directory)
///
/// ## Returns
/// * `Ok(Some(Project))` if a project is found
/// * `Ok(None)` if no project is found
/// * `Err` if a manifest was found but could not be loaded
pub fn discover_project(start_path: &Path) -> Result<Option<Project>> {
    let manifest_path = find_project_manifest(start_path)?;

    match manifest_path {
        Some(manifest_path) => {
            debug!("Found project manifest at: {}", manifest_path.display());
            let project = load_project_from_manifest(&manifest_path)?;
            Ok(Some(project))
        }
        None => {
            trace!(
                "No project manifest found starting from: {}",
                start_path.display()
            );
            Ok(None)
        }
    }
}

/// Find the project manifest (weft.toml) starting from a given path
fn find_project_manifest(start_path: &Path) -> Result<Option<PathBuf>> {
    let start_dir = if start_path.is_file() {
        start_path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Invalid file path: no parent directory"))?
    } else {
        start_path
    };

    let mut current = start_dir;

    loop {
        let manifest_path = current.join(MANIFEST_FILE_NAME);
        if manifest_path.is_file() {
            return Ok(Some(manifest_path));
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return Ok(None),
        }
    }
}

/// Load a project from its manifest file
fn load_project_from_manifest(manifest_path: &Path) -> Result<Project> {
    let manifest = WeftToml::from_path(manifest_path)
        .with_context(|| format!("Failed to parse manifest at {}", manifest_path.display()))?;

    let root_directory = manifest_path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Manifest has no parent directory"))?
        .to_owned();

    Ok(Project {
        manifest_path: manifest_path.to_owned(),
        root_directory,
        name: manifest.project.name,
        version: manifest.project.version,
        codegen: manifest.codegen,
    })
}
