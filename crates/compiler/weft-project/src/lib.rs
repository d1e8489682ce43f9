//! # Weft Projects
//!
//! Locates a `weft.toml` manifest and turns it into a [`Project`] carrying the
//! code generation settings that the compiler hands on unchanged.

mod discovery;
mod manifest;
mod model;

pub use discovery::{discover_project, MANIFEST_FILE_NAME};
pub use manifest::{CodegenSettings, Database, ProjectManifest, WeftToml};
pub use model::Project;
