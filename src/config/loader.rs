// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ProjectFile, RawProjectFile};
use crate::engine::ProjectGraph;
use crate::errors::Result;

/// Load a project file from a given path and return the raw `RawProjectFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawProjectFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let project: RawProjectFile = toml::from_str(&contents)?;

    Ok(project)
}

/// Load a project file from path and run validation.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks for:
///   - unknown task references,
///   - self dependencies and repeated `[[dependency]]` entries,
///   - project/engine section sanity.
///
/// Cycles are caught later by [`load_project`], which feeds every edge
/// through the dependency validator and reports the offending path.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ProjectFile> {
    let raw = load_from_path(&path)?;
    let project = ProjectFile::try_from(raw)?;
    Ok(project)
}

/// Load, validate and build the project graph in one go.
pub fn load_project(path: impl AsRef<Path>) -> Result<(ProjectFile, ProjectGraph)> {
    let project = load_and_validate(path)?;
    let graph = project.build_graph()?;
    Ok((project, graph))
}

/// Default project file location: `Project.toml` in the current directory.
pub fn default_project_path() -> PathBuf {
    PathBuf::from("Project.toml")
}
