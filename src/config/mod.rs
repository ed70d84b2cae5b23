// src/config/mod.rs

//! Project file loading and validation.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a project file from disk (`loader.rs`).
//! - Validate references and section sanity (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_project_path, load_and_validate, load_from_path, load_project};
pub use model::{
    DependencyConfig, EngineSection, ProjectFile, ProjectSection, RawProjectFile, TaskConfig,
};
