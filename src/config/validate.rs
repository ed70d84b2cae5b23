// src/config/validate.rs

use std::collections::HashSet;

use crate::config::model::{ProjectFile, RawProjectFile};
use crate::errors::{PronaflowError, Result};

impl TryFrom<RawProjectFile> for ProjectFile {
    type Error = PronaflowError;

    fn try_from(raw: RawProjectFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_project(&raw)?;
        Ok(ProjectFile::new_unchecked(raw))
    }
}

fn validate_raw_project(cfg: &RawProjectFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_project_section(cfg)?;
    validate_task_references(cfg)?;
    validate_explicit_dependencies(cfg)?;
    Ok(())
}

fn ensure_has_tasks(cfg: &RawProjectFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(PronaflowError::ConfigError(
            "project file must contain at least one [task.<id>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_project_section(cfg: &RawProjectFile) -> Result<()> {
    if cfg.project.id.trim().is_empty() {
        return Err(PronaflowError::ConfigError(
            "[project].id must not be empty".to_string(),
        ));
    }

    if let Some(deadline) = cfg.project.deadline {
        if deadline < cfg.project.start {
            return Err(PronaflowError::ConfigError(format!(
                "[project].deadline ({deadline}) is before [project].start ({})",
                cfg.project.start
            )));
        }
    }

    if cfg.engine.channel_capacity == 0 {
        return Err(PronaflowError::ConfigError(
            "[engine].channel_capacity must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_task_references(cfg: &RawProjectFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        for dep in task.after.iter() {
            if !cfg.task.contains_key(dep) {
                return Err(PronaflowError::ConfigError(format!(
                    "task '{}' has unknown dependency '{}' in `after`",
                    name, dep
                )));
            }
            if dep == name {
                return Err(PronaflowError::ConfigError(format!(
                    "task '{}' cannot depend on itself in `after`",
                    name
                )));
            }
        }
    }
    Ok(())
}

fn validate_explicit_dependencies(cfg: &RawProjectFile) -> Result<()> {
    let mut seen = HashSet::new();

    for dep in cfg.dependency.iter() {
        for end in [&dep.predecessor, &dep.successor] {
            if !cfg.task.contains_key(end) {
                return Err(PronaflowError::ConfigError(format!(
                    "[[dependency]] {} -> {} references unknown task '{}'",
                    dep.predecessor, dep.successor, end
                )));
            }
        }
        if dep.predecessor == dep.successor {
            return Err(PronaflowError::ConfigError(format!(
                "task '{}' cannot depend on itself in [[dependency]]",
                dep.predecessor
            )));
        }
        if !seen.insert((&dep.predecessor, &dep.successor, dep.kind)) {
            return Err(PronaflowError::ConfigError(format!(
                "[[dependency]] {} -> {} ({}) is listed twice",
                dep.predecessor, dep.successor, dep.kind
            )));
        }
    }
    Ok(())
}
