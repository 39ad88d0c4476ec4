use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::AdminConfig;

#[derive(Debug, Clone)]
pub struct ProjectLayout {
    pub root: PathBuf,
}

impl ProjectLayout {
    pub fn config_file(&self) -> PathBuf {
        self.root.join("admin.yaml")
    }
    pub fn backend_dir(&self, config: &AdminConfig) -> PathBuf {
        self.root.join(&config.backend.dir)
    }
    pub fn git_dir(&self) -> PathBuf {
        self.root.join(".git")
    }
}

/// Walks up from `start` to the first directory holding `admin.yaml` or a `.git` entry.
pub fn discover_project_root(start: &Path) -> Option<PathBuf> {
    let mut cur = Some(start);
    while let Some(p) = cur {
        let layout = ProjectLayout {
            root: p.to_path_buf(),
        };
        if layout.config_file().is_file() || layout.git_dir().exists() {
            return Some(layout.root);
        }
        cur = p.parent();
    }
    None
}

pub fn load_layout(project_override: Option<PathBuf>) -> Result<ProjectLayout> {
    if let Some(p) = project_override {
        if !p.is_dir() {
            anyhow::bail!("--project {} is not a directory", p.display());
        }
        return Ok(ProjectLayout { root: p });
    }

    let cwd = std::env::current_dir().context("get current working directory")?;
    let root = discover_project_root(&cwd).unwrap_or(cwd);
    Ok(ProjectLayout { root })
}
