use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::project::ProjectLayout;

/// Everything the actions need to know about where things live. Built once per run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AdminConfig {
    #[serde(default)]
    pub frontend: FrontendConfig,

    #[serde(default)]
    pub backend: BackendConfig,

    /// Package-manager update command, run in the project root and in the backend directory.
    #[serde(default = "default_update_command")]
    pub update_command: Vec<String>,

    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            frontend: FrontendConfig::default(),
            backend: BackendConfig::default(),
            update_command: default_update_command(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

fn default_update_command() -> Vec<String> {
    argv(&["npm", "update"])
}

fn default_http_timeout_secs() -> u64 {
    10
}

const GITHUB_USERNAME: &str = "HikingHacker";
const REPO_NAME: &str = "Resume-Improvement-App";
const HEROKU_APP_NAME: &str = "resume-improvement-api-b20bfe5902cf";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FrontendConfig {
    /// Public GitHub Pages URL.
    #[serde(default = "default_pages_url")]
    pub pages_url: String,

    /// Repository `gh-pages` publishes to.
    #[serde(default = "default_pages_repo_url")]
    pub pages_repo_url: String,

    /// Directory the build writes and the publisher uploads.
    #[serde(default = "default_build_dir")]
    pub build_dir: String,

    #[serde(default = "default_build_command")]
    pub build_command: Vec<String>,

    /// Publisher command; `-d <build_dir> -r <pages_repo_url>` is appended.
    #[serde(default = "default_publish_command")]
    pub publish_command: Vec<String>,
}

fn default_pages_url() -> String {
    format!("https://{GITHUB_USERNAME}.github.io/{REPO_NAME}")
}
fn default_pages_repo_url() -> String {
    format!("git@github.com:{GITHUB_USERNAME}/{REPO_NAME}.git")
}
fn default_build_dir() -> String {
    "build".to_string()
}
fn default_build_command() -> Vec<String> {
    argv(&["npm", "run", "build"])
}
fn default_publish_command() -> Vec<String> {
    argv(&["npx", "gh-pages"])
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            pages_url: default_pages_url(),
            pages_repo_url: default_pages_repo_url(),
            build_dir: default_build_dir(),
            build_command: default_build_command(),
            publish_command: default_publish_command(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    #[serde(default = "default_backend_url")]
    pub url: String,

    #[serde(default = "default_health_path")]
    pub health_path: String,

    /// Git remote that deploys on push.
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_branch")]
    pub branch: String,

    /// Backend sources, relative to the project root.
    #[serde(default = "default_backend_dir")]
    pub dir: String,
}

fn default_backend_url() -> String {
    format!("https://{HEROKU_APP_NAME}.herokuapp.com")
}
fn default_health_path() -> String {
    "/api/health".to_string()
}
fn default_remote() -> String {
    "heroku".to_string()
}
fn default_branch() -> String {
    "main".to_string()
}
fn default_backend_dir() -> String {
    "server".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            health_path: default_health_path(),
            remote: default_remote(),
            branch: default_branch(),
            dir: default_backend_dir(),
        }
    }
}

impl BackendConfig {
    pub fn health_url(&self) -> String {
        format!("{}{}", self.url.trim_end_matches('/'), self.health_path)
    }
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

pub fn load_yaml<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_yaml::from_str(&data).with_context(|| format!("parse yaml {}", path.display()))
}

/// Reads `admin.yaml` from the project root, or returns the built-in defaults when it is absent.
pub fn load(layout: &ProjectLayout) -> Result<AdminConfig> {
    let path = layout.config_file();
    if !path.exists() {
        return Ok(AdminConfig::default());
    }
    load_yaml(&path).with_context(|| format!("load {}", path.display()))
}
