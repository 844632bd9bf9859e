//! Host environment facts: operating system, distribution, shell, home
//! directory and username.
//!
//! These are detected once at the start of a resolution pass and never
//! persisted.

use crate::config::{ConfigError, SystemConfig};
use std::path::Path;

const OS_RELEASE_PATH: &str = "/etc/os-release";

/// Source of host environment facts.
pub trait Detector {
    fn detect(&self) -> Result<SystemConfig, ConfigError>;
}

/// Inspects the machine the process runs on.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostDetector;

impl Detector for HostDetector {
    fn detect(&self) -> Result<SystemConfig, ConfigError> {
        let home_dir = detect_home_dir().ok_or(ConfigError::HomeDirUnavailable)?;
        let system = SystemConfig {
            operating_system: detect_operating_system(),
            distribution: detect_distribution(),
            shell: detect_shell(),
            home_dir,
            username: detect_username(),
        };
        tracing::debug!(
            os = %system.operating_system,
            distribution = %system.distribution,
            shell = %system.shell,
            "Host environment detected"
        );
        Ok(system)
    }
}

/// A fixed set of facts. Lets callers and tests pin the home directory.
#[derive(Debug, Clone)]
pub struct StaticDetector(pub SystemConfig);

impl Detector for StaticDetector {
    fn detect(&self) -> Result<SystemConfig, ConfigError> {
        Ok(self.0.clone())
    }
}

pub fn detect_operating_system() -> String {
    std::env::consts::OS.to_string()
}

pub fn detect_distribution() -> String {
    match std::env::consts::OS {
        "linux" => std::fs::read_to_string(OS_RELEASE_PATH)
            .ok()
            .and_then(|contents| parse_os_release_name(&contents))
            .unwrap_or_default(),
        "macos" => "macOS".to_string(),
        _ => String::new(),
    }
}

pub fn detect_shell() -> String {
    let raw = if cfg!(windows) {
        std::env::var("COMSPEC")
    } else {
        std::env::var("SHELL")
    };
    raw.ok()
        .as_deref()
        .and_then(shell_name)
        .unwrap_or_default()
}

pub fn detect_home_dir() -> Option<String> {
    directories::UserDirs::new().map(|dirs| dirs.home_dir().to_string_lossy().into_owned())
}

pub fn detect_username() -> String {
    ["USER", "USERNAME", "LOGNAME"]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

/// `PRETTY_NAME`, falling back to `NAME`, from an os-release document.
fn parse_os_release_name(contents: &str) -> Option<String> {
    let lookup = |key: &str| {
        contents.lines().find_map(|line| {
            let value = line.trim().strip_prefix(key)?.strip_prefix('=')?;
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (!value.is_empty()).then(|| value.to_string())
        })
    };
    lookup("PRETTY_NAME").or_else(|| lookup("NAME"))
}

fn shell_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Path::new(trimmed)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
}
