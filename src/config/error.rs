//! Configuration error types.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal failures of a resolution pass.
///
/// "Config file not found" is not represented here: it is the normal
/// first-run path and leads to the interactive bootstrap.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The host has no resolvable home directory.
    #[error("could not determine the home directory")]
    HomeDirUnavailable,

    /// The config file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The config file was read but is not valid JSON for the schema.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Reading the API key from the user failed (closed input, no terminal).
    #[error("failed to read the API key: {0}")]
    Prompt(#[source] io::Error),

    /// Something already sits at the config path; it is never overwritten.
    #[error("refusing to overwrite existing config file {}", path.display())]
    AlreadyExists { path: PathBuf },

    /// Creating the config directory or file failed.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl ConfigError {
    /// Short headline shown to the user ahead of the detailed cause.
    pub fn headline(&self) -> &'static str {
        match self {
            Self::HomeDirUnavailable | Self::Read { .. } | Self::Parse { .. } => {
                "Cannot read config."
            }
            Self::Prompt(_) => "Cannot read key.",
            Self::AlreadyExists { .. } | Self::Write { .. } | Self::Serialize(_) => {
                "Cannot save config file."
            }
        }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

/// Rejected interactive input. Recovered by re-prompting; never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiKeyError {
    #[error("Please provide an OpenAI API key.")]
    Empty,
}
