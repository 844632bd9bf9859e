//! Startup configuration for the `hey` terminal assistant.
//!
//! A resolution pass merges built-in defaults, `OPENAI_*` environment
//! variables and `~/.config/hey.json` (in that order of precedence) into a
//! [`Config`]. When the file does not exist yet, the user is asked for an
//! API key and the file is created.

pub mod config;
pub mod detect;
pub mod onboard;
pub mod ui;

pub use config::{Config, ConfigError, OpenAiConfig, SystemConfig};
