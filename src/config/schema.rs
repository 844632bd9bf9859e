use super::error::ConfigError;
use crate::detect::Detector;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const CONFIG_DIR_NAME: &str = ".config";
pub const CONFIG_FILE_NAME: &str = "hey.json";

pub const ENV_OPENAI_URL: &str = "OPENAI_URL";
pub const ENV_OPENAI_KEY: &str = "OPENAI_KEY";
pub const ENV_OPENAI_MODEL: &str = "OPENAI_MODEL";
pub const ENV_OPENAI_TEMPERATURE: &str = "OPENAI_TEMPERATURE";

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_OPENAI_TEMPERATURE: f64 = 0.2;

const TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=2.0;

// ── Resolved config ─────────────────────────────────────────────

/// Result of one resolution pass. Built once at startup, read-only after.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub system: SystemConfig,
    pub openai: OpenAiConfig,
}

/// Host facts. Re-detected on every run, never written to disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemConfig {
    pub operating_system: String,
    pub distribution: String,
    pub shell: String,
    /// Absolute path.
    pub home_dir: String,
    pub username: String,
}

#[derive(Clone, PartialEq)]
pub struct OpenAiConfig {
    pub url: String,
    pub key: String,
    pub model: String,
    pub temperature: f64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_OPENAI_URL.to_string(),
            key: String::new(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            temperature: DEFAULT_OPENAI_TEMPERATURE,
        }
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("url", &self.url)
            .field("key_configured", &!self.key.is_empty())
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

impl OpenAiConfig {
    /// Overlay `OPENAI_*` variables from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_with(|name| std::env::var(name).ok());
    }

    /// Overlay environment values obtained through `lookup`.
    ///
    /// Empty values count as unset. A temperature that does not parse or is
    /// outside `0.0..=2.0` is ignored and the current value kept.
    pub fn apply_env_overrides_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.is_empty());

        if let Some(url) = non_empty(ENV_OPENAI_URL) {
            self.url = url;
        }
        if let Some(key) = non_empty(ENV_OPENAI_KEY) {
            self.key = key;
        }
        if let Some(model) = non_empty(ENV_OPENAI_MODEL) {
            self.model = model;
        }
        if let Some(raw) = non_empty(ENV_OPENAI_TEMPERATURE) {
            match parse_temperature(&raw) {
                Some(temperature) => self.temperature = temperature,
                None => tracing::warn!(
                    value = %raw,
                    "Ignoring invalid {ENV_OPENAI_TEMPERATURE} (expected a number between 0.0 and 2.0)"
                ),
            }
        }
    }

    /// Overlay values from the config file. Only keys present in the file
    /// replace the current value.
    pub fn apply_persisted(&mut self, persisted: &PersistedSettings) {
        if let Some(url) = &persisted.openai_url {
            self.url.clone_from(url);
        }
        if let Some(key) = &persisted.openai_key {
            self.key.clone_from(key);
        }
        if let Some(model) = &persisted.openai_model {
            self.model.clone_from(model);
        }
        if let Some(temperature) = persisted.openai_temperature {
            self.temperature = temperature;
        }
    }

    /// Every setting, as written by the first-run bootstrap.
    pub fn to_persisted(&self) -> PersistedSettings {
        PersistedSettings {
            openai_url: Some(self.url.clone()),
            openai_key: Some(self.key.clone()),
            openai_model: Some(self.model.clone()),
            openai_temperature: Some(self.temperature),
        }
    }
}

fn parse_temperature(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    (value.is_finite() && TEMPERATURE_RANGE.contains(&value)).then_some(value)
}

// ── On-disk format ──────────────────────────────────────────────

/// Contents of `~/.config/hey.json`. Every key is optional on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PersistedSettings {
    /// Chat completions endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_url: Option<String>,
    /// API key sent as a bearer token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_key: Option<String>,
    /// Model identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_model: Option<String>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_temperature: Option<f64>,
}

/// Outcome of looking for the config file.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Found(PersistedSettings),
    NotFound,
}

/// `<home>/.config/hey.json`
pub fn config_path(home_dir: &Path) -> PathBuf {
    home_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)
}

/// Read and parse the config file at `path`.
///
/// A missing file is [`LoadOutcome::NotFound`]; any other read failure and
/// any parse failure is an error, and the file is left as it is.
pub fn load_persisted(path: &Path) -> Result<LoadOutcome, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No config file");
            return Ok(LoadOutcome::NotFound);
        }
        Err(e) => return Err(ConfigError::read(path, e)),
    };

    warn_if_world_readable(path);

    let parse_error = |source: serde_json::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    };

    // Track unknown keys so typos don't go unnoticed
    let mut ignored_paths: Vec<String> = Vec::new();
    let mut deserializer = serde_json::Deserializer::from_str(&contents);
    let settings: PersistedSettings = serde_ignored::deserialize(&mut deserializer, |ignored| {
        ignored_paths.push(ignored.to_string());
    })
    .map_err(parse_error)?;
    deserializer.end().map_err(parse_error)?;

    for ignored in ignored_paths {
        tracing::warn!(
            "Unknown config key ignored: \"{}\". Check {} for typos.",
            ignored,
            path.display()
        );
    }

    Ok(LoadOutcome::Found(settings))
}

fn warn_if_world_readable(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(meta) = fs::metadata(path) {
            if meta.permissions().mode() & 0o004 != 0 {
                tracing::warn!(
                    "Config file {:?} is world-readable (mode {:o}). \
                     Consider restricting with: chmod 600 {:?}",
                    path,
                    meta.permissions().mode() & 0o777,
                    path,
                );
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = path;
    }
}

/// Create the config file at `path`, which must not exist yet.
///
/// The document is written to a temporary sibling first and then linked
/// into place without replacing anything, so a concurrent writer or a stale
/// file makes this fail with [`ConfigError::AlreadyExists`].
pub fn write_new(path: &Path, settings: &PersistedSettings) -> Result<(), ConfigError> {
    let parent_dir = path.parent().ok_or_else(|| {
        ConfigError::write(path, io::Error::other("config path has no parent directory"))
    })?;

    fs::create_dir_all(parent_dir).map_err(|e| ConfigError::write(parent_dir, e))?;

    let mut contents = serde_json::to_string_pretty(settings).map_err(ConfigError::Serialize)?;
    contents.push('\n');

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(CONFIG_FILE_NAME);
    let mut temp_file = tempfile::Builder::new()
        .prefix(&format!(".{file_name}.tmp-"))
        .tempfile_in(parent_dir)
        .map_err(|e| ConfigError::write(parent_dir, e))?;

    #[cfg(unix)]
    {
        use std::{fs::Permissions, os::unix::fs::PermissionsExt};
        temp_file
            .as_file()
            .set_permissions(Permissions::from_mode(0o600))
            .map_err(|e| ConfigError::write(temp_file.path(), e))?;
    }

    temp_file
        .write_all(contents.as_bytes())
        .map_err(|e| ConfigError::write(temp_file.path(), e))?;
    temp_file
        .as_file()
        .sync_all()
        .map_err(|e| ConfigError::write(temp_file.path(), e))?;

    // The temporary file is removed when the error is dropped.
    temp_file.persist_noclobber(path).map_err(|e| {
        if e.error.kind() == io::ErrorKind::AlreadyExists {
            ConfigError::AlreadyExists {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::write(path, e.error)
        }
    })?;

    sync_directory(parent_dir)?;

    tracing::info!(path = %path.display(), "Config file created");
    Ok(())
}

fn sync_directory(path: &Path) -> Result<(), ConfigError> {
    #[cfg(unix)]
    {
        let dir = fs::File::open(path).map_err(|e| ConfigError::write(path, e))?;
        dir.sync_all().map_err(|e| ConfigError::write(path, e))?;
        Ok(())
    }

    #[cfg(not(unix))]
    {
        let _ = path;
        Ok(())
    }
}

// ── Resolution pass ─────────────────────────────────────────────

/// The interactive half of a first run: asks for the API key and reports
/// the file it ended up in.
pub trait FirstRun {
    /// Return a validated, non-empty API key.
    fn collect_api_key(&mut self, system: &SystemConfig) -> Result<String, ConfigError>;

    /// Called once the new config file is on disk. Best-effort: the file
    /// exists whether or not the confirmation reaches the user.
    fn config_created(&mut self, path: &Path);
}

impl Config {
    /// Resolve defaults, process environment and `~/.config/hey.json`,
    /// running `first_run` when the file does not exist yet.
    pub fn load_or_init(
        detector: &dyn Detector,
        first_run: &mut dyn FirstRun,
    ) -> Result<Self, ConfigError> {
        Self::load_or_init_with(detector, |name| std::env::var(name).ok(), first_run)
    }

    /// [`Config::load_or_init`] with an explicit environment lookup.
    pub fn load_or_init_with<F>(
        detector: &dyn Detector,
        env_lookup: F,
        first_run: &mut dyn FirstRun,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let system = detector.detect()?;
        let config_path = config_path(Path::new(&system.home_dir));

        let mut openai = OpenAiConfig::default();
        openai.apply_env_overrides_with(env_lookup);

        let initialized = match load_persisted(&config_path)? {
            LoadOutcome::Found(persisted) => {
                openai.apply_persisted(&persisted);
                false
            }
            LoadOutcome::NotFound => {
                // The typed key wins over OPENAI_KEY.
                openai.key = first_run.collect_api_key(&system)?;
                write_new(&config_path, &openai.to_persisted())?;
                first_run.config_created(&config_path);
                true
            }
        };

        tracing::info!(
            path = %config_path.display(),
            initialized,
            model = %openai.model,
            "Config loaded"
        );

        Ok(Self { system, openai })
    }

    pub fn config_path(&self) -> PathBuf {
        config_path(Path::new(&self.system.home_dir))
    }
}
