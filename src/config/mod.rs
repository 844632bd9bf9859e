pub mod error;
pub mod schema;

pub use error::{ApiKeyError, ConfigError};
pub use schema::{
    config_path, load_persisted, write_new, Config, FirstRun, LoadOutcome, OpenAiConfig,
    PersistedSettings, SystemConfig, CONFIG_FILE_NAME, DEFAULT_OPENAI_MODEL,
    DEFAULT_OPENAI_TEMPERATURE, DEFAULT_OPENAI_URL, ENV_OPENAI_KEY, ENV_OPENAI_MODEL,
    ENV_OPENAI_TEMPERATURE, ENV_OPENAI_URL,
};
