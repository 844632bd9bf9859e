use hey::config::{config_path, Config, ConfigError, PersistedSettings, SystemConfig};
use hey::detect::StaticDetector;
use hey::onboard::{LinePrompter, Wizard};
use hey::ui::PlainRenderer;
use std::fs;
use std::io::{self, Cursor, Write};
use std::path::Path;
use tempfile::TempDir;

fn detector_for(home: &Path) -> StaticDetector {
    StaticDetector(SystemConfig {
        operating_system: "linux".into(),
        distribution: "Fedora Linux 40".into(),
        shell: "zsh".into(),
        home_dir: home.to_string_lossy().into_owned(),
        username: "grace".into(),
    })
}

fn no_env(_: &str) -> Option<String> {
    None
}

/// Run a resolution pass with `typed` as the user's input. Returns the
/// result together with everything printed to the user.
fn run(home: &Path, typed: &str) -> (Result<Config, ConfigError>, String) {
    let renderer = PlainRenderer;
    let mut out = Vec::new();
    let prompter = LinePrompter::new(Cursor::new(typed.as_bytes().to_vec()), Vec::new());
    let mut wizard = Wizard::new(prompter, &renderer, &mut out);
    let result = Config::load_or_init_with(&detector_for(home), no_env, &mut wizard);
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn first_run_persists_typed_key_with_resolved_defaults() {
    let home = TempDir::new().unwrap();

    let (result, printed) = run(home.path(), "sk-test123\n");
    let config = result.unwrap();

    assert_eq!(config.openai.key, "sk-test123");
    assert!(printed.contains("Hey grace!"));
    assert!(printed.contains("Creating config file in:"));

    let raw = fs::read_to_string(config_path(home.path())).unwrap();
    let written: PersistedSettings = serde_json::from_str(&raw).unwrap();
    assert_eq!(written, config.openai.to_persisted());
}

#[test]
fn whitespace_only_input_creates_no_file() {
    let home = TempDir::new().unwrap();

    let (result, printed) = run(home.path(), "   \n");

    assert!(matches!(result, Err(ConfigError::Prompt(_))));
    assert!(printed.contains("Please provide an OpenAI API key."));
    assert!(!config_path(home.path()).exists());
}

#[test]
fn second_run_uses_persisted_key_without_prompting() {
    let home = TempDir::new().unwrap();
    run(home.path(), "sk-first\n").0.unwrap();

    // No input at all: any prompt would fail with a closed stream.
    let (result, printed) = run(home.path(), "");
    let config = result.unwrap();

    assert_eq!(config.openai.key, "sk-first");
    assert!(!printed.contains("Hey grace!"));
}

#[test]
fn unparseable_file_is_reported_and_left_alone() {
    let home = TempDir::new().unwrap();
    let path = config_path(home.path());
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "{\"openai_key\": ").unwrap();

    let (result, printed) = run(home.path(), "sk-unused\n");

    let err = result.unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert_eq!(err.headline(), "Cannot read config.");
    assert!(printed.is_empty());
    assert_eq!(fs::read_to_string(&path).unwrap(), "{\"openai_key\": ");
}

/// Standard output that stops accepting data once the key has been read.
struct ClosesBeforeConfirmation(Vec<u8>);

impl Write for ClosesBeforeConfirmation {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if String::from_utf8_lossy(buf).contains("Creating config file") {
            return Err(io::Error::from(io::ErrorKind::BrokenPipe));
        }
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn first_run_succeeds_when_confirmation_cannot_be_printed() {
    let home = TempDir::new().unwrap();
    let renderer = PlainRenderer;
    let mut out = ClosesBeforeConfirmation(Vec::new());
    let prompter = LinePrompter::new(Cursor::new(b"sk-test123\n".to_vec()), Vec::new());
    let mut wizard = Wizard::new(prompter, &renderer, &mut out);

    let config = Config::load_or_init_with(&detector_for(home.path()), no_env, &mut wizard).unwrap();

    assert_eq!(config.openai.key, "sk-test123");
    let written: PersistedSettings =
        serde_json::from_str(&fs::read_to_string(config_path(home.path())).unwrap()).unwrap();
    assert_eq!(written.openai_key.as_deref(), Some("sk-test123"));
}
