#![cfg(unix)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn config_file(home: &Path) -> PathBuf {
    home.join(".config").join("hey.json")
}

/// Run the `hey` binary with `home` as `$HOME`, feeding `stdin` to it.
fn hey(home: &Path, args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_hey"))
        .args(args)
        .env("HOME", home)
        .env_remove("OPENAI_URL")
        .env_remove("OPENAI_KEY")
        .env_remove("OPENAI_MODEL")
        .env_remove("OPENAI_TEMPERATURE")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn hey");
    // hey may exit before reading anything (e.g. on a corrupt config).
    if let Err(e) = child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
    {
        assert_eq!(e.kind(), std::io::ErrorKind::BrokenPipe, "write stdin: {e}");
    }
    child.wait_with_output().expect("wait for hey")
}

#[test]
fn corrupt_config_is_reported_on_stderr_and_exits_non_zero() {
    let home = TempDir::new().unwrap();
    let path = config_file(home.path());
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "{ not json").unwrap();

    let output = hey(home.path(), &[], "sk-unused\n");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Cannot read config."), "{stderr}");
    assert!(!stderr.contains('\u{1b}'), "stderr should carry no colour codes: {stderr}");
    assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
}

#[test]
fn piped_key_creates_config_and_exits_zero() {
    let home = TempDir::new().unwrap();

    let output = hey(home.path(), &[], "sk-test123\n");

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Creating config file in:"), "{stdout}");
    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(config_file(home.path())).unwrap()).unwrap();
    assert_eq!(written["openai_key"], "sk-test123");
}

#[test]
fn closed_stdin_on_first_run_exits_non_zero_without_file() {
    let home = TempDir::new().unwrap();

    let output = hey(home.path(), &[], "   \n");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Cannot read key."));
    assert!(!config_file(home.path()).exists());
}

#[test]
fn config_show_reads_existing_file_without_prompting() {
    let home = TempDir::new().unwrap();
    let path = config_file(home.path());
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, r#"{"openai_key": "sk-file", "openai_model": "gpt-4"}"#).unwrap();

    let output = hey(home.path(), &["config", "show"], "");

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("OpenAI key:       configured"), "{stdout}");
    assert!(stdout.contains("OpenAI model:     gpt-4"), "{stdout}");
    assert!(!stdout.contains("sk-file"));
}
