use crate::config::{ApiKeyError, ConfigError, FirstRun, SystemConfig};
use crate::ui::{MessageKind, Render};
use dialoguer::Input;
use std::io::{self, BufRead, Write};
use std::path::Path;

pub const API_KEY_PROMPT: &str = "OpenAI API key";
pub const API_KEY_URL: &str = "https://platform.openai.com/account/api-keys";

// ── Prompt primitives ────────────────────────────────────────────

/// Reads one line of user input.
pub trait Prompter {
    fn read_line(&mut self, label: &str) -> io::Result<String>;
}

/// Interactive terminal prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn read_line(&mut self, label: &str) -> io::Result<String> {
        Input::<String>::new()
            .with_prompt(label)
            .allow_empty(true)
            .interact_text()
            .map_err(io::Error::other)
    }
}

/// Line-oriented prompt over arbitrary streams (piped stdin, tests).
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn read_line(&mut self, label: &str) -> io::Result<String> {
        write!(self.output, "{label}: ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before an API key was entered",
            ));
        }
        let trimmed_len = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed_len);
        Ok(line)
    }
}

/// Trim and reject blank keys.
pub fn validate_api_key(input: &str) -> Result<String, ApiKeyError> {
    let key = input.trim();
    if key.is_empty() {
        return Err(ApiKeyError::Empty);
    }
    Ok(key.to_string())
}

// ── First-run wizard ─────────────────────────────────────────────

/// Greets the user, asks for the API key until a non-blank one is given and
/// reports where the config was saved.
pub struct Wizard<'r, P, W> {
    prompter: P,
    renderer: &'r dyn Render,
    out: W,
}

impl<'r, P: Prompter, W: Write> Wizard<'r, P, W> {
    pub fn new(prompter: P, renderer: &'r dyn Render, out: W) -> Self {
        Self {
            prompter,
            renderer,
            out,
        }
    }

    fn print_welcome(&mut self, username: &str) -> io::Result<()> {
        let name = if username.is_empty() {
            "there"
        } else {
            username
        };
        writeln!(self.out)?;
        writeln!(self.out, "Hey {name}!")?;
        writeln!(
            self.out,
            "To be able to help you, I will need an {}",
            self.renderer.render(MessageKind::Warning, "OpenAI API key.")
        )?;
        writeln!(
            self.out,
            "{}",
            self.renderer.render(
                MessageKind::Help,
                &format!("You can create one at {API_KEY_URL}")
            )
        )?;
        self.out.flush()
    }

    fn print_line(&mut self, kind: MessageKind, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", self.renderer.render(kind, text))?;
        self.out.flush()
    }
}

impl<P: Prompter, W: Write> FirstRun for Wizard<'_, P, W> {
    fn collect_api_key(&mut self, system: &SystemConfig) -> Result<String, ConfigError> {
        self.print_welcome(&system.username)
            .map_err(ConfigError::Prompt)?;

        loop {
            let raw = self
                .prompter
                .read_line(API_KEY_PROMPT)
                .map_err(ConfigError::Prompt)?;
            match validate_api_key(&raw) {
                Ok(key) => return Ok(key),
                Err(rejected) => {
                    tracing::debug!("Rejected blank API key input");
                    self.print_line(MessageKind::Warning, &rejected.to_string())
                        .map_err(ConfigError::Prompt)?;
                }
            }
        }
    }

    fn config_created(&mut self, path: &Path) {
        let announced = self
            .print_line(
                MessageKind::Success,
                &format!("Creating config file in: {}.", path.display()),
            )
            .and_then(|()| writeln!(self.out));
        if let Err(e) = announced {
            tracing::warn!(path = %path.display(), "Could not print config file location: {e}");
        }
    }
}
