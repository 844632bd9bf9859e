pub mod wizard;

pub use wizard::{validate_api_key, LinePrompter, Prompter, TerminalPrompter, Wizard};

use crate::config::{Config, ConfigError};
use crate::detect::HostDetector;
use crate::ui::Render;
use std::io::{self, IsTerminal};

/// Run one resolution pass against the real host, process environment and
/// standard streams.
///
/// The API key prompt uses the terminal when stdin is one, and plain line
/// reads otherwise so a key can be piped in.
pub fn load_or_init_interactive(renderer: &dyn Render) -> Result<Config, ConfigError> {
    let stdout = io::stdout();
    if io::stdin().is_terminal() {
        let mut wizard = Wizard::new(TerminalPrompter, renderer, stdout.lock());
        Config::load_or_init(&HostDetector, &mut wizard)
    } else {
        let stdin = io::stdin();
        let prompter = LinePrompter::new(stdin.lock(), io::stderr());
        let mut wizard = Wizard::new(prompter, renderer, stdout.lock());
        Config::load_or_init(&HostDetector, &mut wizard)
    }
}
