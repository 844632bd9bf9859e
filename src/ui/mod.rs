//! Terminal message rendering.
//!
//! Every user-facing line the config resolver prints goes through one of four
//! channels. The resolver only asks for a display-ready string; colour and
//! emphasis rules live here.

use console::Style;

/// Which channel a message is rendered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Warning,
    Error,
    Help,
}

/// Turns a plain message into a display-ready string.
pub trait Render {
    fn render(&self, kind: MessageKind, text: &str) -> String;
}

/// Colourised output for an interactive terminal.
#[derive(Debug, Clone)]
pub struct ConsoleRenderer {
    success: Style,
    warning: Style,
    error: Style,
    help: Style,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self {
            success: Style::new().green().bold(),
            warning: Style::new().yellow().bold(),
            error: Style::new().red().bold(),
            help: Style::new().dim().italic(),
        }
    }

    /// Styles that follow stderr's colour support instead of stdout's.
    pub fn for_stderr() -> Self {
        let stdout = Self::new();
        Self {
            success: stdout.success.for_stderr(),
            warning: stdout.warning.for_stderr(),
            error: stdout.error.for_stderr(),
            help: stdout.help.for_stderr(),
        }
    }

    fn style_for(&self, kind: MessageKind) -> &Style {
        match kind {
            MessageKind::Success => &self.success,
            MessageKind::Warning => &self.warning,
            MessageKind::Error => &self.error,
            MessageKind::Help => &self.help,
        }
    }
}

impl Default for ConsoleRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Render for ConsoleRenderer {
    fn render(&self, kind: MessageKind, text: &str) -> String {
        self.style_for(kind).apply_to(text).to_string()
    }
}

/// Passes text through untouched. Used when stdout is not a terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainRenderer;

impl Render for PlainRenderer {
    fn render(&self, _kind: MessageKind, text: &str) -> String {
        text.to_string()
    }
}

/// Pick a renderer for the current stdout.
pub fn renderer_for_stdout() -> Box<dyn Render> {
    if console::colors_enabled() {
        Box::new(ConsoleRenderer::new())
    } else {
        Box::new(PlainRenderer)
    }
}

/// Pick a renderer for the current stderr.
pub fn renderer_for_stderr() -> Box<dyn Render> {
    if console::colors_enabled_stderr() {
        Box::new(ConsoleRenderer::for_stderr())
    } else {
        Box::new(PlainRenderer)
    }
}
