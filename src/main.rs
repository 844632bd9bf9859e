use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use hey::config::{config_path, Config, PersistedSettings};
use hey::detect::detect_home_dir;
use hey::onboard::load_or_init_interactive;
use hey::ui::{renderer_for_stderr, renderer_for_stdout, MessageKind, Render};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Terminal assistant backed by an OpenAI-compatible chat endpoint.
#[derive(Parser, Debug)]
#[command(name = "hey", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
    /// Print shell completions to stdout
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Resolve and print the configuration (API key redacted)
    Show,
    /// Print the config file location
    Path,
    /// Print the JSON Schema of the config file
    Schema,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let renderer = renderer_for_stdout();

    match cli.command {
        None => {
            let config = resolve_or_exit(renderer.as_ref());
            print_ready(renderer.as_ref(), &config);
        }
        Some(Commands::Config { action }) => match action {
            ConfigCommands::Show => {
                let config = resolve_or_exit(renderer.as_ref());
                print_config(&config);
            }
            ConfigCommands::Path => {
                let home = detect_home_dir()
                    .ok_or_else(|| anyhow::anyhow!("could not determine the home directory"))?;
                println!("{}", config_path(Path::new(&home)).display());
            }
            ConfigCommands::Schema => {
                let schema = schemars::schema_for!(PersistedSettings);
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
        },
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "hey", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Every resolution failure is terminal: report it once, exit non-zero.
fn resolve_or_exit(renderer: &dyn Render) -> Config {
    match load_or_init_interactive(renderer) {
        Ok(config) => config,
        Err(e) => {
            let stderr = renderer_for_stderr();
            eprintln!(
                "{}",
                stderr.render(MessageKind::Error, &format!("{} {e}", e.headline()))
            );
            std::process::exit(1);
        }
    }
}

fn print_ready(renderer: &dyn Render, config: &Config) {
    if config.openai.key.is_empty() {
        println!(
            "{}",
            renderer.render(
                MessageKind::Warning,
                &format!(
                    "No OpenAI API key in {}. Set openai_key there or export OPENAI_KEY.",
                    config.config_path().display()
                )
            )
        );
        return;
    }
    println!(
        "{}",
        renderer.render(
            MessageKind::Success,
            &format!("Ready ({} @ {}).", config.openai.model, config.openai.url)
        )
    );
    println!(
        "{}",
        renderer.render(MessageKind::Help, "Run `hey config show` to inspect the configuration.")
    );
}

fn print_config(config: &Config) {
    let system = &config.system;
    let openai = &config.openai;
    println!("Config file:      {}", config.config_path().display());
    println!();
    println!("Operating system: {}", system.operating_system);
    println!("Distribution:     {}", system.distribution);
    println!("Shell:            {}", system.shell);
    println!("Home directory:   {}", system.home_dir);
    println!("Username:         {}", system.username);
    println!();
    println!("OpenAI URL:       {}", openai.url);
    println!(
        "OpenAI key:       {}",
        if openai.key.is_empty() {
            "not set"
        } else {
            "configured"
        }
    );
    println!("OpenAI model:     {}", openai.model);
    println!("Temperature:      {}", openai.temperature);
}
