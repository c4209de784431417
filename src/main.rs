use anyhow::Result;
use clap::Parser;
use owo_colors::OwoColorize;
use voxrelay::app::run_stream_command;
use voxrelay::cli::{Cli, Commands, ConfigAction};
use voxrelay::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Config {
            action: ConfigAction::Dump,
        }) => {
            print!("{}", Config::dump_template());
        }
        None => {
            if cli.file.is_none() {
                eprintln!("{}", "Error: no audio file given".red());
                eprintln!("Usage: voxrelay <FILE> [OPTIONS]");
                std::process::exit(2);
            }
            let config = load_config(cli.config.as_deref())?;
            if let Err(e) = run_stream_command(config, &cli).await {
                eprintln!("{}", format!("Error: {}", e).red());
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/voxrelay/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)?
    } else {
        Config::load_or_default(&Config::default_path())?
    };

    Ok(config.with_env_overrides())
}
