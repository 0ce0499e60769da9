//! Command-line interface for meshterm.
//!
//! This module handles CLI argument parsing and the standalone subcommands.

use crate::picker::Picker;
use crate::picker::render::render_picker;
use anyhow::Context;
use clap::{Parser, Subcommand};
use meshterm_config::Config;
use meshterm_directory::{DeviceDirectory, DirectoryClient};
use std::time::Duration;

/// meshterm - tabbed remote shells over a private overlay network
#[derive(Parser)]
#[command(name = "meshterm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level: off, error, warn, info, debug, trace (overrides RUST_LOG and config)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<log::LevelFilter>,

    /// Device directory URL (overrides config)
    #[arg(long, value_name = "URL", global = true)]
    pub directory_url: Option<String>,
}

#[derive(Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Fetch the device directory and print the picker cards
    Devices {
        /// Only show devices whose name, OS or address contains this text
        #[arg(short, long, value_name = "QUERY")]
        filter: Option<String>,

        /// Print the sorted, filtered devices as JSON instead of cards
        #[arg(long)]
        json: bool,
    },
    /// Print the config and state file locations
    ConfigPath,
}

/// Runtime options passed from CLI to the application
#[derive(Clone, Debug)]
pub struct RuntimeOptions {
    pub command: Commands,
    pub log_level: Option<log::LevelFilter>,
    pub directory_url: Option<String>,
}

/// Result of CLI processing
pub enum CliResult {
    /// Continue with normal startup
    Continue(RuntimeOptions),
    /// Exit with the given code (subcommand completed)
    Exit(i32),
}

/// Process CLI arguments and handle subcommands that need no runtime
pub fn process_cli() -> CliResult {
    let cli = Cli::parse();

    match cli.command {
        Commands::ConfigPath => {
            print_config_paths();
            CliResult::Exit(0)
        }
        command => CliResult::Continue(RuntimeOptions {
            command,
            log_level: cli.log_level,
            directory_url: cli.directory_url,
        }),
    }
}

fn print_config_paths() {
    println!("config:      {}", Config::config_path().display());
    println!("login names: {}", Config::login_names_path().display());
    println!("debug log:   {}", crate::debug::log_file_path().display());
}

/// Apply CLI overrides on top of the loaded config
pub fn apply_overrides(config: &mut Config, options: &RuntimeOptions) {
    if let Some(url) = &options.directory_url {
        config.directory_url = url.clone();
    }
}

/// Run a subcommand that needs the runtime. Returns the process exit code.
pub async fn run_command(config: &Config, options: &RuntimeOptions) -> anyhow::Result<i32> {
    match &options.command {
        Commands::Devices { filter, json } => {
            list_devices(config, filter.as_deref(), *json).await
        }
        Commands::ConfigPath => {
            print_config_paths();
            Ok(0)
        }
    }
}

async fn list_devices(config: &Config, filter: Option<&str>, json: bool) -> anyhow::Result<i32> {
    let client = DirectoryClient::new(
        config.directory_url.clone(),
        Duration::from_secs(config.directory_timeout_secs),
        config.max_directory_response_bytes,
    );

    let mut picker = Picker::new();
    if let Some(query) = filter {
        picker.set_query(query);
    }
    let load = picker.begin_load();
    let result = tokio::task::spawn_blocking(move || client.fetch_devices())
        .await
        .context("directory fetch task failed")?;
    let failed = result.is_err();
    picker.finish_load(load, result);

    if json && !failed {
        let devices: Vec<_> = picker.cards().into_iter().map(|c| c.device).collect();
        println!("{}", serde_json::to_string_pretty(&devices)?);
    } else {
        for line in render_picker(&picker, chrono::Utc::now()) {
            println!("{}", line);
        }
    }

    Ok(if failed { 1 } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn devices_filter_parses() {
        let cli = Cli::try_parse_from(["meshterm", "devices", "--filter", "web"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Devices {
                filter: Some("web".into()),
                json: false,
            }
        );
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "meshterm",
            "devices",
            "--log-level",
            "debug",
            "--directory-url",
            "http://localhost:8080/devices",
        ])
        .unwrap();
        assert_eq!(cli.log_level, Some(log::LevelFilter::Debug));
        assert_eq!(
            cli.directory_url.as_deref(),
            Some("http://localhost:8080/devices")
        );
    }

    #[test]
    fn overrides_replace_directory_url() {
        let mut config = Config::default();
        let options = RuntimeOptions {
            command: Commands::ConfigPath,
            log_level: None,
            directory_url: Some("https://dir.example/api".into()),
        };
        apply_overrides(&mut config, &options);
        assert_eq!(config.directory_url, "https://dir.example/api");
    }
}
