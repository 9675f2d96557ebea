//! Configuration view and validation commands: `okr-board config`.

use anyhow::{Context, Result};
use okr_board::config::{BoardConfig, BoardToml};

use super::super::ConfigCommands;

fn print_effective(config: &BoardConfig) {
    println!("[api]");
    println!("  base_url = \"{}\"", config.toml.api.base_url);
    println!("  timeout_secs = {}", config.toml.api.timeout_secs);
    println!(
        "  token = {}",
        if config.token().is_some() { "\"****\"" } else { "(none)" }
    );
    println!();
    println!("[board]");
    println!("  language = \"{}\"", config.language());
    match config.user_id() {
        Some(id) => println!("  user_id = {}", id),
        None => println!("  user_id = (none)"),
    }
    println!("  view_mode = \"{}\"", config.toml.board.view_mode);
    println!();
    println!("[storage]");
    println!("  data_dir = \"{}\"", config.data_dir().display());
    println!();
    println!("API root: {}", config.api_root());
}

pub fn cmd_config(config: &BoardConfig, command: Option<ConfigCommands>) -> Result<()> {
    let config_path = config.config_file();

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Board Configuration");
            println!("===================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No board.toml found at {}", config_path.display());
                println!("Using defaults. Run 'okr-board config init' to create one.");
            }
            println!();
            println!("Effective values (with env/CLI overrides):");
            print_effective(config);
            println!();
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No board.toml found. Using defaults.");
            }

            let warnings = config.validate();
            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("board.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            BoardToml::default()
                .save(&config_path)
                .context("Failed to create board.toml")?;

            println!("Created board.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [api] base_url, timeout_secs, token");
            println!("  - [board] language, user_id, view_mode");
            println!("  - [storage] data_dir");
            println!();
        }
    }

    Ok(())
}
