use super::prompts;
use crate::output::{Output, OutputFormat};
use crate::ConfigCommands;
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use popcorn_config::{mask_secret, Config, CredentialStore, PathManager, OMDB_API_KEY_ENV};
use serde_json::json;

pub async fn run_config(cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(full, output),
        ConfigCommands::SetKey { key } => set_key(key, output),
        ConfigCommands::Init { force } => init_config(force, output),
    }
}

/// Where the effective API key comes from, in lookup order
fn key_origin(config: &Config, credentials: &CredentialStore) -> Option<&'static str> {
    let from_env = std::env::var(OMDB_API_KEY_ENV)
        .map(|k| !k.trim().is_empty())
        .unwrap_or(false);
    if from_env {
        Some("environment")
    } else if credentials.get_omdb_api_key().is_some() {
        Some("credentials.toml")
    } else if config.resolve_api_key(credentials).is_some() {
        Some("config.toml")
    } else {
        None
    }
}

fn load_credentials(path_manager: &PathManager) -> Result<CredentialStore> {
    let mut credentials = CredentialStore::new(path_manager.credentials_file());
    credentials
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials: {}", e))?;
    Ok(credentials)
}

fn show_config(full: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();
    let config = Config::load_or_default(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    let credentials = load_credentials(&path_manager)?;

    let api_key = config.resolve_api_key(&credentials);
    let api_key_display = api_key.as_deref().map(|k| if full { k.to_string() } else { mask_secret(k) });
    let origin = key_origin(&config, &credentials);

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            if !config_file.exists() {
                output.warn(format!(
                    "No config file at {} (using defaults). Run 'popcorn config init' to create one.",
                    config_file.display()
                ));
            }

            let mut paths_table = Table::new();
            paths_table.set_header(vec![
                Cell::new("Paths").fg(Color::Cyan).add_attribute(Attribute::Bold),
                Cell::new(""),
            ]);
            paths_table.add_row(vec![Cell::new("Config File"), Cell::new(config_file.display())]);
            paths_table.add_row(vec![
                Cell::new("Credentials File"),
                Cell::new(path_manager.credentials_file().display()),
            ]);
            paths_table.add_row(vec![Cell::new("Data Directory"), Cell::new(path_manager.data_dir().display())]);
            paths_table.add_row(vec![Cell::new("Log File"), Cell::new(path_manager.log_file().display())]);
            paths_table.load_preset(comfy_table::presets::UTF8_FULL);
            paths_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", paths_table);
            println!();

            let mut omdb_table = Table::new();
            omdb_table.set_header(vec![
                Cell::new("OMDb").fg(Color::Cyan).add_attribute(Attribute::Bold),
                Cell::new(""),
            ]);
            omdb_table.add_row(vec![Cell::new("Base URL"), Cell::new(&config.omdb.base_url)]);
            let key_cell = match (&api_key_display, origin) {
                (Some(key), Some(origin)) => format!("{} {}", key, format!("({})", origin).bright_black()),
                _ => "✗ not configured".red().to_string(),
            };
            omdb_table.add_row(vec![Cell::new("API Key"), Cell::new(key_cell)]);
            if let Some(set_at) = credentials.get_omdb_api_key_set_at() {
                omdb_table.add_row(vec![Cell::new("Key Stored"), Cell::new(set_at.to_rfc3339())]);
            }
            omdb_table.load_preset(comfy_table::presets::UTF8_FULL);
            omdb_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", omdb_table);
            println!();

            let mut search_table = Table::new();
            search_table.set_header(vec![
                Cell::new("Search & Logging").fg(Color::Cyan).add_attribute(Attribute::Bold),
                Cell::new(""),
            ]);
            search_table.add_row(vec![
                Cell::new("Minimum Query Length"),
                Cell::new(config.search.min_query_length),
            ]);
            search_table.add_row(vec![
                Cell::new("Log Level"),
                Cell::new(config.logging.level.as_deref().unwrap_or("warn (default)")),
            ]);
            search_table.add_row(vec![
                Cell::new("Log File"),
                Cell::new(
                    config
                        .logging
                        .file
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "stderr".to_string()),
                ),
            ]);
            search_table.load_preset(comfy_table::presets::UTF8_FULL);
            search_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", search_table);
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "config_file": config_file.display().to_string(),
                "config_file_exists": config_file.exists(),
                "credentials_file": path_manager.credentials_file().display().to_string(),
                "data_dir": path_manager.data_dir().display().to_string(),
                "omdb": {
                    "base_url": config.omdb.base_url,
                    "api_key": api_key_display,
                    "api_key_source": origin,
                },
                "search": {
                    "min_query_length": config.search.min_query_length,
                },
                "logging": {
                    "level": config.logging.level,
                    "file": config.logging.file.as_ref().map(|p| p.display().to_string()),
                },
            }));
        }
    }

    Ok(())
}

fn set_key(key_arg: Option<String>, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create configuration directories: {}", e))?;
    let mut credentials = load_credentials(&path_manager)?;

    let key = match key_arg {
        Some(key) => key.trim().to_string(),
        None => {
            output.info("Get a free OMDb API key at https://www.omdbapi.com/apikey.aspx");
            prompts::prompt_secret("OMDb API key")?
        }
    };
    if key.is_empty() {
        return Err(color_eyre::eyre::eyre!("API key is required"));
    }

    credentials.set_omdb_api_key(key.clone());
    credentials
        .save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials: {}", e))?;

    output.success(format!(
        "Stored OMDb API key {} in {}",
        mask_secret(&key),
        path_manager.credentials_file().display()
    ));
    if std::env::var(OMDB_API_KEY_ENV).is_ok() {
        output.warn(format!("{} is set and takes precedence over the stored key", OMDB_API_KEY_ENV));
    }
    Ok(())
}

fn init_config(force: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create configuration directories: {}", e))?;

    let config_file = path_manager.config_file();
    if config_file.exists() && !force {
        let prompt = format!("{} already exists. Overwrite with defaults?", config_file.display());
        if !prompts::prompt_yes_no_with_output(&prompt, Some(false), Some(output))? {
            output.info("Kept existing configuration");
            return Ok(());
        }
    }

    Config::default()
        .save_to_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to write config to {}: {}", config_file.display(), e))?;
    output.success(format!("Wrote default configuration to {}", config_file.display()));

    let credentials = load_credentials(&path_manager)?;
    if Config::default().resolve_api_key(&credentials).is_none() {
        output.info("Next: run 'popcorn config set-key' to store your OMDb API key");
    }
    Ok(())
}
