//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::{bail, Context, Result};
use std::path::Path;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings, config_path: Option<&Path>) -> Result<()> {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Settings::default_config_path);

    match action {
        ConfigAction::Show => {
            let mut shown = settings;
            if shown.openai.api_key.is_some() {
                shown.openai.api_key = Some("********".to_string());
            }
            let toml_str = toml::to_string_pretty(&shown)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Set { key, value } => {
            let updated = set_value(&settings, key, value)?;
            updated.save_to(&config_path)?;
            Output::success(&format!("Set {} = {} in {}", key, value, config_path.display()));
        }

        ConfigAction::Edit => {
            // Create default config if it doesn't exist
            if !config_path.exists() {
                settings.save_to(&config_path)?;
                Output::info(&format!("Created default config at {:?}", config_path));
            }

            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

            Output::info(&format!("Opening config in {}...", editor));

            let status = std::process::Command::new(&editor)
                .arg(&config_path)
                .status();

            match status {
                Ok(s) if s.success() => {
                    Output::success("Config saved.");
                }
                Ok(_) => {
                    Output::warning("Editor exited with non-zero status.");
                }
                Err(e) => {
                    Output::error(&format!("Failed to open editor: {}", e));
                    Output::info(&format!("Config file is at: {:?}", config_path));
                }
            }
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Return a copy of `settings` with the dotted `key` set to `value`.
///
/// The value is parsed as TOML when possible (numbers, booleans), otherwise as a string.
/// The result must still deserialize into [`Settings`].
fn set_value(settings: &Settings, key: &str, value: &str) -> Result<Settings> {
    let mut root = toml::Value::try_from(settings).context("Failed to serialize config")?;

    let parts: Vec<&str> = key.split('.').collect();
    let (last, sections) = match parts.split_last() {
        Some((last, sections)) if !last.is_empty() => (*last, sections),
        _ => bail!("Invalid configuration key: {:?}", key),
    };

    let mut table = root
        .as_table_mut()
        .context("Configuration root is not a table")?;
    for section in sections {
        table = table
            .entry(section.to_string())
            .or_insert(toml::Value::Table(toml::map::Map::new()))
            .as_table_mut()
            .with_context(|| format!("{} is not a section", section))?;
    }

    table.insert(last.to_string(), parse_value(value));

    root.try_into()
        .with_context(|| format!("Invalid value for {}: {}", key, value))
}

fn parse_value(value: &str) -> toml::Value {
    toml::from_str::<toml::Table>(&format!("v = {}", value))
        .ok()
        .and_then(|mut t| t.remove("v"))
        .unwrap_or_else(|| toml::Value::String(value.to_string()))
}
