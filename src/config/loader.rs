use std::{fs, fs::File, io::Write, path::Path};

use anyhow::{Context, Result};
use config::{Config, Environment};
use log::info;

/// Environment key holding the comma-separated CORS origin list.
const ORIGINS_ENV_KEY: &str = "cors_allowed_origins";

pub fn get_default_config() -> &'static str {
    include_str!("../../config/config.toml")
}

/// Unprefixed environment source: `SOLANA_RPC_URL`, `PORT`, `CORS_ALLOWED_ORIGINS`.
pub fn environment() -> Environment {
    Environment::default()
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key(ORIGINS_ENV_KEY)
}

/// Layers the TOML file at `path` under `env`, writing the embedded default
/// file first when `path` does not exist.
pub fn load_configuration(path: &Path, env: Environment) -> Result<Config> {
    if !path.exists() {
        let sources = get_default_config();
        write_config_to(path, sources).context("Could not create default config")?;
        info!(path:% = path.display(); "Created new configuration file");
    }

    let filename = path.to_str().context("Invalid config file path")?;

    Config::builder()
        .add_source(config::File::with_name(filename))
        .add_source(env)
        .build()
        .context("Could not build config")
}

pub fn write_config_to(path: &Path, source: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create parent directories")?;
    };

    let mut file = File::create(path).context("Failed to create config file")?;
    file.write_all(source.as_bytes())
        .context("Failed to write config content")?;
    Ok(())
}
