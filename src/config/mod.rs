//! Runtime configuration.
//!
//! Lowest to highest precedence: built-in defaults, the TOML file, environment
//! variables, command-line flags. Read once at startup and handed to the RPC
//! client and daemon as plain values.

pub mod loader;

use anyhow::{Context, Result};
use config::Environment;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{api::DEFAULT_ALLOWED_ORIGIN, cli::ConfigArgs, rpc::DEFAULT_RPC_URL};

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub solana_rpc_url: Url,
    pub port: u16,
    #[serde(rename = "cors_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            solana_rpc_url: Url::parse(DEFAULT_RPC_URL).expect("default RPC URL is valid"),
            port: DEFAULT_PORT,
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
        }
    }
}

impl ProxyConfig {
    /// Loads the file named by `args` (creating it if missing) with the process environment.
    pub fn load(args: &ConfigArgs) -> Result<Self> {
        Self::load_with_env(args, loader::environment())
    }

    pub fn load_with_env(args: &ConfigArgs, env: Environment) -> Result<Self> {
        let cfg = loader::load_configuration(&args.config, env)?;
        let mut config: ProxyConfig = cfg.try_deserialize().context("Invalid configuration")?;
        config.apply_args(args);
        Ok(config)
    }

    pub fn apply_args(&mut self, args: &ConfigArgs) {
        if let Some(rpc_url) = &args.rpc_url {
            self.solana_rpc_url = rpc_url.clone();
        }
    }

    pub fn apply_port(&mut self, port: Option<u16>) {
        if let Some(port) = port {
            self.port = port;
        }
    }
}
