use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use url::Url;

use crate::api::types::DEFAULT_HOLDERS_LIMIT;

#[derive(Parser)]
#[command(name = "solana-dashboard-proxy")]
#[command(about = "Caching, rate-limited proxy between a dashboard and a Solana RPC node", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command that talks to the upstream node.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(short, long, help = "Path to the configuration file", default_value = "config.toml")]
    pub config: PathBuf,
    #[arg(short = 'u', long, help = "Solana JSON-RPC endpoint (overrides SOLANA_RPC_URL)")]
    pub rpc_url: Option<Url>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the dashboard API server
    Serve {
        #[command(flatten)]
        config: ConfigArgs,
        #[arg(short, long, help = "Port for the API server (overrides PORT)")]
        port: Option<u16>,
    },
    /// Print a network metrics snapshot as JSON
    Metrics {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Show account details
    Account {
        #[arg(help = "Base58 account address")]
        address: String,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Show an account's SOL balance
    Balance {
        #[arg(help = "Base58 account address")]
        address: String,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Show a token's supply
    Token {
        #[arg(help = "Base58 mint address")]
        mint_address: String,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// List a token's largest holders
    Holders {
        #[arg(help = "Base58 mint address")]
        mint_address: String,
        #[arg(short, long, help = "Maximum number of holders to list", default_value_t = DEFAULT_HOLDERS_LIMIT)]
        limit: usize,
        #[command(flatten)]
        config: ConfigArgs,
    },
}

impl Commands {
    pub fn config_args(&self) -> &ConfigArgs {
        match self {
            Commands::Serve { config, .. }
            | Commands::Metrics { config }
            | Commands::Account { config, .. }
            | Commands::Balance { config, .. }
            | Commands::Token { config, .. }
            | Commands::Holders { config, .. } => config,
        }
    }
}
