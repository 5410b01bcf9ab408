use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use serde::Serialize;
use solana_dashboard_proxy::{
    SolanaRpcClient,
    api::types::{BalanceResponse, TokenHoldersResponse},
    cli::{Cli, Commands},
    config::ProxyConfig,
    daemon::Daemon,
    log::init_logging,
    rpc::{BlockTimeConfig, RpcClientConfig},
};

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let mut config = ProxyConfig::load(cli.command.config_args())?;

    // One-shot commands exit before a background block-time sample could land.
    let client_config = RpcClientConfig {
        block_time: BlockTimeConfig {
            sample_on_start: matches!(cli.command, Commands::Serve { .. }),
            ..BlockTimeConfig::default()
        },
        ..RpcClientConfig::default()
    };
    let client = SolanaRpcClient::with_config(config.solana_rpc_url.clone(), client_config)?;

    match cli.command {
        Commands::Serve { port, .. } => {
            config.apply_port(port);
            info!(port = config.port; "Starting dashboard proxy");
            Daemon::new(client, config.port, config.allowed_origins).run().await
        },
        Commands::Metrics { .. } => {
            if client.sample_block_time().await.is_none() {
                warn!("Block time sample failed, reporting the default");
            }
            print_json(&client.network_metrics().await?)
        },
        Commands::Account { address, .. } => print_json(&client.get_account_info(&address).await?),
        Commands::Balance { address, .. } => {
            let balance = client.get_balance(&address).await?;
            print_json(&BalanceResponse { address, balance })
        },
        Commands::Token { mint_address, .. } => print_json(&client.get_token_supply(&mint_address).await?),
        Commands::Holders { mint_address, limit, .. } => {
            let holders = client.get_token_holders(&mint_address, limit).await;
            print_json(&TokenHoldersResponse { mint_address, holders })
        },
    }
}
