//! Long-running server mode.
//!
//! [`Daemon`] binds the dashboard API and serves it until Ctrl+C. Shutdown is
//! broadcast so in-flight requests finish before the process exits. Block-time
//! sampling needs no task of its own here: the RPC client spawns samples on
//! demand.

use std::net::SocketAddr;

use anyhow::{Context, Result, anyhow};
use log::{error, info};
use tokio::{net::TcpListener, signal, sync::broadcast};

use crate::{api, rpc::SolanaRpcClient};

pub struct Daemon {
    client: SolanaRpcClient,
    port: u16,
    allowed_origins: Vec<String>,
}

impl Daemon {
    pub fn new(client: SolanaRpcClient, port: u16, allowed_origins: Vec<String>) -> Self {
        Self {
            client,
            port,
            allowed_origins,
        }
    }

    /// Binds `0.0.0.0:{port}` and serves until Ctrl+C.
    pub async fn run(&self) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind API server to {}", addr))?;

        let (shutdown_tx, _) = broadcast::channel(1);

        let ctrlc_tx = shutdown_tx.clone();
        tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => info!("Received shutdown signal, stopping server..."),
                Err(e) => error!(error:% = e; "Failed to listen for ctrl_c, stopping server"),
            }
            let _ = ctrlc_tx.send(());
        });

        self.serve(listener, shutdown_tx.subscribe()).await
    }

    /// Serves on an already bound listener until `shutdown` fires.
    pub async fn serve(&self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<()> {
        let local_addr = listener.local_addr().context("Listener has no local address")?;
        let router = api::create_router(self.client.clone(), &self.allowed_origins);

        info!(address:% = local_addr; "API server listening");
        info!(endpoint = self.client.endpoint().as_str(); "Using Solana RPC");

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.recv().await.ok();
            })
            .await
            .map_err(|e| anyhow!("API server failed: {}", e))?;

        info!("Server stopped gracefully.");
        Ok(())
    }
}
