// Common World Definition and Utilities for Cucumber BDD Tests
//
// This module contains the shared state object (ProxyWorld) and the steps
// that start the proxy under test.

use std::{net::SocketAddr, time::Duration};

use cucumber::{World, given};
use serde_json::Value;
use solana_dashboard_proxy::{
    SolanaRpcClient,
    daemon::Daemon,
    rpc::{BlockTimeConfig, RpcClientConfig},
};
use tokio::sync::broadcast;
use url::Url;

// Import the mock node from the test support library
#[path = "../src/lib.rs"]
mod test_support;
pub use test_support::MockRpcNode;

// =============================
// World Definition
// =============================

#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct ProxyWorld {
    pub node: Option<MockRpcNode>,
    pub proxy_addr: Option<SocketAddr>,
    pub proxy_shutdown: Option<broadcast::Sender<()>>,
    pub http: reqwest::Client,
    pub last_status: Option<u16>,
    pub last_body: Option<Value>,
}

impl ProxyWorld {
    pub fn new() -> Self {
        Self {
            node: None,
            proxy_addr: None,
            proxy_shutdown: None,
            http: reqwest::Client::new(),
            last_status: None,
            last_body: None,
        }
    }

    pub fn node(&self) -> &MockRpcNode {
        self.node.as_ref().expect("Mock RPC node not started")
    }

    pub fn proxy_url(&self, path: &str) -> String {
        let addr = self.proxy_addr.expect("Proxy not started");
        format!("http://{}{}", addr, path)
    }

    pub fn body(&self) -> &Value {
        self.last_body.as_ref().expect("No response received yet")
    }

    /// Retry timings shrunk so throttling scenarios finish quickly.
    fn client_config() -> RpcClientConfig {
        RpcClientConfig {
            base_delay: Duration::from_millis(10),
            rate_limit_interval: Duration::ZERO,
            rate_limit_cooldown: Duration::from_millis(10),
            http_timeout: Some(Duration::from_secs(5)),
            block_time: BlockTimeConfig {
                sample_on_start: false,
                ..BlockTimeConfig::default()
            },
            ..RpcClientConfig::default()
        }
    }

    pub async fn start_proxy(&mut self) {
        let endpoint = Url::parse(&self.node().url()).expect("Invalid mock node URL");
        let client = SolanaRpcClient::with_config(endpoint, Self::client_config()).expect("Failed to build RPC client");
        let daemon = Daemon::new(client, 0, vec!["http://localhost:3000".to_string()]);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind proxy");
        self.proxy_addr = Some(listener.local_addr().expect("Proxy has no address"));

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        tokio::spawn(async move {
            daemon.serve(listener, shutdown_rx).await.expect("Proxy failed");
        });
        self.proxy_shutdown = Some(shutdown_tx);
    }

    pub fn cleanup(&mut self) {
        if let Some(shutdown) = self.proxy_shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(node) = self.node.take() {
            node.stop();
        }
    }
}

impl Drop for ProxyWorld {
    fn drop(&mut self) {
        self.cleanup();
    }
}

// =============================
// Common Steps
// =============================

#[given("a mock Solana RPC node")]
async fn mock_node(world: &mut ProxyWorld) {
    world.node = Some(MockRpcNode::start().await);
}

#[given("the proxy is running against the mock node")]
async fn proxy_running(world: &mut ProxyWorld) {
    world.start_proxy().await;
}
