pub mod api;
pub mod cli;
pub mod config;
pub mod daemon;
pub mod log;
pub mod rpc;

pub use crate::api::ApiDoc;
pub use crate::rpc::SolanaRpcClient;
