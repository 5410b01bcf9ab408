// Cucumber Integration Test Support Library
//
// Test infrastructure for the dashboard proxy integration tests: a mock
// Solana JSON-RPC node the proxy can be pointed at.

pub mod mock_rpc_node;

pub use mock_rpc_node::MockRpcNode;
