// Cucumber Step Definitions Module
//
// This module organizes all step definitions by feature area.

pub mod common;
pub mod dashboard;
pub mod rpc_node;

// Re-export the World type for easy access
pub use common::ProxyWorld;
