pub mod evm_client;
pub mod tron_client;
pub mod wallet_service;

pub use evm_client::EvmClient;
pub use tron_client::TronClient;
