pub mod keypair;
pub mod network;
pub mod token;
pub mod wallet;

pub use keypair::DerivedKeypair;
pub use network::{Network, NetworkRegistry, TRON_CHAIN_ID};
pub use token::{TokenRecord, Trc20TokenInfo};
pub use wallet::{ChainFamily, Wallet};
