//! vaultcore - 自托管多链钱包核心
//!
//! 密钥管理、地址派生、交易编码/签名引擎：私钥的对称加密封存，
//! 从单把secp256k1密钥派生EVM和TRON两种地址，EVM原生币/ERC-20
//! 转账的构建、签名与广播，以及TRON的Base58Check地址编解码、
//! 手写ABI编解码和原始交易签名广播。
//!
//! 图形外壳、交易历史查询和持久化存储是外部协作者，不在这个crate里。

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod metrics;
pub mod repository;
pub mod service;
pub mod utils;

// 重新导出常用类型
pub use error::{ChainError, CryptoError};

// 统一模块导出
pub mod prelude {
    pub use crate::{
        config::Config,
        domain::{ChainFamily, Network, NetworkRegistry, TokenRecord, Trc20TokenInfo, Wallet},
        error::{ChainError, CryptoError},
        service::{
            evm_client::{EvmClient, NativeTransferRequest, TokenTransferRequest},
            tron_client::TronClient,
            wallet_service,
        },
    };
}
