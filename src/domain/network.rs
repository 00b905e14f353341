//! 网络描述与注册表
//!
//! 预置网络是常量；自定义网络由用户创建，按chain id去重。

use serde::{Deserialize, Serialize};

use crate::{config::BlockchainConfig, domain::wallet::ChainFamily, error::ChainError};

/// TRON没有EVM意义上的chain id，使用哨兵值
pub const TRON_CHAIN_ID: i64 = -1;

/// 链端点的不可变描述
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub id: String,
    pub name: String,
    pub rpc_url: String,
    /// EVM链的数字chain id；TRON为-1
    pub chain_id: i64,
    /// 原生资产符号
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub explorer_url: Option<String>,
    pub testnet: bool,
    pub chain: ChainFamily,
}

impl Network {
    /// 拼接浏览器交易链接
    pub fn explorer_tx_url(&self, tx_hash: &str) -> Option<String> {
        self.explorer_url
            .as_ref()
            .map(|base| format!("{}/tx/{}", base.trim_end_matches('/'), tx_hash))
    }
}

/// 预置网络列表
pub fn predefined_networks(config: &BlockchainConfig) -> Vec<Network> {
    vec![
        Network {
            id: "ethereum".into(),
            name: "Ethereum Mainnet".into(),
            rpc_url: config.eth_rpc_url.clone(),
            chain_id: 1,
            symbol: "ETH".into(),
            explorer_url: Some("https://etherscan.io".into()),
            testnet: false,
            chain: ChainFamily::Evm,
        },
        Network {
            id: "sepolia".into(),
            name: "Sepolia Testnet".into(),
            rpc_url: config.sepolia_rpc_url.clone(),
            chain_id: 11155111,
            symbol: "ETH".into(),
            explorer_url: Some("https://sepolia.etherscan.io".into()),
            testnet: true,
            chain: ChainFamily::Evm,
        },
        Network {
            id: "bsc".into(),
            name: "BNB Smart Chain".into(),
            rpc_url: config.bsc_rpc_url.clone(),
            chain_id: 56,
            symbol: "BNB".into(),
            explorer_url: Some("https://bscscan.com".into()),
            testnet: false,
            chain: ChainFamily::Evm,
        },
        Network {
            id: "polygon".into(),
            name: "Polygon".into(),
            rpc_url: config.polygon_rpc_url.clone(),
            chain_id: 137,
            symbol: "MATIC".into(),
            explorer_url: Some("https://polygonscan.com".into()),
            testnet: false,
            chain: ChainFamily::Evm,
        },
        Network {
            id: "tron".into(),
            name: "TRON Mainnet".into(),
            rpc_url: config.tron_api_url.clone(),
            chain_id: TRON_CHAIN_ID,
            symbol: "TRX".into(),
            explorer_url: Some("https://tronscan.org/#".into()),
            testnet: false,
            chain: ChainFamily::Tron,
        },
        Network {
            id: "tron-shasta".into(),
            name: "TRON Shasta Testnet".into(),
            rpc_url: config.tron_shasta_api_url.clone(),
            chain_id: TRON_CHAIN_ID,
            symbol: "TRX".into(),
            explorer_url: Some("https://shasta.tronscan.org/#".into()),
            testnet: true,
            chain: ChainFamily::Tron,
        },
    ]
}

/// 网络注册表：预置 + 用户自定义
#[derive(Debug)]
pub struct NetworkRegistry {
    predefined: Vec<Network>,
    custom: Vec<Network>,
}

impl NetworkRegistry {
    pub fn new(config: &BlockchainConfig) -> Self {
        Self {
            predefined: predefined_networks(config),
            custom: Vec::new(),
        }
    }

    /// 从持久化恢复自定义网络
    pub fn with_custom(config: &BlockchainConfig, custom: Vec<Network>) -> Self {
        let mut registry = Self::new(config);
        for network in custom {
            // 恢复时重复项直接跳过，不让坏数据阻塞启动
            if registry.add_custom(network).is_err() {
                tracing::warn!("skipping duplicate custom network on restore");
            }
        }
        registry
    }

    pub fn all(&self) -> impl Iterator<Item = &Network> {
        self.predefined.iter().chain(self.custom.iter())
    }

    pub fn get(&self, id: &str) -> Option<&Network> {
        self.all().find(|n| n.id == id)
    }

    /// 添加自定义EVM网络，chain id重复时拒绝
    pub fn add_custom(&mut self, network: Network) -> Result<(), ChainError> {
        if network.chain == ChainFamily::Evm
            && self
                .all()
                .any(|n| n.chain == ChainFamily::Evm && n.chain_id == network.chain_id)
        {
            return Err(ChainError::Validation(format!(
                "Network with chain id {} already exists",
                network.chain_id
            )));
        }
        if self.all().any(|n| n.id == network.id) {
            return Err(ChainError::Validation(format!(
                "Network id '{}' already exists",
                network.id
            )));
        }

        self.custom.push(network);
        Ok(())
    }

    /// 移除自定义网络；预置网络不可移除
    pub fn remove_custom(&mut self, id: &str) -> bool {
        let before = self.custom.len();
        self.custom.retain(|n| n.id != id);
        self.custom.len() != before
    }

    pub fn custom_networks(&self) -> &[Network] {
        &self.custom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> NetworkRegistry {
        NetworkRegistry::new(&BlockchainConfig::default())
    }

    fn custom_network(id: &str, chain_id: i64) -> Network {
        Network {
            id: id.into(),
            name: id.into(),
            rpc_url: "https://rpc.example.org".into(),
            chain_id,
            symbol: "ETH".into(),
            explorer_url: None,
            testnet: false,
            chain: ChainFamily::Evm,
        }
    }

    #[test]
    fn test_predefined_lookup() {
        let registry = registry();
        assert_eq!(registry.get("ethereum").unwrap().chain_id, 1);
        assert_eq!(registry.get("tron").unwrap().chain_id, TRON_CHAIN_ID);
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn test_duplicate_chain_id_rejected() {
        let mut registry = registry();
        assert!(registry.add_custom(custom_network("my-eth", 1)).is_err());
        assert!(registry.add_custom(custom_network("base", 8453)).is_ok());
        // 再次添加同一chain id
        assert!(registry.add_custom(custom_network("base2", 8453)).is_err());
    }

    #[test]
    fn test_remove_custom_only() {
        let mut registry = registry();
        registry.add_custom(custom_network("base", 8453)).unwrap();
        assert!(registry.remove_custom("base"));
        assert!(!registry.remove_custom("ethereum"));
        assert!(registry.get("ethereum").is_some());
    }

    #[test]
    fn test_explorer_tx_url() {
        let registry = registry();
        let eth = registry.get("ethereum").unwrap();
        assert_eq!(
            eth.explorer_tx_url("0xabc").unwrap(),
            "https://etherscan.io/tx/0xabc"
        );

        let mut no_explorer = custom_network("x", 999);
        no_explorer.explorer_url = None;
        assert!(no_explorer.explorer_tx_url("0xabc").is_none());
    }
}
