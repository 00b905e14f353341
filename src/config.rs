//! 配置管理模块
//! 支持从环境变量和配置文件加载配置

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub blockchain: BlockchainConfig,
    #[serde(default)]
    pub tron: TronConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 区块链RPC配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockchainConfig {
    pub eth_rpc_url: String,
    pub sepolia_rpc_url: String,
    pub bsc_rpc_url: String,
    pub polygon_rpc_url: String,
    pub tron_api_url: String,
    pub tron_shasta_api_url: String,
}

/// TRON合约调用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TronConfig {
    /// 合约触发交易的能量费上限（SUN）
    pub fee_limit_sun: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "text"
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            eth_rpc_url: std::env::var("ETH_RPC_URL")
                .unwrap_or_else(|_| "https://eth.llamarpc.com".into()),
            sepolia_rpc_url: std::env::var("SEPOLIA_RPC_URL")
                .unwrap_or_else(|_| "https://rpc.sepolia.org".into()),
            bsc_rpc_url: std::env::var("BSC_RPC_URL")
                .unwrap_or_else(|_| "https://bsc-dataseed1.binance.org".into()),
            polygon_rpc_url: std::env::var("POLYGON_RPC_URL")
                .unwrap_or_else(|_| "https://polygon-rpc.com".into()),
            tron_api_url: std::env::var("TRON_API_URL")
                .unwrap_or_else(|_| "https://api.trongrid.io".into()),
            tron_shasta_api_url: std::env::var("TRON_SHASTA_API_URL")
                .unwrap_or_else(|_| "https://api.shasta.trongrid.io".into()),
        }
    }
}

impl Default for TronConfig {
    fn default() -> Self {
        Self {
            fee_limit_sun: std::env::var("TRON_FEE_LIMIT_SUN")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(50_000_000), // 50 TRX
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            format: std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".into()),
        }
    }
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            blockchain: BlockchainConfig::default(),
            tron: TronConfig::default(),
            logging: LoggingConfig::default(),
        })
    }

    /// 从配置文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file as TOML")?;

        Ok(config)
    }

    /// 从环境变量和配置文件合并加载（配置文件优先级更高）
    pub fn from_env_and_file<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut config = Self::from_env()?;

        if let Some(path) = path {
            if path.as_ref().exists() {
                config = Self::from_file(path)?;
            }
        }

        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<()> {
        for url in [
            &self.blockchain.eth_rpc_url,
            &self.blockchain.sepolia_rpc_url,
            &self.blockchain.bsc_rpc_url,
            &self.blockchain.polygon_rpc_url,
            &self.blockchain.tron_api_url,
            &self.blockchain.tron_shasta_api_url,
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("RPC URL must start with http:// or https://: {}", url);
            }
        }

        if self.tron.fee_limit_sun == 0 {
            anyhow::bail!("TRON_FEE_LIMIT_SUN must be positive");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!("LOG_LEVEL must be one of: {:?}", valid_levels);
        }

        if self.logging.format != "json" && self.logging.format != "text" {
            anyhow::bail!("LOG_FORMAT must be 'json' or 'text'");
        }

        Ok(())
    }
}
