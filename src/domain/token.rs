//! 代币记录

use serde::{Deserialize, Serialize};

/// 用户添加的代币（持久化条目）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    pub contract_address: String,
    pub symbol: String,
    pub name: String,
    pub decimals: u32,
    /// 所属网络id
    pub network_id: String,
}

/// TRC-20合约元数据，按需查询，不做缓存
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trc20TokenInfo {
    pub contract_address: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
}
