//! 钱包身份记录

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::address_validator::AddressValidator;

/// 链家族
///
/// EVM和TRON共用secp256k1密钥，但地址格式与交易格式完全不同，
/// 两种地址永远不能互换、不能存错标签。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    Evm,
    Tron,
}

impl ChainFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainFamily::Evm => "evm",
            ChainFamily::Tron => "tron",
        }
    }
}

/// 钱包记录
///
/// 外部的钱包存储是唯一的长期持有者；链客户端只在签名期间
/// 短暂接触解密后的私钥，签名结束后不得保留。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    /// 链特定格式的地址（EVM: 0x+40hex；TRON: Base58Check）
    pub address: String,
    /// 展示名称
    pub name: String,
    /// 加密后的私钥（salt ‖ iv ‖ ciphertext 的Base64）
    pub encrypted_private_key: String,
    /// 未压缩公钥（hex，不含0x04前缀字节）
    pub public_key: String,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 是否由外部私钥导入
    pub imported: bool,
    /// 派生元数据（预留给HD钱包）
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub derivation_path: Option<String>,
    /// 链标签
    pub chain: ChainFamily,
}

impl Wallet {
    /// 重命名是钱包记录唯一允许的变更
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// 地址格式必须与链标签一致
    pub fn address_matches_chain(&self) -> bool {
        AddressValidator::validate(self.chain, &self.address)
    }
}
