//! 记录序列化层
//!
//! 钱包/网络/代币列表与宿主KV存储之间的JSON约定：
//! 序列化给外部存储；读回时解析失败只产生空列表，绝不让坏数据崩掉核心。

use serde::{de::DeserializeOwned, Serialize};

use crate::domain::{Network, TokenRecord, Wallet};

/// 序列化记录列表
pub fn serialize_records<T: Serialize>(records: &[T]) -> Result<String, serde_json::Error> {
    serde_json::to_string(records)
}

/// 反序列化记录列表，解析失败返回空列表
pub fn deserialize_records<T: DeserializeOwned>(raw: &str, kind: &str) -> Vec<T> {
    match serde_json::from_str::<Vec<T>>(raw) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(kind = kind, error = %e, "stored records are malformed, starting empty");
            Vec::new()
        }
    }
}

pub fn deserialize_wallets(raw: &str) -> Vec<Wallet> {
    deserialize_records(raw, "wallets")
}

pub fn deserialize_networks(raw: &str) -> Vec<Network> {
    deserialize_records(raw, "networks")
}

pub fn deserialize_tokens(raw: &str) -> Vec<TokenRecord> {
    deserialize_records(raw, "tokens")
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::wallet::ChainFamily;

    #[test]
    fn test_roundtrip() {
        let wallets = vec![Wallet {
            address: "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf".into(),
            name: "main".into(),
            encrypted_private_key: "AAAA".into(),
            public_key: "79be".into(),
            created_at: Utc::now(),
            imported: true,
            derivation_path: None,
            chain: ChainFamily::Evm,
        }];

        let raw = serialize_records(&wallets).unwrap();
        let back = deserialize_wallets(&raw);
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].address, wallets[0].address);
        assert!(back[0].imported);
    }

    #[test]
    fn test_malformed_input_yields_empty() {
        assert!(deserialize_wallets("not json at all").is_empty());
        assert!(deserialize_networks("{\"truncated\":").is_empty());
        assert!(deserialize_tokens("42").is_empty());
        // 空列表本身是合法输入
        assert!(deserialize_wallets("[]").is_empty());
    }

    #[test]
    fn test_field_mismatch_yields_empty() {
        // 结构对不上同样按坏数据处理
        let raw = r#"[{"address": 17}]"#;
        assert!(deserialize_wallets(raw).is_empty());
    }
}
