//! 地址验证模块
//!
//! 统一的地址校验逻辑：任何外发地址在发起网络调用之前都先经过这里。

use crate::{
    domain::wallet::ChainFamily,
    utils::base58check,
};

/// TRON主网地址版本字节
pub const TRON_ADDRESS_PREFIX: u8 = 0x41;
/// TRON Base58Check地址固定长度
pub const TRON_ADDRESS_LENGTH: usize = 34;

/// 地址验证器
pub struct AddressValidator;

impl AddressValidator {
    /// 按链家族验证地址格式
    pub fn validate(chain: ChainFamily, address: &str) -> bool {
        match chain {
            ChainFamily::Evm => Self::validate_evm_address(address),
            ChainFamily::Tron => Self::validate_tron_address(address),
        }
    }

    /// 验证EVM地址（0x + 40 hex，支持EIP-55 Checksum）
    pub fn validate_evm_address(address: &str) -> bool {
        if !address.starts_with("0x") || address.len() != 42 {
            return false;
        }

        let hex_part = &address[2..];
        if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return false;
        }

        // 混合大小写时按EIP-55校验
        if hex_part.chars().any(|c| c.is_uppercase())
            && hex_part.chars().any(|c| c.is_lowercase())
        {
            return Self::verify_eip55_checksum(address);
        }

        true
    }

    /// 验证EIP-55 Checksum
    /// https://eips.ethereum.org/EIPS/eip-55
    fn verify_eip55_checksum(address: &str) -> bool {
        use sha3::{Digest, Keccak256};

        let addr_lower = address[2..].to_lowercase();
        let hash = Keccak256::digest(addr_lower.as_bytes());

        for (i, ch) in address[2..].chars().enumerate() {
            if ch.is_alphabetic() {
                let hash_byte = hash[i / 2];
                let hash_nibble = if i % 2 == 0 {
                    hash_byte >> 4
                } else {
                    hash_byte & 0x0f
                };

                if ch.is_uppercase() != (hash_nibble >= 8) {
                    return false;
                }
            }
        }

        true
    }

    /// 验证TRON地址（Base58Check，34字符，0x41版本字节）
    pub fn validate_tron_address(address: &str) -> bool {
        if address.len() != TRON_ADDRESS_LENGTH || !address.starts_with('T') {
            return false;
        }

        match base58check::decode(address) {
            Ok(payload) => payload.len() == 21 && payload[0] == TRON_ADDRESS_PREFIX,
            Err(_) => false,
        }
    }
}
