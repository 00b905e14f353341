//! Base58Check 编解码
//!
//! TRON（以及Bitcoin系）的地址编码：负载后附加4字节双SHA256校验和再做Base58。
//! 所有TRON地址进出客户端都经过这里，校验和不匹配立即失败。

use sha2::{Digest, Sha256};

use crate::error::CryptoError;

/// 校验和长度
const CHECKSUM_LENGTH: usize = 4;

fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LENGTH] {
    let first = Sha256::digest(payload);
    let second = Sha256::digest(first);
    let mut out = [0u8; CHECKSUM_LENGTH];
    out.copy_from_slice(&second[..CHECKSUM_LENGTH]);
    out
}

/// 编码：`base58(payload ‖ sha256(sha256(payload))[0..4])`
pub fn encode(payload: &[u8]) -> String {
    let mut buf = Vec::with_capacity(payload.len() + CHECKSUM_LENGTH);
    buf.extend_from_slice(payload);
    buf.extend_from_slice(&checksum(payload));
    bs58::encode(buf).into_string()
}

/// 解码并验证校验和
///
/// 末尾4字节作为校验和取出，重算不一致返回 `InvalidChecksum`；
/// 非Base58字符或长度不足返回 `InvalidAddress`。
pub fn decode(encoded: &str) -> Result<Vec<u8>, CryptoError> {
    let raw = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| CryptoError::InvalidAddress(e.to_string()))?;

    if raw.len() <= CHECKSUM_LENGTH {
        return Err(CryptoError::InvalidAddress(format!(
            "decoded payload too short: {} bytes",
            raw.len()
        )));
    }

    let (payload, expected) = raw.split_at(raw.len() - CHECKSUM_LENGTH);
    if checksum(payload) != expected {
        return Err(CryptoError::InvalidChecksum);
    }

    Ok(payload.to_vec())
}
