//! secp256k1密钥对与地址派生
//!
//! 同一把私钥确定性地派生出一个EVM地址和一个TRON地址，
//! 两个地址共享同一份Keccak-256哈希的后20字节核心。

use ethers::{types::Address, utils::to_checksum};
use k256::ecdsa::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use sha3::{Digest, Keccak256};
use zeroize::Zeroizing;

use crate::{
    error::CryptoError,
    utils::{address_validator::TRON_ADDRESS_PREFIX, base58check},
};

/// 派生结果
#[derive(Debug, Clone)]
pub struct DerivedKeypair {
    /// 私钥（hex编码，仅用于加密存储）
    pub private_key: String,
    /// 未压缩公钥（hex编码，不含0x04格式字节）
    pub public_key: String,
    /// EIP-55大小写的EVM地址
    pub evm_address: String,
    /// Base58Check的TRON地址
    pub tron_address: String,
}

/// 规范化私钥输入：去掉可选的0x前缀，要求恰好64个hex字符
pub fn normalize_private_key(hex_key: &str) -> Result<Zeroizing<[u8; 32]>, CryptoError> {
    let stripped = hex_key
        .strip_prefix("0x")
        .or_else(|| hex_key.strip_prefix("0X"))
        .unwrap_or(hex_key);

    if stripped.len() != 64 || !stripped.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CryptoError::InvalidKeyFormat);
    }

    let mut bytes = Zeroizing::new([0u8; 32]);
    hex::decode_to_slice(stripped, &mut bytes[..]).map_err(|_| CryptoError::InvalidKeyFormat)?;
    Ok(bytes)
}

/// 生成随机密钥对
pub fn generate_keypair() -> DerivedKeypair {
    let signing_key = SigningKey::random(&mut OsRng);
    derive_from_signing_key(&signing_key)
}

/// 从导入的私钥重建密钥对
pub fn keypair_from_private_key(hex_key: &str) -> Result<DerivedKeypair, CryptoError> {
    let bytes = normalize_private_key(hex_key)?;
    // 零和越界标量会在这里被拒绝
    let signing_key =
        SigningKey::from_slice(&bytes[..]).map_err(|_| CryptoError::InvalidKeyFormat)?;
    Ok(derive_from_signing_key(&signing_key))
}

/// 解析私钥为签名密钥（链客户端签名时使用）
pub fn signing_key_from_private_key(hex_key: &str) -> Result<SigningKey, CryptoError> {
    let bytes = normalize_private_key(hex_key)?;
    SigningKey::from_slice(&bytes[..]).map_err(|_| CryptoError::InvalidKeyFormat)
}

fn derive_from_signing_key(signing_key: &SigningKey) -> DerivedKeypair {
    let core = keccak_address_core(signing_key.verifying_key());

    let public_key = signing_key.verifying_key().to_encoded_point(false);
    // 跳过0x04格式字节，保留64字节坐标
    let public_key_hex = hex::encode(&public_key.as_bytes()[1..]);

    DerivedKeypair {
        private_key: hex::encode(signing_key.to_bytes()),
        public_key: public_key_hex,
        evm_address: to_checksum(&Address::from_slice(&core), None),
        tron_address: tron_address_from_core(&core),
    }
}

/// Keccak-256(未压缩公钥64字节)的后20字节
fn keccak_address_core(verifying_key: &VerifyingKey) -> [u8; 20] {
    let encoded = verifying_key.to_encoded_point(false);
    let hash = Keccak256::digest(&encoded.as_bytes()[1..]);
    let mut core = [0u8; 20];
    core.copy_from_slice(&hash[12..]);
    core
}

/// 20字节核心 → TRON主网地址（0x41前缀 + Base58Check）
pub fn tron_address_from_core(core: &[u8; 20]) -> String {
    let mut payload = [0u8; 21];
    payload[0] = TRON_ADDRESS_PREFIX;
    payload[1..].copy_from_slice(core);
    base58check::encode(&payload)
}
