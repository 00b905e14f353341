//! 钱包创建/导入服务
//!
//! 生成或导入secp256k1密钥，用用户密码封存私钥，产出带链标签的钱包记录。

use chrono::Utc;

use crate::{
    domain::{
        keypair::{self, DerivedKeypair},
        wallet::{ChainFamily, Wallet},
    },
    error::CryptoError,
    infrastructure::{encryption, log_redact},
};

fn build_wallet(
    keypair: &DerivedKeypair,
    name: &str,
    password: &str,
    chain: ChainFamily,
    imported: bool,
) -> Result<Wallet, CryptoError> {
    let address = match chain {
        ChainFamily::Evm => keypair.evm_address.clone(),
        ChainFamily::Tron => keypair.tron_address.clone(),
    };

    let encrypted_private_key = encryption::encrypt(&keypair.private_key, password)?;

    tracing::info!(
        chain = chain.as_str(),
        address = %log_redact::redact_address(&address),
        imported = imported,
        "wallet record created"
    );

    Ok(Wallet {
        address,
        name: name.to_string(),
        encrypted_private_key,
        public_key: keypair.public_key.clone(),
        created_at: Utc::now(),
        imported,
        derivation_path: None,
        chain,
    })
}

/// 生成新钱包
pub fn generate_wallet(
    name: &str,
    password: &str,
    chain: ChainFamily,
) -> Result<Wallet, CryptoError> {
    let keypair = keypair::generate_keypair();
    build_wallet(&keypair, name, password, chain, false)
}

/// 从外部私钥导入钱包
///
/// 去掉可选0x前缀后必须是64个hex字符，否则 `InvalidKeyFormat`。
pub fn import_wallet(
    private_key_hex: &str,
    name: &str,
    password: &str,
    chain: ChainFamily,
) -> Result<Wallet, CryptoError> {
    let keypair = keypair::keypair_from_private_key(private_key_hex)?;
    build_wallet(&keypair, name, password, chain, true)
}

/// 解封私钥
///
/// 返回的hex私钥只应在签名期间短暂存在，调用方用完即弃。
pub fn decrypt_private_key(wallet: &Wallet, password: &str) -> Result<String, CryptoError> {
    encryption::decrypt(&wallet.encrypted_private_key, password)
}
