//! 对称加密编解码
//!
//! 用于私钥和主密码等敏感字符串的静态加密：
//! PBKDF2-HMAC-SHA256（10,000次迭代）从用户密码派生AES-256密钥，
//! CBC模式 + PKCS#7填充，输出 `base64(salt ‖ iv ‖ ciphertext)`。
//! 每次调用独立生成随机salt/iv，不缓存任何派生结果。

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::error::CryptoError;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// PBKDF2迭代次数
const PBKDF2_ITERATIONS: u32 = 10_000;
/// 盐值长度
const SALT_LENGTH: usize = 16;
/// 初始化向量长度
const IV_LENGTH: usize = 16;
/// 派生密钥长度（AES-256）
const KEY_LENGTH: usize = 32;

fn random_bytes<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    rand::thread_rng().fill_bytes(&mut buf);
    buf
}

/// 从密码和盐值派生密钥，结果在离开作用域时清零
fn derive_key(password: &str, salt: &[u8]) -> Zeroizing<[u8; KEY_LENGTH]> {
    let mut key = Zeroizing::new([0u8; KEY_LENGTH]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key[..]);
    key
}

/// 加密任意明文字符串
pub fn encrypt(plaintext: &str, password: &str) -> Result<String, CryptoError> {
    let salt = random_bytes::<SALT_LENGTH>();
    let iv = random_bytes::<IV_LENGTH>();
    let key = derive_key(password, &salt);

    let cipher = Aes256CbcEnc::new_from_slices(&key[..], &iv)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

    let mut payload = Vec::with_capacity(SALT_LENGTH + IV_LENGTH + ciphertext.len());
    payload.extend_from_slice(&salt);
    payload.extend_from_slice(&iv);
    payload.extend_from_slice(&ciphertext);

    Ok(base64::engine::general_purpose::STANDARD.encode(payload))
}

/// 解密
///
/// 载荷格式非法返回 `MalformedPayload`；密码错误导致的填充失败
/// 或解出的字节不是合法UTF-8一律返回 `DecryptionFailed`，不把垃圾明文放出去。
pub fn decrypt(payload_b64: &str, password: &str) -> Result<String, CryptoError> {
    let payload = base64::engine::general_purpose::STANDARD
        .decode(payload_b64)
        .map_err(|e| CryptoError::MalformedPayload(e.to_string()))?;

    if payload.len() < SALT_LENGTH + IV_LENGTH + 1 {
        return Err(CryptoError::MalformedPayload(format!(
            "payload too short: {} bytes",
            payload.len()
        )));
    }

    let salt = &payload[..SALT_LENGTH];
    let iv = &payload[SALT_LENGTH..SALT_LENGTH + IV_LENGTH];
    let ciphertext = &payload[SALT_LENGTH + IV_LENGTH..];

    let key = derive_key(password, salt);
    let cipher = Aes256CbcDec::new_from_slices(&key[..], iv)
        .map_err(|e| CryptoError::MalformedPayload(e.to_string()))?;

    let plaintext = cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed)?;
    let plaintext = Zeroizing::new(plaintext);

    String::from_utf8(plaintext.to_vec()).map_err(|_| CryptoError::DecryptionFailed)
}

/// 单向密码哈希：`base64(salt ‖ derived)`，用于主密码验证
pub fn hash_password(password: &str) -> String {
    let salt = random_bytes::<SALT_LENGTH>();
    let derived = derive_key(password, &salt);

    let mut payload = Vec::with_capacity(SALT_LENGTH + KEY_LENGTH);
    payload.extend_from_slice(&salt);
    payload.extend_from_slice(&derived[..]);

    base64::engine::general_purpose::STANDARD.encode(payload)
}

/// 验证密码：用存储的盐值重新派生后做常量时间比较
pub fn verify_password(password: &str, stored_b64: &str) -> Result<bool, CryptoError> {
    let payload = base64::engine::general_purpose::STANDARD
        .decode(stored_b64)
        .map_err(|e| CryptoError::MalformedPayload(e.to_string()))?;

    if payload.len() != SALT_LENGTH + KEY_LENGTH {
        return Err(CryptoError::MalformedPayload(format!(
            "password hash must be {} bytes, got {}",
            SALT_LENGTH + KEY_LENGTH,
            payload.len()
        )));
    }

    let (salt, stored_key) = payload.split_at(SALT_LENGTH);
    let derived = derive_key(password, salt);

    Ok(derived[..].ct_eq(stored_key).into())
}
