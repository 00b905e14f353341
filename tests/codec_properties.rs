//! 编解码属性测试
//!
//! 覆盖加密封存、Base58Check、ABI字编码和金额换算的端到端性质。

use ethers::types::U256;
use vaultcore::{
    infrastructure::encryption,
    repository::records,
    utils::{abi, amount, base58check},
};

#[test]
fn test_encryption_roundtrip_property() {
    let cases = [
        ("", "empty-plaintext"),
        ("a", "single"),
        (
            "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318",
            "hex-key",
        ),
        ("多字节明文 with mixed content", "密码"),
    ];

    for (plaintext, password) in cases {
        let sealed = encryption::encrypt(plaintext, password).unwrap();
        assert_eq!(encryption::decrypt(&sealed, password).unwrap(), plaintext);
    }
}

#[test]
fn test_encryption_cross_password_fails() {
    let sealed = encryption::encrypt("the secret", "password-one").unwrap();
    assert!(
        encryption::decrypt(&sealed, "password-one-").is_err(),
        "decryption with a different password must fail, not return bytes"
    );
}

#[test]
fn test_password_hash_is_salted_and_verifiable() {
    let first = encryption::hash_password("hunter2");
    let second = encryption::hash_password("hunter2");
    assert_ne!(first, second);

    assert!(encryption::verify_password("hunter2", &first).unwrap());
    assert!(encryption::verify_password("hunter2", &second).unwrap());
    assert!(!encryption::verify_password("hunter3", &first).unwrap());
}

#[test]
fn test_base58check_roundtrip_property() {
    let payloads: Vec<Vec<u8>> = vec![
        vec![0x41],
        vec![0x41; 21],
        (0u8..=255).collect(),
        vec![0x00, 0x00, 0x01],
    ];

    for payload in payloads {
        let encoded = base58check::encode(&payload);
        assert_eq!(base58check::decode(&encoded).unwrap(), payload);
    }
}

#[test]
fn test_base58check_detects_corruption() {
    let mut payload = vec![0x41u8];
    payload.extend_from_slice(b"0123456789abcdefghij");
    let encoded = base58check::encode(&payload);

    let chars: Vec<char> = encoded.chars().collect();
    for i in 0..chars.len() {
        let replacement = if chars[i] == 'x' { 'y' } else { 'x' };
        let mut corrupted = chars.clone();
        corrupted[i] = replacement;
        let corrupted: String = corrupted.into_iter().collect();
        assert!(
            base58check::decode(&corrupted).is_err(),
            "corrupted encoding at position {} must not decode",
            i
        );
    }
}

#[test]
fn test_abi_transfer_vector() {
    // 对照向量：transfer(0x…42, 1000) → 68字节载荷
    let mut to = [0u8; 20];
    to[19] = 0x42;
    let payload = abi::encode_call(
        abi::SELECTOR_TRANSFER,
        &[abi::encode_address(&to), abi::encode_uint(U256::from(1000u64))],
    );

    let expected_hex = format!(
        "a9059cbb{}{}",
        "0000000000000000000000000000000000000000000000000000000000000042",
        "00000000000000000000000000000000000000000000000000000000000003e8",
    );
    assert_eq!(hex::encode(&payload), expected_hex);
}

#[test]
fn test_abi_uint_and_string_roundtrip() {
    for value in [0u64, 1, 255, 1000, u64::MAX] {
        let word = abi::encode_uint(U256::from(value));
        assert_eq!(abi::decode_uint(&word), U256::from(value));
    }

    for s in ["", "T", "USDT", "Wrapped TRX", "0123456789".repeat(6).as_str()] {
        assert_eq!(abi::decode_string(&abi::encode_string(s)), s, "string {:?}", s);
    }
}

#[test]
fn test_amount_reference_conversion() {
    // 1.5个18位小数的原生币
    assert_eq!(
        amount::parse_decimal_units("1.5", 18).unwrap(),
        U256::from_dec_str("1500000000000000000").unwrap()
    );
    // 代币精度按decimals缩放
    assert_eq!(
        amount::parse_decimal_units("2.5", 6).unwrap(),
        U256::from(2_500_000u64)
    );
}

#[test]
fn test_records_contract_with_host_store() {
    // 坏数据只产生空列表
    assert!(records::deserialize_wallets("�garbage�").is_empty());
    assert!(records::deserialize_networks("[{\"id\":").is_empty());
    assert!(records::deserialize_tokens("null").is_empty());
}
