//! 最小ABI编解码
//!
//! 代币合约调用只涉及五个函数，这里不引入完整的ABI描述，
//! 直接以32字节大端字为原语手工编解码。EVM侧的eth_call数据
//! 和TRON侧的合约触发数据共用同一套实现。

use ethers::types::U256;
use sha3::{Digest, Keccak256};

/// `balanceOf(address)`
pub const SELECTOR_BALANCE_OF: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];
/// `decimals()`
pub const SELECTOR_DECIMALS: [u8; 4] = [0x31, 0x3c, 0xe5, 0x67];
/// `symbol()`
pub const SELECTOR_SYMBOL: [u8; 4] = [0x95, 0xd8, 0x9b, 0x41];
/// `name()`
pub const SELECTOR_NAME: [u8; 4] = [0x06, 0xfd, 0xde, 0x03];
/// `transfer(address,uint256)`
pub const SELECTOR_TRANSFER: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

/// ABI字宽
const WORD: usize = 32;

/// 函数选择器：Keccak256(签名)的前4字节
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash[..4]);
    selector
}

/// 把地址编码为32字节字
///
/// 接受20字节核心或带0x41版本字节的21字节TRON负载，版本字节会被剥掉后左零填充。
pub fn encode_address(address: &[u8]) -> [u8; 32] {
    let core: &[u8] = match address.len() {
        21 => &address[1..],
        _ => address,
    };
    let mut word = [0u8; WORD];
    let start = WORD - core.len().min(WORD);
    word[start..].copy_from_slice(&core[core.len().saturating_sub(WORD)..]);
    word
}

/// uint256 → 32字节大端字
pub fn encode_uint(value: U256) -> [u8; 32] {
    let mut word = [0u8; WORD];
    value.to_big_endian(&mut word);
    word
}

/// 组装调用载荷：`selector ‖ encoded-arguments`
pub fn encode_call(selector: [u8; 4], args: &[[u8; 32]]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(4 + args.len() * WORD);
    payload.extend_from_slice(&selector);
    for arg in args {
        payload.extend_from_slice(arg);
    }
    payload
}

/// 解码无符号整数
///
/// 读取前32字节作为大端整数；缓冲区不足32字节时按整体左零填充解释。
pub fn decode_uint(buf: &[u8]) -> U256 {
    if buf.is_empty() {
        return U256::zero();
    }
    if buf.len() >= WORD {
        U256::from_big_endian(&buf[..WORD])
    } else {
        U256::from_big_endian(buf)
    }
}

/// 解码动态字符串
///
/// 布局：32字节偏移量 → 偏移处32字节长度 → 长度个UTF-8字节。
/// 偏移/长度越界时返回空字符串，绝不越界索引。
pub fn decode_string(buf: &[u8]) -> String {
    if buf.len() < WORD {
        return String::new();
    }

    let offset_word = decode_uint(&buf[..WORD]);
    if offset_word > U256::from(buf.len() as u64) {
        return String::new();
    }
    let offset = offset_word.as_u64() as usize;
    let Some(len_end) = offset.checked_add(WORD) else {
        return String::new();
    };
    if len_end > buf.len() {
        return String::new();
    }

    let len_word = decode_uint(&buf[offset..len_end]);
    if len_word > U256::from(buf.len() as u64) {
        return String::new();
    }
    let len = len_word.as_u64() as usize;
    let Some(data_end) = len_end.checked_add(len) else {
        return String::new();
    };
    if data_end > buf.len() {
        return String::new();
    }

    String::from_utf8_lossy(&buf[len_end..data_end]).into_owned()
}

/// 按ABI字符串布局编码（偏移 ‖ 长度 ‖ 数据，数据尾部补零到32字节对齐）
pub fn encode_string(value: &str) -> Vec<u8> {
    let bytes = value.as_bytes();
    let padded_len = (bytes.len() + WORD - 1) / WORD * WORD;
    let mut out = Vec::with_capacity(WORD * 2 + padded_len);
    out.extend_from_slice(&encode_uint(U256::from(WORD)));
    out.extend_from_slice(&encode_uint(U256::from(bytes.len())));
    out.extend_from_slice(bytes);
    out.resize(WORD * 2 + padded_len, 0);
    out
}
