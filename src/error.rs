//! 统一错误类型
//!
//! 密码学错误必须是独立的类型化失败（校验和不匹配、解密完整性失败），
//! 链客户端的公开操作统一返回 `Result<T, ChainError>`，不向边界外抛异常。

use thiserror::Error;

/// 密码学/编解码错误
///
/// 这一类错误表示数据损坏或密码错误，调用方必须中止当前操作，不允许静默吞掉。
#[derive(Debug, Error)]
pub enum CryptoError {
    /// 密文载荷格式不合法（Base64损坏、长度不足等）
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// 解密失败：密码错误或数据损坏
    #[error("decryption failed: wrong password or corrupted data")]
    DecryptionFailed,

    /// 加密失败
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// 私钥格式错误：去掉可选的0x前缀后必须是64个hex字符
    #[error("invalid private key format: expected 64 hex characters")]
    InvalidKeyFormat,

    /// 地址无法解析（非法字符、长度错误）
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Base58Check校验和不匹配
    #[error("address checksum mismatch")]
    InvalidChecksum,
}

/// 链客户端统一错误
///
/// 每个公开操作的结果形态固定为 Ok{...} / Err{message}，
/// 上层不需要捕获任何传输层特定的异常类型。
#[derive(Debug, Error)]
pub enum ChainError {
    /// 本地校验失败（地址格式、金额格式、私钥与发送方不匹配），发生在任何网络调用之前
    #[error("{0}")]
    Validation(String),

    /// 传输层失败（节点不可达、响应不是合法JSON、缺少预期字段）
    #[error("transport error: {0}")]
    Transport(String),

    /// 节点返回的语义错误（RPC error对象、result=false、交易上链失败）
    #[error("node error: {0}")]
    Node(String),

    /// 常量合约调用被节点拒绝
    #[error("contract call failed: {0}")]
    ContractCallFailed(String),

    /// 常量合约调用没有返回任何结果缓冲区
    #[error("constant call returned no result")]
    NoResult,

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

impl ChainError {
    /// 把reqwest错误折叠成统一的传输错误
    pub(crate) fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }
}
