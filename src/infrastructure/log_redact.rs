//! 日志脱敏辅助
//!
//! 私钥、已签名交易这类数据永远不进日志；地址和交易哈希打日志时只保留首尾。

/// 脱敏十六进制字符串（显示前缀和后缀）
pub fn redact_hex_string(hex: &str, show_chars: usize) -> String {
    if hex.len() <= show_chars * 2 {
        return "*".repeat(hex.len());
    }

    let prefix = &hex[..show_chars];
    let suffix = &hex[hex.len() - show_chars..];
    format!("{}...{}", prefix, suffix)
}

/// 脱敏地址（显示前6位和后4位）
pub fn redact_address(address: &str) -> String {
    if address.len() < 10 {
        return "*".repeat(address.len());
    }

    let prefix = &address[..6];
    let suffix = &address[address.len() - 4..];
    format!("{}...{}", prefix, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_hex_string() {
        let hex = "0x1234567890abcdef1234567890abcdef12345678";
        let redacted = redact_hex_string(hex, 10);
        assert_eq!(redacted, "0x12345678...ef12345678");
    }

    #[test]
    fn test_redact_address() {
        let address = "0x742d35Cc6634C0532925a3b844Bc9e7595f0bFd2";
        assert_eq!(redact_address(address), "0x742d...bFd2");

        let tron = "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t";
        assert_eq!(redact_address(tron), "TR7NHq...Lj6t");
    }

    #[test]
    fn test_short_input_fully_masked() {
        assert_eq!(redact_address("short"), "*****");
        assert_eq!(redact_hex_string("abcd", 4), "****");
    }
}
