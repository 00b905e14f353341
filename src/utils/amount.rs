//! 金额单位换算
//!
//! 用户输入的十进制金额与链上最小单位整数之间的转换。
//! 全程走字符串/大整数，不经过浮点。

use ethers::types::U256;

use crate::error::ChainError;

/// 十进制金额 → 最小单位整数（乘以10^decimals）
///
/// 小数位多于 `decimals` 或数值溢出U256时返回校验错误。
pub fn parse_decimal_units(amount: &str, decimals: u32) -> Result<U256, ChainError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(ChainError::Validation("Invalid amount: empty string".into()));
    }

    let (int_part, frac_part) = match amount.split_once('.') {
        Some((i, f)) => (i, f),
        None => (amount, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(ChainError::Validation(format!("Invalid amount: {}", amount)));
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ChainError::Validation(format!("Invalid amount: {}", amount)));
    }
    if frac_part.len() > decimals as usize {
        return Err(ChainError::Validation(format!(
            "Invalid amount: more than {} decimal places",
            decimals
        )));
    }

    // 整数部分*10^decimals + 小数部分右补零
    let mut digits = String::with_capacity(int_part.len() + decimals as usize);
    digits.push_str(if int_part.is_empty() { "0" } else { int_part });
    digits.push_str(frac_part);
    for _ in 0..(decimals as usize - frac_part.len()) {
        digits.push('0');
    }

    U256::from_dec_str(&digits)
        .map_err(|_| ChainError::Validation(format!("Invalid amount: {} overflows", amount)))
}

/// 最小单位整数 → 十进制字符串（除以10^decimals，去掉尾部多余的0）
pub fn format_decimal_units(value: U256, decimals: u32) -> String {
    if decimals == 0 {
        return value.to_string();
    }

    let divisor = U256::exp10(decimals as usize);
    let whole = value / divisor;
    let frac = value % divisor;

    if frac.is_zero() {
        return whole.to_string();
    }

    let frac_str = format!("{:0>width$}", frac.to_string(), width = decimals as usize);
    let trimmed = frac_str.trim_end_matches('0');
    format!("{}.{}", whole, trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_amount_conversion() {
        // 1.5个原生币按18位小数换算
        assert_eq!(
            parse_decimal_units("1.5", 18).unwrap(),
            U256::from_dec_str("1500000000000000000").unwrap()
        );
        assert_eq!(parse_decimal_units("0", 18).unwrap(), U256::zero());
        assert_eq!(parse_decimal_units("2", 6).unwrap(), U256::from(2_000_000u64));
        assert_eq!(parse_decimal_units(".5", 6).unwrap(), U256::from(500_000u64));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_decimal_units("", 18).is_err());
        assert!(parse_decimal_units(".", 18).is_err());
        assert!(parse_decimal_units("1.2.3", 18).is_err());
        assert!(parse_decimal_units("-1", 18).is_err());
        assert!(parse_decimal_units("1e5", 18).is_err());
        // 小数位超过精度
        assert!(parse_decimal_units("0.1234567", 6).is_err());
    }

    #[test]
    fn test_format_units() {
        let wei = U256::from_dec_str("1500000000000000000").unwrap();
        assert_eq!(format_decimal_units(wei, 18), "1.5");
        assert_eq!(format_decimal_units(U256::zero(), 18), "0");
        assert_eq!(format_decimal_units(U256::from(42u64), 0), "42");
        assert_eq!(format_decimal_units(U256::from(1_000_001u64), 6), "1.000001");
    }

    #[test]
    fn test_roundtrip() {
        for (s, d) in [("1.5", 18u32), ("0.000001", 6), ("1234", 8)] {
            let raw = parse_decimal_units(s, d).unwrap();
            assert_eq!(format_decimal_units(raw, d), s);
        }
    }
}
