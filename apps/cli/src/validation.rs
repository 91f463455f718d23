//! 输入验证模块
//!
//! 交互输入和消息载荷都以文本到达，这里统一解析为有限实数。

use anyhow::Result;

/// 解析有限实数
///
/// 空白被忽略；NaN、无穷大和非数字文本都返回错误。
pub fn parse_finite(input: &str, what: &str) -> Result<f64> {
    let trimmed = input.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid {what}: '{trimmed}' is not a number"))?;

    if !value.is_finite() {
        anyhow::bail!(
            "Invalid {what}: {}",
            if value.is_nan() { "NaN" } else { "infinite" }
        );
    }
    Ok(value)
}

/// clap 参数解析器：有限实数
pub fn finite_arg(input: &str) -> Result<f64, String> {
    parse_finite(input, "value").map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_finite_valid() {
        assert_eq!(parse_finite("10", "SV").unwrap(), 10.0);
        assert_eq!(parse_finite("  -2.5\n", "PV").unwrap(), -2.5);
        assert_eq!(parse_finite("1e3", "SV").unwrap(), 1000.0);
    }

    #[test]
    fn test_parse_finite_invalid() {
        assert!(parse_finite("", "SV").is_err());
        assert!(parse_finite("abc", "SV").is_err());
        assert!(parse_finite("NaN", "SV").is_err());
        assert!(parse_finite("inf", "PV").is_err());
        assert!(parse_finite("-infinity", "PV").is_err());

        let err = parse_finite("ten", "SV").unwrap_err();
        assert_eq!(err.to_string(), "Invalid SV: 'ten' is not a number");
    }

    #[test]
    fn test_finite_arg() {
        assert_eq!(finite_arg("0.5"), Ok(0.5));
        assert!(finite_arg("nan").is_err());
    }
}
