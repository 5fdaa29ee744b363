// ==========================================
// 业务管理系统导入引擎 - 值形态识别
// ==========================================
// 职责: 读取器与转换器共用的正则（UUID / 日期 / 数字）
// ==========================================

use once_cell::sync::Lazy;
use regex::Regex;

/// 规范 UUID: 8-4-4-4-12 十六进制
static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("UUID pattern")
});

/// 日期前缀 YYYY-MM-DD（读取器判噪用）
static DATE_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("date prefix pattern"));

/// YYYY-MM-DD,可选时间部分（秒、小数秒、时区均可选）
static DATE_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\d{4}-\d{2}-\d{2}(?:[ T]\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:?\d{2})?)?$",
    )
    .expect("date time pattern")
});

/// 纯数字串
static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("digits pattern"));

/// 严格带符号小数
static DECIMAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d+(?:\.\d+)?$").expect("decimal pattern"));

pub fn is_uuid(value: &str) -> bool {
    UUID_RE.is_match(value.trim())
}

pub fn has_date_prefix(value: &str) -> bool {
    DATE_PREFIX_RE.is_match(value.trim())
}

pub fn is_date_time(value: &str) -> bool {
    DATE_TIME_RE.is_match(value.trim())
}

pub fn is_digits(value: &str) -> bool {
    DIGITS_RE.is_match(value.trim())
}

pub fn is_decimal(value: &str) -> bool {
    DECIMAL_RE.is_match(value.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_pattern() {
        assert!(is_uuid("11111111-1111-1111-1111-111111111111"));
        assert!(is_uuid(" 9B2F4C1E-0A3D-4E5F-8A7B-1C2D3E4F5A6B "));
        assert!(!is_uuid("id"));
        assert!(!is_uuid("11111111111111111111111111111111"));
        assert!(!is_uuid("{11111111-1111-1111-1111-111111111111}"));
    }

    #[test]
    fn test_date_patterns() {
        assert!(has_date_prefix("2024-03-01 10:00:00"));
        assert!(is_date_time("2024-03-01"));
        assert!(is_date_time("2024-03-01 10:00:00"));
        assert!(is_date_time("2024-03-01T10:00:00.123Z"));
        assert!(is_date_time("2024-03-01 10:00"));
        assert!(!is_date_time("2024-03-01 garbage"));
        assert!(!is_date_time("01/03/2024"));
    }

    #[test]
    fn test_numeric_patterns() {
        assert!(is_digits("1700000000"));
        assert!(!is_digits("-1"));
        assert!(is_decimal("-12.50"));
        assert!(is_decimal("7"));
        assert!(!is_decimal("1.2.3"));
        assert!(!is_decimal("1,50"));
        assert!(!is_decimal(".5"));
    }
}
