// ==========================================
// 业务管理系统导入引擎 - 值转换器实现
// ==========================================
// 职责: 原始字符串 + 列类型 → 强类型值
// 红线: 任何输入都不报错,每个分支都有兜底
//       （单元格脏数据不能中断整批导入）
// ==========================================

use crate::domain::record::{ColumnClassification, RawRecord, TypedRecord};
use crate::domain::types::{ColumnKind, TypedValue};
use crate::importer::column_classifier::is_audit_column;
use crate::importer::patterns;
use chrono::{DateTime, NaiveDateTime, Utc};

/// 目标库时间戳格式
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Unix 秒的合理区间（10 位十进制）
const UNIX_SECONDS_MIN: i64 = 1_000_000_000;
const UNIX_SECONDS_MAX: i64 = 10_000_000_000;

/// 导出文件中的空值占位
const NULL_TOKENS: &[&str] = &["null", "NULL"];

// ==========================================
// Coerced - 单元格转换结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct Coerced {
    pub value: TypedValue,
    /// 值形态与列类型不符,走了兜底分支
    pub fallback: bool,
}

impl Coerced {
    fn exact(value: TypedValue) -> Self {
        Self {
            value,
            fallback: false,
        }
    }

    fn fallback(value: TypedValue) -> Self {
        Self {
            value,
            fallback: true,
        }
    }
}

// ==========================================
// ValueCoercer - 值转换器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ValueCoercer {
    // 测试用固定时钟;None 时取系统时间（UTC）
    fixed_now: Option<NaiveDateTime>,
}

impl ValueCoercer {
    pub fn new() -> Self {
        Self { fixed_now: None }
    }

    /// 使用固定时钟（审计列默认值可预测）
    pub fn with_fixed_now(now: NaiveDateTime) -> Self {
        Self {
            fixed_now: Some(now),
        }
    }

    /// 当前时间戳 `YYYY-MM-DD HH:MM:SS`
    pub fn now_timestamp(&self) -> String {
        let now = self.fixed_now.unwrap_or_else(|| Utc::now().naive_utc());
        now.format(TIMESTAMP_FORMAT).to_string()
    }

    /// 转换单个值
    ///
    /// # 参数
    /// - raw: 原始字符串（缺失列传空串）
    /// - kind: 列语义类型
    /// - column_name: 列名（审计列默认值判定）
    pub fn coerce(&self, raw: &str, kind: ColumnKind, column_name: &str) -> TypedValue {
        self.coerce_detailed(raw, kind, column_name).value
    }

    /// 转换单个值,并标记是否走了兜底分支
    pub fn coerce_detailed(&self, raw: &str, kind: ColumnKind, column_name: &str) -> Coerced {
        let value = raw.trim();
        let audit = is_audit_column(column_name);

        if value.is_empty() || NULL_TOKENS.contains(&value) {
            return if audit {
                Coerced::exact(TypedValue::Text(self.now_timestamp()))
            } else {
                Coerced::exact(TypedValue::Null)
            };
        }

        match kind {
            ColumnKind::Identifier => Self::coerce_identifier(value),
            ColumnKind::Temporal => self.coerce_temporal(value, audit),
            ColumnKind::Boolean => Self::coerce_boolean(value),
            ColumnKind::Numeric => Self::coerce_numeric(value),
            ColumnKind::Text => Coerced::exact(TypedValue::Text(value.to_string())),
        }
    }

    /// 按表头分类转换整行
    ///
    /// # 返回
    /// - TypedRecord: 与分类同序
    /// - usize: 兜底单元格数
    pub fn coerce_record(
        &self,
        record: &RawRecord,
        classifications: &[ColumnClassification],
    ) -> (TypedRecord, usize) {
        let mut typed = TypedRecord::new(record.line_number);
        let mut fallbacks = 0;

        for class in classifications {
            let raw = record.get(&class.column_name).unwrap_or("");
            let coerced = self.coerce_detailed(raw, class.kind, &class.column_name);
            if coerced.fallback {
                fallbacks += 1;
            }
            typed.push(class.column_name.clone(), coerced.value);
        }

        (typed, fallbacks)
    }

    // UUID 原样保留;非 UUID 标识也放行,由目标库决定是否接受
    fn coerce_identifier(value: &str) -> Coerced {
        Coerced::exact(TypedValue::Text(value.to_string()))
    }

    fn coerce_temporal(&self, value: &str, audit: bool) -> Coerced {
        if patterns::is_date_time(value) {
            return Coerced::exact(TypedValue::Text(value.to_string()));
        }

        if patterns::is_digits(value) && value.len() == 10 {
            if let Some(ts) = Self::unix_seconds_to_timestamp(value) {
                return Coerced::exact(TypedValue::Text(ts));
            }
        }

        if audit {
            Coerced::fallback(TypedValue::Text(self.now_timestamp()))
        } else {
            Coerced::fallback(TypedValue::Null)
        }
    }

    fn unix_seconds_to_timestamp(value: &str) -> Option<String> {
        let secs = value.parse::<i64>().ok()?;
        if !(UNIX_SECONDS_MIN..UNIX_SECONDS_MAX).contains(&secs) {
            return None;
        }
        DateTime::<Utc>::from_timestamp(secs, 0).map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
    }

    fn coerce_boolean(value: &str) -> Coerced {
        match value {
            "0" | "false" | "False" => Coerced::exact(TypedValue::Boolean(false)),
            "1" | "true" | "True" => Coerced::exact(TypedValue::Boolean(true)),
            // 字面量 "true" 已在上面命中;"TRUE" / "yes" 等不做大小写折叠
            other => match other.parse::<i64>() {
                Ok(n) => Coerced::exact(TypedValue::Boolean(n != 0)),
                Err(_) => Coerced::fallback(TypedValue::Boolean(false)),
            },
        }
    }

    // 不匹配严格小数形态时保留原串,不抛错
    fn coerce_numeric(value: &str) -> Coerced {
        if !patterns::is_decimal(value) {
            return Coerced::fallback(TypedValue::Text(value.to_string()));
        }

        if value.contains('.') {
            return match value.parse::<f64>() {
                Ok(f) => Coerced::exact(TypedValue::Float(f)),
                Err(_) => Coerced::fallback(TypedValue::Text(value.to_string())),
            };
        }

        match value.parse::<i64>() {
            Ok(i) => Coerced::exact(TypedValue::Integer(i)),
            // 超出 i64 的整数退化为浮点
            Err(_) => match value.parse::<f64>() {
                Ok(f) => Coerced::exact(TypedValue::Float(f)),
                Err(_) => Coerced::fallback(TypedValue::Text(value.to_string())),
            },
        }
    }
}
