// ==========================================
// 业务管理系统导入引擎 - 领域类型定义
// ==========================================
// 职责: 列语义类型 / 导入模式 / 强类型值
// 红线: 纯数据定义,不含解析与落库逻辑
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 列语义类型 (Column Kind)
// ==========================================
// 只由列名推断,不读取源库元数据
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnKind {
    Identifier, // 主键/外键
    Temporal,   // 日期/时间
    Numeric,    // 金额/数量
    Boolean,    // 开关标志
    Text,       // 兜底
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Identifier => write!(f, "IDENTIFIER"),
            ColumnKind::Temporal => write!(f, "TEMPORAL"),
            ColumnKind::Numeric => write!(f, "NUMERIC"),
            ColumnKind::Boolean => write!(f, "BOOLEAN"),
            ColumnKind::Text => write!(f, "TEXT"),
        }
    }
}

// ==========================================
// 导入模式 (Import Mode)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportMode {
    #[default]
    Insert, // 纯插入
    Merge,  // 按主键 upsert
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportMode::Insert => write!(f, "INSERT"),
            ImportMode::Merge => write!(f, "MERGE"),
        }
    }
}

// ==========================================
// 强类型值 (Typed Value)
// ==========================================
// 日期时间、UUID 以文本形式保留,目标库原生接受
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Text(s) => write!(f, "{}", s),
            TypedValue::Integer(i) => write!(f, "{}", i),
            TypedValue::Float(v) => write!(f, "{}", v),
            TypedValue::Boolean(b) => write!(f, "{}", b),
            TypedValue::Null => write!(f, "NULL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_mode_serde() {
        let mode: ImportMode = serde_json::from_str("\"MERGE\"").unwrap();
        assert_eq!(mode, ImportMode::Merge);
        assert_eq!(ImportMode::default(), ImportMode::Insert);
    }

    #[test]
    fn test_typed_value_display() {
        assert_eq!(TypedValue::Null.to_string(), "NULL");
        assert_eq!(TypedValue::Integer(42).to_string(), "42");
        assert_eq!(TypedValue::Text("O'Neil".to_string()).to_string(), "O'Neil");
        assert_eq!(TypedValue::Boolean(true).to_string(), "true");
    }
}
