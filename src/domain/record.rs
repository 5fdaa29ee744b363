// ==========================================
// 业务管理系统导入引擎 - 行记录模型
// ==========================================
// 职责: 列分类结果 / 原始行 / 强类型行
// 生命周期: 单表导入内有效,落库后即丢弃
// ==========================================

use crate::domain::types::{ColumnKind, TypedValue};
use serde::{Deserialize, Serialize};

// ==========================================
// ColumnClassification - 列分类结果
// ==========================================
// 按表头派生一次,单表导入期间不可变
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnClassification {
    pub column_name: String,
    pub kind: ColumnKind,
}

impl ColumnClassification {
    pub fn new(column_name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            column_name: column_name.into(),
            kind,
        }
    }
}

// ==========================================
// RawRecord - 原始行记录（列名 → 原始字符串,保序）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// 源文件中的行号（1 起,表头为第 1 行）
    pub line_number: usize,
    pub fields: Vec<(String, String)>,
}

impl RawRecord {
    pub fn new(line_number: usize, fields: Vec<(String, String)>) -> Self {
        Self { line_number, fields }
    }

    /// 按列名取值（列不存在返回 None）
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ==========================================
// TypedRecord - 强类型行记录（列名 → 强类型值,保序）
// ==========================================
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypedRecord {
    pub line_number: usize,
    pub values: Vec<(String, TypedValue)>,
}

impl TypedRecord {
    pub fn new(line_number: usize) -> Self {
        Self {
            line_number,
            values: Vec::new(),
        }
    }

    pub fn push(&mut self, column: impl Into<String>, value: TypedValue) {
        self.values.push((column.into(), value));
    }

    pub fn get(&self, column: &str) -> Option<&TypedValue> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_record_lookup() {
        let record = RawRecord::new(
            2,
            vec![
                ("id".to_string(), "abc".to_string()),
                ("name".to_string(), "Acme".to_string()),
            ],
        );

        assert_eq!(record.get("name"), Some("Acme"));
        assert_eq!(record.get("missing"), None);
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_typed_record_keeps_column_order() {
        let mut record = TypedRecord::new(3);
        record.push("b", TypedValue::Integer(1));
        record.push("a", TypedValue::Null);

        let columns: Vec<&str> = record.columns().collect();
        assert_eq!(columns, vec!["b", "a"]);
        assert_eq!(record.get("a"), Some(&TypedValue::Null));
    }
}
