// ==========================================
// 业务管理系统导入引擎 - 列分类器实现
// ==========================================
// 职责: 仅凭列名推断语义类型
// 优先级: Identifier > Temporal > Numeric > Boolean > Text
// ==========================================

use crate::domain::types::ColumnKind;
use crate::importer::importer_trait::ColumnClassifier;

/// 时间类列名片段（包含即命中;葡语 data = 日期）
const TEMPORAL_FRAGMENTS: &[&str] = &["date", "data"];

/// 审计列
pub const AUDIT_COLUMNS: &[&str] = &["created_at", "updated_at"];

/// 金额/数量类列名词表（包含即命中）
const NUMERIC_TOKENS: &[&str] = &[
    "valor",
    "value",
    "preco",
    "price",
    "amount",
    "quantidade",
    "quantity",
    "numero",
    "number",
    "percentual",
    "percent",
    "saldo",
    "decimal",
    "total",
];

const BOOLEAN_PREFIXES: &[&str] = &["is_", "has_"];
const BOOLEAN_NAMES: &[&str] = &["active", "enabled", "disabled"];

/// 判断是否为审计列（大小写不敏感）
pub fn is_audit_column(column_name: &str) -> bool {
    let name = column_name.trim().to_lowercase();
    AUDIT_COLUMNS.contains(&name.as_str())
}

// ==========================================
// NamingConventionClassifier - 命名约定分类器
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct NamingConventionClassifier;

impl NamingConventionClassifier {
    pub fn new() -> Self {
        Self
    }

    fn is_identifier(name: &str) -> bool {
        name == "id" || name.ends_with("_id")
    }

    fn is_temporal(name: &str) -> bool {
        TEMPORAL_FRAGMENTS.iter().any(|f| name.contains(f))
            || AUDIT_COLUMNS.contains(&name)
            || name.ends_with("_at")
    }

    fn is_numeric(name: &str) -> bool {
        NUMERIC_TOKENS.iter().any(|t| name.contains(t))
    }

    fn is_boolean(name: &str) -> bool {
        BOOLEAN_PREFIXES.iter().any(|p| name.starts_with(p)) || BOOLEAN_NAMES.contains(&name)
    }
}

impl ColumnClassifier for NamingConventionClassifier {
    fn classify(&self, column_name: &str) -> ColumnKind {
        let name = column_name.trim().to_lowercase();

        if Self::is_identifier(&name) {
            ColumnKind::Identifier
        } else if Self::is_temporal(&name) {
            ColumnKind::Temporal
        } else if Self::is_numeric(&name) {
            ColumnKind::Numeric
        } else if Self::is_boolean(&name) {
            ColumnKind::Boolean
        } else {
            ColumnKind::Text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(name: &str) -> ColumnKind {
        NamingConventionClassifier.classify(name)
    }

    #[test]
    fn test_identifier_columns() {
        assert_eq!(classify("id"), ColumnKind::Identifier);
        assert_eq!(classify("ID"), ColumnKind::Identifier);
        assert_eq!(classify("company_id"), ColumnKind::Identifier);
        assert_eq!(classify("Client_ID"), ColumnKind::Identifier);
    }

    #[test]
    fn test_identifier_takes_precedence() {
        // 同时含日期/金额片段,仍判为 Identifier
        assert_eq!(classify("data_id"), ColumnKind::Identifier);
        assert_eq!(classify("update_date_id"), ColumnKind::Identifier);
        assert_eq!(classify("total_value_id"), ColumnKind::Identifier);
        assert_eq!(classify("is_price_id"), ColumnKind::Identifier);
    }

    #[test]
    fn test_temporal_columns() {
        assert_eq!(classify("created_at"), ColumnKind::Temporal);
        assert_eq!(classify("updated_at"), ColumnKind::Temporal);
        assert_eq!(classify("deleted_at"), ColumnKind::Temporal);
        assert_eq!(classify("due_date"), ColumnKind::Temporal);
        assert_eq!(classify("data_vencimento"), ColumnKind::Temporal);
        // Temporal 优先于 Numeric
        assert_eq!(classify("date_total"), ColumnKind::Temporal);
    }

    #[test]
    fn test_numeric_columns() {
        assert_eq!(classify("valor_total"), ColumnKind::Numeric);
        assert_eq!(classify("unit_price"), ColumnKind::Numeric);
        assert_eq!(classify("quantidade"), ColumnKind::Numeric);
        assert_eq!(classify("invoice_number"), ColumnKind::Numeric);
        assert_eq!(classify("percentual_desconto"), ColumnKind::Numeric);
        assert_eq!(classify("saldo"), ColumnKind::Numeric);
        // Numeric 优先于 Boolean
        assert_eq!(classify("is_total"), ColumnKind::Numeric);
    }

    #[test]
    fn test_boolean_columns() {
        assert_eq!(classify("is_paid"), ColumnKind::Boolean);
        assert_eq!(classify("has_attachment"), ColumnKind::Boolean);
        assert_eq!(classify("active"), ColumnKind::Boolean);
        assert_eq!(classify("Enabled"), ColumnKind::Boolean);
        assert_eq!(classify("disabled"), ColumnKind::Boolean);
        assert_eq!(classify("inactive_reason"), ColumnKind::Text);
    }

    #[test]
    fn test_text_fallback() {
        assert_eq!(classify("name"), ColumnKind::Text);
        assert_eq!(classify("description"), ColumnKind::Text);
        assert_eq!(classify(""), ColumnKind::Text);
    }

    #[test]
    fn test_classify_header_keeps_order() {
        let header = vec![
            "id".to_string(),
            "name".to_string(),
            "active".to_string(),
            "created_at".to_string(),
        ];
        let kinds: Vec<ColumnKind> = NamingConventionClassifier
            .classify_header(&header)
            .into_iter()
            .map(|c| c.kind)
            .collect();

        assert_eq!(
            kinds,
            vec![
                ColumnKind::Identifier,
                ColumnKind::Text,
                ColumnKind::Boolean,
                ColumnKind::Temporal
            ]
        );
    }

    #[test]
    fn test_is_audit_column() {
        assert!(is_audit_column("created_at"));
        assert!(is_audit_column(" UPDATED_AT "));
        assert!(!is_audit_column("deleted_at"));
    }
}
