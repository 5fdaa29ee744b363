// ==========================================
// 业务管理系统导入引擎 - 语句构建器
// ==========================================
// 职责: 强类型行 → INSERT / MERGE 语句
// 形态: 字面量 SQL（dry-run / 日志）与参数化 SQL（实际执行）
// 红线: 实际执行只走参数化语句,字面量转义不进入活动连接
// ==========================================

use crate::domain::record::TypedRecord;
use crate::domain::types::{ImportMode, TypedValue};
use crate::importer::error::{ImportError, ImporterResult};
use std::fmt;

// ==========================================
// SqlDialect - 目标库方言
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SqlDialect {
    #[default]
    SqlServer, // MERGE 语法, @P1 占位符
    Sqlite,    // ON CONFLICT 语法, ?1 占位符
}

impl SqlDialect {
    /// 标识符加引号（支持 schema.table）
    pub fn quote_ident(&self, name: &str) -> String {
        name.split('.')
            .map(|part| match self {
                SqlDialect::SqlServer => format!("[{}]", part.replace(']', "]]")),
                SqlDialect::Sqlite => format!("\"{}\"", part.replace('"', "\"\"")),
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// 第 n 个参数占位符（1 起）
    pub fn placeholder(&self, n: usize) -> String {
        match self {
            SqlDialect::SqlServer => format!("@P{}", n),
            SqlDialect::Sqlite => format!("?{}", n),
        }
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlDialect::SqlServer => write!(f, "sqlsrv"),
            SqlDialect::Sqlite => write!(f, "sqlite"),
        }
    }
}

// ==========================================
// PreparedStatement - 参数化语句
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedStatement {
    pub sql: String,
    pub params: Vec<TypedValue>,
    /// 对应字面量语句（日志/dry-run 用）
    pub literal_sql: String,
}

/// 渲染字面量: 字符串单引号转义 / 布尔 1,0 / 空值 NULL
pub fn render_literal(value: &TypedValue) -> String {
    match value {
        TypedValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
        TypedValue::Integer(i) => i.to_string(),
        TypedValue::Float(f) => f.to_string(),
        TypedValue::Boolean(b) => if *b { "1" } else { "0" }.to_string(),
        TypedValue::Null => "NULL".to_string(),
    }
}

// ==========================================
// StatementBuilder - 语句构建器
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct StatementBuilder {
    dialect: SqlDialect,
}

impl StatementBuilder {
    pub fn new(dialect: SqlDialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    /// 构建字面量语句
    ///
    /// # 参数
    /// - table: 目标表名
    /// - columns: 列顺序（通常即表头）
    /// - record: 强类型行
    /// - mode: INSERT / MERGE
    /// - primary_key: MERGE 匹配列
    pub fn build_statement(
        &self,
        table: &str,
        columns: &[String],
        record: &TypedRecord,
        mode: ImportMode,
        primary_key: &str,
    ) -> ImporterResult<String> {
        self.build_with(table, columns, record, mode, primary_key, |_, value| {
            render_literal(value)
        })
    }

    /// 构建参数化语句（参数按列顺序,占位符从 1 开始）
    pub fn build_parameterized(
        &self,
        table: &str,
        columns: &[String],
        record: &TypedRecord,
        mode: ImportMode,
        primary_key: &str,
    ) -> ImporterResult<PreparedStatement> {
        let dialect = self.dialect;
        let sql = self.build_with(table, columns, record, mode, primary_key, |idx, _| {
            dialect.placeholder(idx + 1)
        })?;
        let literal_sql = self.build_statement(table, columns, record, mode, primary_key)?;
        let params = columns
            .iter()
            .map(|c| record.get(c).cloned().unwrap_or(TypedValue::Null))
            .collect();

        Ok(PreparedStatement {
            sql,
            params,
            literal_sql,
        })
    }

    /// 在列中定位主键（大小写不敏感,返回表头中的原始列名）
    pub fn resolve_primary_key<'a>(columns: &'a [String], primary_key: &str) -> Option<&'a str> {
        columns
            .iter()
            .find(|c| c.eq_ignore_ascii_case(primary_key))
            .map(|c| c.as_str())
    }

    fn build_with<F>(
        &self,
        table: &str,
        columns: &[String],
        record: &TypedRecord,
        mode: ImportMode,
        primary_key: &str,
        mut render: F,
    ) -> ImporterResult<String>
    where
        F: FnMut(usize, &TypedValue) -> String,
    {
        if columns.is_empty() {
            return Err(ImportError::EmptyRecord(table.to_string()));
        }

        let null = TypedValue::Null;
        let values: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(idx, c)| render(idx, record.get(c).unwrap_or(&null)))
            .collect();
        let quoted: Vec<String> = columns.iter().map(|c| self.dialect.quote_ident(c)).collect();
        let table_ident = self.dialect.quote_ident(table);

        match mode {
            ImportMode::Insert => Ok(format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table_ident,
                quoted.join(", "),
                values.join(", ")
            )),
            ImportMode::Merge => {
                let pk = Self::resolve_primary_key(columns, primary_key).ok_or_else(|| {
                    ImportError::PrimaryKeyMissing {
                        table: table.to_string(),
                        column: primary_key.to_string(),
                    }
                })?;
                let updates: Vec<&String> = columns.iter().filter(|c| c.as_str() != pk).collect();

                match self.dialect {
                    SqlDialect::SqlServer => {
                        Ok(self.merge_sql_server(&table_ident, columns, &quoted, &values, pk, &updates))
                    }
                    SqlDialect::Sqlite => {
                        Ok(self.upsert_sqlite(&table_ident, &quoted, &values, pk, &updates))
                    }
                }
            }
        }
    }

    fn merge_sql_server(
        &self,
        table_ident: &str,
        columns: &[String],
        quoted: &[String],
        values: &[String],
        pk: &str,
        updates: &[&String],
    ) -> String {
        let d = self.dialect;
        let source_select: Vec<String> = values
            .iter()
            .zip(quoted)
            .map(|(v, c)| format!("{} AS {}", v, c))
            .collect();
        let pk_ident = d.quote_ident(pk);

        let mut sql = format!(
            "MERGE INTO {} AS target USING (SELECT {}) AS source ON target.{} = source.{}",
            table_ident,
            source_select.join(", "),
            pk_ident,
            pk_ident
        );

        if !updates.is_empty() {
            let set: Vec<String> = updates
                .iter()
                .map(|c| {
                    let ident = d.quote_ident(c);
                    format!("target.{} = source.{}", ident, ident)
                })
                .collect();
            sql.push_str(&format!(" WHEN MATCHED THEN UPDATE SET {}", set.join(", ")));
        }

        let source_values: Vec<String> = columns
            .iter()
            .map(|c| format!("source.{}", d.quote_ident(c)))
            .collect();
        sql.push_str(&format!(
            " WHEN NOT MATCHED THEN INSERT ({}) VALUES ({});",
            quoted.join(", "),
            source_values.join(", ")
        ));
        sql
    }

    fn upsert_sqlite(
        &self,
        table_ident: &str,
        quoted: &[String],
        values: &[String],
        pk: &str,
        updates: &[&String],
    ) -> String {
        let d = self.dialect;
        let action = if updates.is_empty() {
            "DO NOTHING".to_string()
        } else {
            let set: Vec<String> = updates
                .iter()
                .map(|c| {
                    let ident = d.quote_ident(c);
                    format!("{} = excluded.{}", ident, ident)
                })
                .collect();
            format!("DO UPDATE SET {}", set.join(", "))
        };

        format!(
            "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT ({}) {}",
            table_ident,
            quoted.join(", "),
            values.join(", "),
            d.quote_ident(pk),
            action
        )
    }
}
