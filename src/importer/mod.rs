// ==========================================
// 业务管理系统导入引擎 - 导入层
// ==========================================
// 职责: CSV 读取 / 列分类 / 值转换 / 语句构建
// 红线: 不持有数据库连接
// ==========================================

// 模块声明
pub mod column_classifier;
pub mod error;
pub mod importer_trait;
pub mod patterns;
pub mod record_reader;
pub mod statement_builder;
pub mod value_coercer;

// 重导出核心类型
pub use column_classifier::{is_audit_column, NamingConventionClassifier, AUDIT_COLUMNS};
pub use error::{ImportError, ImporterResult};
pub use record_reader::{DelimitedRecordReader, HeaderFilter, ParsedSource, ReaderOptions};
pub use statement_builder::{render_literal, PreparedStatement, SqlDialect, StatementBuilder};
pub use value_coercer::{ValueCoercer, TIMESTAMP_FORMAT};

// 重导出 Trait 接口
pub use importer_trait::ColumnClassifier;
