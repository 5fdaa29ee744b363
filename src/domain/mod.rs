// ==========================================
// 业务管理系统导入引擎 - 领域模型层
// ==========================================
// 职责: 定义列类型、记录、导入计划与结果
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod import;
pub mod record;
pub mod types;

// 重导出核心类型
pub use import::{ImportReport, ImportResult, TableImportPlan};
pub use record::{ColumnClassification, RawRecord, TypedRecord};
pub use types::{ColumnKind, ImportMode, TypedValue};
