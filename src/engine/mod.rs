// ==========================================
// 业务管理系统导入引擎 - 引擎层
// ==========================================
// 职责: 单表导入状态机 + 多表顺序编排
// 红线: Engine 不拼 SQL,语句统一由 StatementBuilder 生成
// ==========================================

pub mod orchestrator;
pub mod table_importer;

// 重导出核心引擎
pub use orchestrator::ImportOrchestrator;
pub use table_importer::{ImportStage, TableAborted, TableImporter};
