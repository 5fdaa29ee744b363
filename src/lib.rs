// ==========================================
// 业务管理系统导入引擎 - 核心库
// ==========================================
// 用途: 将导出目录中的 CSV 文件按外键顺序导入关系库
// 技术栈: Rust + tokio + rusqlite / tiberius
// 类型推断: 仅依据列名,不读取目标库元数据
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 列类型 / 记录 / 导入计划与结果
pub mod domain;

// 目标库仓储层 - 逐行执行
pub mod repository;

// 引擎层 - 单表状态机 + 多表编排
pub mod engine;

// 导入层 - 读取 / 分类 / 转换 / 语句构建
pub mod importer;

// 配置层 - 环境变量 + 计划清单
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 性能统计
pub mod perf;

// 应用层 - 命令行集成
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

pub use config::{ConfigError, ImportSettings, TargetConfig, TargetEngine};
pub use domain::{
    ColumnClassification, ColumnKind, ImportMode, ImportReport, ImportResult, RawRecord,
    TableImportPlan, TypedRecord, TypedValue,
};
pub use engine::{ImportOrchestrator, ImportStage, TableAborted, TableImporter};
pub use importer::{
    ColumnClassifier, DelimitedRecordReader, ImportError, ImporterResult,
    NamingConventionClassifier, ReaderOptions, SqlDialect, StatementBuilder, ValueCoercer,
};
pub use repository::{
    connect_target, DryRunTarget, MssqlTarget, SqliteTarget, TargetConnection, TargetError,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "业务管理系统数据导入";
