// ==========================================
// 业务管理系统导入引擎 - 应用层
// ==========================================
// 职责: 命令行集成,连接进程入口与导入引擎
// ==========================================

pub mod cli;

// 重导出
pub use cli::{
    parse_all_args, parse_single_args, run_all_tables, run_single_table, AllTablesArgs, CliError,
    SingleTableArgs,
};
