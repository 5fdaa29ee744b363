// ==========================================
// 业务管理系统导入引擎 - 配置层
// ==========================================
// 职责: 目标库连接参数 / 导入运行参数 / 导入计划清单
// 来源: 环境变量 + 可选 JSON 计划文件
// ==========================================

pub mod import_plan;
pub mod target_config;

// 重导出核心配置
pub use import_plan::{default_plans, load_plans, plan_for_table, resolve_plans};
pub use target_config::{
    env_keys, ConfigError, ConfigResult, ImportSettings, TargetConfig, TargetEngine,
};
