// ==========================================
// 业务管理系统导入引擎 - 目标库仓储层
// ==========================================
// 职责: 屏蔽目标库差异,逐行执行语句并分类错误
// 约束: 实际执行一律参数化,防止 SQL 注入
// ==========================================

pub mod dry_run_target;
pub mod error;
pub mod mssql_target;
pub mod sqlite_target;
pub mod target_connection;

// 重导出核心类型
pub use dry_run_target::DryRunTarget;
pub use error::{TargetError, TargetResult};
pub use mssql_target::MssqlTarget;
pub use sqlite_target::SqliteTarget;
pub use target_connection::TargetConnection;

use crate::config::target_config::{TargetConfig, TargetEngine};

/// 按配置建立目标连接
///
/// # 返回
/// 连接对象由调用方持有,离开作用域即释放
pub async fn connect_target(config: &TargetConfig) -> TargetResult<Box<dyn TargetConnection>> {
    match config.engine {
        TargetEngine::SqlServer => Ok(Box::new(MssqlTarget::connect(config).await?)),
        TargetEngine::Sqlite => Ok(Box::new(SqliteTarget::open(&config.database)?)),
    }
}
