// ==========================================
// 业务管理系统导入引擎 - 演练目标（不连接数据库）
// ==========================================
// 用途: 审查类型推断与语句生成结果
// 行为: 字面量 SQL 输出到 DEBUG 日志,每行计为成功
// ==========================================

use crate::importer::statement_builder::{PreparedStatement, SqlDialect};
use crate::repository::error::TargetResult;
use crate::repository::target_connection::TargetConnection;
use async_trait::async_trait;
use tracing::debug;

#[derive(Debug, Default)]
pub struct DryRunTarget {
    dialect: SqlDialect,
    executed: usize,
    captured: Option<Vec<String>>,
}

impl DryRunTarget {
    pub fn new(dialect: SqlDialect) -> Self {
        Self {
            dialect,
            executed: 0,
            captured: None,
        }
    }

    /// 保留所有生成的语句（测试用）
    pub fn capturing(dialect: SqlDialect) -> Self {
        Self {
            captured: Some(Vec::new()),
            ..Self::new(dialect)
        }
    }

    pub fn executed(&self) -> usize {
        self.executed
    }

    pub fn statements(&self) -> &[String] {
        self.captured.as_deref().unwrap_or(&[])
    }
}

#[async_trait]
impl TargetConnection for DryRunTarget {
    fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    fn describe(&self) -> String {
        format!("dry-run ({})", self.dialect)
    }

    async fn execute(&mut self, statement: &PreparedStatement) -> TargetResult<u64> {
        debug!(sql = %statement.literal_sql, "dry-run");
        self.executed += 1;
        if let Some(captured) = self.captured.as_mut() {
            captured.push(statement.literal_sql.clone());
        }
        Ok(1)
    }
}
