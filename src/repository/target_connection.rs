// ==========================================
// 业务管理系统导入引擎 - 目标库连接 Trait
// ==========================================
// 职责: 定义逐行执行接口（不包含实现）
// 实现者: SqliteTarget / MssqlTarget / DryRunTarget
// 约束: 单连接,顺序执行,每行独立判定成败
// ==========================================

use crate::importer::statement_builder::{PreparedStatement, SqlDialect};
use crate::repository::error::TargetResult;
use async_trait::async_trait;

// ==========================================
// TargetConnection Trait
// ==========================================
#[async_trait]
pub trait TargetConnection: Send {
    /// 目标库方言（决定语句形态）
    fn dialect(&self) -> SqlDialect;

    /// 连接描述（日志用,不含口令）
    fn describe(&self) -> String;

    /// 开始一个分块（可选: 实现方可在此开启事务）
    async fn begin_chunk(&mut self) -> TargetResult<()> {
        Ok(())
    }

    /// 执行单行语句
    ///
    /// # 返回
    /// - Ok(u64): 影响行数
    /// - Err(TargetError::Row): 当前行失败,调用方计数后继续
    /// - Err(TargetError::Fatal): 连接不可用,调用方中止
    async fn execute(&mut self, statement: &PreparedStatement) -> TargetResult<u64>;

    /// 结束分块（可选: 提交事务）
    async fn end_chunk(&mut self) -> TargetResult<()> {
        Ok(())
    }
}
