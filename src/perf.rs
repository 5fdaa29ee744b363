// ==========================================
// 业务管理系统导入引擎 - 语句性能统计
// ==========================================
// PerfGuard: 按表统计语句数 / 慢语句数 / 语句累计耗时
// 计时包在 TargetConnection::execute 外层,SQLite / SQL Server / 演练目标口径一致
// ==========================================

use std::time::{Duration, Instant};

/// 默认慢语句阈值（毫秒）;0 表示关闭慢语句告警
pub const DEFAULT_SLOW_SQL_MS: u64 = 200;

const SQL_PREVIEW_CHARS: usize = 420;

fn truncate_sql(sql: &str, max_len: usize) -> String {
    let s = sql.trim().replace('\n', " ");
    match s.char_indices().nth(max_len) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s,
    }
}

// ==========================================
// StatementStats - 单表语句统计
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatementStats {
    pub statements: u64,      // 已执行语句数（含行级失败）
    pub slow_statements: u64, // 超过阈值的语句数
    pub statement_time: Duration,
}

/// 性能统计 Guard：记录 elapsed_ms + 语句数 + 慢语句数,drop 时输出一条 perf 日志
///
/// ```ignore
/// let mut perf = erp_csv_import::perf::PerfGuard::new("companies", 200);
/// perf.observe(&statement.sql, started.elapsed());
/// ```
pub struct PerfGuard {
    op: String,
    start: Instant,
    slow_threshold: Option<Duration>,
    stats: StatementStats,
}

impl PerfGuard {
    /// # 参数
    /// - op: 统计对象（表名）
    /// - slow_sql_ms: 慢语句阈值,0 关闭告警
    pub fn new(op: impl Into<String>, slow_sql_ms: u64) -> Self {
        Self {
            op: op.into(),
            start: Instant::now(),
            slow_threshold: (slow_sql_ms > 0).then(|| Duration::from_millis(slow_sql_ms)),
            stats: StatementStats::default(),
        }
    }

    /// 记录一条已执行的语句（成功与行级失败都计入）
    pub fn observe(&mut self, sql: &str, elapsed: Duration) {
        self.stats.statements += 1;
        self.stats.statement_time += elapsed;

        if let Some(threshold) = self.slow_threshold {
            if elapsed >= threshold {
                self.stats.slow_statements += 1;
                tracing::warn!(
                    target: "slow_sql",
                    op = %self.op,
                    duration_ms = elapsed.as_millis() as u64,
                    sql = %truncate_sql(sql, SQL_PREVIEW_CHARS),
                    "slow sql"
                );
            }
        }
    }

    pub fn stats(&self) -> StatementStats {
        self.stats
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        tracing::info!(
            target: "perf",
            op = %self.op,
            elapsed_ms = self.start.elapsed().as_millis() as u64,
            sql_count = self.stats.statements,
            slow_sql_count = self.stats.slow_statements,
            sql_time_ms = self.stats.statement_time.as_millis() as u64,
            "done"
        );
    }
}
