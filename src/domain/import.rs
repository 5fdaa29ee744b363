// ==========================================
// 业务管理系统导入引擎 - 导入计划与结果
// ==========================================
// 职责: 表导入计划（静态配置）/ 单表结果 / 全量报告
// 红线: 结果只输出给操作员,不落库
// ==========================================

use crate::domain::types::ImportMode;
use crate::perf::StatementStats;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::time::Duration;

// ==========================================
// TableImportPlan - 表导入计划
// ==========================================
// 计划列表的顺序即外键依赖顺序（父表在前）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableImportPlan {
    pub source_file: String,       // 源文件名（相对导出目录）
    pub target_table: String,      // 目标表名
    #[serde(default)]
    pub mode: ImportMode,          // INSERT / MERGE
    #[serde(default = "default_primary_key")]
    pub primary_key_column: String, // MERGE 匹配列
}

fn default_primary_key() -> String {
    "id".to_string()
}

impl TableImportPlan {
    /// 按约定创建计划: `<table>.csv` → `<table>`
    pub fn for_table(table: &str, mode: ImportMode) -> Self {
        Self {
            source_file: format!("{}.csv", table),
            target_table: table.to_string(),
            mode,
            primary_key_column: default_primary_key(),
        }
    }

    /// 覆盖目标表名（源文件不变）
    pub fn with_target(mut self, target_table: impl Into<String>) -> Self {
        self.target_table = target_table.into();
        self
    }

    pub fn with_primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key_column = column.into();
        self
    }
}

// ==========================================
// ImportResult - 单表导入结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportResult {
    pub table: String,
    pub imported: usize,  // 成功写入行数
    pub errors: usize,    // 落库失败行数
    pub fallbacks: usize, // 走兜底分支的单元格数（不计为错误）
    pub skipped: bool,    // 源文件缺失/为空而跳过
    pub aborted: bool,    // 目标库不可用,本表中途停止
    pub statements: u64,      // 已执行语句数
    pub slow_statements: u64, // 慢语句数
    #[serde(skip)]
    pub elapsed: Duration,
}

impl ImportResult {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    /// 源文件缺失或为空: 零计数跳过
    pub fn skipped(table: impl Into<String>) -> Self {
        Self {
            skipped: true,
            ..Self::new(table)
        }
    }

    pub fn total_rows(&self) -> usize {
        self.imported + self.errors
    }

    pub fn record_stats(&mut self, stats: StatementStats) {
        self.statements = stats.statements;
        self.slow_statements = stats.slow_statements;
    }

    fn note(&self) -> &'static str {
        if self.aborted {
            "中止"
        } else if self.skipped {
            "跳过"
        } else {
            ""
        }
    }
}

// ==========================================
// ImportReport - 全量导入报告
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    pub run_id: String,
    pub results: Vec<ImportResult>,
}

impl ImportReport {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            results: Vec::new(),
        }
    }

    pub fn push(&mut self, result: ImportResult) {
        self.results.push(result);
    }

    pub fn total_imported(&self) -> usize {
        self.results.iter().map(|r| r.imported).sum()
    }

    pub fn total_errors(&self) -> usize {
        self.results.iter().map(|r| r.errors).sum()
    }

    pub fn total_fallbacks(&self) -> usize {
        self.results.iter().map(|r| r.fallbacks).sum()
    }

    pub fn skipped_tables(&self) -> usize {
        self.results.iter().filter(|r| r.skipped).count()
    }

    pub fn total_statements(&self) -> u64 {
        self.results.iter().map(|r| r.statements).sum()
    }

    pub fn total_slow_statements(&self) -> u64 {
        self.results.iter().map(|r| r.slow_statements).sum()
    }

    /// 是否因目标库不可用提前结束
    pub fn is_aborted(&self) -> bool {
        self.results.iter().any(|r| r.aborted)
    }

    pub fn result_for(&self, table: &str) -> Option<&ImportResult> {
        self.results.iter().find(|r| r.table == table)
    }

    /// 渲染控制台汇总（每表一行 + 合计）
    pub fn render_summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<28} {:>10} {:>8} {:>10} {:>8}  {}",
            "table", "imported", "errors", "fallbacks", "slow_sql", "note"
        );
        let _ = writeln!(out, "{}", "-".repeat(78));

        for r in &self.results {
            let _ = writeln!(
                out,
                "{:<28} {:>10} {:>8} {:>10} {:>8}  {}",
                r.table,
                r.imported,
                r.errors,
                r.fallbacks,
                r.slow_statements,
                r.note()
            );
        }

        let _ = writeln!(out, "{}", "-".repeat(78));
        let _ = writeln!(
            out,
            "{:<28} {:>10} {:>8} {:>10} {:>8}  {} 张表跳过,共 {} 条语句",
            "合计",
            self.total_imported(),
            self.total_errors(),
            self.total_fallbacks(),
            self.total_slow_statements(),
            self.skipped_tables(),
            self.total_statements()
        );
        if self.is_aborted() {
            let _ = writeln!(out, "目标库不可用,导入提前结束;已写入的表不回滚");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_for_table_uses_conventions() {
        let plan = TableImportPlan::for_table("clients", ImportMode::Merge);
        assert_eq!(plan.source_file, "clients.csv");
        assert_eq!(plan.target_table, "clients");
        assert_eq!(plan.primary_key_column, "id");

        let plan = plan.with_target("clientes");
        assert_eq!(plan.source_file, "clients.csv");
        assert_eq!(plan.target_table, "clientes");
    }

    #[test]
    fn test_plan_deserialize_defaults() {
        let plan: TableImportPlan =
            serde_json::from_str(r#"{"source_file":"a.csv","target_table":"a"}"#).unwrap();
        assert_eq!(plan.mode, ImportMode::Insert);
        assert_eq!(plan.primary_key_column, "id");
    }

    #[test]
    fn test_report_totals() {
        let mut report = ImportReport::new("run-1");
        report.push(ImportResult {
            imported: 10,
            errors: 2,
            fallbacks: 1,
            statements: 12,
            slow_statements: 1,
            ..ImportResult::new("companies")
        });
        report.push(ImportResult::skipped("clients"));

        assert_eq!(report.total_imported(), 10);
        assert_eq!(report.total_errors(), 2);
        assert_eq!(report.skipped_tables(), 1);
        assert_eq!(report.result_for("companies").map(|r| r.total_rows()), Some(12));
        assert_eq!(report.total_statements(), 12);
        assert_eq!(report.total_slow_statements(), 1);
        assert!(!report.is_aborted());

        let summary = report.render_summary();
        assert!(summary.contains("companies"));
        assert!(summary.contains("跳过"));
        assert!(summary.contains("合计"));
        assert!(summary.contains("共 12 条语句"));
        assert!(!summary.contains("中止"));
    }

    #[test]
    fn test_aborted_table_marked_in_summary() {
        let mut report = ImportReport::new("run-2");
        report.push(ImportResult {
            imported: 3,
            ..ImportResult::new("companies")
        });
        report.push(ImportResult {
            imported: 1,
            aborted: true,
            ..ImportResult::new("clients")
        });

        assert!(report.is_aborted());
        assert_eq!(report.total_imported(), 4);

        let summary = report.render_summary();
        let clients_line = summary.lines().find(|l| l.starts_with("clients")).unwrap();
        assert!(clients_line.ends_with("中止"));
        assert!(summary.contains("导入提前结束"));
    }
}
