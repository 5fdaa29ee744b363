// ==========================================
// 业务管理系统导入引擎 - 导入编排器
// ==========================================
// 用途: 按计划清单顺序逐表导入并汇总结果
// 红线: 严格按给定顺序执行,不排序,不回滚已完成的表
// ==========================================

use crate::config::target_config::ImportSettings;
use crate::domain::import::{ImportReport, TableImportPlan};
use crate::engine::table_importer::{TableAborted, TableImporter};
use crate::importer::column_classifier::NamingConventionClassifier;
use crate::importer::error::{ImportError, ImporterResult};
use crate::importer::importer_trait::ColumnClassifier;
use crate::importer::record_reader::{DelimitedRecordReader, ReaderOptions};
use crate::importer::value_coercer::ValueCoercer;
use crate::repository::target_connection::TargetConnection;
use std::sync::Arc;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

// ==========================================
// ImportOrchestrator - 导入编排器
// ==========================================
pub struct ImportOrchestrator {
    importer: TableImporter,
}

impl ImportOrchestrator {
    /// 创建编排器（命名约定分类器）
    ///
    /// # 参数
    /// - settings: 导入运行参数
    /// - reader_options: 单表 / 多表读取策略
    pub fn new(settings: ImportSettings, reader_options: ReaderOptions) -> Self {
        Self::with_classifier(
            Arc::new(NamingConventionClassifier::new()),
            settings,
            reader_options,
        )
    }

    /// 注入自定义分类器
    pub fn with_classifier(
        classifier: Arc<dyn ColumnClassifier>,
        settings: ImportSettings,
        reader_options: ReaderOptions,
    ) -> Self {
        Self {
            importer: TableImporter::new(
                classifier,
                DelimitedRecordReader::new(reader_options),
                settings,
            ),
        }
    }

    pub fn with_coercer(mut self, coercer: ValueCoercer) -> Self {
        self.importer = self.importer.with_coercer(coercer);
        self
    }

    /// 按顺序执行全部计划
    ///
    /// # 返回
    /// - Ok(ImportReport): 每表一条结果（含跳过的表）
    /// - Err(ImportError::Aborted): 目标库不可用;partial 含已完成的表与中止表的计数,
    ///   已完成的表保持已写入状态
    pub async fn run(
        &mut self,
        plans: &[TableImportPlan],
        target: &mut dyn TargetConnection,
    ) -> ImporterResult<ImportReport> {
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!("import_run", run_id = %run_id, db = %target.describe());

        async move {
            info!(
                tables = plans.len(),
                source_dir = %self.importer.settings().source_dir.display(),
                "开始导入"
            );

            let mut report = ImportReport::new(run_id.as_str());

            for plan in plans {
                info!(
                    table = %plan.target_table,
                    source = %plan.source_file,
                    mode = %plan.mode,
                    "开始导入表"
                );

                match self.importer.run(plan, target).await {
                    Ok(result) => report.push(result),
                    Err(TableAborted { partial, error: e }) => {
                        error!(
                            table = %plan.target_table,
                            completed_tables = report.results.len(),
                            imported = report.total_imported() + partial.imported,
                            error = %e,
                            "导入中止"
                        );
                        report.push(partial);
                        return Err(ImportError::Aborted {
                            source: Box::new(e),
                            partial: Box::new(report),
                        });
                    }
                }
            }

            info!(
                imported = report.total_imported(),
                errors = report.total_errors(),
                fallbacks = report.total_fallbacks(),
                skipped_tables = report.skipped_tables(),
                "导入结束"
            );
            Ok(report)
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ImportMode;
    use crate::importer::statement_builder::{PreparedStatement, SqlDialect};
    use crate::repository::error::{TargetError, TargetResult};
    use crate::repository::DryRunTarget;
    use async_trait::async_trait;
    use std::fs;
    use tempfile::TempDir;

    const UUID_A: &str = "11111111-1111-1111-1111-111111111111";

    // 执行 N 条后断开的目标
    struct FailingTarget {
        remaining: usize,
    }

    #[async_trait]
    impl TargetConnection for FailingTarget {
        fn dialect(&self) -> SqlDialect {
            SqlDialect::Sqlite
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }

        async fn execute(&mut self, _statement: &PreparedStatement) -> TargetResult<u64> {
            if self.remaining == 0 {
                return Err(TargetError::Fatal("connection reset".to_string()));
            }
            self.remaining -= 1;
            Ok(1)
        }
    }

    fn write_csv(dir: &TempDir, table: &str) {
        fs::write(
            dir.path().join(format!("{}.csv", table)),
            format!("id,name\n{},{}\n", UUID_A, table),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_report_keeps_plan_order_and_skips() {
        let dir = TempDir::new().unwrap();
        write_csv(&dir, "companies");
        write_csv(&dir, "clients");

        let plans = vec![
            TableImportPlan::for_table("companies", ImportMode::Merge),
            TableImportPlan::for_table("users", ImportMode::Merge),
            TableImportPlan::for_table("clients", ImportMode::Insert),
        ];
        let mut orchestrator = ImportOrchestrator::new(
            ImportSettings::default().with_source_dir(dir.path()),
            ReaderOptions::multi_table(),
        );
        let mut target = DryRunTarget::new(SqlDialect::SqlServer);

        let report = orchestrator.run(&plans, &mut target).await.unwrap();

        let tables: Vec<&str> = report.results.iter().map(|r| r.table.as_str()).collect();
        assert_eq!(tables, vec!["companies", "users", "clients"]);
        assert_eq!(report.total_imported(), 2);
        assert_eq!(report.skipped_tables(), 1);
        assert!(Uuid::parse_str(&report.run_id).is_ok());
    }

    #[tokio::test]
    async fn test_fatal_error_aborts_remaining_tables() {
        let dir = TempDir::new().unwrap();
        write_csv(&dir, "companies");
        write_csv(&dir, "clients");

        let plans = vec![
            TableImportPlan::for_table("companies", ImportMode::Insert),
            TableImportPlan::for_table("clients", ImportMode::Insert),
        ];
        let mut orchestrator = ImportOrchestrator::new(
            ImportSettings::default().with_source_dir(dir.path()),
            ReaderOptions::multi_table(),
        );
        let mut target = FailingTarget { remaining: 1 };

        let err = orchestrator.run(&plans, &mut target).await.unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(
            err,
            ImportError::Aborted { ref source, .. } if matches!(**source, ImportError::Connectivity(_))
        ));

        // 已完成表与中止表都出现在报告里
        let partial = err.partial_report().unwrap();
        assert!(Uuid::parse_str(&partial.run_id).is_ok());
        assert_eq!(partial.results.len(), 2);

        let companies = partial.result_for("companies").unwrap();
        assert_eq!((companies.imported, companies.aborted), (1, false));

        let clients = partial.result_for("clients").unwrap();
        assert_eq!((clients.imported, clients.errors), (0, 0));
        assert!(clients.aborted);

        assert!(partial.is_aborted());
        assert!(partial.render_summary().contains("中止"));
    }

    #[tokio::test]
    async fn test_tables_after_abort_are_not_attempted() {
        let dir = TempDir::new().unwrap();
        write_csv(&dir, "companies");
        write_csv(&dir, "clients");
        write_csv(&dir, "users");

        let plans = vec![
            TableImportPlan::for_table("companies", ImportMode::Insert),
            TableImportPlan::for_table("clients", ImportMode::Insert),
            TableImportPlan::for_table("users", ImportMode::Insert),
        ];
        let mut orchestrator = ImportOrchestrator::new(
            ImportSettings::default().with_source_dir(dir.path()),
            ReaderOptions::multi_table(),
        );
        let mut target = FailingTarget { remaining: 0 };

        let err = orchestrator.run(&plans, &mut target).await.unwrap_err();
        let partial = err.partial_report().unwrap();

        let tables: Vec<&str> = partial.results.iter().map(|r| r.table.as_str()).collect();
        assert_eq!(tables, vec!["companies"]);
        assert_eq!(partial.total_imported(), 0);
    }
}
