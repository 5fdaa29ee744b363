// ==========================================
// 业务管理系统导入引擎 - 单表导入单元
// ==========================================
// 流程: 读取源文件 → 列分类 → 逐行转换与写入
// 状态: Idle → ReadingSource → Classifying → CoercingAndLoading → Done
// 红线: 行级失败只计数,只有致命错误向上传播
// ==========================================

use crate::config::target_config::ImportSettings;
use crate::domain::import::{ImportResult, TableImportPlan};
use crate::domain::record::{ColumnClassification, RawRecord};
use crate::domain::types::ImportMode;
use crate::importer::error::{ImportError, ImporterResult};
use crate::importer::importer_trait::ColumnClassifier;
use crate::importer::record_reader::{DelimitedRecordReader, ParsedSource};
use crate::importer::statement_builder::StatementBuilder;
use crate::importer::value_coercer::ValueCoercer;
use crate::perf::PerfGuard;
use crate::repository::target_connection::TargetConnection;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

// ==========================================
// ImportStage - 单表导入阶段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportStage {
    #[default]
    Idle,
    ReadingSource,
    Classifying,
    CoercingAndLoading,
    Done,
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportStage::Idle => "IDLE",
            ImportStage::ReadingSource => "READING_SOURCE",
            ImportStage::Classifying => "CLASSIFYING",
            ImportStage::CoercingAndLoading => "COERCING_AND_LOADING",
            ImportStage::Done => "DONE",
        };
        f.write_str(name)
    }
}

// 行级失败日志（前 N 条输出,其余只计数）
struct RowErrorLog<'a> {
    table: &'a str,
    limit: usize,
    logged: usize,
    suppressed: usize,
}

impl<'a> RowErrorLog<'a> {
    fn new(table: &'a str, limit: usize) -> Self {
        Self {
            table,
            limit,
            logged: 0,
            suppressed: 0,
        }
    }

    // 返回本条是否输出了日志
    fn record(&mut self, line: usize, err: &ImportError) -> bool {
        if self.logged < self.limit {
            warn!(table = self.table, line, error = %err, "行导入失败");
            self.logged += 1;
            true
        } else {
            self.suppressed += 1;
            false
        }
    }

    fn finish(&self) {
        if self.suppressed > 0 {
            warn!(
                table = self.table,
                suppressed = self.suppressed,
                "其余行级失败已省略"
            );
        }
    }
}

// ==========================================
// TableAborted - 目标库不可用时的单表中止
// ==========================================
// partial 为中止前的计数（aborted = true）,编排器据此汇总
#[derive(Debug)]
pub struct TableAborted {
    pub partial: ImportResult,
    pub error: ImportError,
}

// ==========================================
// TableImporter - 单表导入单元
// ==========================================
pub struct TableImporter {
    classifier: Arc<dyn ColumnClassifier>,
    coercer: ValueCoercer,
    reader: DelimitedRecordReader,
    settings: ImportSettings,
    stage: ImportStage,
}

impl TableImporter {
    /// 创建导入单元
    ///
    /// # 参数
    /// - classifier: 列分类器（注入,可替换）
    /// - reader: 源文件读取器
    /// - settings: 源目录 / 分块大小 / 日志上限
    pub fn new(
        classifier: Arc<dyn ColumnClassifier>,
        reader: DelimitedRecordReader,
        settings: ImportSettings,
    ) -> Self {
        Self {
            classifier,
            coercer: ValueCoercer::new(),
            reader,
            settings,
            stage: ImportStage::Idle,
        }
    }

    pub fn with_coercer(mut self, coercer: ValueCoercer) -> Self {
        self.coercer = coercer;
        self
    }

    pub fn stage(&self) -> ImportStage {
        self.stage
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    fn transition(&mut self, table: &str, next: ImportStage) {
        debug!(table, from = %self.stage, to = %next, "阶段切换");
        self.stage = next;
    }

    /// 执行单表导入
    ///
    /// # 返回
    /// - Ok(ImportResult): 含成功/失败/兜底/语句计数;源文件缺失或无数据时 skipped = true
    /// - Err(TableAborted): 目标库不可用,调用方应中止全部导入
    pub async fn run(
        &mut self,
        plan: &TableImportPlan,
        target: &mut dyn TargetConnection,
    ) -> Result<ImportResult, TableAborted> {
        let table = plan.target_table.as_str();
        let mut perf = PerfGuard::new(table, self.settings.slow_sql_ms);
        self.stage = ImportStage::Idle;

        self.transition(table, ImportStage::ReadingSource);
        let parsed = match self.read_source(plan) {
            Some(parsed) => parsed,
            None => {
                self.transition(table, ImportStage::Done);
                return Ok(ImportResult::skipped(table));
            }
        };

        self.transition(table, ImportStage::Classifying);
        let classifications = self.classifier.classify_header(&parsed.header);
        for class in &classifications {
            debug!(table, column = %class.column_name, kind = %class.kind, "列分类");
        }

        self.transition(table, ImportStage::CoercingAndLoading);
        let mut result = ImportResult::new(table);
        let outcome = self
            .load_records(plan, &parsed, &classifications, target, &mut result, &mut perf)
            .await;
        self.transition(table, ImportStage::Done);

        result.record_stats(perf.stats());
        result.elapsed = perf.elapsed();

        if let Err(error) = outcome {
            result.aborted = true;
            return Err(TableAborted {
                partial: result,
                error,
            });
        }

        if result.fallbacks > 0 {
            warn!(
                table,
                fallbacks = result.fallbacks,
                "部分单元格格式不符,已按原值保留或置空"
            );
        }
        info!(
            table,
            imported = result.imported,
            errors = result.errors,
            statements = result.statements,
            slow_statements = result.slow_statements,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "表导入完成"
        );
        Ok(result)
    }

    // 源文件缺失 / 不可读 / 无数据行 → None
    fn read_source(&self, plan: &TableImportPlan) -> Option<ParsedSource> {
        let table = plan.target_table.as_str();
        let path = self.settings.source_dir.join(&plan.source_file);

        if !path.is_file() {
            warn!(table, path = %path.display(), "源文件不存在,跳过");
            return None;
        }

        let parsed = match self.reader.read_path(&path) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(table, path = %path.display(), error = %e, "源文件无法读取,跳过");
                return None;
            }
        };

        debug!(
            table,
            rows = parsed.records.len(),
            dropped_headers = parsed.dropped_headers,
            dropped_noise = parsed.dropped_noise,
            "源文件解析完成"
        );

        if parsed.is_empty() {
            info!(table, "源文件无数据行,跳过");
            return None;
        }
        Some(parsed)
    }

    // 只有致命错误返回 Err;行级失败计入 result.errors
    #[allow(clippy::too_many_arguments)]
    async fn load_records(
        &self,
        plan: &TableImportPlan,
        parsed: &ParsedSource,
        classifications: &[ColumnClassification],
        target: &mut dyn TargetConnection,
        result: &mut ImportResult,
        perf: &mut PerfGuard,
    ) -> ImporterResult<()> {
        let table = plan.target_table.as_str();
        let builder = StatementBuilder::new(target.dialect());

        if plan.mode == ImportMode::Merge
            && StatementBuilder::resolve_primary_key(&parsed.header, &plan.primary_key_column)
                .is_none()
        {
            warn!(
                table,
                primary_key = %plan.primary_key_column,
                rows = parsed.records.len(),
                "表头缺少主键列,无法 MERGE,全部行计为失败"
            );
            result.errors = parsed.records.len();
            return Ok(());
        }

        let mut error_log = RowErrorLog::new(table, self.settings.error_log_limit);
        let batch_size = self.settings.batch_size.max(1);

        for chunk in parsed.records.chunks(batch_size) {
            target.begin_chunk().await?;

            for record in chunk {
                let loaded = self
                    .load_record(plan, &parsed.header, record, classifications, &builder, target, perf)
                    .await;
                match loaded {
                    Ok(fallbacks) => {
                        result.imported += 1;
                        result.fallbacks += fallbacks;
                    }
                    Err(e) if e.is_fatal() => {
                        error!(table, line = record.line_number, error = %e, "目标库不可用,中止导入");
                        return Err(e);
                    }
                    Err(e) => {
                        result.errors += 1;
                        error_log.record(record.line_number, &e);
                    }
                }
            }

            target.end_chunk().await?;
        }

        error_log.finish();
        Ok(())
    }

    // 单行: 转换 → 构建 → 计时执行;成功时返回兜底单元格数
    #[allow(clippy::too_many_arguments)]
    async fn load_record(
        &self,
        plan: &TableImportPlan,
        header: &[String],
        record: &RawRecord,
        classifications: &[ColumnClassification],
        builder: &StatementBuilder,
        target: &mut dyn TargetConnection,
        perf: &mut PerfGuard,
    ) -> ImporterResult<usize> {
        let (typed, fallbacks) = self.coercer.coerce_record(record, classifications);
        let statement = builder.build_parameterized(
            &plan.target_table,
            header,
            &typed,
            plan.mode,
            &plan.primary_key_column,
        )?;

        let started = Instant::now();
        let outcome = target.execute(&statement).await;
        perf.observe(&statement.sql, started.elapsed());

        outcome?;
        Ok(fallbacks)
    }
}
