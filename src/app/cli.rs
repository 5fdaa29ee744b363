// ==========================================
// 业务管理系统导入引擎 - 命令行入口逻辑
// ==========================================
// 职责: 参数解析 / 配置校验 / 建立连接 / 执行编排
// 退出码: 0 完成（可含行级失败）/ 1 配置或连接错误 / 2 用法错误
// 中止时仍输出已完成部分的汇总
// 红线: 配置校验必须先于建立连接
// ==========================================

use crate::config::import_plan::{plan_for_table, resolve_plans};
use crate::config::target_config::{
    env_keys, ConfigError, ImportSettings, TargetConfig, TargetEngine,
};
use crate::domain::import::{ImportReport, TableImportPlan};
use crate::domain::types::ImportMode;
use crate::engine::orchestrator::ImportOrchestrator;
use crate::importer::error::ImportError;
use crate::importer::record_reader::ReaderOptions;
use crate::importer::statement_builder::SqlDialect;
use crate::repository::{connect_target, DryRunTarget, TargetConnection};
use thiserror::Error;
use tracing::info;

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_USAGE: u8 = 2;

pub const SINGLE_TABLE_USAGE: &str =
    "用法: erp-csv-import <table> [target_table] [--merge] [--dry-run]";
pub const ALL_TABLES_USAGE: &str = "用法: import_all [--dry-run]";

// ==========================================
// CliError - 命令行错误
// ==========================================
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("导入失败: {0}")]
    Import(#[from] ImportError),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Usage(_) => EXIT_USAGE,
            CliError::Config(_) | CliError::Import(_) => EXIT_FAILURE,
        }
    }

    /// 中止前的逐表结果（目标库中途不可用时）
    pub fn partial_report(&self) -> Option<&ImportReport> {
        match self {
            CliError::Import(e) => e.partial_report(),
            _ => None,
        }
    }
}

// ==========================================
// 参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleTableArgs {
    pub table: String,
    pub target_table: Option<String>,
    pub merge: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllTablesArgs {
    pub dry_run: bool,
}

/// 解析单表命令参数（不含程序名）
pub fn parse_single_args<I>(args: I) -> Result<SingleTableArgs, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut positional = Vec::new();
    let mut merge = false;
    let mut dry_run = false;

    for arg in args {
        match arg.as_str() {
            "--merge" => merge = true,
            "--dry-run" => dry_run = true,
            flag if flag.starts_with("--") => {
                return Err(CliError::Usage(format!("未知选项: {}", flag)));
            }
            _ => positional.push(arg),
        }
    }

    if positional.len() > 2 {
        return Err(CliError::Usage(format!(
            "多余的参数: {}",
            positional[2..].join(" ")
        )));
    }

    let mut positional = positional.into_iter();
    let table = positional
        .next()
        .ok_or_else(|| CliError::Usage("缺少表名".to_string()))?;

    Ok(SingleTableArgs {
        table,
        target_table: positional.next(),
        merge,
        dry_run,
    })
}

/// 解析多表命令参数（不接受位置参数）
pub fn parse_all_args<I>(args: I) -> Result<AllTablesArgs, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = AllTablesArgs::default();
    for arg in args {
        match arg.as_str() {
            "--dry-run" => parsed.dry_run = true,
            other => return Err(CliError::Usage(format!("不支持的参数: {}", other))),
        }
    }
    Ok(parsed)
}

// ==========================================
// 执行
// ==========================================

/// 单表导入
///
/// # 参数
/// - args: 已解析参数
/// - env: 环境变量来源
pub async fn run_single_table<F>(args: SingleTableArgs, env: F) -> Result<ImportReport, CliError>
where
    F: Fn(&str) -> Option<String>,
{
    let settings = ImportSettings::from_lookup(&env)?;
    let mode = if args.merge {
        ImportMode::Merge
    } else {
        ImportMode::Insert
    };

    let mut plan = plan_for_table(&args.table, mode);
    if let Some(target_table) = args.target_table {
        plan = plan.with_target(target_table);
    }

    let source = settings.source_dir.join(&plan.source_file);
    if !source.is_file() {
        return Err(ConfigError::SourceMissing(source.display().to_string()).into());
    }

    execute(vec![plan], settings, ReaderOptions::single_table(), args.dry_run, &env).await
}

/// 全量导入（默认清单或 IMPORT_PLAN_FILE）
pub async fn run_all_tables<F>(args: AllTablesArgs, env: F) -> Result<ImportReport, CliError>
where
    F: Fn(&str) -> Option<String>,
{
    let settings = ImportSettings::from_lookup(&env)?;
    let plans = resolve_plans(settings.plan_file.as_deref())?;

    execute(plans, settings, ReaderOptions::multi_table(), args.dry_run, &env).await
}

async fn execute<F>(
    plans: Vec<TableImportPlan>,
    settings: ImportSettings,
    reader_options: ReaderOptions,
    dry_run: bool,
    env: &F,
) -> Result<ImportReport, CliError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut target: Box<dyn TargetConnection> = if dry_run {
        Box::new(DryRunTarget::new(dry_run_dialect(env)?))
    } else {
        let config = TargetConfig::from_lookup(env)?;
        info!(db = %config.describe(), "连接目标库");
        connect_target(&config).await.map_err(ImportError::from)?
    };

    let mut orchestrator = ImportOrchestrator::new(settings, reader_options);
    let report = orchestrator.run(&plans, target.as_mut()).await?;
    Ok(report)
}

// 演练只需方言: 未配置时按 sqlsrv 渲染,配置了非法类型仍拒绝
fn dry_run_dialect<F>(env: &F) -> Result<SqlDialect, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match env(env_keys::DB_CONNECTION).filter(|v| !v.trim().is_empty()) {
        Some(raw) => Ok(raw.parse::<TargetEngine>()?.dialect()),
        None => Ok(SqlDialect::SqlServer),
    }
}
