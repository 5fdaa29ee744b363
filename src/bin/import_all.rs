// ==========================================
// 业务管理系统导入引擎 - 全量导入入口
// ==========================================
// 用法: import_all [--dry-run]
// 顺序: 默认清单（父表在前）或 IMPORT_PLAN_FILE 指定的清单
// ==========================================

use erp_csv_import::app::cli::{self, ALL_TABLES_USAGE};
use erp_csv_import::logging;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let args = match cli::parse_all_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", ALL_TABLES_USAGE);
            return ExitCode::from(e.exit_code());
        }
    };

    tracing::info!(
        "{} v{} - 全量导入{}",
        erp_csv_import::APP_NAME,
        erp_csv_import::VERSION,
        if args.dry_run { "（演练）" } else { "" }
    );

    match cli::run_all_tables(args, |key| std::env::var(key).ok()).await {
        Ok(report) => {
            println!("{}", report.render_summary());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "导入未完成");
            if let Some(partial) = e.partial_report() {
                println!("{}", partial.render_summary());
            }
            eprintln!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
