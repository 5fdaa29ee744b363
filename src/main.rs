// ==========================================
// 业务管理系统导入引擎 - 单表导入入口
// ==========================================
// 用法: erp-csv-import <table> [target_table] [--merge] [--dry-run]
// 环境: DB_CONNECTION / DB_HOST / DB_PORT / DB_DATABASE / DB_USERNAME / DB_PASSWORD
// ==========================================

use erp_csv_import::app::cli::{self, SINGLE_TABLE_USAGE};
use erp_csv_import::logging;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let args = match cli::parse_single_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", SINGLE_TABLE_USAGE);
            return ExitCode::from(e.exit_code());
        }
    };

    tracing::info!(
        "{} v{} - 单表导入: {}",
        erp_csv_import::APP_NAME,
        erp_csv_import::VERSION,
        args.table
    );

    match cli::run_single_table(args, |key| std::env::var(key).ok()).await {
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
