// ==========================================
// 业务管理系统导入引擎 - 导入计划清单
// ==========================================
// 职责: 提供按外键依赖排序的表导入计划
// 红线: 不做拓扑排序,顺序由清单维护者保证
// ==========================================

use crate::config::target_config::{ConfigError, ConfigResult};
use crate::domain::import::TableImportPlan;
use crate::domain::types::ImportMode;
use std::fs;
use std::path::Path;
use tracing::info;

/// 默认导入顺序（父表在前）
///
/// 主数据表使用 MERGE 以支持重复导入,业务单据表使用 INSERT。
pub const DEFAULT_TABLE_ORDER: &[(&str, ImportMode)] = &[
    ("companies", ImportMode::Merge),
    ("users", ImportMode::Merge),
    ("clients", ImportMode::Merge),
    ("suppliers", ImportMode::Merge),
    ("categories", ImportMode::Merge),
    ("cost_centers", ImportMode::Insert),
    ("bank_accounts", ImportMode::Insert),
    ("products", ImportMode::Merge),
    ("services", ImportMode::Merge),
    ("proposal_templates", ImportMode::Insert),
    ("proposals", ImportMode::Insert),
    ("proposal_items", ImportMode::Insert),
    ("projects", ImportMode::Insert),
    ("project_members", ImportMode::Insert),
    ("project_tasks", ImportMode::Insert),
    ("invoices", ImportMode::Insert),
    ("invoice_items", ImportMode::Insert),
    ("accounts_receivable", ImportMode::Insert),
    ("accounts_payable", ImportMode::Insert),
    ("payments", ImportMode::Insert),
    ("receipts", ImportMode::Insert),
    ("attachments", ImportMode::Insert),
    ("notes", ImportMode::Insert),
    ("activity_logs", ImportMode::Insert),
];

/// 默认计划清单
pub fn default_plans() -> Vec<TableImportPlan> {
    DEFAULT_TABLE_ORDER
        .iter()
        .map(|(table, mode)| TableImportPlan::for_table(table, *mode))
        .collect()
}

/// 从 JSON 文件读取计划清单
///
/// # 格式
/// ```json
/// [{"source_file": "companies.csv", "target_table": "companies", "mode": "MERGE"}]
/// ```
pub fn load_plans(path: &Path) -> ConfigResult<Vec<TableImportPlan>> {
    let contents = fs::read_to_string(path)
        .map_err(|e| ConfigError::PlanFile(format!("{}: {}", path.display(), e)))?;
    let plans: Vec<TableImportPlan> = serde_json::from_str(&contents)
        .map_err(|e| ConfigError::PlanFile(format!("{}: {}", path.display(), e)))?;

    if plans.is_empty() {
        return Err(ConfigError::PlanFile(format!(
            "{}: 计划清单为空",
            path.display()
        )));
    }

    info!(path = %path.display(), tables = plans.len(), "已加载导入计划文件");
    Ok(plans)
}

/// 计划清单: 指定文件优先,否则使用默认清单
pub fn resolve_plans(plan_file: Option<&Path>) -> ConfigResult<Vec<TableImportPlan>> {
    match plan_file {
        Some(path) => load_plans(path),
        None => Ok(default_plans()),
    }
}

/// 单表计划: 默认清单中的同名表,否则按 `<table>.csv` 约定
pub fn plan_for_table(table: &str, mode: ImportMode) -> TableImportPlan {
    default_plans()
        .into_iter()
        .find(|plan| plan.target_table == table)
        .map(|plan| TableImportPlan { mode, ..plan })
        .unwrap_or_else(|| TableImportPlan::for_table(table, mode))
}
