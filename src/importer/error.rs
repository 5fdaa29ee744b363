// ==========================================
// 业务管理系统导入引擎 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: 配置错误（致命）/ 连接中断（致命）/ 表级错误（可恢复）
// 说明: 单元格类型异常不是错误,由 ValueCoercer 兜底
// ==========================================

use crate::config::ConfigError;
use crate::domain::import::ImportReport;
use crate::repository::TargetError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 配置错误 =====
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    // ===== 文件相关错误 =====
    #[error("源文件读取失败: {0}")]
    SourceRead(String),

    #[error("CSV 解析失败: {0}")]
    CsvParse(String),

    // ===== 语句构建错误 =====
    #[error("主键列缺失 (表 {table}): 表头中没有 {column}")]
    PrimaryKeyMissing { table: String, column: String },

    #[error("空记录无法生成语句 (表 {0})")]
    EmptyRecord(String),

    // ===== 目标库错误 =====
    #[error("目标库连接中断: {0}")]
    Connectivity(String),

    #[error("目标库执行失败: {0}")]
    Target(String),

    // ===== 中止: 携带截至中止时的逐表结果 =====
    #[error("导入中止: {source}")]
    Aborted {
        source: Box<ImportError>,
        partial: Box<ImportReport>,
    },
}

impl ImportError {
    /// 是否致命（需中止整个导入）
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ImportError::Config(_) | ImportError::Connectivity(_) | ImportError::Aborted { .. }
        )
    }

    /// 中止前已完成部分的报告（仅 Aborted 有）
    pub fn partial_report(&self) -> Option<&ImportReport> {
        match self {
            ImportError::Aborted { partial, .. } => Some(partial.as_ref()),
            _ => None,
        }
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::SourceRead(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParse(err.to_string())
    }
}

// 实现 From<TargetError>: 只有致命错误升级为 Connectivity
impl From<TargetError> for ImportError {
    fn from(err: TargetError) -> Self {
        match err {
            TargetError::Fatal(msg) => ImportError::Connectivity(msg),
            TargetError::Row(msg) => ImportError::Target(msg),
        }
    }
}

/// Result 类型别名
pub type ImporterResult<T> = Result<T, ImportError>;
