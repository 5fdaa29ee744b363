// ==========================================
// 业务管理系统导入引擎 - 目标库错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: 行级失败（计数后继续）/ 致命失败（中止整个导入）
// ==========================================

use rusqlite::ErrorCode;
use thiserror::Error;

/// 目标库错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TargetError {
    /// 约束违反 / 外键违反 / 类型不符 —— 只影响当前行
    #[error("行写入失败: {0}")]
    Row(String),

    /// 连接中断 / 磁盘故障 —— 后续行不可能成功
    #[error("目标库不可用: {0}")]
    Fatal(String),
}

impl TargetError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, TargetError::Fatal(_))
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for TargetError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _) => match e.code {
                ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
                | ErrorCode::DatabaseCorrupt
                | ErrorCode::SystemIoFailure
                | ErrorCode::DiskFull
                | ErrorCode::OutOfMemory
                | ErrorCode::ReadOnly
                | ErrorCode::PermissionDenied
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::FileLockingProtocolFailed
                | ErrorCode::InternalMalfunction => TargetError::Fatal(err.to_string()),
                _ => TargetError::Row(err.to_string()),
            },
            _ => TargetError::Row(err.to_string()),
        }
    }
}

/// SQL Server 严重级别 >= 20 会断开连接
const MSSQL_FATAL_SEVERITY: u8 = 20;

// 服务器报错按严重级别划分: < 20 只影响当前语句
fn is_row_level_severity(class: u8) -> bool {
    class < MSSQL_FATAL_SEVERITY
}

// 实现 From<tiberius::error::Error>
impl From<tiberius::error::Error> for TargetError {
    fn from(err: tiberius::error::Error) -> Self {
        use tiberius::error::Error as TdsError;

        match &err {
            TdsError::Server(token) if is_row_level_severity(token.class()) => {
                TargetError::Row(err.to_string())
            }
            TdsError::Conversion(_) | TdsError::Encoding(_) | TdsError::Utf8 | TdsError::Utf16 => {
                TargetError::Row(err.to_string())
            }
            _ => TargetError::Fatal(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type TargetResult<T> = Result<T, TargetError>;
