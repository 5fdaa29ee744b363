// ==========================================
// 业务管理系统导入引擎 - 目标库配置
// ==========================================
// 来源: 进程环境变量（启动时读取一次）
// 红线: 校验失败必须在建立连接之前拒绝运行
// ==========================================

use crate::importer::statement_builder::SqlDialect;
use crate::perf::DEFAULT_SLOW_SQL_MS;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

// 环境变量名
pub mod env_keys {
    pub const DB_CONNECTION: &str = "DB_CONNECTION";
    pub const DB_HOST: &str = "DB_HOST";
    pub const DB_PORT: &str = "DB_PORT";
    pub const DB_DATABASE: &str = "DB_DATABASE";
    pub const DB_USERNAME: &str = "DB_USERNAME";
    pub const DB_PASSWORD: &str = "DB_PASSWORD";
    pub const DB_TRUST_CERT: &str = "DB_TRUST_CERT";
    pub const IMPORT_SOURCE_DIR: &str = "IMPORT_SOURCE_DIR";
    pub const IMPORT_BATCH_SIZE: &str = "IMPORT_BATCH_SIZE";
    pub const IMPORT_ERROR_LOG_LIMIT: &str = "IMPORT_ERROR_LOG_LIMIT";
    pub const IMPORT_PLAN_FILE: &str = "IMPORT_PLAN_FILE";
    pub const IMPORT_SLOW_SQL_MS: &str = "IMPORT_SLOW_SQL_MS";
}

pub const DEFAULT_SOURCE_DIR: &str = "storage/exports";
pub const DEFAULT_BATCH_SIZE: usize = 500;
pub const DEFAULT_ERROR_LOG_LIMIT: usize = 5;

// ==========================================
// ConfigError - 配置错误
// ==========================================
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("缺少环境变量: {0}")]
    MissingVar(String),

    #[error("不支持的数据库类型: {0} (支持: sqlsrv, sqlite)")]
    UnsupportedEngine(String),

    #[error("配置值无效: {key}={value}")]
    InvalidValue { key: String, value: String },

    #[error("CSV 文件不存在: {0}")]
    SourceMissing(String),

    #[error("导入计划文件无法读取: {0}")]
    PlanFile(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// TargetEngine - 目标库类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetEngine {
    SqlServer,
    Sqlite,
}

impl TargetEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetEngine::SqlServer => "sqlsrv",
            TargetEngine::Sqlite => "sqlite",
        }
    }

    pub fn dialect(&self) -> SqlDialect {
        match self {
            TargetEngine::SqlServer => SqlDialect::SqlServer,
            TargetEngine::Sqlite => SqlDialect::Sqlite,
        }
    }
}

impl FromStr for TargetEngine {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "sqlsrv" => Ok(TargetEngine::SqlServer),
            "sqlite" => Ok(TargetEngine::Sqlite),
            other => Err(ConfigError::UnsupportedEngine(other.to_string())),
        }
    }
}

impl fmt::Display for TargetEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// TargetConfig - 目标库连接参数
// ==========================================
#[derive(Clone, PartialEq, Eq)]
pub struct TargetConfig {
    pub engine: TargetEngine,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub trust_cert: bool,
}

// 口令不进日志
impl fmt::Debug for TargetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetConfig")
            .field("engine", &self.engine)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("trust_cert", &self.trust_cert)
            .finish()
    }
}

impl TargetConfig {
    /// 从进程环境读取
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取（测试注入）
    ///
    /// # 规则
    /// - sqlsrv: 六个 DB_* 变量全部必填
    /// - sqlite: 只需 DB_DATABASE（文件路径）
    /// - 其他类型一律拒绝
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| get(key).ok_or_else(|| ConfigError::MissingVar(key.to_string()));

        let engine: TargetEngine = require(env_keys::DB_CONNECTION)?.parse()?;

        match engine {
            TargetEngine::SqlServer => {
                let host = require(env_keys::DB_HOST)?;
                let port_raw = require(env_keys::DB_PORT)?;
                let database = require(env_keys::DB_DATABASE)?;
                let username = require(env_keys::DB_USERNAME)?;
                let password = require(env_keys::DB_PASSWORD)?;

                let port = port_raw
                    .trim()
                    .parse::<u16>()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: env_keys::DB_PORT.to_string(),
                        value: port_raw.clone(),
                    })?;

                Ok(Self {
                    engine,
                    host,
                    port,
                    database,
                    username,
                    password,
                    trust_cert: get(env_keys::DB_TRUST_CERT)
                        .map(|v| is_true(&v))
                        .unwrap_or(false),
                })
            }
            TargetEngine::Sqlite => Ok(Self {
                engine,
                host: String::new(),
                port: 0,
                database: require(env_keys::DB_DATABASE)?,
                username: String::new(),
                password: String::new(),
                trust_cert: false,
            }),
        }
    }

    pub fn dialect(&self) -> SqlDialect {
        self.engine.dialect()
    }

    /// 连接描述（不含口令）
    pub fn describe(&self) -> String {
        match self.engine {
            TargetEngine::SqlServer => format!(
                "sqlsrv://{}@{}:{}/{}",
                self.username, self.host, self.port, self.database
            ),
            TargetEngine::Sqlite => format!("sqlite://{}", self.database),
        }
    }
}

// ==========================================
// ImportSettings - 导入运行参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSettings {
    pub source_dir: PathBuf,
    pub batch_size: usize,
    pub error_log_limit: usize,
    pub plan_file: Option<PathBuf>,
    /// 慢语句阈值（毫秒）,0 关闭
    pub slow_sql_ms: u64,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            batch_size: DEFAULT_BATCH_SIZE,
            error_log_limit: DEFAULT_ERROR_LOG_LIMIT,
            plan_file: None,
            slow_sql_ms: DEFAULT_SLOW_SQL_MS,
        }
    }
}

impl ImportSettings {
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let batch_size = match get(env_keys::IMPORT_BATCH_SIZE) {
            Some(raw) => parse_positive(env_keys::IMPORT_BATCH_SIZE, &raw)?,
            None => defaults.batch_size,
        };
        let error_log_limit = match get(env_keys::IMPORT_ERROR_LOG_LIMIT) {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: env_keys::IMPORT_ERROR_LOG_LIMIT.to_string(),
                    value: raw.clone(),
                })?,
            None => defaults.error_log_limit,
        };
        let slow_sql_ms = match get(env_keys::IMPORT_SLOW_SQL_MS) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: env_keys::IMPORT_SLOW_SQL_MS.to_string(),
                    value: raw.clone(),
                })?,
            None => defaults.slow_sql_ms,
        };

        Ok(Self {
            source_dir: get(env_keys::IMPORT_SOURCE_DIR)
                .map(PathBuf::from)
                .unwrap_or(defaults.source_dir),
            batch_size,
            error_log_limit,
            plan_file: get(env_keys::IMPORT_PLAN_FILE).map(PathBuf::from),
            slow_sql_ms,
        })
    }

    pub fn with_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = dir.into();
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

fn parse_positive(key: &str, raw: &str) -> ConfigResult<usize> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}

fn is_true(v: &str) -> bool {
    matches!(
        v.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn sqlsrv_vars() -> Vec<(&'static str, &'static str)> {
        vec![
            ("DB_CONNECTION", "sqlsrv"),
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "1433"),
            ("DB_DATABASE", "erp"),
            ("DB_USERNAME", "importer"),
            ("DB_PASSWORD", "secret"),
        ]
    }

    #[test]
    fn test_sqlsrv_complete() {
        let config = TargetConfig::from_lookup(lookup(&sqlsrv_vars())).unwrap();
        assert_eq!(config.engine, TargetEngine::SqlServer);
        assert_eq!(config.port, 1433);
        assert!(!config.trust_cert);
        assert_eq!(config.dialect(), SqlDialect::SqlServer);
        assert!(!format!("{:?}", config).contains("secret"));
        assert_eq!(config.describe(), "sqlsrv://importer@db.internal:1433/erp");
    }

    #[test]
    fn test_sqlsrv_missing_var() {
        for missing in ["DB_HOST", "DB_PORT", "DB_DATABASE", "DB_USERNAME", "DB_PASSWORD"] {
            let vars: Vec<_> = sqlsrv_vars()
                .into_iter()
                .filter(|(k, _)| *k != missing)
                .collect();
            let err = TargetConfig::from_lookup(lookup(&vars)).unwrap_err();
            assert_eq!(err, ConfigError::MissingVar(missing.to_string()));
        }
    }

    #[test]
    fn test_invalid_port() {
        let mut vars = sqlsrv_vars();
        vars[2] = ("DB_PORT", "not-a-port");
        let err = TargetConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_unsupported_engine() {
        let err = TargetConfig::from_lookup(lookup(&[("DB_CONNECTION", "mysql")])).unwrap_err();
        assert_eq!(err, ConfigError::UnsupportedEngine("mysql".to_string()));

        let err = TargetConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::MissingVar("DB_CONNECTION".to_string()));
    }

    #[test]
    fn test_sqlite_only_needs_database() {
        let config = TargetConfig::from_lookup(lookup(&[
            ("DB_CONNECTION", "sqlite"),
            ("DB_DATABASE", "/tmp/erp.db"),
        ]))
        .unwrap();
        assert_eq!(config.engine, TargetEngine::Sqlite);
        assert_eq!(config.describe(), "sqlite:///tmp/erp.db");

        let err = TargetConfig::from_lookup(lookup(&[("DB_CONNECTION", "sqlite")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingVar("DB_DATABASE".to_string()));
    }

    #[test]
    fn test_import_settings_defaults_and_overrides() {
        let settings = ImportSettings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, ImportSettings::default());

        let settings = ImportSettings::from_lookup(lookup(&[
            ("IMPORT_SOURCE_DIR", "/data/exports"),
            ("IMPORT_BATCH_SIZE", "50"),
            ("IMPORT_ERROR_LOG_LIMIT", "0"),
            ("IMPORT_PLAN_FILE", "plans.json"),
            ("IMPORT_SLOW_SQL_MS", "0"),
        ]))
        .unwrap();
        assert_eq!(settings.source_dir, PathBuf::from("/data/exports"));
        assert_eq!(settings.batch_size, 50);
        assert_eq!(settings.error_log_limit, 0);
        assert_eq!(settings.plan_file, Some(PathBuf::from("plans.json")));
        assert_eq!(settings.slow_sql_ms, 0);

        let err = ImportSettings::from_lookup(lookup(&[("IMPORT_BATCH_SIZE", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err =
            ImportSettings::from_lookup(lookup(&[("IMPORT_SLOW_SQL_MS", "fast")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "IMPORT_SLOW_SQL_MS"));
    }
}
