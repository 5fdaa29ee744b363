// ==========================================
// 业务管理系统导入引擎 - SQL Server 目标库实现
// ==========================================
// 驱动: tiberius（TDS 7.3 + rustls）
// 执行: 每行一条参数化语句,自动提交
// ==========================================

use crate::config::target_config::{TargetConfig, TargetEngine};
use crate::domain::types::TypedValue;
use crate::importer::statement_builder::{PreparedStatement, SqlDialect};
use crate::repository::error::{TargetError, TargetResult};
use crate::repository::target_connection::TargetConnection;
use async_trait::async_trait;
use std::borrow::Cow;
use std::time::Instant;
use tiberius::{AuthMethod, Client, ColumnData, Config, EncryptionLevel, ToSql};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info};

// TypedValue → TDS 参数
// NULL 以 NVARCHAR 发送,可隐式转换到任意列类型
impl ToSql for TypedValue {
    fn to_sql(&self) -> ColumnData<'_> {
        match self {
            TypedValue::Text(s) => ColumnData::String(Some(Cow::Borrowed(s.as_str()))),
            TypedValue::Integer(i) => ColumnData::I64(Some(*i)),
            TypedValue::Float(f) => ColumnData::F64(Some(*f)),
            TypedValue::Boolean(b) => ColumnData::Bit(Some(*b)),
            TypedValue::Null => ColumnData::String(None),
        }
    }
}

// ==========================================
// MssqlTarget
// ==========================================
pub struct MssqlTarget {
    client: Client<Compat<TcpStream>>,
    description: String,
}

impl MssqlTarget {
    /// 建立连接（SQL Server 身份验证）
    #[tracing::instrument(skip(config), fields(db = %config.describe()))]
    pub async fn connect(config: &TargetConfig) -> TargetResult<Self> {
        if config.engine != TargetEngine::SqlServer {
            return Err(TargetError::Fatal(format!(
                "目标库类型不是 sqlsrv: {}",
                config.engine
            )));
        }

        let mut tds = Config::new();
        tds.host(&config.host);
        tds.port(config.port);
        tds.database(&config.database);
        tds.authentication(AuthMethod::sql_server(&config.username, &config.password));
        if config.trust_cert {
            tds.trust_cert();
        }
        tds.encryption(EncryptionLevel::Required);

        let tcp = TcpStream::connect(tds.get_addr())
            .await
            .map_err(|e| TargetError::Fatal(format!("TCP 连接失败: {}", e)))?;
        tcp.set_nodelay(true)
            .map_err(|e| TargetError::Fatal(e.to_string()))?;

        let client = Client::connect(tds, tcp.compat_write())
            .await
            .map_err(|e| TargetError::Fatal(format!("登录失败: {}", e)))?;

        info!("已连接 SQL Server");
        Ok(Self {
            client,
            description: config.describe(),
        })
    }
}

#[async_trait]
impl TargetConnection for MssqlTarget {
    fn dialect(&self) -> SqlDialect {
        SqlDialect::SqlServer
    }

    fn describe(&self) -> String {
        self.description.clone()
    }

    async fn execute(&mut self, statement: &PreparedStatement) -> TargetResult<u64> {
        let start = Instant::now();
        let params: Vec<&dyn ToSql> = statement.params.iter().map(|p| p as &dyn ToSql).collect();

        let result = self.client.execute(statement.sql.as_str(), &params[..]).await?;
        let affected = result.rows_affected().iter().sum::<u64>();

        debug!(
            affected_rows = affected,
            duration_ms = start.elapsed().as_millis() as u64,
            "execute completed"
        );
        Ok(affected)
    }
}
