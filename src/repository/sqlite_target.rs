// ==========================================
// 业务管理系统导入引擎 - SQLite 目标库实现
// ==========================================
// 职责: 逐行执行参数化语句（rusqlite）
// 分块: 每块一个事务,每行一个 SAVEPOINT,失败行单独回滚
// ==========================================

use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::domain::types::TypedValue;
use crate::importer::statement_builder::{PreparedStatement, SqlDialect};
use crate::repository::error::{TargetError, TargetResult};
use crate::repository::target_connection::TargetConnection;
use async_trait::async_trait;
use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::{params_from_iter, Connection, ToSql};

const ROW_SAVEPOINT: &str = "import_row";

// TypedValue → SQLite 存储类型
impl ToSql for TypedValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            TypedValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            TypedValue::Integer(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            TypedValue::Float(f) => ToSqlOutput::Owned(Value::Real(*f)),
            TypedValue::Boolean(b) => ToSqlOutput::Owned(Value::Integer(i64::from(*b))),
            TypedValue::Null => ToSqlOutput::Owned(Value::Null),
        })
    }
}

// ==========================================
// SqliteTarget
// ==========================================
pub struct SqliteTarget {
    conn: Connection,
    db_path: String,
    in_chunk: bool,
}

impl SqliteTarget {
    /// 打开 SQLite 目标库（外键开启 + busy_timeout）
    pub fn open(db_path: &str) -> TargetResult<Self> {
        let conn =
            open_sqlite_connection(db_path).map_err(|e| TargetError::Fatal(e.to_string()))?;

        Ok(Self {
            conn,
            db_path: db_path.to_string(),
            in_chunk: false,
        })
    }

    /// 从已有连接创建（测试 / 内存库）
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Connection) -> TargetResult<Self> {
        configure_sqlite_connection(&conn).map_err(|e| TargetError::Fatal(e.to_string()))?;
        let db_path = conn.path().unwrap_or(":memory:").to_string();

        Ok(Self {
            conn,
            db_path,
            in_chunk: false,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // 事务控制语句失败一律视为致命
    fn control(&self, sql: &str) -> TargetResult<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| TargetError::Fatal(format!("{}: {}", sql, e)))
    }

    fn run_statement(&self, statement: &PreparedStatement) -> rusqlite::Result<usize> {
        let mut stmt = self.conn.prepare_cached(&statement.sql)?;
        stmt.execute(params_from_iter(statement.params.iter()))
    }
}

#[async_trait]
impl TargetConnection for SqliteTarget {
    fn dialect(&self) -> SqlDialect {
        SqlDialect::Sqlite
    }

    fn describe(&self) -> String {
        format!("sqlite://{}", self.db_path)
    }

    async fn begin_chunk(&mut self) -> TargetResult<()> {
        if !self.in_chunk {
            self.control("BEGIN")?;
            self.in_chunk = true;
        }
        Ok(())
    }

    async fn execute(&mut self, statement: &PreparedStatement) -> TargetResult<u64> {
        if !self.in_chunk {
            return self
                .run_statement(statement)
                .map(|n| n as u64)
                .map_err(TargetError::from);
        }

        self.control(&format!("SAVEPOINT {}", ROW_SAVEPOINT))?;
        match self.run_statement(statement) {
            Ok(n) => {
                self.control(&format!("RELEASE {}", ROW_SAVEPOINT))?;
                Ok(n as u64)
            }
            Err(e) => {
                let err = TargetError::from(e);
                if !err.is_fatal() {
                    self.control(&format!(
                        "ROLLBACK TO {sp}; RELEASE {sp}",
                        sp = ROW_SAVEPOINT
                    ))?;
                }
                Err(err)
            }
        }
    }

    async fn end_chunk(&mut self) -> TargetResult<()> {
        if self.in_chunk {
            self.control("COMMIT")?;
            self.in_chunk = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::TypedValue;

    fn target() -> SqliteTarget {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE companies (id TEXT PRIMARY KEY, name TEXT NOT NULL, active INTEGER);",
        )
        .unwrap();
        SqliteTarget::from_connection(conn).unwrap()
    }

    fn insert(id: &str, name: Option<&str>) -> PreparedStatement {
        PreparedStatement {
            sql: "INSERT INTO companies (id, name, active) VALUES (?1, ?2, ?3)".to_string(),
            params: vec![
                TypedValue::Text(id.to_string()),
                name.map(|n| TypedValue::Text(n.to_string()))
                    .unwrap_or(TypedValue::Null),
                TypedValue::Boolean(true),
            ],
            literal_sql: String::new(),
        }
    }

    fn count(target: &SqliteTarget) -> i64 {
        target
            .connection()
            .query_row("SELECT COUNT(*) FROM companies", [], |row| row.get(0))
            .unwrap()
    }

    #[tokio::test]
    async fn test_execute_without_chunk() {
        let mut target = target();
        assert_eq!(target.execute(&insert("a", Some("Acme"))).await.unwrap(), 1);

        let active: i64 = target
            .connection()
            .query_row("SELECT active FROM companies WHERE id = 'a'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(active, 1);
    }

    #[tokio::test]
    async fn test_failed_row_rolls_back_alone() {
        let mut target = target();
        target.begin_chunk().await.unwrap();

        assert!(target.execute(&insert("a", Some("Acme"))).await.is_ok());
        let err = target.execute(&insert("b", None)).await.unwrap_err();
        assert!(!err.is_fatal());
        let err = target.execute(&insert("a", Some("Dup"))).await.unwrap_err();
        assert!(!err.is_fatal());
        assert!(target.execute(&insert("c", Some("Globex"))).await.is_ok());

        target.end_chunk().await.unwrap();
        assert_eq!(count(&target), 2);
    }

    #[tokio::test]
    async fn test_end_chunk_without_begin_is_noop() {
        let mut target = target();
        target.end_chunk().await.unwrap();
        assert_eq!(target.dialect(), SqlDialect::Sqlite);
        assert!(target.describe().starts_with("sqlite://"));
    }
}
