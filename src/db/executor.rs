use serde::Serialize;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection, Executor as _};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::row::{Row, bind_params, row_to_json};
use crate::config::BasicConfig;
use crate::error::DbError;

/// Result of a mutating statement.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExecOutcome {
    pub last_insert_id: i64,
    pub rows_changed: u64,
}

/// Handle to the single SQLite file shared by all agents.
///
/// No pool: every call opens its own connection and closes it before returning, so two
/// callers working on the same file are only as isolated as SQLite's own locking makes them.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
    connect_opts: SqliteConnectOptions,
    op_timeout: Duration,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>, busy_timeout: Duration, op_timeout: Duration) -> Self {
        let path = path.into();
        let connect_opts = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .busy_timeout(busy_timeout);

        Self {
            path,
            connect_opts,
            op_timeout,
        }
    }

    pub fn from_config(cfg: &BasicConfig) -> Self {
        Self::new(
            cfg.database_path.clone(),
            cfg.db_busy_timeout(),
            cfg.db_timeout(),
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs a read statement and returns every row.
    pub async fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, DbError> {
        self.bounded(async {
            let mut conn = self.open().await?;
            let result = fetch_rows(&mut conn, sql, params).await;
            self.close(conn).await;
            result
        })
        .await
    }

    /// Runs one mutating statement.
    pub async fn exec(&self, sql: &str, params: &[Value]) -> Result<ExecOutcome, DbError> {
        self.bounded(async {
            let mut conn = self.open().await?;
            let result = execute_one(&mut conn, sql, params).await;
            self.close(conn).await;
            result
        })
        .await
    }

    /// Runs `statements` in order inside one transaction.
    ///
    /// The first failing statement stops the run: the rollback is awaited, then that
    /// statement's error is returned. Otherwise the commit is awaited. Either way the
    /// connection is closed only after the outcome is settled.
    pub async fn run_in_transaction<S>(&self, statements: &[S]) -> Result<(), DbError>
    where
        S: AsRef<str> + Sync,
    {
        self.bounded(async {
            let mut conn = self.open().await?;
            let result = execute_all(&mut conn, statements).await;
            self.close(conn).await;
            result
        })
        .await
    }

    async fn open(&self) -> Result<SqliteConnection, DbError> {
        Ok(self.connect_opts.connect().await?)
    }

    async fn close(&self, conn: SqliteConnection) {
        if let Err(e) = conn.close().await {
            warn!(path = %self.path.display(), error = %e, "Error closing database");
        }
    }

    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, DbError>>,
    ) -> Result<T, DbError> {
        tokio::time::timeout(self.op_timeout, fut)
            .await
            .unwrap_or(Err(DbError::Timeout(self.op_timeout)))
    }
}

async fn fetch_rows(
    conn: &mut SqliteConnection,
    sql: &str,
    params: &[Value],
) -> Result<Vec<Row>, DbError> {
    let rows = bind_params(sqlx::query(sql), params)
        .fetch_all(&mut *conn)
        .await?;
    let rows = rows
        .iter()
        .map(row_to_json)
        .collect::<Result<Vec<_>, _>>()?;
    debug!(rows = rows.len(), "Query executed");
    Ok(rows)
}

async fn execute_one(
    conn: &mut SqliteConnection,
    sql: &str,
    params: &[Value],
) -> Result<ExecOutcome, DbError> {
    let done = bind_params(sqlx::query(sql), params)
        .execute(&mut *conn)
        .await?;
    Ok(ExecOutcome {
        last_insert_id: done.last_insert_rowid(),
        rows_changed: done.rows_affected(),
    })
}

async fn execute_all<S>(conn: &mut SqliteConnection, statements: &[S]) -> Result<(), DbError>
where
    S: AsRef<str> + Sync,
{
    let mut tx = conn.begin().await?;

    for (index, statement) in statements.iter().enumerate() {
        let statement = statement.as_ref();
        if let Err(source) = tx.execute(sqlx::raw_sql(statement)).await {
            warn!(
                index,
                statement = %statement,
                error = %source,
                "Statement failed; rolling back transaction"
            );
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            return Err(DbError::Statement {
                index,
                statement: statement.to_string(),
                source,
            });
        }
    }

    tx.commit().await?;
    info!(statements = statements.len(), "Transaction committed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_db(prefix: &str) -> Database {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!(
            "dbagent-{prefix}-{}-{}.sqlite",
            std::process::id(),
            nanos
        ));
        Database::new(path, Duration::from_secs(5), Duration::from_secs(30))
    }

    #[tokio::test]
    async fn exec_reports_last_insert_id_and_changes() {
        let db = unique_db("exec");
        db.exec("CREATE TABLE t (id INTEGER PRIMARY KEY, v TEXT)", &[])
            .await
            .expect("create");

        let out = db
            .exec(
                "INSERT INTO t (v) VALUES (?), (?)",
                &[Value::from("a"), Value::from("b")],
            )
            .await
            .expect("insert");
        assert_eq!(out.rows_changed, 2);
        assert_eq!(out.last_insert_id, 2);

        let out = db
            .exec("UPDATE t SET v = ? WHERE id = ?", &[Value::from("z"), Value::from(1)])
            .await
            .expect("update");
        assert_eq!(out.rows_changed, 1);

        let _ = std::fs::remove_file(db.path());
    }

    #[tokio::test]
    async fn query_maps_storage_classes_to_json() {
        let db = unique_db("query");
        db.run_in_transaction(&[
            "CREATE TABLE m (i INTEGER, r REAL, s TEXT, b BLOB, n TEXT)",
            "INSERT INTO m VALUES (42, 1.5, 'hi', x'0102', NULL)",
        ])
        .await
        .expect("setup");

        let rows = db.query("SELECT i, r, s, b, n FROM m", &[]).await.expect("query");
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row["i"], Value::from(42));
        assert_eq!(row["r"], Value::from(1.5));
        assert_eq!(row["s"], Value::from("hi"));
        assert_eq!(row["b"], Value::from("AQI="));
        assert_eq!(row["n"], Value::Null);

        let columns: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(columns, ["i", "r", "s", "b", "n"]);

        let _ = std::fs::remove_file(db.path());
    }

    #[tokio::test]
    async fn query_binds_positional_params() {
        let db = unique_db("params");
        db.run_in_transaction(&[
            "CREATE TABLE p (id INTEGER, name TEXT)",
            "INSERT INTO p VALUES (1, 'a'), (2, 'b'), (3, 'c')",
        ])
        .await
        .expect("setup");

        let rows = db
            .query("SELECT name FROM p WHERE id >= ? ORDER BY id", &[Value::from(2)])
            .await
            .expect("query");
        let names: Vec<&Value> = rows.iter().map(|r| &r["name"]).collect();
        assert_eq!(names, [&Value::from("b"), &Value::from("c")]);

        let _ = std::fs::remove_file(db.path());
    }

    fn assert_send<T: Send>(_: T) {}

    #[test]
    fn executor_futures_are_send() {
        let db = unique_db("send");
        assert_send(db.query("SELECT 1", &[]));
        assert_send(db.exec("SELECT 1", &[]));
        assert_send(db.run_in_transaction(&["SELECT 1"]));
        let owned = vec!["SELECT 1".to_string()];
        assert_send(db.run_in_transaction(&owned));
    }

    #[tokio::test]
    async fn held_write_lock_hits_operation_timeout() {
        let db = unique_db("timeout");
        db.exec("CREATE TABLE t (id INTEGER)", &[])
            .await
            .expect("create");

        let mut holder = SqliteConnectOptions::new()
            .filename(db.path())
            .connect()
            .await
            .expect("second connection");
        sqlx::raw_sql("BEGIN IMMEDIATE; INSERT INTO t VALUES (1);")
            .execute(&mut holder)
            .await
            .expect("hold write lock");

        let impatient = Database::new(
            db.path().to_path_buf(),
            Duration::from_secs(10),
            Duration::from_millis(200),
        );
        let err = impatient
            .exec("INSERT INTO t VALUES (2)", &[])
            .await
            .expect_err("writer must wait on the lock");
        assert!(matches!(err, DbError::Timeout(d) if d == Duration::from_millis(200)));

        sqlx::raw_sql("ROLLBACK")
            .execute(&mut holder)
            .await
            .expect("release lock");
        holder.close().await.expect("close");

        let _ = std::fs::remove_file(db.path());
    }

    #[tokio::test]
    async fn invalid_sql_is_an_error_not_a_panic() {
        let db = unique_db("invalid");
        let err = db.query("SELEC nothing", &[]).await.expect_err("must fail");
        assert!(matches!(err, DbError::Sqlx(_)));

        let _ = std::fs::remove_file(db.path());
    }
}
