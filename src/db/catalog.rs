use serde::Serialize;
use serde_json::Value;

use super::Database;
use crate::error::DbError;

/// One entry of `pragma_table_info`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub primary_key: bool,
    pub not_null: bool,
}

const LIST_TABLES: &str = "SELECT name FROM sqlite_master \
     WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
     ORDER BY rowid";

// Table-valued pragma so the name is bound, not spliced into the SQL.
const TABLE_COLUMNS: &str = "SELECT name, type, pk, \"notnull\" \
     FROM pragma_table_info(?) ORDER BY cid";

impl Database {
    /// User tables in creation order; SQLite's internal tables are skipped.
    pub async fn list_tables(&self) -> Result<Vec<String>, DbError> {
        let rows = self.query(LIST_TABLES, &[]).await?;
        Ok(rows
            .into_iter()
            .filter_map(|mut row| match row.remove("name") {
                Some(Value::String(name)) => Some(name),
                _ => None,
            })
            .collect())
    }

    pub async fn table_columns(&self, table: &str) -> Result<Vec<ColumnInfo>, DbError> {
        let rows = self.query(TABLE_COLUMNS, &[Value::from(table)]).await?;
        Ok(rows
            .iter()
            .map(|row| ColumnInfo {
                name: row
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                data_type: row
                    .get("type")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                primary_key: row.get("pk").and_then(Value::as_i64).unwrap_or(0) > 0,
                not_null: row.get("notnull").and_then(Value::as_i64).unwrap_or(0) != 0,
            })
            .collect())
    }
}
