use base64::Engine as _;
use serde_json::{Map, Number, Value};
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column, Row as _, Sqlite, TypeInfo, ValueRef};

/// One result row: column name to scalar, in select-list order.
pub type Row = Map<String, Value>;

pub(crate) fn row_to_json(row: &SqliteRow) -> Result<Row, sqlx::Error> {
    let mut out = Map::with_capacity(row.columns().len());
    for column in row.columns() {
        let idx = column.ordinal();
        out.insert(column.name().to_string(), cell_to_json(row, idx)?);
    }
    Ok(out)
}

// The value's runtime storage class decides the JSON type, not the declared column type.
fn cell_to_json(row: &SqliteRow, idx: usize) -> Result<Value, sqlx::Error> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let type_name = raw.type_info().name().to_string();

    let value = match type_name.as_str() {
        "INTEGER" => Value::from(row.try_get::<i64, _>(idx)?),
        "REAL" => Number::from_f64(row.try_get::<f64, _>(idx)?).map_or(Value::Null, Value::Number),
        "BLOB" => Value::String(
            base64::engine::general_purpose::STANDARD.encode(row.try_get::<Vec<u8>, _>(idx)?),
        ),
        _ => Value::String(row.try_get::<String, _>(idx)?),
    };
    Ok(value)
}

/// Binds JSON scalars positionally. Arrays and objects are bound as their JSON text.
pub(crate) fn bind_params<'q>(
    mut query: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &'q [Value],
) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
    for param in params {
        query = match param {
            Value::Null => query.bind(None::<String>),
            Value::Bool(b) => query.bind(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => query.bind(i),
                None => query.bind(n.as_f64()),
            },
            Value::String(s) => query.bind(s.as_str()),
            other => query.bind(other.to_string()),
        };
    }
    query
}
