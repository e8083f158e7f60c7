use rusqlite::types::{ToSql, ToSqlOutput};
use serde_json::Value;

use crate::schema::{Column, ColumnType};

/// Separator used when a list is stored in a single text column
const LIST_SEPARATOR: &str = ", ";

/// A single value ready for binding
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            SqlValue::Integer(i) => ToSqlOutput::from(*i),
            SqlValue::Real(f) => ToSqlOutput::from(*f),
            SqlValue::Text(s) => ToSqlOutput::from(s.as_str()),
        })
    }
}

/// Convert a fetched JSON value to the SQL value for a column
pub fn to_sql_value(value: Option<&Value>, column: &Column) -> SqlValue {
    let value = match value {
        None | Some(Value::Null) => return SqlValue::Null,
        Some(v) => v,
    };

    match column.col_type {
        ColumnType::Integer | ColumnType::Serial => value
            .as_i64()
            .or_else(|| value.as_f64().map(|f| f as i64))
            .or_else(|| value.as_bool().map(i64::from))
            .map(SqlValue::Integer)
            .unwrap_or(SqlValue::Null),
        ColumnType::Float => value
            .as_f64()
            .map(SqlValue::Real)
            .unwrap_or(SqlValue::Null),
        ColumnType::Boolean => value
            .as_bool()
            .map(|b| SqlValue::Integer(i64::from(b)))
            .unwrap_or(SqlValue::Null),
        ColumnType::Text => SqlValue::Text(render_text(value)),
        ColumnType::Char(width) => SqlValue::Text(truncate_chars(render_text(value), width)),
    }
}

/// Text form of a JSON value: strings as-is, lists joined, others as JSON
fn render_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .filter(|v| !v.is_null())
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR),
        other => other.to_string(),
    }
}

/// Keep at most `width` characters
pub fn truncate_chars(mut s: String, width: usize) -> String {
    if let Some((idx, _)) = s.char_indices().nth(width) {
        s.truncate(idx);
    }
    s
}
