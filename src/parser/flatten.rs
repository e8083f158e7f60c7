use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::entity::EntityKind;
use crate::error::{EtlError, Result};

/// Flattened records: named columns and one value per column per row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value of a named column in a row, `None` when either is out of range
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Rows as flat JSON objects keyed by column name
    pub fn to_json_rows(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let obj: Map<String, Value> = self
                    .columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect();
                Value::Object(obj)
            })
            .collect()
    }
}

/// Flatten an array of JSON records into a table.
///
/// Nested objects become dotted column names (`rocket.rocket.id`). Columns
/// appear in first-seen order; rows missing a column hold `null`.
pub fn flatten_records(kind: EntityKind, records: &[Value]) -> Result<Table> {
    let mut columns: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut flat_rows: Vec<Vec<(usize, Value)>> = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let obj = record
            .as_object()
            .ok_or(EtlError::NotAnObject { kind, index })?;

        let mut fields = Vec::new();
        flatten_object(obj, "", &mut fields);

        let row = fields
            .into_iter()
            .map(|(name, value)| {
                let pos = *positions.entry(name.clone()).or_insert_with(|| {
                    columns.push(name);
                    columns.len() - 1
                });
                (pos, value)
            })
            .collect();
        flat_rows.push(row);
    }

    let rows = flat_rows
        .into_iter()
        .map(|fields| {
            let mut row = vec![Value::Null; columns.len()];
            for (pos, value) in fields {
                row[pos] = value;
            }
            row
        })
        .collect();

    Ok(Table { columns, rows })
}

fn flatten_object(obj: &Map<String, Value>, prefix: &str, out: &mut Vec<(String, Value)>) {
    for (key, value) in obj {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            Value::Object(nested) if !nested.is_empty() => flatten_object(nested, &name, out),
            _ => out.push((name, value.clone())),
        }
    }
}
