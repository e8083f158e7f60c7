use std::collections::HashSet;

use crate::entity::EntityKind;

/// Width of every fixed-width text column
pub const CHAR_WIDTH: usize = 50;

/// Column data type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnType {
    /// Fixed-width text, values truncated to the width on insert
    Char(usize),
    Text,
    Integer,
    Float,
    Boolean,
    /// Auto-assigned integer key
    Serial,
}

impl ColumnType {
    /// SQL type as written in CREATE TABLE
    pub fn sql_type(&self) -> String {
        match self {
            ColumnType::Char(width) => format!("CHAR({})", width),
            ColumnType::Text => "TEXT".to_string(),
            ColumnType::Integer => "INT".to_string(),
            ColumnType::Float => "FLOAT".to_string(),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Serial => "INTEGER".to_string(),
        }
    }
}

/// Column definition
#[derive(Debug, Clone)]
pub struct Column {
    pub name: &'static str,
    pub col_type: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
    /// Flattened field name in the fetched table (e.g. "diameter.meters")
    pub source: Option<&'static str>,
}

impl Column {
    /// Create an optional (nullable) column
    pub const fn new(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: true,
            primary_key: false,
            source: None,
        }
    }

    /// Create a fixed-width text column of the default width
    pub const fn char(name: &'static str) -> Self {
        Self::new(name, ColumnType::Char(CHAR_WIDTH))
    }

    /// Create a non-nullable primary key column
    pub const fn primary(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: false,
            primary_key: true,
            source: None,
        }
    }

    /// Set the fetched field this column is loaded from
    pub const fn field(self, field: &'static str) -> Self {
        Self {
            source: Some(field),
            ..self
        }
    }
}

/// Foreign key reference, declared but not enforced
#[derive(Debug, Clone)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references_table: &'static str,
    pub references_column: &'static str,
}

impl ForeignKey {
    pub const fn new(
        column: &'static str,
        references_table: &'static str,
        references_column: &'static str,
    ) -> Self {
        Self {
            column,
            references_table,
            references_column,
        }
    }
}

/// Table schema definition
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: &'static str,
    /// Entity kind whose fetched rows fill this table, if any
    pub source: Option<EntityKind>,
    pub columns: &'static [Column],
    pub foreign_keys: &'static [ForeignKey],
}

impl TableSchema {
    /// Columns that are filled from fetched data, in INSERT order
    pub fn loaded_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.source.is_some())
    }

    /// The primary key column, if declared
    pub fn primary_key(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.primary_key)
    }

    /// Get all tables this table references
    pub fn dependencies(&self) -> HashSet<&'static str> {
        self.foreign_keys
            .iter()
            .map(|fk| fk.references_table)
            .collect()
    }
}
