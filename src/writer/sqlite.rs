use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Transaction};
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

use super::schema_gen::{generate_create_table, generate_insert};
use crate::entity::EntityCounts;
use crate::error::{EtlError, Result};
use crate::parser::{to_sql_value, SqlValue, Table};
use crate::schema::{Column, TableSchema, ALL_TABLES, ALL_VITRINE};

/// What `ensure_table` found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaStatus {
    Created,
    AlreadyExists,
}

impl fmt::Display for SchemaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaStatus::Created => write!(f, "created"),
            SchemaStatus::AlreadyExists => write!(f, "already exists"),
        }
    }
}

/// Owns the database connection for the lifetime of a run
pub struct SqliteWriter {
    conn: Connection,
}

impl SqliteWriter {
    /// Open (or create) the database file. Existing data is kept.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        Self::configure(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::configure(Connection::open_in_memory()?)
    }

    fn configure(conn: Connection) -> Result<Self> {
        // Foreign keys stay declared but unenforced
        conn.execute_batch(
            "PRAGMA foreign_keys = OFF;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Begin the single transaction a run executes in
    pub fn session(&mut self) -> Result<LoadSession<'_>> {
        Ok(LoadSession {
            tx: self.conn.transaction()?,
        })
    }

    /// Create every table that does not exist yet
    pub fn create_schema(&mut self) -> Result<Vec<(&'static str, SchemaStatus)>> {
        let session = self.session()?;
        let mut statuses = Vec::with_capacity(ALL_TABLES.len());
        for schema in ALL_TABLES {
            statuses.push((schema.name, session.ensure_table(schema)?));
        }
        session.commit()?;
        Ok(statuses)
    }

    pub fn count_rows(&self, schema: &TableSchema) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", schema.name);
        Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
    }

    /// Optimize and close the connection
    pub fn close(self) -> Result<()> {
        self.conn.execute_batch("PRAGMA optimize;")?;
        self.conn.close().map_err(|(_, e)| EtlError::Database(e))
    }
}

/// One open transaction; dropping it without `commit` rolls everything back
pub struct LoadSession<'conn> {
    tx: Transaction<'conn>,
}

impl LoadSession<'_> {
    /// Create the table unless it already exists
    pub fn ensure_table(&self, schema: &TableSchema) -> Result<SchemaStatus> {
        if table_exists(&self.tx, schema.name)? {
            warn!(table = schema.name, "table already exists, keeping it");
            return Ok(SchemaStatus::AlreadyExists);
        }

        let sql = generate_create_table(schema);
        debug!(table = schema.name, %sql, "creating table");
        self.tx.execute_batch(&sql)?;
        Ok(SchemaStatus::Created)
    }

    /// Insert every fetched row into the table, all or nothing.
    ///
    /// Values are matched to table columns by source field name. A batch
    /// that fails part way leaves no rows behind.
    pub fn load_rows(&mut self, schema: &'static TableSchema, table: &Table) -> Result<usize> {
        if table.is_empty() {
            return Ok(0);
        }

        let columns: Vec<&Column> = schema.loaded_columns().collect();
        let indices = resolve_columns(schema, &columns, table)?;
        let names: Vec<&str> = columns.iter().map(|c| c.name).collect();
        let sql = generate_insert(schema.name, &names);

        let savepoint = self.tx.savepoint()?;
        match insert_rows(&savepoint, &sql, &columns, &indices, table) {
            Ok(count) => {
                savepoint.commit()?;
                debug!(table = schema.name, rows = count, "batch inserted");
                Ok(count)
            }
            Err(source) => {
                drop(savepoint);
                warn!(table = schema.name, error = %source, "batch rolled back");
                Err(EtlError::Load {
                    table: schema.name,
                    source,
                })
            }
        }
    }

    /// Insert the summary row and return its id
    pub fn insert_summary(&self, counts: &EntityCounts) -> Result<i64> {
        let sql = generate_insert(
            ALL_VITRINE.name,
            &["count_missions", "count_rockets", "count_launches"],
        );
        self.tx.execute(
            &sql,
            params![
                counts.missions as i64,
                counts.rockets as i64,
                counts.launches as i64
            ],
        )?;
        Ok(self.tx.last_insert_rowid())
    }

    pub fn commit(self) -> Result<()> {
        self.tx.commit()?;
        info!("transaction committed");
        Ok(())
    }
}

pub fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Position of each column's source field in the fetched table
fn resolve_columns(
    schema: &'static TableSchema,
    columns: &[&Column],
    table: &Table,
) -> Result<Vec<Option<usize>>> {
    columns
        .iter()
        .map(|col| {
            let source = col.source.unwrap_or(col.name);
            let idx = table.column_index(source);
            if idx.is_none() {
                if col.primary_key {
                    return Err(EtlError::MissingColumn {
                        table: schema.name,
                        column: col.name,
                    });
                }
                debug!(table = schema.name, column = col.name, "source field absent, binding NULL");
            }
            Ok(idx)
        })
        .collect()
}

fn insert_rows(
    conn: &Connection,
    sql: &str,
    columns: &[&Column],
    indices: &[Option<usize>],
    table: &Table,
) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare_cached(sql)?;
    let mut count = 0;

    for row in table.rows() {
        let values: Vec<SqlValue> = columns
            .iter()
            .zip(indices)
            .map(|(col, idx)| to_sql_value(idx.and_then(|i| row.get(i)), col))
            .collect();
        stmt.execute(params_from_iter(values.iter()))?;
        count += 1;
    }

    Ok(count)
}
