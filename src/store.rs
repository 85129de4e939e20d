//! Table Store
//!
//! Relational destinations for datasets. Writing a table always replaces any
//! existing table of the same name.
use crate::config::DbConfig;
use crate::constants::{INSERT_BATCH_ROWS, MAX_IDENTIFIER_BYTES};
use crate::data::{Column, ColumnData, ColumnType, Dataset};
use crate::errors::DriftError;
use log::{debug, info};
use postgres::types::ToSql;
use postgres::{Client, NoTls};
use std::collections::{BTreeMap, HashSet};

/// Postgres caps bind parameters per statement at this count.
const MAX_BIND_PARAMS: usize = 65535;

pub trait TableStore {
    /// Drop `name` if it exists and recreate it with the dataset's schema and rows.
    fn replace_table(&mut self, name: &str, data: &Dataset) -> Result<(), DriftError>;
}

fn schema_err(table: &str, reason: impl Into<String>) -> DriftError {
    DriftError::Schema {
        table: table.to_string(),
        reason: reason.into(),
    }
}

/// Check the table and column names can be stored.
pub fn validate_schema(table: &str, data: &Dataset) -> Result<(), DriftError> {
    let mut seen = HashSet::new();
    for name in std::iter::once(table).chain(data.column_names()) {
        if name.is_empty() {
            return Err(schema_err(table, "empty identifier"));
        }
        if name.len() > MAX_IDENTIFIER_BYTES {
            return Err(schema_err(
                table,
                format!("identifier {} is longer than {} bytes", name, MAX_IDENTIFIER_BYTES),
            ));
        }
    }
    for name in data.column_names() {
        if !seen.insert(name) {
            return Err(schema_err(table, format!("duplicate column {}", name)));
        }
    }
    Ok(())
}

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn sql_type(column_type: ColumnType) -> &'static str {
    match column_type {
        ColumnType::DateTime => "TIMESTAMP",
        ColumnType::Integer => "BIGINT",
        ColumnType::Float => "DOUBLE PRECISION",
        ColumnType::Text => "TEXT",
    }
}

pub fn create_table_sql(table: &str, data: &Dataset) -> String {
    let columns: Vec<String> = data
        .columns()
        .iter()
        .map(|c| format!("{} {}", quote_ident(&c.name), sql_type(c.column_type())))
        .collect();
    format!(
        "DROP TABLE IF EXISTS {t}; CREATE TABLE {t} ({c});",
        t = quote_ident(table),
        c = columns.join(", ")
    )
}

/// Parameterized insert of `rows` rows.
pub fn insert_sql(table: &str, data: &Dataset, rows: usize) -> String {
    let cols = data.columns().len();
    let names: Vec<String> = data.columns().iter().map(|c| quote_ident(&c.name)).collect();
    let tuples: Vec<String> = (0..rows)
        .map(|r| {
            let params: Vec<String> = (1..=cols).map(|c| format!("${}", r * cols + c)).collect();
            format!("({})", params.join(", "))
        })
        .collect();
    format!(
        "INSERT INTO {} ({}) VALUES {}",
        quote_ident(table),
        names.join(", "),
        tuples.join(", ")
    )
}

fn cell(column: &Column, row: usize) -> &(dyn ToSql + Sync) {
    match &column.data {
        ColumnData::DateTime(v) => &v[row],
        ColumnData::Integer(v) => &v[row],
        ColumnData::Float(v) => &v[row],
        ColumnData::Text(v) => &v[row],
    }
}

/// Postgres-backed store holding one connection for the life of the value.
pub struct PostgresStore {
    client: Client,
}

impl PostgresStore {
    pub fn connect(config: &DbConfig) -> Result<Self, DriftError> {
        let client = config
            .pg_config()
            .connect(NoTls)
            .map_err(|e| DriftError::Connection(format!("{} ({})", config, e)))?;
        debug!("Connected to {}.", config);
        Ok(PostgresStore { client })
    }
}

impl TableStore for PostgresStore {
    fn replace_table(&mut self, name: &str, data: &Dataset) -> Result<(), DriftError> {
        validate_schema(name, data)?;
        let mut tx = self
            .client
            .transaction()
            .map_err(|e| DriftError::Connection(e.to_string()))?;
        tx.batch_execute(&create_table_sql(name, data))
            .map_err(|e| schema_err(name, e.to_string()))?;

        let cols = data.columns().len();
        if cols > 0 {
            let batch = INSERT_BATCH_ROWS.min(MAX_BIND_PARAMS / cols).max(1);
            let mut start = 0;
            while start < data.rows() {
                let end = (start + batch).min(data.rows());
                let params: Vec<&(dyn ToSql + Sync)> = (start..end)
                    .flat_map(|row| data.columns().iter().map(move |c| cell(c, row)))
                    .collect();
                tx.execute(insert_sql(name, data, end - start).as_str(), &params)
                    .map_err(|e| schema_err(name, e.to_string()))?;
                start = end;
            }
        }

        tx.commit().map_err(|e| DriftError::Connection(e.to_string()))?;
        info!("Replaced table {} with {} rows.", name, data.rows());
        Ok(())
    }
}

/// In-process store, used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: BTreeMap<String, Dataset>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn table(&self, name: &str) -> Option<&Dataset> {
        self.tables.get(name)
    }

    pub fn tables(&self) -> &BTreeMap<String, Dataset> {
        &self.tables
    }
}

impl TableStore for MemoryStore {
    fn replace_table(&mut self, name: &str, data: &Dataset) -> Result<(), DriftError> {
        validate_schema(name, data)?;
        self.tables.insert(name.to_string(), data.clone());
        info!("Replaced in-memory table {} with {} rows.", name, data.rows());
        Ok(())
    }
}
