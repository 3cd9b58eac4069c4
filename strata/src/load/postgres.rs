use sqlx::Postgres;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::query::Query;
use sqlx::postgres::PgArguments;
use tracing::info;

use crate::error::StrataResult;
use crate::load::base::WarehouseLoader;
use crate::types::{Cell, DATE_FORMAT, Frame, TIME_FORMAT, TIMESTAMP_FORMAT};
use strata_config::shared::{IntoConnectOptions, PgConnectionConfig};

/// Postgres implementation of [`WarehouseLoader`] over a sqlx pool.
///
/// Rows append through plain INSERT statements; the load path never issues
/// DELETE or TRUNCATE against warehouse tables.
#[derive(Debug, Clone)]
pub struct PgWarehouseLoader {
    pool: PgPool,
}

impl PgWarehouseLoader {
    /// Connects to the warehouse database.
    pub async fn connect(config: &PgConnectionConfig) -> StrataResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(config.with_db())
            .await?;

        Ok(Self { pool })
    }

    /// Wraps an existing pool, used when the caller manages connections.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl WarehouseLoader for PgWarehouseLoader {
    async fn append_rows(&self, table: &str, frame: &Frame) -> StrataResult<u64> {
        if frame.is_empty() {
            return Ok(0);
        }

        let column_list = frame
            .columns()
            .iter()
            .map(|column| quote_ident(column))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=frame.columns().len())
            .map(|index| format!("${index}"))
            .collect::<Vec<_>>()
            .join(", ");
        let statement = format!(
            "insert into {} ({column_list}) values ({placeholders})",
            quote_ident(table)
        );

        let mut transaction = self.pool.begin().await?;
        let mut appended = 0u64;

        for row in frame.rows() {
            let mut query = sqlx::query(&statement);
            for cell in row {
                query = bind_cell(query, cell);
            }

            let result = query.execute(&mut *transaction).await?;
            appended += result.rows_affected();
        }

        transaction.commit().await?;

        info!(table, rows = appended, "appended rows to warehouse");

        Ok(appended)
    }
}

/// Quotes a SQL identifier, doubling embedded quotes.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Binds one cell onto an INSERT.
///
/// Temporal cells bind as their staged string forms, matching the text-typed
/// date/time columns the transforms emit.
fn bind_cell<'q>(
    query: Query<'q, Postgres, PgArguments>,
    cell: &Cell,
) -> Query<'q, Postgres, PgArguments> {
    match cell {
        Cell::Null => query.bind(Option::<String>::None),
        Cell::Bool(value) => query.bind(*value),
        Cell::I16(value) => query.bind(i64::from(*value)),
        Cell::I32(value) => query.bind(i64::from(*value)),
        Cell::I64(value) => query.bind(*value),
        Cell::F64(value) => query.bind(*value),
        Cell::String(value) => query.bind(value.clone()),
        Cell::Date(value) => query.bind(value.format(DATE_FORMAT).to_string()),
        Cell::Time(value) => query.bind(value.format(TIME_FORMAT).to_string()),
        Cell::Timestamp(value) => query.bind(value.format(TIMESTAMP_FORMAT).to_string()),
    }
}
