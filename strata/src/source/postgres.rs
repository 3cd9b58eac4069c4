use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Column, Row, TypeInfo};
use tracing::debug;

use crate::error::StrataResult;
use crate::source::base::SourceClient;
use crate::types::Cell;
use strata_config::shared::{IntoConnectOptions, PgConnectionConfig};

/// Postgres implementation of [`SourceClient`] over a sqlx pool.
#[derive(Debug, Clone)]
pub struct PgSourceClient {
    pool: PgPool,
}

impl PgSourceClient {
    /// Connects to the source database.
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

impl SourceClient for PgSourceClient {
    async fn table_columns(&self, table: &str) -> StrataResult<Vec<String>> {
        let rows = sqlx::query(
            "select column_name from information_schema.columns \
             where table_name = $1 order by ordinal_position",
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        let columns = rows
            .iter()
            .map(|row| row.try_get::<String, _>(0))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(table, columns = columns.len(), "resolved source columns");

        Ok(columns)
    }

    async fn changed_rows(
        &self,
        table: &str,
        columns: &[String],
        since: NaiveDateTime,
    ) -> StrataResult<Vec<Vec<Cell>>> {
        let column_list = columns
            .iter()
            .map(|column| quote_ident(column))
            .collect::<Vec<_>>()
            .join(", ");

        let query = format!(
            "select {column_list} from {} \
             where \"created_at\" > $1 or \"last_updated\" > $1",
            quote_ident(table)
        );

        let rows = sqlx::query(&query)
            .bind(since)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(decode_row).collect())
    }
}

/// Quotes a SQL identifier, doubling embedded quotes.
///
/// Table and column names cannot be bound as parameters, so they are
/// interpolated quoted.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Decodes a dynamically-typed row into cells.
///
/// Values whose type cannot be decoded coerce to [`Cell::Null`] rather than
/// failing the row; the staged snapshot keeps its shape.
fn decode_row(row: &PgRow) -> Vec<Cell> {
    (0..row.columns().len())
        .map(|index| decode_cell(row, index))
        .collect()
}

fn decode_cell(row: &PgRow, index: usize) -> Cell {
    let type_name = row.columns()[index].type_info().name().to_uppercase();

    match type_name.as_str() {
        "BOOL" => from_value(row.try_get::<Option<bool>, _>(index), Cell::Bool),
        "INT2" => from_value(row.try_get::<Option<i16>, _>(index), Cell::I16),
        "INT4" => from_value(row.try_get::<Option<i32>, _>(index), Cell::I32),
        "INT8" => from_value(row.try_get::<Option<i64>, _>(index), Cell::I64),
        "FLOAT4" => from_value(row.try_get::<Option<f32>, _>(index), |value| {
            Cell::F64(f64::from(value))
        }),
        "FLOAT8" => from_value(row.try_get::<Option<f64>, _>(index), Cell::F64),
        // Decimal/numeric values convert to floating point at the staging
        // boundary.
        "NUMERIC" => from_value(row.try_get::<Option<BigDecimal>, _>(index), |value| {
            value.to_f64().map(Cell::F64).unwrap_or(Cell::Null)
        }),
        "DATE" => from_value(row.try_get::<Option<NaiveDate>, _>(index), Cell::Date),
        "TIME" => from_value(row.try_get::<Option<NaiveTime>, _>(index), Cell::Time),
        "TIMESTAMP" => from_value(
            row.try_get::<Option<NaiveDateTime>, _>(index),
            Cell::Timestamp,
        ),
        "TIMESTAMPTZ" => from_value(row.try_get::<Option<DateTime<Utc>>, _>(index), |value| {
            Cell::Timestamp(value.naive_utc())
        }),
        _ => from_value(row.try_get::<Option<String>, _>(index), Cell::String),
    }
}

fn from_value<T>(value: Result<Option<T>, sqlx::Error>, build: impl FnOnce(T) -> Cell) -> Cell {
    match value {
        Ok(Some(value)) => build(value),
        _ => Cell::Null,
    }
}
