use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::error::{ErrorKind, StrataResult};
use crate::load::base::WarehouseLoader;
use crate::strata_error;
use crate::types::Frame;

#[derive(Debug, Default)]
struct Inner {
    tables: HashMap<String, Frame>,
}

/// In-memory warehouse for testing and development purposes.
///
/// [`MemoryWarehouse`] accumulates appended rows per table so tests can
/// inspect exactly what the load stage produced.
#[derive(Debug, Clone, Default)]
pub struct MemoryWarehouse {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryWarehouse {
    /// Creates a new empty warehouse.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of a table's accumulated rows, if any were appended.
    pub async fn table(&self, name: &str) -> Option<Frame> {
        let inner = self.inner.lock().await;
        inner.tables.get(name).cloned()
    }

    /// Returns the names of all tables that received appends.
    pub async fn table_names(&self) -> Vec<String> {
        let inner = self.inner.lock().await;
        let mut names: Vec<String> = inner.tables.keys().cloned().collect();
        names.sort();
        names
    }
}

impl WarehouseLoader for MemoryWarehouse {
    async fn append_rows(&self, table: &str, frame: &Frame) -> StrataResult<u64> {
        let mut inner = self.inner.lock().await;

        let stored = inner
            .tables
            .entry(table.to_string())
            .or_insert_with(|| Frame::new(frame.columns().to_vec()));

        if stored.columns() != frame.columns() {
            return Err(strata_error!(
                ErrorKind::DestinationQueryFailed,
                "Appended frame does not match warehouse table schema",
                table.to_string()
            ));
        }

        for row in frame.rows() {
            stored.push_row(row.clone())?;
        }

        info!(table, rows = frame.len(), "appended rows to memory warehouse");

        Ok(frame.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;

    #[tokio::test]
    async fn appends_accumulate_per_table() {
        let warehouse = MemoryWarehouse::new();
        let mut frame = Frame::with_columns(&["currency_id", "currency_code"]);
        frame
            .push_row(vec![Cell::I64(1), Cell::String("GBP".into())])
            .unwrap();

        warehouse.append_rows("dim_currency", &frame).await.unwrap();
        warehouse.append_rows("dim_currency", &frame).await.unwrap();

        let stored = warehouse.table("dim_currency").await.unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[tokio::test]
    async fn schema_mismatch_is_rejected() {
        let warehouse = MemoryWarehouse::new();
        let first = Frame::with_columns(&["a"]);
        let second = Frame::with_columns(&["b"]);

        warehouse.append_rows("t", &first).await.unwrap();
        assert!(warehouse.append_rows("t", &second).await.is_err());
    }
}
