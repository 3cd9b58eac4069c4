use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use tokio::sync::Mutex;

use crate::error::StrataResult;
use crate::source::base::SourceClient;
use crate::types::Cell;

#[derive(Debug, Default)]
struct Inner {
    tables: HashMap<String, SeededTable>,
}

#[derive(Debug, Clone)]
struct SeededTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

/// In-memory source for testing and development purposes.
///
/// Tables are seeded with explicit column lists and rows; the change filter
/// replays the real predicate (`created_at > since OR last_updated > since`)
/// against the seeded rows.
#[derive(Debug, Clone, Default)]
pub struct MemorySourceClient {
    inner: Arc<Mutex<Inner>>,
}

impl MemorySourceClient {
    /// Creates a new empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a table, replacing any previous contents.
    pub async fn set_table(&self, table: &str, columns: Vec<String>, rows: Vec<Vec<Cell>>) {
        let mut inner = self.inner.lock().await;
        inner
            .tables
            .insert(table.to_string(), SeededTable { columns, rows });
    }
}

impl SourceClient for MemorySourceClient {
    async fn table_columns(&self, table: &str) -> StrataResult<Vec<String>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tables
            .get(table)
            .map(|seeded| seeded.columns.clone())
            .unwrap_or_default())
    }

    async fn changed_rows(
        &self,
        table: &str,
        columns: &[String],
        since: NaiveDateTime,
    ) -> StrataResult<Vec<Vec<Cell>>> {
        let inner = self.inner.lock().await;
        let Some(seeded) = inner.tables.get(table) else {
            return Ok(Vec::new());
        };

        let created = columns.iter().position(|column| column == "created_at");
        let updated = columns.iter().position(|column| column == "last_updated");

        let rows = seeded
            .rows
            .iter()
            .filter(|row| {
                let advanced = |index: Option<usize>| {
                    index
                        .and_then(|index| row.get(index))
                        .and_then(Cell::as_timestamp)
                        .is_some_and(|timestamp| timestamp > since)
                };

                advanced(created) || advanced(updated)
            })
            .cloned()
            .collect();

        Ok(rows)
    }
}
