//! Watermark-based change extraction into the raw staging area.
//!
//! For each configured source table, in fixed iteration order, rows whose
//! bookkeeping timestamps advanced past the watermark are staged as JSON
//! under a time-derived key and again under a table-derived key. Tables with
//! no columns or no changed rows are skipped silently; their absence from
//! the staged-path list is the downstream signal to skip them.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::error::StrataResult;
use crate::pipeline::RunContext;
use crate::source::SourceClient;
use crate::staging::{by_table_key, by_time_key, frame_to_json};
use crate::store::object::ObjectStore;
use crate::types::Frame;

/// Outcome of one extraction run.
///
/// The staged-path list is the handoff contract to the transform stage; the
/// per-table row counts are informational.
#[derive(Debug, Default)]
pub struct ExtractReport {
    /// By-time staging keys written this run, in table iteration order.
    pub staged_paths: Vec<String>,
    /// Rows staged per table; skipped tables are absent.
    pub table_rows: BTreeMap<String, usize>,
}

/// Extracts changed rows from the source into raw staging.
#[derive(Debug)]
pub struct ChangeExtractor<'a, S, C> {
    store: &'a S,
    source: &'a C,
    raw_bucket: &'a str,
    tables: &'a [String],
}

impl<'a, S, C> ChangeExtractor<'a, S, C>
where
    S: ObjectStore,
    C: SourceClient,
{
    pub fn new(store: &'a S, source: &'a C, raw_bucket: &'a str, tables: &'a [String]) -> Self {
        Self {
            store,
            source,
            raw_bucket,
            tables,
        }
    }

    /// Runs change capture for every configured table.
    ///
    /// Any source or storage failure aborts the whole run; partial table
    /// extraction is never committed to the watermark, which the caller
    /// records only after this returns successfully.
    pub async fn extract(&self, ctx: &RunContext) -> StrataResult<ExtractReport> {
        let mut report = ExtractReport::default();

        for table in self.tables {
            let columns = self.source.table_columns(table).await?;
            if columns.is_empty() {
                debug!(table, "no columns resolved, skipping table");
                continue;
            }

            let rows = self
                .source
                .changed_rows(table, &columns, ctx.last_extracted_at)
                .await?;
            if rows.is_empty() {
                debug!(table, "no changed rows, skipping table");
                continue;
            }

            let mut frame = Frame::new(columns);
            for row in rows {
                frame.push_row(row)?;
            }

            let body = frame_to_json(&frame)?;
            let time_key = by_time_key(ctx.run_started_at, table);
            let table_key = by_table_key(ctx.run_started_at, table);

            // Same payload under both retrieval axes.
            self.store
                .put(self.raw_bucket, &time_key, body.clone())
                .await?;
            self.store.put(self.raw_bucket, &table_key, body).await?;

            info!(table, rows = frame.len(), key = %time_key, "staged table snapshot");

            report.table_rows.insert(table.clone(), frame.len());
            report.staged_paths.push(time_key);
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySourceClient;
    use crate::staging::frame_from_json;
    use crate::store::object::{MemoryObjectStore, ObjectStore};
    use crate::store::watermark::epoch_watermark;
    use crate::types::Cell;
    use chrono::NaiveDate;

    fn run_context(last: chrono::NaiveDateTime) -> RunContext {
        RunContext {
            run_started_at: NaiveDate::from_ymd_opt(2022, 11, 3)
                .unwrap()
                .and_hms_micro_opt(14, 20, 51, 563000)
                .unwrap(),
            last_extracted_at: last,
            first_run: false,
        }
    }

    fn staff_columns() -> Vec<String> {
        ["staff_id", "first_name", "created_at", "last_updated"]
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn staff_row(id: i64, name: &str, stamp: chrono::NaiveDateTime) -> Vec<Cell> {
        vec![
            Cell::I64(id),
            Cell::String(name.to_string()),
            Cell::Timestamp(stamp),
            Cell::Timestamp(stamp),
        ]
    }

    #[tokio::test]
    async fn first_run_extracts_everything_under_both_axes() {
        let store = MemoryObjectStore::new();
        let source = MemorySourceClient::new();
        let stamp = NaiveDate::from_ymd_opt(2022, 11, 3)
            .unwrap()
            .and_hms_micro_opt(14, 20, 51, 563000)
            .unwrap();
        source
            .set_table("staff", staff_columns(), vec![staff_row(8, "Ozzy", stamp)])
            .await;

        let tables = vec!["staff".to_string()];
        let extractor = ChangeExtractor::new(&store, &source, "raw", &tables);

        let report = extractor
            .extract(&run_context(epoch_watermark()))
            .await
            .unwrap();

        assert_eq!(
            report.staged_paths,
            vec!["data/by time/2022/11-November/03/14:20:51.563000/staff".to_string()]
        );

        let staged = store
            .fetch("raw", &report.staged_paths[0])
            .await
            .unwrap()
            .unwrap();
        let frame = frame_from_json(&staged).unwrap();
        assert_eq!(frame.len(), 1);
        assert_eq!(frame.cell(0, "staff_id"), Some(&Cell::I64(8)));

        let mirrored = store
            .fetch(
                "raw",
                "data/by table/staff/2022/11-November/03/14:20:51.563000",
            )
            .await
            .unwrap();
        assert_eq!(mirrored, Some(staged));
    }

    #[tokio::test]
    async fn unchanged_tables_are_skipped_silently() {
        let store = MemoryObjectStore::new();
        let source = MemorySourceClient::new();
        let old = NaiveDate::from_ymd_opt(2022, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        source
            .set_table("staff", staff_columns(), vec![staff_row(8, "Ozzy", old)])
            .await;

        let tables = vec!["staff".to_string(), "design".to_string()];
        let extractor = ChangeExtractor::new(&store, &source, "raw", &tables);

        let since = NaiveDate::from_ymd_opt(2022, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let report = extractor.extract(&run_context(since)).await.unwrap();

        assert!(report.staged_paths.is_empty());
        assert_eq!(store.object_count().await, 0);
    }

    #[tokio::test]
    async fn change_filter_includes_updated_only_rows() {
        let store = MemoryObjectStore::new();
        let source = MemorySourceClient::new();

        let created = NaiveDate::from_ymd_opt(2022, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let updated = NaiveDate::from_ymd_opt(2022, 11, 3)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();

        // Created long ago, updated after the watermark: still qualifies.
        let mut row = staff_row(9, "Lebron", created);
        row[3] = Cell::Timestamp(updated);
        source.set_table("staff", staff_columns(), vec![row]).await;

        let tables = vec!["staff".to_string()];
        let extractor = ChangeExtractor::new(&store, &source, "raw", &tables);

        let since = NaiveDate::from_ymd_opt(2022, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let report = extractor.extract(&run_context(since)).await.unwrap();

        assert_eq!(report.table_rows.get("staff"), Some(&1));
    }
}
