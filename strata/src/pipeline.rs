//! Pipeline orchestration for the three periodic jobs.
//!
//! Extraction, transformation and loading are independently invocable; the
//! handoff contract between them is a list of staging-path strings. Run
//! state (watermark value, run start time) travels in an explicit
//! [`RunContext`] rather than process-wide variables.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{info, warn};

use crate::dates::CalendarDimension;
use crate::error::StrataResult;
use crate::extract::{ChangeExtractor, ExtractReport};
use crate::load::WarehouseLoader;
use crate::schema::TargetTable;
use crate::source::SourceClient;
use crate::staging::{frame_from_parquet, frame_to_parquet, table_name_from_key, transformed_key};
use crate::store::object::ObjectStore;
use crate::store::watermark::WatermarkStore;
use crate::transform::{read_staged, transform_all};
use strata_config::shared::PipelineConfig;

/// Per-run state threaded through the extraction stage.
#[derive(Debug, Clone, Copy)]
pub struct RunContext {
    /// Wall-clock start of this run; becomes the new watermark and derives
    /// every staging key.
    pub run_started_at: NaiveDateTime,
    /// Watermark loaded at the start of the run (epoch sentinel on first
    /// run).
    pub last_extracted_at: NaiveDateTime,
    /// Whether no watermark existed when the run started.
    pub first_run: bool,
}

/// Outcome of one transform run.
#[derive(Debug, Default)]
pub struct TransformReport {
    /// Transformed staging keys written this run, the loader's input.
    pub transformed_paths: Vec<String>,
    /// Rows per target table, including an entry for the calendar dimension
    /// when it was regenerated.
    pub table_rows: BTreeMap<String, usize>,
}

/// Outcome of one load run.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Rows appended per warehouse table.
    pub appended_rows: BTreeMap<String, u64>,
}

/// Combined outcome of a full extract/transform/load run.
#[derive(Debug)]
pub struct RunReport {
    pub extract: ExtractReport,
    pub transform: TransformReport,
    pub load: LoadReport,
}

/// One pipeline instance wired to its three external collaborators.
#[derive(Debug)]
pub struct Pipeline<S, C, W> {
    config: Arc<PipelineConfig>,
    store: S,
    source: C,
    warehouse: W,
}

impl<S, C, W> Pipeline<S, C, W>
where
    S: ObjectStore + Clone + Send + Sync,
    C: SourceClient + Send + Sync,
    W: WarehouseLoader + Send + Sync,
{
    pub fn new(config: PipelineConfig, store: S, source: C, warehouse: W) -> Self {
        Self {
            config: Arc::new(config),
            store,
            source,
            warehouse,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs the extraction job.
    ///
    /// Reads the watermark (epoch sentinel on first run), extracts and
    /// stages every changed table, then records the run's start time as the
    /// new watermark: exactly once, only after all tables succeeded.
    pub async fn run_extract(&self, run_started_at: NaiveDateTime) -> StrataResult<ExtractReport> {
        let watermarks =
            WatermarkStore::new(self.store.clone(), self.config.staging.raw_bucket.as_str());

        let (last_extracted_at, found) = watermarks.get_watermark().await?;
        let ctx = RunContext {
            run_started_at,
            last_extracted_at,
            first_run: !found,
        };

        info!(
            pipeline_id = self.config.id,
            first_run = ctx.first_run,
            since = %ctx.last_extracted_at,
            "starting extraction run"
        );

        let extractor = ChangeExtractor::new(
            &self.store,
            &self.source,
            &self.config.staging.raw_bucket,
            &self.config.source_tables,
        );
        let report = extractor.extract(&ctx).await?;

        // A new watermark is always stored, even when no table had changes.
        watermarks.record_run(ctx.run_started_at).await?;

        info!(
            staged_tables = report.staged_paths.len(),
            "extraction run complete"
        );

        Ok(report)
    }

    /// Runs the transformation job over the staged-path list.
    ///
    /// Reshapes every staged raw table into its warehouse-schema counterpart
    /// and writes it as parquet; alongside, the calendar dimension extender
    /// consults its own persisted range and contributes rows only when the
    /// horizon was missing or due for extension.
    pub async fn run_transform(
        &self,
        staged_paths: &[String],
        run_started_at: NaiveDateTime,
        today: NaiveDate,
    ) -> StrataResult<TransformReport> {
        let raw_bucket = &self.config.staging.raw_bucket;
        let transformed_bucket = &self.config.staging.transformed_bucket;

        let raw_tables = read_staged(&self.store, raw_bucket, staged_paths).await?;
        let mut outputs = transform_all(&raw_tables);

        let calendar = CalendarDimension::new(
            self.store.clone(),
            raw_bucket.clone(),
            &self.config.date_dimension,
        )?;
        if let Some(frame) = calendar.refresh(today).await? {
            outputs.push((TargetTable::DimDate, frame));
        }

        let mut report = TransformReport::default();

        for (target, frame) in outputs {
            let key = transformed_key(run_started_at, target.name());
            let body = frame_to_parquet(&frame)?;

            self.store.put(transformed_bucket, &key, body).await?;

            info!(table = target.name(), rows = frame.len(), key = %key, "staged transformed table");

            report.table_rows.insert(target.name().to_string(), frame.len());
            report.transformed_paths.push(key);
        }

        Ok(report)
    }

    /// Runs the load job over the transformed-path list.
    ///
    /// Appends each transformed table into the warehouse. A missing
    /// transformed object is logged and skipped; any other failure
    /// propagates.
    pub async fn run_load(&self, transformed_paths: &[String]) -> StrataResult<LoadReport> {
        let transformed_bucket = &self.config.staging.transformed_bucket;
        let mut report = LoadReport::default();

        for path in transformed_paths {
            let Some(body) = self.store.fetch(transformed_bucket, path).await? else {
                warn!(key = %path, "transformed table does not exist, skipping");
                continue;
            };

            let frame = frame_from_parquet(body)?;
            let table = table_name_from_key(path);

            let appended = self.warehouse.append_rows(table, &frame).await?;
            report.appended_rows.insert(table.to_string(), appended);
        }

        info!(tables = report.appended_rows.len(), "load run complete");

        Ok(report)
    }

    /// Runs all three jobs back to back for one run timestamp.
    pub async fn run(
        &self,
        run_started_at: NaiveDateTime,
    ) -> StrataResult<RunReport> {
        let extract = self.run_extract(run_started_at).await?;
        let transform = self
            .run_transform(&extract.staged_paths, run_started_at, run_started_at.date())
            .await?;
        let load = self.run_load(&transform.transformed_paths).await?;

        Ok(RunReport {
            extract,
            transform,
            load,
        })
    }
}
