//! End-to-end pipeline tests over the in-memory collaborators.

use chrono::NaiveDate;

use strata::load::MemoryWarehouse;
use strata::pipeline::Pipeline;
use strata::schema::TargetTable;
use strata::source::MemorySourceClient;
use strata::store::date_range::{DateRange, DateRangeStore};
use strata::store::object::MemoryObjectStore;
use strata::store::watermark::WatermarkStore;
use strata::types::Cell;
use strata_telemetry::tracing::init_test_tracing;

use crate::support::{pipeline_config, seed_source, text, timestamp};

mod support;

fn pipeline(
    store: MemoryObjectStore,
    source: MemorySourceClient,
    warehouse: MemoryWarehouse,
) -> Pipeline<MemoryObjectStore, MemorySourceClient, MemoryWarehouse> {
    Pipeline::new(pipeline_config(), store, source, warehouse)
}

#[tokio::test]
async fn first_run_flows_from_source_to_warehouse() {
    init_test_tracing();

    let store = MemoryObjectStore::new();
    let source = MemorySourceClient::new();
    let warehouse = MemoryWarehouse::new();
    seed_source(&source, timestamp(2022, 11, 3, 14, 20, 51)).await;

    let pipeline = pipeline(store.clone(), source, warehouse.clone());
    let report = pipeline.run(timestamp(2022, 11, 4, 9, 0, 0)).await.unwrap();

    // Seven source tables were seeded and changed.
    assert_eq!(report.extract.staged_paths.len(), 7);

    // Six modeled targets plus the freshly generated calendar dimension.
    assert_eq!(report.transform.transformed_paths.len(), 7);

    let staff = warehouse.table("dim_staff").await.unwrap();
    assert_eq!(staff.columns(), TargetTable::DimStaff.columns());
    assert_eq!(staff.len(), 2);
    assert_eq!(staff.cell(0, "department_name"), Some(&text("Facilities")));
    // Join completeness: the staff row with no department survives with
    // nulls.
    assert_eq!(staff.cell(1, "department_name"), Some(&Cell::Null));

    let currency = warehouse.table("dim_currency").await.unwrap();
    assert_eq!(currency.cell(0, "currency_name"), Some(&text("Pound Sterling")));
    assert_eq!(currency.cell(1, "currency_name"), Some(&Cell::Null));

    let counterparty = warehouse.table("dim_counterparty").await.unwrap();
    assert_eq!(
        counterparty.cell(0, "counterparty_legal_city"),
        Some(&text("Aliso Viejo"))
    );

    let fact = warehouse.table("fact_sales_order").await.unwrap();
    assert_eq!(fact.columns(), TargetTable::FactSalesOrder.columns());
    assert_eq!(fact.cell(0, "created_date"), Some(&text("2022-11-03")));
    assert_eq!(fact.cell(0, "sales_staff_id"), Some(&Cell::I64(8)));

    // The calendar dimension was generated in full on the first run.
    let dates = warehouse.table("dim_date").await.unwrap();
    assert_eq!(dates.columns(), TargetTable::DimDate.columns());
    assert_eq!(dates.cell(0, "date_id"), Some(&text("2022-01-01")));

    // The run recorded exactly one watermark.
    let watermarks = WatermarkStore::new(store, "totes-extract");
    let history = watermarks.history().await.unwrap();
    assert_eq!(history, vec![timestamp(2022, 11, 4, 9, 0, 0)]);
}

#[tokio::test]
async fn quiet_run_still_records_watermark_and_loads_nothing() {
    init_test_tracing();

    let store = MemoryObjectStore::new();
    let source = MemorySourceClient::new();
    let warehouse = MemoryWarehouse::new();
    seed_source(&source, timestamp(2022, 11, 3, 14, 20, 51)).await;

    let pipeline = pipeline(store.clone(), source, warehouse.clone());
    pipeline.run(timestamp(2022, 11, 4, 9, 0, 0)).await.unwrap();

    // Second run: nothing changed since the first watermark.
    let report = pipeline.run(timestamp(2022, 11, 5, 9, 0, 0)).await.unwrap();

    assert!(report.extract.staged_paths.is_empty());
    // The fresh horizon is 15 years out, over the 10-year threshold: the
    // calendar dimension is not regenerated either.
    assert!(report.transform.transformed_paths.is_empty());
    assert!(report.load.appended_rows.is_empty());

    // The watermark history still grew by one entry, monotonically.
    let watermarks = WatermarkStore::new(store, "totes-extract");
    let history = watermarks.history().await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.windows(2).all(|pair| pair[0] <= pair[1]));

    // Nothing was appended twice.
    let staff = warehouse.table("dim_staff").await.unwrap();
    assert_eq!(staff.len(), 2);
}

#[tokio::test]
async fn incremental_run_extracts_only_advanced_rows() {
    init_test_tracing();

    let store = MemoryObjectStore::new();
    let source = MemorySourceClient::new();
    let warehouse = MemoryWarehouse::new();
    seed_source(&source, timestamp(2022, 11, 3, 14, 20, 51)).await;

    let pipeline = pipeline(store.clone(), source.clone(), warehouse.clone());
    pipeline.run(timestamp(2022, 11, 4, 9, 0, 0)).await.unwrap();

    // One currency row is updated after the first run's watermark.
    source
        .set_table(
            "currency",
            ["currency_id", "currency_code", "created_at", "last_updated"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            vec![vec![
                Cell::I64(3),
                text("USD"),
                Cell::Timestamp(timestamp(2022, 11, 4, 12, 0, 0)),
                Cell::Timestamp(timestamp(2022, 11, 4, 12, 0, 0)),
            ]],
        )
        .await;

    let report = pipeline.run(timestamp(2022, 11, 5, 9, 0, 0)).await.unwrap();

    assert_eq!(report.extract.staged_paths.len(), 1);
    assert_eq!(report.extract.table_rows.get("currency"), Some(&1));

    // Appends accumulated: first run's two currencies plus the new one.
    let currency = warehouse.table("dim_currency").await.unwrap();
    assert_eq!(currency.len(), 3);
}

#[tokio::test]
async fn date_dimension_extends_only_when_horizon_is_due() {
    init_test_tracing();

    let store = MemoryObjectStore::new();
    let warehouse = MemoryWarehouse::new();
    let pipeline = pipeline(store.clone(), MemorySourceClient::new(), warehouse.clone());

    let range_store = DateRangeStore::new(store.clone(), "totes-extract");

    // Horizon ends in five days with a ten-year threshold: extension due.
    range_store
        .replace(DateRange {
            start: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 6, 6).unwrap(),
        })
        .await
        .unwrap();

    let report = pipeline
        .run_transform(
            &[],
            timestamp(2025, 6, 1, 9, 0, 0),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(report.transformed_paths.len(), 1);
    assert!(report.transformed_paths[0].ends_with("dim_date.parquet"));

    let persisted = range_store.load().await.unwrap().unwrap();
    assert_eq!(persisted.start, NaiveDate::from_ymd_opt(2025, 6, 6).unwrap());
    assert_eq!(persisted.end, NaiveDate::from_ymd_opt(2040, 6, 1).unwrap());

    // Horizon now ends decades out: the next run is a no-op.
    let report = pipeline
        .run_transform(
            &[],
            timestamp(2025, 6, 2, 9, 0, 0),
            NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
        )
        .await
        .unwrap();

    assert!(report.transformed_paths.is_empty());
    assert_eq!(range_store.load().await.unwrap(), Some(persisted));
}

#[tokio::test]
async fn transform_survives_missing_staged_objects() {
    init_test_tracing();

    let store = MemoryObjectStore::new();
    let warehouse = MemoryWarehouse::new();
    let pipeline = pipeline(store, MemorySourceClient::new(), warehouse);

    // Paths that were never staged: every table is skipped with a warning
    // and only the (missing-range) calendar dimension is produced.
    let report = pipeline
        .run_transform(
            &["data/by time/2025/06-June/01/09:00:00.000000/design".to_string()],
            timestamp(2025, 6, 1, 9, 0, 0),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(report.transformed_paths.len(), 1);
    assert!(report.transformed_paths[0].ends_with("dim_date.parquet"));
}
