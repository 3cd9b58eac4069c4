//! Dimensional transformation of staged raw snapshots.

pub mod currency;
pub mod dimensions;
pub mod fact;
pub mod ops;

use std::collections::BTreeMap;

use tracing::warn;

use crate::error::StrataResult;
use crate::schema::TargetTable;
use crate::staging::{decode_staged, table_name_from_key};
use crate::store::object::ObjectStore;
use crate::types::Frame;

pub use currency::currency_name;
pub use dimensions::{
    transform_counterparty, transform_currency, transform_design, transform_location,
    transform_staff,
};
pub use fact::transform_fact_sales_order;

/// Reads staged snapshots back from the raw bucket, keyed by table name.
///
/// A missing staged object is logged as a warning and that table is skipped;
/// transforms that depend on a skipped table treat the dependency as absent.
/// Any other storage failure propagates.
pub async fn read_staged<S>(
    store: &S,
    bucket: &str,
    staged_paths: &[String],
) -> StrataResult<BTreeMap<String, Frame>>
where
    S: ObjectStore,
{
    let mut tables = BTreeMap::new();

    for path in staged_paths {
        let Some(body) = store.fetch(bucket, path).await? else {
            warn!(key = %path, "staged snapshot does not exist, skipping table");
            continue;
        };

        let frame = decode_staged(path, &body)?;
        tables.insert(table_name_from_key(path).to_string(), frame);
    }

    Ok(tables)
}

/// Runs every dimensional transform whose primary raw table was staged.
///
/// Targets whose primary input is absent are skipped entirely; the absence
/// of a table in the staging output is the signal that nothing changed.
/// Join dependencies are passed through as options so a transform can still
/// produce its schema-correct result when only the dependency is missing.
pub fn transform_all(raw: &BTreeMap<String, Frame>) -> Vec<(TargetTable, Frame)> {
    let mut outputs = Vec::new();

    if raw.contains_key("design") {
        outputs.push((TargetTable::DimDesign, transform_design(raw.get("design"))));
    }
    if raw.contains_key("currency") {
        outputs.push((
            TargetTable::DimCurrency,
            transform_currency(raw.get("currency")),
        ));
    }
    if raw.contains_key("address") {
        outputs.push((
            TargetTable::DimLocation,
            transform_location(raw.get("address")),
        ));
    }
    if raw.contains_key("staff") {
        outputs.push((
            TargetTable::DimStaff,
            transform_staff(raw.get("staff"), raw.get("department")),
        ));
    }
    if raw.contains_key("counterparty") {
        outputs.push((
            TargetTable::DimCounterparty,
            transform_counterparty(raw.get("counterparty"), raw.get("address")),
        ));
    }
    if raw.contains_key("sales_order") {
        outputs.push((
            TargetTable::FactSalesOrder,
            transform_fact_sales_order(raw.get("sales_order")),
        ));
    }

    outputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::object::MemoryObjectStore;
    use crate::types::Cell;
    use bytes::Bytes;

    #[tokio::test]
    async fn missing_staged_object_is_skipped_with_a_warning() {
        let store = MemoryObjectStore::new();
        store
            .put(
                "raw",
                "data/by time/2025/03-March/05/15:00:03.000000/design",
                Bytes::from_static(br#"[{"design_id":1}]"#),
            )
            .await
            .unwrap();

        let paths = vec![
            "data/by time/2025/03-March/05/15:00:03.000000/design".to_string(),
            "data/by time/2025/03-March/05/15:00:03.000000/staff".to_string(),
        ];
        let tables = read_staged(&store, "raw", &paths).await.unwrap();

        assert!(tables.contains_key("design"));
        assert!(!tables.contains_key("staff"));
    }

    #[test]
    fn only_staged_targets_are_transformed() {
        let mut raw = BTreeMap::new();
        let mut staff = Frame::with_columns(&["staff_id", "department_id"]);
        staff
            .push_row(vec![Cell::I64(1), Cell::I64(2)])
            .unwrap();
        raw.insert("staff".to_string(), staff);

        let outputs = transform_all(&raw);

        let targets: Vec<TargetTable> = outputs.iter().map(|(target, _)| *target).collect();
        assert_eq!(targets, vec![TargetTable::DimStaff]);

        // Department snapshot missing: the join columns are null but the
        // schema holds.
        assert_eq!(outputs[0].1.columns(), TargetTable::DimStaff.columns());
        assert_eq!(outputs[0].1.cell(0, "department_name"), Some(&Cell::Null));
    }
}
