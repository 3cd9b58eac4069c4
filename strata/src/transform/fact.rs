//! Fact table transform: raw `sales_order` snapshots into
//! `fact_sales_order`.

use crate::schema::TargetTable;
use crate::transform::ops;
use crate::types::{Cell, DATE_FORMAT, Frame, TIME_FORMAT};

/// Reshapes the raw `sales_order` snapshot into `fact_sales_order`.
///
/// The combined `created_at` / `last_updated` timestamps split into
/// string-formatted date and time components, the staff foreign key renames
/// to `sales_staff_id`, and `sales_order_id` stays the natural key; no
/// positional surrogate id is fabricated. Missing raw columns come through
/// as nulls; unparseable timestamps null the derived fields, never the row.
pub fn transform_fact_sales_order(sales_order: Option<&Frame>) -> Frame {
    let target = TargetTable::FactSalesOrder;
    let Some(sales_order) = sales_order else {
        return Frame::with_columns(target.columns());
    };

    let mut split = sales_order.clone();
    append_timestamp_parts(&mut split, "created_at", "created_date", "created_time");
    append_timestamp_parts(
        &mut split,
        "last_updated",
        "last_updated_date",
        "last_updated_time",
    );

    let renamed = ops::rename_column(split, "staff_id", "sales_staff_id");

    let projected = ops::select(&renamed, target.columns());
    let deduped = ops::dedup_rows(projected);
    ops::sort_by(deduped, target.natural_key())
}

/// Appends date and time string columns derived from a timestamp column.
///
/// Cells that cannot be coerced to a timestamp yield null parts.
fn append_timestamp_parts(frame: &mut Frame, source: &str, date_column: &str, time_column: &str) {
    let source_index = frame.column_index(source);

    frame.columns_mut().push(date_column.to_string());
    frame.columns_mut().push(time_column.to_string());

    for row in frame.rows_mut() {
        let timestamp = source_index.and_then(|index| row[index].as_timestamp());

        match timestamp {
            Some(timestamp) => {
                row.push(Cell::String(
                    timestamp.date().format(DATE_FORMAT).to_string(),
                ));
                row.push(Cell::String(
                    timestamp.time().format(TIME_FORMAT).to_string(),
                ));
            }
            None => {
                row.push(Cell::Null);
                row.push(Cell::Null);
            }
        }
    }
}
