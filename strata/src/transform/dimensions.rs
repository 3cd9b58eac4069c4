//! Dimension transforms: raw staged snapshots into warehouse-shaped frames.
//!
//! Every transform is pure and total: an absent or empty input yields an
//! empty frame that still carries the full target column list, so downstream
//! appends never fail on schema mismatch.

use crate::schema::{BOOKKEEPING_COLUMNS, TargetTable};
use crate::transform::currency::currency_name;
use crate::transform::ops;
use crate::types::{Cell, Frame};

fn empty_target(target: TargetTable) -> Frame {
    Frame::with_columns(target.columns())
}

/// Finishes a transform: project onto the target schema, deduplicate on the
/// pruned row, and sort by the natural key.
fn finish(frame: Frame, target: TargetTable) -> Frame {
    let projected = ops::select(&frame, target.columns());
    let deduped = ops::dedup_rows(projected);
    ops::sort_by(deduped, target.natural_key())
}

/// Reshapes the raw `design` snapshot into `dim_design`.
pub fn transform_design(design: Option<&Frame>) -> Frame {
    let target = TargetTable::DimDesign;
    let Some(design) = design else {
        return empty_target(target);
    };

    let pruned = ops::drop_columns(design.clone(), BOOKKEEPING_COLUMNS);
    finish(pruned, target)
}

/// Reshapes the raw `currency` snapshot into `dim_currency`, resolving
/// human-readable currency names from the 3-letter code.
pub fn transform_currency(currency: Option<&Frame>) -> Frame {
    let target = TargetTable::DimCurrency;
    let Some(currency) = currency else {
        return empty_target(target);
    };

    let mut enriched = ops::drop_columns(currency.clone(), BOOKKEEPING_COLUMNS);

    let code_index = enriched.column_index("currency_code");
    enriched.columns_mut().push("currency_name".to_string());
    for row in enriched.rows_mut() {
        let name = code_index
            .and_then(|index| row[index].as_str())
            .and_then(currency_name)
            .map(|name| Cell::String(name.to_string()))
            .unwrap_or(Cell::Null);
        row.push(name);
    }

    finish(enriched, target)
}

/// Reshapes the raw `address` snapshot into `dim_location`.
pub fn transform_location(address: Option<&Frame>) -> Frame {
    let target = TargetTable::DimLocation;
    let Some(address) = address else {
        return empty_target(target);
    };

    let pruned = ops::drop_columns(address.clone(), BOOKKEEPING_COLUMNS);
    let renamed = ops::rename_column(pruned, "address_id", "location_id");
    finish(renamed, target)
}

/// Reshapes the raw `staff` snapshot into `dim_staff`, joining department
/// attributes on the department foreign key.
///
/// Staff rows without a matching department survive with null department
/// columns.
pub fn transform_staff(staff: Option<&Frame>, department: Option<&Frame>) -> Frame {
    let target = TargetTable::DimStaff;
    let Some(staff) = staff else {
        return empty_target(target);
    };

    let staff = ops::drop_columns(staff.clone(), BOOKKEEPING_COLUMNS);
    let department = department
        .map(|department| ops::drop_columns(department.clone(), BOOKKEEPING_COLUMNS))
        .unwrap_or_else(|| Frame::with_columns(&["department_id"]));

    let joined = ops::left_join(&staff, &department, "department_id", "department_id");
    finish(joined, target)
}

/// Reshapes the raw `counterparty` snapshot into `dim_counterparty`, joining
/// legal address attributes and renaming them into the target's
/// `counterparty_legal_*` namespace.
///
/// Counterparty rows without a matching address survive with null address
/// columns.
pub fn transform_counterparty(counterparty: Option<&Frame>, address: Option<&Frame>) -> Frame {
    let target = TargetTable::DimCounterparty;
    let Some(counterparty) = counterparty else {
        return empty_target(target);
    };

    let counterparty = ops::drop_columns(counterparty.clone(), BOOKKEEPING_COLUMNS);
    let address = address
        .map(|address| ops::drop_columns(address.clone(), BOOKKEEPING_COLUMNS))
        .unwrap_or_else(|| Frame::with_columns(&["address_id"]));

    let mut joined = ops::left_join(&counterparty, &address, "legal_address_id", "address_id");

    for (from, to) in [
        ("address_line_1", "counterparty_legal_address_line_1"),
        ("address_line_2", "counterparty_legal_address_line_2"),
        ("district", "counterparty_legal_district"),
        ("city", "counterparty_legal_city"),
        ("postal_code", "counterparty_legal_postal_code"),
        ("country", "counterparty_legal_country"),
        ("phone", "counterparty_legal_phone_number"),
    ] {
        joined = ops::rename_column(joined, from, to);
    }

    finish(joined, target)
}
