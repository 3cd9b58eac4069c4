//! Generic frame operations shared by every dimensional transform.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::types::{Cell, Frame, cmp_cells};

/// Drops the named columns, ignoring names the frame does not have.
pub fn drop_columns(frame: Frame, names: &[&str]) -> Frame {
    let keep: Vec<usize> = frame
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, column)| !names.contains(&column.as_str()))
        .map(|(index, _)| index)
        .collect();

    let columns: Vec<String> = keep
        .iter()
        .map(|&index| frame.columns()[index].clone())
        .collect();

    let mut result = Frame::new(columns);
    for row in frame.into_rows() {
        let projected: Vec<Cell> = keep.iter().map(|&index| row[index].clone()).collect();
        result
            .rows_mut()
            .push(projected);
    }

    result
}

/// Renames a column in place; a missing source name is a no-op.
pub fn rename_column(mut frame: Frame, from: &str, to: &str) -> Frame {
    if let Some(index) = frame.column_index(from) {
        frame.columns_mut()[index] = to.to_string();
    }

    frame
}

/// Projects the frame onto the given column list, in order.
///
/// Columns the frame does not have come back as all-null columns, so the
/// output schema is always exactly the requested list, even for degenerate
/// input.
pub fn select(frame: &Frame, names: &[&str]) -> Frame {
    let indexes: Vec<Option<usize>> = names.iter().map(|name| frame.column_index(name)).collect();

    let mut result = Frame::new(names.iter().map(|name| name.to_string()).collect());
    for row in frame.rows() {
        let projected: Vec<Cell> = indexes
            .iter()
            .map(|index| match index {
                Some(index) => row[*index].clone(),
                None => Cell::Null,
            })
            .collect();
        result.rows_mut().push(projected);
    }

    result
}

/// Removes duplicate rows, keeping the first occurrence.
///
/// Rows compare on their full cell content in the frame's current column
/// set, so pruning bookkeeping columns before deduplication makes rows that
/// differed only there collapse.
pub fn dedup_rows(mut frame: Frame) -> Frame {
    let mut seen = HashSet::new();

    frame.rows_mut().retain(|row| {
        let key = row
            .iter()
            .map(|cell| format!("{:?}", cell.to_json()))
            .collect::<Vec<_>>()
            .join("\u{1f}");
        seen.insert(key)
    });

    frame
}

/// Stably sorts rows by the named column for reproducible output ordering.
///
/// A missing sort column leaves the frame untouched.
pub fn sort_by(mut frame: Frame, column: &str) -> Frame {
    let Some(index) = frame.column_index(column) else {
        return frame;
    };

    frame
        .rows_mut()
        .sort_by(|a, b| cmp_cells(&a[index], &b[index]));

    frame
}

/// Left-joins `right` onto `left` by key equality.
///
/// Every left row appears exactly once in the output; unmatched rows carry
/// nulls for the right columns. The right key column is not duplicated into
/// the output. Null keys never match, and only the first matching right row
/// is taken.
pub fn left_join(left: &Frame, right: &Frame, left_key: &str, right_key: &str) -> Frame {
    let left_key_index = left.column_index(left_key);
    let right_key_index = right.column_index(right_key);

    let right_value_indexes: Vec<usize> = right
        .columns()
        .iter()
        .enumerate()
        .filter(|(index, _)| Some(*index) != right_key_index)
        .map(|(index, _)| index)
        .collect();

    let mut columns: Vec<String> = left.columns().to_vec();
    columns.extend(
        right_value_indexes
            .iter()
            .map(|&index| right.columns()[index].clone()),
    );

    let mut result = Frame::new(columns);

    for row in left.rows() {
        let matched = match (left_key_index, right_key_index) {
            (Some(left_index), Some(right_index)) if !row[left_index].is_null() => right
                .rows()
                .iter()
                .find(|candidate| {
                    cmp_cells(&candidate[right_index], &row[left_index]) == Ordering::Equal
                }),
            _ => None,
        };

        let mut joined = row.clone();
        match matched {
            Some(matched) => {
                joined.extend(right_value_indexes.iter().map(|&index| matched[index].clone()));
            }
            None => {
                joined.extend(right_value_indexes.iter().map(|_| Cell::Null));
            }
        }

        result.rows_mut().push(joined);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(columns: &[&str], rows: Vec<Vec<Cell>>) -> Frame {
        let mut frame = Frame::with_columns(columns);
        for row in rows {
            frame.push_row(row).unwrap();
        }
        frame
    }

    #[test]
    fn drop_and_rename() {
        let input = frame(
            &["address_id", "city", "created_at"],
            vec![vec![
                Cell::I64(1),
                Cell::String("Leeds".into()),
                Cell::String("2022-11-03 14:20:49.962000".into()),
            ]],
        );

        let result = rename_column(
            drop_columns(input, &["created_at"]),
            "address_id",
            "location_id",
        );

        assert_eq!(result.columns(), ["location_id", "city"]);
        assert_eq!(result.cell(0, "location_id"), Some(&Cell::I64(1)));
    }

    #[test]
    fn select_fills_missing_columns_with_null() {
        let input = frame(&["a"], vec![vec![Cell::I64(1)]]);

        let result = select(&input, &["a", "b"]);

        assert_eq!(result.columns(), ["a", "b"]);
        assert_eq!(result.cell(0, "b"), Some(&Cell::Null));
    }

    #[test]
    fn dedup_collapses_identical_rows() {
        let input = frame(
            &["id", "name"],
            vec![
                vec![Cell::I64(1), Cell::String("x".into())],
                vec![Cell::I64(1), Cell::String("x".into())],
                vec![Cell::I64(2), Cell::String("x".into())],
            ],
        );

        assert_eq!(dedup_rows(input).len(), 2);
    }

    #[test]
    fn sort_by_orders_rows_and_tolerates_missing_column() {
        let input = frame(
            &["id"],
            vec![vec![Cell::I64(3)], vec![Cell::I64(1)], vec![Cell::I64(2)]],
        );

        let sorted = sort_by(input, "id");
        assert_eq!(sorted.cell(0, "id"), Some(&Cell::I64(1)));
        assert_eq!(sorted.cell(2, "id"), Some(&Cell::I64(3)));

        let untouched = sort_by(sorted.clone(), "nope");
        assert_eq!(untouched, sorted);
    }

    #[test]
    fn left_join_keeps_unmatched_left_rows() {
        let staff = frame(
            &["staff_id", "department_id"],
            vec![
                vec![Cell::I64(8), Cell::I64(7)],
                vec![Cell::I64(9), Cell::I64(99)],
            ],
        );
        let departments = frame(
            &["department_id", "department_name"],
            vec![vec![Cell::I64(7), Cell::String("Sales".into())]],
        );

        let joined = left_join(&staff, &departments, "department_id", "department_id");

        assert_eq!(
            joined.columns(),
            ["staff_id", "department_id", "department_name"]
        );
        assert_eq!(
            joined.cell(0, "department_name"),
            Some(&Cell::String("Sales".into()))
        );
        assert_eq!(joined.cell(1, "department_name"), Some(&Cell::Null));
    }

    #[test]
    fn left_join_null_keys_never_match() {
        let left = frame(&["id", "fk"], vec![vec![Cell::I64(1), Cell::Null]]);
        let right = frame(&["fk", "value"], vec![vec![Cell::Null, Cell::I64(42)]]);

        let joined = left_join(&left, &right, "fk", "fk");
        assert_eq!(joined.cell(0, "value"), Some(&Cell::Null));
    }
}
