use bytes::Bytes;
use serde_json::{Map, Value};

use crate::error::{ErrorKind, StrataResult};
use crate::strata_error;
use crate::types::{Cell, Frame};

/// Serializes a frame to its staged JSON form: an array of flat objects
/// mapping column name to scalar value.
///
/// Object keys serialize sorted, so staged payloads are byte-stable for a
/// given frame; temporal cells render as fixed-format strings.
pub fn frame_to_json(frame: &Frame) -> StrataResult<Bytes> {
    let mut records = Vec::with_capacity(frame.len());

    for row in frame.rows() {
        let mut record = Map::new();
        for (column, cell) in frame.columns().iter().zip(row) {
            record.insert(column.clone(), cell.to_json());
        }
        records.push(Value::Object(record));
    }

    let body = serde_json::to_vec(&Value::Array(records))?;
    Ok(Bytes::from(body))
}

/// Deserializes a staged JSON payload back into a frame.
///
/// The column list is taken from the first record's keys (sorted, matching
/// the serialized form); records missing a column yield null cells for it.
/// An empty array yields an empty, column-less frame; extraction never
/// stages empty tables, so this only arises for hand-written fixtures.
pub fn frame_from_json(body: &[u8]) -> StrataResult<Frame> {
    let records: Vec<Map<String, Value>> = serde_json::from_slice(body)?;

    let Some(first) = records.first() else {
        return Ok(Frame::new(Vec::new()));
    };

    let columns: Vec<String> = first.keys().cloned().collect();
    let mut frame = Frame::new(columns);

    for record in records {
        let row: Vec<Cell> = frame
            .columns()
            .iter()
            .map(|column| {
                record
                    .get(column.as_str())
                    .cloned()
                    .map(Cell::from_json)
                    .unwrap_or(Cell::Null)
            })
            .collect();

        frame.push_row(row)?;
    }

    Ok(frame)
}

/// Decodes a staged payload into a frame, classifying malformed JSON as
/// invalid staged data for the offending key.
pub fn decode_staged(key: &str, body: &[u8]) -> StrataResult<Frame> {
    frame_from_json(body).map_err(|err| {
        strata_error!(
            ErrorKind::InvalidData,
            "Staged snapshot is not valid JSON",
            key.to_string(),
            source: err
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn staff_frame() -> Frame {
        let mut frame = Frame::with_columns(&["staff_id", "first_name", "created_at"]);
        frame
            .push_row(vec![
                Cell::I64(8),
                Cell::String("Ozzy".into()),
                Cell::Timestamp(
                    NaiveDate::from_ymd_opt(2022, 11, 3)
                        .unwrap()
                        .and_hms_micro_opt(14, 20, 51, 563000)
                        .unwrap(),
                ),
            ])
            .unwrap();
        frame
    }

    #[test]
    fn serialized_form_is_sorted_flat_objects() {
        let body = frame_to_json(&staff_frame()).unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();

        assert_eq!(
            text,
            r#"[{"created_at":"2022-11-03 14:20:51.563000","first_name":"Ozzy","staff_id":8}]"#
        );
    }

    #[test]
    fn round_trip_preserves_values_with_sorted_columns() {
        let body = frame_to_json(&staff_frame()).unwrap();
        let frame = frame_from_json(&body).unwrap();

        assert_eq!(frame.columns(), ["created_at", "first_name", "staff_id"]);
        assert_eq!(frame.cell(0, "staff_id"), Some(&Cell::I64(8)));
        assert_eq!(
            frame.cell(0, "first_name"),
            Some(&Cell::String("Ozzy".into()))
        );
    }

    #[test]
    fn missing_column_in_record_becomes_null() {
        let body = br#"[{"a":1,"b":2},{"a":3}]"#;
        let frame = frame_from_json(body).unwrap();

        assert_eq!(frame.cell(1, "b"), Some(&Cell::Null));
    }

    #[test]
    fn malformed_payload_is_invalid_data() {
        let err = decode_staged("data/by time/x/staff", b"{not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }
}
