use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BooleanArray, BooleanBuilder, Float64Array, Float64Builder, Int64Array,
    Int64Builder, StringArray, StringBuilder,
};
use arrow::datatypes::{DataType, Field, Schema as ArrowSchema};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::{ErrorKind, StrataResult};
use crate::strata_error;
use crate::types::{Cell, DATE_FORMAT, Frame, TIME_FORMAT, TIMESTAMP_FORMAT};

/// Encodes a frame to parquet bytes via an Arrow record batch.
///
/// Column types are inferred from the first non-null cell: booleans,
/// integers and floats keep their type; everything else (including temporal
/// cells) encodes as UTF-8 in the same fixed formats the JSON staging uses.
/// All columns are nullable. An empty frame still encodes its full column
/// list as a schema-only file.
pub fn frame_to_parquet(frame: &Frame) -> StrataResult<Bytes> {
    let fields: Vec<Field> = frame
        .columns()
        .iter()
        .enumerate()
        .map(|(index, name)| Field::new(name.clone(), infer_column_type(frame, index), true))
        .collect();
    let schema = Arc::new(ArrowSchema::new(fields));

    let arrays: Vec<ArrayRef> = schema
        .fields()
        .iter()
        .enumerate()
        .map(|(index, field)| build_column_array(frame, index, field.data_type()))
        .collect();

    let batch = if arrays.is_empty() && frame.is_empty() {
        RecordBatch::new_empty(schema.clone())
    } else {
        RecordBatch::try_new(schema.clone(), arrays)?
    };

    let mut body = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut body, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;

    Ok(Bytes::from(body))
}

/// Decodes parquet bytes back into a frame.
pub fn frame_from_parquet(body: Bytes) -> StrataResult<Frame> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(body)?;
    let schema = builder.schema().clone();
    let reader = builder.build()?;

    // The schema comes from the file footer, so a rows-free file still
    // yields its full column list.
    let mut frame = Frame::new(
        schema
            .fields()
            .iter()
            .map(|field| field.name().clone())
            .collect(),
    );

    for batch in reader {
        let batch = batch?;

        for row_index in 0..batch.num_rows() {
            let row: StrataResult<Vec<Cell>> = batch
                .columns()
                .iter()
                .map(|column| decode_cell(column, row_index))
                .collect();
            frame.push_row(row?)?;
        }
    }

    Ok(frame)
}

/// Infers the Arrow type of a column from its first non-null cell.
fn infer_column_type(frame: &Frame, column: usize) -> DataType {
    for row in frame.rows() {
        match &row[column] {
            Cell::Null => continue,
            Cell::Bool(_) => return DataType::Boolean,
            Cell::I16(_) | Cell::I32(_) | Cell::I64(_) => return DataType::Int64,
            Cell::F64(_) => return DataType::Float64,
            Cell::String(_) | Cell::Date(_) | Cell::Time(_) | Cell::Timestamp(_) => {
                return DataType::Utf8;
            }
        }
    }

    DataType::Utf8
}

/// Builds the Arrow array for one column; cells that do not fit the inferred
/// type become nulls rather than failing the write.
fn build_column_array(frame: &Frame, column: usize, data_type: &DataType) -> ArrayRef {
    match data_type {
        DataType::Boolean => {
            let mut builder = BooleanBuilder::with_capacity(frame.len());
            for row in frame.rows() {
                match &row[column] {
                    Cell::Bool(value) => builder.append_value(*value),
                    _ => builder.append_null(),
                }
            }
            Arc::new(builder.finish())
        }
        DataType::Int64 => {
            let mut builder = Int64Builder::with_capacity(frame.len());
            for row in frame.rows() {
                match row[column].as_i64() {
                    Some(value) => builder.append_value(value),
                    None => builder.append_null(),
                }
            }
            Arc::new(builder.finish())
        }
        DataType::Float64 => {
            let mut builder = Float64Builder::with_capacity(frame.len());
            for row in frame.rows() {
                match &row[column] {
                    Cell::F64(value) => builder.append_value(*value),
                    cell => match cell.as_i64() {
                        Some(value) => builder.append_value(value as f64),
                        None => builder.append_null(),
                    },
                }
            }
            Arc::new(builder.finish())
        }
        _ => {
            let mut builder = StringBuilder::new();
            for row in frame.rows() {
                match &row[column] {
                    Cell::String(value) => builder.append_value(value),
                    Cell::Date(value) => {
                        builder.append_value(value.format(DATE_FORMAT).to_string())
                    }
                    Cell::Time(value) => {
                        builder.append_value(value.format(TIME_FORMAT).to_string())
                    }
                    Cell::Timestamp(value) => {
                        builder.append_value(value.format(TIMESTAMP_FORMAT).to_string())
                    }
                    _ => builder.append_null(),
                }
            }
            Arc::new(builder.finish())
        }
    }
}

/// Decodes one cell out of an Arrow column.
fn decode_cell(column: &ArrayRef, row: usize) -> StrataResult<Cell> {
    if column.is_null(row) {
        return Ok(Cell::Null);
    }

    let cell = match column.data_type() {
        DataType::Boolean => {
            let array = column
                .as_any()
                .downcast_ref::<BooleanArray>()
                .ok_or_else(downcast_error)?;
            Cell::Bool(array.value(row))
        }
        DataType::Int64 => {
            let array = column
                .as_any()
                .downcast_ref::<Int64Array>()
                .ok_or_else(downcast_error)?;
            Cell::I64(array.value(row))
        }
        DataType::Float64 => {
            let array = column
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(downcast_error)?;
            Cell::F64(array.value(row))
        }
        DataType::Utf8 => {
            let array = column
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(downcast_error)?;
            Cell::String(array.value(row).to_string())
        }
        other => {
            return Err(strata_error!(
                ErrorKind::DeserializationError,
                "Unsupported parquet column type",
                other.to_string()
            ));
        }
    };

    Ok(cell)
}

fn downcast_error() -> crate::error::StrataError {
    strata_error!(
        ErrorKind::DeserializationError,
        "Parquet column does not match its declared type"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn typed_frame_round_trips() {
        let mut frame = Frame::with_columns(&["id", "price", "name", "ordered_on"]);
        frame
            .push_row(vec![
                Cell::I64(1),
                Cell::F64(2.5),
                Cell::String("velvet".into()),
                Cell::Date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()),
            ])
            .unwrap();
        frame
            .push_row(vec![Cell::I64(2), Cell::Null, Cell::Null, Cell::Null])
            .unwrap();

        let body = frame_to_parquet(&frame).unwrap();
        let decoded = frame_from_parquet(body).unwrap();

        assert_eq!(decoded.columns(), frame.columns());
        assert_eq!(decoded.cell(0, "id"), Some(&Cell::I64(1)));
        assert_eq!(decoded.cell(0, "price"), Some(&Cell::F64(2.5)));
        assert_eq!(
            decoded.cell(0, "ordered_on"),
            Some(&Cell::String("2024-03-05".into()))
        );
        assert_eq!(decoded.cell(1, "price"), Some(&Cell::Null));
    }

    #[test]
    fn empty_frame_keeps_schema_through_parquet() {
        let frame = Frame::with_columns(&["currency_id", "currency_code", "currency_name"]);

        let body = frame_to_parquet(&frame).unwrap();
        let decoded = frame_from_parquet(body).unwrap();

        assert_eq!(
            decoded.columns(),
            ["currency_id", "currency_code", "currency_name"]
        );
        assert!(decoded.is_empty());
    }
}
