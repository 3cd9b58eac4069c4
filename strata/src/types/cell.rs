use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Number, Value};

/// Serialization format for timestamp cells in staged JSON.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Serialization format for date cells in staged JSON.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Serialization format for time-of-day cells in staged JSON.
pub const TIME_FORMAT: &str = "%H:%M:%S%.6f";

/// A single scalar value from a source or warehouse table.
///
/// [`Cell`] is the typed representation of every value that flows through
/// the pipeline. Decimal/numeric source values are carried as [`Cell::F64`];
/// timestamps are naive (the source stores wall-clock values without zone).
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    F64(f64),
    String(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
}

impl Cell {
    /// Returns whether this cell is the null sentinel.
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Returns the cell as a string slice when it holds text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the cell as a signed integer when it holds one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::I16(value) => Some(i64::from(*value)),
            Cell::I32(value) => Some(i64::from(*value)),
            Cell::I64(value) => Some(*value),
            _ => None,
        }
    }

    /// Coerces the cell to a timestamp.
    ///
    /// Timestamp cells return their value directly; string cells are parsed
    /// with [`TIMESTAMP_FORMAT`] (and a seconds-precision fallback). Anything
    /// unparseable yields [`None`], which callers recover as a null field.
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::Timestamp(value) => Some(*value),
            Cell::String(value) => NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
                .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
                .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
                .ok(),
            _ => None,
        }
    }

    /// Converts the cell into its staged JSON representation.
    ///
    /// Timestamps, dates and times serialize to fixed-format strings so that
    /// staged snapshots are stable across runs.
    pub fn to_json(&self) -> Value {
        match self {
            Cell::Null => Value::Null,
            Cell::Bool(value) => Value::Bool(*value),
            Cell::I16(value) => Value::Number((*value).into()),
            Cell::I32(value) => Value::Number((*value).into()),
            Cell::I64(value) => Value::Number((*value).into()),
            Cell::F64(value) => Number::from_f64(*value)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Cell::String(value) => Value::String(value.clone()),
            Cell::Date(value) => Value::String(value.format(DATE_FORMAT).to_string()),
            Cell::Time(value) => Value::String(value.format(TIME_FORMAT).to_string()),
            Cell::Timestamp(value) => Value::String(value.format(TIMESTAMP_FORMAT).to_string()),
        }
    }

    /// Builds a cell from a staged JSON value.
    ///
    /// Staged JSON carries no type metadata beyond the JSON scalar kinds, so
    /// temporal values come back as strings; transforms that need timestamps
    /// coerce them via [`Cell::as_timestamp`].
    pub fn from_json(value: Value) -> Cell {
        match value {
            Value::Null => Cell::Null,
            Value::Bool(value) => Cell::Bool(value),
            Value::Number(value) => {
                if let Some(int) = value.as_i64() {
                    Cell::I64(int)
                } else if let Some(float) = value.as_f64() {
                    Cell::F64(float)
                } else {
                    Cell::Null
                }
            }
            Value::String(value) => Cell::String(value),
            // Nested structures never appear in staged snapshots.
            Value::Array(_) | Value::Object(_) => Cell::Null,
        }
    }
}

/// Total ordering over cells, used for the deterministic sort of transform
/// outputs.
///
/// Nulls sort last; otherwise cells compare within their variant, and
/// mixed-variant comparisons fall back to a stable variant rank.
pub fn cmp_cells(a: &Cell, b: &Cell) -> Ordering {
    fn rank(cell: &Cell) -> u8 {
        match cell {
            Cell::Bool(_) => 0,
            Cell::I16(_) | Cell::I32(_) | Cell::I64(_) => 1,
            Cell::F64(_) => 2,
            Cell::String(_) => 3,
            Cell::Date(_) => 4,
            Cell::Time(_) => 5,
            Cell::Timestamp(_) => 6,
            Cell::Null => 7,
        }
    }

    match (a, b) {
        (Cell::Null, Cell::Null) => Ordering::Equal,
        (Cell::Bool(a), Cell::Bool(b)) => a.cmp(b),
        (Cell::String(a), Cell::String(b)) => a.cmp(b),
        (Cell::Date(a), Cell::Date(b)) => a.cmp(b),
        (Cell::Time(a), Cell::Time(b)) => a.cmp(b),
        (Cell::Timestamp(a), Cell::Timestamp(b)) => a.cmp(b),
        (Cell::F64(a), Cell::F64(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        _ => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => rank(a).cmp(&rank(b)),
        },
    }
}
