//! Persistence for the calendar dimension's materialized date range.
//!
//! A single JSON record `{start_date, end_date}` under a fixed key, fully
//! overwritten on every change. The end date never moves backward; the
//! extension policy in [`crate::dates`] only appends a strictly later
//! horizon.

use bytes::Bytes;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ErrorKind, StrataResult};
use crate::store::object::ObjectStore;
use crate::strata_error;
use crate::types::DATE_FORMAT;

/// Fixed key holding the materialized date range.
pub const DATE_RANGE_KEY: &str = "date_table_last_date.json";

/// Inclusive span of days already materialized into the calendar dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Serialize, Deserialize)]
struct DateRangeRecord {
    start_date: String,
    end_date: String,
}

/// Store for the calendar dimension's date-range record.
#[derive(Debug, Clone)]
pub struct DateRangeStore<S> {
    store: S,
    bucket: String,
}

impl<S> DateRangeStore<S>
where
    S: ObjectStore,
{
    /// Creates a date-range store persisting into the given bucket.
    pub fn new(store: S, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    /// Returns the persisted range, or [`None`] when no record exists.
    ///
    /// Absence is the expected first-run state; storage failures propagate.
    pub async fn load(&self) -> StrataResult<Option<DateRange>> {
        let Some(body) = self.store.fetch(&self.bucket, DATE_RANGE_KEY).await? else {
            return Ok(None);
        };

        let record: DateRangeRecord = serde_json::from_slice(&body)?;

        let start = parse_date(&record.start_date)?;
        let end = parse_date(&record.end_date)?;

        Ok(Some(DateRange { start, end }))
    }

    /// Replaces the persisted range with a full overwrite.
    pub async fn replace(&self, range: DateRange) -> StrataResult<()> {
        let record = DateRangeRecord {
            start_date: range.start.format(DATE_FORMAT).to_string(),
            end_date: range.end.format(DATE_FORMAT).to_string(),
        };
        let body = serde_json::to_vec(&record)?;

        self.store
            .put(&self.bucket, DATE_RANGE_KEY, Bytes::from(body))
            .await?;

        info!(
            start = %range.start,
            end = %range.end,
            "persisted calendar dimension range"
        );

        Ok(())
    }
}

fn parse_date(value: &str) -> StrataResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|err| {
        strata_error!(
            ErrorKind::DeserializationError,
            "Date range record holds an unparseable date",
            value.to_string(),
            source: err
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::object::MemoryObjectStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn missing_record_loads_as_none() {
        let store = DateRangeStore::new(MemoryObjectStore::new(), "raw");

        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn replace_overwrites_previous_record() {
        let store = DateRangeStore::new(MemoryObjectStore::new(), "raw");

        let first = DateRange {
            start: date(2020, 1, 1),
            end: date(2035, 1, 1),
        };
        store.replace(first).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(first));

        let second = DateRange {
            start: date(2035, 1, 1),
            end: date(2050, 6, 1),
        };
        store.replace(second).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(second));
    }
}
