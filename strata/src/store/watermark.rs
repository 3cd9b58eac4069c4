//! Watermark persistence for incremental extraction.
//!
//! The watermark history is a JSON array of timestamp strings under a single
//! fixed key; the high-water mark is the last element. An absent or empty
//! history is the expected first-run state, reported through the `found`
//! flag rather than an error.

use bytes::Bytes;
use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info};

use crate::error::{ErrorKind, StrataResult};
use crate::store::object::ObjectStore;
use crate::strata_error;
use crate::types::TIMESTAMP_FORMAT;

/// Fixed key holding the watermark history.
pub const WATERMARK_KEY: &str = "last_extraction_times.json";

/// Sentinel returned when no watermark has ever been recorded.
///
/// The minimal representable calendar date, guaranteed to be older than any
/// real source row, so a first run extracts everything.
pub fn epoch_watermark() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .expect("fixed epoch date is valid")
        .and_hms_opt(0, 0, 0)
        .expect("fixed epoch time is valid")
}

/// Store for the extraction high-water mark.
///
/// Reads happen at the start of a run; [`WatermarkStore::record_run`] is
/// called exactly once at the end of a run, after extraction of all tables
/// completes, never before.
#[derive(Debug, Clone)]
pub struct WatermarkStore<S> {
    store: S,
    bucket: String,
}

impl<S> WatermarkStore<S>
where
    S: ObjectStore,
{
    /// Creates a watermark store persisting into the given bucket.
    pub fn new(store: S, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    /// Returns the last recorded watermark and whether one was found.
    ///
    /// An absent or empty history yields the epoch sentinel and
    /// `found = false`; this is the expected first-run path. Any other
    /// storage failure propagates and aborts the run before any table is
    /// queried.
    pub async fn get_watermark(&self) -> StrataResult<(NaiveDateTime, bool)> {
        let Some(body) = self.store.fetch(&self.bucket, WATERMARK_KEY).await? else {
            info!("no watermark history found, falling back to epoch sentinel");
            return Ok((epoch_watermark(), false));
        };

        let history = parse_history(&body)?;
        match history.last() {
            Some(last) => {
                debug!(watermark = %last.format(TIMESTAMP_FORMAT), "loaded watermark");
                Ok((*last, true))
            }
            None => {
                info!("watermark history is empty, falling back to epoch sentinel");
                Ok((epoch_watermark(), false))
            }
        }
    }

    /// Appends a new watermark to the history.
    ///
    /// Must be called exactly once per run, with the run's start time,
    /// regardless of whether any table had changes.
    pub async fn record_run(&self, new_watermark: NaiveDateTime) -> StrataResult<()> {
        let mut history = match self.store.fetch(&self.bucket, WATERMARK_KEY).await? {
            Some(body) => parse_history(&body)?,
            None => Vec::new(),
        };

        history.push(new_watermark);

        let serialized: Vec<String> = history
            .iter()
            .map(|entry| entry.format(TIMESTAMP_FORMAT).to_string())
            .collect();
        let body = serde_json::to_vec(&serialized)?;

        self.store
            .put(&self.bucket, WATERMARK_KEY, Bytes::from(body))
            .await?;

        info!(
            watermark = %new_watermark.format(TIMESTAMP_FORMAT),
            runs = history.len(),
            "recorded run watermark"
        );

        Ok(())
    }

    /// Returns the full watermark history, oldest first.
    pub async fn history(&self) -> StrataResult<Vec<NaiveDateTime>> {
        match self.store.fetch(&self.bucket, WATERMARK_KEY).await? {
            Some(body) => parse_history(&body),
            None => Ok(Vec::new()),
        }
    }
}

fn parse_history(body: &[u8]) -> StrataResult<Vec<NaiveDateTime>> {
    let entries: Vec<String> = serde_json::from_slice(body)?;

    entries
        .iter()
        .map(|entry| {
            NaiveDateTime::parse_from_str(entry, TIMESTAMP_FORMAT).map_err(|err| {
                strata_error!(
                    ErrorKind::DeserializationError,
                    "Watermark history holds an unparseable timestamp",
                    entry.clone(),
                    source: err
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::object::MemoryObjectStore;
    use chrono::NaiveDate;

    fn timestamp(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[tokio::test]
    async fn empty_store_returns_epoch_and_not_found() {
        let store = WatermarkStore::new(MemoryObjectStore::new(), "raw");

        let (watermark, found) = store.get_watermark().await.unwrap();

        assert!(!found);
        assert_eq!(watermark, epoch_watermark());
        assert_eq!(
            watermark.format(TIMESTAMP_FORMAT).to_string(),
            "0001-01-01 00:00:00.000000"
        );
    }

    #[tokio::test]
    async fn history_is_monotonic_and_one_entry_per_run() {
        let store = WatermarkStore::new(MemoryObjectStore::new(), "raw");

        let runs = [
            timestamp(2025, 1, 1, 9, 0, 0),
            timestamp(2025, 1, 2, 9, 0, 0),
            timestamp(2025, 1, 3, 9, 0, 0),
        ];
        for run in runs {
            store.record_run(run).await.unwrap();
        }

        let history = store.history().await.unwrap();
        assert_eq!(history.len(), 3);
        assert!(history.windows(2).all(|pair| pair[0] <= pair[1]));

        let (watermark, found) = store.get_watermark().await.unwrap();
        assert!(found);
        assert_eq!(watermark, runs[2]);
    }

    #[tokio::test]
    async fn microsecond_precision_survives_round_trip() {
        let store = WatermarkStore::new(MemoryObjectStore::new(), "raw");
        let run = NaiveDate::from_ymd_opt(2022, 11, 3)
            .unwrap()
            .and_hms_micro_opt(14, 20, 51, 563000)
            .unwrap();

        store.record_run(run).await.unwrap();

        let (watermark, found) = store.get_watermark().await.unwrap();
        assert!(found);
        assert_eq!(watermark, run);
    }
}
