//! Calendar dimension generation and horizon extension.
//!
//! The calendar dimension is materialized over a persisted date range and
//! only regenerated when the range is missing or its horizon is close to
//! running out, so an unchanged and potentially very large dimension is not
//! rewritten every run.

use chrono::{Datelike, Months, NaiveDate};
use tracing::info;

use crate::error::{ErrorKind, StrataResult};
use crate::schema::TargetTable;
use crate::store::date_range::{DateRange, DateRangeStore};
use crate::store::object::ObjectStore;
use crate::strata_error;
use crate::types::{Cell, DATE_FORMAT, Frame};
use strata_config::shared::DateDimensionConfig;

/// Days per year used to express the extension threshold in days.
const DAYS_PER_YEAR: i64 = 365;

/// Maintains the calendar dimension horizon.
///
/// State machine over two states: the range record is either missing (first
/// run, a default range is manufactured and persisted) or present (extended
/// only when `days_remaining <= threshold`).
#[derive(Debug, Clone)]
pub struct CalendarDimension<S> {
    range_store: DateRangeStore<S>,
    default_start: NaiveDate,
    threshold_days: i64,
    extension_years: u32,
}

impl<S> CalendarDimension<S>
where
    S: ObjectStore,
{
    /// Creates the extender from its policy configuration.
    pub fn new(
        store: S,
        bucket: impl Into<String>,
        config: &DateDimensionConfig,
    ) -> StrataResult<Self> {
        let default_start = NaiveDate::parse_from_str(&config.default_start_date, DATE_FORMAT)
            .map_err(|err| {
                strata_error!(
                    ErrorKind::ConfigError,
                    "Invalid calendar dimension start date",
                    config.default_start_date.clone(),
                    source: err
                )
            })?;

        Ok(Self {
            range_store: DateRangeStore::new(store, bucket),
            default_start,
            threshold_days: i64::from(config.threshold_years) * DAYS_PER_YEAR,
            extension_years: config.extension_years,
        })
    }

    /// Loads the persisted range, manufacturing and persisting a default one
    /// when none exists.
    ///
    /// The `found` flag tells the caller whether a fresh full generation is
    /// required (`false` means the default was just created).
    pub async fn load_range(&self, today: NaiveDate) -> StrataResult<(DateRange, bool)> {
        if let Some(range) = self.range_store.load().await? {
            return Ok((range, true));
        }

        let default = DateRange {
            start: self.default_start,
            end: add_years(today, self.extension_years),
        };
        self.range_store.replace(default).await?;

        info!(
            start = %default.start,
            end = %default.end,
            "no calendar range found, persisted default range"
        );

        Ok((default, false))
    }

    /// Runs the extension policy for one pipeline run.
    ///
    /// Returns the calendar rows to load when the range was missing or due
    /// for extension, and [`None`] when the horizon is still comfortable
    /// (the no-op signal to the loader). The persisted end date never moves
    /// backward.
    pub async fn refresh(&self, today: NaiveDate) -> StrataResult<Option<Frame>> {
        let (range, found) = self.load_range(today).await?;

        if !found {
            info!(start = %range.start, end = %range.end, "generating full calendar dimension");
            return Ok(Some(generate(range.start, range.end)));
        }

        let days_remaining = (range.end - today).num_days();
        if days_remaining > self.threshold_days {
            return Ok(None);
        }

        let extended = DateRange {
            start: range.end,
            end: add_years(today, self.extension_years),
        };
        self.range_store.replace(extended).await?;

        info!(
            days_remaining,
            start = %extended.start,
            end = %extended.end,
            "calendar horizon within threshold, extending"
        );

        Ok(Some(generate(extended.start, extended.end)))
    }
}

/// Adds whole years to a date, clamping Feb 29 onto Feb 28 when needed.
fn add_years(date: NaiveDate, years: u32) -> NaiveDate {
    date.checked_add_months(Months::new(years * 12))
        .unwrap_or(NaiveDate::MAX)
}

/// Generates one calendar row per day in `[start, end]` inclusive.
///
/// Deterministic and side-effect free; re-callable with the same span to
/// produce identical rows.
pub fn generate(start: NaiveDate, end: NaiveDate) -> Frame {
    let mut frame = Frame::with_columns(TargetTable::DimDate.columns());

    for day in start.iter_days().take_while(|day| *day <= end) {
        let row = vec![
            Cell::Date(day),
            Cell::I64(i64::from(day.year())),
            Cell::I64(i64::from(day.month())),
            Cell::I64(i64::from(day.day())),
            Cell::I64(i64::from(day.weekday().number_from_monday())),
            Cell::String(day.format("%A").to_string()),
            Cell::String(day.format("%B").to_string()),
            Cell::I64(i64::from(day.month0() / 3 + 1)),
        ];

        frame
            .push_row(row)
            .expect("calendar rows match the dim_date schema");
    }

    frame
}
