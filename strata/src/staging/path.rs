use chrono::NaiveDateTime;

/// Key prefix for the time-derived staging axis.
const BY_TIME_PREFIX: &str = "data/by time";

/// Key prefix for the table-derived staging axis.
const BY_TABLE_PREFIX: &str = "data/by table";

/// Time-derived path segments: `{year}/{MM-MonthName}/{day}/{HH:MM:SS.ffffff}`.
fn time_segments(run_started_at: NaiveDateTime) -> String {
    run_started_at.format("%Y/%m-%B/%d/%H:%M:%S%.6f").to_string()
}

/// Builds the by-time staging key for a table snapshot.
///
/// `data/by time/{year}/{MM-MonthName}/{day}/{HH:MM:SS.ffffff}/{table}`.
pub fn by_time_key(run_started_at: NaiveDateTime, table: &str) -> String {
    format!("{BY_TIME_PREFIX}/{}/{table}", time_segments(run_started_at))
}

/// Builds the by-table staging key for the same payload, the second
/// retrieval axis.
///
/// `data/by table/{table}/{year}/{MM-MonthName}/{day}/{HH:MM:SS.ffffff}`.
pub fn by_table_key(run_started_at: NaiveDateTime, table: &str) -> String {
    format!("{BY_TABLE_PREFIX}/{table}/{}", time_segments(run_started_at))
}

/// Builds the transformed staging key for a target table.
pub fn transformed_key(run_started_at: NaiveDateTime, target: &str) -> String {
    format!(
        "{BY_TIME_PREFIX}/{}/{target}.parquet",
        time_segments(run_started_at)
    )
}

/// Extracts the table name from a staging key: the last path segment, minus
/// any `.parquet` suffix.
pub fn table_name_from_key(key: &str) -> &str {
    let name = key.rsplit('/').next().unwrap_or(key);
    name.strip_suffix(".parquet").unwrap_or(name)
}

/// Recovers the run timestamp from a by-time staging key.
///
/// Inverse of the key grammar: `{year}/{MM-MonthName}/{day}/{time}` segments
/// after the prefix. Returns [`None`] for keys that do not follow it.
pub fn run_time_from_key(key: &str) -> Option<NaiveDateTime> {
    let segments: Vec<&str> = key
        .strip_prefix(BY_TIME_PREFIX)?
        .trim_start_matches('/')
        .split('/')
        .collect();

    let [year, month, day, time, ..] = segments.as_slice() else {
        return None;
    };
    let month_number = month.split('-').next()?;

    let formatted = format!("{year}-{month_number}-{day} {time}");
    chrono::NaiveDateTime::parse_from_str(&formatted, "%Y-%m-%d %H:%M:%S%.6f").ok()
}
