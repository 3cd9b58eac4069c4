use std::future::Future;

use chrono::NaiveDateTime;

use crate::error::StrataResult;
use crate::types::Cell;

/// Trait for querying changed rows out of the operational source database.
///
/// Implementations resolve a table's ordered column list and return the rows
/// whose `created_at` or `last_updated` timestamp advanced past the
/// watermark. Rows come back as cell vectors aligned to the column list.
pub trait SourceClient {
    /// Returns the ordered column list for a table.
    ///
    /// An unknown table yields an empty list, which the extractor treats as
    /// a silent skip.
    fn table_columns(
        &self,
        table: &str,
    ) -> impl Future<Output = StrataResult<Vec<String>>> + Send;

    /// Returns rows where either bookkeeping timestamp is strictly greater
    /// than `since`, an inclusive OR of the two predicates.
    fn changed_rows(
        &self,
        table: &str,
        columns: &[String],
        since: NaiveDateTime,
    ) -> impl Future<Output = StrataResult<Vec<Vec<Cell>>>> + Send;
}
