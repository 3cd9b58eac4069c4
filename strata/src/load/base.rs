use std::future::Future;

use crate::error::StrataResult;
use crate::types::Frame;

/// Trait for systems that receive transformed warehouse tables.
///
/// The contract is append-only: implementations never upsert, delete or
/// truncate as part of the load path. Appending an empty frame is a no-op
/// that must still succeed, since transforms guarantee schema-correct empty
/// output for unchanged tables.
pub trait WarehouseLoader {
    /// Appends the frame's rows to the named warehouse table.
    ///
    /// Returns the number of rows appended.
    fn append_rows(
        &self,
        table: &str,
        frame: &Frame,
    ) -> impl Future<Output = StrataResult<u64>> + Send;
}
