use std::future::Future;

use bytes::Bytes;

use crate::error::StrataResult;

/// Trait for key-value blob stores addressed by `(bucket, key)`.
///
/// [`ObjectStore`] implementations define how staged snapshots, transformed
/// tables and the two scalar state records are persisted. Expected absence
/// is part of the read contract: [`ObjectStore::fetch`] returns [`None`] for
/// a missing key instead of an error, so callers can distinguish the
/// first-run path from infrastructure failures.
///
/// Staged objects are written once under run-unique keys and never mutated
/// in place; only the watermark and date-range records are overwritten.
pub trait ObjectStore {
    /// Reads an object, returning [`None`] when the key does not exist.
    ///
    /// Any failure other than "not found" (missing bucket, access denied,
    /// connectivity) is an error and must not be mapped to [`None`].
    fn fetch(
        &self,
        bucket: &str,
        key: &str,
    ) -> impl Future<Output = StrataResult<Option<Bytes>>> + Send;

    /// Writes an object, fully replacing any previous value.
    fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
    ) -> impl Future<Output = StrataResult<()>> + Send;

    /// Lists keys under a prefix, in lexicographic order.
    fn list(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> impl Future<Output = StrataResult<Vec<String>>> + Send;
}
