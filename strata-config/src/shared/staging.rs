use serde::{Deserialize, Serialize};

/// Object-storage buckets used for staging between pipeline stages.
///
/// Raw snapshots land in `raw_bucket` as JSON; transformed tables land in
/// `transformed_bucket` as parquet. The watermark history and the date-range
/// record live in the raw bucket under fixed keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Bucket receiving raw extracted snapshots and the scalar state records.
    pub raw_bucket: String,
    /// Bucket receiving transformed, warehouse-shaped tables.
    pub transformed_bucket: String,
}
