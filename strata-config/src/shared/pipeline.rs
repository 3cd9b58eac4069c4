use serde::Deserialize;

use crate::shared::{
    DateDimensionConfig, PgConnectionConfig, StagingConfig, ValidationError,
};

/// Source tables extracted on every run, in fixed iteration order.
pub fn default_source_tables() -> Vec<String> {
    [
        "counterparty",
        "currency",
        "department",
        "design",
        "staff",
        "sales_order",
        "address",
        "payment",
        "purchase_order",
        "payment_type",
        "transaction",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Configuration for a strata pipeline.
///
/// Contains everything a run needs: source and warehouse connections,
/// staging buckets, the ordered source-table list and the calendar
/// dimension policy.
///
/// This intentionally does not implement [`serde::Serialize`] to avoid
/// accidentally leaking secrets in the config into serialized forms.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// The unique identifier for this pipeline.
    pub id: u64,
    /// Connection to the operational source database.
    pub source: PgConnectionConfig,
    /// Connection to the analytical warehouse.
    pub warehouse: PgConnectionConfig,
    /// Staging bucket layout.
    pub staging: StagingConfig,
    /// Source tables to extract, in iteration order.
    #[serde(default = "default_source_tables")]
    pub source_tables: Vec<String>,
    /// Calendar dimension horizon policy.
    #[serde(default)]
    pub date_dimension: DateDimensionConfig,
}

impl PipelineConfig {
    /// Validates pipeline configuration settings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.source.validate()?;
        self.warehouse.validate()?;

        Ok(())
    }
}
