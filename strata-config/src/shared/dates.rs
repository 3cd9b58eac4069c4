use serde::{Deserialize, Serialize};

fn default_start_date() -> String {
    "2020-01-01".to_string()
}

const fn default_threshold_years() -> u32 {
    10
}

const fn default_extension_years() -> u32 {
    15
}

/// Policy settings for the calendar dimension horizon.
///
/// The calendar dimension is only regenerated when the persisted range is
/// missing or its end is within `threshold_years` of today; extensions push
/// the horizon out by `extension_years` from today.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateDimensionConfig {
    /// Start of the very first generated range (`YYYY-MM-DD`).
    #[serde(default = "default_start_date")]
    pub default_start_date: String,
    /// Remaining-horizon threshold, in years, that triggers an extension.
    #[serde(default = "default_threshold_years")]
    pub threshold_years: u32,
    /// How far past today, in years, an extension reaches.
    #[serde(default = "default_extension_years")]
    pub extension_years: u32,
}

impl Default for DateDimensionConfig {
    fn default() -> Self {
        Self {
            default_start_date: default_start_date(),
            threshold_years: default_threshold_years(),
            extension_years: default_extension_years(),
        }
    }
}
