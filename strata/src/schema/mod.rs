//! Fixed warehouse target schemas.
//!
//! Every warehouse table has a declared column set that transforms must
//! produce even for empty input, so downstream appends never fail on schema
//! mismatch.

/// Source-side bookkeeping columns dropped by every transform once they have
/// served their extraction-filtering purpose.
pub const BOOKKEEPING_COLUMNS: &[&str] = &["created_at", "last_updated"];

/// A warehouse target table with a fixed column set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetTable {
    DimDesign,
    DimCurrency,
    DimLocation,
    DimStaff,
    DimCounterparty,
    DimDate,
    FactSalesOrder,
}

impl TargetTable {
    /// All targets produced by the transform stage, in load order.
    ///
    /// Dimensions precede the fact table so that foreign keys resolve when
    /// the warehouse enforces them.
    pub const ALL: &'static [TargetTable] = &[
        TargetTable::DimDesign,
        TargetTable::DimCurrency,
        TargetTable::DimLocation,
        TargetTable::DimStaff,
        TargetTable::DimCounterparty,
        TargetTable::DimDate,
        TargetTable::FactSalesOrder,
    ];

    /// Returns the warehouse table name.
    pub fn name(&self) -> &'static str {
        match self {
            TargetTable::DimDesign => "dim_design",
            TargetTable::DimCurrency => "dim_currency",
            TargetTable::DimLocation => "dim_location",
            TargetTable::DimStaff => "dim_staff",
            TargetTable::DimCounterparty => "dim_counterparty",
            TargetTable::DimDate => "dim_date",
            TargetTable::FactSalesOrder => "fact_sales_order",
        }
    }

    /// Resolves a warehouse table name back to its target.
    pub fn from_name(name: &str) -> Option<TargetTable> {
        TargetTable::ALL
            .iter()
            .copied()
            .find(|target| target.name() == name)
    }

    /// Returns the declared column set, in column order.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            TargetTable::DimDesign => {
                &["design_id", "design_name", "file_location", "file_name"]
            }
            TargetTable::DimCurrency => &["currency_id", "currency_code", "currency_name"],
            TargetTable::DimLocation => &[
                "location_id",
                "address_line_1",
                "address_line_2",
                "district",
                "city",
                "postal_code",
                "country",
                "phone",
            ],
            TargetTable::DimStaff => &[
                "staff_id",
                "first_name",
                "last_name",
                "department_name",
                "location",
                "email_address",
            ],
            TargetTable::DimCounterparty => &[
                "counterparty_id",
                "counterparty_legal_name",
                "counterparty_legal_address_line_1",
                "counterparty_legal_address_line_2",
                "counterparty_legal_district",
                "counterparty_legal_city",
                "counterparty_legal_postal_code",
                "counterparty_legal_country",
                "counterparty_legal_phone_number",
            ],
            TargetTable::DimDate => &[
                "date_id",
                "year",
                "month",
                "day",
                "day_of_week",
                "day_name",
                "month_name",
                "quarter",
            ],
            TargetTable::FactSalesOrder => &[
                "sales_order_id",
                "created_date",
                "created_time",
                "last_updated_date",
                "last_updated_time",
                "sales_staff_id",
                "counterparty_id",
                "units_sold",
                "unit_price",
                "currency_id",
                "design_id",
                "agreed_payment_date",
                "agreed_delivery_date",
                "agreed_delivery_location_id",
            ],
        }
    }

    /// Returns the natural identifier column used for deterministic ordering.
    pub fn natural_key(&self) -> &'static str {
        match self {
            TargetTable::DimDesign => "design_id",
            TargetTable::DimCurrency => "currency_id",
            TargetTable::DimLocation => "location_id",
            TargetTable::DimStaff => "staff_id",
            TargetTable::DimCounterparty => "counterparty_id",
            TargetTable::DimDate => "date_id",
            TargetTable::FactSalesOrder => "sales_order_id",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for target in TargetTable::ALL {
            assert_eq!(TargetTable::from_name(target.name()), Some(*target));
        }
        assert_eq!(TargetTable::from_name("dim_unknown"), None);
    }

    #[test]
    fn natural_key_is_always_declared() {
        for target in TargetTable::ALL {
            assert!(target.columns().contains(&target.natural_key()));
        }
    }
}
