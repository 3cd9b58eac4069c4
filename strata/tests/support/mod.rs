//! Shared fixtures for pipeline integration tests.

use chrono::{NaiveDate, NaiveDateTime};

use strata::source::MemorySourceClient;
use strata::types::Cell;
use strata_config::shared::{
    DateDimensionConfig, PgConnectionConfig, PipelineConfig, StagingConfig, TlsConfig,
    default_source_tables,
};

pub fn timestamp(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, s)
        .unwrap()
}

pub fn text(value: &str) -> Cell {
    Cell::String(value.to_string())
}

fn connection() -> PgConnectionConfig {
    PgConnectionConfig {
        host: "localhost".to_string(),
        port: 5432,
        name: "unused".to_string(),
        username: "unused".to_string(),
        password: None,
        tls: TlsConfig::disabled(),
    }
}

pub fn pipeline_config() -> PipelineConfig {
    PipelineConfig {
        id: 1,
        source: connection(),
        warehouse: connection(),
        staging: StagingConfig {
            raw_bucket: "totes-extract".to_string(),
            transformed_bucket: "totes-transform".to_string(),
        },
        source_tables: default_source_tables(),
        date_dimension: DateDimensionConfig {
            default_start_date: "2022-01-01".to_string(),
            threshold_years: 10,
            extension_years: 15,
        },
    }
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// Seeds a source resembling the operational database: staff with a
/// department, a counterparty with a legal address, a currency, a design and
/// one sales order, all stamped at `stamp`.
pub async fn seed_source(source: &MemorySourceClient, stamp: NaiveDateTime) {
    let bookkeeping = [Cell::Timestamp(stamp), Cell::Timestamp(stamp)];

    source
        .set_table(
            "staff",
            columns(&[
                "staff_id",
                "first_name",
                "last_name",
                "department_id",
                "email_address",
                "created_at",
                "last_updated",
            ]),
            vec![
                vec![
                    Cell::I64(8),
                    text("Ozzy"),
                    text("Osbourne"),
                    Cell::I64(7),
                    text("ozzy.osbourne@terrifictotes.com"),
                    bookkeeping[0].clone(),
                    bookkeeping[1].clone(),
                ],
                // Department 99 does not exist: the transform keeps the row
                // with null department columns.
                vec![
                    Cell::I64(9),
                    text("Lebron"),
                    text("James"),
                    Cell::I64(99),
                    text("lebron.james@terrifictotes.com"),
                    bookkeeping[0].clone(),
                    bookkeeping[1].clone(),
                ],
            ],
        )
        .await;

    source
        .set_table(
            "department",
            columns(&[
                "department_id",
                "department_name",
                "location",
                "manager",
                "created_at",
                "last_updated",
            ]),
            vec![vec![
                Cell::I64(7),
                text("Facilities"),
                text("Manchester"),
                text("Shelley Levene"),
                bookkeeping[0].clone(),
                bookkeeping[1].clone(),
            ]],
        )
        .await;

    source
        .set_table(
            "currency",
            columns(&["currency_id", "currency_code", "created_at", "last_updated"]),
            vec![
                vec![
                    Cell::I64(1),
                    text("GBP"),
                    bookkeeping[0].clone(),
                    bookkeeping[1].clone(),
                ],
                vec![
                    Cell::I64(2),
                    text("XYZ"),
                    bookkeeping[0].clone(),
                    bookkeeping[1].clone(),
                ],
            ],
        )
        .await;

    source
        .set_table(
            "design",
            columns(&[
                "design_id",
                "design_name",
                "file_location",
                "file_name",
                "created_at",
                "last_updated",
            ]),
            vec![vec![
                Cell::I64(8),
                text("Wooden"),
                text("/usr"),
                text("wooden-20220717-npgz.json"),
                bookkeeping[0].clone(),
                bookkeeping[1].clone(),
            ]],
        )
        .await;

    source
        .set_table(
            "address",
            columns(&[
                "address_id",
                "address_line_1",
                "address_line_2",
                "district",
                "city",
                "postal_code",
                "country",
                "phone",
                "created_at",
                "last_updated",
            ]),
            vec![vec![
                Cell::I64(2),
                text("179 Alexie Cliffs"),
                Cell::Null,
                Cell::Null,
                text("Aliso Viejo"),
                text("99305-7380"),
                text("San Marino"),
                text("9621 880720"),
                bookkeeping[0].clone(),
                bookkeeping[1].clone(),
            ]],
        )
        .await;

    source
        .set_table(
            "counterparty",
            columns(&[
                "counterparty_id",
                "counterparty_legal_name",
                "legal_address_id",
                "created_at",
                "last_updated",
            ]),
            vec![vec![
                Cell::I64(1),
                text("Fahey and Sons"),
                Cell::I64(2),
                bookkeeping[0].clone(),
                bookkeeping[1].clone(),
            ]],
        )
        .await;

    source
        .set_table(
            "sales_order",
            columns(&[
                "sales_order_id",
                "created_at",
                "last_updated",
                "design_id",
                "staff_id",
                "counterparty_id",
                "units_sold",
                "unit_price",
                "currency_id",
                "agreed_delivery_date",
                "agreed_payment_date",
                "agreed_delivery_location_id",
            ]),
            vec![vec![
                Cell::I64(2),
                Cell::Timestamp(stamp),
                Cell::Timestamp(stamp),
                Cell::I64(8),
                Cell::I64(8),
                Cell::I64(1),
                Cell::I64(42972),
                Cell::F64(3.94),
                Cell::I64(1),
                text("2022-11-07"),
                text("2022-11-08"),
                Cell::I64(2),
            ]],
        )
        .await;
}
