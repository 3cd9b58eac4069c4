use std::collections::HashMap;

use secrecy::SecretString;
use serde::Deserialize;

use strata::secrets::{DbCredentials, StaticCredentialProvider};
use strata_config::Config;
use strata_config::shared::{PgConnectionConfig, PipelineConfig};

use crate::error::{RunnerError, RunnerResult};

/// Secret name under which the source connection is resolved.
pub const SOURCE_CREDENTIALS: &str = "source_database_credentials";

/// Secret name under which the warehouse connection is resolved.
pub const WAREHOUSE_CREDENTIALS: &str = "warehouse_database_credentials";

/// Top-level configuration for the runner binary.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerConfig {
    /// Core pipeline settings.
    pub pipeline: PipelineConfig,
    /// Root directory backing the filesystem object store.
    pub storage_root: String,
}

impl Config for RunnerConfig {
    const LIST_PARSE_KEYS: &'static [&'static str] = &["pipeline.source_tables"];
}

/// Loads and validates the runner configuration.
pub fn load_runner_config() -> RunnerResult<RunnerConfig> {
    let config = strata_config::load_config::<RunnerConfig>().map_err(RunnerError::config)?;
    config.pipeline.validate().map_err(RunnerError::config)?;

    Ok(config)
}

/// Builds the credential provider holding the run's named connections.
///
/// The provider is queried once per run, before any extraction or transform
/// work; a missing entry aborts the run there.
pub fn credential_provider(config: &RunnerConfig) -> StaticCredentialProvider {
    let mut entries = HashMap::new();
    entries.insert(
        SOURCE_CREDENTIALS.to_string(),
        credentials_from_connection(&config.pipeline.source),
    );
    entries.insert(
        WAREHOUSE_CREDENTIALS.to_string(),
        credentials_from_connection(&config.pipeline.warehouse),
    );

    StaticCredentialProvider::new(entries)
}

/// Rebuilds a connection config from resolved credentials, carrying over the
/// TLS block from the template the entry was derived from.
pub fn connection_from_credentials(
    credentials: DbCredentials,
    template: &PgConnectionConfig,
) -> PgConnectionConfig {
    PgConnectionConfig {
        host: credentials.host,
        port: credentials.port,
        name: credentials.database,
        username: credentials.user,
        password: Some(credentials.password),
        tls: template.tls.clone(),
    }
}

fn credentials_from_connection(connection: &PgConnectionConfig) -> DbCredentials {
    DbCredentials {
        user: connection.username.clone(),
        password: connection
            .password
            .clone()
            .unwrap_or_else(|| SecretString::new(String::new())),
        host: connection.host.clone(),
        port: connection.port,
        database: connection.name.clone(),
    }
}
