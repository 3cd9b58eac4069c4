//! Credential retrieval for source and warehouse connections.
//!
//! Credentials are fetched once per run, before any extraction or transform
//! work; a retrieval failure aborts the run before any I/O against source or
//! sink.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use secrecy::SecretString;

use crate::error::{ErrorKind, StrataResult};
use crate::strata_error;

/// Connection parameters for one database, as returned by a secret provider.
#[derive(Debug, Clone)]
pub struct DbCredentials {
    pub user: String,
    pub password: SecretString,
    pub host: String,
    pub port: u16,
    pub database: String,
}

/// Trait for secret backends that resolve named database credentials.
pub trait CredentialProvider {
    /// Resolves credentials by secret name.
    ///
    /// An unknown name is a configuration error, not an expected-absence
    /// state: the run must abort before touching source or sink.
    fn get_credentials(
        &self,
        name: &str,
    ) -> impl Future<Output = StrataResult<DbCredentials>> + Send;
}

/// Credential provider over a fixed set of named entries, built from
/// configuration or seeded directly in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialProvider {
    entries: Arc<HashMap<String, DbCredentials>>,
}

impl StaticCredentialProvider {
    /// Creates a provider over a fixed set of named credentials.
    pub fn new(entries: HashMap<String, DbCredentials>) -> Self {
        Self {
            entries: Arc::new(entries),
        }
    }
}

impl CredentialProvider for StaticCredentialProvider {
    async fn get_credentials(&self, name: &str) -> StrataResult<DbCredentials> {
        self.entries.get(name).cloned().ok_or_else(|| {
            strata_error!(
                ErrorKind::ConfigError,
                "Credentials not available",
                name.to_string()
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_secret_name_is_a_config_error() {
        let provider = StaticCredentialProvider::default();

        let err = provider.get_credentials("missing").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigError);
    }

    #[tokio::test]
    async fn known_secret_resolves() {
        let mut entries = HashMap::new();
        entries.insert(
            "source".to_string(),
            DbCredentials {
                user: "loader".into(),
                password: SecretString::new("hunter2".into()),
                host: "localhost".into(),
                port: 5432,
                database: "totes".into(),
            },
        );
        let provider = StaticCredentialProvider::new(entries);

        let credentials = provider.get_credentials("source").await.unwrap();
        assert_eq!(credentials.database, "totes");
    }
}
