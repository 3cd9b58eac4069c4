use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions as SqlxConnectOptions, PgSslMode as SqlxSslMode};
use thiserror::Error;

/// Validation failures for connection configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// TLS was enabled without any trusted root certificates.
    #[error("TLS is enabled but no trusted root certificates were provided")]
    MissingTrustedRootCerts,

    /// The host field was left empty.
    #[error("connection host must not be empty")]
    EmptyHost,

    /// The database name field was left empty.
    #[error("connection database name must not be empty")]
    EmptyDatabaseName,
}

/// Connection settings for a Postgres database.
///
/// This intentionally does not implement [`serde::Serialize`] to avoid
/// accidentally leaking the password into serialized forms.
#[derive(Debug, Clone, Deserialize)]
pub struct PgConnectionConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub username: String,
    pub password: Option<SecretString>,
    pub tls: TlsConfig,
}

impl PgConnectionConfig {
    /// Validates the connection settings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.host.is_empty() {
            return Err(ValidationError::EmptyHost);
        }

        if self.name.is_empty() {
            return Err(ValidationError::EmptyDatabaseName);
        }

        self.tls.validate()
    }
}

/// TLS settings for database connections.
#[derive(Debug, Clone, Deserialize)]
pub struct TlsConfig {
    pub trusted_root_certs: String,
    pub enabled: bool,
}

impl TlsConfig {
    pub fn disabled() -> Self {
        Self {
            trusted_root_certs: "".to_string(),
            enabled: false,
        }
    }

    /// Validates the TLS settings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.enabled && self.trusted_root_certs.is_empty() {
            return Err(ValidationError::MissingTrustedRootCerts);
        }

        Ok(())
    }
}

/// Conversion from connection configuration into driver connect options.
pub trait IntoConnectOptions<Output> {
    fn without_db(&self) -> Output;
    fn with_db(&self) -> Output;
}

impl IntoConnectOptions<SqlxConnectOptions> for PgConnectionConfig {
    fn without_db(&self) -> SqlxConnectOptions {
        let ssl_mode = if self.tls.enabled {
            SqlxSslMode::VerifyFull
        } else {
            SqlxSslMode::Prefer
        };
        let mut connect_options = SqlxConnectOptions::new_without_pgpass()
            .host(&self.host)
            .username(&self.username)
            .port(self.port)
            .ssl_mode(ssl_mode)
            .ssl_root_cert_from_pem(self.tls.trusted_root_certs.clone().into_bytes());

        if let Some(password) = &self.password {
            connect_options = connect_options.password(password.expose_secret());
        }

        connect_options
    }

    fn with_db(&self) -> SqlxConnectOptions {
        let connect_options: SqlxConnectOptions = self.without_db();
        connect_options.database(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PgConnectionConfig {
        PgConnectionConfig {
            host: "localhost".to_string(),
            port: 5432,
            name: "totes".to_string(),
            username: "loader".to_string(),
            password: None,
            tls: TlsConfig::disabled(),
        }
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn empty_host_fails_validation() {
        let mut config = config();
        config.host.clear();

        assert!(matches!(
            config.validate(),
            Err(ValidationError::EmptyHost)
        ));
    }

    #[test]
    fn tls_without_certs_fails_validation() {
        let mut config = config();
        config.tls.enabled = true;

        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingTrustedRootCerts)
        ));
    }
}
