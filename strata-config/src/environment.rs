use std::fmt;
use std::io;

/// Environment variable that selects the runtime environment.
const ENVIRONMENT_ENV_NAME: &str = "APP_ENVIRONMENT";

/// Runtime environment the pipeline is deployed in.
///
/// Selects which environment-specific configuration overlay is loaded on
/// top of the base configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    /// Loads the environment from `APP_ENVIRONMENT`, defaulting to dev when
    /// the variable is unset.
    pub fn load() -> Result<Self, io::Error> {
        match std::env::var(ENVIRONMENT_ENV_NAME) {
            Ok(value) => value.parse().map_err(|unknown| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("unknown environment `{unknown}`; expected dev, staging or prod"),
                )
            }),
            Err(std::env::VarError::NotPresent) => Ok(Environment::Dev),
            Err(err) => Err(io::Error::new(io::ErrorKind::InvalidInput, err)),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Dev),
            "staging" => Ok(Environment::Staging),
            "prod" | "production" => Ok(Environment::Prod),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Dev => f.write_str("dev"),
            Environment::Staging => f.write_str("staging"),
            Environment::Prod => f.write_str("prod"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_environments() {
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Dev);
        assert_eq!(
            "production".parse::<Environment>().unwrap(),
            Environment::Prod
        );
        assert!("qa".parse::<Environment>().is_err());
    }
}
