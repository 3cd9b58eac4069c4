use std::backtrace::Backtrace;
use std::error::Error;
use std::fmt;

use strata::error::StrataError;

/// Returns whether terminal output should include backtraces.
fn should_render_backtrace() -> bool {
    matches!(
        std::env::var("RUST_BACKTRACE").as_deref(),
        Ok("1") | Ok("full")
    )
}

/// Result type for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Error type for the runner binary.
///
/// Wraps [`StrataError`] for pipeline errors and provides variants for
/// infrastructure errors around it.
#[derive(Debug)]
pub enum RunnerError {
    /// Pipeline error.
    Strata(StrataError),
    /// Configuration error.
    Config(Box<dyn Error + Send + Sync>),
    /// I/O error reading or writing a manifest.
    Io(std::io::Error),
    /// A manifest file could not be parsed.
    Manifest(serde_json::Error),
}

impl RunnerError {
    /// Returns a short category label for this error.
    pub fn category(&self) -> &'static str {
        match self {
            RunnerError::Strata(_) => "pipeline error",
            RunnerError::Config(_) => "configuration error",
            RunnerError::Io(_) => "i/o error",
            RunnerError::Manifest(_) => "manifest error",
        }
    }

    /// Creates a configuration error from any boxed source.
    pub fn config<E: Error + Send + Sync + 'static>(err: E) -> Self {
        RunnerError::Config(Box::new(err))
    }

    /// Returns a user-oriented report for terminal output.
    pub fn render_report(&self) -> String {
        let mut out = String::new();
        out.push_str("run failed\n");
        out.push_str(&format!("category: {}\n", self.category()));
        out.push_str(&format!("error: {self}\n"));

        let mut source = Error::source(self);
        let mut idx = 1usize;
        while let Some(err) = source {
            out.push_str(&format!("cause {idx}: {err}\n"));
            source = err.source();
            idx += 1;
        }

        if should_render_backtrace()
            && let RunnerError::Strata(err) = self
        {
            out.push_str("backtrace:\n");
            out.push_str(&format!("{}\n", err.backtrace()));
        }

        out
    }
}

impl fmt::Display for RunnerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunnerError::Strata(err) => write!(f, "{err}"),
            RunnerError::Config(source) => write!(f, "configuration error: {source}"),
            RunnerError::Io(source) => write!(f, "i/o error: {source}"),
            RunnerError::Manifest(source) => write!(f, "manifest error: {source}"),
        }
    }
}

impl Error for RunnerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RunnerError::Strata(err) => err.source(),
            RunnerError::Config(source) => Some(source.as_ref()),
            RunnerError::Io(source) => Some(source),
            RunnerError::Manifest(source) => Some(source),
        }
    }
}

impl From<StrataError> for RunnerError {
    fn from(err: StrataError) -> Self {
        RunnerError::Strata(err)
    }
}

impl From<std::io::Error> for RunnerError {
    fn from(err: std::io::Error) -> Self {
        RunnerError::Io(err)
    }
}

impl From<serde_json::Error> for RunnerError {
    fn from(err: serde_json::Error) -> Self {
        RunnerError::Manifest(err)
    }
}
