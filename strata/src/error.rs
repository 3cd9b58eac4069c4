//! Error types and result definitions for pipeline operations.
//!
//! Provides an error system with classification and captured diagnostic
//! metadata. The [`StrataError`] type carries an [`ErrorKind`], the callsite
//! location, an optional detail string and an optional source error.

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::error;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Convenient result type for pipeline operations using [`StrataError`] as the error type.
pub type StrataResult<T> = Result<T, StrataError>;

/// Detailed payload stored for [`StrataError`] instances.
#[derive(Debug, Clone)]
struct ErrorPayload {
    kind: ErrorKind,
    description: Cow<'static, str>,
    detail: Option<Cow<'static, str>>,
    source: Option<Arc<dyn error::Error + Send + Sync>>,
    location: &'static Location<'static>,
    backtrace: Arc<Backtrace>,
}

/// Main error type for pipeline operations.
#[derive(Debug, Clone)]
pub struct StrataError {
    payload: ErrorPayload,
}

/// Specific categories of errors that can occur during pipeline operations.
///
/// Error kinds are organized by functional area and failure mode. Expected
/// absence (missing watermark, missing staged object, missing date range) is
/// never an error kind; those are `Option`-typed results at the call sites.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    // Connection Errors
    SourceConnectionFailed,
    DestinationConnectionFailed,

    // Query & Execution Errors
    SourceQueryFailed,
    DestinationQueryFailed,

    // Schema & Mapping Errors
    SourceSchemaError,
    MissingTableSchema,

    // Data & Transformation Errors
    ConversionError,
    InvalidData,
    ValidationError,

    // Configuration Errors
    ConfigError,

    // IO & Serialization Errors
    IoError,
    StorageError,
    SerializationError,
    DeserializationError,

    // State & Workflow Errors
    InvalidState,

    // Unknown / Uncategorized
    Unknown,
}

impl StrataError {
    /// Returns the [`ErrorKind`] of this error.
    pub fn kind(&self) -> ErrorKind {
        self.payload.kind
    }

    /// Returns the detailed error information if available.
    pub fn detail(&self) -> Option<&str> {
        self.payload.detail.as_deref()
    }

    /// Returns the captured backtrace for this error.
    pub fn backtrace(&self) -> &Backtrace {
        self.payload.backtrace.as_ref()
    }

    /// Returns the captured callsite location for this error.
    pub fn location(&self) -> &'static Location<'static> {
        self.payload.location
    }

    /// Attaches an originating [`error::Error`] to this error and returns the modified instance.
    ///
    /// The stored source is preserved across clones and exposed via [`error::Error::source`].
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: error::Error + Send + Sync + 'static,
    {
        self.payload.source = Some(Arc::new(source));
        self
    }

    /// Creates a [`StrataError`] from its components.
    #[track_caller]
    fn from_components(
        kind: ErrorKind,
        description: Cow<'static, str>,
        detail: Option<Cow<'static, str>>,
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    ) -> Self {
        let location = Location::caller();
        let backtrace = Arc::new(Backtrace::capture());

        StrataError {
            payload: ErrorPayload {
                kind,
                description,
                detail,
                source,
                location,
                backtrace,
            },
        }
    }
}

impl PartialEq for StrataError {
    fn eq(&self, other: &StrataError) -> bool {
        self.payload.kind == other.payload.kind
    }
}

impl fmt::Display for StrataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let location = self.payload.location;
        write!(
            f,
            "[{:?}] {} @ {}:{}:{}",
            self.payload.kind,
            self.payload.description,
            location.file(),
            location.line(),
            location.column()
        )?;

        if let Some(detail) = self.payload.detail.as_deref() {
            write!(f, "\n  Detail: {detail}")?;
        }

        Ok(())
    }
}

impl error::Error for StrataError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.payload
            .source
            .as_ref()
            .map(|source| source as &(dyn error::Error + 'static))
    }
}

/// Creates a [`StrataError`] from an error kind and static description.
impl From<(ErrorKind, &'static str)> for StrataError {
    #[track_caller]
    fn from((kind, desc): (ErrorKind, &'static str)) -> StrataError {
        StrataError::from_components(kind, Cow::Borrowed(desc), None, None)
    }
}

/// Creates a [`StrataError`] from an error kind, static description, and dynamic detail.
impl<D> From<(ErrorKind, &'static str, D)> for StrataError
where
    D: Into<Cow<'static, str>>,
{
    #[track_caller]
    fn from((kind, desc, detail): (ErrorKind, &'static str, D)) -> StrataError {
        StrataError::from_components(kind, Cow::Borrowed(desc), Some(detail.into()), None)
    }
}

/// Converts [`std::io::Error`] to [`StrataError`] with [`ErrorKind::IoError`].
impl From<std::io::Error> for StrataError {
    #[track_caller]
    fn from(err: std::io::Error) -> StrataError {
        let detail = err.to_string();
        let source = Arc::new(err);
        StrataError::from_components(
            ErrorKind::IoError,
            Cow::Borrowed("I/O operation failed"),
            Some(Cow::Owned(detail)),
            Some(source),
        )
    }
}

/// Converts [`serde_json::Error`] to [`StrataError`] with the appropriate error kind.
///
/// Maps to [`ErrorKind::SerializationError`] for serialization failures and
/// [`ErrorKind::DeserializationError`] for deserialization failures based on
/// error classification.
impl From<serde_json::Error> for StrataError {
    #[track_caller]
    fn from(err: serde_json::Error) -> StrataError {
        let (kind, description) = match err.classify() {
            serde_json::error::Category::Io => (ErrorKind::IoError, "JSON I/O operation failed"),
            serde_json::error::Category::Syntax
            | serde_json::error::Category::Data
            | serde_json::error::Category::Eof => (
                ErrorKind::DeserializationError,
                "JSON deserialization failed",
            ),
        };

        let detail = err.to_string();
        let source = Arc::new(err);
        StrataError::from_components(
            kind,
            Cow::Borrowed(description),
            Some(Cow::Owned(detail)),
            Some(source),
        )
    }
}

/// Converts [`chrono::ParseError`] to [`StrataError`] with [`ErrorKind::ConversionError`].
impl From<chrono::ParseError> for StrataError {
    #[track_caller]
    fn from(err: chrono::ParseError) -> StrataError {
        let detail = err.to_string();
        let source = Arc::new(err);
        StrataError::from_components(
            ErrorKind::ConversionError,
            Cow::Borrowed("Datetime parsing failed"),
            Some(Cow::Owned(detail)),
            Some(source),
        )
    }
}

/// Converts [`sqlx::Error`] to [`StrataError`] with the appropriate error kind.
///
/// Maps database errors to [`ErrorKind::SourceQueryFailed`], I/O errors to
/// [`ErrorKind::IoError`], and connection pool errors to
/// [`ErrorKind::SourceConnectionFailed`].
impl From<sqlx::Error> for StrataError {
    #[track_caller]
    fn from(err: sqlx::Error) -> StrataError {
        let kind = match &err {
            sqlx::Error::Database(_) => ErrorKind::SourceQueryFailed,
            sqlx::Error::Io(_) => ErrorKind::IoError,
            sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => {
                ErrorKind::SourceConnectionFailed
            }
            sqlx::Error::ColumnNotFound(_) => ErrorKind::SourceSchemaError,
            _ => ErrorKind::SourceQueryFailed,
        };

        let detail = err.to_string();
        let source = Arc::new(err);
        StrataError::from_components(
            kind,
            Cow::Borrowed("Database operation failed"),
            Some(Cow::Owned(detail)),
            Some(source),
        )
    }
}

/// Converts [`arrow::error::ArrowError`] to [`StrataError`] with [`ErrorKind::SerializationError`].
impl From<arrow::error::ArrowError> for StrataError {
    #[track_caller]
    fn from(err: arrow::error::ArrowError) -> StrataError {
        let detail = err.to_string();
        let source = Arc::new(err);
        StrataError::from_components(
            ErrorKind::SerializationError,
            Cow::Borrowed("Arrow conversion failed"),
            Some(Cow::Owned(detail)),
            Some(source),
        )
    }
}

/// Converts [`parquet::errors::ParquetError`] to [`StrataError`] with [`ErrorKind::SerializationError`].
impl From<parquet::errors::ParquetError> for StrataError {
    #[track_caller]
    fn from(err: parquet::errors::ParquetError) -> StrataError {
        let detail = err.to_string();
        let source = Arc::new(err);
        StrataError::from_components(
            ErrorKind::SerializationError,
            Cow::Borrowed("Parquet encoding failed"),
            Some(Cow::Owned(detail)),
            Some(source),
        )
    }
}
