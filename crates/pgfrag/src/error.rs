//! Error types for pgfrag

use thiserror::Error;

/// Result type alias for pgfrag operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Error types for query composition and execution
#[derive(Debug, Error)]
pub enum QueryError {
    /// The fragment tree could not be safely or unambiguously flattened
    #[error("Composition error: {0}")]
    Composition(String),

    /// A contract requiring at least one row received zero
    #[error("Not found: {0}")]
    NotFound(String),

    /// A contract received more rows or columns than it can represent
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    /// Driver-level failure, passed through from `tokio-postgres`
    #[error("Query error: {0}")]
    Db(#[from] tokio_postgres::Error),

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// Column decode/extraction error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Value serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl QueryError {
    /// Create a composition error
    pub fn composition(message: impl Into<String>) -> Self {
        Self::Composition(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a data integrity error
    pub fn data_integrity(message: impl Into<String>) -> Self {
        Self::DataIntegrity(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this is a composition error
    pub fn is_composition(&self) -> bool {
        matches!(self, Self::Composition(_))
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a data integrity error
    pub fn is_data_integrity(&self) -> bool {
        matches!(self, Self::DataIntegrity(_))
    }

    /// Whether this error originated below the composition/contract layer,
    /// i.e. in the driver or the database itself.
    pub fn is_driver_error(&self) -> bool {
        matches!(
            self,
            Self::Db(_)
                | Self::UniqueViolation(_)
                | Self::ForeignKeyViolation(_)
                | Self::CheckViolation(_)
        )
    }

    /// Parse a tokio_postgres error into a more specific QueryError.
    ///
    /// Constraint violations keep their driver origin; they are never folded
    /// into the composition/contract variants.
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            let message = db_err.message();

            match db_err.code().code() {
                "23505" => return Self::UniqueViolation(format!("{}: {}", constraint, message)),
                "23503" => {
                    return Self::ForeignKeyViolation(format!("{}: {}", constraint, message));
                }
                "23514" => return Self::CheckViolation(format!("{}: {}", constraint, message)),
                _ => {}
            }
        }
        Self::Db(err)
    }
}
