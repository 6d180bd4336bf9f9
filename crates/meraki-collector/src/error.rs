//! Error types for the collection library.

use thiserror::Error;

/// Main error type for collection operations.
///
/// Every variant is fatal to the run: the collector has no retry policy and
/// no partial-success semantics, so the first error at any depth of the
/// traversal unwinds the whole collection.
#[derive(Error, Debug)]
pub enum CollectError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source API transport or API-level error during entity listing.
    #[error("Source API error: {0}")]
    Source(String),

    /// Push service transport error outside a specific table operation.
    #[error("Push service error: {0}")]
    Push(String),

    /// Table existence check or creation failed.
    #[error("Failed to register table {table}: {message}")]
    Register { table: String, message: String },

    /// A resolver yielded an error while listing entities for a table.
    #[error("Failed to resolve entities for table {table}: {message}")]
    Resolve { table: String, message: String },

    /// A live value could not be represented under its column's inferred type.
    #[error("Failed to encode record for table {table}: {message}")]
    Encode { table: String, message: String },

    /// Upserting the accumulated records for a table failed.
    #[error("Failed to upsert {count} records for table {table}: {message}")]
    Upsert {
        table: String,
        count: usize,
        message: String,
    },

    /// Collection was cancelled (SIGINT, caller deadline, etc.)
    #[error("Collection cancelled")]
    Cancelled,

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CollectError {
    /// Create a Register error for a table.
    pub fn register(table: impl Into<String>, message: impl ToString) -> Self {
        CollectError::Register {
            table: table.into(),
            message: message.to_string(),
        }
    }

    /// Create a Resolve error for a table.
    pub fn resolve(table: impl Into<String>, message: impl ToString) -> Self {
        CollectError::Resolve {
            table: table.into(),
            message: message.to_string(),
        }
    }

    /// Create an Encode error for a table.
    pub fn encode(table: impl Into<String>, message: impl ToString) -> Self {
        CollectError::Encode {
            table: table.into(),
            message: message.to_string(),
        }
    }

    /// Create an Upsert error for a table.
    pub fn upsert(table: impl Into<String>, count: usize, message: impl ToString) -> Self {
        CollectError::Upsert {
            table: table.into(),
            count,
            message: message.to_string(),
        }
    }

    /// Format error with full details including error chain.
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }

    /// Process exit code for the CLI, keyed by error class.
    pub fn exit_code(&self) -> u8 {
        match self {
            CollectError::Config(_) | CollectError::Yaml(_) => 2,
            CollectError::Source(_) | CollectError::Resolve { .. } => 3,
            CollectError::Push(_) | CollectError::Register { .. } => 4,
            CollectError::Encode { .. } | CollectError::Json(_) => 5,
            CollectError::Upsert { .. } => 6,
            CollectError::Cancelled => 130,
            CollectError::Io(_) => 1,
        }
    }
}

/// Result type alias for collection operations.
pub type Result<T> = std::result::Result<T, CollectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_error_names_table() {
        let err = CollectError::register("meraki_devices", "boom");
        assert_eq!(
            err.to_string(),
            "Failed to register table meraki_devices: boom"
        );
    }

    #[test]
    fn test_upsert_error_carries_count() {
        let err = CollectError::upsert("meraki_networks", 12, "service unavailable");
        assert!(err.to_string().contains("12 records"));
        assert_eq!(err.exit_code(), 6);
    }

    #[test]
    fn test_cancelled_exit_code() {
        assert_eq!(CollectError::Cancelled.exit_code(), 130);
    }
}
