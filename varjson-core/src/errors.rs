use thiserror::Error;

/// Error type for varjson-core operations.
///
/// Record assembly itself never fails: malformed sub-fields are dropped.
/// These variants cover the preconditions checked before a batch starts.
#[derive(Error, Debug)]
pub enum VarJsonError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A severity table line that is not `term<TAB>rank`.
    #[error("Malformed severity table line {line}: {content:?}")]
    SeverityTableLine { line: usize, content: String },

    #[error("Severity table is empty; at least one consequence term must be ranked")]
    EmptySeverityTable,

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Result type alias for varjson-core operations.
pub type Result<T> = std::result::Result<T, VarJsonError>;
