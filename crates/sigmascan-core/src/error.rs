use thiserror::Error;

/// Validation and contract errors exposed by `sigmascan-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid quantity kind '{value}', expected one of adj_close, volume")]
    InvalidQuantityKind { value: String },
    #[error("invalid source '{value}', expected one of yahoo, offline")]
    InvalidSource { value: String },
    #[error(
        "invalid heatmap pane '{value}', expected one of volume-volume, adjclose-adjclose, adjclose-volume"
    )]
    InvalidHeatmapPane { value: String },

    #[error("date must be ISO calendar form YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
    #[error("date range end {end} precedes start {start}")]
    InvalidDateRange { start: String, end: String },

    #[error("sensitivity {value} outside supported range [{min}, {max}]")]
    SensitivityOutOfRange { value: f64, min: f64, max: f64 },

    #[error("selection must contain at least one symbol")]
    EmptySelection,

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("observations must be strictly ordered by date: {date} repeats or regresses")]
    UnorderedObservations { date: String },

    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("schema_version must match vMAJOR.MINOR.PATCH: '{value}'")]
    InvalidSchemaVersion { value: String },
    #[error("source_chain must contain at least one source")]
    EmptySourceChain,

    #[error("error code cannot be empty")]
    EmptyErrorCode,
    #[error("error message cannot be empty")]
    EmptyErrorMessage,
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
