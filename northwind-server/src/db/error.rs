//! Database error type

/// Errors from the database layer
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    /// A single-row read saw no rows
    #[error("expected exactly one row, got none")]
    NoRows,

    /// A single-row read saw more than one row
    #[error("expected exactly one row, got {rows}")]
    Ambiguous { rows: usize },

    /// Parameter could not be rendered into the batch text
    #[error("cannot bind parameter: {reason}")]
    Bind { reason: String },

    /// All result sets of a batch were already read
    #[error("no more result sets (batch returned {sets})")]
    Consumed { sets: usize },

    /// Joined row has no column to split parent from child on
    #[error("split column '{column}' not found in joined row")]
    SplitColumn { column: &'static str },
}

impl DbError {
    pub fn bind(reason: impl Into<String>) -> Self {
        Self::Bind {
            reason: reason.into(),
        }
    }
}
