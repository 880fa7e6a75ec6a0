use thiserror::Error;

/// User input rejected before it reaches the store.
///
/// Messages are meant to be shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a {field}")]
    Required { field: String },

    #[error("Please enter a valid {field}")]
    InvalidNumber { field: String },

    #[error("Please enter a valid date in YYYY-MM-DD format")]
    InvalidDate,

    #[error("Unknown entry type '{0}'. Use 'food' or 'exercise'")]
    UnknownEntryType(String),

    #[error("Unknown theme '{0}'. Use 'light', 'dark' or 'system'")]
    UnknownTheme(String),
}
