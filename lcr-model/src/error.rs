//! Model error types.

use lcr_series::SeriesError;

/// Configuration and lookup failures in the lake/reach/state graph.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// A lake was referenced before it was built, or never built.
    #[error("lake '{name}' not found")]
    LakeNotFound { name: String },

    /// A reach named by a roster does not exist in this configuration.
    #[error("reach '{name}' not found")]
    ReachNotFound { name: String },

    /// No state registered under this abbreviation.
    #[error("state '{code}' not found")]
    StateNotFound { code: String },

    /// No user with this exact name in the state.
    #[error("user '{name}' not found in state '{state}'")]
    UserNotFound { name: String, state: String },

    /// `run` or `summary` called before `initialize`.
    #[error("model '{name}' has not been initialized")]
    NotInitialized { name: String },

    /// `summary` or `print` called before any `run`.
    #[error("model '{name}' has not been run")]
    NotRun { name: String },

    /// `year_begin` after `year_end`.
    #[error("invalid year range {year_begin}..={year_end}")]
    InvalidYearRange { year_begin: i32, year_end: i32 },

    #[error(transparent)]
    Series(#[from] SeriesError),
}
