//! Series error types.

/// Errors raised by series construction and arithmetic.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeriesError {
    /// A combination was requested over zero series.
    #[error("cannot combine an empty list of series")]
    EmptySeries,

    /// A water year start month outside 1..=12.
    #[error("invalid water year start month {month}")]
    InvalidMonth { month: u32 },

    /// A running average window of zero years.
    #[error("running average window must be at least one year")]
    InvalidWindow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_month_display() {
        let err = SeriesError::InvalidMonth { month: 13 };
        assert!(format!("{}", err).contains("month 13"));
    }

    #[test]
    fn test_empty_series_display() {
        let msg = format!("{}", SeriesError::EmptySeries);
        assert!(msg.contains("empty list"));
    }
}
