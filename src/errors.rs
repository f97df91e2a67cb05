use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Structured failure taxonomy for the analytics engine.
///
/// Every variant carries the identifier it relates to, so callers can log or
/// surface the offending item without parsing message strings. Aggregate
/// operations (clustering, optimization, pairwise correlation) treat
/// `NotFound` and `UpstreamUnavailable` as skip-and-continue; `InvalidInput`
/// and `InsufficientData` are returned to the caller of the single-item
/// operation that hit them.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// A statistic is mathematically undefined for the given input size.
    /// Short-but-defined inputs return neutral values instead of this.
    #[error("insufficient data for {operation}: need at least {needed} points, got {got}")]
    InsufficientData {
        operation: &'static str,
        needed: usize,
        got: usize,
    },

    /// Unknown material id.
    #[error("material not found: {id}")]
    NotFound { id: String },

    /// A repository lookup failed or timed out (after one retry).
    #[error("upstream lookup failed for {id}: {reason}")]
    UpstreamUnavailable { id: String, reason: String },

    /// The input itself is malformed (negative price, unsorted series).
    #[error("invalid input for {id}: {reason}")]
    InvalidInput { id: String, reason: String },
}

impl AnalyticsError {
    pub fn upstream(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            id: id.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
