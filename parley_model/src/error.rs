use thiserror::Error;

/// Errors from the opponent model. All of these are advisory: a consumer that
/// hits one should fall back to the previous (or initial uniform) estimates
/// and keep negotiating rather than abort the session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("window of length {window} does not fit the history ending at index {end}")]
    InsufficientHistory { window: usize, end: usize },

    #[error("issue index {0} out of range")]
    IssueOutOfRange(usize),

    #[error("value index {value} out of range for issue {issue}")]
    ValueOutOfRange { issue: usize, value: usize },

    #[error("bid carries {got} values but the domain has {expected} issues")]
    ArityMismatch { expected: usize, got: usize },

    #[error("domain has no issues, or an issue with no values")]
    EmptyDomain,
}
