use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("utility space shape does not match the domain: {0}")]
    ShapeMismatch(String),
}
