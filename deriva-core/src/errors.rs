//! Error taxonomy shared by the whole workspace.

/// Errors raised while constructing graphs or expressions, or while
/// validating an expression against a graph. All are fatal for the single
/// call that raised them and never affect later calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DerivaError {
    #[error("cycle detected in causal graph: {path}")]
    InvalidGraph { path: String },

    #[error("unknown variable `{name}` in {context}")]
    UnknownVariable { name: String, context: String },

    #[error("invalid expression: {reason}")]
    InvalidExpression { reason: String },
}

pub type DerivaResult<T> = Result<T, DerivaError>;
