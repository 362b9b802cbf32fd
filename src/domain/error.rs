use thiserror::Error;

/// Errors produced by the membership domain
///
/// Every variant names the precondition or invariant that blocked the
/// operation, so callers get a description rather than a stack trace.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// The referenced entity (project, profile, role, task, ...) does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// A precondition was violated (already employed, no vacancy, duplicate claim, ...)
    #[error("{0}")]
    Conflict(String),

    /// The caller is not allowed to perform the operation (not owner, not assignee)
    #[error("{0}")]
    Unauthorized(String),

    /// A multi-document transaction could not be committed; nothing was persisted
    #[error("transaction aborted: {0}")]
    TransactionAborted(String),
}

impl DomainError {
    /// Creates a NotFound error for the given entity name
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Creates a Conflict error with the violated precondition
    pub fn conflict(why: impl Into<String>) -> Self {
        Self::Conflict(why.into())
    }

    /// Creates an Unauthorized error
    pub fn unauthorized(why: impl Into<String>) -> Self {
        Self::Unauthorized(why.into())
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
