use thiserror::Error;

/// An operation referenced a session identifier the store has never seen.
///
/// On `/agent/action` this is converted into a silent re-initialization; on
/// destroy/end it is logged and treated as a no-op.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown session {id:?}")]
pub struct UnknownSessionError {
    pub id: String,
}

impl UnknownSessionError {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}
