//! The module contains the errors the engine can return.
//!
//! The errors are:
//!
//! - [`Validation`] a required field is missing, negative, too large or an
//!   identifying text is empty. Raised before anything reaches the store.
//! - [`NotFound`] a pour or catalog entry id is not known.
//! - [`Transport`] the persistence collaborator failed or answered with
//!   something that could not be decoded. No local state changes.
//! - [`AuthExpired`] the collaborator rejected the session credential
//!   (`401`/`403`). Never retried.
//! - [`Render`] a receipt backend could not produce its file.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`NotFound`]: EngineError::NotFound
//!  [`Transport`]: EngineError::Transport
//!  [`AuthExpired`]: EngineError::AuthExpired
//!  [`Render`]: EngineError::Render
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Transport failure: {0}")]
    Transport(String),
    #[error("Session expired")]
    AuthExpired,
    #[error("Cannot render receipt: {0}")]
    Render(String),
}

impl EngineError {
    /// `true` when the caller should tear down the session.
    #[must_use]
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired)
    }
}
