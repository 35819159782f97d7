//! Core error type.
//!
//! Sub-crates define their own error enums and either wrap `CoreError` as a
//! variant or convert via `From`.  Configuration errors are the only fatal
//! class in this system, and they can only occur before the loop starts.

use thiserror::Error;

/// Errors raised by `uam-core` itself — today only configuration rejection.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `uam-core` APIs.
pub type CoreResult<T> = Result<T, CoreError>;
