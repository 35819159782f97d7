//! Error type for the control loop.
//!
//! Only two classes of failure are fatal: a rejected configuration (before
//! the loop) and a failed engine step (the connection is gone).  Everything
//! else — missing agents, failed dispatches, sink errors — is absorbed
//! locally and never surfaces here.

use thiserror::Error;

use uam_core::CoreError;
use uam_engine::EngineError;

#[derive(Debug, Error)]
pub enum ControlError {
    #[error(transparent)]
    Config(#[from] CoreError),

    #[error("engine failure: {0}")]
    Engine(#[from] EngineError),
}

pub type ControlResult<T> = Result<T, ControlError>;
