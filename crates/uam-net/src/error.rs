//! Error types for uam-net.

use thiserror::Error;

use uam_core::{EdgeId, VehicleClass};

#[derive(Debug, Error)]
pub enum NetError {
    #[error("no {class} route from {from} to {to}")]
    NoRoute {
        from:  EdgeId,
        to:    EdgeId,
        class: VehicleClass,
    },

    #[error("edge {edge} admits no lane for class {class}")]
    ClassForbidden {
        edge:  EdgeId,
        class: VehicleClass,
    },
}

pub type NetResult<T> = Result<T, NetError>;
