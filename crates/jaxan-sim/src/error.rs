//! Error types for method simulation.

use jaxan_flow::FlowError;
use jaxan_ir::MethodIdentifier;
use thiserror::Error;

/// Errors that can occur while resolving or simulating methods.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error("invalid bytecode at instruction {index}: {reason}")]
    InvalidBytecode { index: usize, reason: String },

    #[error("method {0} has no body to simulate")]
    UnresolvableMethod(MethodIdentifier),

    #[error("call to {identifier} exceeds the call depth of {depth}")]
    RecursionLimitExceeded {
        identifier: MethodIdentifier,
        depth: usize,
    },
}

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;
