use thiserror::Error;

/// Errors raised while tracking the operand stack of a method body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("invalid bytecode at instruction {index}: {reason}")]
    InvalidBytecode { index: usize, reason: String },
    #[error("unsupported opcode {opcode} at instruction {index}")]
    UnsupportedOperation { index: usize, opcode: String },
}

pub type Result<T> = std::result::Result<T, FlowError>;
