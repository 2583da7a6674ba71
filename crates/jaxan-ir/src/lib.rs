//! Instruction model for the jaxan bytecode analyzer.
//!
//! This crate provides pure data types: decoded instructions with their static stack
//! effect, method identities and JVM type descriptors. Decoding class files into these
//! types happens outside of jaxan.

mod identifier;
mod instr;
mod literal;
pub mod types;

pub use identifier::*;
pub use instr::*;
pub use literal::*;
pub use types::DescriptorError;
