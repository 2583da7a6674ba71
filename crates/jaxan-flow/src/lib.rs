//! Operand-stack tracking and relevance slicing for the jaxan bytecode analyzer.
//!
//! Both passes are pure functions of one method body and can run on any thread.

mod depth;
mod error;
mod reducer;

pub use depth::*;
pub use error::*;
pub use reducer::*;
