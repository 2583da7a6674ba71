//! Symbolic simulation of reduced method bodies.
//!
//! Values are [`Element`]s: sets of possible static types and possible concrete values
//! (literals, JSON structures, HTTP responses, method handles). Project-local callees are
//! fetched through a shared [`MethodPool`] and simulated recursively; well-known runtime
//! APIs are evaluated by built-in rules.

mod element;
mod error;
mod json;
pub mod known;
mod pool;
mod response;
mod simulator;

pub use element::*;
pub use error::*;
pub use json::*;
pub use pool::*;
pub use response::*;
pub use simulator::*;
