//! jaxan: response and entity inference for JAX-RS resource methods.
//!
//! Takes decoded method bodies, drops the instructions that cannot influence what a
//! method returns, and symbolically executes the rest to learn which HTTP responses
//! and entity values a resource method may produce.
//!
//! # Pipeline
//!
//! ```text
//! MethodBody → reduce (jaxan-flow) → simulate (jaxan-sim) → MethodAnalysis
//! ```
//!
//! Project-local callees are fetched through a [`MethodResolver`] and cached in a
//! [`MethodPool`] shared by all methods of one [`Analyzer::analyze_all`] run.

mod analyzer;
mod config;
mod error;
pub mod logging;
pub mod metrics;

pub use analyzer::{Analyzer, MethodAnalysis, MethodBody};
pub use config::AnalysisConfig;
pub use error::{Error, Result};

pub use jaxan_flow::{FlowError, ReducerConfig, StackDepths, reduce};
pub use jaxan_ir::{Instruction, InstructionKind, Label, Literal, MethodIdentifier, types};
pub use jaxan_sim::{
    Element, HttpResponse, JsonValue, Locals, MethodHandle, MethodPool, MethodResolver,
    MethodSimulator, NoResolver, ProjectMethod, SimError, SimulationConfig, Value,
};
