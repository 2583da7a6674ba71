//! Error types for method analysis.

use jaxan_ir::MethodIdentifier;
use jaxan_sim::SimError;
use thiserror::Error;

/// Analysis errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("analysis of {method} failed: {source}")]
    Method {
        method: MethodIdentifier,
        #[source]
        source: SimError,
    },
    #[error("failed to build analysis thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    /// The method whose analysis failed, if the error is tied to one.
    pub const fn method(&self) -> Option<&MethodIdentifier> {
        match self {
            Self::Method { method, .. } => Some(method),
            Self::ThreadPool(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
