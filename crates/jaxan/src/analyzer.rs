//! Per-method analysis: reduce, then simulate.

use std::time::Instant;

use jaxan_flow::reduce;
use jaxan_ir::{Instruction, MethodIdentifier};
use jaxan_sim::{
    Element, HttpResponse, Locals, MethodPool, MethodResolver, MethodSimulator, SimError, Value,
};
use rayon::prelude::*;
use tracing::{debug, debug_span, info, info_span, warn};

use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use crate::metrics;

/// A method body handed in by the class-file layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodBody {
    pub identifier: MethodIdentifier,
    pub instructions: Vec<Instruction>,
}

impl MethodBody {
    pub const fn new(identifier: MethodIdentifier, instructions: Vec<Instruction>) -> Self {
        Self {
            identifier,
            instructions,
        }
    }
}

/// What a method may return or throw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodAnalysis {
    pub identifier: MethodIdentifier,
    pub result: Element,
}

impl MethodAnalysis {
    /// Response facts among the possible results.
    pub fn responses(&self) -> impl Iterator<Item = &HttpResponse> {
        self.result.responses()
    }

    /// Plain entities among the possible results (anything but a response).
    pub fn entity_values(&self) -> impl Iterator<Item = &Value> {
        self.result.entity_values()
    }
}

/// Analyzes method bodies, resolving project callees through `R`.
pub struct Analyzer<R> {
    config: AnalysisConfig,
    resolver: R,
}

impl<R: MethodResolver> Analyzer<R> {
    pub const fn new(resolver: R, config: AnalysisConfig) -> Self {
        Self { config, resolver }
    }

    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub const fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Analyze a single method with a pool of its own.
    pub fn analyze(&self, body: &MethodBody) -> Result<MethodAnalysis> {
        self.analyze_method(&MethodPool::new(), body)
    }

    /// Reduce and simulate one method, sharing callees through `pool`.
    ///
    /// Parameters start out unknown. Failures carry the method identifier.
    pub fn analyze_method(&self, pool: &MethodPool, body: &MethodBody) -> Result<MethodAnalysis> {
        let identifier = &body.identifier;
        let _span = debug_span!("analyze", method = %identifier).entered();
        let failed = |source: SimError| Error::Method {
            method: identifier.clone(),
            source,
        };

        let simulation = self.config.simulation_config();
        let reduced = reduce(&body.instructions, &simulation.reducer)
            .map_err(|err| failed(err.into()))?;
        debug!(
            instructions = body.instructions.len(),
            relevant = reduced.len(),
            "method reduced"
        );

        let simulator = MethodSimulator::new(pool, &self.resolver, &simulation);
        let result = simulator
            .simulate_method(identifier, &reduced, Locals::unknown_arguments(identifier))
            .map_err(failed)?;

        Ok(MethodAnalysis {
            identifier: identifier.clone(),
            result,
        })
    }

    /// Analyze independent methods in parallel against one fresh pool.
    ///
    /// Returns one result per body, in input order; a failing method does not affect
    /// the others. Only failing to start the worker threads is an error of the run.
    pub fn analyze_all(&self, bodies: &[MethodBody]) -> Result<Vec<Result<MethodAnalysis>>> {
        let _span = info_span!("analyze_all", methods = bodies.len()).entered();
        let start = Instant::now();

        let threads = self.config.thread_count();
        let workers = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("jaxan-{index}"))
            .build()?;
        let pool = MethodPool::new();

        let results: Vec<Result<MethodAnalysis>> = workers.install(|| {
            bodies
                .par_iter()
                .map(|body| self.analyze_method(&pool, body))
                .collect()
        });

        let mut failed = 0usize;
        for result in &results {
            metrics::record_method(result);
            if let Err(err) = result {
                failed += 1;
                warn!(error = %err, "method analysis failed");
            }
        }
        let elapsed = start.elapsed();
        metrics::record_run(pool.len(), elapsed);

        info!(
            methods = bodies.len(),
            failed,
            pooled = pool.len(),
            threads,
            elapsed_ms = elapsed.as_millis(),
            "analysis complete"
        );
        Ok(results)
    }
}
