//! Analysis configuration.

use jaxan_flow::{DEFAULT_IGNORED_VARIABLES, ReducerConfig};
use jaxan_sim::{DEFAULT_MAX_CALL_DEPTH, SimulationConfig};

/// Settings for one analysis run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Nested project calls deeper than this yield an unknown result.
    pub max_call_depth: usize,
    /// Local variable names the reducer never follows.
    pub ignored_variables: Vec<String>,
    /// Worker threads for [`crate::Analyzer::analyze_all`]; 0 means one per CPU.
    pub threads: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            ignored_variables: DEFAULT_IGNORED_VARIABLES
                .iter()
                .map(ToString::to_string)
                .collect(),
            threads: 0,
        }
    }
}

impl AnalysisConfig {
    #[must_use]
    pub const fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    #[must_use]
    pub fn with_ignored_variables<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_variables = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Resolved worker thread count.
    pub fn thread_count(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get().max(1)
        } else {
            self.threads
        }
    }

    pub fn reducer_config(&self) -> ReducerConfig {
        ReducerConfig {
            ignored_variables: self.ignored_variables.clone(),
        }
    }

    pub fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig::default()
            .with_max_call_depth(self.max_call_depth)
            .with_reducer(self.reducer_config())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.max_call_depth, 32);
        assert_eq!(config.ignored_variables, vec!["this".to_string()]);
        assert!(config.thread_count() >= 1);
        assert_eq!(config.simulation_config(), SimulationConfig::default());
    }

    #[test]
    fn test_builders() {
        let config = AnalysisConfig::default()
            .with_max_call_depth(4)
            .with_ignored_variables(["this", "self"])
            .with_threads(3);
        assert_eq!(config.thread_count(), 3);
        let simulation = config.simulation_config();
        assert_eq!(simulation.max_call_depth, 4);
        assert_eq!(simulation.reducer.ignored_variables.len(), 2);
    }
}
