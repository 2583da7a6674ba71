//! Shared cache of project methods, each reduced at most once per analysis.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use jaxan_flow::{ReducerConfig, reduce};
use jaxan_ir::{Instruction, MethodIdentifier};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::error::{Result, SimError};

/// Source of method bodies for project-local methods.
///
/// Returns `None` when the method is not part of the analyzed project (library code,
/// abstract methods, native methods).
pub trait MethodResolver: Send + Sync {
    fn resolve(&self, identifier: &MethodIdentifier) -> Option<Vec<Instruction>>;
}

impl<F> MethodResolver for F
where
    F: Fn(&MethodIdentifier) -> Option<Vec<Instruction>> + Send + Sync,
{
    fn resolve(&self, identifier: &MethodIdentifier) -> Option<Vec<Instruction>> {
        self(identifier)
    }
}

/// Resolver for runs without any project-local methods.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoResolver;

impl MethodResolver for NoResolver {
    fn resolve(&self, _identifier: &MethodIdentifier) -> Option<Vec<Instruction>> {
        None
    }
}

/// A project method ready for simulation: its body is already reduced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectMethod {
    identifier: MethodIdentifier,
    instructions: Vec<Instruction>,
}

impl ProjectMethod {
    pub const fn new(identifier: MethodIdentifier, instructions: Vec<Instruction>) -> Self {
        Self {
            identifier,
            instructions,
        }
    }

    pub const fn identifier(&self) -> &MethodIdentifier {
        &self.identifier
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }
}

type Entry = Arc<OnceLock<Result<Arc<ProjectMethod>>>>;

/// Concurrent identifier-to-method cache.
///
/// The map lock is only held to find or insert an entry; the resolution itself runs
/// inside the entry's `OnceLock`, so concurrent requests for the same identifier wait
/// for one resolution while requests for other identifiers proceed. Failed resolutions
/// are cached too.
#[derive(Debug, Default)]
pub struct MethodPool {
    entries: RwLock<FxHashMap<MethodIdentifier, Entry>>,
    resolutions: AtomicUsize,
}

impl MethodPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached method, resolving and reducing it on first request.
    pub fn get_or_resolve(
        &self,
        identifier: &MethodIdentifier,
        resolver: &dyn MethodResolver,
        config: &ReducerConfig,
    ) -> Option<Arc<ProjectMethod>> {
        self.lookup(identifier, resolver, config).ok()
    }

    /// Like [`Self::get_or_resolve`], keeping the reason a method is unavailable.
    pub fn lookup(
        &self,
        identifier: &MethodIdentifier,
        resolver: &dyn MethodResolver,
        config: &ReducerConfig,
    ) -> Result<Arc<ProjectMethod>> {
        let entry = self.entry(identifier);
        entry
            .get_or_init(|| self.resolve(identifier, resolver, config))
            .clone()
    }

    /// Already-resolved method, without triggering resolution.
    pub fn get(&self, identifier: &MethodIdentifier) -> Option<Arc<ProjectMethod>> {
        let entries = self.entries.read();
        entries
            .get(identifier)
            .and_then(|entry| entry.get())
            .and_then(|result| result.as_ref().ok())
            .cloned()
    }

    /// Number of identifiers requested so far.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Number of times the resolver was consulted.
    pub fn resolutions(&self) -> usize {
        self.resolutions.load(Ordering::Relaxed)
    }

    /// Forget everything, e.g. between independent analyses.
    pub fn clear(&mut self) {
        self.entries.get_mut().clear();
        *self.resolutions.get_mut() = 0;
    }

    fn entry(&self, identifier: &MethodIdentifier) -> Entry {
        if let Some(entry) = self.entries.read().get(identifier) {
            return Arc::clone(entry);
        }
        let mut entries = self.entries.write();
        Arc::clone(entries.entry(identifier.clone()).or_default())
    }

    fn resolve(
        &self,
        identifier: &MethodIdentifier,
        resolver: &dyn MethodResolver,
        config: &ReducerConfig,
    ) -> Result<Arc<ProjectMethod>> {
        self.resolutions.fetch_add(1, Ordering::Relaxed);

        let Some(instructions) = resolver.resolve(identifier) else {
            debug!(method = %identifier, "method not resolvable, treating as unknown");
            return Err(SimError::UnresolvableMethod(identifier.clone()));
        };

        match reduce(&instructions, config) {
            Ok(reduced) => {
                trace!(
                    method = %identifier,
                    instructions = instructions.len(),
                    relevant = reduced.len(),
                    "method added to pool"
                );
                Ok(Arc::new(ProjectMethod::new(identifier.clone(), reduced)))
            }
            Err(err) => {
                warn!(method = %identifier, error = %err, "failed to reduce method body");
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jaxan_ir::{Literal, types};
    use std::sync::Barrier;

    fn identifier(name: &str) -> MethodIdentifier {
        MethodIdentifier::from_descriptor("com/example/Service", name, "()Ljava/lang/String;", true)
            .unwrap()
    }

    fn body(value: &str) -> Vec<Instruction> {
        vec![
            Instruction::push(Literal::string(value), types::STRING),
            Instruction::ret(),
        ]
    }

    #[test]
    fn test_resolves_once() {
        let pool = MethodPool::new();
        let resolver = |id: &MethodIdentifier| Some(body(id.name()));
        let config = ReducerConfig::default();

        let first = pool.get_or_resolve(&identifier("a"), &resolver, &config).unwrap();
        let second = pool.get_or_resolve(&identifier("a"), &resolver, &config).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.instructions().len(), 2);
        assert_eq!(pool.resolutions(), 1);
        assert_eq!(pool.get(&identifier("a")), Some(first));
    }

    #[test]
    fn test_failures_are_cached() {
        let pool = MethodPool::new();
        let config = ReducerConfig::default();

        let err = pool.lookup(&identifier("a"), &NoResolver, &config).unwrap_err();
        assert_eq!(err, SimError::UnresolvableMethod(identifier("a")));
        assert!(pool.get_or_resolve(&identifier("a"), &NoResolver, &config).is_none());
        assert_eq!(pool.resolutions(), 1);
        assert!(pool.get(&identifier("a")).is_none());
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_invalid_body_is_unavailable() {
        let pool = MethodPool::new();
        let resolver = |_: &MethodIdentifier| Some(vec![Instruction::throw()]);
        let err = pool
            .lookup(&identifier("broken"), &resolver, &ReducerConfig::default())
            .unwrap_err();
        assert!(matches!(err, SimError::Flow(_)));
    }

    #[test]
    fn test_concurrent_requests_resolve_once() {
        const THREADS: usize = 8;
        let pool = MethodPool::new();
        let calls = AtomicUsize::new(0);
        let resolver = |id: &MethodIdentifier| {
            calls.fetch_add(1, Ordering::SeqCst);
            Some(body(id.name()))
        };
        let config = ReducerConfig::default();
        let barrier = Barrier::new(THREADS);

        let fetched: Vec<Vec<Arc<ProjectMethod>>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        ["a", "b", "c"]
                            .iter()
                            .map(|name| {
                                pool.get_or_resolve(&identifier(name), &resolver, &config)
                                    .unwrap()
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles.into_iter().map(|handle| handle.join().unwrap()).collect()
        });

        for methods in &fetched {
            for (method, expected) in methods.iter().zip(&fetched[0]) {
                assert!(Arc::ptr_eq(method, expected));
            }
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(pool.resolutions(), 3);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_clear() {
        let mut pool = MethodPool::new();
        let resolver = |id: &MethodIdentifier| Some(body(id.name()));
        pool.get_or_resolve(&identifier("a"), &resolver, &ReducerConfig::default());
        pool.clear();
        assert!(pool.is_empty());
        assert_eq!(pool.resolutions(), 0);
    }
}
