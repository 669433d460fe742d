//! Memoizing front over both solvers.
//!
//! Flow per request: validate, compute the cache key, return a cached result
//! on hit, otherwise solve, store and return. Invalid input is rejected before
//! the cache is consulted.
//!
//! The cache is borrowed, not owned: the caller creates it once at start-up,
//! hands it to every `CachedSolver`, and drops it at shutdown.

use crate::cache::{cache_key, ResultCache};
use crate::config::{CacheFailurePolicy, SolverConfig};
use crate::error::{CacheError, Result, SolveError};
use crate::instance::{KnapsackInput, KnapsackInstance, TspInput, TspInstance};
use crate::knapsack::KnapsackSolver;
use crate::solution::{KnapsackSolution, TspSolution};
use crate::tsp::TspSolver;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const TSP_PREFIX: &str = "tsp";
pub const KNAPSACK_PREFIX: &str = "knapsack";

pub struct CachedSolver<'c, C: ResultCache + ?Sized> {
    cache: &'c C,
    config: SolverConfig,
    tsp: TspSolver,
}

impl<'c, C: ResultCache + ?Sized> CachedSolver<'c, C> {
    pub fn new(cache: &'c C, config: SolverConfig) -> Self {
        let tsp = TspSolver::with_threshold(config.exact_threshold);
        CachedSolver { cache, config, tsp }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn solve_tsp(&self, input: &TspInput) -> Result<TspSolution> {
        let instance = TspInstance::new(input)?;
        self.memoized(TSP_PREFIX, input, || self.tsp.solve_instance(&instance))
    }

    pub fn solve_knapsack(&self, input: &KnapsackInput) -> Result<KnapsackSolution> {
        let instance = KnapsackInstance::new(input)?;
        self.memoized(KNAPSACK_PREFIX, input, || KnapsackSolver::solve_instance(&instance))
    }

    fn memoized<I, S, F>(&self, prefix: &str, input: &I, solve: F) -> Result<S>
    where
        I: Serialize,
        S: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<S>,
    {
        if !self.config.cache_enabled {
            return solve();
        }

        let key = match cache_key(prefix, input) {
            Ok(key) => key,
            Err(e) => {
                self.on_cache_failure("key", e)?;
                return solve();
            }
        };

        match self.lookup::<S>(&key) {
            Ok(Some(hit)) => {
                log::debug!("Cache hit for {} request", prefix);
                return Ok(hit);
            }
            Ok(None) => log::debug!("Cache miss for {} request", prefix),
            Err(e) => self.on_cache_failure("get", e)?,
        }

        let solution = solve()?;

        if let Err(e) = self.store(&key, &solution) {
            self.on_cache_failure("put", e)?;
        }

        Ok(solution)
    }

    fn lookup<S: DeserializeOwned>(&self, key: &str) -> std::result::Result<Option<S>, CacheError> {
        match self.cache.get(key)? {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    fn store<S: Serialize>(&self, key: &str, solution: &S) -> std::result::Result<(), CacheError> {
        let payload = serde_json::to_string(solution)?;
        self.cache.put(key, payload, self.config.cache_ttl())
    }

    /// Apply the configured cache failure policy.
    fn on_cache_failure(&self, op: &str, err: CacheError) -> Result<()> {
        match self.config.on_cache_failure {
            CacheFailurePolicy::FallThrough => {
                log::warn!("Cache {} failed, computing directly: {}", op, err);
                Ok(())
            }
            CacheFailurePolicy::Fail => Err(SolveError::Cache(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryCache, NoCache};
    use crate::error::ValidationError;
    use crate::instance::Item;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Counts calls and can be told to fail.
    #[derive(Default)]
    struct CountingCache {
        inner: MemoryCache,
        gets: AtomicUsize,
        puts: AtomicUsize,
        broken: bool,
    }

    impl CountingCache {
        fn broken() -> Self {
            CountingCache { broken: true, ..Default::default() }
        }
    }

    impl ResultCache for CountingCache {
        fn get(&self, key: &str) -> std::result::Result<Option<String>, CacheError> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            if self.broken {
                return Err(CacheError::Unavailable("connection refused".into()));
            }
            self.inner.get(key)
        }

        fn put(&self, key: &str, value: String, ttl: Duration) -> std::result::Result<(), CacheError> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            if self.broken {
                return Err(CacheError::Unavailable("connection refused".into()));
            }
            self.inner.put(key, value, ttl)
        }
    }

    fn knapsack_input() -> KnapsackInput {
        KnapsackInput::new(
            5.0,
            vec![
                Item::new("Item1", 2.0, 3.0),
                Item::new("Item2", 3.0, 4.0),
                Item::new("Item3", 4.0, 5.0),
            ],
        )
    }

    fn tsp_input() -> TspInput {
        serde_json::from_str(
            r#"{"cities": ["A", "B", "C"],
                "distances": {"A": {"B": 10, "C": 15}, "B": {"A": 10, "C": 20}, "C": {"A": 15, "B": 20}}}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_miss_then_hit() {
        let cache = CountingCache::default();
        let solver = CachedSolver::new(&cache, SolverConfig::default());

        let first = solver.solve_knapsack(&knapsack_input()).unwrap();
        assert_eq!(cache.puts.load(Ordering::SeqCst), 1);
        let second = solver.solve_knapsack(&knapsack_input()).unwrap();
        assert_eq!(cache.puts.load(Ordering::SeqCst), 1);
        assert_eq!(cache.gets.load(Ordering::SeqCst), 2);
        assert_eq!(first, second);
        assert_eq!(second.total_value, 7.0);
    }

    #[test]
    fn test_tsp_hit_returns_stored_route() {
        let cache = MemoryCache::new();
        let solver = CachedSolver::new(&cache, SolverConfig::default());
        let first = solver.solve_tsp(&tsp_input()).unwrap();
        let second = solver.solve_tsp(&tsp_input()).unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
        // Bookkeeping fields are not cached
        assert_eq!(second.algorithm, "");
    }

    #[test]
    fn test_problems_do_not_share_entries() {
        let cache = MemoryCache::new();
        let solver = CachedSolver::new(&cache, SolverConfig::default());
        solver.solve_tsp(&tsp_input()).unwrap();
        solver.solve_knapsack(&knapsack_input()).unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_validation_skips_cache() {
        let cache = CountingCache::default();
        let solver = CachedSolver::new(&cache, SolverConfig::default());
        let err = solver
            .solve_knapsack(&KnapsackInput::new(-1.0, Vec::new()))
            .unwrap_err();
        assert!(matches!(err, SolveError::Validation(ValidationError::NegativeCapacity)));
        assert_eq!(cache.gets.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_fall_through_on_broken_cache() {
        let cache = CountingCache::broken();
        let solver = CachedSolver::new(&cache, SolverConfig::default());
        let sol = solver.solve_tsp(&tsp_input()).unwrap();
        assert_eq!(sol.route.len(), 4);
        assert_eq!(cache.puts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fail_policy_surfaces_cache_error() {
        let cache = CountingCache::broken();
        let config = SolverConfig {
            on_cache_failure: CacheFailurePolicy::Fail,
            ..Default::default()
        };
        let solver = CachedSolver::new(&cache, config);
        let err = solver.solve_knapsack(&knapsack_input()).unwrap_err();
        assert!(matches!(err, SolveError::Cache(_)));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_corrupt_payload_falls_through() {
        let cache = MemoryCache::new();
        let key = cache_key(KNAPSACK_PREFIX, &knapsack_input()).unwrap();
        cache.put(&key, "not json".to_string(), Duration::from_secs(60)).unwrap();
        let solver = CachedSolver::new(&cache, SolverConfig::default());
        let sol = solver.solve_knapsack(&knapsack_input()).unwrap();
        assert_eq!(sol.total_value, 7.0);
        // The bad payload was overwritten
        assert!(cache.get(&key).unwrap().unwrap().contains("Item1"));
    }

    #[test]
    fn test_huge_ttl_is_stored() {
        let cache = MemoryCache::new();
        let config = SolverConfig { cache_ttl_secs: u64::MAX, ..Default::default() };
        let solver = CachedSolver::new(&cache, config);
        let first = solver.solve_knapsack(&knapsack_input()).unwrap();
        assert_eq!(first, solver.solve_knapsack(&knapsack_input()).unwrap());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_disabled_cache_is_not_touched() {
        let cache = CountingCache::default();
        let config = SolverConfig { cache_enabled: false, ..Default::default() };
        let solver = CachedSolver::new(&cache, config);
        solver.solve_knapsack(&knapsack_input()).unwrap();
        assert_eq!(cache.gets.load(Ordering::SeqCst), 0);
        assert_eq!(cache.puts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_dyn_cache() {
        let cache: Box<dyn ResultCache> = Box::new(NoCache);
        let solver = CachedSolver::new(cache.as_ref(), SolverConfig::default());
        assert!(solver.solve_tsp(&tsp_input()).is_ok());
    }

    #[test]
    fn test_threshold_from_config() {
        let config = SolverConfig { exact_threshold: 2, ..Default::default() };
        let cache = NoCache;
        let solver = CachedSolver::new(&cache, config);
        assert_eq!(solver.config().exact_threshold, 2);
        // Three cities now go to the heuristic; the route shape is unchanged
        let sol = solver.solve_tsp(&tsp_input()).unwrap();
        assert_eq!(sol.algorithm, "NearestNeighbor");
    }
}
