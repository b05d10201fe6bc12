//! Parallel batch driver.
//!
//! [`BatchDriver`] runs N independent walks on a dedicated rayon pool sized to
//! the workload and writes every result into one preallocated buffer. Work is
//! split into contiguous chunks; each chunk owns its RNG, so no random state is
//! ever shared between threads.
//!
//! Seeded runs place every walk on its own ChaCha stream keyed by its
//! simulation index, so the resulting [`ResultSet`] does not depend on the
//! worker count, the chunking, or scheduling order.
//!
//! ```
//! use knight_walk::batch::{BatchConfig, BatchDriver};
//!
//! let cfg = BatchConfig { seed: Some(7), ..Default::default() };
//! let results = BatchDriver::with_config(cfg).run(2_000, 20).unwrap();
//! assert_eq!(results.len(), 2_000);
//! assert!(results.iter().all(|&n| (1..=21).contains(&n)));
//! ```

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::Instant;

use indicatif::ProgressBar;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{debug, error, info};

use crate::error::SimError;
use crate::walk::simulate_walk;

/// One worker is added per this many simulations, up to the core count.
pub const SIMULATIONS_PER_WORKER: usize = 1_000;

/// Default number of chunks handed to each worker.
pub const CHUNKS_PER_WORKER: usize = 4;

/// Largest accepted move count; keeps every coordinate inside `i32`.
pub const MAX_MOVES: u32 = (i32::MAX / 2) as u32;

/// Distinct-square counts, one per walk. Order carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultSet(Vec<u32>);

impl ResultSet {
    #[inline]
    pub fn from_vec(values: Vec<u32>) -> Self { ResultSet(values) }

    #[inline]
    pub fn len(&self) -> usize { self.0.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    #[inline]
    pub fn as_slice(&self) -> &[u32] { &self.0 }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, u32> { self.0.iter() }

    #[inline]
    pub fn into_vec(self) -> Vec<u32> { self.0 }
}

impl From<Vec<u32>> for ResultSet { fn from(v: Vec<u32>) -> Self { ResultSet::from_vec(v) } }

impl AsRef<[u32]> for ResultSet { fn as_ref(&self) -> &[u32] { &self.0 } }

/// Configurable knobs for the batch driver.
///
/// - `workers`: explicit worker count, clamped to `1..=available cores`. `None`
///   sizes the pool from the workload.
/// - `chunks_per_worker`: how many chunks each worker receives on average.
/// - `seed`: fixed seed for reproducible runs; `None` draws from OS entropy.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub workers: Option<usize>,
    pub chunks_per_worker: usize,
    pub seed: Option<u64>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { workers: None, chunks_per_worker: CHUNKS_PER_WORKER, seed: None }
    }
}

/// Resolved pool size and chunking for one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlan {
    pub workers: usize,
    pub chunk_size: usize,
    pub chunks: usize,
}

pub struct BatchDriver {
    cfg: BatchConfig,
    progress: Option<ProgressBar>,
}

impl BatchDriver {
    pub fn new() -> Self { Self::with_config(BatchConfig::default()) }

    pub fn with_config(cfg: BatchConfig) -> Self { Self { cfg, progress: None } }

    /// Advance `pb` by the size of every finished chunk.
    pub fn with_progress(mut self, pb: ProgressBar) -> Self {
        self.progress = Some(pb);
        self
    }

    #[inline]
    pub fn config(&self) -> &BatchConfig { &self.cfg }

    /// Worker count and chunk size this driver would use for `n_simulations`.
    ///
    /// Never yields zero workers or an empty chunk.
    pub fn plan(&self, n_simulations: usize) -> BatchPlan {
        let available = available_workers();
        let workers = match self.cfg.workers {
            Some(w) => w.clamp(1, available),
            None => (n_simulations / SIMULATIONS_PER_WORKER).clamp(1, available),
        };
        let per_worker = self.cfg.chunks_per_worker.max(1);
        let chunk_size = (n_simulations / (workers * per_worker)).max(1);
        let chunks = n_simulations.div_ceil(chunk_size);
        BatchPlan { workers, chunk_size, chunks }
    }

    /// Run `n_simulations` walks of `n_moves` moves each.
    ///
    /// Returns [`SimError::InvalidInput`] before dispatching anything when
    /// `n_simulations <= 0` or `n_moves` is negative (or above [`MAX_MOVES`]).
    /// Any pool or worker failure is reported as [`SimError::Execution`].
    pub fn run(&self, n_simulations: i64, n_moves: i64) -> Result<ResultSet, SimError> {
        let (n_simulations, n_moves) = validate(n_simulations, n_moves)?;
        self.run_walks(n_simulations, |rng| simulate_walk(n_moves, rng))
    }

    pub(crate) fn run_walks<F>(&self, n_simulations: usize, walk: F) -> Result<ResultSet, SimError>
    where
        F: Fn(&mut ChaCha8Rng) -> u32 + Sync,
    {
        let plan = self.plan(n_simulations);
        debug!(
            simulations = n_simulations,
            workers = plan.workers,
            chunk_size = plan.chunk_size,
            chunks = plan.chunks,
            seeded = self.cfg.seed.is_some(),
            "Batch planned"
        );
        let start = Instant::now();

        let pool = ThreadPoolBuilder::new()
            .num_threads(plan.workers)
            .thread_name(|i| format!("knight-walk-{i}"))
            .build()
            .map_err(|e| execution_failure(format!("failed to build worker pool: {e}")))?;

        let mut results: Vec<u32> = Vec::new();
        results
            .try_reserve_exact(n_simulations)
            .map_err(|e| execution_failure(format!("cannot allocate {n_simulations} results: {e}")))?;
        results.resize(n_simulations, 0);

        let seed = self.cfg.seed;
        let progress = self.progress.as_ref();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            pool.install(|| {
                results
                    .par_chunks_mut(plan.chunk_size)
                    .enumerate()
                    .for_each(|(chunk_idx, out)| {
                        run_chunk(out, chunk_idx * plan.chunk_size, seed, &walk);
                        if let Some(pb) = progress {
                            pb.inc(out.len() as u64);
                        }
                    })
            })
        }));
        if let Err(payload) = outcome {
            return Err(execution_failure(format!("worker panicked: {}", panic_message(payload.as_ref()))));
        }
        if results.len() != n_simulations {
            return Err(execution_failure(format!(
                "collected {} results, expected {n_simulations}",
                results.len()
            )));
        }

        info!(
            simulations = n_simulations,
            workers = plan.workers,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Batch complete"
        );
        Ok(ResultSet(results))
    }
}

impl Default for BatchDriver { fn default() -> Self { Self::new() } }

/// Run a batch with default configuration (workload-sized pool, unseeded).
///
/// ```
/// use knight_walk::batch::run_batch;
/// use knight_walk::error::ErrorKind;
///
/// assert_eq!(run_batch(10, 0).unwrap().as_slice(), &[1; 10]);
/// assert_eq!(run_batch(0, 5).unwrap_err().kind(), ErrorKind::InvalidInput);
/// ```
pub fn run_batch(n_simulations: i64, n_moves: i64) -> Result<ResultSet, SimError> {
    BatchDriver::new().run(n_simulations, n_moves)
}

/// Number of parallel execution units, falling back to 1.
pub fn available_workers() -> usize {
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

fn validate(n_simulations: i64, n_moves: i64) -> Result<(usize, u32), SimError> {
    let invalid = |reason: &str| SimError::InvalidInput {
        n_simulations,
        n_moves,
        reason: reason.to_string(),
    };
    if n_simulations <= 0 {
        return Err(invalid("number of simulations must be positive"));
    }
    if n_moves < 0 {
        return Err(invalid("number of moves must be non-negative"));
    }
    let n_sims = usize::try_from(n_simulations)
        .map_err(|_| invalid("number of simulations exceeds the address space"))?;
    let moves = u32::try_from(n_moves)
        .ok()
        .filter(|&m| m <= MAX_MOVES)
        .ok_or_else(|| invalid("number of moves is too large"))?;
    Ok((n_sims, moves))
}

fn run_chunk<F>(out: &mut [u32], offset: usize, seed: Option<u64>, walk: &F)
where
    F: Fn(&mut ChaCha8Rng) -> u32,
{
    match seed {
        Some(seed) => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for (i, slot) in out.iter_mut().enumerate() {
                rng.set_stream((offset + i) as u64);
                rng.set_word_pos(0);
                *slot = walk(&mut rng);
            }
        }
        None => {
            let mut rng = ChaCha8Rng::from_entropy();
            for slot in out.iter_mut() {
                *slot = walk(&mut rng);
            }
        }
    }
}

fn execution_failure(cause: String) -> SimError {
    error!(cause = %cause, "Batch failed");
    SimError::Execution(cause)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn seeded(seed: u64, workers: usize, chunks_per_worker: usize) -> BatchDriver {
        BatchDriver::with_config(BatchConfig { workers: Some(workers), chunks_per_worker, seed: Some(seed) })
    }

    #[test]
    fn rejects_invalid_input_before_dispatch() {
        for (n, m) in [(0, 5), (-3, 5), (0, 0), (10, -1), (1, -100)] {
            let err = run_batch(n, m).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput, "n={n} m={m}");
        }
        let err = run_batch(1, MAX_MOVES as i64 + 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn returns_exactly_requested_count() {
        for n in [1i64, 2, 7, 999, 1_000, 2_501] {
            let results = run_batch(n, 10).unwrap();
            assert_eq!(results.len(), n as usize);
            assert!(results.iter().all(|&v| (1..=11).contains(&v)));
        }
    }

    #[test]
    fn zero_moves_yield_all_ones() {
        let results = run_batch(3_000, 0).unwrap();
        assert_eq!(results.len(), 3_000);
        assert!(results.iter().all(|&v| v == 1));
    }

    #[test]
    fn fifty_move_reference_scenario() {
        let results = BatchDriver::with_config(BatchConfig { seed: Some(2024), ..Default::default() })
            .run(10_000, 50)
            .unwrap();
        assert_eq!(results.len(), 10_000);
        assert!(results.iter().all(|&v| (1..=51).contains(&v)));
        let mean = results.iter().map(|&v| v as f64).sum::<f64>() / results.len() as f64;
        assert!((38.0..44.0).contains(&mean), "mean {mean}");
    }

    #[test]
    fn seeded_runs_ignore_worker_count_and_chunking() {
        let a = seeded(42, 1, 4).run(1_500, 30).unwrap();
        let b = seeded(42, 4, 1).run(1_500, 30).unwrap();
        let c = seeded(42, 2, 16).run(1_500, 30).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        let d = seeded(43, 1, 4).run(1_500, 30).unwrap();
        assert_ne!(a, d);
    }

    #[test]
    fn unseeded_runs_differ() {
        let a = run_batch(1_000, 50).unwrap();
        let b = run_batch(1_000, 50).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn plan_never_degenerates() {
        let driver = BatchDriver::new();
        let avail = available_workers();
        for n in [1usize, 2, 3, 999, 1_000, 1_999, 10_000, 1_000_000] {
            let plan = driver.plan(n);
            assert!(plan.workers >= 1 && plan.workers <= avail, "{plan:?}");
            assert!(plan.workers <= (n / SIMULATIONS_PER_WORKER).max(1));
            assert!(plan.chunk_size >= 1);
            assert!(plan.chunk_size * plan.chunks >= n);
            assert!(plan.chunk_size * (plan.chunks - 1) < n);
        }
        assert_eq!(driver.plan(1), BatchPlan { workers: 1, chunk_size: 1, chunks: 1 });
        assert_eq!(driver.plan(999).workers, 1);
    }

    #[test]
    fn plan_clamps_explicit_workers() {
        let avail = available_workers();
        let zero = BatchDriver::with_config(BatchConfig { workers: Some(0), ..Default::default() });
        assert_eq!(zero.plan(10).workers, 1);
        let many = BatchDriver::with_config(BatchConfig { workers: Some(usize::MAX / 8), ..Default::default() });
        assert_eq!(many.plan(10).workers, avail);
    }

    #[test]
    fn worker_panic_becomes_execution_error() {
        let driver = BatchDriver::new();
        let err = driver
            .run_walks(5_000, |_| -> u32 { panic!("walker exploded") })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Execution);
        assert!(err.to_string().contains("walker exploded"), "{err}");
    }

    #[test]
    fn progress_tracks_every_walk() {
        let pb = ProgressBar::hidden();
        let driver = seeded(1, 2, 4).with_progress(pb.clone());
        let results = driver.run(4_321, 5).unwrap();
        assert_eq!(results.len(), 4_321);
        assert_eq!(pb.position(), 4_321);
    }
}
