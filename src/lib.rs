//! knight-walk: Monte Carlo estimate of the distinct squares a knight visits
//! on an unbounded board after a fixed number of uniformly random moves.
//!
//! This crate provides:
//! - A single-walk generator (`walk` module) that takes any `rand::Rng`
//! - A parallel batch driver (`batch` module) on a workload-sized rayon pool
//! - Summary statistics (`stats` module): mean, population std-dev, 95% CI, extrema
//! - A 50-bin histogram and a JSON report (`histogram`, `report` modules)
//!
//! Quick start:
//! ```
//! use knight_walk::batch::{BatchConfig, BatchDriver};
//! use knight_walk::stats::analyze;
//!
//! // Seeded run: the same seed always yields the same ResultSet
//! let driver = BatchDriver::with_config(BatchConfig { seed: Some(42), ..Default::default() });
//! let results = driver.run(5_000, 50).unwrap();
//! let summary = analyze(&results);
//! assert!(summary.min as f64 <= summary.mean && summary.mean <= summary.max as f64);
//! ```
//!
//! Note: `run_batch` is the unseeded shortcut for `BatchDriver::new().run(..)`.
//!
pub mod batch;
pub mod error;
pub mod histogram;
pub mod report;
pub mod stats;
pub mod walk;

pub use batch::{run_batch, BatchConfig, BatchDriver, ResultSet};
pub use error::{ErrorKind, SimError};
pub use stats::{analyze, SummaryStatistics};
