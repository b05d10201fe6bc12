//! Error types for knight-walk.
//!
//! - [`SimError`] is returned by the batch driver; its two variants are the
//!   only failure outcomes a caller of `run_batch` has to handle.
//! - [`ReportError`] covers writing the JSON report.

use std::io;
use thiserror::Error;

/// Failure outcome of a batch run. No partial results accompany either variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// Rejected before any work was dispatched.
    #[error("invalid input (simulations={n_simulations}, moves={n_moves}): {reason}")]
    InvalidInput {
        n_simulations: i64,
        n_moves: i64,
        reason: String,
    },

    /// The worker pool could not be built, a worker panicked, or the
    /// collected results did not match the requested count.
    #[error("simulation failed: {0}")]
    Execution(String),
}

/// Coarse tag for [`SimError`], for callers that only branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    Execution,
}

impl SimError {
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        match self {
            SimError::InvalidInput { .. } => ErrorKind::InvalidInput,
            SimError::Execution(_) => ErrorKind::Execution,
        }
    }
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let e = SimError::InvalidInput { n_simulations: 0, n_moves: 5, reason: "x".into() };
        assert_eq!(e.kind(), ErrorKind::InvalidInput);
        assert_eq!(SimError::Execution("boom".into()).kind(), ErrorKind::Execution);
    }

    #[test]
    fn messages_carry_cause() {
        let e = SimError::Execution("worker panicked: boom".into());
        assert_eq!(e.to_string(), "simulation failed: worker panicked: boom");
        let e = SimError::InvalidInput { n_simulations: 0, n_moves: -1, reason: "must be positive".into() };
        assert!(e.to_string().contains("simulations=0"));
        assert!(e.to_string().contains("must be positive"));
    }
}
