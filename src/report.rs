//! Console summary and JSON report for a finished batch.
//!
//! The JSON report carries the run parameters, the summary statistics and the
//! histogram counts, which is everything needed to redraw the distribution.
//! Raw per-walk results are not persisted.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::ReportError;
use crate::histogram::Histogram;
use crate::stats::SummaryStatistics;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMeta {
    pub n_simulations: u64,
    pub n_moves: u32,
    pub workers: usize,
    pub chunk_size: usize,
    pub seed: Option<u64>,
    pub elapsed_s: f64,
    pub start_unix_s: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub meta: RunMeta,
    pub summary: SummaryStatistics,
    pub histogram: Histogram,
}

/// Multi-line summary block; real-valued fields use two decimals.
pub fn format_summary(s: &SummaryStatistics) -> String {
    let (lo, hi) = s.confidence_interval;
    format!(
        "--- Simulation Results ---\n\
         Mean distinct squares visited: {:.2}\n\
         Standard deviation: {:.2}\n\
         95% Confidence Interval: ({:.2}, {:.2})\n\
         Minimum distinct squares visited: {}\n\
         Maximum distinct squares visited: {}",
        s.mean, s.std_dev, lo, hi, s.min, s.max
    )
}

pub fn to_json_string(report: &Report) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn write_report_to_path<P: AsRef<Path>>(path: P, report: &Report) -> Result<(), ReportError> {
    let data = to_json_string(report)?;
    let mut f = fs::File::create(path)?;
    f.write_all(data.as_bytes())?;
    f.write_all(b"\n")?;
    Ok(())
}

pub fn read_report_from_path<P: AsRef<Path>>(path: P) -> Result<Report, ReportError> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

pub fn now_unix_seconds() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}
