//! Equal-width frequency histogram over a [`ResultSet`].
//!
//! Binning follows the usual plotting convention: `bins` equal-width intervals
//! spanning `[min, max]`, each half-open except the last, which also contains
//! `max`. A set with a single distinct value is spread over `[v - 0.5, v + 0.5]`.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::batch::ResultSet;

pub const DEFAULT_BINS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub lower: f64,
    pub upper: f64,
    pub counts: Vec<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
    pub count: u64,
}

impl Histogram {
    /// Bin `results` into `bins` equal-width intervals (at least one).
    ///
    /// # Panics
    ///
    /// Panics if `results` is empty.
    pub fn from_results(results: &ResultSet, bins: usize) -> Self {
        assert!(!results.is_empty(), "histogram requires a non-empty ResultSet");
        let bins = bins.max(1);
        let (min, max) = results
            .iter()
            .fold((u32::MAX, 0u32), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let (lower, upper) = if min == max {
            (min as f64 - 0.5, max as f64 + 0.5)
        } else {
            (min as f64, max as f64)
        };
        let width = (upper - lower) / bins as f64;
        let mut counts = vec![0u64; bins];
        for &v in results.iter() {
            let idx = (((v as f64 - lower) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        Histogram { lower, upper, counts }
    }

    #[inline]
    pub fn bin_count(&self) -> usize { self.counts.len() }

    #[inline]
    pub fn bin_width(&self) -> f64 { (self.upper - self.lower) / self.counts.len() as f64 }

    #[inline]
    pub fn total(&self) -> u64 { self.counts.iter().sum() }

    pub fn bins(&self) -> impl Iterator<Item = Bin> + '_ {
        let width = self.bin_width();
        self.counts.iter().enumerate().map(move |(i, &count)| Bin {
            lower: self.lower + width * i as f64,
            upper: self.lower + width * (i + 1) as f64,
            count,
        })
    }

    /// One `#` bar per non-empty bin, scaled so the tallest bar is `width` wide.
    pub fn render_text(&self, width: usize) -> String {
        let peak = self.counts.iter().copied().max().unwrap_or(0).max(1);
        let mut out = String::new();
        for bin in self.bins().filter(|b| b.count > 0) {
            let len = ((bin.count as f64 / peak as f64) * width as f64).round() as usize;
            let _ = writeln!(
                out,
                "{:>8.2} - {:>8.2} | {:<w$} {}",
                bin.lower,
                bin.upper,
                "#".repeat(len.max(1)),
                bin.count,
                w = width
            );
        }
        out
    }
}
