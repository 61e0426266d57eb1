/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Timed trials and their statistics.

use anyhow::{ensure, Result};
use dsi_progress_logger::no_logging;
use pardis::{count_components, CscMatrix, Parallelism, Variant};
use serde::Serialize;
use std::fmt;
use std::time::Instant;

/// Two runs of the same problem disagreed on the component count.
///
/// The count is a property of the graph, so a disagreement can only come
/// from a concurrency bug; the driver turns this error into exit code 2.
#[derive(Debug)]
pub struct CountMismatch {
    pub algorithm: String,
    pub expected: usize,
    pub actual: usize,
}

impl fmt::Display for CountMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] component counts do not match: got {}, expected {}",
            self.algorithm, self.actual, self.expected
        )
    }
}

impl std::error::Error for CountMismatch {}

/// Timing statistics over the trials of one configuration, in seconds.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub stddev: f64,
}

impl Stats {
    /// Computes the statistics of a non-empty set of trial times.
    ///
    /// The standard deviation is the population one, over exactly the trials
    /// that were run.
    pub fn from_times(times: &[f64]) -> Self {
        debug_assert!(!times.is_empty());
        let n = times.len() as f64;
        let mean = times.iter().sum::<f64>() / n;
        let variance = times.iter().map(|t| (t - mean) * (t - mean)).sum::<f64>() / n;

        let mut sorted = times.to_vec();
        sorted.sort_by(f64::total_cmp);
        let median = if sorted.len() % 2 == 0 {
            (sorted[sorted.len() / 2 - 1] + sorted[sorted.len() / 2]) / 2.0
        } else {
            sorted[sorted.len() / 2]
        };

        Self {
            mean,
            median,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            stddev: variance.sqrt(),
        }
    }
}

/// The outcome of the trials of one `(variant, parallelism)` configuration.
#[derive(Debug)]
pub struct Measurement {
    pub components: usize,
    /// Wall-clock time of each trial, in seconds, in execution order.
    pub times: Vec<f64>,
    pub stats: Stats,
    /// Stored edges traversed per second of mean trial time.
    pub throughput: f64,
    pub peak_rss_bytes: u64,
}

/// Runs `trials` timed executions of one configuration.
///
/// The first trial fixes the reference count; if `expected` is set it must
/// also match it (the count does not depend on the configuration). Any
/// disagreement aborts the benchmark with a [`CountMismatch`].
pub fn run_trials(
    csc: &CscMatrix,
    num_threads: usize,
    trials: usize,
    variant: Variant,
    parallelism: Parallelism,
    expected: Option<usize>,
) -> Result<Measurement> {
    ensure!(trials >= 1, "The number of trials must be at least 1");
    let algorithm = super::algorithm_name(variant, parallelism);

    let mut times = Vec::with_capacity(trials);
    let mut components = expected;
    for trial in 0..trials {
        let start = Instant::now();
        let count = count_components(csc, num_threads, variant, parallelism, no_logging![])?;
        let elapsed = start.elapsed().as_secs_f64();
        log::debug!("[{algorithm}] trial {trial}: {elapsed:.6} s");
        times.push(elapsed);

        match components {
            None => components = Some(count),
            Some(expected) if expected != count => {
                return Err(CountMismatch {
                    algorithm,
                    expected,
                    actual: count,
                }
                .into())
            }
            Some(_) => {}
        }
    }

    let stats = Stats::from_times(&times);
    let components = components.unwrap();
    let throughput = if stats.mean > 0.0 {
        csc.num_nonzeros() as f64 / stats.mean
    } else {
        0.0
    };

    Ok(Measurement {
        components,
        times,
        stats,
        throughput,
        peak_rss_bytes: peak_rss()?,
    })
}

/// Returns the peak resident-set size of the process, in bytes.
pub fn peak_rss() -> Result<u64> {
    let mut usage = std::mem::MaybeUninit::<libc::rusage>::uninit();
    // SAFETY: getrusage fills the struct when it returns 0.
    let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) };
    ensure!(rc == 0, "getrusage failed");
    let usage = unsafe { usage.assume_init() };

    // ru_maxrss is in KiB everywhere but on macOS, where it is in bytes.
    let max_rss = usage.ru_maxrss as u64;
    if cfg!(target_os = "macos") {
        Ok(max_rss)
    } else {
        Ok(max_rss * 1024)
    }
}
