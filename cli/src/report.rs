/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The machine-readable benchmark report.

use crate::bench::Stats;
use pardis::CscMatrix;
use serde::Serialize;
use std::path::Path;

/// The single object emitted on standard output in `--json` mode.
#[derive(Debug, Serialize)]
pub struct Report {
    pub sys_info: SysInfo,
    pub matrix_info: MatrixInfo,
    pub benchmark_info: BenchmarkInfo,
    pub results: Vec<ResultEntry>,
}

#[derive(Debug, Serialize)]
pub struct SysInfo {
    pub os: &'static str,
    pub arch: &'static str,
    pub available_cpus: usize,
}

impl SysInfo {
    pub fn collect() -> Self {
        Self {
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
            available_cpus: std::thread::available_parallelism().map_or(1, |p| p.get()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MatrixInfo {
    pub path: String,
    pub num_rows: usize,
    pub num_cols: usize,
    pub num_nonzeros: usize,
}

impl MatrixInfo {
    pub fn new(path: &Path, csc: &CscMatrix) -> Self {
        Self {
            path: path.display().to_string(),
            num_rows: csc.num_rows(),
            num_cols: csc.num_cols(),
            num_nonzeros: csc.num_nonzeros(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BenchmarkInfo {
    pub num_threads: usize,
    pub num_trials: usize,
}

/// One benchmarked `(variant, parallelism)` configuration.
#[derive(Debug, Serialize)]
pub struct ResultEntry {
    pub algorithm: String,
    pub variant: &'static str,
    pub parallelism: &'static str,
    pub num_threads: usize,
    pub components: usize,
    /// Wall-clock time of each trial, in seconds, in execution order.
    pub trial_times_s: Vec<f64>,
    pub times_s: Stats,
    pub throughput_edges_per_s: f64,
    pub peak_rss_bytes: u64,
    /// Mean-time ratio to the sequential baseline of the same variant.
    pub speedup: f64,
    /// Speedup divided by the number of threads.
    pub efficiency: f64,
}
