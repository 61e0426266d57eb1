/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![doc = include_str!("../README.md")]

use anyhow::{ensure, Context, Result};
use clap::{Parser, ValueEnum};
use pardis::{Parallelism, Variant};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

pub mod bench;
pub mod mtx;
pub mod report;

use report::{BenchmarkInfo, MatrixInfo, Report, ResultEntry, SysInfo};

/// The parallel modes benchmarked against the sequential baseline, in
/// reporting order.
const PARALLEL_MODES: [Parallelism; 3] = [
    Parallelism::WorkStealing,
    Parallelism::ThreadPool,
    Parallelism::ForkJoin,
];

#[derive(Parser, Debug)]
#[command(name = "pardis", version)]
/// Benchmarks parallel connected-components algorithms on a sparse symmetric
/// 0/1 matrix.
///
/// Every selected algorithm variant is run over the sequential baseline and
/// every parallel execution mode; all runs must agree on the component
/// count.
///
/// Noteworthy environment variables:
///
/// - RUST_LOG: configuration for env_logger
///   <https://docs.rs/env_logger/latest/env_logger/>
pub struct Cli {
    /// The matrix, in Matrix Market coordinate format.
    pub matrix: PathBuf,

    #[arg(short = 't', long, default_value_t = 8, value_parser = num_threads_parser)]
    /// The number of threads used by the parallel execution modes.
    pub threads: usize,

    #[arg(short = 'n', long, default_value_t = 3, value_parser = num_trials_parser)]
    /// The number of timed trials per configuration.
    pub trials: usize,

    #[arg(short = 'v', long, value_enum)]
    /// Benchmark a single algorithm variant (default: both).
    pub variant: Option<VariantArg>,

    #[arg(long)]
    /// Emit a single JSON report on standard output.
    pub json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
/// Enum selecting an algorithm variant from the command line.
pub enum VariantArg {
    Propagation,
    UnionFind,
}

impl From<VariantArg> for Variant {
    fn from(value: VariantArg) -> Self {
        match value {
            VariantArg::Propagation => Variant::Propagation,
            VariantArg::UnionFind => Variant::UnionFind,
        }
    }
}

/// Parses the number of threads from a string.
///
/// This function is meant to be used with `#[arg(..., value_parser =
/// num_threads_parser)]`.
pub fn num_threads_parser(arg: &str) -> Result<usize> {
    let num_threads = arg.parse::<usize>()?;
    ensure!(num_threads > 0, "Number of threads must be greater than 0");
    Ok(num_threads)
}

/// Parses the number of trials from a string.
pub fn num_trials_parser(arg: &str) -> Result<usize> {
    let num_trials = arg.parse::<usize>()?;
    ensure!(num_trials > 0, "Number of trials must be greater than 0");
    Ok(num_trials)
}

pub fn variant_name(variant: Variant) -> &'static str {
    match variant {
        Variant::Propagation => "propagation",
        Variant::UnionFind => "union-find",
    }
}

pub fn parallelism_name(parallelism: Parallelism) -> &'static str {
    match parallelism {
        Parallelism::Sequential => "sequential",
        Parallelism::WorkStealing => "work-stealing",
        Parallelism::ThreadPool => "thread-pool",
        Parallelism::ForkJoin => "fork-join",
    }
}

pub fn algorithm_name(variant: Variant, parallelism: Parallelism) -> String {
    format!("{}/{}", variant_name(variant), parallelism_name(parallelism))
}

/// Initializes the `env_logger` logger with a compact format carrying the
/// time elapsed since initialization.
pub fn init_env_logger() -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    let start = std::time::Instant::now();
    builder.format(move |buf, record| {
        let style = buf.default_level_style(record.level());
        writeln!(
            buf,
            "{:10.3}s {style}{}{style:#} {} - {}",
            start.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            record.args()
        )
    });
    builder.init();
    Ok(())
}

/// Runs the whole benchmark; returns the process exit code.
///
/// Argument and I/O errors propagate as `Err` (exit code 1); a component
/// count disagreement yields exit code 2.
pub fn main<I, T>(args: I) -> Result<ExitCode>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    match run(cli) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(error) if error.downcast_ref::<bench::CountMismatch>().is_some() => {
            log::error!("{error:#}");
            Ok(ExitCode::from(2))
        }
        Err(error) => Err(error),
    }
}

fn run(cli: Cli) -> Result<()> {
    log::info!("Loading the matrix from {}", cli.matrix.display());
    let csc = mtx::load_matrix(&cli.matrix)?;
    log::info!(
        "Loaded a {}×{} pattern with {} stored entries",
        csc.num_rows(),
        csc.num_cols(),
        csc.num_nonzeros()
    );

    let variants: Vec<Variant> = match cli.variant {
        Some(variant) => vec![variant.into()],
        None => vec![Variant::Propagation, Variant::UnionFind],
    };

    let mut results = Vec::new();
    // The count must be the same across every configuration, not just across
    // the trials of one: the first finished configuration pins it down.
    let mut expected = None;

    for &variant in &variants {
        let baseline = benchmark(&csc, 1, cli.trials, variant, Parallelism::Sequential, expected)?;
        expected.get_or_insert(baseline.components);
        let baseline_mean = baseline.times_s.mean;
        log_entry(&baseline);
        results.push(baseline);

        for parallelism in PARALLEL_MODES {
            let mut entry =
                benchmark(&csc, cli.threads, cli.trials, variant, parallelism, expected)?;
            if entry.times_s.mean > 0.0 {
                entry.speedup = baseline_mean / entry.times_s.mean;
                entry.efficiency = entry.speedup / cli.threads as f64;
            }
            log_entry(&entry);
            results.push(entry);
        }
    }

    if cli.json {
        let report = Report {
            sys_info: SysInfo::collect(),
            matrix_info: MatrixInfo::new(&cli.matrix, &csc),
            benchmark_info: BenchmarkInfo {
                num_threads: cli.threads,
                num_trials: cli.trials,
            },
            results,
        };
        serde_json::to_writer_pretty(std::io::stdout().lock(), &report)
            .context("Could not write the JSON report")?;
        println!();
    }

    Ok(())
}

fn benchmark(
    csc: &pardis::CscMatrix,
    num_threads: usize,
    trials: usize,
    variant: Variant,
    parallelism: Parallelism,
    expected: Option<usize>,
) -> Result<ResultEntry> {
    let measurement = bench::run_trials(csc, num_threads, trials, variant, parallelism, expected)?;
    Ok(ResultEntry {
        algorithm: algorithm_name(variant, parallelism),
        variant: variant_name(variant),
        parallelism: parallelism_name(parallelism),
        num_threads,
        components: measurement.components,
        trial_times_s: measurement.times,
        times_s: measurement.stats,
        throughput_edges_per_s: measurement.throughput,
        peak_rss_bytes: measurement.peak_rss_bytes,
        speedup: 1.0,
        efficiency: 1.0,
    })
}

fn log_entry(entry: &ResultEntry) {
    log::info!(
        "[{}] components: {}, mean {:.6} s (stddev {:.6} s, min {:.6} s, max {:.6} s), \
         {:.3e} edges/s, speedup {:.2}, efficiency {:.2}",
        entry.algorithm,
        entry.components,
        entry.times_s.mean,
        entry.times_s.stddev,
        entry.times_s.min,
        entry.times_s.max,
        entry.throughput_edges_per_s,
        entry.speedup,
        entry.efficiency,
    );
}
