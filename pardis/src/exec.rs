/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::{ensure, Context, Result};
use crossbeam_utils::CachePadded;
use rayon::prelude::*;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Columns per work unit in the edge phases.
///
/// Tuned experimentally: smaller chunks inflate dispenser contention, larger
/// ones leave tail imbalance on power-law degree distributions.
pub(crate) const COLUMN_CHUNK: usize = 4096;

/// Vertices per work unit in the flatten and count phases, where per-index
/// work is uniform.
pub(crate) const VERTEX_CHUNK: usize = 2048;

/// The parallel execution strategies an engine can run on.
///
/// All strategies compute the same result; they differ only in how the index
/// space of each phase is scheduled onto threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parallelism {
    /// A plain in-caller loop, no threads involved.
    Sequential,
    /// Work-stealing parallel iterators over fixed-size chunks.
    WorkStealing,
    /// Explicit workers pulling chunks from a shared atomic dispenser.
    ThreadPool,
    /// Recursive binary splitting joined bottom-up.
    ForkJoin,
}

enum Mode {
    Sequential,
    WorkStealing {
        pool: rayon::ThreadPool,
    },
    WorkerPool {
        pool: rayon::ThreadPool,
        num_threads: usize,
    },
    ForkJoin {
        pool: rayon::ThreadPool,
    },
}

/// Runs the parallel phases of an engine.
///
/// The executor offers a chunked parallel-for and a parallel sum reduction
/// over a half-open index interval. Every index is visited exactly once, and
/// every store performed by a worker happens-before the call returns: the
/// join at the end of each call is the only synchronization the engines rely
/// on between phases.
pub struct Executor {
    mode: Mode,
}

impl Executor {
    /// Creates an executor with a dedicated thread pool of `num_threads`
    /// workers, or no pool at all for [`Parallelism::Sequential`].
    pub fn new(parallelism: Parallelism, num_threads: usize) -> Result<Self> {
        ensure!(num_threads >= 1, "The number of threads must be at least 1");
        let build_pool = || {
            rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build()
                .context("Could not build the thread pool")
        };
        let mode = match parallelism {
            Parallelism::Sequential => Mode::Sequential,
            Parallelism::WorkStealing => Mode::WorkStealing { pool: build_pool()? },
            Parallelism::ThreadPool => Mode::WorkerPool {
                pool: build_pool()?,
                num_threads,
            },
            Parallelism::ForkJoin => Mode::ForkJoin { pool: build_pool()? },
        };
        Ok(Self { mode })
    }

    /// Applies `f` to chunks of `0..len` of at most `chunk_size` indices.
    pub fn for_each<F>(&self, len: usize, chunk_size: usize, f: F)
    where
        F: Fn(Range<usize>) + Sync,
    {
        debug_assert!(chunk_size > 0);
        if len == 0 {
            return;
        }
        match &self.mode {
            Mode::Sequential => f(0..len),
            Mode::WorkStealing { pool } => {
                let num_chunks = len.div_ceil(chunk_size);
                pool.install(|| {
                    (0..num_chunks).into_par_iter().for_each(|chunk| {
                        let begin = chunk * chunk_size;
                        f(begin..len.min(begin + chunk_size));
                    })
                });
            }
            Mode::WorkerPool { pool, num_threads } => {
                let next = CachePadded::new(AtomicUsize::new(0));
                pool.scope(|scope| {
                    for _ in 0..*num_threads {
                        let next = &next;
                        let f = &f;
                        scope.spawn(move |_| loop {
                            let begin = next.fetch_add(chunk_size, Ordering::Relaxed);
                            if begin >= len {
                                break;
                            }
                            f(begin..len.min(begin + chunk_size));
                        });
                    }
                });
            }
            Mode::ForkJoin { pool } => pool.install(|| bisect(0..len, chunk_size, &f)),
        }
    }

    /// Applies `f` to chunks of `0..len` with static partitioning: each
    /// worker of the worker-pool mode receives one contiguous slice instead
    /// of going through the dispenser. The other modes schedule as in
    /// [`for_each`](Executor::for_each); for them chunk stealing already
    /// balances uniform per-index work.
    pub fn for_each_static<F>(&self, len: usize, chunk_size: usize, f: F)
    where
        F: Fn(Range<usize>) + Sync,
    {
        match &self.mode {
            Mode::WorkerPool { pool, num_threads } => {
                if len == 0 {
                    return;
                }
                let per_worker = len.div_ceil(*num_threads);
                pool.scope(|scope| {
                    for worker in 0..*num_threads {
                        let f = &f;
                        scope.spawn(move |_| {
                            let begin = len.min(worker * per_worker);
                            let end = len.min(begin + per_worker);
                            if begin < end {
                                f(begin..end);
                            }
                        });
                    }
                });
            }
            _ => self.for_each(len, chunk_size, f),
        }
    }

    /// Sums `f` over chunks of `0..len`.
    ///
    /// Dynamic scheduling buys nothing here, so the worker-pool mode hands
    /// each worker one contiguous slice instead of going through the
    /// dispenser.
    pub fn sum<F>(&self, len: usize, chunk_size: usize, f: F) -> usize
    where
        F: Fn(Range<usize>) -> usize + Sync,
    {
        debug_assert!(chunk_size > 0);
        if len == 0 {
            return 0;
        }
        match &self.mode {
            Mode::Sequential => f(0..len),
            Mode::WorkStealing { pool } => {
                let num_chunks = len.div_ceil(chunk_size);
                pool.install(|| {
                    (0..num_chunks)
                        .into_par_iter()
                        .map(|chunk| {
                            let begin = chunk * chunk_size;
                            f(begin..len.min(begin + chunk_size))
                        })
                        .sum()
                })
            }
            Mode::WorkerPool { pool, num_threads } => {
                let per_worker = len.div_ceil(*num_threads);
                let total = CachePadded::new(AtomicUsize::new(0));
                pool.scope(|scope| {
                    for worker in 0..*num_threads {
                        let total = &total;
                        let f = &f;
                        scope.spawn(move |_| {
                            let begin = len.min(worker * per_worker);
                            let end = len.min(begin + per_worker);
                            if begin < end {
                                total.fetch_add(f(begin..end), Ordering::Relaxed);
                            }
                        });
                    }
                });
                total.load(Ordering::Relaxed)
            }
            Mode::ForkJoin { pool } => pool.install(|| bisect_sum(0..len, chunk_size, &f)),
        }
    }
}

fn bisect<F>(range: Range<usize>, grain: usize, f: &F)
where
    F: Fn(Range<usize>) + Sync,
{
    if range.len() <= grain {
        if !range.is_empty() {
            f(range);
        }
        return;
    }
    let mid = range.start + range.len() / 2;
    rayon::join(
        || bisect(range.start..mid, grain, f),
        || bisect(mid..range.end, grain, f),
    );
}

fn bisect_sum<F>(range: Range<usize>, grain: usize, f: &F) -> usize
where
    F: Fn(Range<usize>) -> usize + Sync,
{
    if range.len() <= grain {
        return if range.is_empty() { 0 } else { f(range) };
    }
    let mid = range.start + range.len() / 2;
    let (left, right) = rayon::join(
        || bisect_sum(range.start..mid, grain, f),
        || bisect_sum(mid..range.end, grain, f),
    );
    left + right
}
