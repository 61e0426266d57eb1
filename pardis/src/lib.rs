/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![doc = include_str!("../README.md")]

use anyhow::Result;
use dsi_progress_logger::ProgressLog;

mod count;
mod csc;
mod exec;
mod labels;
mod propagation;
mod union_find;

pub use csc::CscMatrix;
pub use exec::Parallelism;
use exec::Executor;

/// The algorithm families computing the component count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Iterative minimum-label propagation with a convergence flag.
    Propagation,
    /// Lock-free union-find using Rem's algorithm.
    UnionFind,
}

/// Counts the connected components of the undirected graph whose symmetric
/// pattern is stored in `csc`.
///
/// The result is a property of the graph alone: it does not depend on
/// `num_threads`, `variant` or `parallelism`, which only select how the work
/// is carried out. An empty vertex space yields 0 without touching the
/// matrix.
///
/// # Errors
///
/// Fails if the thread pool cannot be built or if the label array or the
/// counting bitmap cannot be allocated; partial allocations are released.
///
/// # Examples
///
/// ```
/// use dsi_progress_logger::no_logging;
/// use pardis::{count_components, CscMatrix, Parallelism, Variant};
///
/// let csc = CscMatrix::from_arcs(4, [(0, 1), (2, 3)])?;
/// let count = count_components(
///     &csc,
///     2,
///     Variant::Propagation,
///     Parallelism::ThreadPool,
///     no_logging![],
/// )?;
/// assert_eq!(count, 2);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn count_components(
    csc: &CscMatrix,
    num_threads: usize,
    variant: Variant,
    parallelism: Parallelism,
    pl: &mut impl ProgressLog,
) -> Result<usize> {
    if csc.num_rows() == 0 {
        return Ok(0);
    }

    let exec = Executor::new(parallelism, num_threads)?;
    match variant {
        Variant::Propagation => propagation::by_propagation(csc, &exec, pl),
        Variant::UnionFind => union_find::by_union_find(csc, &exec, pl),
    }
}
