/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use crossbeam_utils::CachePadded;
use dsi_progress_logger::ProgressLog;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::count;
use crate::csc::CscMatrix;
use crate::exec::{Executor, COLUMN_CHUNK};
use crate::labels::Labels;

/// Counts connected components by iterative minimum-label propagation.
///
/// Every vertex starts labeled with its own index; each round pushes the
/// smaller label of every edge onto the endpoint holding the larger one,
/// until a full round changes nothing. On convergence the label of a vertex
/// is the minimum vertex index of its component, so the component count is
/// the number of distinct labels.
pub(crate) fn by_propagation(
    csc: &CscMatrix,
    exec: &Executor,
    pl: &mut impl ProgressLog,
) -> Result<usize> {
    let labels = propagate(csc, exec, pl)?;
    count::distinct_labels(&labels)
}

/// Runs the propagation rounds to convergence and returns the label array.
///
/// Label reads are racy on purpose: a stale value is always ≥ the true
/// component minimum, so it can delay convergence but never corrupt it: an
/// update lost to a concurrent smaller store leaves some edge with
/// mismatched endpoints, which re-arms the flag on the next round.
/// Termination follows from the label sum strictly decreasing on every round
/// that reports a change.
fn propagate(csc: &CscMatrix, exec: &Executor, pl: &mut impl ProgressLog) -> Result<Labels> {
    let num_rows = csc.num_rows();
    let labels = Labels::new(num_rows)?;
    // Columns outside the vertex space cannot carry valid edges.
    let num_cols = csc.num_cols().min(num_rows);

    pl.item_name("round");
    pl.start("Propagating minimum labels...");

    let changed = CachePadded::new(AtomicBool::new(false));
    let mut rounds = 0;
    loop {
        changed.store(false, Ordering::Relaxed);

        exec.for_each(num_cols, COLUMN_CHUNK, |columns| {
            let mut chunk_changed = false;
            for c in columns {
                for &r in csc.column(c) {
                    if r as usize >= num_rows {
                        continue;
                    }
                    let lc = labels.get(c as u32);
                    let lr = labels.get(r);
                    if lc != lr {
                        // Push the minimum onto the endpoint holding the
                        // larger label; the other endpoint is left alone.
                        if lc < lr {
                            labels.set(r, lc);
                        } else {
                            labels.set(c as u32, lr);
                        }
                        chunk_changed = true;
                    }
                }
            }
            if chunk_changed {
                changed.store(true, Ordering::Relaxed);
            }
        });

        rounds += 1;
        pl.update();
        // The join above orders every worker store before this read.
        if !changed.load(Ordering::Relaxed) {
            break;
        }
    }

    pl.done();
    log::debug!("Labels converged after {rounds} rounds");

    Ok(labels)
}
