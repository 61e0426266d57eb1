/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use dsi_progress_logger::ProgressLog;

use crate::csc::CscMatrix;
use crate::exec::{Executor, COLUMN_CHUNK, VERTEX_CHUNK};
use crate::labels::Labels;

/// Counts connected components with lock-free union-find.
///
/// Three phases, separated by join barriers: every stored edge unites its
/// endpoints; every path is flattened so that each vertex points directly at
/// its root; the roots are counted. The union phase is scheduled dynamically
/// because per-column edge counts are heavily skewed on scale-free graphs;
/// the other phases have uniform per-vertex work.
pub(crate) fn by_union_find(
    csc: &CscMatrix,
    exec: &Executor,
    pl: &mut impl ProgressLog,
) -> Result<usize> {
    let labels = unite_and_flatten(csc, exec, pl)?;

    let count = exec.sum(labels.len(), VERTEX_CHUNK, |vertices| {
        vertices.filter(|&v| labels.get(v as u32) == v as u32).count()
    });

    Ok(count)
}

/// Runs the union and flatten phases and returns the parent array, in which
/// every vertex points directly at the root of its component.
fn unite_and_flatten(csc: &CscMatrix, exec: &Executor, pl: &mut impl ProgressLog) -> Result<Labels> {
    let num_rows = csc.num_rows();
    let labels = Labels::new(num_rows)?;
    let num_cols = csc.num_cols().min(num_rows);

    pl.item_name("phase");
    pl.start("Building the disjoint-set forest...");

    exec.for_each(num_cols, COLUMN_CHUNK, |columns| {
        for c in columns {
            for &r in csc.column(c) {
                // Rectangular inputs store rows outside the vertex space;
                // those entries are not edges.
                if (r as usize) < num_rows {
                    labels.union_rem(r, c as u32);
                }
            }
        }
    });
    pl.update();

    // The join above publishes every link to the flatten pass.
    exec.for_each_static(num_rows, VERTEX_CHUNK, |vertices| {
        for v in vertices {
            labels.find_compress(v as u32);
        }
    });
    pl.update();
    pl.done();

    Ok(labels)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::exec::Parallelism;
    use dsi_progress_logger::no_logging;

    #[test]
    fn test_roots_are_fixed_points() -> Result<()> {
        let csc = CscMatrix::from_arcs(8, [(0, 1), (1, 2), (2, 3), (5, 6), (6, 7)])?;
        for parallelism in [Parallelism::Sequential, Parallelism::ForkJoin] {
            let exec = Executor::new(parallelism, 4)?;
            let labels = unite_and_flatten(&csc, &exec, no_logging![])?;
            for v in 0..8 {
                assert_eq!(labels.get(labels.get(v)), labels.get(v));
            }
        }
        Ok(())
    }

    #[test]
    fn test_edge_closure() -> Result<()> {
        let csc = CscMatrix::from_arcs(6, [(0, 3), (3, 5), (1, 2)])?;
        let exec = Executor::new(Parallelism::WorkStealing, 2)?;
        let labels = unite_and_flatten(&csc, &exec, no_logging![])?;
        for c in 0..csc.num_cols() {
            for &r in csc.column(c) {
                assert_eq!(labels.find_compress(r), labels.find_compress(c as u32));
            }
        }
        Ok(())
    }

    #[test]
    fn test_out_of_range_rows_are_skipped() -> Result<()> {
        // A 3-vertex space with one stored entry pointing outside it.
        let csc = CscMatrix::new(3, 3, vec![0, 1, 1, 1], vec![7])?;
        let exec = Executor::new(Parallelism::Sequential, 1)?;
        assert_eq!(by_union_find(&csc, &exec, no_logging![])?, 3);
        Ok(())
    }
}
