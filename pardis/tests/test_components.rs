/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use dsi_progress_logger::no_logging;
use pardis::{count_components, CscMatrix, Parallelism, Variant};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const VARIANTS: [Variant; 2] = [Variant::Propagation, Variant::UnionFind];
const PARALLELISMS: [Parallelism; 4] = [
    Parallelism::Sequential,
    Parallelism::WorkStealing,
    Parallelism::ThreadPool,
    Parallelism::ForkJoin,
];

/// Checks that every variant, parallelism and thread count agrees on the
/// expected component count.
fn assert_count(csc: &CscMatrix, expected: usize) -> Result<()> {
    for variant in VARIANTS {
        for parallelism in PARALLELISMS {
            for num_threads in [1, 4] {
                let count = count_components(csc, num_threads, variant, parallelism, no_logging![])?;
                assert_eq!(
                    count, expected,
                    "{variant:?} over {parallelism:?} with {num_threads} threads"
                );
            }
        }
    }
    Ok(())
}

#[test]
fn test_empty_graph() -> Result<()> {
    let csc = CscMatrix::new(5, 5, vec![0, 0, 0, 0, 0, 0], vec![])?;
    assert_count(&csc, 5)
}

#[test]
fn test_empty_vertex_space() -> Result<()> {
    let csc = CscMatrix::new(0, 0, vec![0], vec![])?;
    assert_count(&csc, 0)
}

#[test]
fn test_triangle() -> Result<()> {
    let csc = CscMatrix::new(3, 3, vec![0, 2, 4, 6], vec![1, 2, 0, 2, 0, 1])?;
    assert_count(&csc, 1)
}

#[test]
fn test_two_disjoint_edges() -> Result<()> {
    let csc = CscMatrix::new(4, 4, vec![0, 1, 2, 3, 4], vec![1, 0, 3, 2])?;
    assert_count(&csc, 2)
}

#[test]
fn test_path() -> Result<()> {
    let csc = CscMatrix::new(
        6,
        6,
        vec![0, 1, 3, 5, 7, 9, 10],
        vec![1, 0, 2, 1, 3, 2, 4, 3, 5, 4],
    )?;
    assert_count(&csc, 1)
}

#[test]
fn test_star() -> Result<()> {
    let csc = CscMatrix::from_arcs(6, (1..6).map(|leaf| (0, leaf)))?;
    assert_eq!(csc.num_nonzeros(), 10);
    assert_count(&csc, 1)
}

#[test]
fn test_pairs_and_singletons() -> Result<()> {
    let csc = CscMatrix::from_arcs(8, [(0, 1), (2, 3), (4, 5)])?;
    assert_count(&csc, 5)
}

#[test]
fn test_self_loops_and_duplicates() -> Result<()> {
    let csc = CscMatrix::from_arcs(4, [(0, 0), (1, 2), (1, 2), (2, 1)])?;
    assert_count(&csc, 3)
}

#[test]
fn test_rectangular_input() -> Result<()> {
    // Four columns over a 3-vertex space: the entries of column 3 and every
    // row index past 2 are ignored.
    let csc = CscMatrix::new(3, 4, vec![0, 1, 2, 3, 4], vec![1, 0, 3, 0])?;
    assert_count(&csc, 2)
}

#[test]
fn test_determinism_and_idempotence() -> Result<()> {
    let csc = CscMatrix::from_arcs(50, (0..49).map(|v| (v, v + 1)))?;
    for variant in VARIANTS {
        for parallelism in PARALLELISMS {
            let first = count_components(&csc, 4, variant, parallelism, no_logging![])?;
            let second = count_components(&csc, 4, variant, parallelism, no_logging![])?;
            assert_eq!(first, 1);
            assert_eq!(first, second, "{variant:?} over {parallelism:?}");
        }
    }
    Ok(())
}

/// Sequential reference count by path-halving union-find, independent of the
/// engines under test.
fn reference_count(num_nodes: usize, arcs: &[(u32, u32)]) -> usize {
    let mut parent: Vec<u32> = (0..num_nodes as u32).collect();
    fn find(parent: &mut [u32], mut v: u32) -> u32 {
        while parent[v as usize] != v {
            parent[v as usize] = parent[parent[v as usize] as usize];
            v = parent[v as usize];
        }
        v
    }
    for &(u, v) in arcs {
        let ru = find(&mut parent, u);
        let rv = find(&mut parent, v);
        if ru != rv {
            parent[ru.max(rv) as usize] = ru.min(rv);
        }
    }
    (0..num_nodes as u32).filter(|&v| find(&mut parent, v) == v).count()
}

#[test]
fn test_random_graphs() -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(0);
    for num_nodes in [1, 2, 13, 64, 201] {
        for density in [0, 1, 2, 4] {
            let num_arcs = num_nodes * density / 2;
            let arcs: Vec<(u32, u32)> = (0..num_arcs)
                .map(|_| {
                    (
                        rng.random_range(0..num_nodes as u32),
                        rng.random_range(0..num_nodes as u32),
                    )
                })
                .collect();
            let csc = CscMatrix::from_arcs(num_nodes, arcs.iter().copied())?;
            assert_count(&csc, reference_count(num_nodes, &arcs))?;
        }
    }
    Ok(())
}

#[test]
fn test_many_threads_on_tiny_graph() -> Result<()> {
    let csc = CscMatrix::from_arcs(2, [(0, 1)])?;
    for variant in VARIANTS {
        for parallelism in PARALLELISMS {
            let count = count_components(&csc, 16, variant, parallelism, no_logging![])?;
            assert_eq!(count, 1, "{variant:?} over {parallelism:?}");
        }
    }
    Ok(())
}
