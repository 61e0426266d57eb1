/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::{ensure, Context, Result};

/// A sparse binary matrix in compressed-sparse-column form.
///
/// Nonzero entries are implicitly 1: only column pointers and row indices are
/// stored. The rows with a nonzero in column `c` are
/// `row_idx[col_ptr[c]..col_ptr[c + 1]]`, in no particular order.
///
/// The matrix is immutable after construction and may be shared freely across
/// threads.
pub struct CscMatrix {
    num_rows: usize,
    num_cols: usize,
    col_ptr: Box<[usize]>,
    row_idx: Box<[u32]>,
}

impl CscMatrix {
    /// Creates a new matrix from raw CSC arrays.
    ///
    /// `col_ptr` must have length `num_cols + 1`, start at 0, be monotone
    /// non-decreasing, and end at `row_idx.len()`. Row indices are *not*
    /// checked against `num_rows`: out-of-range entries are tolerated and
    /// skipped during traversal, which makes rectangular inputs usable with a
    /// vertex space of `num_rows` vertices.
    pub fn new(
        num_rows: usize,
        num_cols: usize,
        col_ptr: Vec<usize>,
        row_idx: Vec<u32>,
    ) -> Result<Self> {
        ensure!(
            num_rows <= u32::MAX as usize,
            "Too many rows ({num_rows}): row indices are 32-bit"
        );
        ensure!(
            col_ptr.len() == num_cols + 1,
            "Column-pointer array has length {} instead of {}",
            col_ptr.len(),
            num_cols + 1
        );
        ensure!(col_ptr[0] == 0, "Column pointers must start at 0");
        ensure!(
            col_ptr.windows(2).all(|w| w[0] <= w[1]),
            "Column pointers must be monotone non-decreasing"
        );
        ensure!(
            col_ptr[num_cols] == row_idx.len(),
            "Column pointers end at {} but there are {} stored entries",
            col_ptr[num_cols],
            row_idx.len()
        );

        Ok(Self {
            num_rows,
            num_cols,
            col_ptr: col_ptr.into_boxed_slice(),
            row_idx: row_idx.into_boxed_slice(),
        })
    }

    /// Assembles a matrix from `(row, column)` entries, stored as given.
    ///
    /// Entries are distributed into columns with a counting sort; duplicates
    /// and self-loops are kept as-is.
    pub fn from_entries(num_rows: usize, num_cols: usize, entries: &[(u32, u32)]) -> Result<Self> {
        let mut col_ptr = Vec::new();
        col_ptr
            .try_reserve_exact(num_cols + 1)
            .context("Could not allocate the column pointers")?;
        col_ptr.resize(num_cols + 1, 0);
        let mut row_idx = Vec::new();
        row_idx
            .try_reserve_exact(entries.len())
            .context("Could not allocate the row indices")?;
        row_idx.resize(entries.len(), 0);

        for &(_, c) in entries {
            ensure!(
                (c as usize) < num_cols,
                "Column index {c} out of range (the matrix has {num_cols} columns)"
            );
            col_ptr[c as usize + 1] += 1;
        }
        for c in 0..num_cols {
            col_ptr[c + 1] += col_ptr[c];
        }

        // col_ptr[c] is now the write cursor of column c; after the fill it is
        // back to being the start of column c + 1, so a single shift restores
        // the pointers.
        for &(r, c) in entries {
            row_idx[col_ptr[c as usize]] = r;
            col_ptr[c as usize] += 1;
        }
        for c in (1..=num_cols).rev() {
            col_ptr[c] = col_ptr[c - 1];
        }
        col_ptr[0] = 0;

        Self::new(num_rows, num_cols, col_ptr, row_idx)
    }

    /// Builds the symmetric pattern of an undirected graph from an arc list.
    ///
    /// Both orientations of every arc are stored, except for self-loops,
    /// which are stored once. The result is a square `num_nodes` ×
    /// `num_nodes` matrix.
    pub fn from_arcs(num_nodes: usize, arcs: impl IntoIterator<Item = (u32, u32)>) -> Result<Self> {
        let mut entries = Vec::new();
        for (u, v) in arcs {
            entries.push((u, v));
            if u != v {
                entries.push((v, u));
            }
        }
        Self::from_entries(num_nodes, num_nodes, &entries)
    }

    /// Returns the number of rows.
    #[inline(always)]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Returns the number of columns.
    #[inline(always)]
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// Returns the number of stored entries.
    #[inline(always)]
    pub fn num_nonzeros(&self) -> usize {
        self.row_idx.len()
    }

    /// Returns the row indices stored in column `c`.
    #[inline(always)]
    pub fn column(&self, c: usize) -> &[u32] {
        &self.row_idx[self.col_ptr[c]..self.col_ptr[c + 1]]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_new_rejects_bad_pointers() {
        assert!(CscMatrix::new(3, 3, vec![0, 1, 2], vec![0, 1]).is_err());
        assert!(CscMatrix::new(3, 3, vec![1, 1, 2, 2], vec![0, 1]).is_err());
        assert!(CscMatrix::new(3, 3, vec![0, 2, 1, 2], vec![0, 1]).is_err());
        assert!(CscMatrix::new(3, 3, vec![0, 1, 2, 3], vec![0, 1]).is_err());
    }

    #[test]
    fn test_from_entries() -> Result<()> {
        let csc = CscMatrix::from_entries(4, 4, &[(1, 0), (0, 1), (3, 2), (2, 3), (1, 2)])?;
        assert_eq!(csc.num_nonzeros(), 5);
        assert_eq!(csc.column(0), &[1]);
        assert_eq!(csc.column(1), &[0]);
        assert_eq!(csc.column(2), &[3, 1]);
        assert_eq!(csc.column(3), &[2]);
        Ok(())
    }

    #[test]
    fn test_from_entries_rejects_bad_column() {
        assert!(CscMatrix::from_entries(4, 4, &[(0, 4)]).is_err());
    }

    #[test]
    fn test_from_arcs_symmetric() -> Result<()> {
        let csc = CscMatrix::from_arcs(3, [(0, 1), (1, 2), (2, 2)])?;
        assert_eq!(csc.num_rows(), 3);
        assert_eq!(csc.num_cols(), 3);
        // Two orientations per proper arc, one for the self-loop.
        assert_eq!(csc.num_nonzeros(), 5);
        assert_eq!(csc.column(0), &[1]);
        assert_eq!(csc.column(1), &[0, 2]);
        assert_eq!(csc.column(2), &[1, 2]);
        Ok(())
    }
}
