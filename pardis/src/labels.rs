/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicU32, Ordering};

/// How many times [`Labels::union_rem`] retries its CAS before falling back
/// to an unconditional release store.
const MAX_RETRIES: usize = 10;

/// One label per vertex, shared without locks.
///
/// The same array backs both engines, under two interpretations that are
/// never mixed within a run: a component tag (propagation) or a parent
/// pointer (union-find). In both cases every cell starts at its own index and
/// only ever decreases, so a racy read returns some past value that is still
/// an over-approximation of the final one.
///
/// Cells are atomic so that the hot loops can use relaxed loads and stores
/// instead of racy plain accesses; cross-phase visibility comes from the
/// executor's join barrier, not from the orderings here.
pub(crate) struct Labels(Box<[AtomicU32]>);

impl Labels {
    /// Allocates a label array of `n` cells, with `label[v] = v`.
    ///
    /// Allocation is fallible: on an out-of-memory condition an error is
    /// returned instead of aborting the process.
    pub(crate) fn new(n: usize) -> Result<Self> {
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(n)
            .context("Could not allocate the label array")?;
        cells.extend((0..n).map(|v| AtomicU32::new(v as u32)));
        Ok(Self(cells.into_boxed_slice()))
    }

    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    #[inline(always)]
    pub(crate) fn get(&self, v: u32) -> u32 {
        self.0[v as usize].load(Ordering::Relaxed)
    }

    #[inline(always)]
    pub(crate) fn set(&self, v: u32, label: u32) {
        self.0[v as usize].store(label, Ordering::Relaxed);
    }

    /// Returns the root of the tree containing `x`, compressing the path
    /// behind itself.
    ///
    /// Any value read from a cell is some ancestor of that cell, so stale
    /// reads only cost extra hops. The returned root may be obsolete the
    /// instant this returns: callers acting on root equality must re-find.
    pub(crate) fn find_compress(&self, x: u32) -> u32 {
        let mut root = x;
        loop {
            let parent = self.get(root);
            if parent == root {
                break;
            }
            root = parent;
        }

        let mut node = x;
        while node != root {
            let next = self.get(node);
            // Skips the redundant store when the node already points at the
            // root, and bounds the walk if another worker re-pointed it.
            if next == root {
                break;
            }
            self.set(node, root);
            node = next;
        }

        root
    }

    /// Unites the sets containing `a` and `b` using Rem's algorithm.
    ///
    /// The larger root is always linked under the smaller one, so every link
    /// strictly decreases a cell and no cycle can form under any
    /// interleaving. After [`MAX_RETRIES`] failed CAS attempts the link is
    /// published with one release store; cells only ever receive smaller
    /// values, so overwriting a concurrent link keeps the forest valid.
    pub(crate) fn union_rem(&self, a: u32, b: u32) {
        let mut a = a;
        let mut b = b;

        for _ in 0..MAX_RETRIES {
            a = self.find_compress(a);
            b = self.find_compress(b);
            if a == b {
                return;
            }
            if a > b {
                std::mem::swap(&mut a, &mut b);
            }
            match self.0[b as usize].compare_exchange(b, a, Ordering::Relaxed, Ordering::Relaxed) {
                Ok(_) => return,
                Err(observed) => b = observed,
            }
        }

        a = self.find_compress(a);
        b = self.find_compress(b);
        if a != b {
            if a > b {
                std::mem::swap(&mut a, &mut b);
            }
            self.0[b as usize].store(a, Ordering::Release);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_init() -> Result<()> {
        let labels = Labels::new(5)?;
        for v in 0..5 {
            assert_eq!(labels.get(v), v);
        }
        Ok(())
    }

    #[test]
    fn test_find_compress_flattens() -> Result<()> {
        let labels = Labels::new(5)?;
        // Chain 4 -> 3 -> 2 -> 1 -> 0.
        for v in 1..5 {
            labels.set(v, v - 1);
        }

        assert_eq!(labels.find_compress(4), 0);
        for v in 0..5 {
            assert_eq!(labels.get(v), 0);
        }
        Ok(())
    }

    #[test]
    fn test_union_canonical_ordering() -> Result<()> {
        let labels = Labels::new(4)?;
        labels.union_rem(3, 1);
        assert_eq!(labels.get(3), 1);
        assert_eq!(labels.get(1), 1);

        // Joining the two trees must link the larger root under the smaller.
        labels.union_rem(2, 0);
        labels.union_rem(3, 2);
        assert_eq!(labels.find_compress(1), 0);
        assert_eq!(labels.find_compress(3), 0);
        Ok(())
    }

    #[test]
    fn test_union_idempotent() -> Result<()> {
        let labels = Labels::new(3)?;
        labels.union_rem(0, 1);
        labels.union_rem(1, 0);
        labels.union_rem(0, 1);
        assert_eq!(labels.find_compress(1), 0);
        assert_eq!(labels.get(2), 2);
        Ok(())
    }
}
