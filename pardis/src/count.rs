/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::labels::Labels;
use anyhow::{Context, Result};

/// Counts the distinct values in a converged label array.
///
/// Labels lie in `[0, n)`, since they start at the vertex index and only
/// ever decrease, so one bit per candidate value suffices: a single pass
/// marks each label in a bitmap of `⌈n/64⌉` words, and a popcount sweep adds
/// up the marks. The pass is sequential; it is a vanishing fraction of the
/// total work.
pub(crate) fn distinct_labels(labels: &Labels) -> Result<usize> {
    let n = labels.len();
    let mut bitmap = Vec::new();
    bitmap
        .try_reserve_exact(n.div_ceil(64))
        .context("Could not allocate the counting bitmap")?;
    bitmap.resize(n.div_ceil(64), 0u64);

    for v in 0..n {
        let label = labels.get(v as u32) as usize;
        bitmap[label >> 6] |= 1 << (label & 63);
    }

    Ok(bitmap.iter().map(|word| word.count_ones() as usize).sum())
}
