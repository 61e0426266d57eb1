/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Matrix Market loader.
//!
//! Reads a sparse matrix in [Matrix Market coordinate
//! format](https://math.nist.gov/MatrixMarket/formats.html) as a 0/1
//! incidence pattern: entry values, when present, are ignored. Indices are
//! 1-based in the file and rebased to 0. Matrices declared `symmetric` (or
//! `skew-symmetric`/`hermitian`) store one triangle only, so the missing
//! orientation of every off-diagonal entry is reinstated; `general` matrices
//! are taken as stored, under the caller-guarantees-symmetry contract of the
//! engines.

use anyhow::{bail, ensure, Context, Result};
use pardis::CscMatrix;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Symmetry {
    General,
    Symmetric,
}

/// Loads a Matrix Market coordinate file into a CSC pattern.
pub fn load_matrix(path: impl AsRef<Path>) -> Result<CscMatrix> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Could not open {}", path.display()))?;
    read_matrix(BufReader::new(file))
        .with_context(|| format!("Could not parse {}", path.display()))
}

fn read_matrix(reader: impl BufRead) -> Result<CscMatrix> {
    let mut lines = reader.lines().enumerate();

    let (_, banner) = lines.next().context("The file is empty")?;
    let banner = banner.context("Could not read the banner line")?;
    let symmetry = parse_banner(&banner)?;

    let (line_number, size_line) = next_content_line(&mut lines)?.context("Missing size line")?;
    let (num_rows, num_cols, num_entries) = parse_size(&size_line)
        .with_context(|| format!("Invalid size line at line {}", line_number + 1))?;
    ensure!(
        num_rows <= u32::MAX as usize && num_cols <= u32::MAX as usize,
        "Matrix dimensions {num_rows}×{num_cols} exceed the 32-bit index space"
    );

    let mut entries = Vec::with_capacity(match symmetry {
        Symmetry::General => num_entries,
        Symmetry::Symmetric => 2 * num_entries,
    });

    for _ in 0..num_entries {
        let (line_number, line) = next_content_line(&mut lines)?
            .with_context(|| format!("Expected {num_entries} entries"))?;
        let (row, col) = parse_entry(&line, num_rows, num_cols)
            .with_context(|| format!("Invalid entry at line {}", line_number + 1))?;
        entries.push((row, col));
        if symmetry == Symmetry::Symmetric && row != col {
            entries.push((col, row));
        }
    }

    CscMatrix::from_entries(num_rows, num_cols, &entries)
}

fn parse_banner(banner: &str) -> Result<Symmetry> {
    let fields: Vec<&str> = banner.split_whitespace().collect();
    ensure!(
        fields.len() == 5 && fields[0] == "%%MatrixMarket",
        "Invalid Matrix Market banner: {banner:?}"
    );
    ensure!(
        fields[1].eq_ignore_ascii_case("matrix"),
        "Unsupported object {:?}",
        fields[1]
    );
    ensure!(
        fields[2].eq_ignore_ascii_case("coordinate"),
        "Only the coordinate (sparse) format is supported, got {:?}",
        fields[2]
    );
    match fields[4].to_ascii_lowercase().as_str() {
        "general" => Ok(Symmetry::General),
        "symmetric" | "skew-symmetric" | "hermitian" => Ok(Symmetry::Symmetric),
        symmetry => bail!("Unsupported symmetry {symmetry:?}"),
    }
}

/// Returns the next line that is neither blank nor a `%` comment.
fn next_content_line(
    lines: &mut impl Iterator<Item = (usize, std::io::Result<String>)>,
) -> Result<Option<(usize, String)>> {
    for (line_number, line) in lines {
        let line = line.with_context(|| format!("I/O error at line {}", line_number + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }
        return Ok(Some((line_number, line)));
    }
    Ok(None)
}

fn parse_size(line: &str) -> Result<(usize, usize, usize)> {
    let mut fields = line.split_whitespace();
    let mut next = |name: &str| -> Result<usize> {
        fields
            .next()
            .with_context(|| format!("Missing {name}"))?
            .parse::<usize>()
            .with_context(|| format!("Invalid {name}"))
    };
    Ok((next("number of rows")?, next("number of columns")?, next("number of entries")?))
}

fn parse_entry(line: &str, num_rows: usize, num_cols: usize) -> Result<(u32, u32)> {
    let mut fields = line.split_whitespace();
    let mut index = |name: &str, bound: usize| -> Result<u32> {
        let value = fields
            .next()
            .with_context(|| format!("Missing {name} index"))?
            .parse::<usize>()
            .with_context(|| format!("Invalid {name} index"))?;
        ensure!(
            (1..=bound).contains(&value),
            "The {name} index {value} is out of range [1, {bound}]"
        );
        Ok((value - 1) as u32)
    };
    let row = index("row", num_rows)?;
    let col = index("column", num_cols)?;
    // A trailing value, if any, is ignored: the pattern is what matters.
    Ok((row, col))
}

#[cfg(test)]
mod test {
    use super::*;
    use dsi_progress_logger::no_logging;
    use pardis::{count_components, Parallelism, Variant};
    use std::io::Write;

    fn load_str(contents: &str) -> Result<CscMatrix> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(contents.as_bytes())?;
        load_matrix(file.path())
    }

    #[test]
    fn test_symmetric_pattern() -> Result<()> {
        // The lower triangle of a triangle plus two isolated vertices.
        let csc = load_str(
            "%%MatrixMarket matrix coordinate pattern symmetric\n\
             % a comment\n\
             \n\
             5 5 3\n\
             2 1\n\
             3 1\n\
             3 2\n",
        )?;
        assert_eq!(csc.num_rows(), 5);
        assert_eq!(csc.num_nonzeros(), 6);
        assert_eq!(
            count_components(
                &csc,
                2,
                Variant::UnionFind,
                Parallelism::WorkStealing,
                no_logging![]
            )?,
            3
        );
        Ok(())
    }

    #[test]
    fn test_general_with_values() -> Result<()> {
        let csc = load_str(
            "%%MatrixMarket matrix coordinate real general\n\
             3 3 2\n\
             2 1 1.0\n\
             1 2 1.0\n",
        )?;
        assert_eq!(csc.num_nonzeros(), 2);
        assert_eq!(csc.column(0), &[1]);
        assert_eq!(csc.column(1), &[0]);
        Ok(())
    }

    #[test]
    fn test_diagonal_not_duplicated() -> Result<()> {
        let csc = load_str(
            "%%MatrixMarket matrix coordinate pattern symmetric\n\
             2 2 2\n\
             1 1\n\
             2 1\n",
        )?;
        assert_eq!(csc.num_nonzeros(), 3);
        Ok(())
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(load_str("").is_err());
        assert!(load_str("%%MatrixMarket matrix array real general\n2 2\n").is_err());
        assert!(load_str("%%MatrixMarket matrix coordinate pattern general\n2 2 1\n3 1\n").is_err());
        assert!(load_str("%%MatrixMarket matrix coordinate pattern general\n2 2 1\n0 1\n").is_err());
        assert!(load_str("%%MatrixMarket matrix coordinate pattern general\n2 2 2\n1 1\n").is_err());
    }
}
