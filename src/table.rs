/*! Node-potential tables.

A potential table is a plain text file with one record per line. Lines which
start with the comment marker are ignored. Every other line is a list of
whitespace separated fields, the last of which is the potential at one node of
the cable. The `n`-th retained line belongs to node `n`. */

use crate::error::{Result, StimError};
use std::io::BufRead;
use std::path::Path;
use tracing::debug;

/// Comment marker used by the field solver exports.
pub const DEFAULT_COMMENT_MARKER: char = '%';

/// Ordered per-node potentials, in node order.
#[derive(Debug, Clone, PartialEq)]
pub struct PotentialTable {
    values: Vec<f64>,
}

impl PotentialTable {
    pub fn new(values: Vec<f64>) -> PotentialTable {
        PotentialTable { values }
    }

    /// A table of `len` zeros.
    pub fn zeros(len: usize) -> PotentialTable {
        PotentialTable::new(vec![0.0; len])
    }

    /** Parse a table from any buffered reader.

    Blank lines are skipped along with comments. A line whose last field is
    not a number fails with `MalformedLine`, numbered from 1. */
    pub fn parse(reader: impl BufRead, comment_marker: char) -> Result<PotentialTable> {
        let mut values = vec![];
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.starts_with(comment_marker) {
                continue;
            }
            let last = match line.split_whitespace().last() {
                Some(token) => token,
                None => continue,
            };
            let value = last.parse::<f64>().map_err(|_| StimError::MalformedLine {
                line: idx + 1,
                content: line.clone(),
            })?;
            values.push(value);
        }
        return Ok(PotentialTable::new(values));
    }

    pub fn from_file(path: impl AsRef<Path>, comment_marker: char) -> Result<PotentialTable> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let table = PotentialTable::parse(std::io::BufReader::new(file), comment_marker)?;
        debug!(path = %path.display(), values = table.len(), "loaded potential table");
        Ok(table)
    }

    /// Check that there is exactly one value per node.
    pub fn expect_len(&self, nodes: usize) -> Result<()> {
        if self.values.len() != nodes {
            return Err(StimError::TableShape {
                expected: nodes,
                actual: self.values.len(),
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

impl std::ops::Index<usize> for PotentialTable {
    type Output = f64;

    fn index(&self, node: usize) -> &f64 {
        &self.values[node]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
% Model: fiber.mph
% x y z V (V)
0 0 -4000 1.25E-6
0 0 -3900 2.5E-6

0 0 -3800 -3.75e-6
";

    #[test]
    fn skips_comments_and_takes_last_field() {
        let table = PotentialTable::parse(SAMPLE.as_bytes(), '%').unwrap();
        assert_eq!(table.values(), &[1.25e-6, 2.5e-6, -3.75e-6]);
        assert_eq!(table[1], 2.5e-6);
    }

    #[test]
    fn comment_marker_is_configurable() {
        let text = "# header\n1 2\n# 9 9 9 oops\n3 4\n";
        let table = PotentialTable::parse(text.as_bytes(), '#').unwrap();
        assert_eq!(table.values(), &[2.0, 4.0]);
    }

    #[test]
    fn marker_only_counts_in_first_column() {
        let text = "1 %\n";
        match PotentialTable::parse(text.as_bytes(), '%') {
            Err(StimError::MalformedLine { line, .. }) => assert_eq!(line, 1),
            other => panic!("expected malformed line, got {:?}", other),
        }
    }

    #[test]
    fn malformed_line_reports_line_number() {
        let text = "% header\n0 0 1.0\n0 0 volts\n";
        match PotentialTable::parse(text.as_bytes(), '%') {
            Err(StimError::MalformedLine { line, content }) => {
                assert_eq!(line, 3);
                assert_eq!(content, "0 0 volts");
            }
            other => panic!("expected malformed line, got {:?}", other),
        }
    }

    #[test]
    fn length_check() {
        let table = PotentialTable::zeros(81);
        assert!(table.expect_len(81).is_ok());
        match table.expect_len(79) {
            Err(StimError::TableShape { expected, actual }) => {
                assert_eq!(expected, 79);
                assert_eq!(actual, 81);
            }
            other => panic!("expected shape error, got {:?}", other),
        }
    }
}
