use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{error, warn};

use crate::error::{GraphError, Result};
use crate::value::ParseLine;

/// Reads newline-delimited records from one file in fixed-size batches.
pub struct LineParser<R = BufReader<File>> {
    reader: R,
    path: PathBuf,
    strict: bool,
    line: String,
    line_no: usize,
}

impl LineParser {
    pub fn open(path: &Path, strict: bool) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            error!("Failed to open file: {}.", path.display());
            GraphError::io(path, e)
        })?;
        Ok(Self::from_reader(BufReader::new(file), path, strict))
    }
}

impl<R: BufRead> LineParser<R> {
    pub fn from_reader(reader: R, path: &Path, strict: bool) -> Self {
        Self {
            reader,
            path: path.to_path_buf(),
            strict,
            line: String::new(),
            line_no: 0,
        }
    }

    /// Clears `values` and fills it with up to `batch` records.
    ///
    /// Returns `Ok(false)` once the file is exhausted and nothing was read.
    /// Blank lines are skipped; other bad lines fail the call in strict mode
    /// and are logged and skipped otherwise.
    pub fn next_batch<T: ParseLine>(&mut self, batch: usize, values: &mut Vec<T>) -> Result<bool> {
        values.clear();

        while values.len() < batch {
            self.line.clear();
            let n = self
                .reader
                .read_line(&mut self.line)
                .map_err(|e| GraphError::io(&self.path, e))?;
            if n == 0 {
                break;
            }
            self.line_no += 1;

            let line = self.line.trim_end_matches(['\n', '\r']);
            if line.trim().is_empty() {
                continue;
            }

            match T::parse_line(line) {
                Ok(value) => values.push(value),
                Err(e) if self.strict || !e.is_record_error() => {
                    error!(
                        "{}:{}: rejected record: {}",
                        self.path.display(),
                        self.line_no,
                        e
                    );
                    return Err(e);
                }
                Err(e) => {
                    warn!("{}:{}: skipping line: {}", self.path.display(), self.line_no, e);
                }
            }
        }

        Ok(!values.is_empty())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{AdjValue, EdgeValue};
    use std::io::Cursor;

    fn parser(text: &str, strict: bool) -> LineParser<Cursor<Vec<u8>>> {
        LineParser::from_reader(Cursor::new(text.as_bytes().to_vec()), Path::new("mem"), strict)
    }

    #[test]
    fn test_batches() {
        let mut parser = parser("1 2\n\n2 3 0.5\n3 4\r\n4 5\n5 6\n", true);
        let mut edges: Vec<EdgeValue> = Vec::new();

        assert!(parser.next_batch(2, &mut edges).unwrap());
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[1].weight, 0.5);

        assert!(parser.next_batch(2, &mut edges).unwrap());
        assert_eq!(edges[0].src_node, 3);
        assert_eq!(edges[0].dst_node, 4);

        assert!(parser.next_batch(2, &mut edges).unwrap());
        assert_eq!(edges.len(), 1);

        assert!(!parser.next_batch(2, &mut edges).unwrap());
        assert!(edges.is_empty());
    }

    #[test]
    fn test_strict_rejects_bad_line() {
        let mut parser = parser("0 1:1.0\n1 oops\n2 0:1.0\n", true);
        let mut values: Vec<AdjValue> = Vec::new();
        let err = parser.next_batch(10, &mut values).unwrap_err();
        assert!(matches!(err, GraphError::MalformedLine { .. }));
    }

    #[test]
    fn test_lenient_skips_bad_line() {
        let mut parser = parser("0 1:1.0\n1 oops\n2 0:20\n3 0:1.0\n", false);
        let mut values: Vec<AdjValue> = Vec::new();
        assert!(parser.next_batch(10, &mut values).unwrap());
        let nodes: Vec<u64> = values.iter().map(|v| v.node).collect();
        assert_eq!(nodes, vec![0, 3]);
    }
}
