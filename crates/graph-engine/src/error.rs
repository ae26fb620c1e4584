//! Error types for graph-engine

use std::path::PathBuf;
use thiserror::Error;

use crate::NodeId;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Debug, Error)]
pub enum GraphError {
    // Configuration
    #[error("no input files under {0:?}")]
    NoInputFiles(PathBuf),

    #[error("node {node} has namespace id {ns_id} which is not in the namespace config")]
    UnknownNamespace { node: NodeId, ns_id: u16 },

    #[error("duplicate namespace id {0} in namespace config")]
    DuplicateNamespace(u16),

    #[error("namespace config {0:?} has no valid entry")]
    EmptyNamespaceConfig(PathBuf),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    // Data integrity
    #[error("need unique node in the {kind} file, got duplicate node: {node}")]
    DuplicateNode { kind: &'static str, node: NodeId },

    #[error("weight {0} out of range, weight should be in [-10, 10]")]
    WeightOutOfRange(f32),

    #[error("malformed line {line:?}: {reason}")]
    MalformedLine { line: String, reason: String },

    #[error("index inconsistency: {0}")]
    IndexInconsistency(String),

    // Sampler configuration
    #[error("invalid sampling weights: {0}")]
    InvalidWeights(String),

    #[error("{0} is not supported")]
    Unsupported(&'static str),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("worker thread {0} panicked")]
    WorkerPanicked(usize),

    #[error("{failed} of {total} workers failed, first error: {first}")]
    LoadFailed {
        failed: usize,
        total: usize,
        first: Box<GraphError>,
    },
}

impl GraphError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(line: &str, reason: impl Into<String>) -> Self {
        Self::MalformedLine {
            line: line.to_string(),
            reason: reason.into(),
        }
    }

    /// The first worker error behind a `LoadFailed`, or `self`.
    pub fn root_cause(&self) -> &GraphError {
        match self {
            GraphError::LoadFailed { first, .. } => first.root_cause(),
            other => other,
        }
    }

    /// Owned form of [`GraphError::root_cause`].
    pub fn into_root_cause(self) -> GraphError {
        match self {
            GraphError::LoadFailed { first, .. } => first.into_root_cause(),
            other => other,
        }
    }

    /// True for errors that reject one record rather than the whole input.
    pub fn is_record_error(&self) -> bool {
        matches!(
            self,
            GraphError::MalformedLine { .. } | GraphError::WeightOutOfRange(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_io_error_keeps_path_and_source() {
        let err = GraphError::io(
            "/data/part-0",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(&err, GraphError::Io { path, .. } if path.ends_with("part-0")));
        assert!(err.to_string().contains("part-0"));
        assert_eq!(err.source().map(|e| e.to_string()), Some("gone".to_string()));
    }

    #[test]
    fn test_root_cause_unwraps_nested_failures() {
        let err = GraphError::LoadFailed {
            failed: 1,
            total: 2,
            first: Box::new(GraphError::LoadFailed {
                failed: 1,
                total: 1,
                first: Box::new(GraphError::InvalidWeights("w".into())),
            }),
        };
        assert!(matches!(err.root_cause(), GraphError::InvalidWeights(_)));
        assert!(matches!(err.into_root_cause(), GraphError::InvalidWeights(_)));
    }
}
