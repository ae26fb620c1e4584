use std::path::Path;
use std::sync::{Mutex, PoisonError};

use tracing::{debug, info};

use super::{list_files, parallel_process, BATCH};
use crate::error::Result;
use crate::line_parser::LineParser;
use crate::value::NodeAndLabelValue;
use crate::NodeId;

/// Labelled training instances, `<node> <label>...` per line.
#[derive(Debug, Clone, Default)]
pub struct InstanceLoader {
    insts: Vec<NodeId>,
    labels_list: Vec<Vec<i32>>,
}

impl InstanceLoader {
    pub fn create(dir: &Path, thread_num: usize) -> Result<Self> {
        info!("Loading files from dir: {}.", dir.display());
        let files = list_files(dir)?;
        let thread_num = thread_num.clamp(1, files.len());
        let shared = Mutex::new(Self::default());

        parallel_process(&files, thread_num, |files, thread_id| {
            let mut values: Vec<NodeAndLabelValue> = Vec::with_capacity(BATCH);
            for file in files {
                debug!("Thread: {} is processing file: {}.", thread_id, file.display());
                let mut parser = LineParser::open(file, true)?;
                while parser.next_batch(BATCH, &mut values)? {
                    let mut shared = shared.lock().unwrap_or_else(PoisonError::into_inner);
                    for value in values.drain(..) {
                        shared.insts.push(value.node);
                        shared.labels_list.push(value.labels);
                    }
                }
            }
            Ok(())
        })?;

        let loader = shared.into_inner().unwrap_or_else(PoisonError::into_inner);
        info!("Loaded {} instances.", loader.insts.len());
        Ok(loader)
    }

    pub fn insts(&self) -> &[NodeId] {
        &self.insts
    }

    /// Labels of `insts()[i]` at position `i`.
    pub fn labels_list(&self) -> &[Vec<i32>] {
        &self.labels_list
    }

    pub fn len(&self) -> usize {
        self.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_labels_stay_with_their_node() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a"), "1 0\n2 1 1\n").unwrap();
        fs::write(dir.path().join("b"), "3 1\n").unwrap();

        let loader = InstanceLoader::create(dir.path(), 4).unwrap();
        assert_eq!(loader.len(), 3);
        for (node, labels) in loader.insts().iter().zip(loader.labels_list()) {
            let expected: &[i32] = match node {
                1 => &[0],
                2 => &[1, 1],
                3 => &[1],
                other => panic!("unexpected node {other}"),
            };
            assert_eq!(labels.as_slice(), expected);
        }
    }
}
