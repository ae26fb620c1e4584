use std::path::Path;
use std::sync::{Mutex, PoisonError};

use tracing::{debug, error, info};

use super::{list_files, parallel_process, BATCH};
use crate::error::{GraphError, Result};
use crate::line_parser::LineParser;
use crate::namespace::{namespace_of, NamespaceConfig};
use crate::value::NodeValue;
use crate::NodeId;

/// Per-namespace `(node, frequency)` lists read from `<node> <freq>` files.
///
/// Used as the unigram source for negative sampling when the frequencies are
/// precomputed instead of derived from a context graph.
#[derive(Debug, Clone)]
pub struct FreqFileLoader {
    config: NamespaceConfig,
    nodes_list: Vec<Vec<NodeId>>,
    freqs_list: Vec<Vec<f32>>,
}

#[derive(Default)]
struct FreqLists {
    nodes_list: Vec<Vec<NodeId>>,
    freqs_list: Vec<Vec<f32>>,
}

impl FreqFileLoader {
    pub fn create(config: NamespaceConfig, dir: &Path, thread_num: usize) -> Result<Self> {
        info!("Loading files from dir: {}.", dir.display());
        let files = list_files(dir)?;
        let thread_num = thread_num.clamp(1, files.len());

        let ns_size = config.ns_size();
        let lists = Mutex::new(FreqLists {
            nodes_list: vec![Vec::new(); ns_size],
            freqs_list: vec![Vec::new(); ns_size],
        });

        parallel_process(&files, thread_num, |files, thread_id| {
            let mut values: Vec<NodeValue> = Vec::with_capacity(BATCH);
            for file in files {
                debug!("Thread: {} is processing file: {}.", thread_id, file.display());
                let mut parser = LineParser::open(file, true)?;
                while parser.next_batch(BATCH, &mut values)? {
                    let mut lists = lists.lock().unwrap_or_else(PoisonError::into_inner);
                    for value in &values {
                        let ns_id = config.check(value.node).map_err(|e| {
                            error!("{}", e);
                            e
                        })?;
                        if value.weight <= 0.0 {
                            error!(
                                "The frequency: {} of node: {} must be greater than 0.",
                                value.weight, value.node
                            );
                            return Err(GraphError::InvalidWeights(format!(
                                "frequency {} of node {} must be greater than 0",
                                value.weight, value.node
                            )));
                        }
                        let lists = &mut *lists;
                        let (Some(nodes), Some(freqs)) = (
                            lists.nodes_list.get_mut(ns_id as usize),
                            lists.freqs_list.get_mut(ns_id as usize),
                        ) else {
                            return Err(GraphError::UnknownNamespace {
                                node: value.node,
                                ns_id,
                            });
                        };
                        nodes.push(value.node);
                        freqs.push(value.weight);
                    }
                }
            }
            Ok(())
        })?;

        let lists = lists.into_inner().unwrap_or_else(PoisonError::into_inner);
        info!(
            "Loaded {} nodes across {} namespaces.",
            lists.nodes_list.iter().map(Vec::len).sum::<usize>(),
            config.id_name_map().len()
        );
        Ok(Self {
            config,
            nodes_list: lists.nodes_list,
            freqs_list: lists.freqs_list,
        })
    }

    pub fn config(&self) -> &NamespaceConfig {
        &self.config
    }

    pub fn nodes_list(&self) -> &[Vec<NodeId>] {
        &self.nodes_list
    }

    pub fn freqs_list(&self) -> &[Vec<f32>] {
        &self.freqs_list
    }

    /// Nodes of one namespace, empty when the namespace is out of range.
    pub fn nodes(&self, node: NodeId) -> &[NodeId] {
        self.nodes_list
            .get(namespace_of(node) as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::make_node_id;
    use std::fs;

    fn two_namespaces(dir: &Path) -> NamespaceConfig {
        let path = dir.join("ns.conf");
        fs::write(&path, "user 0\nitem 1\n").unwrap();
        NamespaceConfig::from_file(&path).unwrap()
    }

    #[test]
    fn test_freq_lists_by_namespace() {
        let conf_dir = tempfile::tempdir().unwrap();
        let config = two_namespaces(conf_dir.path());

        let dir = tempfile::tempdir().unwrap();
        let item = make_node_id(1, 7);
        fs::write(dir.path().join("part-0"), format!("3 2\n{} 5\n", item)).unwrap();
        fs::write(dir.path().join("part-1"), "4 1.5\n").unwrap();

        let loader = FreqFileLoader::create(config, dir.path(), 2).unwrap();
        let mut users = loader.nodes_list()[0].clone();
        users.sort();
        assert_eq!(users, vec![3, 4]);
        assert_eq!(loader.nodes_list()[1], vec![item]);
        assert_eq!(loader.freqs_list()[1], vec![5.0]);
        assert_eq!(loader.nodes(make_node_id(1, 99)), &[item]);
    }

    #[test]
    fn test_last_namespace_id() {
        let conf_dir = tempfile::tempdir().unwrap();
        let path = conf_dir.path().join("ns.conf");
        fs::write(&path, "a 0\nz 65535\n").unwrap();
        let config = NamespaceConfig::from_file(&path).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let node = make_node_id(u16::MAX, 1);
        fs::write(dir.path().join("part-0"), format!("{} 2\n", node)).unwrap();

        let loader = FreqFileLoader::create(config, dir.path(), 1).unwrap();
        assert_eq!(loader.nodes_list().len(), 65536);
        assert_eq!(loader.nodes(node), &[node]);
        assert_eq!(loader.freqs_list()[65535], vec![2.0]);
    }

    #[test]
    fn test_unknown_namespace_and_bad_freq() {
        let conf_dir = tempfile::tempdir().unwrap();
        let config = two_namespaces(conf_dir.path());

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("part-0"), format!("{} 1\n", make_node_id(5, 1))).unwrap();
        let err = FreqFileLoader::create(config.clone(), dir.path(), 1).unwrap_err();
        assert!(matches!(
            err.root_cause(),
            GraphError::UnknownNamespace { ns_id: 5, .. }
        ));

        fs::write(dir.path().join("part-0"), "1 0\n").unwrap();
        let err = FreqFileLoader::create(config, dir.path(), 1).unwrap_err();
        assert!(matches!(err.root_cause(), GraphError::InvalidWeights(_)));
    }
}
