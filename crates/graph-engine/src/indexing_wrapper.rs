use tracing::error;

use crate::error::{GraphError, Result};
use crate::indexing::Indexing;
use crate::namespace::{namespace_of, NamespaceConfig};
use crate::NodeId;

/// Batch-local dense indices, one stack of per-level tables per namespace.
///
/// Meant to be kept per worker and cleared between minibatches so the tables
/// keep their capacity.
#[derive(Debug, Clone)]
pub struct IndexingWrapper {
    ns_size: usize,
    subgraph_indexings: Vec<Vec<Indexing>>,
    subgraph_size: usize,
    subgraph_offset: Vec<usize>,
}

impl IndexingWrapper {
    pub fn new(config: &NamespaceConfig) -> Self {
        let ns_size = config.ns_size();
        Self {
            ns_size,
            subgraph_indexings: vec![Vec::new(); ns_size],
            subgraph_size: 0,
            subgraph_offset: vec![0; ns_size],
        }
    }

    pub fn clear(&mut self) {
        self.subgraph_size = 0;
        self.subgraph_offset.iter_mut().for_each(|offset| *offset = 0);
        for indexing in self.subgraph_indexings.iter_mut().flatten() {
            indexing.clear();
        }
    }

    fn ns_of(&self, node: NodeId) -> Result<usize> {
        // A single namespace ignores the tag bits entirely.
        let ns_id = if self.ns_size > 1 { namespace_of(node) } else { 0 };
        if ns_id as usize >= self.ns_size {
            return Err(GraphError::UnknownNamespace { node, ns_id });
        }
        Ok(ns_id as usize)
    }

    /// Indexes `nodes` as the single level of their namespace, in order.
    pub fn build_from_nodes(&mut self, nodes: &[NodeId]) -> Result<()> {
        let first = nodes
            .first()
            .ok_or_else(|| GraphError::InvalidConfig("cannot index an empty node list".into()))?;
        let ns_id = self.ns_of(*first)?;

        let subgraph_indexing = &mut self.subgraph_indexings[ns_id];
        subgraph_indexing.resize_with(1, Indexing::new);
        let level = &mut subgraph_indexing[0];
        level.clear();
        level.reserve(nodes.len());
        for &node in nodes {
            level.add(node);
        }
        Ok(())
    }

    /// Indexes hop levels of one namespace with consecutive indices across
    /// levels, and registers level 0 in the batch-global index space.
    /// Repeats inside a level keep their first index.
    pub fn build_from_levels(&mut self, level_nodes: &[Vec<NodeId>]) -> Result<()> {
        let first = level_nodes
            .first()
            .and_then(|level| level.first())
            .ok_or_else(|| GraphError::InvalidConfig("level 0 must not be empty".into()))?;
        let ns_id = self.ns_of(*first)?;

        let subgraph_indexing = &mut self.subgraph_indexings[ns_id];
        subgraph_indexing.resize_with(level_nodes.len(), Indexing::new);

        let mut k = 0;
        for (indexing, nodes) in subgraph_indexing.iter_mut().zip(level_nodes) {
            indexing.clear();
            for &node in nodes {
                if indexing.emplace(node, k) {
                    k += 1;
                }
            }
        }

        self.subgraph_offset[ns_id] = self.subgraph_size;
        self.subgraph_size += subgraph_indexing[0].len();
        Ok(())
    }

    /// Index of a level-0 node in the batch-global space.
    pub fn global_index(&self, node: NodeId) -> Option<usize> {
        let ns_id = match self.ns_of(node) {
            Ok(ns_id) => ns_id,
            Err(e) => {
                error!("{}", e);
                return None;
            }
        };
        let level = self.subgraph_indexings[ns_id].first()?;
        level
            .get(node)
            .map(|index| index + self.subgraph_offset[ns_id])
    }

    pub fn subgraph_indexing(&self, ns_id: u16) -> Option<&[Indexing]> {
        self.subgraph_indexings
            .get(ns_id as usize)
            .map(Vec::as_slice)
    }

    /// Total level-0 size over the namespaces built since the last clear.
    pub fn subgraph_size(&self) -> usize {
        self.subgraph_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::make_node_id;
    use std::io::Write;

    fn two_namespaces() -> NamespaceConfig {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "user 0\nitem 1").unwrap();
        NamespaceConfig::from_file(file.path()).unwrap()
    }

    #[test]
    fn test_build_from_nodes() {
        let mut wrapper = IndexingWrapper::new(&NamespaceConfig::empty());
        wrapper.build_from_nodes(&[30, 10, 30, 20]).unwrap();
        let level = &wrapper.subgraph_indexing(0).unwrap()[0];
        assert_eq!(level.len(), 3);
        assert_eq!(level.get(30), Some(0));
        assert_eq!(level.get(10), Some(1));
        assert_eq!(level.get(20), Some(2));
        assert!(wrapper.build_from_nodes(&[]).is_err());
    }

    #[test]
    fn test_levels_share_one_index_space() {
        let user = |k| make_node_id(0, k);
        let item = |k| make_node_id(1, k);
        let mut wrapper = IndexingWrapper::new(&two_namespaces());

        wrapper
            .build_from_levels(&[vec![user(1), user(2)], vec![user(5), user(6), user(7)]])
            .unwrap();
        wrapper
            .build_from_levels(&[vec![item(9), item(8), item(7)], vec![item(1)]])
            .unwrap();

        let users = wrapper.subgraph_indexing(0).unwrap();
        assert_eq!(users[1].get(user(5)), Some(2));
        assert_eq!(users[1].get(user(7)), Some(4));
        let items = wrapper.subgraph_indexing(1).unwrap();
        assert_eq!(items[1].get(item(1)), Some(3));

        assert_eq!(wrapper.subgraph_size(), 5);
        assert_eq!(wrapper.global_index(user(2)), Some(1));
        assert_eq!(wrapper.global_index(item(9)), Some(2));
        assert_eq!(wrapper.global_index(item(7)), Some(4));
        assert_eq!(wrapper.global_index(user(5)), None);
        assert_eq!(wrapper.global_index(make_node_id(7, 1)), None);
    }

    #[test]
    fn test_repeated_nodes_leave_no_gaps() {
        let user = |k| make_node_id(0, k);
        let item = |k| make_node_id(1, k);
        let mut wrapper = IndexingWrapper::new(&two_namespaces());

        wrapper
            .build_from_levels(&[vec![user(10), user(10), user(11)], vec![user(12), user(12)]])
            .unwrap();
        wrapper.build_from_levels(&[vec![item(1)]]).unwrap();

        let users = wrapper.subgraph_indexing(0).unwrap();
        assert_eq!(users[0].get(user(10)), Some(0));
        assert_eq!(users[0].get(user(11)), Some(1));
        assert_eq!(users[1].get(user(12)), Some(2));
        assert_eq!(wrapper.subgraph_size(), 3);
        assert_eq!(wrapper.global_index(user(11)), Some(1));
        assert_eq!(wrapper.global_index(item(1)), Some(2));
    }

    #[test]
    fn test_clear_resets_offsets() {
        let item = |k| make_node_id(1, k);
        let mut wrapper = IndexingWrapper::new(&two_namespaces());
        wrapper
            .build_from_levels(&[vec![make_node_id(0, 1)]])
            .unwrap();
        wrapper.build_from_levels(&[vec![item(3)]]).unwrap();
        assert_eq!(wrapper.global_index(item(3)), Some(1));

        wrapper.clear();
        assert_eq!(wrapper.subgraph_size(), 0);
        assert_eq!(wrapper.global_index(item(3)), None);
        wrapper.build_from_levels(&[vec![item(3)]]).unwrap();
        assert_eq!(wrapper.global_index(item(3)), Some(0));
    }
}
