use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{GraphError, Result};
use crate::NodeId;

const NAMESPACE_SHIFT: u32 = 48;
const KEY_MASK: u64 = (1 << NAMESPACE_SHIFT) - 1;

/// Name given to the single namespace used when no config file is supplied.
pub const EMPTY_CONFIG_NAME: &str = "EMPTY_CONFIG_FILE";

/// Namespace tag stored in the high 16 bits of a node id.
#[inline]
pub fn namespace_of(node: NodeId) -> u16 {
    (node >> NAMESPACE_SHIFT) as u16
}

#[inline]
pub fn make_node_id(ns_id: u16, key: u64) -> NodeId {
    ((ns_id as u64) << NAMESPACE_SHIFT) | (key & KEY_MASK)
}

/// Namespace id -> name table, plus `ns_size = max_id + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceConfig {
    ns_size: usize,
    id_name: HashMap<u16, String>,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self::empty()
    }
}

impl NamespaceConfig {
    pub fn empty() -> Self {
        let mut id_name = HashMap::new();
        id_name.insert(0, EMPTY_CONFIG_NAME.to_string());
        Self { ns_size: 1, id_name }
    }

    /// Loads `path`, or the synthetic single namespace when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) if !p.as_os_str().is_empty() => Self::from_file(p),
            _ => Ok(Self::empty()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| GraphError::io(path, e))?;
        Self::from_reader(BufReader::new(file), path)
    }

    fn from_reader<R: BufRead>(reader: R, path: &Path) -> Result<Self> {
        let mut id_name = HashMap::new();
        let mut max_ns_id = 0u16;

        for line in reader.lines() {
            let line = line.map_err(|e| GraphError::io(path, e))?;
            if line.contains('#') || line.contains("//") {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let (Some(name), Some(id)) = (tokens.next(), tokens.next()) else {
                continue;
            };
            let Ok(ns_id) = id.parse::<u16>() else {
                continue;
            };

            if id_name.contains_key(&ns_id) {
                return Err(GraphError::DuplicateNamespace(ns_id));
            }
            id_name.insert(ns_id, name.to_string());
            max_ns_id = max_ns_id.max(ns_id);
        }

        if id_name.is_empty() {
            return Err(GraphError::EmptyNamespaceConfig(PathBuf::from(path)));
        }

        info!(
            "Loaded {} namespaces, max namespace id is: {}",
            id_name.len(),
            max_ns_id
        );

        Ok(Self {
            ns_size: max_ns_id as usize + 1,
            id_name,
        })
    }

    pub fn ns_size(&self) -> usize {
        self.ns_size
    }

    pub fn id_name_map(&self) -> &HashMap<u16, String> {
        &self.id_name
    }

    pub fn contains(&self, ns_id: u16) -> bool {
        self.id_name.contains_key(&ns_id)
    }

    pub fn name(&self, ns_id: u16) -> Option<&str> {
        self.id_name.get(&ns_id).map(String::as_str)
    }

    /// Namespace of `node`, collapsed to 0 when only one namespace exists.
    pub fn resolve(&self, node: NodeId) -> u16 {
        if self.ns_size > 1 {
            namespace_of(node)
        } else {
            0
        }
    }

    /// Fails with `UnknownNamespace` when `node`'s tag is not configured.
    pub fn check(&self, node: NodeId) -> Result<u16> {
        let ns_id = namespace_of(node);
        if self.contains(ns_id) {
            Ok(ns_id)
        } else {
            Err(GraphError::UnknownNamespace { node, ns_id })
        }
    }
}
