//! Runtime configuration for the walk tool.
//!
//! Defaults, then an optional JSON file named by `GRAPH_ENGINE_CONFIG`, then
//! per-field `GRAPH_*` environment overrides.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{GraphError, Result};
use crate::loader::ShardSpec;
use crate::sampling::SamplingKind;
use crate::storage::AdjacencyKind;
use crate::walker::{WalkerConfig, WalkerKind};

pub const CONFIG_FILE_ENV: &str = "GRAPH_ENGINE_CONFIG";

/// What the walk tool writes per walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DumpKind {
    /// `start n1 n2 ...`
    #[default]
    Sequence,
    /// One `start ni` line per visited node.
    Edge,
}

impl FromStr for DumpKind {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "sequence" => Ok(DumpKind::Sequence),
            "edge" => Ok(DumpKind::Edge),
            // Any other numeric code selects edges.
            other if other.parse::<i64>().is_ok() => Ok(DumpKind::Edge),
            _ => Err(GraphError::InvalidConfig(format!("unknown dump type: {}", s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Context graph directory.
    pub node_graph: PathBuf,
    /// Namespace config file; `None` means a single namespace.
    pub node_config: Option<PathBuf>,
    /// Node files holding the walk start nodes. Every stored key when unset.
    pub start_nodes: Option<PathBuf>,
    pub thread_num: usize,
    pub shard_num: usize,
    pub shard_id: usize,
    pub store_kind: AdjacencyKind,
    pub sampling_kind: SamplingKind,
    pub walker_kind: WalkerKind,
    pub walk_length: usize,
    pub epoch: usize,
    pub batch_node: usize,
    pub p: f64,
    pub q: f64,
    pub no_backtrack: bool,
    pub meta_paths: Vec<Vec<u16>>,
    pub dump_kind: DumpKind,
    /// Output file; stdout when unset.
    pub out: Option<PathBuf>,
    pub seed: Option<u64>,
    /// Fail on malformed lines instead of skipping them.
    pub strict: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            node_graph: PathBuf::new(),
            node_config: None,
            start_nodes: None,
            thread_num: 1,
            shard_num: 1,
            shard_id: 0,
            store_kind: AdjacencyKind::default(),
            sampling_kind: SamplingKind::default(),
            walker_kind: WalkerKind::default(),
            walk_length: 10,
            epoch: 1,
            batch_node: 128,
            p: 1.0,
            q: 1.0,
            no_backtrack: false,
            meta_paths: Vec::new(),
            dump_kind: DumpKind::default(),
            out: None,
            seed: None,
            strict: true,
        }
    }
}

impl EngineConfig {
    /// Defaults, the `GRAPH_ENGINE_CONFIG` file if set, then the process
    /// environment.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_FILE_ENV) {
            Ok(path) if !path.is_empty() => Self::from_file(Path::new(&path))?,
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GraphError::io(path, e))?;
        let config = serde_json::from_str(&content).map_err(|e| {
            GraphError::InvalidConfig(format!("{}: {}", path.display(), e))
        })?;
        info!("Loaded engine config from: {}", path.display());
        Ok(config)
    }

    /// Applies `GRAPH_*` overrides read through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = lookup("GRAPH_NODE_GRAPH") {
            self.node_graph = PathBuf::from(v);
        }
        if let Some(v) = lookup("GRAPH_NODE_CONFIG") {
            self.node_config = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("GRAPH_IN") {
            self.start_nodes = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("GRAPH_OUT") {
            self.out = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("GRAPH_META_PATH") {
            self.meta_paths = parse_meta_paths(&v)?;
        }

        override_parsed(&lookup, "GRAPH_THREAD_NUM", &mut self.thread_num)?;
        override_parsed(&lookup, "GRAPH_SHARD_NUM", &mut self.shard_num)?;
        override_parsed(&lookup, "GRAPH_SHARD_ID", &mut self.shard_id)?;
        override_parsed(&lookup, "GRAPH_STORE_TYPE", &mut self.store_kind)?;
        override_parsed(&lookup, "GRAPH_SAMPLER_TYPE", &mut self.sampling_kind)?;
        override_parsed(&lookup, "GRAPH_WALKER_TYPE", &mut self.walker_kind)?;
        override_parsed(&lookup, "GRAPH_WALK_LENGTH", &mut self.walk_length)?;
        override_parsed(&lookup, "GRAPH_EPOCH", &mut self.epoch)?;
        override_parsed(&lookup, "GRAPH_BATCH_NODE", &mut self.batch_node)?;
        override_parsed(&lookup, "GRAPH_WALK_P", &mut self.p)?;
        override_parsed(&lookup, "GRAPH_WALK_Q", &mut self.q)?;
        override_parsed(&lookup, "GRAPH_NO_BACKTRACK", &mut self.no_backtrack)?;
        override_parsed(&lookup, "GRAPH_DUMP_TYPE", &mut self.dump_kind)?;
        override_parsed(&lookup, "GRAPH_STRICT", &mut self.strict)?;

        if let Some(v) = lookup("GRAPH_SEED") {
            self.seed = Some(parse_value("GRAPH_SEED", &v)?);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.node_graph.as_os_str().is_empty() {
            return Err(GraphError::InvalidConfig("node_graph must be set".into()));
        }
        self.shard()?;
        self.walker_config().validate()?;
        for (name, value) in [
            ("thread_num", self.thread_num),
            ("walk_length", self.walk_length),
            ("epoch", self.epoch),
            ("batch_node", self.batch_node),
        ] {
            if value == 0 {
                return Err(GraphError::InvalidConfig(format!("{} must be > 0", name)));
            }
        }
        if self.meta_paths.iter().any(Vec::is_empty) {
            return Err(GraphError::InvalidConfig("meta path must not be empty".into()));
        }
        Ok(())
    }

    pub fn shard(&self) -> Result<ShardSpec> {
        ShardSpec::new(self.shard_num, self.shard_id)
    }

    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig {
            p: self.p,
            q: self.q,
        }
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| GraphError::InvalidConfig(format!("{}={:?}: {}", key, value, e)))
}

fn override_parsed<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    field: &mut T,
) -> Result<()>
where
    T: FromStr,
    T::Err: Display,
{
    if let Some(v) = lookup(key) {
        *field = parse_value(key, &v)?;
    }
    Ok(())
}

/// Parses `1:2:1,2:1` into one namespace list per comma-separated path.
pub fn parse_meta_paths(s: &str) -> Result<Vec<Vec<u16>>> {
    s.split(',')
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(|path| {
            path.split(':')
                .map(|ns_id| parse_value("meta path", ns_id))
                .collect()
        })
        .collect()
}
