//! Parallel dataset loading.
//!
//! Files under a dataset path are split round-robin across worker threads.
//! Each worker parses its files in batches and inserts every record whose
//! primary node belongs to this process's shard. All workers run to
//! completion; failures are gathered into one [`GraphError::LoadFailed`].

pub mod freq;
pub mod instance;

pub use freq::FreqFileLoader;
pub use instance::InstanceLoader;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use walkdir::WalkDir;

use crate::error::{GraphError, Result};
use crate::line_parser::LineParser;
use crate::storage::{
    new_context_storage, new_edge_storage, new_feature_storage, AdjacencyKind, Storage,
};
use crate::value::{AdjValue, EdgeValue, ParseLine};
use crate::NodeId;

/// Lines per parse batch; the storage lock is held for one batch at a time.
pub const BATCH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoaderKind {
    /// `<node> <id>:<w> ...` rows into a context storage.
    Context,
    /// `<node> <feature>:<value> ...` rows into a feature storage.
    Feature,
    /// `<src> <dst> [w]` rows into an edge storage.
    Edge,
}

/// Static hash partition: a node belongs to shard `node % shard_num`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardSpec {
    pub shard_num: usize,
    pub shard_id: usize,
}

impl Default for ShardSpec {
    fn default() -> Self {
        Self {
            shard_num: 1,
            shard_id: 0,
        }
    }
}

impl ShardSpec {
    pub fn new(shard_num: usize, shard_id: usize) -> Result<Self> {
        let spec = Self {
            shard_num,
            shard_id,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<()> {
        if self.shard_num == 0 || self.shard_id >= self.shard_num {
            return Err(GraphError::InvalidConfig(format!(
                "need 0 <= shard_id < shard_num, got shard_id: {} shard_num: {}",
                self.shard_id, self.shard_num
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn part_of_shard(&self, node: NodeId) -> bool {
        self.shard_num <= 1 || node % self.shard_num as u64 == self.shard_id as u64
    }
}

type SharedStore<'a> = Mutex<&'a mut dyn Storage>;

pub struct Loader {
    kind: LoaderKind,
    shard: ShardSpec,
    strict: bool,
    store: Box<dyn Storage>,
}

impl Loader {
    pub fn new(kind: LoaderKind, shard: ShardSpec, store_kind: AdjacencyKind) -> Self {
        let store = match kind {
            LoaderKind::Context => new_context_storage(store_kind),
            LoaderKind::Feature => new_feature_storage(store_kind),
            LoaderKind::Edge => new_edge_storage(),
        };
        Self {
            kind,
            shard,
            strict: true,
            store,
        }
    }

    pub fn context(shard: ShardSpec, store_kind: AdjacencyKind) -> Self {
        Self::new(LoaderKind::Context, shard, store_kind)
    }

    pub fn feature(shard: ShardSpec, store_kind: AdjacencyKind) -> Self {
        Self::new(LoaderKind::Feature, shard, store_kind)
    }

    pub fn edge(shard: ShardSpec) -> Self {
        Self::new(LoaderKind::Edge, shard, AdjacencyKind::List)
    }

    /// Lenient loaders log and skip malformed lines instead of failing.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn kind(&self) -> LoaderKind {
        self.kind
    }

    pub fn clear(&mut self) {
        self.store.clear();
    }

    pub fn reserve(&mut self, estimated_size: usize) {
        self.store.reserve(estimated_size);
    }

    pub fn storage(&self) -> &dyn Storage {
        self.store.as_ref()
    }

    pub fn into_storage(self) -> Box<dyn Storage> {
        self.store
    }

    pub fn part_of_shard(&self, node: NodeId) -> bool {
        self.shard.part_of_shard(node)
    }

    /// Loads every file under `path` into the storage.
    pub fn load(&mut self, path: &Path, thread_num: usize) -> Result<()> {
        let files = list_files(path)?;
        let thread_num = thread_num.clamp(1, files.len());
        info!(
            "Loading {} files from: {} with {} threads.",
            files.len(),
            path.display(),
            thread_num
        );

        let kind = self.kind;
        let shard = self.shard;
        let strict = self.strict;
        let store: SharedStore<'_> = Mutex::new(self.store.as_mut());

        let result = parallel_process(&files, thread_num, |files, thread_id| match kind {
            LoaderKind::Context => load_entry::<AdjValue>(
                files,
                thread_id,
                strict,
                &shard,
                &store,
                |v| v.node,
                |s, v| s.insert_context(v),
            ),
            LoaderKind::Feature => load_entry::<AdjValue>(
                files,
                thread_id,
                strict,
                &shard,
                &store,
                |v| v.node,
                |s, v| s.insert_feature(v),
            ),
            LoaderKind::Edge => load_entry::<EdgeValue>(
                files,
                thread_id,
                strict,
                &shard,
                &store,
                |v| v.src_node,
                |s, v| s.insert_edge(v),
            ),
        });
        drop(store);

        match result {
            Ok(()) => {
                info!("Loaded {} keys from: {}.", self.store.keys().len(), path.display());
                Ok(())
            }
            Err(e) => {
                error!("Failed to load files from: {}: {}", path.display(), e);
                Err(e)
            }
        }
    }
}

fn load_entry<T: ParseLine>(
    files: &[PathBuf],
    thread_id: usize,
    strict: bool,
    shard: &ShardSpec,
    store: &SharedStore<'_>,
    key: fn(&T) -> NodeId,
    insert: fn(&mut dyn Storage, T) -> Result<()>,
) -> Result<()> {
    let mut values: Vec<T> = Vec::with_capacity(BATCH);

    for file in files {
        debug!("Thread: {} is processing file: {}.", thread_id, file.display());
        let mut parser = LineParser::open(file, strict)?;

        while parser.next_batch(BATCH, &mut values)? {
            let mut guard = store.lock().unwrap_or_else(PoisonError::into_inner);
            for value in values.drain(..) {
                if shard.part_of_shard(key(&value)) {
                    insert(&mut **guard, value)?;
                }
            }
        }
    }

    debug!("Thread: {} done.", thread_id);
    Ok(())
}

/// Regular files under `path`, recursively, hidden entries skipped, sorted.
pub fn list_files(path: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
    {
        let entry = entry.map_err(|e| {
            error!("Failed to list file: {}.", path.display());
            GraphError::io(path, e.into())
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    if files.is_empty() {
        error!("No file: {}.", path.display());
        return Err(GraphError::NoInputFiles(path.to_path_buf()));
    }

    files.sort();
    Ok(files)
}

/// Runs `processor` over a round-robin partition of `items`, one scoped
/// thread per partition. Every partition runs even if another fails.
pub fn parallel_process<T, F>(items: &[T], thread_num: usize, processor: F) -> Result<()>
where
    T: Clone + Send + Sync,
    F: Fn(&[T], usize) -> Result<()> + Sync,
{
    let thread_num = thread_num.max(1);
    let mut partitions: Vec<Vec<T>> = vec![Vec::new(); thread_num];
    for (i, item) in items.iter().enumerate() {
        partitions[i % thread_num].push(item.clone());
    }

    let processor = &processor;
    let results: Vec<Result<()>> = std::thread::scope(|s| {
        let handles: Vec<_> = partitions
            .iter()
            .enumerate()
            .map(|(thread_id, part)| s.spawn(move || processor(part, thread_id)))
            .collect();
        handles
            .into_iter()
            .enumerate()
            .map(|(thread_id, h)| {
                h.join()
                    .unwrap_or(Err(GraphError::WorkerPanicked(thread_id)))
            })
            .collect()
    });

    let total = results.len();
    let mut errors = results.into_iter().filter_map(|r| r.err());
    match errors.next() {
        None => Ok(()),
        Some(first) => {
            let failed = 1 + errors.count();
            Err(GraphError::LoadFailed {
                failed,
                total,
                first: Box::new(first),
            })
        }
    }
}
