use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use graph_engine::config::DumpKind;
use graph_engine::error::GraphError;
use graph_engine::line_parser::LineParser;
use graph_engine::loader::{list_files, parallel_process, BATCH};
use graph_engine::random::reseed;
use graph_engine::sampler::GraphSamplerSource;
use graph_engine::value::NodeValue;
use graph_engine::{
    new_random_walker, new_sampler_builder, EngineConfig, Loader, NamespaceConfig, NodeId,
    SamplerBuilderKind, WalkerInfo,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let config = EngineConfig::load().context("invalid engine config")?;
    if let Some(seed) = config.seed {
        reseed(seed);
    }

    let ns_config = NamespaceConfig::load(config.node_config.as_deref())
        .context("failed to load namespace config")?;

    let mut loader = Loader::context(config.shard()?, config.store_kind).with_strict(config.strict);
    loader
        .load(&config.node_graph, config.thread_num)
        .with_context(|| format!("failed to load node graph {}", config.node_graph.display()))?;
    let source = GraphSamplerSource::new(loader.into_storage(), ns_config)?;

    let builder = new_sampler_builder(
        Arc::new(source),
        SamplerBuilderKind::Neighbor,
        config.sampling_kind,
        config.thread_num,
    )?;

    let start_nodes = match &config.start_nodes {
        Some(path) => read_start_nodes(path, config.strict)?,
        None => builder.source().node_keys().to_vec(),
    };
    let walker = new_random_walker(builder, config.walker_kind, config.walker_config())?;

    let walker_infos: Vec<WalkerInfo> = if config.meta_paths.is_empty() {
        vec![WalkerInfo {
            meta_path: Vec::new(),
            no_backtrack: config.no_backtrack,
        }]
    } else {
        config
            .meta_paths
            .iter()
            .map(|meta_path| WalkerInfo {
                meta_path: meta_path.clone(),
                no_backtrack: config.no_backtrack,
            })
            .collect()
    };

    let out_name = config
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from("<stdout>"));
    let writer: Box<dyn Write + Send> = match &config.out {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout())),
    };
    let writer = Mutex::new(writer);

    info!(
        "Walking from {} start nodes, walk_length: {}, epoch: {}.",
        start_nodes.len(),
        config.walk_length,
        config.epoch
    );

    for epoch in 0..config.epoch {
        info!("Random walker epoch: {}.", epoch);
        parallel_process(&start_nodes, config.thread_num, |nodes, thread_id| {
            if let Some(seed) = config.seed {
                reseed(seed ^ ((epoch as u64) << 32) ^ (thread_id as u64 + 1));
            }
            let walk_lens = vec![config.walk_length; config.batch_node];
            for batch in nodes.chunks(config.batch_node) {
                for walker_info in &walker_infos {
                    let seqs = walker.traverse(batch, &walk_lens[..batch.len()], walker_info)?;
                    let text = dump_text(&seqs, config.dump_kind);
                    writer
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .write_all(text.as_bytes())
                        .map_err(|e| GraphError::io(&out_name, e))?;
                }
            }
            Ok(())
        })?;
    }

    writer
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner)
        .flush()
        .with_context(|| format!("failed to flush {}", out_name.display()))?;
    info!("Done.");
    Ok(())
}

fn read_start_nodes(path: &Path, strict: bool) -> Result<Vec<NodeId>> {
    let mut nodes = Vec::new();
    let mut values: Vec<NodeValue> = Vec::with_capacity(BATCH);
    for file in list_files(path)? {
        let mut parser = LineParser::open(&file, strict)?;
        while parser.next_batch(BATCH, &mut values)? {
            nodes.extend(values.iter().map(|v| v.node));
        }
    }
    info!("Read {} start nodes from: {}", nodes.len(), path.display());
    Ok(nodes)
}

/// Walks that never left their start node are dropped.
fn dump_text(seqs: &[Vec<NodeId>], kind: DumpKind) -> String {
    let mut text = String::new();
    for seq in seqs.iter().filter(|seq| seq.len() > 1) {
        let start = seq[0];
        match kind {
            DumpKind::Sequence => {
                let _ = write!(text, "{}", start);
                for node in &seq[1..] {
                    let _ = write!(text, " {}", node);
                }
                text.push('\n');
            }
            DumpKind::Edge => {
                for node in &seq[1..] {
                    let _ = writeln!(text, "{} {}", start, node);
                }
            }
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_text() {
        let seqs = vec![vec![1, 2, 3], vec![7], vec![4, 5]];
        assert_eq!(dump_text(&seqs, DumpKind::Sequence), "1 2 3\n4 5\n");
        assert_eq!(dump_text(&seqs, DumpKind::Edge), "1 2\n1 3\n4 5\n");
    }
}
