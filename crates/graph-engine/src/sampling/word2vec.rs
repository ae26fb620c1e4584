use tracing::{debug, error};

use super::Sampling;
use crate::error::{GraphError, Result};
use crate::random::random_index;

const MAX_TABLE_SIZE: usize = 1_000_000_000;
/// Table slots per non-zero entry.
const TABLE_RATIO: usize = 10;
const FREQUENCY_POWER: f64 = 0.75;

/// Unigram table in the word2vec style: each entry fills a share of the
/// table proportional to `freq^0.75`, so a draw is a single lookup.
#[derive(Debug, Clone)]
pub struct Word2vecSampling {
    len: usize,
    sample_table: Vec<usize>,
}

impl Word2vecSampling {
    pub fn new(freqs: &[f32]) -> Result<Self> {
        if freqs.len() > MAX_TABLE_SIZE {
            error!(
                "The freq_size: {} must be less than or equal to {}.",
                freqs.len(),
                MAX_TABLE_SIZE
            );
            return Err(GraphError::InvalidWeights(format!(
                "{} entries exceed the unigram table limit",
                freqs.len()
            )));
        }

        let mut valid: Vec<(usize, f64)> = freqs
            .iter()
            .enumerate()
            .filter(|(_, &f)| f > 0.0)
            .map(|(i, &f)| (i, (f as f64).powf(FREQUENCY_POWER)))
            .collect();
        if valid.is_empty() {
            return Err(GraphError::InvalidWeights("no positive frequency".into()));
        }
        valid.sort_by(|a, b| b.1.total_cmp(&a.1));
        let acc: f64 = valid.iter().map(|(_, p)| p).sum();

        let table_size = (valid.len() * TABLE_RATIO).min(MAX_TABLE_SIZE);
        debug!("Initing sampling table of size {}.", table_size);

        let mut sample_table = Vec::with_capacity(table_size);
        let mut cursor = 0;
        let mut bound = valid[0].1 / acc;
        for i in 0..table_size {
            sample_table.push(valid[cursor].0);
            if i as f64 / table_size as f64 > bound && cursor + 1 < valid.len() {
                cursor += 1;
                bound += valid[cursor].1 / acc;
            }
        }

        Ok(Self {
            len: freqs.len(),
            sample_table,
        })
    }
}

impl Sampling for Word2vecSampling {
    fn next(&self) -> usize {
        self.sample_table[random_index(self.sample_table.len())]
    }

    fn next_in(&self, _begin: usize, _end: usize) -> Option<usize> {
        None
    }

    fn len(&self) -> usize {
        self.len
    }
}
