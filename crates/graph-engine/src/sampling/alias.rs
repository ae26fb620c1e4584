use super::Sampling;
use crate::random::{random_index, random_unit};

/// Walker/Vose alias table: one uniform column pick plus one biased coin.
#[derive(Debug, Clone)]
pub struct AliasSampling {
    alias_probs: Vec<f64>,
    alias_table: Vec<usize>,
}

impl AliasSampling {
    /// `weights` need not be normalised but must hold at least one positive
    /// entry.
    pub fn new(weights: &[f32]) -> Self {
        let n = weights.len();
        let total: f64 = weights.iter().map(|&w| w as f64).sum();

        let mut alias_probs: Vec<f64> = weights
            .iter()
            .map(|&w| w as f64 * n as f64 / total)
            .collect();
        let mut alias_table: Vec<usize> = (0..n).collect();

        let (mut smaller, mut larger): (Vec<usize>, Vec<usize>) =
            (0..n).partition(|&i| alias_probs[i] < 1.0);

        while let (Some(&s), Some(&l)) = (smaller.last(), larger.last()) {
            smaller.pop();
            larger.pop();

            alias_table[s] = l;
            alias_probs[l] += alias_probs[s] - 1.0;
            if alias_probs[l] < 1.0 {
                smaller.push(l);
            } else {
                larger.push(l);
            }
        }

        // Leftovers are rounding residue. Positive columns keep themselves;
        // a zero-weight column must never resolve to itself.
        let fallback = weights.iter().position(|&w| w > 0.0).unwrap_or(0);
        for i in larger.into_iter().chain(smaller) {
            if weights[i] > 0.0 {
                alias_probs[i] = 1.0;
            } else {
                alias_probs[i] = 0.0;
                alias_table[i] = fallback;
            }
        }

        Self {
            alias_probs,
            alias_table,
        }
    }
}

impl Sampling for AliasSampling {
    fn next(&self) -> usize {
        let k = random_index(self.alias_probs.len());
        if random_unit() < self.alias_probs[k] {
            k
        } else {
            self.alias_table[k]
        }
    }

    fn next_in(&self, _begin: usize, _end: usize) -> Option<usize> {
        None
    }

    fn len(&self) -> usize {
        self.alias_probs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::reseed;
    use crate::sampling::tests::{assert_close, histogram};

    #[test]
    fn test_skewed_weights() {
        reseed(5);
        let weights = [1000.0f32, 1.0, 0.0, 1.0, 30.0];
        let sampling = AliasSampling::new(&weights);
        let freq = histogram(&sampling);
        assert_close(&freq, &weights, 0.01);
        assert_eq!(freq[2], 0.0);
    }

    #[test]
    fn test_single_positive_entry() {
        reseed(9);
        let sampling = AliasSampling::new(&[0.0, 0.0, 2.0, 0.0]);
        for _ in 0..10_000 {
            assert_eq!(sampling.next(), 2);
        }
        assert_eq!(sampling.next_in(0, 2), None);
    }
}
