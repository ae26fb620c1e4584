use super::Sampling;
use crate::random::random_unit;

/// Prefix sums plus binary search; `O(log n)` per draw, supports ranges.
#[derive(Debug, Clone)]
pub struct PartialSumSampling {
    partial_sum_table: Vec<f64>,
}

impl PartialSumSampling {
    pub fn new(weights: &[f32]) -> Self {
        let partial_sum_table = weights
            .iter()
            .scan(0.0f64, |sum, &w| {
                *sum += w as f64;
                Some(*sum)
            })
            .collect();
        Self { partial_sum_table }
    }
}

impl Sampling for PartialSumSampling {
    fn next(&self) -> usize {
        // A successful build guarantees a positive total.
        self.next_in(0, self.partial_sum_table.len()).unwrap_or(0)
    }

    fn next_in(&self, begin: usize, end: usize) -> Option<usize> {
        if begin >= end || end > self.partial_sum_table.len() {
            return None;
        }

        let sum_begin = if begin > 0 {
            self.partial_sum_table[begin - 1]
        } else {
            0.0
        };
        let sum_end = self.partial_sum_table[end - 1];
        if sum_end <= sum_begin {
            return None;
        }

        let target = sum_begin + random_unit() * (sum_end - sum_begin);
        // First prefix strictly above the target, so zero-width entries are
        // never hit.
        let offset = self.partial_sum_table[begin..end].partition_point(|&p| p <= target);
        Some((begin + offset).min(end - 1))
    }

    fn len(&self) -> usize {
        self.partial_sum_table.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::reseed;

    #[test]
    fn test_range_draw_is_renormalised() {
        reseed(17);
        let sampling = PartialSumSampling::new(&[5.0, 1.0, 0.0, 3.0, 7.0]);
        let mut counts = [0usize; 5];
        let draws = 400_000;
        for _ in 0..draws {
            counts[sampling.next_in(1, 4).unwrap()] += 1;
        }
        assert_eq!(counts[0], 0);
        assert_eq!(counts[2], 0);
        assert_eq!(counts[4], 0);
        let share = counts[3] as f64 / draws as f64;
        assert!((share - 0.75).abs() < 0.01, "share of index 3: {}", share);
    }

    #[test]
    fn test_zero_range() {
        let sampling = PartialSumSampling::new(&[1.0, 0.0, 0.0, 1.0]);
        assert_eq!(sampling.next_in(1, 3), None);
        assert_eq!(sampling.next_in(2, 2), None);
        assert_eq!(sampling.next_in(0, 5), None);
    }
}
