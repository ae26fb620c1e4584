use super::Sampling;
use crate::random::random_index;

#[derive(Debug, Clone, Copy)]
pub struct UniformSampling {
    table_size: usize,
}

impl UniformSampling {
    pub fn new(table_size: usize) -> Self {
        Self { table_size }
    }
}

impl Sampling for UniformSampling {
    fn next(&self) -> usize {
        random_index(self.table_size)
    }

    fn next_in(&self, begin: usize, end: usize) -> Option<usize> {
        if begin >= end || end > self.table_size {
            return None;
        }
        Some(begin + random_index(end - begin))
    }

    fn len(&self) -> usize {
        self.table_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::reseed;

    #[test]
    fn test_range_draws_stay_in_range() {
        reseed(11);
        let sampling = UniformSampling::new(10);
        let mut seen = [false; 10];
        for _ in 0..10_000 {
            let i = sampling.next_in(3, 6).unwrap();
            assert!((3..6).contains(&i));
            seen[i] = true;
        }
        assert_eq!(seen, [false, false, false, true, true, true, false, false, false, false]);
        assert_eq!(sampling.next_in(4, 4), None);
        assert_eq!(sampling.next_in(4, 11), None);
    }
}
