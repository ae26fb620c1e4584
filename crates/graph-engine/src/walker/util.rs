use crate::namespace::namespace_of;
use crate::random::random_unit;
use crate::{NodeId, WeightedNode};

/// Positions `begin..end` of the neighbors in namespace `ns_id`.
///
/// `context` must be sorted by `(namespace, id)`, which is how context rows
/// are stored.
pub fn find_range(context: &[WeightedNode], ns_id: u16) -> Option<(usize, usize)> {
    let begin = context.partition_point(|&(node, _)| namespace_of(node) < ns_id);
    let end = context.partition_point(|&(node, _)| namespace_of(node) <= ns_id);
    (begin < end).then_some((begin, end))
}

pub fn contains_node(context: &[WeightedNode], node: NodeId) -> bool {
    let Some((begin, end)) = find_range(context, namespace_of(node)) else {
        return false;
    };
    context[begin..end]
        .binary_search_by(|&(n, _)| n.cmp(&node))
        .is_ok()
}

/// Exact draw over `candidates` restricted to the nodes `eligible` accepts.
/// With `weighted == false`, or when every eligible weight is zero, each
/// eligible node is equally likely.
pub(crate) fn pick_weighted(
    candidates: &[WeightedNode],
    weighted: bool,
    eligible: impl Fn(NodeId) -> bool,
) -> Option<NodeId> {
    let weight = |w: f32| if weighted { w.max(0.0) as f64 } else { 1.0 };

    let total: f64 = candidates
        .iter()
        .filter(|&&(n, _)| eligible(n))
        .map(|&(_, w)| weight(w))
        .sum();

    if total <= 0.0 {
        let count = candidates.iter().filter(|&&(n, _)| eligible(n)).count();
        if count == 0 {
            return None;
        }
        let k = (random_unit() * count as f64) as usize;
        return candidates
            .iter()
            .filter(|&&(n, _)| eligible(n))
            .nth(k.min(count - 1))
            .map(|&(n, _)| n);
    }

    let target = random_unit() * total;
    let mut acc = 0.0;
    let mut last = None;
    for &(node, w) in candidates.iter().filter(|&&(n, _)| eligible(n)) {
        acc += weight(w);
        last = Some(node);
        if target < acc {
            return last;
        }
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::make_node_id;

    fn context() -> Vec<WeightedNode> {
        vec![
            (make_node_id(0, 3), 1.0),
            (make_node_id(0, 9), 1.0),
            (make_node_id(2, 1), 1.0),
            (make_node_id(2, 4), 1.0),
            (make_node_id(2, 8), 1.0),
            (make_node_id(5, 2), 1.0),
        ]
    }

    #[test]
    fn test_find_range() {
        let context = context();
        assert_eq!(find_range(&context, 0), Some((0, 2)));
        assert_eq!(find_range(&context, 2), Some((2, 5)));
        assert_eq!(find_range(&context, 5), Some((5, 6)));
        assert_eq!(find_range(&context, 1), None);
        assert_eq!(find_range(&context, 7), None);
        assert_eq!(find_range(&[], 0), None);
    }

    #[test]
    fn test_contains_node() {
        let context = context();
        assert!(contains_node(&context, make_node_id(2, 4)));
        assert!(contains_node(&context, make_node_id(5, 2)));
        assert!(!contains_node(&context, make_node_id(2, 5)));
        assert!(!contains_node(&context, make_node_id(3, 4)));
    }

    #[test]
    fn test_pick_weighted_respects_filter() {
        let candidates = [(1, 5.0), (2, 0.0), (3, 1.0)];
        for _ in 0..1000 {
            let node = pick_weighted(&candidates, true, |n| n != 1).unwrap();
            assert_eq!(node, 3);
        }
        assert_eq!(pick_weighted(&candidates, true, |_| false), None);

        let zero = [(1, 0.0), (2, 0.0)];
        for _ in 0..100 {
            let node = pick_weighted(&zero, true, |_| true).unwrap();
            assert!(node == 1 || node == 2);
        }
    }
}
