//! Search statistics keyed by state fingerprint
//!
//! The tree is a pair of hash maps rather than a linked structure: transpositions
//! share one entry, and a state reached by different move orders accumulates
//! statistics in one place.
//!
//! ## Architecture
//! - [`Node`]: per-state prior, legal actions, visit count and edges
//! - [`Edge`]: per-action visit count and mean value
//! - [`SearchTree`]: the two maps (terminal cache and expanded nodes)

use nonaga_core::{Fingerprint, Outcome};
use rustc_hash::FxHashMap;

// ============================================================================
// TYPES
// ============================================================================

/// Statistics for one (state, action) pair
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Edge {
    /// N(s,a)
    pub visits: u32,
    /// Q(s,a): mean return for the player to move at s
    pub value: f64,
}

/// An expanded state
#[derive(Clone, Debug)]
pub struct Node {
    /// N(s)
    pub visits: u32,
    /// Legal actions in ascending index order
    pub legal: Vec<usize>,
    /// P(s,a) for each entry of `legal`, summing to 1
    pub priors: Vec<f64>,
    /// Edges that have been tried at least once
    pub edges: FxHashMap<usize, Edge>,
}

impl Node {
    /// Create a node from legal actions and their (normalized) priors
    pub fn new(legal: Vec<usize>, priors: Vec<f64>) -> Self {
        debug_assert_eq!(legal.len(), priors.len());
        Self {
            visits: 0,
            legal,
            priors,
            edges: FxHashMap::default(),
        }
    }

    /// Upper confidence bound of the `i`-th legal action
    pub fn ucb(&self, i: usize, c_puct: f64, epsilon: f64) -> f64 {
        let prior = self.priors[i];
        let parent = self.visits as f64;

        match self.edges.get(&self.legal[i]) {
            Some(edge) => edge.value + c_puct * prior * parent.sqrt() / (1.0 + edge.visits as f64),
            None => c_puct * prior * (parent + epsilon).sqrt(),
        }
    }

    /// Action with the highest UCB; ties go to the lowest index
    pub fn select(&self, c_puct: f64, epsilon: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for i in 0..self.legal.len() {
            let ucb = self.ucb(i, c_puct, epsilon);
            if best.map_or(true, |(_, b)| ucb > b) {
                best = Some((self.legal[i], ucb));
            }
        }
        best.map(|(action, _)| action)
    }

    /// Fold one simulation's return into the running mean of `action`
    pub fn record(&mut self, action: usize, value: f64) {
        let edge = self.edges.entry(action).or_default();
        edge.value = (edge.visits as f64 * edge.value + value) / (edge.visits as f64 + 1.0);
        edge.visits += 1;
        self.visits += 1;
    }

    /// N(s,a), zero for untried actions
    pub fn edge_visits(&self, action: usize) -> u32 {
        self.edges.get(&action).map_or(0, |edge| edge.visits)
    }

    /// Prior of `action`, zero if it is not legal
    pub fn prior(&self, action: usize) -> f64 {
        self.legal
            .binary_search(&action)
            .map_or(0.0, |i| self.priors[i])
    }
}

// ============================================================================
// SEARCH TREE
// ============================================================================

/// All statistics owned by one search (one per episode)
#[derive(Debug, Default)]
pub struct SearchTree {
    /// Ended(s): cached result for the player to move
    ended: FxHashMap<Fingerprint, Outcome>,
    /// Expanded states
    nodes: FxHashMap<Fingerprint, Node>,
}

impl SearchTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of expanded states
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Cached terminal check, computing it on first request
    pub fn outcome(&mut self, key: &Fingerprint, compute: impl FnOnce() -> Outcome) -> Outcome {
        if let Some(&outcome) = self.ended.get(key) {
            return outcome;
        }
        let outcome = compute();
        self.ended.insert(key.clone(), outcome);
        outcome
    }

    pub fn node(&self, key: &Fingerprint) -> Option<&Node> {
        self.nodes.get(key)
    }

    pub fn node_mut(&mut self, key: &Fingerprint) -> Option<&mut Node> {
        self.nodes.get_mut(key)
    }

    pub fn insert(&mut self, key: Fingerprint, node: Node) {
        self.nodes.insert(key, node);
    }

    /// Edge visit counts at `key` over an action space of `size`
    pub fn counts(&self, key: &Fingerprint, size: usize) -> Vec<u32> {
        let mut counts = vec![0; size];
        if let Some(node) = self.nodes.get(key) {
            for &action in node.legal.iter().filter(|&&action| action < size) {
                counts[action] = node.edge_visits(action);
            }
        }
        counts
    }

    /// Drop every statistic
    pub fn clear(&mut self) {
        self.ended.clear();
        self.nodes.clear();
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use nonaga_core::{Board, Player};

    fn three_way() -> Node {
        Node::new(vec![2, 5, 9], vec![0.2, 0.5, 0.3])
    }

    #[test]
    fn test_unvisited_node_follows_prior() {
        let node = three_way();
        assert_eq!(node.select(1.0, 1e-8), Some(5));
    }

    #[test]
    fn test_ties_go_to_lowest_index() {
        let node = Node::new(vec![3, 4, 7], vec![1.0 / 3.0; 3]);
        assert_eq!(node.select(1.0, 1e-8), Some(3));
    }

    #[test]
    fn test_record_keeps_running_mean() {
        let mut node = three_way();
        node.record(5, 1.0);
        node.record(5, -1.0);
        node.record(5, 1.0);

        let edge = &node.edges[&5];
        assert_eq!(edge.visits, 3);
        assert!((edge.value - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(node.visits, 3);
        assert_eq!(node.edge_visits(2), 0);
    }

    #[test]
    fn test_ucb_formula() {
        let mut node = three_way();
        node.record(2, 0.5);
        node.record(9, -1.0);
        node.record(9, -1.0);

        // Seen edge: Q + c * P * sqrt(N) / (1 + N(s,a))
        let expected = 0.5 + 1.5 * 0.2 * 3f64.sqrt() / 2.0;
        assert!((node.ucb(0, 1.5, 1e-8) - expected).abs() < 1e-12);

        // Unseen edge: c * P * sqrt(N + eps)
        let expected = 1.5 * 0.5 * (3.0 + 1e-8f64).sqrt();
        assert!((node.ucb(1, 1.5, 1e-8) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_losing_edge_is_avoided() {
        let mut node = three_way();
        node.record(5, -1.0);
        node.record(5, -1.0);
        assert_ne!(node.select(1.0, 1e-8), Some(5));
    }

    #[test]
    fn test_prior_lookup() {
        let node = three_way();
        assert_eq!(node.prior(9), 0.3);
        assert_eq!(node.prior(4), 0.0);
    }

    #[test]
    fn test_tree_caches_outcomes_and_counts() {
        let mut tree = SearchTree::new();
        let key = Board::initial().canonical(Player::Red).fingerprint().clone();

        let mut calls = 0;
        for _ in 0..3 {
            let outcome = tree.outcome(&key, || {
                calls += 1;
                Outcome::Ongoing
            });
            assert_eq!(outcome, Outcome::Ongoing);
        }
        assert_eq!(calls, 1);

        let mut node = three_way();
        node.record(9, 0.0);
        tree.insert(key.clone(), node);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.counts(&key, 10)[9], 1);
        // Actions beyond the requested size are skipped
        assert_eq!(tree.counts(&key, 4), vec![0; 4]);

        tree.clear();
        assert!(tree.is_empty());
        assert!(tree.node(&key).is_none());
    }
}
