//! Weighted PageRank over sentence-similarity graphs

use std::collections::HashSet;

const DAMPING: f64 = 0.85;
const MAX_ITERATIONS: usize = 200;
const TOLERANCE: f64 = 1.0e-6;

/// Symmetric weighted adjacency matrix
#[derive(Debug, Clone)]
pub struct Graph {
    weights: Vec<Vec<f64>>,
}

impl Graph {
    /// Graph with `n` nodes and no edges
    pub fn new(n: usize) -> Self {
        Self {
            weights: vec![vec![0.0; n]; n],
        }
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Set an undirected edge; self-loops are ignored
    pub fn set_edge(&mut self, a: usize, b: usize, weight: f64) {
        if a == b {
            return;
        }
        self.weights[a][b] = weight;
        self.weights[b][a] = weight;
    }

    /// Power-iteration PageRank. Dangling nodes spread their score uniformly.
    pub fn pagerank(&self) -> Vec<f64> {
        let n = self.len();
        if n == 0 {
            return Vec::new();
        }

        let uniform = 1.0 / n as f64;
        let out_weight: Vec<f64> = self.weights.iter().map(|row| row.iter().sum()).collect();
        let mut scores = vec![uniform; n];

        for _ in 0..MAX_ITERATIONS {
            let dangling: f64 = scores
                .iter()
                .zip(&out_weight)
                .filter(|(_, w)| **w == 0.0)
                .map(|(s, _)| s)
                .sum();

            let mut next = vec![(1.0 - DAMPING) * uniform + DAMPING * dangling * uniform; n];
            for (j, row) in self.weights.iter().enumerate() {
                if out_weight[j] == 0.0 {
                    continue;
                }
                let share = DAMPING * scores[j] / out_weight[j];
                for (i, w) in row.iter().enumerate() {
                    if *w > 0.0 {
                        next[i] += share * w;
                    }
                }
            }

            let delta: f64 = next.iter().zip(&scores).map(|(a, b)| (a - b).abs()).sum();
            scores = next;
            if delta < n as f64 * TOLERANCE {
                break;
            }
        }

        scores
    }
}

/// Node indices ordered by descending score; ties keep index order
pub fn ranked(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|a, b| {
        scores[*b]
            .partial_cmp(&scores[*a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order
}

/// Sentence similarity: distinct shared words over `ln|a| + ln|b|`
pub fn similarity(a: &[String], b: &[String]) -> f64 {
    let denominator = (a.len() as f64).ln() + (b.len() as f64).ln();
    if a.is_empty() || b.is_empty() || denominator.abs() < 1.0e-12 {
        return 0.0;
    }

    let left: HashSet<&str> = a.iter().map(String::as_str).collect();
    let right: HashSet<&str> = b.iter().map(String::as_str).collect();
    let shared = left.intersection(&right).count();

    shared as f64 / denominator
}

/// Rank sentences given their filtered word lists
pub fn rank_sentences(words: &[Vec<String>]) -> Vec<usize> {
    let mut graph = Graph::new(words.len());
    for i in 0..words.len() {
        for j in (i + 1)..words.len() {
            let weight = similarity(&words[i], &words[j]);
            if weight > 0.0 {
                graph.set_edge(i, j, weight);
            }
        }
    }
    ranked(&graph.pagerank())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_pagerank_sums_to_one() {
        let mut graph = Graph::new(4);
        graph.set_edge(0, 1, 1.0);
        graph.set_edge(1, 2, 1.0);
        // node 3 is dangling
        let scores = graph.pagerank();
        let total: f64 = scores.iter().sum();
        assert!((total - 1.0).abs() < 1.0e-6);
    }

    #[test]
    fn test_hub_ranks_first() {
        let mut graph = Graph::new(4);
        graph.set_edge(0, 3, 1.0);
        graph.set_edge(1, 3, 1.0);
        graph.set_edge(2, 3, 1.0);
        assert_eq!(ranked(&graph.pagerank())[0], 3);
    }

    #[test]
    fn test_ranked_ties_keep_order() {
        assert_eq!(ranked(&[0.5, 0.5, 0.9]), vec![2, 0, 1]);
    }

    #[test]
    fn test_similarity() {
        let a = words(&["graph", "rank", "node"]);
        let b = words(&["graph", "node", "edge"]);
        let expected = 2.0 / (3.0_f64.ln() * 2.0);
        assert!((similarity(&a, &b) - expected).abs() < 1.0e-12);

        // single-word sentences have a zero denominator
        assert_eq!(similarity(&words(&["a"]), &words(&["a"])), 0.0);
        assert_eq!(similarity(&[], &b), 0.0);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(Graph::new(0).pagerank().is_empty());
        assert!(rank_sentences(&[]).is_empty());
    }
}
