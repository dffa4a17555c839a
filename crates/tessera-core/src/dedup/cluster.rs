//! Clustering candidate-duplicate edges into groups

use std::collections::HashMap;

use petgraph::unionfind::UnionFind;

/// One above-threshold pair, with the score that justified it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
    pub score: f64,
}

/// Transitive closure over candidate edges: if A~B and B~C then A, B, C
/// cluster together even when A and C were never directly compared
/// above threshold. Returns clusters of two or more members, each
/// sorted, in deterministic order.
pub fn connected_components(record_count: usize, edges: &[Edge]) -> Vec<Vec<usize>> {
    let mut dsu: UnionFind<usize> = UnionFind::new(record_count);
    for edge in edges {
        dsu.union(edge.a, edge.b);
    }

    let mut clusters: HashMap<usize, Vec<usize>> = HashMap::new();
    for index in 0..record_count {
        clusters.entry(dsu.find(index)).or_default().push(index);
    }

    let mut result: Vec<Vec<usize>> = clusters
        .into_values()
        .filter(|members| members.len() >= 2)
        .collect();
    result.sort();
    result
}

/// Strict pairwise grouping: walk records in index order, seed a cluster
/// with the first unclaimed record, and attach only records holding a
/// direct above-threshold edge to that seed. Trades recall for
/// precision by refusing to chain weak matches.
pub fn greedy_pairwise(record_count: usize, edges: &[Edge]) -> Vec<Vec<usize>> {
    let mut adjacency: HashMap<usize, Vec<usize>> = HashMap::new();
    for edge in edges {
        adjacency.entry(edge.a).or_default().push(edge.b);
        adjacency.entry(edge.b).or_default().push(edge.a);
    }

    let mut claimed = vec![false; record_count];
    let mut result = Vec::new();
    for seed in 0..record_count {
        if claimed[seed] {
            continue;
        }
        let Some(neighbors) = adjacency.get(&seed) else {
            continue;
        };
        let mut members: Vec<usize> = neighbors
            .iter()
            .copied()
            .filter(|&n| !claimed[n])
            .collect();
        if members.is_empty() {
            continue;
        }
        members.push(seed);
        members.sort();
        members.dedup();
        for &member in &members {
            claimed[member] = true;
        }
        result.push(members);
    }
    result
}
