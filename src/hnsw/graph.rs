//! HNSW graph — core data structures and algorithms.
//!
//! Implements the Hierarchical Navigable Small World graph from:
//! "Efficient and robust approximate nearest neighbor search using
//!  Hierarchical Navigable Small World graphs" (Malkov & Yashunin, 2016/2018).

use std::collections::HashSet;

use crate::distance::euclidean;
use crate::error::{HnswError, Result};
use crate::point::Point;

use super::level::LevelSampler;
use super::neighbor_queue::{MaxHeap, MinHeap, Neighbor};

/// Configuration parameters for the HNSW index.
#[derive(Debug, Clone)]
pub struct HnswParams {
    /// Target neighbor count per node per layer (layers > 0).
    pub m: usize,
    /// Hard cap at layer 0 (defaults to `2 * m`).
    pub m_max0: usize,
    /// Size of the dynamic candidate list during construction.
    pub ef_construction: usize,
    /// Size of the dynamic candidate list during search, independent of `k`.
    pub ef_search: usize,
    /// Level generation multiplier: `floor(-ln(r) * ml)`.
    pub ml: f64,
    /// Safety cap on the number of layers a single node may span.
    pub max_layers: usize,
}

impl Default for HnswParams {
    fn default() -> Self {
        let m = 16;
        Self {
            m,
            m_max0: 2 * m,
            ef_construction: 200,
            ef_search: 50,
            ml: 1.0 / (m as f64).ln(),
            max_layers: 16,
        }
    }
}

impl HnswParams {
    /// Construct parameters with `ml` derived as `1 / ln(m)` (the reference
    /// default) and `m_max0 = 2 * m`.
    pub fn new(m: usize, ef_construction: usize, ef_search: usize) -> Result<Self> {
        Self::with_level_mult(m, ef_construction, ef_search, 1.0 / (m.max(2) as f64).ln())
    }

    /// Construct parameters with an explicit level multiplier.
    pub fn with_level_mult(
        m: usize,
        ef_construction: usize,
        ef_search: usize,
        ml: f64,
    ) -> Result<Self> {
        if m < 1 {
            return Err(HnswError::InvalidConfig("m must be >= 1".into()));
        }
        if ef_construction < 1 {
            return Err(HnswError::InvalidConfig(
                "ef_construction must be >= 1".into(),
            ));
        }
        if ef_search < 1 {
            return Err(HnswError::InvalidConfig("ef_search must be >= 1".into()));
        }
        if !(ml > 0.0) {
            return Err(HnswError::InvalidConfig("level_mult must be > 0".into()));
        }
        Ok(Self {
            m,
            m_max0: 2 * m,
            ef_construction,
            ef_search,
            ml,
            max_layers: 16,
        })
    }
}

/// A node in the HNSW graph.
#[derive(Debug, Clone)]
struct HnswNode<L> {
    point: Point<L>,
    /// Neighbors per layer. neighbors[l] is the list of neighbor ids at layer l.
    neighbors: Vec<Vec<usize>>,
    /// The maximum layer this node was inserted into.
    top_level: usize,
}

/// A read-only view of one node, for introspection.
#[derive(Debug, Clone)]
pub struct NodeView<'a, L> {
    pub label: &'a L,
    pub coords: &'a [f32],
    pub top_level: usize,
    /// Neighbor labels per layer, `neighbors[l]` for `0..=top_level`.
    pub neighbors: Vec<Vec<&'a L>>,
}

/// The HNSW graph structure: an append-only node arena plus the global
/// entry point and current maximum layer.
#[derive(Debug)]
pub struct HnswGraph<L> {
    nodes: Vec<HnswNode<L>>,
    entry_point: Option<usize>,
    max_level: usize,
    params: HnswParams,
    sampler: LevelSampler,
}

impl<L: Clone> HnswGraph<L> {
    pub fn new(params: HnswParams, seed: Option<u64>) -> Self {
        let sampler = LevelSampler::new(params.ml, params.max_layers, seed);
        Self {
            nodes: Vec::new(),
            entry_point: None,
            max_level: 0,
            params,
            sampler,
        }
    }

    pub fn params(&self) -> &HnswParams {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn distance(&self, query: &[f32], node_id: usize) -> f32 {
        euclidean(query, self.nodes[node_id].point.coords())
    }

    /// `search_layer(q, entry, l, ef)` — bounded best-first search over a
    /// single layer starting from a single entry node (Algorithm 2 from the
    /// HNSW paper, specialized to one entry point).
    fn search_layer(&self, query: &[f32], entry: usize, layer: usize, ef: usize) -> Vec<Neighbor> {
        let mut visited = HashSet::new();
        let mut frontier = MinHeap::new();
        let mut results = MaxHeap::new();

        let d = self.distance(query, entry);
        visited.insert(entry);
        frontier.push(Neighbor::new(entry, d));
        results.push(Neighbor::new(entry, d));

        while let Some(c) = frontier.pop() {
            let bound = results.peek().map(|n| n.distance).unwrap_or(f32::MAX);
            if c.distance > bound {
                break;
            }

            let node = &self.nodes[c.id];
            if layer < node.neighbors.len() {
                for &neighbor_id in &node.neighbors[layer] {
                    if visited.contains(&neighbor_id) {
                        continue;
                    }
                    visited.insert(neighbor_id);

                    let d = self.distance(query, neighbor_id);
                    let bound = results.peek().map(|n| n.distance).unwrap_or(f32::MAX);

                    if results.len() < ef || d < bound {
                        frontier.push(Neighbor::new(neighbor_id, d));
                        results.push(Neighbor::new(neighbor_id, d));
                        if results.len() > ef {
                            results.pop();
                        }
                    }
                }
            }
        }

        results.into_sorted_vec()
    }

    /// Select the `m` closest distinct candidates (simple selection policy,
    /// Algorithm 3's "simple" variant — candidates are already distance-sorted
    /// ascending by `search_layer`).
    fn select_neighbors_simple(candidates: &[Neighbor], m: usize) -> Vec<usize> {
        candidates.iter().take(m).map(|n| n.id).collect()
    }

    /// Prune `node_id`'s adjacency list at `layer` back to its `m` closest
    /// peers, removing the reciprocal edge on every dropped peer so
    /// bidirectionality (invariant 2) is preserved.
    fn prune_neighbors(&mut self, node_id: usize, layer: usize, m: usize) {
        let node_coords = self.nodes[node_id].point.coords().to_vec();
        let neighbor_ids = self.nodes[node_id].neighbors[layer].clone();

        let mut scored: Vec<(usize, f32)> = neighbor_ids
            .iter()
            .map(|&nid| (nid, euclidean(&node_coords, self.nodes[nid].point.coords())))
            .collect();
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let kept: HashSet<usize> = scored.iter().take(m).map(|(id, _)| *id).collect();
        let dropped: Vec<usize> = neighbor_ids
            .into_iter()
            .filter(|id| !kept.contains(id))
            .collect();

        self.nodes[node_id].neighbors[layer] = scored
            .into_iter()
            .take(m)
            .map(|(id, _)| id)
            .collect();

        for dropped_id in dropped {
            if layer < self.nodes[dropped_id].neighbors.len() {
                self.nodes[dropped_id].neighbors[layer].retain(|&id| id != node_id);
            }
        }
    }

    /// `insert` — Algorithm 1 from the HNSW paper: descend to `L_max`, not
    /// the new node's own level, before linking at the layers it spans.
    pub fn insert(&mut self, point: Point<L>) -> usize {
        let level = self.sampler.sample();
        let id = self.nodes.len();

        self.nodes.push(HnswNode {
            point: point.clone(),
            neighbors: vec![Vec::new(); level + 1],
            top_level: level,
        });

        let entry_point = match self.entry_point {
            None => {
                self.entry_point = Some(id);
                self.max_level = level;
                return id;
            }
            Some(ep) => ep,
        };

        let mut ep_id = entry_point;
        let current_max_level = self.max_level;
        let coords = point.coords();

        // Phase 1: greedy descent from L_max down to level+1 with ef=1.
        if current_max_level > level {
            for l in (level + 1..=current_max_level).rev() {
                let nearest = self.search_layer(coords, ep_id, l, 1);
                if let Some(n) = nearest.first() {
                    ep_id = n.id;
                }
            }
        }

        // Phase 2: link at layers min(L_max, level) down to 0.
        let insert_from = level.min(current_max_level);
        for l in (0..=insert_from).rev() {
            let m_max = if l == 0 {
                self.params.m_max0
            } else {
                self.params.m
            };

            let nearest = self.search_layer(coords, ep_id, l, self.params.ef_construction);
            let neighbors = Self::select_neighbors_simple(&nearest, self.params.m);

            self.nodes[id].neighbors[l] = neighbors.clone();

            for &neighbor_id in &neighbors {
                let needs_pruning = {
                    let neighbor_node = &mut self.nodes[neighbor_id];
                    if l < neighbor_node.neighbors.len() && !neighbor_node.neighbors[l].contains(&id)
                    {
                        neighbor_node.neighbors[l].push(id);
                        neighbor_node.neighbors[l].len() > m_max
                    } else {
                        false
                    }
                };
                if needs_pruning {
                    self.prune_neighbors(neighbor_id, l, m_max);
                }
            }

            if let Some(n) = nearest.first() {
                ep_id = n.id;
            }
        }

        if level > self.max_level {
            self.entry_point = Some(id);
            self.max_level = level;
        }

        id
    }

    /// `search` — Algorithm 5 from the HNSW paper: descend to layer 1 with
    /// ef=1, then run an `ef`-bounded search at layer 0 and return the `k`
    /// closest.
    pub fn search_knn(&self, query: &[f32], k: usize, ef: usize) -> Vec<Neighbor> {
        let entry_point = match self.entry_point {
            Some(ep) => ep,
            None => return Vec::new(),
        };

        let mut ep_id = entry_point;
        for l in (1..=self.max_level).rev() {
            let nearest = self.search_layer(query, ep_id, l, 1);
            if let Some(n) = nearest.first() {
                ep_id = n.id;
            }
        }

        let ef_actual = ef.max(k);
        let mut results = self.search_layer(query, ep_id, 0, ef_actual);
        results.truncate(k);
        results
    }

    pub fn get_point(&self, id: usize) -> &Point<L> {
        &self.nodes[id].point
    }

    /// Read-only enumeration of nodes and their per-layer adjacency, for
    /// debugging and tests. No mutation.
    pub fn iter_nodes(&self) -> impl Iterator<Item = NodeView<'_, L>> {
        self.nodes.iter().map(|node| NodeView {
            label: node.point.label(),
            coords: node.point.coords(),
            top_level: node.top_level,
            neighbors: node
                .neighbors
                .iter()
                .map(|layer| {
                    layer
                        .iter()
                        .map(|&nid| self.nodes[nid].point.label())
                        .collect()
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_params() -> HnswParams {
        HnswParams::new(4, 32, 16).unwrap()
    }

    fn graph(seed: u64) -> HnswGraph<usize> {
        HnswGraph::new(make_params(), Some(seed))
    }

    #[test]
    fn test_insert_single() {
        let mut g = graph(1);
        g.insert(Point::new(vec![1.0, 0.0, 0.0], 0));
        assert_eq!(g.len(), 1);
        assert!(g.entry_point.is_some());
    }

    #[test]
    fn test_insert_multiple() {
        let mut g = graph(1);
        for i in 0..10 {
            g.insert(Point::new(vec![i as f32, 0.0, 0.0], i));
        }
        assert_eq!(g.len(), 10);
    }

    #[test]
    fn test_self_search() {
        let mut g = graph(2);
        let points: Vec<Point<usize>> = (0..100)
            .map(|i| {
                Point::new(
                    vec![(i as f32) * 0.1, ((i * 7) as f32) * 0.1, ((i * 13) as f32) * 0.1],
                    i,
                )
            })
            .collect();

        for p in &points {
            g.insert(p.clone());
        }

        for p in &points {
            let results = g.search_knn(p.coords(), 1, 16);
            assert!(!results.is_empty());
            assert!(results[0].distance < 1e-4);
        }
    }

    #[test]
    fn test_search_knn() {
        let mut g = graph(3);
        for i in 0..5 {
            g.insert(Point::new(vec![i as f32, 0.0], i));
        }

        let results = g.search_knn(&[0.5, 0.0], 2, 16);
        assert_eq!(results.len(), 2);
        let ids: HashSet<usize> = results.iter().map(|n| n.id).collect();
        assert!(ids.contains(&0));
        assert!(ids.contains(&1));
    }

    #[test]
    fn test_degree_cap_holds() {
        let params = HnswParams::new(8, 64, 32).unwrap();
        let mut g: HnswGraph<usize> = HnswGraph::new(params.clone(), Some(9));
        let mut rng_seed = 1u64;
        for i in 0..500 {
            rng_seed = rng_seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            let a = ((rng_seed >> 32) as u32 % 1000) as f32 / 10.0;
            rng_seed = rng_seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            let b = ((rng_seed >> 32) as u32 % 1000) as f32 / 10.0;
            g.insert(Point::new(vec![a, b], i));
        }

        for node in &g.nodes {
            for (l, neighbors) in node.neighbors.iter().enumerate() {
                let cap = if l == 0 { params.m_max0 } else { params.m };
                assert!(neighbors.len() <= cap, "layer {} exceeded cap: {}", l, neighbors.len());
                // no self-loops, no duplicates
                let unique: HashSet<usize> = neighbors.iter().copied().collect();
                assert_eq!(unique.len(), neighbors.len());
            }
        }
    }

    #[test]
    fn test_bidirectional_edges() {
        let mut g = graph(4);
        for i in 0..50 {
            g.insert(Point::new(vec![i as f32, (i * 3) as f32], i));
        }

        for (a_id, node) in g.nodes.iter().enumerate() {
            for (l, neighbors) in node.neighbors.iter().enumerate() {
                for &b_id in neighbors {
                    let b_neighbors = &g.nodes[b_id].neighbors[l];
                    assert!(
                        b_neighbors.contains(&a_id),
                        "edge {}->{} at layer {} is not reciprocated",
                        a_id,
                        b_id,
                        l
                    );
                }
            }
        }
    }

    #[test]
    fn test_layer_membership() {
        let mut g = graph(5);
        for i in 0..50 {
            g.insert(Point::new(vec![i as f32], i));
        }
        for node in &g.nodes {
            assert_eq!(node.neighbors.len(), node.top_level + 1);
        }
    }

    #[test]
    fn test_entry_consistency() {
        let mut g = graph(6);
        for i in 0..200 {
            g.insert(Point::new(vec![i as f32, -(i as f32)], i));
        }
        let ep = g.entry_point.unwrap();
        assert_eq!(g.nodes[ep].top_level, g.max_level);
        let true_max = g.nodes.iter().map(|n| n.top_level).max().unwrap();
        assert_eq!(g.max_level, true_max);
    }

    #[test]
    fn test_deterministic_construction() {
        let build = |seed| {
            let mut g = HnswGraph::<usize>::new(make_params(), Some(seed));
            for i in 0..30 {
                g.insert(Point::new(vec![i as f32 * 0.3, (i as f32 * 0.7).sin()], i));
            }
            g
        };
        let a = build(77);
        let b = build(77);
        assert_eq!(a.max_level, b.max_level);
        for (na, nb) in a.nodes.iter().zip(b.nodes.iter()) {
            assert_eq!(na.top_level, nb.top_level);
            assert_eq!(na.neighbors, nb.neighbors);
        }
    }
}
