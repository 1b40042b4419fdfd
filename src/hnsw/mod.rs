//! HNSW (Hierarchical Navigable Small World) index module.

mod graph;
mod level;
mod neighbor_queue;

pub use graph::{HnswParams, NodeView};

use crate::error::{HnswError, Result};
use crate::point::Point;

use graph::HnswGraph;

/// An HNSW-based approximate nearest neighbor index over `Point<L>`s.
///
/// `insert` and `search` orchestrate the layered graph search described in
/// the module docs of [`graph`]: refine the entry point through the sparse
/// upper layers, then run an `ef`-bounded search (construction or query) at
/// the layers the new node or query actually touches.
#[derive(Debug)]
pub struct HnswIndex<L> {
    graph: HnswGraph<L>,
    dimension: Option<usize>,
}

impl<L: Clone> HnswIndex<L> {
    /// Create a new index with the given parameters.
    ///
    /// `seed = Some(s)` makes level assignment (and therefore the resulting
    /// graph and all query results) reproducible across runs with the same
    /// seed and insertion order. `seed = None` uses
    /// OS entropy and is not reproducible.
    pub fn new(params: HnswParams, seed: Option<u64>) -> Self {
        Self {
            graph: HnswGraph::new(params, seed),
            dimension: None,
        }
    }

    /// Create a new index with default parameters and a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::new(HnswParams::default(), Some(seed))
    }

    fn check_dimension(&mut self, dim: usize) -> Result<()> {
        match self.dimension {
            Some(expected) if expected != dim => Err(HnswError::DimensionMismatch {
                expected,
                actual: dim,
            }),
            Some(_) => Ok(()),
            None => {
                self.dimension = Some(dim);
                Ok(())
            }
        }
    }

    /// Insert a point. Fails with `DimensionMismatch` if `point`'s
    /// coordinate length differs from the dimension established by the
    /// first insert; the index is left untouched in that case.
    pub fn insert(&mut self, point: Point<L>) -> Result<()> {
        self.check_dimension(point.dimension())?;
        self.graph.insert(point);
        Ok(())
    }

    /// Search for the `k` nearest neighbors of `query`, using the index's
    /// configured `ef_search`. Returns `min(k, len())` points, ascending by
    /// distance. Returns an empty vec (not an error) if the index is empty.
    pub fn search(&self, query: &Point<L>, k: usize) -> Result<Vec<Point<L>>> {
        let ef = self.graph.params().ef_search;
        self.search_with_ef(query, k, ef)
    }

    /// Search with a specific `ef` value for runtime tuning, without
    /// rebuilding the index.
    pub fn search_with_ef(&self, query: &Point<L>, k: usize, ef: usize) -> Result<Vec<Point<L>>> {
        if k < 1 {
            return Err(HnswError::InvalidConfig("k must be >= 1".into()));
        }
        if let Some(expected) = self.dimension {
            if query.dimension() != expected {
                return Err(HnswError::DimensionMismatch {
                    expected,
                    actual: query.dimension(),
                });
            }
        }
        if self.graph.is_empty() {
            return Ok(Vec::new());
        }

        let results = self.graph.search_knn(query.coords(), k, ef);
        Ok(results
            .into_iter()
            .map(|n| self.graph.get_point(n.id).clone())
            .collect())
    }

    /// The number of points in the index.
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// The dimension established by the first insert, if any.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Read-only enumeration of nodes and their per-layer neighbor labels,
    /// for debugging and tests. No mutation.
    pub fn iter_nodes(&self) -> impl Iterator<Item = NodeView<'_, L>> {
        self.graph.iter_nodes()
    }
}
