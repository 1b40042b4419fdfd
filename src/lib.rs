//! # hnsw-index
//!
//! An in-memory approximate nearest-neighbor (ANN) index over
//! fixed-dimensional real vectors, built on the Hierarchical Navigable Small
//! World (HNSW) graph: a multi-layer proximity graph that delivers
//! sub-linear query time with high recall by combining long-range
//! shortcuts at sparse upper layers with dense local connectivity at the
//! base layer.
//!
//! ## Example
//!
//! ```rust
//! use hnsw_index::{HnswIndex, HnswParams, Point};
//!
//! let params = HnswParams::new(16, 200, 50).unwrap();
//! let mut index: HnswIndex<&str> = HnswIndex::new(params, Some(42));
//!
//! index.insert(Point::new(vec![1.0, 2.0, 3.0], "a")).unwrap();
//! index.insert(Point::new(vec![4.0, 5.0, 6.0], "b")).unwrap();
//!
//! let results = index.search(&Point::new(vec![1.1, 2.1, 3.1], "q"), 1).unwrap();
//! assert_eq!(*results[0].label(), "a");
//! ```

pub mod distance;
pub mod error;
mod hnsw;
pub mod point;

pub use error::{HnswError, Result};
pub use hnsw::{HnswIndex, HnswParams, NodeView};
pub use point::Point;
