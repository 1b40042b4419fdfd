//! Point type: an immutable coordinate vector paired with an opaque label.

/// A point in `D`-dimensional space, carrying a caller-supplied label.
///
/// The label is opaque to the index — it is never interpreted, only stored
/// and handed back on search and introspection. Callers typically use a
/// `String` id or a `usize` row number.
#[derive(Debug, Clone, PartialEq)]
pub struct Point<L> {
    coords: Vec<f32>,
    label: L,
}

impl<L> Point<L> {
    /// Create a new point from coordinates and a label.
    pub fn new(coords: Vec<f32>, label: L) -> Self {
        Self { coords, label }
    }

    /// The dimension of this point.
    pub fn dimension(&self) -> usize {
        self.coords.len()
    }

    /// The underlying coordinates.
    pub fn coords(&self) -> &[f32] {
        &self.coords
    }

    /// The caller-supplied label.
    pub fn label(&self) -> &L {
        &self.label
    }

    /// Consume the point, returning its (coords, label) parts.
    pub fn into_parts(self) -> (Vec<f32>, L) {
        (self.coords, self.label)
    }
}
