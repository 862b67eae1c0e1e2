use super::VisVertices;
use crate::math::intersect_2d::LineCrossing;
use crate::math::Point2;

/// Polygon vertices plus a few free points appended after them.
///
/// Free points get ids `base.len()..base.len() + extras.len()` and are never
/// polygon vertices. This is how injected query points take part in a sweep
/// without touching the shared vertex store.
#[derive(Debug, Clone, Copy)]
pub struct VertexView<'a> {
    base: &'a VisVertices,
    extras: &'a [Point2],
}

impl<'a> VertexView<'a> {
    #[must_use]
    pub fn new(base: &'a VisVertices, extras: &'a [Point2]) -> Self {
        Self { base, extras }
    }

    #[must_use]
    pub fn polygons_only(base: &'a VisVertices) -> Self {
        Self { base, extras: &[] }
    }

    #[must_use]
    pub fn base(&self) -> &'a VisVertices {
        self.base
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.base.len() + self.extras.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if `id` is a polygon slot (vertex or descriptor).
    #[must_use]
    pub fn is_poly(&self, id: usize) -> bool {
        id < self.base.len()
    }

    #[must_use]
    pub fn is_descriptor(&self, id: usize) -> bool {
        self.is_poly(id) && self.base.is_descriptor(id)
    }

    #[must_use]
    pub fn point(&self, id: usize) -> Point2 {
        if self.is_poly(id) {
            self.base.point(id)
        } else {
            self.extras[id - self.base.len()]
        }
    }

    /// Ring predecessor. Only meaningful for polygon vertices.
    #[must_use]
    pub fn prev(&self, id: usize) -> usize {
        self.base.prev(id)
    }

    /// Ring successor. Only meaningful for polygon vertices.
    #[must_use]
    pub fn next(&self, id: usize) -> usize {
        self.base.next(id)
    }

    #[must_use]
    pub fn prev_point(&self, id: usize) -> Point2 {
        self.base.prev_point(id)
    }

    #[must_use]
    pub fn next_point(&self, id: usize) -> Point2 {
        self.base.next_point(id)
    }

    #[must_use]
    pub fn line_to_edge(&self, a1: Point2, a2: Point2, edge_id: usize) -> LineCrossing {
        self.base.line_to_edge(a1, a2, edge_id)
    }
}
