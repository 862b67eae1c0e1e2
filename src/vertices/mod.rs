//! Flat vertex storage with polygon ring topology.
//!
//! Polygons are laid out back to back. Each one is bracketed by a head and a
//! foot [`Slot::Descriptor`]: the head names the polygon's last vertex and the
//! foot names its first, so stepping off either end of a polygon lands on a
//! descriptor that redirects to the opposite end in O(1).
//!
//! ```text
//! [D->3] v1 v2 v3 [D->1] [D->7] v6 v7 ...
//! ```

mod view;

pub use view::VertexView;

use crate::error::{GeometryError, Result};
use crate::math::intersect_2d::{line_to_line, LineCrossing};
use crate::math::orientation::{is_convex, point_in_cw_angle};
use crate::math::{Bbox, Point2};

/// One entry of the vertex arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slot {
    /// A polygon corner.
    Vertex(Point2),
    /// Polygon bracket pointing at the vertex on the opposite end.
    Descriptor { opposite: usize },
}

impl Slot {
    #[must_use]
    pub fn point(self) -> Option<Point2> {
        match self {
            Self::Vertex(p) => Some(p),
            Self::Descriptor { .. } => None,
        }
    }
}

/// Polygon vertices in ring order with descriptor brackets.
///
/// Outer boundaries are expected clockwise and holes counter-clockwise in the
/// crate's left-handed frame; interior tests rely on it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisVertices {
    slots: Vec<Slot>,
}

impl VisVertices {
    /// Lays out `polygons` contiguously with descriptor brackets.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::DegeneratePolygon`] for a polygon with fewer
    /// than 3 vertices and [`GeometryError::NonFiniteCoordinate`] for NaN or
    /// infinite coordinates.
    pub fn from_polygons<P: AsRef<[Point2]>>(polygons: &[P]) -> Result<Self> {
        let count: usize = polygons.iter().map(|p| p.as_ref().len() + 2).sum();
        let mut slots = Vec::with_capacity(count);
        for (index, polygon) in polygons.iter().enumerate() {
            let polygon = polygon.as_ref();
            if polygon.len() < 3 {
                return Err(GeometryError::DegeneratePolygon {
                    index,
                    len: polygon.len(),
                }
                .into());
            }
            if let Some(vertex) = polygon
                .iter()
                .position(|p| !p.x.is_finite() || !p.y.is_finite())
            {
                return Err(GeometryError::NonFiniteCoordinate {
                    polygon: index,
                    vertex,
                }
                .into());
            }
            let head = slots.len();
            slots.push(Slot::Descriptor {
                opposite: head + polygon.len(),
            });
            slots.extend(polygon.iter().copied().map(Slot::Vertex));
            slots.push(Slot::Descriptor { opposite: head + 1 });
        }
        Ok(Self { slots })
    }

    /// Wraps already laid out slots. Descriptor targets must be in range.
    pub(crate) fn from_slots(slots: Vec<Slot>) -> Self {
        Self { slots }
    }

    /// Number of slots, descriptors included. Ids range over `0..len()`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    #[must_use]
    pub fn slot(&self, id: usize) -> Slot {
        self.slots[id]
    }

    #[must_use]
    pub fn is_descriptor(&self, id: usize) -> bool {
        matches!(self.slots[id], Slot::Descriptor { .. })
    }

    /// Coordinates of `id`. Descriptors read as a point at negative
    /// infinity, which never equals a real vertex.
    #[must_use]
    pub fn point(&self, id: usize) -> Point2 {
        self.slots[id]
            .point()
            .unwrap_or_else(|| Point2::new(f32::NEG_INFINITY, f32::NEG_INFINITY))
    }

    fn resolve(&self, id: usize) -> usize {
        match self.slots[id] {
            Slot::Descriptor { opposite } => opposite,
            Slot::Vertex(_) => id,
        }
    }

    /// Previous vertex on the polygon ring of `id`.
    #[must_use]
    pub fn prev(&self, id: usize) -> usize {
        self.resolve(id - 1)
    }

    /// Next vertex on the polygon ring of `id`.
    #[must_use]
    pub fn next(&self, id: usize) -> usize {
        self.resolve(id + 1)
    }

    #[must_use]
    pub fn prev_point(&self, id: usize) -> Point2 {
        self.point(self.prev(id))
    }

    #[must_use]
    pub fn next_point(&self, id: usize) -> Point2 {
        self.point(self.next(id))
    }

    /// Ids of all real vertices in storage order.
    pub fn vertex_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| matches!(slot, Slot::Vertex(_)).then_some(id))
    }

    /// Number of real vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_ids().count()
    }

    /// Id of the first vertex at exactly `point`.
    #[must_use]
    pub fn find_vertex(&self, point: Point2) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| *slot == Slot::Vertex(point))
    }

    /// Endpoints of obstacle edge `id`, which runs from `id` to its successor.
    #[must_use]
    pub fn edge(&self, id: usize) -> (Point2, Point2) {
        (self.point(id), self.next_point(id))
    }

    /// Intersects segment `a1 -> a2` with obstacle edge `edge_id`.
    #[must_use]
    pub fn line_to_edge(&self, a1: Point2, a2: Point2, edge_id: usize) -> LineCrossing {
        let (b1, b2) = self.edge(edge_id);
        line_to_line(a1, a2, b1, b2)
    }

    /// True if the corner at `id` is convex (interior angle below 180 degrees).
    #[must_use]
    pub fn is_convex_at(&self, id: usize) -> bool {
        is_convex(self.prev_point(id), self.point(id), self.next_point(id))
    }

    /// True if `p` lies in the non-taut region of corner `id`.
    ///
    /// That region is the interior angle mirrored through the corner: a path
    /// bending around `id` towards such a point could be shortened.
    #[must_use]
    pub fn is_in_non_taut_region(&self, id: usize, p: Point2) -> bool {
        let center = self.point(id);
        let mirrored_next = Point2::origin() - (self.next_point(id) - center);
        let mirrored_prev = Point2::origin() - (self.prev_point(id) - center);
        let local = Point2::origin() + (p - center);
        point_in_cw_angle(Point2::origin(), mirrored_next, mirrored_prev, local)
    }

    /// Bounding box of all real vertices; [`Bbox::empty`] when there are none.
    #[must_use]
    pub fn bounds(&self) -> Bbox {
        self.slots
            .iter()
            .filter_map(|slot| slot.point())
            .fold(Bbox::empty(), Bbox::enclose)
    }
}
