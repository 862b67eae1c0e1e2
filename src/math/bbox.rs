use super::Point2;

/// An axis-aligned bounding box in storage precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bbox {
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
}

impl Bbox {
    #[must_use]
    pub fn new(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// Degenerate box containing only `p`.
    #[must_use]
    pub fn point(p: Point2) -> Self {
        Self::new(p.x, p.y, p.x, p.y)
    }

    /// Inverted box that any [`Bbox::enclose`] or [`Bbox::union`] replaces.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(f32::MAX, f32::MAX, f32::MIN, f32::MIN)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.xmin > self.xmax || self.ymin > self.ymax
    }

    /// Returns the box grown to also contain `p`.
    #[must_use]
    pub fn enclose(self, p: Point2) -> Self {
        Self::new(
            self.xmin.min(p.x),
            self.ymin.min(p.y),
            self.xmax.max(p.x),
            self.ymax.max(p.y),
        )
    }

    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self::new(
            self.xmin.min(other.xmin),
            self.ymin.min(other.ymin),
            self.xmax.max(other.xmax),
            self.ymax.max(other.ymax),
        )
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        self.xmax - self.xmin
    }

    #[must_use]
    pub fn height(&self) -> f32 {
        self.ymax - self.ymin
    }

    #[must_use]
    pub fn mid(&self) -> Point2 {
        Point2::new((self.xmin + self.xmax) / 2.0, (self.ymin + self.ymax) / 2.0)
    }

    #[must_use]
    pub fn contains(&self, p: Point2) -> bool {
        p.x >= self.xmin && p.x <= self.xmax && p.y >= self.ymin && p.y <= self.ymax
    }
}

impl Default for Bbox {
    fn default() -> Self {
        Self::empty()
    }
}
