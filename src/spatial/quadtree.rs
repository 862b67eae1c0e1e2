//! Point quadtree over polygon vertices.

use slotmap::SlotMap;

use crate::math::Point2;

slotmap::new_key_type! {
    /// Arena key of a quadtree cell.
    pub struct CellId;
}

/// Subdivision limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadTreeConfig {
    /// Entries a leaf holds before it splits.
    pub capacity: usize,
    /// Cells at or below this extent never split.
    pub min_cell_extent: f32,
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        Self {
            capacity: 4,
            min_cell_extent: 32.0,
        }
    }
}

#[derive(Debug, Clone)]
struct Cell {
    mid: Point2,
    extent: f32,
    entries: Vec<(usize, Point2)>,
    /// Quadrants in order: low x/low y, high x/low y, low x/high y, high x/high y.
    children: Option<[CellId; 4]>,
}

impl Cell {
    fn leaf(mid: Point2, extent: f32) -> Self {
        Self {
            mid,
            extent,
            entries: Vec::new(),
            children: None,
        }
    }

    fn quadrant(&self, p: Point2) -> usize {
        match (p.x < self.mid.x, p.y < self.mid.y) {
            (true, true) => 0,
            (false, true) => 1,
            (true, false) => 2,
            (false, false) => 3,
        }
    }
}

/// Adaptive point quadtree answering "some nearby point that passes a test".
///
/// Only leaves hold entries. A full leaf splits into four children of half
/// the extent unless its extent is already at the configured minimum, in
/// which case it just grows.
#[derive(Debug, Clone)]
pub struct QuadTree {
    cells: SlotMap<CellId, Cell>,
    root: CellId,
    config: QuadTreeConfig,
    len: usize,
}

impl QuadTree {
    /// Creates an empty tree rooted at `mid`; `extent` is the root cell's size.
    #[must_use]
    pub fn new(mid: Point2, extent: f32, config: QuadTreeConfig) -> Self {
        let mut cells = SlotMap::with_key();
        let root = cells.insert(Cell::leaf(mid, extent));
        Self {
            cells,
            root,
            config,
            len: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn config(&self) -> QuadTreeConfig {
        self.config
    }

    pub fn insert(&mut self, id: usize, point: Point2) {
        self.len += 1;
        self.insert_at(self.root, id, point);
    }

    fn insert_at(&mut self, mut cell_id: CellId, id: usize, point: Point2) {
        loop {
            let cell = &self.cells[cell_id];
            if let Some(children) = cell.children {
                cell_id = children[cell.quadrant(point)];
                continue;
            }
            if cell.entries.len() >= self.config.capacity
                && cell.extent > self.config.min_cell_extent
            {
                self.subdivide(cell_id);
                continue;
            }
            self.cells[cell_id].entries.push((id, point));
            return;
        }
    }

    fn subdivide(&mut self, cell_id: CellId) {
        let (mid, extent, entries) = {
            let cell = &mut self.cells[cell_id];
            (cell.mid, cell.extent, std::mem::take(&mut cell.entries))
        };
        let half = extent / 2.0;
        let offsets = [(-half, -half), (half, -half), (-half, half), (half, half)];
        let children = offsets.map(|(dx, dy)| {
            self.cells
                .insert(Cell::leaf(Point2::new(mid.x + dx, mid.y + dy), half))
        });
        self.cells[cell_id].children = Some(children);
        for (id, point) in entries {
            self.insert_at(cell_id, id, point);
        }
    }

    /// Returns the first entry near `query` for which `stop` holds.
    ///
    /// Searches the leaf containing `query` first, then widens to sibling
    /// quadrants level by level on the way back up. `stop` is called at most
    /// once per entry.
    pub fn find_visible_point<F>(&self, query: Point2, mut stop: F) -> Option<usize>
    where
        F: FnMut(usize) -> bool,
    {
        self.find_in(self.root, query, &mut stop)
    }

    fn find_in<F>(&self, cell_id: CellId, query: Point2, stop: &mut F) -> Option<usize>
    where
        F: FnMut(usize) -> bool,
    {
        let cell = &self.cells[cell_id];
        let Some(children) = cell.children else {
            return cell
                .entries
                .iter()
                .map(|&(id, _)| id)
                .find(|&id| stop(id));
        };
        let first = cell.quadrant(query);
        self.find_in(children[first], query, stop).or_else(|| {
            children
                .iter()
                .enumerate()
                .filter(|&(index, _)| index != first)
                .find_map(|(_, &child)| self.find_in(child, query, stop))
        })
    }

    /// Removes every entry but keeps the root cell.
    pub fn clear(&mut self) {
        let (mid, extent) = (self.cells[self.root].mid, self.cells[self.root].extent);
        self.cells.clear();
        self.root = self.cells.insert(Cell::leaf(mid, extent));
        self.len = 0;
    }
}
