//! Precomputed geometric lookup tables for a square grid.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::CellIdx;

/// Immutable geometry tables for an `N`-cell square board.
///
/// Construction is `O(N^2)` (one line-of-sight path per ordered cell pair);
/// every query afterwards is a table lookup. For the default 8x8 board that
/// is 4096 paths, built once per process or per imported snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoardGeometry {
    cells: usize,
    width: usize,

    /// 4-directional, edge-clipped neighbor lists, one per cell.
    neighbors: Vec<SmallVec<[CellIdx; 4]>>,

    /// Line-of-sight paths for all ordered pairs, flattened as
    /// `from * cells + to`. Each path excludes `from` and includes `to`;
    /// the path for `from == to` is empty.
    los_paths: Vec<Vec<CellIdx>>,
}

impl BoardGeometry {
    /// Build the geometry tables for a board with `cells` cells.
    ///
    /// # Panics
    ///
    /// Panics if `cells` is zero, not a perfect square, or does not fit
    /// in a `u16` cell index.
    #[must_use]
    pub fn new(cells: usize) -> Self {
        assert!(cells > 0, "board must have at least one cell");
        assert!(cells <= u16::MAX as usize + 1, "board too large for CellIdx");
        let width = (cells as f64).sqrt().round() as usize;
        assert_eq!(width * width, cells, "board must be square");

        let neighbors = Self::build_neighbors(cells, width);
        let los_paths = Self::build_los_paths(cells, width);

        Self {
            cells,
            width,
            neighbors,
            los_paths,
        }
    }

    /// Total number of cells.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> usize {
        self.cells
    }

    /// Side length of the square board.
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Map a cell index to its `(x, y)` coordinate.
    #[inline]
    #[must_use]
    pub fn to_coord(&self, cell: CellIdx) -> (usize, usize) {
        (cell.index() % self.width, cell.index() / self.width)
    }

    /// Map an `(x, y)` coordinate to its cell index.
    #[inline]
    #[must_use]
    pub fn to_index(&self, x: usize, y: usize) -> CellIdx {
        debug_assert!(x < self.width && y < self.width);
        CellIdx::new((y * self.width + x) as u16)
    }

    /// The 4-directional neighbors of a cell, clipped at board edges.
    #[inline]
    #[must_use]
    pub fn neighbors(&self, cell: CellIdx) -> &[CellIdx] {
        &self.neighbors[cell.index()]
    }

    /// The precomputed line-of-sight path from one cell to another.
    ///
    /// The path excludes `from`, includes `to`, and is ordered from the
    /// cell after `from` towards `to`. The intermediate cells are the same
    /// in both directions: paths are rasterized once per unordered pair
    /// and reversed for the opposite direction, so a sight line that is
    /// clear one way is clear the other way.
    #[inline]
    #[must_use]
    pub fn los_path(&self, from: CellIdx, to: CellIdx) -> &[CellIdx] {
        &self.los_paths[from.index() * self.cells + to.index()]
    }

    fn build_neighbors(cells: usize, width: usize) -> Vec<SmallVec<[CellIdx; 4]>> {
        (0..cells)
            .map(|i| {
                let (x, y) = (i % width, i / width);
                let mut out = SmallVec::new();
                if x > 0 {
                    out.push(CellIdx::new((i - 1) as u16));
                }
                if x + 1 < width {
                    out.push(CellIdx::new((i + 1) as u16));
                }
                if y > 0 {
                    out.push(CellIdx::new((i - width) as u16));
                }
                if y + 1 < width {
                    out.push(CellIdx::new((i + width) as u16));
                }
                out
            })
            .collect()
    }

    fn build_los_paths(cells: usize, width: usize) -> Vec<Vec<CellIdx>> {
        let mut paths = vec![Vec::new(); cells * cells];
        for from in 0..cells {
            // Rasterize each unordered pair once; the reverse direction
            // reuses the same cells so LOS stays symmetric.
            for to in (from + 1)..cells {
                let line = Self::bresenham_line(from, to, width);

                paths[from * cells + to] = line[1..].to_vec();

                let mut backward: Vec<CellIdx> = line.iter().rev().copied().collect();
                backward.remove(0);
                paths[to * cells + from] = backward;
            }
        }
        paths
    }

    /// Bresenham rasterization between two cells, including both endpoints.
    fn bresenham_line(from: usize, to: usize, width: usize) -> Vec<CellIdx> {
        let (x0, y0) = ((from % width) as i32, (from / width) as i32);
        let (x1, y1) = ((to % width) as i32, (to / width) as i32);

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        let (mut x, mut y) = (x0, y0);
        let mut line = vec![CellIdx::new(from as u16)];
        while x != x1 || y != y1 {
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
            line.push(CellIdx::new((y as usize * width + x as usize) as u16));
        }
        line
    }
}
