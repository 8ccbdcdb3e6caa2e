//! Breadth-first range queries over a blocking mask.

use std::collections::VecDeque;

use crate::core::CellIdx;

use super::geometry::BoardGeometry;

impl BoardGeometry {
    /// Flood-fill outward from `origin`, at most `max_distance` hops.
    ///
    /// Expands only through cells where `block_mask` is false. With
    /// `stop_at_first_hit`, a blocked cell is still reported as a reachable
    /// endpoint (used for ability targeting, where the target itself blocks
    /// sight) but is never expanded through.
    ///
    /// The result never contains `origin` or an index outside the board.
    /// Each cell is visited at most once, at its minimal distance: a
    /// best-distance array prunes re-expansion, keeping the fill
    /// `O(N * max_distance)` instead of blowing up on deep fills.
    #[must_use]
    pub fn range_from(
        &self,
        origin: CellIdx,
        max_distance: u8,
        block_mask: &[bool],
        stop_at_first_hit: bool,
    ) -> Vec<CellIdx> {
        self.range_from_with_distance(origin, max_distance, block_mask, stop_at_first_hit)
            .into_iter()
            .map(|(cell, _)| cell)
            .collect()
    }

    /// Like [`range_from`](Self::range_from), but pairs each reachable cell
    /// with its hop distance from the origin.
    #[must_use]
    pub fn range_from_with_distance(
        &self,
        origin: CellIdx,
        max_distance: u8,
        block_mask: &[bool],
        stop_at_first_hit: bool,
    ) -> Vec<(CellIdx, u8)> {
        debug_assert_eq!(block_mask.len(), self.cells());

        let mut best = vec![u8::MAX; self.cells()];
        let mut out = Vec::new();
        let mut queue = VecDeque::new();

        best[origin.index()] = 0;
        queue.push_back((origin, 0u8));

        while let Some((cell, dist)) = queue.pop_front() {
            if dist >= max_distance {
                continue;
            }
            for &neighbor in self.neighbors(cell) {
                let next_dist = dist + 1;
                if next_dist >= best[neighbor.index()] {
                    continue;
                }
                best[neighbor.index()] = next_dist;
                if block_mask[neighbor.index()] {
                    if stop_at_first_hit {
                        out.push((neighbor, next_dist));
                    }
                    continue;
                }
                out.push((neighbor, next_dist));
                queue.push_back((neighbor, next_dist));
            }
        }

        out
    }

    /// Shortest-path hop count from `from` to `to` over the blocking mask,
    /// bounded by `max_distance`.
    ///
    /// The destination may itself be blocked (a piece chasing another piece
    /// measures distance to the occupied cell); intermediate cells must be
    /// free. Returns `None` when unreachable within the bound. Used by
    /// fallback heuristics, not by the tree search.
    #[must_use]
    pub fn move_distance(
        &self,
        from: CellIdx,
        to: CellIdx,
        max_distance: u8,
        block_mask: &[bool],
    ) -> Option<u8> {
        if from == to {
            return Some(0);
        }

        let mut best = vec![u8::MAX; self.cells()];
        let mut queue = VecDeque::new();
        best[from.index()] = 0;
        queue.push_back((from, 0u8));

        while let Some((cell, dist)) = queue.pop_front() {
            if dist >= max_distance {
                continue;
            }
            for &neighbor in self.neighbors(cell) {
                let next_dist = dist + 1;
                if next_dist >= best[neighbor.index()] {
                    continue;
                }
                if neighbor == to {
                    return Some(next_dist);
                }
                best[neighbor.index()] = next_dist;
                if !block_mask[neighbor.index()] {
                    queue.push_back((neighbor, next_dist));
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_mask(cells: usize) -> Vec<bool> {
        vec![false; cells]
    }

    #[test]
    fn test_range_never_contains_origin() {
        let geo = BoardGeometry::new(64);
        let mask = open_mask(64);
        let range = geo.range_from(CellIdx::new(27), 3, &mask, false);
        assert!(!range.contains(&CellIdx::new(27)));
        assert!(!range.is_empty());
    }

    #[test]
    fn test_range_respects_distance_bound() {
        let geo = BoardGeometry::new(64);
        let mask = open_mask(64);
        let origin = CellIdx::new(0);

        for (cell, dist) in geo.range_from_with_distance(origin, 2, &mask, false) {
            assert!(dist <= 2);
            let (x, y) = geo.to_coord(cell);
            assert!(x + y <= 2, "{} beyond 2 hops from corner", cell);
        }
    }

    #[test]
    fn test_range_blocked_cells_excluded() {
        let geo = BoardGeometry::new(64);
        let mut mask = open_mask(64);
        mask[1] = true;
        let range = geo.range_from(CellIdx::new(0), 3, &mask, false);
        assert!(!range.contains(&CellIdx::new(1)));
    }

    #[test]
    fn test_range_stop_at_first_hit_reports_endpoint() {
        let geo = BoardGeometry::new(64);
        let mut mask = open_mask(64);
        mask[1] = true;
        mask[2] = true;

        let range = geo.range_from(CellIdx::new(0), 3, &mask, true);
        // The first blocked cell is reachable as an endpoint...
        assert!(range.contains(&CellIdx::new(1)));
        // ...but nothing is expanded through it along that row.
        assert!(!range.contains(&CellIdx::new(2)));
    }

    #[test]
    fn test_range_wall_forces_detour_distance() {
        let geo = BoardGeometry::new(16);
        let mut mask = open_mask(16);
        // Wall across most of the second row of a 4x4 board.
        mask[5] = true;
        mask[6] = true;
        mask[7] = true;

        let ranged: Vec<(CellIdx, u8)> =
            geo.range_from_with_distance(CellIdx::new(1), 6, &mask, false);
        // Cell below the wall (index 9) requires going around via column 0.
        let (_, dist) = ranged
            .iter()
            .find(|(c, _)| *c == CellIdx::new(9))
            .copied()
            .expect("cell 9 should be reachable around the wall");
        assert_eq!(dist, 4);
    }

    #[test]
    fn test_range_zero_distance_is_empty() {
        let geo = BoardGeometry::new(64);
        let mask = open_mask(64);
        assert!(geo.range_from(CellIdx::new(10), 0, &mask, false).is_empty());
    }

    #[test]
    fn test_move_distance_straight_line() {
        let geo = BoardGeometry::new(64);
        let mask = open_mask(64);
        assert_eq!(
            geo.move_distance(CellIdx::new(0), CellIdx::new(3), 10, &mask),
            Some(3)
        );
    }

    #[test]
    fn test_move_distance_unreachable() {
        let geo = BoardGeometry::new(16);
        let mut mask = open_mask(16);
        // Box in cell 0 on a 4x4 board.
        mask[1] = true;
        mask[4] = true;
        assert_eq!(
            geo.move_distance(CellIdx::new(0), CellIdx::new(15), 16, &mask),
            None
        );
    }

    #[test]
    fn test_move_distance_to_blocked_destination() {
        let geo = BoardGeometry::new(64);
        let mut mask = open_mask(64);
        mask[2] = true;
        assert_eq!(
            geo.move_distance(CellIdx::new(0), CellIdx::new(2), 10, &mask),
            Some(2)
        );
    }

    #[test]
    fn test_move_distance_bound() {
        let geo = BoardGeometry::new(64);
        let mask = open_mask(64);
        assert_eq!(
            geo.move_distance(CellIdx::new(0), CellIdx::new(7), 3, &mask),
            None
        );
    }
}
