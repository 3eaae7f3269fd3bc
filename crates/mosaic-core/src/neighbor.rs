//! Periodicity-aware k-nearest-neighbor index.
//!
//! Linked-cell grid over the box: a head map from cell coordinates to the
//! first point in that cell plus a `next` list chaining the rest. Cell
//! coordinates wrap along periodic axes, so a point near one face of the
//! box is found as a near neighbor of a query near the opposite face.

use fxhash::{FxHashMap, FxHashSet};

use crate::bounds::BoundBox;
use crate::error::{CoreError, CoreResult};
use crate::geom::Vec3;
use crate::pbc;

pub struct PeriodicNeighborIndex {
    positions: Vec<Vec3>,
    box_: BoundBox,
    periodicity: [bool; 3],
    dims: [i64; 3],
    cell: [f64; 3],
    map: FxHashMap<(i64, i64, i64), usize>,
    next: Vec<usize>,
}

const END_OF_LIST: usize = usize::MAX;

impl PeriodicNeighborIndex {
    pub fn new(
        positions: &[Vec3],
        box_: BoundBox,
        periodicity: [bool; 3],
    ) -> CoreResult<Self> {
        if positions.is_empty() {
            return Err(CoreError::Invalid(
                "neighbor index requires at least one point".into(),
            ));
        }
        let lengths = box_.lengths;
        // Aim for O(1) points per cell; the grid must tile the box exactly
        // for cell wrapping on periodic axes to line up.
        let volume = lengths[0] * lengths[1] * lengths[2];
        let target = (volume / positions.len() as f64).cbrt().max(1.0e-6);
        let mut dims = [1i64; 3];
        let mut cell = [0.0f64; 3];
        for axis in 0..3 {
            dims[axis] = ((lengths[axis] / target).floor() as i64).max(1);
            cell[axis] = lengths[axis] / dims[axis] as f64;
        }

        let mut index = Self {
            positions: positions.to_vec(),
            box_,
            periodicity,
            dims,
            cell,
            map: FxHashMap::default(),
            next: vec![END_OF_LIST; positions.len()],
        };
        for (i, p) in positions.iter().enumerate() {
            let key = index.cell_of(*p);
            let head = index.map.entry(key).or_insert(END_OF_LIST);
            index.next[i] = *head;
            *head = i;
        }
        Ok(index)
    }

    fn cell_of(&self, p: Vec3) -> (i64, i64, i64) {
        let coords = p.to_array();
        let mut key = [0i64; 3];
        for axis in 0..3 {
            let raw = (coords[axis] / self.cell[axis]).floor() as i64;
            key[axis] = if self.periodicity[axis] {
                raw.rem_euclid(self.dims[axis])
            } else {
                // Points are expected inside the box; clamp stragglers so
                // every point lands in the finite grid.
                raw.clamp(0, self.dims[axis] - 1)
            };
        }
        (key[0], key[1], key[2])
    }

    /// The `k` nearest points to `point` under minimum-image distance,
    /// ascending, ties broken by ascending point index. Returns fewer than
    /// `k` only when the index holds fewer points.
    pub fn query(&self, point: Vec3, k: usize) -> Vec<usize> {
        if k == 0 {
            return Vec::new();
        }
        let center = self.cell_of(point);
        let min_cell = self.cell[0].min(self.cell[1]).min(self.cell[2]);
        let max_radius = self.dims[0].max(self.dims[1]).max(self.dims[2]);

        let mut visited: FxHashSet<(i64, i64, i64)> = FxHashSet::default();
        let mut found: Vec<(f64, usize)> = Vec::new();
        for radius in 0..=max_radius {
            self.visit_shell(center, radius, &mut visited, |idx| {
                let d = pbc::min_periodic_distance(
                    point,
                    self.positions[idx],
                    &self.box_,
                    self.periodicity,
                );
                found.push((d, idx));
            });
            // Any unvisited cell is at least `radius * min_cell` away, so
            // the k nearest are settled once the kth distance is inside
            // that bound.
            if found.len() >= k {
                found.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                if found[k - 1].0 <= radius as f64 * min_cell {
                    break;
                }
            }
        }
        found.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        found.truncate(k);
        found.into_iter().map(|(_, idx)| idx).collect()
    }

    fn visit_shell<F>(
        &self,
        center: (i64, i64, i64),
        radius: i64,
        visited: &mut FxHashSet<(i64, i64, i64)>,
        mut f: F,
    ) where
        F: FnMut(usize),
    {
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                for dz in -radius..=radius {
                    if dx.abs().max(dy.abs()).max(dz.abs()) != radius {
                        continue;
                    }
                    let raw = [center.0 + dx, center.1 + dy, center.2 + dz];
                    let mut key = [0i64; 3];
                    let mut in_grid = true;
                    for axis in 0..3 {
                        if self.periodicity[axis] {
                            key[axis] = raw[axis].rem_euclid(self.dims[axis]);
                        } else if raw[axis] < 0 || raw[axis] >= self.dims[axis] {
                            in_grid = false;
                            break;
                        } else {
                            key[axis] = raw[axis];
                        }
                    }
                    if !in_grid {
                        continue;
                    }
                    let key = (key[0], key[1], key[2]);
                    if !visited.insert(key) {
                        continue;
                    }
                    if let Some(&head) = self.map.get(&key) {
                        let mut idx = head;
                        while idx != END_OF_LIST {
                            f(idx);
                            idx = self.next[idx];
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_positions(n: usize, spacing: f64) -> Vec<Vec3> {
        let mut positions = Vec::new();
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    positions.push(Vec3::new(
                        (i as f64 + 0.5) * spacing,
                        (j as f64 + 0.5) * spacing,
                        (k as f64 + 0.5) * spacing,
                    ));
                }
            }
        }
        positions
    }

    #[test]
    fn nearest_neighbor_is_self() {
        let box_ = BoundBox::orthogonal([4.0, 4.0, 4.0]).unwrap();
        let positions = grid_positions(4, 1.0);
        let index = PeriodicNeighborIndex::new(&positions, box_, [true; 3]).unwrap();
        for (i, p) in positions.iter().enumerate() {
            assert_eq!(index.query(*p, 1), vec![i]);
        }
    }

    #[test]
    fn finds_neighbors_across_the_boundary() {
        let box_ = BoundBox::orthogonal([10.0, 10.0, 10.0]).unwrap();
        let positions = vec![
            Vec3::new(0.5, 5.0, 5.0),
            Vec3::new(9.5, 5.0, 5.0),
            Vec3::new(5.0, 5.0, 5.0),
        ];
        let index = PeriodicNeighborIndex::new(&positions, box_, [true; 3]).unwrap();
        // Point 1 is 1.0 away from point 0 through the x face, 4.5 from 2.
        let neighbors = index.query(positions[0], 3);
        assert_eq!(neighbors, vec![0, 1, 2]);
    }

    #[test]
    fn no_wrap_on_non_periodic_axes() {
        let box_ = BoundBox::orthogonal([10.0, 10.0, 10.0]).unwrap();
        let positions = vec![
            Vec3::new(0.5, 5.0, 5.0),
            Vec3::new(9.5, 5.0, 5.0),
            Vec3::new(5.0, 5.0, 5.0),
        ];
        let index = PeriodicNeighborIndex::new(&positions, box_, [false; 3]).unwrap();
        let neighbors = index.query(positions[0], 3);
        assert_eq!(neighbors, vec![0, 2, 1]);
    }

    #[test]
    fn ascending_order_with_index_tiebreak() {
        let box_ = BoundBox::orthogonal([8.0, 8.0, 8.0]).unwrap();
        let positions = vec![
            Vec3::new(4.0, 4.0, 4.0),
            Vec3::new(5.0, 4.0, 4.0),
            Vec3::new(3.0, 4.0, 4.0),
            Vec3::new(4.0, 6.0, 4.0),
        ];
        let index = PeriodicNeighborIndex::new(&positions, box_, [true; 3]).unwrap();
        // Points 1 and 2 tie at distance 1; the lower index wins.
        assert_eq!(index.query(positions[0], 4), vec![0, 1, 2, 3]);
    }

    #[test]
    fn k_larger_than_point_count() {
        let box_ = BoundBox::orthogonal([5.0, 5.0, 5.0]).unwrap();
        let positions = vec![Vec3::new(1.0, 1.0, 1.0), Vec3::new(2.0, 1.0, 1.0)];
        let index = PeriodicNeighborIndex::new(&positions, box_, [true; 3]).unwrap();
        assert_eq!(index.query(Vec3::new(1.1, 1.0, 1.0), 10).len(), 2);
    }
}
