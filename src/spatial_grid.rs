/*
 * Spatial Grid Module
 *
 * This module defines the SpatialGrid struct for efficient neighbor lookups.
 * It divides the domain into a grid of cells no smaller than the vision range,
 * so every boid that can be seen from a point lies in that point's cell or one
 * of the eight around it. On a periodic domain the outermost cells are
 * adjacent to the cells on the opposite edge.
 *
 * The grid only narrows down candidates. The simulation still measures each
 * candidate with the topology, so the neighbour lists match a full search.
 */

use nannou::prelude::Vec2;

use crate::topology::Domain;

// Cells per axis beyond this stop paying for themselves; larger cells only
// mean more candidates to measure
const MAX_CELLS_PER_AXIS: usize = 256;

pub struct SpatialGrid {
    columns: usize,
    rows: usize,
    cell_width: f32,
    cell_height: f32,
    wraps: bool,
    cells: Vec<Vec<usize>>,
}

impl SpatialGrid {
    // `min_cell_size` is normally the vision range
    pub fn new(min_cell_size: f32, domain: Domain, wraps: bool) -> Self {
        let columns = ((domain.width / min_cell_size).floor() as usize).clamp(1, MAX_CELLS_PER_AXIS);
        let rows = ((domain.height / min_cell_size).floor() as usize).clamp(1, MAX_CELLS_PER_AXIS);

        Self {
            columns,
            rows,
            cell_width: domain.width / columns as f32,
            cell_height: domain.height / rows as f32,
            wraps,
            cells: vec![Vec::new(); columns * rows],
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.columns, self.rows)
    }

    // Column and row of the cell holding a position, clamped onto the grid
    #[inline]
    fn cell_of(&self, position: Vec2) -> (usize, usize) {
        let column = (position.x / self.cell_width).clamp(0.0, self.columns as f32 - 1.0) as usize;
        let row = (position.y / self.cell_height).clamp(0.0, self.rows as f32 - 1.0) as usize;
        (column, row)
    }

    // Clear the grid
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    // Insert a boid into the grid
    #[inline]
    pub fn insert(&mut self, boid_index: usize, position: Vec2) {
        let (column, row) = self.cell_of(position);
        self.cells[row * self.columns + column].push(boid_index);
    }

    // Rebuild the grid from scratch for a list of positions
    pub fn rebuild(&mut self, positions: &[Vec2]) {
        self.clear();
        for (index, &position) in positions.iter().enumerate() {
            self.insert(index, position);
        }
    }

    // Neighbouring cell indices along one axis, wrapping if the grid does.
    // Small grids can reach the same cell twice, so duplicates are dropped.
    fn axis_neighbours(&self, centre: usize, len: usize) -> Vec<usize> {
        let mut result = Vec::with_capacity(3);
        for offset in -1isize..=1 {
            let mut index = centre as isize + offset;
            if self.wraps {
                index = index.rem_euclid(len as isize);
            } else if index < 0 || index >= len as isize {
                continue;
            }
            let index = index as usize;
            if !result.contains(&index) {
                result.push(index);
            }
        }
        result
    }

    // Indices of every boid in the 3x3 block of cells around a position,
    // sorted so that callers see them in collection order
    pub fn candidates(&self, position: Vec2) -> Vec<usize> {
        let (column, row) = self.cell_of(position);
        let columns = self.axis_neighbours(column, self.columns);

        let mut result = Vec::new();
        for row in self.axis_neighbours(row, self.rows) {
            for &column in &columns {
                result.extend_from_slice(&self.cells[row * self.columns + column]);
            }
        }
        result.sort_unstable();
        result
    }
}
