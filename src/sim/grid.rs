//! Fixed-size cell grids with double-buffered stepping
//!
//! A [`CellField`] keeps the current generation, the previous one, and a
//! scratch buffer. A step computes every interior cell from the old buffers
//! only, writes into scratch, then rotates the three so nothing is
//! reallocated. Edge cells are never recomputed; they carry their current
//! value forward (open boundary).

use serde::{Deserialize, Serialize};

/// 4-neighborhood offsets (left, right, up, down)
pub const NEIGHBORS_4: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// 8-neighborhood offsets
pub const NEIGHBORS_8: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// A row-major 2D array of cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T: Copy> Grid<T> {
    pub fn new(width: usize, height: usize, fill: T) -> Self {
        Self {
            width,
            height,
            cells: vec![fill; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.cells[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let i = self.index(x, y);
        self.cells[i] = value;
    }

    /// Cell at a signed offset from (x, y), `None` off the grid
    pub fn offset(&self, x: usize, y: usize, dx: isize, dy: isize) -> Option<T> {
        let nx = x.checked_add_signed(dx)?;
        let ny = y.checked_add_signed(dy)?;
        (nx < self.width && ny < self.height).then(|| self.get(nx, ny))
    }

    pub fn in_bounds(&self, x: isize, y: isize) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// True for cells a step recomputes
    pub fn is_interior(&self, x: usize, y: usize) -> bool {
        x >= 1 && y >= 1 && x + 1 < self.width && y + 1 < self.height
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [T] {
        &mut self.cells
    }

    pub fn fill(&mut self, value: T) {
        self.cells.fill(value);
    }

    /// Number of cells matching `pred`
    pub fn count(&self, pred: impl Fn(T) -> bool) -> usize {
        self.cells.iter().filter(|&&c| pred(c)).count()
    }

    /// Number of 8-neighbors of an interior cell matching `pred`
    pub fn count_neighbors8(&self, x: usize, y: usize, pred: impl Fn(T) -> bool) -> usize {
        NEIGHBORS_8
            .iter()
            .filter_map(|&(dx, dy)| self.offset(x, y, dx, dy))
            .filter(|&c| pred(c))
            .count()
    }
}

/// A local update rule: the next value of one cell from the old buffers
pub trait CellRule<T> {
    fn next(&self, current: &Grid<T>, previous: &Grid<T>, x: usize, y: usize) -> T;
}

/// Iteration order over interior cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOrder {
    RowMajor,
    ColumnMajor,
    /// Row-major, last cell first
    Reverse,
}

/// Current + previous generations with a reusable scratch buffer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellField<T> {
    current: Grid<T>,
    previous: Grid<T>,
    scratch: Grid<T>,
    generation: u64,
}

impl<T: Copy> CellField<T> {
    pub fn new(width: usize, height: usize, fill: T) -> Self {
        let grid = Grid::new(width, height, fill);
        Self {
            current: grid.clone(),
            previous: grid.clone(),
            scratch: grid,
            generation: 0,
        }
    }

    pub fn current(&self) -> &Grid<T> {
        &self.current
    }

    /// Mutable access for input (painting cells, dropping ripples)
    pub fn current_mut(&mut self) -> &mut Grid<T> {
        &mut self.current
    }

    pub fn previous(&self) -> &Grid<T> {
        &self.previous
    }


    pub fn width(&self) -> usize {
        self.current.width
    }

    pub fn height(&self) -> usize {
        self.current.height
    }

    /// Steps taken since creation or the last reset
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn reset(&mut self, fill: T) {
        self.current.fill(fill);
        self.previous.fill(fill);
        self.scratch.fill(fill);
        self.generation = 0;
    }

    pub fn step<R: CellRule<T>>(&mut self, rule: &R) {
        self.step_in_order(rule, ScanOrder::RowMajor);
    }

    /// One generation, visiting interior cells in `order`.
    ///
    /// Because every read goes to `current`/`previous` and every write to
    /// scratch, the result is the same for any order.
    pub fn step_in_order<R: CellRule<T>>(&mut self, rule: &R, order: ScanOrder) {
        let (w, h) = (self.width(), self.height());
        self.scratch.cells.copy_from_slice(&self.current.cells);

        let xs = 1..w.saturating_sub(1);
        let ys = 1..h.saturating_sub(1);

        match order {
            ScanOrder::RowMajor => {
                for y in ys {
                    for x in xs.clone() {
                        self.write(rule, x, y);
                    }
                }
            }
            ScanOrder::ColumnMajor => {
                for x in xs {
                    for y in ys.clone() {
                        self.write(rule, x, y);
                    }
                }
            }
            ScanOrder::Reverse => {
                for y in ys.rev() {
                    for x in xs.clone().rev() {
                        self.write(rule, x, y);
                    }
                }
            }
        }

        // scratch -> current, current -> previous, previous -> scratch
        std::mem::swap(&mut self.previous, &mut self.current);
        std::mem::swap(&mut self.current, &mut self.scratch);
        self.generation += 1;
    }

    #[inline]
    fn write<R: CellRule<T>>(&mut self, rule: &R, x: usize, y: usize) {
        let value = rule.next(&self.current, &self.previous, x, y);
        self.scratch.set(x, y, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sum of the 4-neighborhood of the current buffer
    struct SumRule;

    impl CellRule<i32> for SumRule {
        fn next(&self, current: &Grid<i32>, _previous: &Grid<i32>, x: usize, y: usize) -> i32 {
            NEIGHBORS_4
                .iter()
                .filter_map(|&(dx, dy)| current.offset(x, y, dx, dy))
                .sum()
        }
    }

    #[test]
    fn test_offset_off_grid() {
        let g = Grid::new(3, 3, 1u8);
        assert_eq!(g.offset(0, 0, -1, 0), None);
        assert_eq!(g.offset(2, 2, 1, 0), None);
        assert_eq!(g.offset(1, 1, 1, 1), Some(1));
    }

    #[test]
    fn test_is_interior() {
        let g = Grid::new(4, 3, 0u8);
        assert!(g.is_interior(1, 1));
        assert!(g.is_interior(2, 1));
        assert!(!g.is_interior(0, 1));
        assert!(!g.is_interior(3, 1));
        assert!(!g.is_interior(1, 2));
    }

    #[test]
    fn test_step_reads_only_old_buffer() {
        // A single-pass in-place update would let (2,1) see the already
        // rewritten (1,1); double-buffering must not.
        let mut field = CellField::new(5, 3, 0);
        field.current_mut().set(1, 1, 1);
        field.step(&SumRule);

        let g = field.current();
        assert_eq!(g.get(1, 1), 0);
        assert_eq!(g.get(2, 1), 1);
        assert_eq!(g.get(3, 1), 0);
    }

    #[test]
    fn test_step_rotates_buffers() {
        let mut field = CellField::new(4, 4, 0);
        field.current_mut().set(1, 1, 5);
        field.step(&SumRule);
        assert_eq!(field.previous().get(1, 1), 5);
        assert_eq!(field.generation(), 1);
    }

    #[test]
    fn test_edges_carry_over() {
        let mut field = CellField::new(4, 4, 0);
        field.current_mut().set(0, 1, 7);
        field.current_mut().set(3, 3, 9);
        field.step(&SumRule);
        assert_eq!(field.current().get(0, 1), 7);
        assert_eq!(field.current().get(3, 3), 9);
        // The interior neighbor of (0,1) saw it
        assert_eq!(field.current().get(1, 1), 7);
    }

    #[test]
    fn test_tiny_grid_has_no_interior() {
        let mut field = CellField::new(2, 2, 3);
        field.step(&SumRule);
        assert!(field.current().cells().iter().all(|&c| c == 3));
    }

    #[test]
    fn test_scan_orders_agree() {
        let mut seed = CellField::new(7, 6, 0);
        for (i, c) in seed.current_mut().cells_mut().iter_mut().enumerate() {
            *c = (i as i32 * 37) % 11;
        }

        let mut results = Vec::new();
        for order in [ScanOrder::RowMajor, ScanOrder::ColumnMajor, ScanOrder::Reverse] {
            let mut field = seed.clone();
            field.step_in_order(&SumRule, order);
            field.step_in_order(&SumRule, order);
            results.push(field.current().clone());
        }
        assert_eq!(results[0], results[1]);
        assert_eq!(results[0], results[2]);
    }
}
