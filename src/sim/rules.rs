//! Cell rules for the grid toys

use serde::{Deserialize, Serialize};

use super::grid::{CellRule, Grid, NEIGHBORS_4};

/// Ripple equation on amplitudes: half the 4-neighbor sum of the current
/// generation minus this cell's previous value, then damped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveRule {
    pub damping: f32,
}

impl CellRule<f32> for WaveRule {
    fn next(&self, current: &Grid<f32>, previous: &Grid<f32>, x: usize, y: usize) -> f32 {
        let sum: f32 = NEIGHBORS_4
            .iter()
            .filter_map(|&(dx, dy)| current.offset(x, y, dx, dy))
            .sum();
        (sum * 0.5 - previous.get(x, y)) * self.damping
    }
}

/// Conway's game of life (B3/S23)
#[derive(Debug, Clone, Copy, Default)]
pub struct LifeRule;

impl CellRule<bool> for LifeRule {
    fn next(&self, current: &Grid<bool>, _previous: &Grid<bool>, x: usize, y: usize) -> bool {
        let alive = current.get(x, y);
        let n = current.count_neighbors8(x, y, |c| c);
        matches!((alive, n), (true, 2) | (true, 3) | (false, 3))
    }
}

/// Sandbox materials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Material {
    #[default]
    Empty,
    Sand,
    Wall,
}

/// Pull-based falling sand, +y is down.
///
/// Sand falls straight down into empty space; if blocked it slides one cell
/// diagonally toward `slide` (-1 left, +1 right) unless that target is
/// already being filled from directly above. Source and target evaluate the
/// same predicate, so every move is claimed exactly once and sand is
/// conserved away from the edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandRule {
    pub slide: isize,
}

impl SandRule {
    pub fn new(slide_right: bool) -> Self {
        Self {
            slide: if slide_right { 1 } else { -1 },
        }
    }
}

impl CellRule<Material> for SandRule {
    fn next(&self, current: &Grid<Material>, _previous: &Grid<Material>, x: usize, y: usize) -> Material {
        use Material::*;

        let at = |dx: isize, dy: isize| current.offset(x, y, dx, dy).unwrap_or(Wall);
        let d = self.slide;

        match current.get(x, y) {
            Wall => Wall,
            Sand => {
                if at(0, 1) == Empty {
                    Empty
                } else if at(d, 1) == Empty && at(d, 0) != Sand {
                    Empty
                } else {
                    Sand
                }
            }
            Empty => {
                if at(0, -1) == Sand {
                    Sand
                } else if at(-d, -1) == Sand && at(-d, 0) != Empty {
                    Sand
                } else {
                    Empty
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::{CellField, ScanOrder};

    fn walled(width: usize, height: usize) -> CellField<Material> {
        let mut field = CellField::new(width, height, Material::Empty);
        let g = field.current_mut();
        for x in 0..width {
            g.set(x, 0, Material::Wall);
            g.set(x, height - 1, Material::Wall);
        }
        for y in 0..height {
            g.set(0, y, Material::Wall);
            g.set(width - 1, y, Material::Wall);
        }
        field
    }

    #[test]
    fn test_wave_spreads_to_neighbors() {
        let mut field = CellField::new(5, 5, 0.0f32);
        field.current_mut().set(2, 2, 1.0);
        field.step(&WaveRule { damping: 1.0 });

        let g = field.current();
        assert!((g.get(2, 1) - 0.5).abs() < 1e-6);
        assert!((g.get(1, 2) - 0.5).abs() < 1e-6);
        assert_eq!(g.get(2, 2), 0.0);
    }

    #[test]
    fn test_wave_damping_decays_energy() {
        let mut field = CellField::new(16, 16, 0.0f32);
        field.current_mut().set(8, 8, 10.0);
        let energy = |g: &Grid<f32>| g.cells().iter().map(|v| v * v).sum::<f32>();
        let start = energy(field.current());
        for _ in 0..200 {
            field.step(&WaveRule { damping: 0.95 });
        }
        assert!(energy(field.current()) < start * 0.1);
    }

    #[test]
    fn test_life_blinker_oscillates() {
        let mut field = CellField::new(5, 5, false);
        for x in 1..4 {
            field.current_mut().set(x, 2, true);
        }
        field.step(&LifeRule);
        let g = field.current();
        assert!(g.get(2, 1) && g.get(2, 2) && g.get(2, 3));
        assert!(!g.get(1, 2) && !g.get(3, 2));

        field.step(&LifeRule);
        assert!(field.current().get(1, 2) && field.current().get(3, 2));
    }

    #[test]
    fn test_sand_falls_and_rests_on_wall() {
        let mut field = walled(5, 6);
        field.current_mut().set(2, 1, Material::Sand);
        for _ in 0..10 {
            field.step(&SandRule::new(true));
        }
        assert_eq!(field.current().get(2, 4), Material::Sand);
        assert_eq!(field.current().count(|c| c == Material::Sand), 1);
    }

    #[test]
    fn test_sand_slides_off_a_pile() {
        let mut field = walled(5, 5);
        let g = field.current_mut();
        g.set(2, 3, Material::Sand);
        g.set(2, 2, Material::Sand);
        field.step(&SandRule::new(true));

        let g = field.current();
        assert_eq!(g.get(3, 3), Material::Sand);
        assert_eq!(g.get(2, 3), Material::Sand);
        assert_eq!(g.get(2, 2), Material::Empty);
    }

    #[test]
    fn test_sand_conserved_and_order_independent() {
        let mut seed = walled(12, 12);
        for x in 2..10 {
            for y in 1..5 {
                if (x + y) % 3 != 0 {
                    seed.current_mut().set(x, y, Material::Sand);
                }
            }
        }
        let grains = seed.current().count(|c| c == Material::Sand);

        let mut results = Vec::new();
        for order in [ScanOrder::RowMajor, ScanOrder::ColumnMajor, ScanOrder::Reverse] {
            let mut field = seed.clone();
            for i in 0..20 {
                field.step_in_order(&SandRule::new(i % 2 == 0), order);
                assert_eq!(field.current().count(|c| c == Material::Sand), grains);
            }
            results.push(field.current().clone());
        }
        assert_eq!(results[0], results[1]);
        assert_eq!(results[1], results[2]);
    }
}
