//! Generalized Sudoku grid: shape, cells, ASCII parsing/rendering, and constraint validation.
//!
//! A grid is parameterized by a region shape `(R, C)` with `N = R * C`; the classic 9x9
//! Sudoku is the `(3, 3)` instance. None of this module knows about exact cover or DLX — it
//! is the collaborator the reduction (`crate::reduction`) encodes and decodes against.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A single grid cell: either unset, or set to a value in `[0, N)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Set(u32),
}

impl Cell {
    pub fn is_set(&self) -> bool {
        matches!(self, Cell::Set(_))
    }

    /// Returns the cell's value. Errors if the cell is `Empty` (§7: CallerError (state)).
    pub fn value(&self) -> Result<u32, CoreError> {
        match self {
            Cell::Set(v) => Ok(*v),
            Cell::Empty => Err(CoreError::CellNotSet),
        }
    }
}

/// Region shape: `rows` x `cols` blocks tiling an `n` x `n` grid, where `n = rows * cols`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dims {
    pub region_rows: u32,
    pub region_cols: u32,
}

impl Dims {
    pub fn new(region_rows: u32, region_cols: u32) -> Self {
        Self {
            region_rows,
            region_cols,
        }
    }

    pub fn n(&self) -> u32 {
        self.region_rows * self.region_cols
    }

    /// The classic 9x9 Sudoku's 3x3 region shape.
    pub fn classic() -> Self {
        Self::new(3, 3)
    }

    /// Region index for cell `(r, c)`, per the preserved (non-textbook) formula
    /// `g = (r div R) + (c div C) * C`.
    fn region_index(&self, r: u32, c: u32) -> u32 {
        r / self.region_rows + (c / self.region_cols) * self.region_cols
    }
}

/// An `N` x `N` Sudoku grid for a given region shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    dims: Dims,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn empty(dims: Dims) -> Self {
        let n = dims.n() as usize;
        Self {
            dims,
            cells: vec![Cell::Empty; n * n],
        }
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn n(&self) -> u32 {
        self.dims.n()
    }

    fn index(&self, r: u32, c: u32) -> Result<usize, CoreError> {
        let n = self.n();
        if r >= n || c >= n {
            return Err(CoreError::OutOfRange {
                row: r as usize,
                col: c as usize,
                size: n as usize,
            });
        }
        Ok((r * n + c) as usize)
    }

    pub fn get(&self, r: u32, c: u32) -> Result<Cell, CoreError> {
        Ok(self.cells[self.index(r, c)?])
    }

    pub fn set(&mut self, r: u32, c: u32, cell: Cell) -> Result<(), CoreError> {
        let idx = self.index(r, c)?;
        self.cells[idx] = cell;
        Ok(())
    }

    pub fn region_index(&self, r: u32, c: u32) -> u32 {
        self.dims.region_index(r, c)
    }

    /// Parses an ASCII row-major string of `N*N` characters: `x`/space -> Empty, `0`-`9` ->
    /// values 0-9, `a`-`w` -> values 10-32 (lowercase, per §4.5).
    pub fn parse(dims: Dims, raw: &str) -> Result<Self, CoreError> {
        let n = dims.n();
        let expected = (n * n) as usize;
        let chars: Vec<char> = raw.chars().collect();

        if chars.len() != expected {
            return Err(CoreError::WrongLength {
                expected,
                actual: chars.len(),
            });
        }

        let mut grid = Grid::empty(dims);
        for (i, ch) in chars.into_iter().enumerate() {
            let r = (i as u32) / n;
            let c = (i as u32) % n;

            let cell = match ch {
                'x' | ' ' => Cell::Empty,
                '0'..='9' => Cell::Set(ch.to_digit(10).unwrap()),
                'a'..='w' => Cell::Set(10 + (ch as u32 - 'a' as u32)),
                other => return Err(CoreError::UnrecognizedChar(other)),
            };

            if let Cell::Set(v) = cell {
                if v >= n {
                    return Err(CoreError::ValueOutOfDomain { value: v, domain: n });
                }
            }

            grid.set(r, c, cell)?;
        }

        Ok(grid)
    }

    /// Renders the grid back to the §4.5 ASCII alphabet: digits for `v < 10`, uppercase
    /// letters for `v >= 10`, `-` for Empty.
    pub fn render(&self) -> String {
        self.cells
            .iter()
            .map(|cell| match cell {
                Cell::Empty => '-',
                Cell::Set(v) if *v < 10 => char::from_digit(*v, 10).unwrap(),
                Cell::Set(v) => char::from_u32('A' as u32 + v - 10).unwrap(),
            })
            .collect()
    }

    /// A grid is valid iff every row, column, and region contains each set value at most once.
    /// Empty cells are ignored.
    pub fn is_valid(&self) -> bool {
        let n = self.n();

        for r in 0..n {
            if !has_unique_values((0..n).map(|c| self.get(r, c).unwrap())) {
                return false;
            }
        }
        for c in 0..n {
            if !has_unique_values((0..n).map(|r| self.get(r, c).unwrap())) {
                return false;
            }
        }

        let mut regions: Vec<Vec<Cell>> = vec![Vec::new(); n as usize];
        for r in 0..n {
            for c in 0..n {
                let g = self.region_index(r, c) as usize;
                regions[g].push(self.get(r, c).unwrap());
            }
        }
        regions.into_iter().all(|region| has_unique_values(region.into_iter()))
    }

    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(Cell::is_set)
    }
}

fn has_unique_values(cells: impl Iterator<Item = Cell>) -> bool {
    let mut seen = HashSet::new();
    cells
        .filter_map(|cell| match cell {
            Cell::Set(v) => Some(v),
            Cell::Empty => None,
        })
        .all(|v| seen.insert(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classic_2x2() -> Dims {
        Dims::new(2, 2)
    }

    #[test]
    fn parses_and_renders_round_trip() {
        let grid = Grid::parse(classic_2x2(), "xx3x0xx1xxx2x0xx").unwrap();
        assert_eq!(grid.get(0, 0).unwrap(), Cell::Empty);
        assert_eq!(grid.get(0, 2).unwrap(), Cell::Set(3));
        assert_eq!(grid.get(1, 0).unwrap(), Cell::Set(0));
    }

    #[test]
    fn wrong_length_is_an_error() {
        assert!(Grid::parse(classic_2x2(), "x").is_err());
    }

    #[test]
    fn unrecognized_character_is_an_error() {
        assert!(Grid::parse(classic_2x2(), "xx3x0xx1xxx2x0x!").is_err());
    }

    #[test]
    fn region_index_uses_the_preserved_non_textbook_formula() {
        // 2x3 region shape: R=2, C=3 => N=6. g = r/R + (c/C)*C.
        let dims = Dims::new(2, 3);
        // r=0,c=0 -> 0/2 + (0/3)*3 = 0
        assert_eq!(dims.region_index(0, 0), 0);
        // r=0,c=3 -> 0/2 + (3/3)*3 = 3
        assert_eq!(dims.region_index(0, 3), 3);
        // r=2,c=0 -> 2/2 + (0/3)*3 = 1
        assert_eq!(dims.region_index(2, 0), 1);
    }

    #[test]
    fn duplicate_in_row_is_invalid() {
        let grid = Grid::parse(classic_2x2(), "0011xxxxxxxxxxxx").unwrap();
        assert!(!grid.is_valid());
    }

    #[test]
    fn solved_grid_validates_and_any_single_duplicate_breaks_it() {
        let dims = Dims::classic();
        let solved = "307256841851473062246180375762308514480517236513642780628031457134725608075864123";
        let grid = Grid::parse(dims, solved).unwrap();
        assert!(grid.is_valid());
        assert!(grid.is_complete());

        let mut broken = grid.clone();
        // Duplicate the value from (0,0) into (0,1), breaking the row constraint.
        let v = broken.get(0, 0).unwrap();
        broken.set(0, 1, v).unwrap();
        assert!(!broken.is_valid());
    }

    #[test]
    fn accessing_an_empty_cell_value_is_an_error() {
        let grid = Grid::empty(classic_2x2());
        assert!(grid.get(0, 0).unwrap().value().is_err());
    }
}
