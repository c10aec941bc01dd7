//! Sudoku ⇄ exact-cover reduction: encodes a grid as a binary matrix with four contiguous
//! constraint blocks, and decodes a solver's row-index solution back into cell assignments.
//!
//! Two adapter variants are provided over the same row descriptor table, per §8's "Adapter
//! equivalence" property: `SparseCoverMatrix` materializes the matrix through
//! `crate::matrix::SparseMatrix`, `DescriptorMatrix` computes `present` directly from the
//! descriptors with no intermediate storage. Both must produce identical solutions.

use tracing::instrument;

use crate::{
    dlx,
    error::CoreError,
    matrix::{BinaryMatrix, SparseMatrix},
    sudoku::{Cell, Dims, Grid},
};

/// One candidate placement "cell `(r, c)` takes value `v`", and the four constraint columns
/// it satisfies in the exact-cover matrix.
#[derive(Debug, Clone, Copy)]
struct RowDescriptor {
    row: u32,
    col: u32,
    value: u32,
    cols: [usize; 4],
}

/// Builds the row descriptor table for `grid`: one descriptor per `(cell, value)` candidate,
/// in row-major cell order. A `Set(v)` cell contributes a single forced candidate; an `Empty`
/// cell contributes one candidate per value in `[0, N)`.
fn build_descriptors(grid: &Grid) -> Vec<RowDescriptor> {
    let n = grid.n();
    let n2 = (n * n) as usize;
    let mut descriptors = Vec::new();

    for r in 0..n {
        for c in 0..n {
            let cell = grid.get(r, c).expect("r, c within grid bounds by construction");
            let region = grid.region_index(r, c);

            let (start, stop) = match cell {
                Cell::Set(v) => (v, v + 1),
                Cell::Empty => (0, n),
            };

            for v in start..stop {
                let col0 = 0 * n2 + (n * r + c) as usize;
                let col1 = n2 + (n * r + v) as usize;
                let col2 = 2 * n2 + (n * c + v) as usize;
                let col3 = 3 * n2 + (n * region + v) as usize;

                descriptors.push(RowDescriptor {
                    row: r,
                    col: c,
                    value: v,
                    cols: [col0, col1, col2, col3],
                });
            }
        }
    }

    descriptors
}

/// Binary-matrix adapter that materializes the exact-cover instance into a sparse container.
pub struct SparseCoverMatrix {
    descriptors: Vec<RowDescriptor>,
    matrix: SparseMatrix<bool>,
}

impl SparseCoverMatrix {
    pub fn new(grid: &Grid) -> Self {
        let descriptors = build_descriptors(grid);
        let n2 = (grid.n() * grid.n()) as usize;
        let mut matrix = SparseMatrix::new(descriptors.len(), 4 * n2);

        for (row, descriptor) in descriptors.iter().enumerate() {
            for &col in &descriptor.cols {
                matrix.set(row, col, true).expect("descriptor columns are always in range");
            }
        }

        Self { descriptors, matrix }
    }
}

impl BinaryMatrix for SparseCoverMatrix {
    fn rows(&self) -> usize {
        self.matrix.rows()
    }

    fn cols(&self) -> usize {
        self.matrix.cols()
    }

    fn present(&self, row: usize, col: usize) -> bool {
        self.matrix.present(row, col)
    }
}

/// Binary-matrix adapter that computes `present` directly from the row descriptor table,
/// without ever materializing the matrix (§4.4's "materialization-free variant"). Exploits
/// the guarantee that each descriptor has exactly one column in each of the four contiguous
/// blocks.
pub struct DescriptorMatrix {
    descriptors: Vec<RowDescriptor>,
    n2: usize,
}

impl DescriptorMatrix {
    pub fn new(grid: &Grid) -> Self {
        let descriptors = build_descriptors(grid);
        let n2 = (grid.n() * grid.n()) as usize;
        Self { descriptors, n2 }
    }
}

impl BinaryMatrix for DescriptorMatrix {
    fn rows(&self) -> usize {
        self.descriptors.len()
    }

    fn cols(&self) -> usize {
        4 * self.n2
    }

    fn present(&self, row: usize, col: usize) -> bool {
        let quarter = col / self.n2;
        self.descriptors[row].cols[quarter] == col
    }
}

/// Which adapter variant to materialize the reduction through. Both must agree on every
/// input (§8's adapter-equivalence property); the choice is purely a space/time trade-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterKind {
    Sparse,
    Descriptor,
}

fn decode(descriptors: &[RowDescriptor], solution: &[usize], dims: Dims) -> Grid {
    let mut grid = Grid::empty(dims);
    for &i in solution {
        let d = descriptors[i];
        grid.set(d.row, d.col, Cell::Set(d.value))
            .expect("row, col from a descriptor are always within the grid");
    }
    grid
}

/// Solves a Sudoku puzzle by reducing it to exact cover and back. Returns a grid of all-Empty
/// cells if no cover exists (§4.4's decoding contract; this is `NoSolution`, not an error).
#[instrument(skip(grid), fields(n = grid.n()))]
pub fn solve_sudoku(grid: &Grid, adapter: AdapterKind) -> Result<Grid, CoreError> {
    let dims = grid.dims();

    match adapter {
        AdapterKind::Sparse => {
            let matrix = SparseCoverMatrix::new(grid);
            let solution = dlx::solve_exact_cover(&matrix)?;
            Ok(decode(&matrix.descriptors, &solution, dims))
        }
        AdapterKind::Descriptor => {
            let matrix = DescriptorMatrix::new(grid);
            let solution = dlx::solve_exact_cover(&matrix)?;
            Ok(decode(&matrix.descriptors, &solution, dims))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classic_grid(raw: &str) -> Grid {
        Grid::parse(Dims::classic(), raw).unwrap()
    }

    const PUZZLE_3X3: &str =
        "x0x25xx4xxx1xxxxxxx4xx803xx76xxxxxxx4xx5x7xx6xxxxxxx80xx803xx5xxxxxxx6xxx7xx64x2x";
    const SOLUTION_3X3: &str =
        "307256841851473062246180375762308514480517236513642780628031457134725608075864123";

    #[test]
    fn solves_classic_3x3_puzzle_with_both_adapters() {
        let grid = classic_grid(PUZZLE_3X3);

        let sparse = solve_sudoku(&grid, AdapterKind::Sparse).unwrap();
        let descriptor = solve_sudoku(&grid, AdapterKind::Descriptor).unwrap();

        assert_eq!(sparse.render(), SOLUTION_3X3);
        assert_eq!(descriptor.render(), SOLUTION_3X3);
    }

    #[test]
    fn solves_2x2_puzzle() {
        let dims = Dims::new(2, 2);
        let grid = Grid::parse(dims, "xx3x0xx1xxx2x0xx").unwrap();
        let solved = solve_sudoku(&grid, AdapterKind::Sparse).unwrap();
        assert_eq!(solved.render(), "1230032131022013");
    }

    #[test]
    fn clues_are_preserved_in_the_solution() {
        let grid = classic_grid(PUZZLE_3X3);
        let solved = solve_sudoku(&grid, AdapterKind::Sparse).unwrap();

        let n = grid.n();
        for r in 0..n {
            for c in 0..n {
                if let Cell::Set(v) = grid.get(r, c).unwrap() {
                    assert_eq!(solved.get(r, c).unwrap(), Cell::Set(v));
                }
            }
        }
    }

    #[test]
    fn solved_grid_is_complete_and_valid() {
        let grid = classic_grid(PUZZLE_3X3);
        let solved = solve_sudoku(&grid, AdapterKind::Sparse).unwrap();
        assert!(solved.is_complete());
        assert!(solved.is_valid());
    }

    #[test]
    fn inconsistent_input_yields_all_empty_grid() {
        // Two 3s in the same row: no cover can exist.
        let dims = Dims::new(2, 2);
        let grid = Grid::parse(dims, "x33xxxxxxxxxxxxx").unwrap();

        let solved = solve_sudoku(&grid, AdapterKind::Sparse).unwrap();
        assert!((0..dims.n()).all(|r| (0..dims.n()).all(|c| solved.get(r, c).unwrap() == Cell::Empty)));
    }

    #[test]
    fn both_adapters_agree_on_every_column() {
        let grid = classic_grid(PUZZLE_3X3);
        let sparse = SparseCoverMatrix::new(&grid);
        let descriptor = DescriptorMatrix::new(&grid);

        assert_eq!(sparse.rows(), descriptor.rows());
        assert_eq!(sparse.cols(), descriptor.cols());

        for row in 0..sparse.rows() {
            for col in 0..sparse.cols() {
                assert_eq!(sparse.present(row, col), descriptor.present(row, col));
            }
        }
    }
}
