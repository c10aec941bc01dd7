//! Dancing Links (DLX) exact-cover engine.
//!
//! This implementation is largely based on Ulrik Sverdrup's dlx design
//! (https://github.com/bluss/dlx/), generalized from a 9x9-Sudoku-only mesh to any matrix
//! satisfying the `BinaryMatrix` adapter contract.

use std::iter::repeat;

use tracing::{instrument, trace};

use crate::{error::CoreError, matrix::BinaryMatrix};

#[derive(Debug, Clone, Copy)]
enum Direction {
    Prev,
    Next,
    Up,
    Down,
}

impl Direction {
    fn opposite(&self) -> Self {
        match self {
            Direction::Prev => Direction::Next,
            Direction::Next => Direction::Prev,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

/// Node of the DLX mesh.
#[derive(Debug, Clone, Copy)]
struct Node {
    /// Links to available directions (previous, next, up, down in that order).
    links: [usize; 4],
    value: Point,
}

impl Node {
    fn new(value: Point) -> Self {
        Self {
            links: [!0; 4],
            value,
        }
    }

    fn get_link(&self, dir: Direction) -> usize {
        self.links[dir as usize]
    }

    fn set_link(&mut self, idx: usize, dir: Direction) -> &mut Self {
        self.links[dir as usize] = idx;
        self
    }

    fn assign(&mut self, dir: Direction) -> &mut usize {
        &mut self.links[dir as usize]
    }
}

/// Value stored inside a DLX node.
#[derive(Debug, Clone, Copy)]
enum Point {
    /// Singleton root sentinel, participates only in the horizontal header ring.
    Head,
    /// Column header with a live count of nodes currently reachable in that column.
    Column(usize),
    /// Interior node: the original row index in the source matrix.
    Body(usize),
}

impl Point {
    fn value(&self) -> usize {
        match *self {
            Point::Head => unreachable!("head node value should never be directly accessed"),
            Point::Column(x) | Point::Body(x) => x,
        }
    }

    fn value_mut(&mut self) -> &mut usize {
        match self {
            Point::Head => unreachable!("head node value should never be directly accessed"),
            Point::Column(x) | Point::Body(x) => x,
        }
    }
}

/// Borrowless linked-list traversal: walks away from `start` in a fixed direction, stopping
/// (returning `None`) the moment it would return to `start`.
struct Walker {
    idx: usize,
    start: usize,
}

impl Walker {
    #[inline]
    fn next(&mut self, mesh: &Mesh, dir: Direction) -> Option<usize> {
        let next = mesh.nodes[self.idx].get_link(dir);
        self.idx = next;

        debug_assert_ne!(next, !0, "invalid index found in traversal");

        if next == self.start {
            return None;
        }

        Some(next)
    }
}

/// The toroidal linked mesh built from a source binary matrix, plus the search state needed
/// to run Algorithm X over it.
struct Mesh {
    nodes: Vec<Node>,
    num_cols: usize,
}

impl Mesh {
    const HEAD: usize = 0;

    fn build(matrix: &impl BinaryMatrix) -> Result<Self, CoreError> {
        let rows = matrix.rows();
        let cols = matrix.cols();

        let mut mesh = Mesh {
            nodes: Vec::with_capacity(1 + cols),
            num_cols: cols,
        };
        mesh.init_headers(cols);

        for row in 0..rows {
            let present_cols: Vec<usize> = (0..cols).filter(|&c| matrix.present(row, c)).collect();
            if present_cols.is_empty() {
                continue;
            }
            mesh.append_row(row, present_cols)?;
        }

        Ok(mesh)
    }

    /// Inserts the head sentinel and the horizontal ring of column headers, in index order.
    fn init_headers(&mut self, cols: usize) {
        let nodes = &mut self.nodes;
        nodes.push(Node::new(Point::Head));
        nodes.extend(repeat(Node::new(Point::Column(0))).take(cols));

        for (idx, node) in nodes.iter_mut().enumerate() {
            *node.assign(Direction::Next) = idx + 1;
            *node.assign(Direction::Prev) = idx.wrapping_sub(1);
            *node.assign(Direction::Up) = idx;
            *node.assign(Direction::Down) = idx;
        }

        let len = nodes.len();
        *nodes[0].assign(Direction::Prev) = len - 1;
        *nodes[len - 1].assign(Direction::Next) = 0;
    }

    #[inline]
    fn walk_from(&self, idx: usize) -> Walker {
        Walker { idx, start: idx }
    }

    #[inline]
    fn node_value(&self, idx: usize) -> usize {
        self.nodes[idx].value.value()
    }

    #[inline]
    fn col_head_of(&self, idx: usize) -> usize {
        debug_assert!(idx > self.num_cols, "expected a row item index, got {idx}");
        self.node_value(idx)
    }

    #[inline]
    fn col_head_value_mut(&mut self, idx: usize) -> &mut usize {
        let head = self.col_head_of(idx);
        self.nodes[head].value.value_mut()
    }

    /// Appends one non-empty row's interior nodes and links them into both rings. `cols` must
    /// already be validated to lie within `[0, num_cols)`.
    fn append_row(&mut self, row: usize, cols: Vec<usize>) -> Result<(), CoreError> {
        let start_idx = self.nodes.len();

        for &c in &cols {
            if c >= self.num_cols {
                return Err(CoreError::ColumnOutOfRange {
                    col: c,
                    cols: self.num_cols,
                });
            }
            self.nodes.push(Node::new(Point::Body(row)));
        }

        for (offset, &c) in cols.iter().enumerate() {
            self.append_to_col(c + 1, start_idx + offset);
        }

        let end_idx = self.nodes.len();
        for (offset, node) in self.nodes[start_idx..].iter_mut().enumerate() {
            let prev = if offset == 0 {
                end_idx - 1
            } else {
                start_idx + offset - 1
            };
            let next = if start_idx + offset + 1 == end_idx {
                start_idx
            } else {
                start_idx + offset + 1
            };
            node.set_link(prev, Direction::Prev);
            node.set_link(next, Direction::Next);
        }

        Ok(())
    }

    /// Appends a new interior node to the bottom of column header `head_idx` (1-based: column
    /// headers occupy indices `[1, num_cols]`).
    fn append_to_col(&mut self, head_idx: usize, new_idx: usize) {
        let head = &mut self.nodes[head_idx];
        let old_end = head.get_link(Direction::Up);

        head.set_link(new_idx, Direction::Up);
        *head.value.value_mut() += 1;
        self.nodes[old_end].set_link(new_idx, Direction::Down);
        self.nodes[new_idx]
            .set_link(old_end, Direction::Up)
            .set_link(head_idx, Direction::Down);
    }

    fn remove(&mut self, idx: usize, dir: Direction) {
        let right = dir;
        let left = right.opposite();

        let x = &self.nodes[idx];
        let xr = x.get_link(right);
        let xl = x.get_link(left);

        self.nodes[xr].set_link(xl, left);
        self.nodes[xl].set_link(xr, right);
    }

    fn restore(&mut self, idx: usize, dir: Direction) {
        let right = dir;
        let left = dir.opposite();

        let x = &self.nodes[idx];
        let xr = x.get_link(right);
        let xl = x.get_link(left);

        self.nodes[xr].set_link(idx, left);
        self.nodes[xl].set_link(idx, right);
    }

    /// Covers a column: splices its header out of the horizontal ring, and every row
    /// intersecting it out of its column rings.
    fn cover(&mut self, idx: usize) {
        self.remove(idx, Direction::Next);
        let mut rows = self.walk_from(idx);

        while let Some(ri) = rows.next(self, Direction::Down) {
            let mut ri_walker = self.walk_from(ri);

            while let Some(rij) = ri_walker.next(self, Direction::Next) {
                self.remove(rij, Direction::Down);
                *self.col_head_value_mut(rij) -= 1;
            }
        }
    }

    /// Uncovers a column in the exact reverse traversal order of `cover`, restoring the mesh
    /// to its pre-cover topology.
    fn uncover(&mut self, idx: usize) {
        let mut rows = self.walk_from(idx);

        while let Some(ri) = rows.next(self, Direction::Up) {
            let mut ri_walker = self.walk_from(ri);

            while let Some(rij) = ri_walker.next(self, Direction::Prev) {
                self.restore(rij, Direction::Down);
                *self.col_head_value_mut(rij) += 1;
            }
        }

        self.restore(idx, Direction::Next);
    }

    /// Minimum-remaining-values column choice: the header with the smallest live count, first
    /// encountered in left-to-right order on ties. Returns `HEAD` if no columns remain.
    fn choose(&self) -> usize {
        let mut chosen = Self::HEAD;
        let mut min = usize::MAX;
        let mut col_heads = self.walk_from(Self::HEAD);

        while let Some(idx) = col_heads.next(self, Direction::Next) {
            let count = self.node_value(idx);
            if count < min {
                min = count;
                chosen = idx;
            }
        }

        chosen
    }

    /// Recursive Algorithm X search. Appends row indices (in post-order) to `solution` as
    /// successful frames unwind.
    fn search(&mut self, solution: &mut Vec<usize>) -> bool {
        let col_idx = self.choose();

        if col_idx == Self::HEAD {
            return true;
        }

        self.cover(col_idx);
        let mut col_items = self.walk_from(col_idx);
        let mut solved = false;

        while let Some(ri) = col_items.next(self, Direction::Down) {
            let mut r_walker = self.walk_from(ri);
            while let Some(rj) = r_walker.next(self, Direction::Next) {
                self.cover(self.col_head_of(rj));
            }

            if self.search(solution) {
                solution.push(self.node_value(ri));
                solved = true;
            }

            let mut row_iter = self.walk_from(ri);
            while let Some(rj) = row_iter.next(self, Direction::Prev) {
                self.uncover(self.col_head_of(rj));
            }

            if solved {
                break;
            }
        }

        self.uncover(col_idx);
        solved
    }
}

/// Solves an exact-cover instance encoded into a binary matrix. Returns the set of original
/// row indices forming the cover, as an unordered list; an empty list means no cover exists.
#[instrument(skip(matrix), fields(rows = matrix.rows(), cols = matrix.cols()))]
pub fn solve_exact_cover(matrix: &impl BinaryMatrix) -> Result<Vec<usize>, CoreError> {
    let mut mesh = Mesh::build(matrix)?;
    let mut solution = Vec::new();
    let found = mesh.search(&mut solution);

    trace!(found, rows_in_solution = solution.len(), "exact cover search finished");

    if found {
        Ok(solution)
    } else {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::SparseMatrix;

    fn matrix_from(rows: usize, cols: usize, entries: &[(usize, usize)]) -> SparseMatrix<bool> {
        let mut m = SparseMatrix::new(rows, cols);
        for &(r, c) in entries {
            m.set(r, c, true).unwrap();
        }
        m
    }

    #[test]
    fn trivial_identity_cover() {
        let m = matrix_from(2, 2, &[(0, 0), (1, 1)]);
        let mut solution = solve_exact_cover(&m).unwrap();
        solution.sort();
        assert_eq!(solution, vec![0, 1]);
    }

    #[test]
    fn unsatisfiable_instance_yields_empty_solution() {
        // Column 0 has no entries anywhere: no cover can satisfy it.
        let m = matrix_from(2, 2, &[(0, 1), (1, 1)]);
        let solution = solve_exact_cover(&m).unwrap();
        assert!(solution.is_empty());
    }

    #[test]
    fn classic_knuth_example_has_a_solution() {
        // The 6x7 example from Knuth's "Dancing Links" paper.
        let m = matrix_from(
            6,
            7,
            &[
                (0, 2),
                (0, 4),
                (0, 5),
                (1, 0),
                (1, 3),
                (1, 6),
                (2, 1),
                (2, 2),
                (2, 5),
                (3, 0),
                (3, 3),
                (4, 1),
                (4, 6),
                (5, 3),
                (5, 4),
                (5, 6),
            ],
        );

        let mut solution = solve_exact_cover(&m).unwrap();
        solution.sort();
        assert_eq!(solution, vec![0, 3, 4]);
    }

    #[test]
    fn every_column_is_covered_exactly_once() {
        let m = matrix_from(
            6,
            7,
            &[
                (0, 2),
                (0, 4),
                (0, 5),
                (1, 0),
                (1, 3),
                (1, 6),
                (2, 1),
                (2, 2),
                (2, 5),
                (3, 0),
                (3, 3),
                (4, 1),
                (4, 6),
                (5, 3),
                (5, 4),
                (5, 6),
            ],
        );
        let solution = solve_exact_cover(&m).unwrap();

        for col in 0..m.cols() {
            let covering_rows = solution.iter().filter(|&&r| m.present(r, col)).count();
            assert_eq!(covering_rows, 1, "column {col} not covered exactly once");
        }
    }

    #[test]
    fn cover_uncover_round_trip_restores_topology() {
        let m = matrix_from(2, 2, &[(0, 0), (1, 1)]);
        let mut mesh = Mesh::build(&m).unwrap();
        let before_links = mesh.nodes.iter().map(|n| n.links).collect::<Vec<_>>();
        let before_counts = (1..=mesh.num_cols).map(|h| mesh.node_value(h)).collect::<Vec<_>>();

        let col = mesh.walk_from(Mesh::HEAD).next(&mesh, Direction::Next).unwrap();
        mesh.cover(col);
        mesh.uncover(col);

        let after_links = mesh.nodes.iter().map(|n| n.links).collect::<Vec<_>>();
        let after_counts = (1..=mesh.num_cols).map(|h| mesh.node_value(h)).collect::<Vec<_>>();

        assert_eq!(after_links, before_links, "links not restored by uncover");
        assert_eq!(after_counts, before_counts, "header data counts not restored by uncover");
    }
}
