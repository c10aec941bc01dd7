use actix_web::{post, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::CoreError,
    reduction::{solve_sudoku, AdapterKind},
    sudoku::{Dims, Grid},
};

pub use crate::error::ErrorResponse;

/// One puzzle entry. `region_rows`/`region_cols` default to the integer square root of the
/// grid's side length, matching the common 9x9 (3x3-region) case.
#[derive(Debug, Serialize, Deserialize)]
pub struct Entry {
    pub grid: String,
    pub region_rows: Option<u32>,
    pub region_cols: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Solved {
    pub grid: String,
    pub solved: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub data: Vec<Solved>,
    total_cpu_ms: u128,
}

/// Infers the region shape from the entry, defaulting to a square `R x R` region (i.e. the
/// grid's side length `N = R*R`) when unspecified. Non-square region shapes (e.g. 2x3) must
/// supply `region_rows`/`region_cols` explicitly since they can't be inferred from length alone.
fn region_dims(entry: &Entry) -> Result<Dims, CoreError> {
    if let (Some(r), Some(c)) = (entry.region_rows, entry.region_cols) {
        return Ok(Dims::new(r, c));
    }

    let len = entry.grid.chars().count();
    let n = (len as f64).sqrt().round() as u32;
    let r = (n as f64).sqrt().round() as u32;

    if n == 0 || (n * n) as usize != len || r * r != n {
        return Err(CoreError::WrongLength {
            expected: (n * n) as usize,
            actual: len,
        });
    }
    Ok(Dims::new(r, r))
}

fn solve_entry(entry: &Entry) -> Result<Solved, CoreError> {
    let dims = region_dims(entry)?;
    let grid = Grid::parse(dims, &entry.grid)?;

    if !grid.is_valid() {
        return Err(CoreError::InvalidPuzzle);
    }

    let solved = solve_sudoku(&grid, AdapterKind::Sparse)?;
    let is_solved = solved.is_complete() && solved.is_valid();

    Ok(Solved {
        grid: solved.render(),
        solved: is_solved,
    })
}

/// Solves a batch of Sudoku puzzles submitted as JSON. Malformed or constraint-violating
/// entries are rejected wholesale with a `400` carrying the canonical error message, matching
/// the caller-error policy of §7: there is no partial result.
#[post("/solve")]
pub async fn solve(entries: web::Json<Vec<Entry>>) -> impl Responder {
    let start = std::time::Instant::now();
    let mut data = Vec::with_capacity(entries.len());

    for entry in entries.iter() {
        match solve_entry(entry) {
            Ok(solved) => data.push(solved),
            Err(_) => return HttpResponse::from_error(CoreError::InvalidPuzzle),
        }
    }

    let total_cpu_ms = start.elapsed().as_millis();
    info!(count = entries.len(), total_cpu_ms, "processed solve request");

    HttpResponse::Ok().json(Response { data, total_cpu_ms })
}
