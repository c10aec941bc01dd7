use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced at the crate's API boundary. `NoSolution` is deliberately absent here:
/// the absence of an exact cover is a normal result, represented by an empty solution or
/// an all-empty grid, never by this type.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("subscript ({row}, {col}) out of range for a {size}x{size} grid")]
    OutOfRange { row: usize, col: usize, size: usize },

    #[error("value {value} out of domain [0, {domain})")]
    ValueOutOfDomain { value: u32, domain: u32 },

    #[error("cell is not set")]
    CellNotSet,

    #[error("malformed grid string: expected {expected} characters, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("unrecognized grid character '{0}'")]
    UnrecognizedChar(char),

    #[error("column {col} out of range for a matrix with {cols} columns")]
    ColumnOutOfRange { col: usize, cols: usize },

    #[error("The entries must be syntactically valid and fulfill the basic Sudoku constraints")]
    InvalidPuzzle,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ResponseError for CoreError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse {
            code: status.to_string().split(' ').collect::<Vec<_>>()[0].to_owned(),
            message: self.to_string(),
        })
    }
}
