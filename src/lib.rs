pub mod controller;
pub mod dlx;
pub mod error;
pub mod matrix;
pub mod reduction;
pub mod sudoku;

// Necessary to export the modules to be integration tested in 'tests'
