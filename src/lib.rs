//! Genetic reconstruction of shuffled square-tile images.
//!
//! The solver treats the puzzle as a permutation search: tile edge
//! compatibilities are measured once up front, and a generational GA whose
//! crossover grows a child kernel piece by piece looks for the arrangement
//! with the cheapest seams.

pub mod compat;
pub mod crossover;
pub mod ea;
pub mod error;
pub mod img;
pub mod solver;
pub mod tile;

pub use error::Error;
pub use solver::{solve, Params};
