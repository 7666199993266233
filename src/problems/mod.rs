//! Sample state spaces.
//!
//! These implement `SearchNode` over small, explicit worlds so the search can
//! be exercised, benchmarked and run from the command line.

pub mod city;
pub mod graph;
pub mod grid_2d;
