//! Implementation of search algorithms.
//!
//! These algorithms can do path-finding on any `SearchNode`.

pub mod astar;
