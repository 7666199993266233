//! Data structures backing the search algorithms.

pub mod intrusive_heap;
