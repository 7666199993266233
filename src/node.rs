//! The node capability consumed by the search algorithms.

use std::fmt::Debug;
use std::hash::Hash;

use crate::cost::Cost;

/// A state in an implicit search graph.
///
/// Implementors describe the graph by enumerating successors and pricing the
/// edges to them. The search engine keeps track of accumulated costs and
/// parent links on its own nodes, so a `SearchNode` value is never mutated by
/// a search and can be shared between searches.
///
/// Equality and hashing must describe the *logical* state: two values that
/// stand for the same place in the search space must compare equal and hash
/// alike. Rediscovered states are reconciled onto the existing search node
/// through them.
///
/// Optimality of the returned paths depends on the caller honouring these
/// preconditions, none of which are checked at runtime:
/// - `cost` is never negative (guaranteed for unsigned costs).
/// - `h` is consistent: `h(a) <= cost(a, b) + h(b)` for every successor `b`
///   of `a`, and zero at goals. Closed states are never reopened, so an
///   admissible but inconsistent `h` may yield a more expensive path.
/// - `successors` is finite and returns the same states on every call.
pub trait SearchNode: Clone + Debug + Eq + Hash {
    type Cost: Cost;

    /// Expands a state.
    fn successors(&self) -> Vec<Self>;

    /// Cost of moving from `self` to one of its successors.
    fn cost(&self, to: &Self) -> Self::Cost;

    /// Consistent estimate of the remaining cost to a goal.
    ///
    /// Defaults to 0, which turns A* into Dijkstra's algorithm.
    fn h(&self) -> Self::Cost {
        <Self::Cost as num_traits::Zero>::zero()
    }
}
