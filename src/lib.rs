//! A* search over caller-defined state spaces.
//!
//! States implement [`SearchNode`], goals implement [`Goal`], and
//! [`shortest_path`] or [`AStarSearch`] do the rest.
//!
//! ```
//! use astar::problems::city::CityMap;
//! use astar::goal::GoalState;
//!
//! let map = CityMap::southwest_germany();
//! let start = map.city("Saarbrücken").unwrap();
//! let goal = GoalState::new(map.city("Würzburg").unwrap());
//!
//! let path = astar::shortest_path(start, goal, None).unwrap();
//! assert_eq!(path.cost(), 289);
//! ```

use shadow_rs::shadow;

shadow!(build);

// Internals
// ---------
pub mod data_structures;
pub mod derank;
pub mod heap_primitives;

// Search space and problems
// -------------------------
pub mod cost;
pub mod float_cost;
pub mod goal;
pub mod node;
pub mod path;
pub mod search;

// Problems
// --------
pub mod problems;

// Algorithms
// ----------
pub mod algorithms;
pub mod observer;

pub use algorithms::astar::AStarSearch;
pub use algorithms::astar::SearchError;
pub use algorithms::astar::Solution;
pub use algorithms::astar::reconstruct_path;
pub use algorithms::astar::search;
pub use algorithms::astar::shortest_path;
pub use cost::Cost;
pub use goal::Goal;
pub use node::SearchNode;
pub use path::Path;
