use std::hash::Hash;

use rustc_hash::FxHashSet;

/// A goal test.
///
/// Called exactly once for every node taken out of the open set. Must not
/// have side effects that change the answer for later calls.
pub trait Goal<N> {
    fn is_goal(&self, node: &N) -> bool;
}

impl<N, F> Goal<N> for F
where
    F: Fn(&N) -> bool,
{
    #[inline(always)]
    fn is_goal(&self, node: &N) -> bool {
        self(node)
    }
}

/// Reaching a single, known state.
///
/// ```
/// use astar::goal::Goal;
/// use astar::goal::GoalState;
///
/// let goal = GoalState::new("Würzburg");
/// assert!(goal.is_goal(&"Würzburg"));
/// assert!(!goal.is_goal(&"Frankfurt"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GoalState<N> {
    target: N,
}

impl<N> GoalState<N> {
    pub fn new(target: N) -> Self {
        Self { target }
    }
    pub fn target(&self) -> &N {
        &self.target
    }
}

impl<N: PartialEq> Goal<N> for GoalState<N> {
    #[inline(always)]
    fn is_goal(&self, node: &N) -> bool {
        self.target == *node
    }
}

/// Reaching any state out of a set.
#[derive(Clone, Debug)]
pub struct GoalSet<N>
where
    N: Eq + Hash,
{
    targets: FxHashSet<N>,
}

impl<N> GoalSet<N>
where
    N: Eq + Hash,
{
    pub fn len(&self) -> usize {
        self.targets.len()
    }
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
    pub fn contains(&self, node: &N) -> bool {
        self.targets.contains(node)
    }
}

impl<N> FromIterator<N> for GoalSet<N>
where
    N: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = N>>(iter: I) -> Self {
        Self {
            targets: FxHashSet::from_iter(iter),
        }
    }
}

impl<N> Goal<N> for GoalSet<N>
where
    N: Eq + Hash,
{
    #[inline(always)]
    fn is_goal(&self, node: &N) -> bool {
        self.targets.contains(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_goals() {
        let even = |n: &u32| n % 2 == 0;
        assert!(even.is_goal(&4));
        assert!(!even.is_goal(&5));
    }

    #[test]
    fn goal_sets() {
        let goals: GoalSet<(u32, u32)> = [(1, 1), (2, 3)].into_iter().collect();
        assert_eq!(goals.len(), 2);
        assert!(goals.is_goal(&(2, 3)));
        assert!(!goals.is_goal(&(3, 2)));
    }
}
