use num_traits::SaturatingAdd;
use num_traits::Zero;

use crate::cost::Cost;
use crate::node::SearchNode;

const MAX_ELEMENTS_DISPLAYED: usize = 20;

/// A path through a search space, from its start to its end.
///
/// Every step keeps the accumulated cost (`g`) of reaching it, so the start
/// has a cost of zero and the last step carries the cost of the whole path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path<N>
where
    N: SearchNode,
{
    steps: Vec<(N, N::Cost)>,
}

impl<N> Path<N>
where
    N: SearchNode,
{
    /// A path that starts and ends at `start`.
    #[inline(always)]
    pub fn new_from_start(start: N) -> Self {
        Self {
            steps: vec![(start, N::Cost::zero())],
        }
    }

    /// Builds a path out of `(state, g)` steps in start-to-end order.
    pub(crate) fn from_steps(steps: Vec<(N, N::Cost)>) -> Self {
        debug_assert!(!steps.is_empty(), "Paths have at least a start");
        Self { steps }
    }

    #[inline(always)]
    pub fn start(&self) -> &N {
        &self.steps[0].0
    }
    #[inline(always)]
    pub fn end(&self) -> &N {
        &self.steps[self.steps.len() - 1].0
    }
    /// The cost of the whole path.
    #[inline(always)]
    pub fn cost(&self) -> N::Cost {
        self.steps[self.steps.len() - 1].1
    }

    /// Number of states in the path, including start and end.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.steps.len()
    }
    /// Whether the path has no moves (it ends where it starts).
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.steps.len() == 1
    }

    pub fn states(&self) -> impl Iterator<Item = &N> {
        self.steps.iter().map(|(s, _g)| s)
    }
    pub fn steps(&self) -> &[(N, N::Cost)] {
        &self.steps
    }
    pub fn into_states(self) -> Vec<N> {
        self.steps.into_iter().map(|(s, _g)| s).collect()
    }

    /// Adds a move to a successor of the current end.
    pub fn append(&mut self, next: N) {
        let c = self.end().cost(&next);
        let g = self.cost().saturating_add(&c);
        self.steps.push((next, g));
    }

    /// Verifies the path against the search space.
    ///
    /// The path must start at zero cost, every state must be a successor of
    /// the previous one and each step's cost must grow by exactly the cost of
    /// the edge taken.
    pub fn is_contiguous(&self) -> bool {
        if !self.steps[0].1.is_zero() {
            return false;
        }
        self.steps.windows(2).all(|w| {
            let (from, g_from) = &w[0];
            let (to, g_to) = &w[1];
            from.successors().contains(to) && g_from.saturating_add(&from.cost(to)) == *g_to
        })
    }

    /// Runs cheap sanity checks.
    #[inline(always)]
    pub fn seems_valid(&self) -> bool {
        !self.steps.is_empty() && self.cost().valid()
    }
}

impl<N> std::fmt::Display for Path<N>
where
    N: SearchNode,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Path({}, {:?}", self.cost(), self.start())?;
        for (s, _g) in self.steps.iter().skip(1).take(MAX_ELEMENTS_DISPLAYED) {
            write!(f, " -> {s:?}")?;
        }
        if self.steps.len() > MAX_ELEMENTS_DISPLAYED + 1 {
            write!(f, " -> ... -> {:?}", self.end())?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A line of integers where moving right costs the target value.
    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    struct Line(u32);

    impl SearchNode for Line {
        type Cost = u32;
        fn successors(&self) -> Vec<Self> {
            if self.0 < 5 { vec![Line(self.0 + 1)] } else { vec![] }
        }
        fn cost(&self, to: &Self) -> u32 {
            to.0
        }
    }

    #[test]
    fn single_state() {
        let p = Path::new_from_start(Line(0));
        assert!(p.is_empty());
        assert_eq!(p.len(), 1);
        assert_eq!(p.cost(), 0);
        assert_eq!(p.start(), p.end());
        assert!(p.is_contiguous());
    }

    #[test]
    fn appending_accumulates_costs() {
        let mut p = Path::new_from_start(Line(0));
        p.append(Line(1));
        p.append(Line(2));
        p.append(Line(3));
        assert_eq!(p.cost(), 6);
        assert_eq!(p.len(), 4);
        assert!(p.is_contiguous());
        assert!(p.seems_valid());
        assert_eq!(p.to_string(), "Path(6, Line(0) -> Line(1) -> Line(2) -> Line(3))");
    }

    #[test]
    fn detects_jumps_and_wrong_costs() {
        let jump = Path::from_steps(vec![(Line(0), 0), (Line(2), 2)]);
        assert!(!jump.is_contiguous());

        let wrong_cost = Path::from_steps(vec![(Line(0), 0), (Line(1), 7)]);
        assert!(!wrong_cost.is_contiguous());

        let late_start = Path::from_steps(vec![(Line(0), 1), (Line(1), 2)]);
        assert!(!late_start.is_contiguous());
    }
}
