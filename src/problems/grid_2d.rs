use std::hash::Hash;

use derive_more::Display;
use rand::Rng;
use thiserror::Error;

use crate::goal::GoalState;
use crate::node::SearchNode;

const MAX_ELEMENTS_DISPLAYED: usize = 40;

pub type Coord = u32;
pub type Grid2DCost = u32;

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("({x},{y})")]
pub struct Grid2DState {
    pub x: Coord,
    pub y: Coord,
}

impl Grid2DState {
    pub fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    /// Length of the shortest 4-connected walk between two cells, ignoring
    /// walls.
    ///
    /// ```
    /// use astar::problems::grid_2d::Grid2DState;
    /// let a = Grid2DState::new(0, 0);
    /// let b = Grid2DState::new(4, 3);
    /// assert_eq!(a.manhattan_distance(&b), 7);
    /// assert_eq!(b.manhattan_distance(&a), 7);
    /// ```
    pub fn manhattan_distance(&self, other: &Self) -> Coord {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Moves on the grid. Rows grow downwards, like the text format.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum Grid2DAction {
    #[display("↑")]
    Up, // y--
    #[display("↓")]
    Down, // y++
    #[display("←")]
    Left, // x--
    #[display("→")]
    Right, // x++
}

impl Grid2DAction {
    pub const ALL: [Grid2DAction; 4] = [
        Grid2DAction::Right,
        Grid2DAction::Down,
        Grid2DAction::Left,
        Grid2DAction::Up,
    ];
}

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum Grid2DCell {
    #[display("░")]
    Empty,
    #[display("█")]
    Wall,
    /// Rough terrain, entering it costs the given amount (2 to 9).
    #[display("{_0}")]
    Rough(Grid2DCost),
}

impl Grid2DCell {
    /// Cost of entering the cell, if it can be entered at all.
    pub fn entry_cost(&self) -> Option<Grid2DCost> {
        match self {
            Grid2DCell::Empty => Some(1),
            Grid2DCell::Wall => None,
            Grid2DCell::Rough(c) => Some(*c),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Grid2DCellParseError {
    #[error("Invalid character '{0}' found.")]
    InvalidCharacter(char),
}

impl std::convert::TryFrom<char> for Grid2DCell {
    type Error = Grid2DCellParseError;

    fn try_from(ch: char) -> Result<Self, Self::Error> {
        match ch {
            ' ' | '.' | '1' => Ok(Grid2DCell::Empty),
            '#' | '█' => Ok(Grid2DCell::Wall),
            '2'..='9' => Ok(Grid2DCell::Rough(ch as Grid2DCost - '0' as Grid2DCost)),
            ch => Err(Grid2DCellParseError::InvalidCharacter(ch)),
        }
    }
}

/// A rectangular grid of cells.
#[derive(Clone, PartialEq, Eq)]
pub struct Grid2DSpace {
    map: Vec<Vec<Grid2DCell>>,
}

impl Grid2DSpace {
    pub fn new_from_map(map: Vec<Vec<Grid2DCell>>) -> Self {
        debug_assert!(
            map.iter().all(|row| row.len() == map[0].len()),
            "Rows must be equally long"
        );
        Self { map }
    }
    pub fn new_empty_with_dimensions(x: usize, y: usize) -> Self {
        Self {
            map: vec![vec![Grid2DCell::Empty; x]; y],
        }
    }

    /// A grid with each cell being a wall with probability `wall_density`.
    pub fn random<R: Rng>(r: &mut R, x: usize, y: usize, wall_density: f64) -> Self {
        let map = (0..y)
            .map(|_| {
                (0..x)
                    .map(|_| {
                        if r.random_bool(wall_density) {
                            Grid2DCell::Wall
                        } else {
                            Grid2DCell::Empty
                        }
                    })
                    .collect()
            })
            .collect();
        Self { map }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        if self.map.is_empty() {
            return (0, 0);
        }
        (self.map[0].len(), self.map.len())
    }

    pub fn valid(&self, state: &Grid2DState) -> bool {
        let (max_x, max_y) = self.dimensions();
        (state.x as usize) < max_x && (state.y as usize) < max_y
    }

    #[inline(always)]
    pub fn at(&self, state: &Grid2DState) -> Option<Grid2DCell> {
        self.map
            .get(state.y as usize)
            .and_then(|row| row.get(state.x as usize))
            .copied()
    }

    pub fn set(&mut self, state: &Grid2DState, cell: Grid2DCell) {
        debug_assert!(self.valid(state));
        self.map[state.y as usize][state.x as usize] = cell;
    }

    /// The cheapest cell to step into. Scales the heuristic.
    pub fn min_entry_cost(&self) -> Grid2DCost {
        self.map
            .iter()
            .flatten()
            .filter_map(Grid2DCell::entry_cost)
            .min()
            .unwrap_or(1)
    }

    /// Where an action leads, if it stays within the grid.
    pub fn apply(&self, state: &Grid2DState, action: Grid2DAction) -> Option<Grid2DState> {
        let Grid2DState { x, y } = *state;

        #[rustfmt::skip]
        let (x, y) = match action {
            Grid2DAction::Up    => (Some(x),         y.checked_sub(1)),
            Grid2DAction::Down  => (Some(x),         y.checked_add(1)),
            Grid2DAction::Left  => (x.checked_sub(1), Some(y)),
            Grid2DAction::Right => (x.checked_add(1), Some(y)),
        };

        let s = Grid2DState::new(x?, y?);
        self.valid(&s).then_some(s)
    }

    /// Gets the neighbours of a given position.
    pub fn neighbours(&self, state: &Grid2DState) -> Vec<(Grid2DState, Grid2DAction)> {
        Grid2DAction::ALL
            .into_iter()
            .filter_map(|action| self.apply(state, action).map(|s| (s, action)))
            .filter(|(s, _a)| self.at(s).and_then(|c| c.entry_cost()).is_some())
            .collect()
    }
}

impl std::fmt::Display for Grid2DSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let d = self.dimensions();
        writeln!(f, "Grid2D({}x{}):", d.0, d.1)?;
        for line in self.map.iter().take(MAX_ELEMENTS_DISPLAYED) {
            for cell in line.iter().take(MAX_ELEMENTS_DISPLAYED) {
                write!(f, "{cell}")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl std::fmt::Debug for Grid2DSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Grid2D{:?}", self.dimensions())
    }
}

/// A cell of a `Grid2DSpace`, searching towards `target`.
///
/// Equality only looks at the cell.
#[derive(Copy, Clone)]
pub struct Grid2DNode<'m> {
    space: &'m Grid2DSpace,
    state: Grid2DState,
    target: Grid2DState,
    min_entry_cost: Grid2DCost,
}

impl Grid2DNode<'_> {
    pub fn state(&self) -> Grid2DState {
        self.state
    }
}

impl PartialEq for Grid2DNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state
    }
}
impl Eq for Grid2DNode<'_> {}

impl Hash for Grid2DNode<'_> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.state.hash(state)
    }
}

impl std::fmt::Display for Grid2DNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.state)
    }
}

impl std::fmt::Debug for Grid2DNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.state)
    }
}

impl SearchNode for Grid2DNode<'_> {
    type Cost = Grid2DCost;

    fn successors(&self) -> Vec<Self> {
        self.space
            .neighbours(&self.state)
            .into_iter()
            .map(|(state, _a)| Grid2DNode { state, ..*self })
            .collect()
    }

    /// Entering a cell costs the cell's weight.
    fn cost(&self, to: &Self) -> Grid2DCost {
        debug_assert_eq!(self.state.manhattan_distance(&to.state), 1);
        self.space
            .at(&to.state)
            .and_then(|c| c.entry_cost())
            .unwrap_or(Grid2DCost::MAX)
    }

    /// Manhattan distance, weighted by the cheapest cell.
    fn h(&self) -> Grid2DCost {
        self.state
            .manhattan_distance(&self.target)
            .saturating_mul(self.min_entry_cost)
    }
}

/// A grid with a start and a goal cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid2DProblem {
    space: Grid2DSpace,
    start: Grid2DState,
    goal: Grid2DState,
}

impl Grid2DProblem {
    pub fn new(space: Grid2DSpace, start: Grid2DState, goal: Grid2DState) -> Self {
        debug_assert!(space.valid(&start) && space.valid(&goal));
        Self { space, start, goal }
    }

    /// A random `x` by `y` grid from the top-left to the bottom-right corner.
    ///
    /// Both corners are kept free of walls, but the goal may be unreachable.
    pub fn random<R: Rng>(r: &mut R, x: usize, y: usize, wall_density: f64) -> Self {
        let mut space = Grid2DSpace::random(r, x.max(1), y.max(1), wall_density);
        let (x, y) = space.dimensions();
        let start = Grid2DState::new(0, 0);
        let goal = Grid2DState::new((x - 1) as Coord, (y - 1) as Coord);
        space.set(&start, Grid2DCell::Empty);
        space.set(&goal, Grid2DCell::Empty);
        Self { space, start, goal }
    }

    pub fn space(&self) -> &Grid2DSpace {
        &self.space
    }
    pub fn start(&self) -> Grid2DState {
        self.start
    }
    pub fn goal(&self) -> Grid2DState {
        self.goal
    }

    /// A node for a cell of this problem, heading to its goal.
    pub fn node(&self, state: Grid2DState) -> Grid2DNode<'_> {
        Grid2DNode {
            space: &self.space,
            state,
            target: self.goal,
            min_entry_cost: self.space.min_entry_cost(),
        }
    }
    pub fn start_node(&self) -> Grid2DNode<'_> {
        self.node(self.start)
    }
    pub fn goal_state(&self) -> GoalState<Grid2DNode<'_>> {
        GoalState::new(self.node(self.goal))
    }
}

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum Grid2DProblemCell {
    Cell(Grid2DCell),
    #[display("S")]
    Start,
    #[display("G")]
    Goal,
}

impl std::convert::TryFrom<char> for Grid2DProblemCell {
    type Error = Grid2DCellParseError;

    fn try_from(ch: char) -> Result<Self, Self::Error> {
        match ch {
            'S' => Ok(Grid2DProblemCell::Start),
            'G' => Ok(Grid2DProblemCell::Goal),
            ch => Ok(Grid2DProblemCell::Cell(Grid2DCell::try_from(ch)?)),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Grid2DParseError {
    #[error("Empty input")]
    EmptyInput,
    #[error("Row {y} is {len} cells long, expected {expected}")]
    RaggedRow { y: usize, len: usize, expected: usize },
    #[error("Invalid cell {e} found at ({x},{y})")]
    InvalidCell {
        e: Grid2DCellParseError,
        x: usize,
        y: usize,
    },
    #[error("No start ('S') cell")]
    MissingStart,
    #[error("No goal ('G') cell")]
    MissingGoal,
    #[error("More than one '{0}' cell")]
    Duplicated(char),
}

impl std::convert::TryFrom<&str> for Grid2DProblem {
    type Error = Grid2DParseError;

    /// Parses a grid, one row per line.
    ///
    /// `S` and `G` mark the start and the goal, `#` walls, ` ` or `.` empty
    /// cells and `2`-`9` rough terrain.
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let lines: Vec<&str> = s.lines().collect();

        if lines.is_empty() || lines[0].is_empty() {
            return Err(Grid2DParseError::EmptyInput);
        }

        let max_x = lines[0].chars().count();
        let mut map = Vec::with_capacity(lines.len());
        let mut start = None;
        let mut goal = None;

        for (y, line) in lines.iter().enumerate() {
            let len = line.chars().count();
            if len != max_x {
                return Err(Grid2DParseError::RaggedRow {
                    y,
                    len,
                    expected: max_x,
                });
            }

            let mut row = Vec::with_capacity(max_x);
            for (x, ch) in line.chars().enumerate() {
                let cell = Grid2DProblemCell::try_from(ch)
                    .map_err(|e| Grid2DParseError::InvalidCell { e, x, y })?;
                let here = Grid2DState::new(x as Coord, y as Coord);

                row.push(match cell {
                    Grid2DProblemCell::Start => {
                        if start.replace(here).is_some() {
                            return Err(Grid2DParseError::Duplicated('S'));
                        }
                        Grid2DCell::Empty
                    }
                    Grid2DProblemCell::Goal => {
                        if goal.replace(here).is_some() {
                            return Err(Grid2DParseError::Duplicated('G'));
                        }
                        Grid2DCell::Empty
                    }
                    Grid2DProblemCell::Cell(c) => c,
                });
            }
            map.push(row);
        }

        Ok(Grid2DProblem {
            space: Grid2DSpace::new_from_map(map),
            start: start.ok_or(Grid2DParseError::MissingStart)?,
            goal: goal.ok_or(Grid2DParseError::MissingGoal)?,
        })
    }
}

impl std::fmt::Display for Grid2DProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let d = self.space.dimensions();
        writeln!(
            f,
            "Grid2DProblem({}x{}) (s:{}, g:{}):",
            d.0, d.1, self.start, self.goal
        )?;
        for (y, line) in self.space.map.iter().enumerate().take(MAX_ELEMENTS_DISPLAYED) {
            for (x, cell) in line.iter().enumerate().take(MAX_ELEMENTS_DISPLAYED) {
                let s = Grid2DState::new(x as Coord, y as Coord);
                match (s == self.start, s == self.goal) {
                    (true, true) => write!(f, "!")?,
                    (true, false) => write!(f, "S")?,
                    (false, true) => write!(f, "G")?,
                    (false, false) => write!(f, "{cell}")?,
                }
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use indoc::indoc;

    #[test]
    fn parse_problem() {
        let p = Grid2DProblem::try_from(indoc! {"
            S.#
            .3#
            ..G
        "})
        .unwrap();

        assert_eq!(p.space().dimensions(), (3, 3));
        assert_eq!(p.start(), Grid2DState::new(0, 0));
        assert_eq!(p.goal(), Grid2DState::new(2, 2));
        assert_eq!(p.space().at(&Grid2DState::new(2, 0)), Some(Grid2DCell::Wall));
        assert_eq!(
            p.space().at(&Grid2DState::new(1, 1)),
            Some(Grid2DCell::Rough(3))
        );
        assert_eq!(p.space().at(&Grid2DState::new(3, 0)), None);
    }

    #[test]
    fn parse_errors() {
        assert_eq!(
            Grid2DProblem::try_from(""),
            Err(Grid2DParseError::EmptyInput)
        );
        assert_eq!(
            Grid2DProblem::try_from("S.\n.\n"),
            Err(Grid2DParseError::RaggedRow {
                y: 1,
                len: 1,
                expected: 2
            })
        );
        assert_eq!(
            Grid2DProblem::try_from("S?G"),
            Err(Grid2DParseError::InvalidCell {
                e: Grid2DCellParseError::InvalidCharacter('?'),
                x: 1,
                y: 0
            })
        );
        assert_eq!(
            Grid2DProblem::try_from("..G"),
            Err(Grid2DParseError::MissingStart)
        );
        assert_eq!(
            Grid2DProblem::try_from("S.."),
            Err(Grid2DParseError::MissingGoal)
        );
        assert_eq!(
            Grid2DProblem::try_from("SSG"),
            Err(Grid2DParseError::Duplicated('S'))
        );
    }

    #[test]
    fn neighbours_skip_walls_and_borders() {
        let p = Grid2DProblem::try_from(indoc! {"
            S#
            .G
        "})
        .unwrap();

        let corner = p.space().neighbours(&Grid2DState::new(0, 0));
        assert_eq!(corner, vec![(Grid2DState::new(0, 1), Grid2DAction::Down)]);

        let bottom_right = p.space().neighbours(&Grid2DState::new(1, 1));
        assert_eq!(
            bottom_right,
            vec![(Grid2DState::new(0, 1), Grid2DAction::Left)]
        );
    }

    #[test]
    fn rough_cells_cost_their_weight() {
        let p = Grid2DProblem::try_from("S9G").unwrap();
        let s = p.start_node();
        let rough = p.node(Grid2DState::new(1, 0));
        let g = p.node(Grid2DState::new(2, 0));

        assert_eq!(s.successors(), vec![rough]);
        assert_eq!(s.cost(&rough), 9);
        assert_eq!(rough.cost(&g), 1);
        assert_eq!(s.h(), 2);
        assert_eq!(g.h(), 0);
    }

    #[test]
    fn random_problems_keep_corners_free() {
        use rand_chacha::ChaCha8Rng;
        use rand_chacha::rand_core::SeedableRng;

        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let p = Grid2DProblem::random(&mut rng, 7, 5, 0.9);
            assert_eq!(p.space().dimensions(), (7, 5));
            assert_eq!(p.space().at(&p.start()), Some(Grid2DCell::Empty));
            assert_eq!(p.space().at(&p.goal()), Some(Grid2DCell::Empty));
            assert_eq!(p.goal(), Grid2DState::new(6, 4));
        }
    }

    #[test]
    fn display_marks_start_and_goal() {
        let p = Grid2DProblem::try_from("S#G").unwrap();
        assert_eq!(p.to_string(), "Grid2DProblem(3x1) (s:(0,0), g:(2,0)):\nS█G\n");
    }
}
