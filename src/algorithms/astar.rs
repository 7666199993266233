//! Implementation of the A* path-finding algorithm.

use std::fmt::Debug;

use num_traits::SaturatingAdd;
use num_traits::Zero;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::cost::Cost;
use crate::data_structures::intrusive_heap::IntrusiveHeap;
use crate::data_structures::intrusive_heap::IntrusiveHeapNode;
use crate::goal::Goal;
use crate::node::SearchNode;
use crate::observer::Frontier;
use crate::observer::NoopObserver;
use crate::observer::SearchObserver;
use crate::path::Path;
use crate::search::SearchTree;
use crate::search::SearchTreeIndex;
use crate::search::SearchTreeNode;

/// The ranking tuple for A*
///
/// We prefer better f-values, tie break for lower h, and finally for the
/// entry that was (re-)ranked first.
///
/// Preferring lower h dives towards the goal when several nodes look equally
/// good. The sequence number makes the order total, so searches are
/// reproducible.
///
/// ```
/// use astar::algorithms::astar::AStarRank;
///
/// // Same f-value, lower h wins.
/// assert!(AStarRank::new(2u32, 0u32, 1) < AStarRank::new(0u32, 2u32, 0));
/// // Same f and h, first come first served.
/// assert!(AStarRank::new(1u32, 1u32, 0) < AStarRank::new(1u32, 1u32, 1));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct AStarRank<C: Cost> {
    f: C,
    h: C,
    seq: u64,
}
impl<C> AStarRank<C>
where
    C: Cost,
{
    pub fn new(g: C, h: C, seq: u64) -> Self {
        Self {
            f: g.saturating_add(&h),
            h,
            seq,
        }
    }
    pub fn f(&self) -> C {
        self.f
    }
    pub fn h(&self) -> C {
        self.h
    }
    /// Improves `g` in `Rank{f, h}` without recomputing `h`.
    ///
    /// Re-ranking counts as a new insertion for tie-breaking.
    pub fn improve_g(&mut self, new_g: C, seq: u64) {
        let f = new_g.saturating_add(&self.h);
        debug_assert!(f <= self.f, "Improving g must not worsen f");
        self.f = f;
        self.seq = seq;
    }
}

/// An entry of the open set.
///
/// Heap nodes carry just ranking information and the index of the actual
/// search node, so heap operations move as little data as possible.
#[derive(Debug, Clone)]
pub struct AStarHeapNode<C>
where
    C: Cost,
{
    /// The rank of this node that defines how good it is.
    pub rank: AStarRank<C>,
    /// The index of this node in the Search Tree. Ignored when ranking.
    pub node_index: SearchTreeIndex,
}

impl<C: Cost> PartialEq for AStarHeapNode<C> {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.rank.eq(&other.rank)
    }
}
impl<C: Cost> Eq for AStarHeapNode<C> {}

impl<C: Cost> PartialOrd for AStarHeapNode<C> {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<C: Cost> Ord for AStarHeapNode<C> {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank.cmp(&other.rank)
    }
}

impl<C: Cost> IntrusiveHeapNode for AStarHeapNode<C> {
    type Key = SearchTreeIndex;

    #[inline(always)]
    fn key(&self) -> SearchTreeIndex {
        self.node_index
    }
}

/// Why a search ended without reaching a goal.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SearchError {
    /// Every reachable state was expanded. No goal is reachable.
    #[error("No goal is reachable ({expanded} states expanded)")]
    Exhausted { expanded: usize },
    /// The step budget ran out while there were still states to expand.
    #[error("Step budget of {max_steps} expansions exhausted ({open} states still open)")]
    BudgetExhausted {
        max_steps: usize,
        expanded: usize,
        open: usize,
    },
}

impl SearchError {
    pub fn expanded(&self) -> usize {
        match self {
            SearchError::Exhausted { expanded } => *expanded,
            SearchError::BudgetExhausted { expanded, .. } => *expanded,
        }
    }
    pub fn is_budget_exhausted(&self) -> bool {
        matches!(self, SearchError::BudgetExhausted { .. })
    }
}

/// A* search from a single start towards the states accepted by a `Goal`.
///
/// The search owns all of its bookkeeping, states handed out by
/// `SearchNode::successors` are cloned into the tree and never mutated.
/// Equal states are reconciled through the node map, so rediscovering a
/// state always updates the one search node that represents it.
pub struct AStarSearch<N, G>
where
    N: SearchNode,
    G: Goal<N>,
{
    /// All the Search Nodes. Naturally forms a Search Forest as each node may
    /// have a parent Node.
    search_tree: SearchTree<N>,

    /// An intrusive heap of `(AStarRank, SearchTreeIndex)` that keeps the
    /// referenced node updated (`SearchTreeNode::heap_index`).
    /// This allows re-ranking a `SearchTreeNode` in the heap without a linear
    /// search for its `(AStarRank, SearchTreeIndex)` entry.
    open: IntrusiveHeap<AStarHeapNode<N::Cost>>,

    /// Amalgamation of,
    /// - The `HashMap<N, SearchTreeIndex>`, to find existing Search Nodes from
    ///   their state.
    /// - The "Closed Set" `HashSet<N>`, through the closed bit of the index.
    ///
    /// It's the same size as the Search Tree.
    node_map: FxHashMap<N, SearchTreeIndex>,

    goal: G,

    /// A goal that was returned but not expanded yet. Expanded first when the
    /// search is resumed.
    found: Option<SearchTreeIndex>,

    max_steps: Option<usize>,
    expanded: usize,
    next_seq: u64,
}

impl<N, G> AStarSearch<N, G>
where
    N: SearchNode,
    G: Goal<N>,
{
    #[must_use]
    pub fn new(start: N, goal: G) -> Self {
        let mut search = Self {
            search_tree: SearchTree::new(),
            open: IntrusiveHeap::with_capacity(2048),
            node_map: FxHashMap::default(),
            goal,
            found: None,
            max_steps: None,
            expanded: 0,
            next_seq: 0,
        };

        search.push_new(start, None, N::Cost::zero());
        search
    }

    /// Caps the number of expansions. `None` searches until the open set
    /// runs out, which may never happen on infinite spaces.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: impl Into<Option<usize>>) -> Self {
        self.max_steps = max_steps.into();
        self
    }

    pub fn max_steps(&self) -> Option<usize> {
        self.max_steps
    }
    /// Number of states expanded so far.
    pub fn expanded(&self) -> usize {
        self.expanded
    }
    pub fn open_len(&self) -> usize {
        self.open.len()
    }
    pub fn tree(&self) -> &SearchTree<N> {
        &self.search_tree
    }
    pub fn node(&self, node_index: SearchTreeIndex) -> &SearchTreeNode<N> {
        &self.search_tree[node_index]
    }

    /// Runs the search until it reaches a goal.
    pub fn run(&mut self) -> Result<SearchTreeIndex, SearchError> {
        self.run_with(NoopObserver)
    }

    /// Runs the search until it reaches a goal, reporting to `observer`.
    ///
    /// Returns the index of the goal node. Calling it again resumes the
    /// search and yields the next goal, if any.
    pub fn run_with<O>(&mut self, mut observer: O) -> Result<SearchTreeIndex, SearchError>
    where
        O: SearchObserver<N>,
    {
        loop {
            if self.open.is_empty() && self.found.is_none() {
                let e = SearchError::Exhausted {
                    expanded: self.expanded,
                };
                log::debug!("A* gave up: {e}");
                observer.on_exhausted(&e);
                return Err(e);
            }
            match self.max_steps {
                Some(max_steps) if self.expanded >= max_steps => {
                    let e = SearchError::BudgetExhausted {
                        max_steps,
                        expanded: self.expanded,
                        open: self.open.len(),
                    };
                    log::debug!("A* gave up: {e}");
                    observer.on_exhausted(&e);
                    return Err(e);
                }
                _ => {}
            }

            // A goal that was handed out already still needs expanding.
            if let Some(node_index) = self.found.take() {
                self.expand(node_index, &mut observer);
                continue;
            }

            let node_index = match self.open.pop(&mut self.search_tree) {
                Some(heap_node) => heap_node.node_index,
                None => unreachable!("The open set was checked for emptiness"),
            };
            debug_assert!(!self.is_closed(self.search_tree[node_index].state()));

            observer.on_pop(
                &self.search_tree[node_index],
                &Frontier {
                    tree: &self.search_tree,
                    open: &self.open,
                    node_map: &self.node_map,
                    closed: self.expanded,
                },
            );

            if self.goal.is_goal(self.search_tree[node_index].state()) {
                let node = &self.search_tree[node_index];
                log::debug!(
                    "A* found {:?} (g={}) after {} expansions",
                    node.state(),
                    node.g(),
                    self.expanded
                );
                observer.on_found(node);
                self.found = Some(node_index);
                return Ok(node_index);
            }

            self.expand(node_index, &mut observer);
        }
    }

    /// Finds the path to the next goal, if any is reachable within budget.
    #[must_use]
    pub fn find_next_goal(&mut self) -> Option<Path<N>> {
        self.run().ok().map(|i| self.search_tree.path(i))
    }

    /// The nodes on the path to `terminal`, start first.
    #[must_use]
    pub fn reconstruct_path(&self, terminal: SearchTreeIndex) -> Vec<&SearchTreeNode<N>> {
        self.search_tree.reconstruct_path(terminal)
    }

    #[must_use]
    pub fn path(&self, terminal: SearchTreeIndex) -> Path<N> {
        self.search_tree.path(terminal)
    }

    /// Wraps up a finished search, keeping only its tree.
    #[must_use]
    pub fn into_solution(self, terminal: SearchTreeIndex) -> Solution<N> {
        Solution {
            tree: self.search_tree,
            terminal,
            expanded: self.expanded,
        }
    }

    /// Closes a node and opens (or improves) its successors.
    fn expand<O>(&mut self, node_index: SearchTreeIndex, observer: &mut O)
    where
        O: SearchObserver<N>,
    {
        self.mark_closed(node_index);

        let g = self.search_tree[node_index].g;
        let successors = self.search_tree[node_index].state.successors();

        for s in successors {
            let c = self.search_tree[node_index].state.cost(&s);
            let new_g = g.saturating_add(&c);

            // Have we seen this State?
            match self.node_map.get(&s) {
                Some(&neigh_index) => {
                    if neigh_index.is_closed() {
                        // Yes, and we expanded the State already.
                        continue;
                    }

                    // Yes, but it's still unexplored. Update the existing
                    // Node if this path is better.
                    let old_g = self.search_tree[neigh_index].g;
                    if new_g >= old_g {
                        continue;
                    }
                    self.search_tree[neigh_index].reach(node_index, new_g);
                    let heap_index = self.search_tree[neigh_index].heap_index;
                    let seq = self.next_seq();
                    self.open.improve(heap_index, &mut self.search_tree, |hn| {
                        hn.rank.improve_g(new_g, seq)
                    });
                    observer.on_relax(&s, Some(old_g), new_g);
                }
                None => {
                    observer.on_relax(&s, None, new_g);
                    self.push_new(s, Some(node_index), new_g);
                }
            }
        }

        self.expanded += 1;
    }

    #[inline(always)]
    fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    #[inline(always)]
    #[must_use]
    pub(crate) fn is_closed(&self, s: &N) -> bool {
        match self.node_map.get(s) {
            Some(node_index) => node_index.is_closed(),
            None => false,
        }
    }

    #[inline(always)]
    fn mark_closed(&mut self, node_index: SearchTreeIndex) {
        match self.node_map.get_mut(&self.search_tree[node_index].state) {
            Some(i) => {
                if !i.is_closed() {
                    i.set_closed();
                }
            }
            None => {
                unreachable!("Tried closing a state without a node");
            }
        }
    }

    fn push_new(&mut self, s: N, parent: Option<SearchTreeIndex>, g: N::Cost) {
        debug_assert!(!self.node_map.contains_key(&s));

        let h = s.h();
        let seq = self.next_seq();

        // 1. Add SearchTreeNode to search_tree
        let node_index = self
            .search_tree
            .push(SearchTreeNode::new(s.clone(), parent, g));

        // 2. Add entry to node_map
        self.node_map.insert(s, node_index);

        // 3. Add AStarHeapNode to open using its SearchTreeIndex
        self.open.push(
            AStarHeapNode {
                rank: AStarRank::new(g, h, seq),
                node_index,
            },
            &mut self.search_tree,
        );
    }

    pub fn write_memory_stats<W: std::io::Write>(&self, mut out: W) -> std::io::Result<()> {
        use size::Size;
        use std::mem::size_of;
        use thousands::Separable;

        writeln!(out, "AStarSearch Stats:")?;
        let s = size_of::<SearchTreeNode<N>>();
        let l = self.search_tree.len();
        writeln!(
            out,
            "  - |Nodes|:  {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;

        let s = size_of::<AStarHeapNode<N::Cost>>();
        let l = self.open.len();
        let c = self.open.capacity();
        writeln!(
            out,
            "  - |Open|:   {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;
        writeln!(
            out,
            "  - |Open|*:  {} ({})",
            c.separate_with_commas(),
            Size::from_bytes(c * s)
        )?;

        let s = size_of::<(N, SearchTreeIndex)>();
        let l = self.node_map.len();
        let c = self.node_map.capacity();
        writeln!(
            out,
            "  - |Index|:  {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;
        writeln!(
            out,
            "  - |Index|*: {} ({})",
            c.separate_with_commas(),
            Size::from_bytes(c * s)
        )?;

        writeln!(
            out,
            "  - Expanded nodes: {}",
            self.expanded.separate_with_commas()
        )?;

        Ok(())
    }
}

impl<N, G> Debug for AStarSearch<N, G>
where
    N: SearchNode,
    G: Goal<N>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("AStarSearch")
            .field("search_tree", &self.search_tree)
            .field("open", &self.open.len())
            .field("expanded", &self.expanded)
            .field("max_steps", &self.max_steps)
            .finish()
    }
}

/// Iterates over the paths to every reachable goal, cheapest first.
impl<N, G> Iterator for AStarSearch<N, G>
where
    N: SearchNode,
    G: Goal<N>,
{
    type Item = Path<N>;
    fn next(&mut self) -> Option<Self::Item> {
        self.find_next_goal()
    }
}

/// A finished search: the search tree and the goal node it reached.
#[derive(Debug, Clone)]
pub struct Solution<N>
where
    N: SearchNode,
{
    tree: SearchTree<N>,
    terminal: SearchTreeIndex,
    expanded: usize,
}

impl<N> Solution<N>
where
    N: SearchNode,
{
    /// The goal node.
    pub fn terminal(&self) -> &SearchTreeNode<N> {
        &self.tree[self.terminal]
    }
    pub fn terminal_index(&self) -> SearchTreeIndex {
        self.terminal
    }
    pub fn cost(&self) -> N::Cost {
        self.terminal().g()
    }
    pub fn expanded(&self) -> usize {
        self.expanded
    }
    pub fn tree(&self) -> &SearchTree<N> {
        &self.tree
    }

    /// The nodes from the start to the goal node, both included.
    pub fn reconstruct_path(&self) -> Vec<&SearchTreeNode<N>> {
        self.tree.reconstruct_path(self.terminal)
    }
    pub fn path(&self) -> Path<N> {
        self.tree.path(self.terminal)
    }
}

/// Searches from `start` until a node satisfies `goal`.
///
/// `max_steps` caps the number of expansions, `None` means unbounded.
pub fn search<N, G>(
    start: N,
    goal: G,
    max_steps: impl Into<Option<usize>>,
) -> Result<Solution<N>, SearchError>
where
    N: SearchNode,
    G: Goal<N>,
{
    let mut search = AStarSearch::new(start, goal).with_max_steps(max_steps);
    let terminal = search.run()?;
    Ok(search.into_solution(terminal))
}

/// Walks the parent links from `terminal` back to the start of the search.
///
/// The result is in start-to-terminal order, both included.
pub fn reconstruct_path<N>(
    tree: &SearchTree<N>,
    terminal: SearchTreeIndex,
) -> Vec<&SearchTreeNode<N>>
where
    N: SearchNode,
{
    tree.reconstruct_path(terminal)
}

/// `search` followed by path reconstruction.
pub fn shortest_path<N, G>(
    start: N,
    goal: G,
    max_steps: impl Into<Option<usize>>,
) -> Result<Path<N>, SearchError>
where
    N: SearchNode,
    G: Goal<N>,
{
    search(start, goal, max_steps).map(|solution| solution.path())
}
