//! Hooks for watching a search run.
//!
//! Observers get read-only views of the search, they can't change what it
//! does. The default hooks do nothing, so a search without an observer
//! compiles down to the bare loop.

use derive_more::Display;
use rustc_hash::FxHashMap;

use crate::algorithms::astar::AStarHeapNode;
use crate::algorithms::astar::SearchError;
use crate::data_structures::intrusive_heap::IntrusiveHeap;
use crate::data_structures::intrusive_heap::IntrusiveHeapNode;
use crate::node::SearchNode;
use crate::search::SearchTree;
use crate::search::SearchTreeIndex;
use crate::search::SearchTreeNode;

/// A read-only view of the open and closed sets.
pub struct Frontier<'a, N>
where
    N: SearchNode,
{
    pub(crate) tree: &'a SearchTree<N>,
    pub(crate) open: &'a IntrusiveHeap<AStarHeapNode<N::Cost>>,
    pub(crate) node_map: &'a FxHashMap<N, SearchTreeIndex>,
    pub(crate) closed: usize,
}

impl<'a, N> Frontier<'a, N>
where
    N: SearchNode,
{
    pub fn open_len(&self) -> usize {
        self.open.len()
    }
    pub fn closed_len(&self) -> usize {
        self.closed
    }

    /// Open nodes in heap order (the first one is the next to be popped).
    pub fn open(&self) -> impl Iterator<Item = &'a SearchTreeNode<N>> + use<'a, N> {
        let tree = self.tree;
        let open = self.open;
        open.iter().map(move |hn| &tree[hn.key()])
    }

    /// Closed states, in no particular order.
    pub fn closed(&self) -> impl Iterator<Item = &'a N> + use<'a, N> {
        let node_map = self.node_map;
        node_map
            .iter()
            .filter(|(_s, i)| i.is_closed())
            .map(|(s, _i)| s)
    }
}

pub trait SearchObserver<N>
where
    N: SearchNode,
{
    /// A node was taken out of the open set, before its goal check.
    fn on_pop(&mut self, _node: &SearchTreeNode<N>, _frontier: &Frontier<'_, N>) {}

    /// A state got a new best cost.
    ///
    /// `old_g` is `None` when the state was just discovered.
    fn on_relax(&mut self, _state: &N, _old_g: Option<N::Cost>, _new_g: N::Cost) {}

    fn on_found(&mut self, _node: &SearchTreeNode<N>) {}

    fn on_exhausted(&mut self, _error: &SearchError) {}
}

impl<N, O> SearchObserver<N> for &mut O
where
    N: SearchNode,
    O: SearchObserver<N>,
{
    fn on_pop(&mut self, node: &SearchTreeNode<N>, frontier: &Frontier<'_, N>) {
        (**self).on_pop(node, frontier)
    }
    fn on_relax(&mut self, state: &N, old_g: Option<N::Cost>, new_g: N::Cost) {
        (**self).on_relax(state, old_g, new_g)
    }
    fn on_found(&mut self, node: &SearchTreeNode<N>) {
        (**self).on_found(node)
    }
    fn on_exhausted(&mut self, error: &SearchError) {
        (**self).on_exhausted(error)
    }
}

/// Watches nothing.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopObserver;

impl<N: SearchNode> SearchObserver<N> for NoopObserver {}

/// How much a `LogObserver` reports.
#[derive(Copy, Clone, Debug, Default, Display, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
pub enum Verbosity {
    /// Only the outcome.
    #[default]
    #[display("quiet")]
    Quiet,
    /// Every node taken out of the open set.
    #[display("current")]
    Current,
    /// Every node taken out of the open set, and dumps of the open and closed
    /// sets.
    #[display("full")]
    Full,
}

/// Reports the search through the `log` facade.
///
/// Popped nodes go to `debug`, set dumps to `trace`.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogObserver {
    verbosity: Verbosity,
    pops: usize,
}

impl LogObserver {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity, pops: 0 }
    }
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }
}

impl<N> SearchObserver<N> for LogObserver
where
    N: SearchNode,
{
    fn on_pop(&mut self, node: &SearchTreeNode<N>, frontier: &Frontier<'_, N>) {
        self.pops += 1;
        if self.verbosity >= Verbosity::Full && log::log_enabled!(log::Level::Trace) {
            let open: Vec<String> = frontier
                .open()
                .map(|n| format!("{:?}@{}", n.state(), n.g()))
                .collect();
            log::trace!("Open set ({}): [{}]", frontier.open_len(), open.join(", "));
        }
        if self.verbosity >= Verbosity::Current {
            log::debug!(
                "Current node #{}: {:?} (g={})",
                self.pops,
                node.state(),
                node.g()
            );
        }
        if self.verbosity >= Verbosity::Full && log::log_enabled!(log::Level::Trace) {
            let closed: Vec<String> = frontier.closed().map(|s| format!("{s:?}")).collect();
            log::trace!(
                "Closed set ({}): [{}]",
                frontier.closed_len(),
                closed.join(", ")
            );
        }
    }

    fn on_found(&mut self, node: &SearchTreeNode<N>) {
        log::info!(
            "Found {:?} with cost {} after {} pops",
            node.state(),
            node.g(),
            self.pops
        );
    }

    fn on_exhausted(&mut self, error: &SearchError) {
        log::info!("{error} after {} pops", self.pops);
    }
}
