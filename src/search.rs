use crate::data_structures::intrusive_heap::HeapIndexTracker;
use crate::node::SearchNode;
use crate::path::Path;

/// The bit used to track `is_closed: bool` within indices.
///
/// Indices are stored shifted left by one to make room for it, so a
/// `SearchTreeIndex` is as wide as a `usize` and still answers "is this state
/// closed?" without touching the node it points to.
const IS_CLOSED_BIT: usize = 1usize;
const INDEX_SHIFT: u32 = 1u32;

/// A reference to a `SearchTreeNode<N>`.
///
/// It's more like a `(usize, bool)` underneath to help track whether the
/// node is closed. Equality ignores the closed bit.
#[derive(Copy, Clone, Debug)]
pub struct SearchTreeIndex {
    index: usize,
}

impl SearchTreeIndex {
    #[inline(always)]
    fn new(i: usize) -> Self {
        debug_assert!(i <= (usize::MAX >> INDEX_SHIFT), "Search tree is too big");
        Self {
            index: i << INDEX_SHIFT,
        }
    }

    /// Position of the node in the tree's arena.
    #[inline(always)]
    pub fn as_usize(&self) -> usize {
        self.index >> INDEX_SHIFT
    }

    #[inline(always)]
    pub fn is_closed(&self) -> bool {
        self.index & IS_CLOSED_BIT == IS_CLOSED_BIT
    }
    #[inline(always)]
    pub fn set_closed(&mut self) {
        debug_assert!(!self.is_closed());
        self.index |= IS_CLOSED_BIT;
    }
}

impl PartialEq for SearchTreeIndex {
    fn eq(&self, other: &Self) -> bool {
        self.as_usize() == other.as_usize()
    }
}
impl Eq for SearchTreeIndex {}

/// A node of the search tree.
///
/// Wraps a caller-supplied state with the bookkeeping the search owns: the
/// best known cost to reach it and the parent that produced that cost.
#[derive(Debug, Clone)]
pub struct SearchTreeNode<N>
where
    N: SearchNode,
{
    pub(crate) parent: Option<SearchTreeIndex>,
    pub(crate) state: N,
    pub(crate) g: N::Cost,
    pub(crate) heap_index: usize,
}

impl<N> SearchTreeNode<N>
where
    N: SearchNode,
{
    pub(crate) fn new(s: N, parent: Option<SearchTreeIndex>, g: N::Cost) -> Self {
        Self {
            parent,
            state: s,
            g,
            heap_index: usize::MAX,
        }
    }

    /// Gives this Node a better path through a new parent.
    pub(crate) fn reach(&mut self, new_parent: SearchTreeIndex, g: N::Cost) {
        debug_assert!(g < self.g, "Relaxing must improve g");
        self.parent = Some(new_parent);
        self.g = g;
    }

    #[inline(always)]
    pub fn state(&self) -> &N {
        &self.state
    }
    /// The accumulated cost of the best path found so far.
    #[inline(always)]
    pub fn g(&self) -> N::Cost {
        self.g
    }
    #[inline(always)]
    pub fn parent(&self) -> Option<SearchTreeIndex> {
        self.parent
    }
}

/// All the nodes discovered by a search.
///
/// Each node may have a parent, so this naturally forms a Search Forest. The
/// arena only grows, indices stay valid for its whole life.
#[derive(Clone)]
pub struct SearchTree<N>
where
    N: SearchNode,
{
    nodes: Vec<SearchTreeNode<N>>,
}

impl<N> SearchTree<N>
where
    N: SearchNode,
{
    #[inline(always)]
    #[must_use]
    pub(crate) fn new() -> Self {
        Self { nodes: vec![] }
    }

    #[inline(always)]
    pub(crate) fn push(&mut self, node: SearchTreeNode<N>) -> SearchTreeIndex {
        let index = SearchTreeIndex::new(self.nodes.len());
        self.nodes.push(node);
        index
    }

    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// The nodes on the best known path to `node_index`, start first.
    ///
    /// Walks the parent links, so the result has a single node when
    /// `node_index` has no parent.
    #[must_use]
    pub fn reconstruct_path(&self, mut node_index: SearchTreeIndex) -> Vec<&SearchTreeNode<N>> {
        let mut nodes = vec![&self[node_index]];
        while let Some(parent_index) = self[node_index].parent {
            debug_assert!(node_index != parent_index);
            nodes.push(&self[parent_index]);
            node_index = parent_index;
        }
        nodes.reverse();
        nodes
    }

    /// Owned version of `reconstruct_path`.
    #[must_use]
    pub fn path(&self, node_index: SearchTreeIndex) -> Path<N> {
        let steps = self
            .reconstruct_path(node_index)
            .into_iter()
            .map(|n| (n.state.clone(), n.g))
            .collect();
        Path::from_steps(steps)
    }
}

impl<N> Default for SearchTree<N>
where
    N: SearchNode,
{
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl<N> std::ops::Index<SearchTreeIndex> for SearchTree<N>
where
    N: SearchNode,
{
    type Output = SearchTreeNode<N>;

    #[inline(always)]
    fn index(&self, index: SearchTreeIndex) -> &Self::Output {
        &self.nodes[index.as_usize()]
    }
}

impl<N> std::ops::IndexMut<SearchTreeIndex> for SearchTree<N>
where
    N: SearchNode,
{
    #[inline(always)]
    fn index_mut(&mut self, index: SearchTreeIndex) -> &mut SearchTreeNode<N> {
        &mut self.nodes[index.as_usize()]
    }
}

impl<N> HeapIndexTracker<SearchTreeIndex> for SearchTree<N>
where
    N: SearchNode,
{
    #[inline(always)]
    fn set_heap_index(&mut self, key: SearchTreeIndex, heap_index: usize) {
        self[key].heap_index = heap_index;
    }
    #[inline(always)]
    fn heap_index(&self, key: SearchTreeIndex) -> usize {
        self[key].heap_index
    }
}

impl<N> std::fmt::Debug for SearchTree<N>
where
    N: SearchNode,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "SearchTree{{({} nodes)}}", self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    struct Letter(char);

    impl SearchNode for Letter {
        type Cost = u32;
        fn successors(&self) -> Vec<Self> {
            vec![]
        }
        fn cost(&self, _to: &Self) -> u32 {
            1
        }
    }

    #[test]
    fn closed_bit_is_separate_from_the_index() {
        let mut i = SearchTreeIndex::new(41);
        assert!(!i.is_closed());
        let open = i;
        i.set_closed();
        assert!(i.is_closed());
        assert_eq!(i.as_usize(), 41);
        assert_eq!(i, open);
    }

    #[test]
    fn parentless_node_is_its_own_path() {
        let mut tree = SearchTree::<Letter>::new();
        let a = tree.push(SearchTreeNode::new(Letter('a'), None, 0));

        let path = tree.reconstruct_path(a);
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].state(), &Letter('a'));
        assert_eq!(tree.path(a).len(), 1);
    }

    #[test]
    fn paths_follow_the_latest_parent() {
        let mut tree = SearchTree::<Letter>::new();
        let a = tree.push(SearchTreeNode::new(Letter('a'), None, 0));
        let b = tree.push(SearchTreeNode::new(Letter('b'), Some(a), 5));
        let c = tree.push(SearchTreeNode::new(Letter('c'), Some(a), 1));
        let d = tree.push(SearchTreeNode::new(Letter('d'), Some(b), 6));

        tree[b].reach(c, 2);
        tree[d].g = 3;

        let path = tree.path(d);
        let states: Vec<char> = path.states().map(|l| l.0).collect();
        assert_eq!(states, vec!['a', 'c', 'b', 'd']);
        assert_eq!(path.cost(), 3);
        assert_eq!(tree[b].parent(), Some(c));
    }
}
