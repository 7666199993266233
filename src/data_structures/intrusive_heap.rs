use std::cmp::min;
use std::fmt::Debug;

use crate::derank::derank;

type HeapIndex = usize;

/// Intrusive Heap Node
///
/// A light heap entry that ranks some "remote" element and knows its key.
pub trait IntrusiveHeapNode: Debug + Ord {
    type Key: Copy + Debug;

    fn key(&self) -> Self::Key;
}

/// Keeps the heap position of "remote" elements.
///
/// Heap entries only carry a rank and a key, the element they stand for lives
/// elsewhere (an arena, a `Vec`, ...). Whatever holds them implements this so
/// the heap can tell every element where it went after each swap, which makes
/// re-ranking an element a matter of looking up its index.
pub trait HeapIndexTracker<K> {
    fn set_heap_index(&mut self, key: K, heap_index: HeapIndex);
    fn heap_index(&self, key: K) -> HeapIndex;
}

const HEAP_ARITY: usize = 8usize;
#[inline(always)]
#[must_use]
fn up(i: usize) -> usize {
    crate::heap_primitives::index_parent::<HEAP_ARITY>(i)
}
#[inline(always)]
#[must_use]
fn down_left(i: usize) -> usize {
    crate::heap_primitives::index_first_children::<HEAP_ARITY>(i)
}
#[inline(always)]
#[must_use]
fn down_right(i: usize) -> usize {
    crate::heap_primitives::index_last_children::<HEAP_ARITY>(i)
}

/// "Intrusive" Heap
///
/// An 8-ary min-heap whose elements' positions are mirrored into a
/// `HeapIndexTracker` on every move.
///
/// ```pseudocode
/// for (i, n) in heap.enumerate():
///   assert_eq(tracker.heap_index(n.key()), i)
/// ```
///
/// Positions of elements that left the heap are stale and must not be used.
#[derive(Debug)]
pub struct IntrusiveHeap<N>
where
    N: IntrusiveHeapNode,
{
    heap: Vec<N>,
}

impl<N> IntrusiveHeap<N>
where
    N: IntrusiveHeapNode,
{
    pub fn new() -> Self {
        Self { heap: vec![] }
    }
    pub fn with_capacity(s: usize) -> Self {
        Self {
            heap: Vec::with_capacity(s),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
    pub fn len(&self) -> usize {
        self.heap.len()
    }
    pub fn capacity(&self) -> usize {
        self.heap.capacity()
    }
    /// The best element, if any.
    pub fn peek(&self) -> Option<&N> {
        self.heap.first()
    }
    /// Iterates in heap (array) order, not in rank order.
    pub fn iter(&self) -> std::slice::Iter<'_, N> {
        self.heap.iter()
    }

    /// Adds an element and returns its final position.
    pub fn push<T>(&mut self, n: N, tracker: &mut T) -> HeapIndex
    where
        T: HeapIndexTracker<N::Key>,
    {
        self.verify_heap(tracker);
        let heap_index = self.heap.len(); // Future heap_index

        tracker.set_heap_index(n.key(), heap_index);
        self.heap.push(n);
        let heap_index = self.sift_up(heap_index, tracker);

        self.verify_heap(tracker);
        heap_index
    }

    pub fn pop<T>(&mut self, tracker: &mut T) -> Option<N>
    where
        T: HeapIndexTracker<N::Key>,
    {
        self.verify_heap(tracker);

        if self.heap.len() <= 1 {
            return self.heap.pop();
        }

        let top = self.pop_non_trivial_heap(tracker);
        self.verify_heap(tracker);
        Some(top)
    }

    /// Makes the element at `index` better and restores the heap order.
    ///
    /// Returns the new position of the element.
    pub fn improve<T, F>(&mut self, index: HeapIndex, tracker: &mut T, f: F) -> HeapIndex
    where
        T: HeapIndexTracker<N::Key>,
        F: FnOnce(&mut N),
    {
        debug_assert!(
            index < self.heap.len(),
            "Improving index {index} out of bounds ({})",
            self.heap.len()
        );
        f(&mut self.heap[index]);
        let new_index = self.sift_up(index, tracker);
        self.verify_heap(tracker);
        new_index
    }

    #[inline(always)]
    #[cfg(not(feature = "verify"))]
    pub(crate) fn verify_heap<T>(&self, _tracker: &T)
    where
        T: HeapIndexTracker<N::Key>,
    {
        // All good... (hopefully)
    }

    #[inline(always)]
    #[cfg(feature = "verify")]
    pub(crate) fn verify_heap<T>(&self, tracker: &T)
    where
        T: HeapIndexTracker<N::Key>,
    {
        // Every node,
        for i in 0..self.heap.len() {
            // - Has the right intrusive index set.
            assert_eq!(tracker.heap_index(self.heap[i].key()), i);

            // - Goes after its parent node, if any.
            if i == 0 {
                continue;
            }
            let p = up(i);
            assert!(
                self.heap[p] <= self.heap[i],
                "Node[{p}]={:?} !<= child [{i}]={:?}. Out of heap of len={}",
                self.heap[p],
                self.heap[i],
                self.heap.len(),
            );
        }
    }

    // Implementation details

    /// Pops the top node from a Heap with at least 2 elements.
    ///
    /// Works by unfairly sifting down the top-node to the last level, where it
    /// can be swapped with the very last element of the array and popped.
    /// Temporarily breaks invariants around the node sifting down unfairly.
    fn pop_non_trivial_heap<T>(&mut self, tracker: &mut T) -> N
    where
        T: HeapIndexTracker<N::Key>,
    {
        debug_assert!(
            self.heap.len() >= 2,
            "It doesn't get easier. Why are you calling this?"
        );

        // 1. Pretend there's a hole at the root, and bubble the best child up
        //    until the hole reaches the last level.
        // 2. If the hole is not the last element, swap it for the last one.
        // 3. The last element is now the one that was at the top, pop it.
        let len = self.heap.len();
        let last = len - 1;

        let mut hole = 0;
        loop {
            // Find the best child
            let mut child = down_left(hole);
            debug_assert_eq!(child + HEAP_ARITY, down_right(hole) + 1);
            child += derank(&self.heap[child..min(child + HEAP_ARITY, len)]);

            debug_assert!(self.heap[hole] <= self.heap[child]);
            self.half_swap_down(hole, child, tracker);

            hole = child;
            if down_left(hole) >= len {
                break;
            }
        }
        // The hole made it to the last level, but it may not be at the end of
        // the array.
        debug_assert!(hole <= last, "The hole={hole} is past last={last}");
        if hole != last {
            self.half_swap_down(hole, last, tracker);
            self.sift_up(hole, tracker);
        }

        match self.heap.pop() {
            Some(top) => top,
            None => unreachable!("The heap had at least 2 elements"),
        }
    }

    /// Raises a node.
    /// Returns its new index.
    #[inline(always)]
    fn sift_up<T>(&mut self, index: HeapIndex, tracker: &mut T) -> HeapIndex
    where
        T: HeapIndexTracker<N::Key>,
    {
        debug_assert!(
            index < self.heap.len(),
            "Node is way out of sync. Index out of bounds..."
        );
        debug_assert_eq!(
            tracker.heap_index(self.heap[index].key()),
            index,
            "Node is out of sync."
        );

        let mut pos = index;
        while pos != 0 {
            let parent = up(pos);
            if self.heap[parent] <= self.heap[pos] {
                break;
            }
            self.swap(parent, pos, tracker);
            pos = parent;
        }
        pos
    }

    // Swapping primitives
    /// Swaps two elements in the heap, keeping both intrusive indices in sync.
    ///
    /// For consistency in calling code `l < r` is checked.
    #[inline(always)]
    fn swap<T>(&mut self, l: HeapIndex, r: HeapIndex, tracker: &mut T)
    where
        T: HeapIndexTracker<N::Key>,
    {
        debug_assert!(l < r, "Swap({l}, {r}) uses wrong argument order");

        self.heap.swap(l, r);
        tracker.set_heap_index(self.heap[l].key(), l);
        tracker.set_heap_index(self.heap[r].key(), r);
        debug_assert!(
            self.heap[l] <= self.heap[r],
            "Swaps must locally restore the heap invariant."
        );
    }
    /// Swaps two elements in the heap.
    ///
    /// Only keeps the index of the element going up in sync as the element
    /// going down is about to be popped.
    #[inline(always)]
    fn half_swap_down<T>(&mut self, l: HeapIndex, r: HeapIndex, tracker: &mut T)
    where
        T: HeapIndexTracker<N::Key>,
    {
        debug_assert!(l < r, "HalfSwapDown({l}, {r}) is wrong");

        self.heap.swap(l, r);
        tracker.set_heap_index(self.heap[l].key(), l);
        debug_assert!(
            self.heap[l] >= self.heap[r],
            "Half swap down must be unfairly pushing a node down."
        );
    }
}

impl<N> Default for IntrusiveHeap<N>
where
    N: IntrusiveHeapNode,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N> std::ops::Index<HeapIndex> for IntrusiveHeap<N>
where
    N: IntrusiveHeapNode,
{
    type Output = N;

    fn index(&self, index: HeapIndex) -> &Self::Output {
        &self.heap[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::Rng;
    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;

    #[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
    struct TestNode {
        rank: u32,
        id: usize,
    }

    impl IntrusiveHeapNode for TestNode {
        type Key = usize;
        fn key(&self) -> usize {
            self.id
        }
    }

    /// Positions by id.
    #[derive(Debug, Default)]
    struct Positions(Vec<usize>);

    impl HeapIndexTracker<usize> for Positions {
        fn set_heap_index(&mut self, key: usize, heap_index: usize) {
            if self.0.len() <= key {
                self.0.resize(key + 1, usize::MAX);
            }
            self.0[key] = heap_index;
        }
        fn heap_index(&self, key: usize) -> usize {
            self.0[key]
        }
    }

    fn assert_tracked(heap: &IntrusiveHeap<TestNode>, positions: &Positions) {
        for (i, n) in heap.iter().enumerate() {
            assert_eq!(positions.heap_index(n.id), i, "{n:?} is out of sync");
        }
    }

    #[test]
    fn heap_works() {
        let mut positions = Positions::default();
        let mut heap = IntrusiveHeap::<TestNode>::new();

        let n = TestNode { rank: 3, id: 0 };
        assert_eq!(heap.push(n.clone(), &mut positions), 0usize);
        assert_eq!(heap.peek(), Some(&n));
        assert_eq!(heap.pop(&mut positions), Some(n));
        assert_eq!(heap.pop(&mut positions), None);
        assert!(heap.is_empty());
    }

    #[test]
    fn heap_sorts() {
        let mut positions = Positions::default();
        let mut heap = IntrusiveHeap::<TestNode>::new();

        for (id, rank) in [5u32, 3, 9, 1, 7, 2, 8, 6, 4, 0, 11, 10].into_iter().enumerate() {
            heap.push(TestNode { rank, id }, &mut positions);
            assert_tracked(&heap, &positions);
        }

        let mut ranks = vec![];
        while let Some(n) = heap.pop(&mut positions) {
            assert_tracked(&heap, &positions);
            ranks.push(n.rank);
        }
        assert_eq!(ranks, (0u32..12).collect::<Vec<_>>());
    }

    #[test]
    fn improve_moves_nodes_up() {
        let mut positions = Positions::default();
        let mut heap = IntrusiveHeap::<TestNode>::new();
        for id in 0..20usize {
            heap.push(
                TestNode {
                    rank: 100 + id as u32,
                    id,
                },
                &mut positions,
            );
        }

        let i = positions.heap_index(17);
        let new_i = heap.improve(i, &mut positions, |n| n.rank = 1);
        assert_eq!(new_i, 0);
        assert_tracked(&heap, &positions);

        assert_eq!(heap.pop(&mut positions).map(|n| n.id), Some(17));
        assert_eq!(heap.pop(&mut positions).map(|n| n.id), Some(0));
    }

    #[test]
    fn random_operations_stay_sorted() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut positions = Positions::default();
        let mut heap = IntrusiveHeap::<TestNode>::new();
        let mut live: Vec<usize> = vec![];
        let mut last_popped = 0u32;

        for id in 0..500usize {
            heap.push(
                TestNode {
                    rank: last_popped + rng.random_range(0..1000u32),
                    id,
                },
                &mut positions,
            );
            live.push(id);

            if rng.random_bool(0.3) {
                let victim = live[rng.random_range(0..live.len())];
                let i = positions.heap_index(victim);
                let target = last_popped + rng.random_range(0..10u32);
                heap.improve(i, &mut positions, |n| n.rank = n.rank.min(target));
            }
            if rng.random_bool(0.4) {
                let n = heap.pop(&mut positions).unwrap();
                assert!(n.rank >= last_popped);
                last_popped = n.rank;
                live.retain(|&id| id != n.id);
            }
            assert_tracked(&heap, &positions);
        }
    }
}
