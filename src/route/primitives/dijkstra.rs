use indexmap::map::Entry;
use indexmap::IndexMap;
use rustc_hash::{FxHashSet, FxHasher};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::hash::{BuildHasherDefault, Hash};

type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

type Cost = f64;

/// Marks the start node, which has no parent.
const NO_PARENT: usize = usize::MAX;

#[derive(Debug)]
struct SmallestHolder {
    cost: Cost,
    sequence: usize,
    index: usize,
}

impl PartialEq for SmallestHolder {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SmallestHolder {}

impl PartialOrd for SmallestHolder {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SmallestHolder {
    /// Reversed, so the max-heap yields the cheapest entry. Equal costs
    /// are yielded in the order they were pushed.
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Struct returned by [`Dijkstra::reach`].
pub struct DijkstraReachable<N, FN> {
    to_see: BinaryHeap<SmallestHolder>,
    seen: FxHashSet<usize>,
    parents: FxIndexMap<N, (usize, Cost)>,
    successors: FN,
    pushed: usize,
}

/// Information about a node settled by [`Dijkstra::reach`].
#[derive(Debug, PartialEq, Clone)]
pub struct DijkstraReachableItem<N> {
    /// The node that was settled.
    pub node: N,
    /// The previous node that the current node came from.
    /// If the node is the first node, there will be no parent.
    pub parent: Option<N>,
    /// The total cost from the starting node.
    pub total_cost: Cost,
}

impl<N, FN> DijkstraReachable<N, FN>
where
    N: Eq + Hash + Clone,
{
    /// Walks the predecessor chain backward from `node`, returning the
    /// nodes in travel order. Returns `None` if `node` was never reached.
    ///
    /// Only meaningful once `node` has been settled, as its parent may
    /// still change before then.
    pub fn path_to(&self, node: &N) -> Option<Vec<N>> {
        let mut index = self.parents.get_index_of(node)?;
        let mut path = Vec::new();

        while index != NO_PARENT {
            // A chain longer than the number of discovered nodes is cyclic.
            if path.len() > self.parents.len() {
                return None;
            }

            let (node, (parent, _)) = self.parents.get_index(index)?;
            path.push(node.clone());
            index = *parent;
        }

        path.reverse();
        Some(path)
    }

    fn push(&mut self, cost: Cost, index: usize) {
        self.to_see.push(SmallestHolder {
            cost,
            sequence: self.pushed,
            index,
        });
        self.pushed += 1;
    }
}

impl<N, FN, IN> Iterator for DijkstraReachable<N, FN>
where
    N: Eq + Hash + Clone,
    FN: FnMut(&N) -> IN,
    IN: IntoIterator<Item = (N, Cost)>,
{
    type Item = DijkstraReachableItem<N>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(SmallestHolder { cost, index, .. }) = self.to_see.pop() {
            if !self.seen.insert(index) {
                continue;
            }

            let (item, successors) = {
                let Some((node, (parent_index, _))) = self.parents.get_index(index) else {
                    continue;
                };

                let item = DijkstraReachableItem {
                    node: node.clone(),
                    parent: self.parents.get_index(*parent_index).map(|x| x.0.clone()),
                    total_cost: cost,
                };

                (item, (self.successors)(node))
            };

            for (successor, move_cost) in successors {
                let new_cost = cost + move_cost;

                let index = match self.parents.entry(successor) {
                    Entry::Vacant(e) => {
                        let n = e.index();
                        e.insert((index, new_cost));
                        n
                    }
                    Entry::Occupied(mut e) => {
                        // Settled nodes keep their parent, so the
                        // predecessor chain always remains a tree.
                        if self.seen.contains(&e.index()) || e.get().1 <= new_cost {
                            continue;
                        }

                        e.insert((index, new_cost));
                        e.index()
                    }
                };

                self.push(new_cost, index);
            }

            return Some(item);
        }

        None
    }
}

pub struct Dijkstra;

impl Dijkstra {
    /// Visit all nodes that are reachable from a start node. The node
    /// will be visited in order of cost, with the closest nodes first.
    ///
    /// The `successors` function receives the current node, and returns
    /// an iterator of successors associated with their move cost.
    pub fn reach<N, FN, IN>(&self, start: &N, successors: FN) -> DijkstraReachable<N, FN>
    where
        N: Eq + Hash + Clone,
        FN: FnMut(&N) -> IN,
        IN: IntoIterator<Item = (N, Cost)>,
    {
        let mut parents: FxIndexMap<N, (usize, Cost)> =
            FxIndexMap::with_capacity_and_hasher(64, BuildHasherDefault::<FxHasher>::default());
        parents.insert(start.clone(), (NO_PARENT, 0.0));

        let mut reachable = DijkstraReachable {
            to_see: BinaryHeap::with_capacity(256),
            seen: FxHashSet::default(),
            parents,
            successors,
            pushed: 0,
        };

        reachable.push(0.0, 0);
        reachable
    }
}
