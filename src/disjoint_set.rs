use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashMap;

/// Union-find over arbitrary hashable keys.
///
/// Keys are mapped to dense node indices on insertion; the forest itself is
/// two flat vectors, so there are no links between keys.
#[derive(Clone, Debug)]
pub struct DisjointSet<K> {
    index: HashMap<K, usize>,
    parent: Vec<usize>,
    rank: Vec<u8>,
    sets: usize,
}

impl<K: Copy + Eq + Hash> Default for DisjointSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq + Hash> DisjointSet<K> {
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            parent: Vec::new(),
            rank: Vec::new(),
            sets: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity),
            parent: Vec::with_capacity(capacity),
            rank: Vec::with_capacity(capacity),
            sets: 0,
        }
    }

    /// Adds `key` as a singleton. Re-adding an existing key leaves its set
    /// untouched and returns the existing node index.
    pub fn make_set(&mut self, key: K) -> usize {
        if let Some(&node) = self.index.get(&key) {
            return node;
        }
        let node = self.parent.len();
        self.index.insert(key, node);
        self.parent.push(node);
        self.rank.push(0);
        self.sets += 1;
        node
    }

    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Number of keys tracked.
    #[inline]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Number of disjoint sets.
    #[inline]
    pub fn set_count(&self) -> usize {
        self.sets
    }

    /// Root node index of `key`'s set, compressing the path on the way.
    pub fn find(&mut self, key: &K) -> Option<usize> {
        let node = *self.index.get(key)?;
        Some(self.find_root(node))
    }

    fn find_root(&mut self, node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut current = node;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    /// Merges the sets of `a` and `b` by rank. Returns `false` if they were
    /// already joined or either key is unknown.
    pub fn union(&mut self, a: &K, b: &K) -> bool {
        let (Some(ra), Some(rb)) = (self.find(a), self.find(b)) else {
            return false;
        };
        if ra == rb {
            return false;
        }

        match self.rank[ra].cmp(&self.rank[rb]) {
            core::cmp::Ordering::Greater => self.parent[rb] = ra,
            core::cmp::Ordering::Less => self.parent[ra] = rb,
            core::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] = self.rank[ra].saturating_add(1);
            }
        }
        self.sets -= 1;
        true
    }

    pub fn connected(&mut self, a: &K, b: &K) -> bool {
        match (self.find(a), self.find(b)) {
            (Some(ra), Some(rb)) => ra == rb,
            _ => false,
        }
    }
}
