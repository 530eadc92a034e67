use std::{borrow::Borrow, cmp::Ordering, fmt, mem};

/// Owned child pointer
type Link<K, V> = Option<Box<Node<K, V>>>;

/// A node in the search tree
///
/// Each node exclusively owns its two subtrees.
struct Node<K, V> {
    /// Key the node is ordered by
    key: K,
    /// Value stored under `key`
    value: V,
    /// Subtree holding smaller keys
    left: Link<K, V>,
    /// Subtree holding greater keys
    right: Link<K, V>,
}

impl<K, V> Node<K, V> {
    /// Create a leaf node
    const fn leaf(key: K, value: V) -> Self {
        Self { key, value, left: None, right: None }
    }
}

/// An ordered map backed by a plain binary search tree
///
/// There is no rebalancing: the shape of the tree follows insertion order, so
/// inserting already-sorted keys produces a list-shaped tree with linear
/// lookups. For catalog-sized data this is acceptable; [`OrderedMap::depth`]
/// reports how far the tree has degenerated.
///
/// # Type Parameters
/// * `K`: key type, totally ordered
/// * `V`: value type
///
/// # Examples
/// ```
/// use library_catalog::OrderedMap;
///
/// let mut map = OrderedMap::new();
/// map.insert(2, "two");
/// map.insert(1, "one");
/// assert_eq!(map.get(&1), Some(&"one"));
/// assert_eq!(map.values().copied().collect::<Vec<_>>(), vec!["one", "two"]);
/// ```
pub struct OrderedMap<K, V> {
    /// Root of the tree
    root: Link<K, V>,
    /// Number of stored entries
    len: usize,
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> OrderedMap<K, V> {
    /// Creates an empty map
    #[must_use]
    pub const fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// Number of entries
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the map holds no entries
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the tree; zero when empty
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending: Vec<(&Node<K, V>, usize)> =
            self.root.as_deref().map(|root| (root, 1)).into_iter().collect();
        while let Some((node, level)) = pending.pop() {
            deepest = deepest.max(level);
            for child in [node.left.as_deref(), node.right.as_deref()].into_iter().flatten() {
                pending.push((child, level.saturating_add(1)));
            }
        }
        deepest
    }

    /// In-order traversal yielding entries by ascending key
    ///
    /// Every call starts a fresh traversal.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.root.as_deref(), self.len)
    }

    /// Keys in ascending order
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Values in ascending key order
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }
}

impl<K: Ord, V> OrderedMap<K, V> {
    /// Inserts a value, replacing any value already stored under `key`
    ///
    /// # Returns
    /// * `Some(old)` if the key was present
    /// * `None` if a new leaf was added
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut slot = &mut self.root;
        while let Some(node) = slot {
            slot = match key.cmp(&node.key) {
                Ordering::Less => &mut node.left,
                Ordering::Greater => &mut node.right,
                Ordering::Equal => return Some(mem::replace(&mut node.value, value)),
            };
        }
        *slot = Some(Box::new(Node::leaf(key, value)));
        self.len = self.len.saturating_add(1);
        None
    }

    /// Inserts a list-like value, extending the stored list when `key` exists
    ///
    /// A missing key gets `value` as its initial list, so a single element is
    /// passed as a one-element collection.
    pub fn insert_or_append<T>(&mut self, key: K, value: V)
    where
        V: Extend<T> + IntoIterator<Item = T>,
    {
        let mut slot = &mut self.root;
        while let Some(node) = slot {
            slot = match key.cmp(&node.key) {
                Ordering::Less => &mut node.left,
                Ordering::Greater => &mut node.right,
                Ordering::Equal => {
                    node.value.extend(value);
                    return;
                }
            };
        }
        *slot = Some(Box::new(Node::leaf(key, value)));
        self.len = self.len.saturating_add(1);
    }

    /// Looks up the value stored under `key`
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(&node.value),
            };
        }
        None
    }

    /// Mutable lookup
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root.as_deref_mut();
        while let Some(node) = current {
            match key.cmp(node.key.borrow()) {
                Ordering::Less => current = node.left.as_deref_mut(),
                Ordering::Greater => current = node.right.as_deref_mut(),
                Ordering::Equal => return Some(&mut node.value),
            }
        }
        None
    }

    /// Returns true if `key` is present
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Removes `key` and returns its value
    ///
    /// A node with two children takes over its in-order successor's entry and
    /// the successor is unlinked from the right subtree.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        // Walk down to the link that owns the matching node
        let mut link = &mut self.root;
        loop {
            let node = link.as_ref()?;
            match key.cmp(node.key.borrow()) {
                Ordering::Less => link = &mut link.as_mut()?.left,
                Ordering::Greater => link = &mut link.as_mut()?.right,
                Ordering::Equal => break,
            }
        }

        let mut node = link.take()?;
        let removed = match (node.left.take(), node.right.take()) {
            (None, None) => node.value,
            (Some(child), None) | (None, Some(child)) => {
                *link = Some(child);
                node.value
            }
            (Some(left), Some(right)) => {
                // The in-order successor's entry takes the removed node's place
                let mut right = Some(right);
                let successor = Self::take_min(&mut right)?;
                let Node { key: next_key, value: next_value, .. } = *successor;
                node.key = next_key;
                let removed = mem::replace(&mut node.value, next_value);
                node.left = Some(left);
                node.right = right;
                *link = Some(node);
                removed
            }
        };
        self.len = self.len.saturating_sub(1);
        Some(removed)
    }

    /// Detaches the leftmost node below `link`, splicing its right child up
    fn take_min(mut link: &mut Link<K, V>) -> Option<Box<Node<K, V>>> {
        while link.as_ref()?.left.is_some() {
            link = &mut link.as_mut()?.left;
        }
        let mut node = link.take()?;
        *link = node.right.take();
        Some(node)
    }
}

impl<K, V> Drop for OrderedMap<K, V> {
    fn drop(&mut self) {
        // Detach children before each node is freed so teardown never recurses
        let mut pending: Vec<Box<Node<K, V>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(node.left.take());
            pending.extend(node.right.take());
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for OrderedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<'a, K, V> IntoIterator for &'a OrderedMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy in-order iterator over an [`OrderedMap`]
pub struct Iter<'a, K, V> {
    /// Nodes whose left subtree has been pushed but which are not yet yielded
    stack: Vec<&'a Node<K, V>>,
    /// Entries not yet yielded
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    /// Start a traversal at `root`
    fn new(root: Option<&'a Node<K, V>>, len: usize) -> Self {
        let mut iter = Self { stack: Vec::new(), remaining: len };
        iter.push_left_spine(root);
        iter
    }

    /// Push `link` and all of its left descendants
    fn push_left_spine(&mut self, mut link: Option<&'a Node<K, V>>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = node.left.as_deref();
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        self.remaining = self.remaining.saturating_sub(1);
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("remaining", &self.remaining).finish_non_exhaustive()
    }
}
