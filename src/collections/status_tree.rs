//! AVL tree whose ordering is supplied per call.
//!
//! The sweep's status line is ordered by distance along a ray that rotates
//! between angular buckets, so the tree cannot own a fixed comparator. Every
//! mutating call receives the ordering that is valid *now*; the tree itself
//! stores no context.

use std::cmp::Ordering;

use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Arena key of a tree node.
    struct NodeId;
}

#[derive(Debug, Clone)]
struct Node<T> {
    value: T,
    left: Option<NodeId>,
    right: Option<NodeId>,
    height: u32,
    size: usize,
}

/// Balanced binary tree with subtree sizes, so `len` is O(1).
///
/// Values comparing `Equal` are kept (inserted to the right), so removal
/// identifies the target by `PartialEq` and only uses the ordering to steer.
#[derive(Debug, Clone)]
pub struct StatusTree<T> {
    nodes: SlotMap<NodeId, Node<T>>,
    root: Option<NodeId>,
}

impl<T> Default for StatusTree<T> {
    fn default() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root: None,
        }
    }
}

impl<T: PartialEq> StatusTree<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.size(self.root)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Inserts `value`; `cmp(a, b)` must order the current contents.
    pub fn insert<F>(&mut self, value: T, mut cmp: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let id = self.nodes.insert(Node {
            value,
            left: None,
            right: None,
            height: 1,
            size: 1,
        });
        let root = self.root;
        self.root = Some(self.insert_at(root, id, &mut cmp));
    }

    /// Removes the node holding `value`. Returns false if it is not present.
    pub fn remove<F>(&mut self, value: &T, mut cmp: F) -> bool
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let mut removed = None;
        let root = self.root;
        self.root = self.remove_at(root, value, &mut cmp, &mut removed);
        match removed {
            Some(id) => {
                self.nodes.remove(id);
                true
            }
            None => false,
        }
    }

    /// Smallest element under the ordering used so far.
    #[must_use]
    pub fn min(&self) -> Option<&T> {
        let mut current = self.root?;
        while let Some(left) = self.nodes[current].left {
            current = left;
        }
        Some(&self.nodes[current].value)
    }

    /// Element with `index` smaller elements before it.
    #[cfg(test)]
    pub(crate) fn nth(&self, mut index: usize) -> Option<&T> {
        let mut current = self.root;
        while let Some(id) = current {
            let node = &self.nodes[id];
            let left_size = self.size(node.left);
            match index.cmp(&left_size) {
                Ordering::Less => current = node.left,
                Ordering::Equal => return Some(&node.value),
                Ordering::Greater => {
                    index -= left_size + 1;
                    current = node.right;
                }
            }
        }
        None
    }

    /// In-order traversal.
    #[cfg(test)]
    pub(crate) fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter {
            tree: self,
            stack: Vec::new(),
        };
        iter.push_left(self.root);
        iter
    }

    fn size(&self, link: Option<NodeId>) -> usize {
        link.map_or(0, |id| self.nodes[id].size)
    }

    fn height(&self, link: Option<NodeId>) -> u32 {
        link.map_or(0, |id| self.nodes[id].height)
    }

    fn update(&mut self, id: NodeId) {
        let (left, right) = (self.nodes[id].left, self.nodes[id].right);
        let height = 1 + self.height(left).max(self.height(right));
        let size = 1 + self.size(left) + self.size(right);
        let node = &mut self.nodes[id];
        node.height = height;
        node.size = size;
    }

    fn balance_factor(&self, id: NodeId) -> i64 {
        let node = &self.nodes[id];
        i64::from(self.height(node.left)) - i64::from(self.height(node.right))
    }

    fn rotate_right(&mut self, id: NodeId) -> NodeId {
        let Some(pivot) = self.nodes[id].left else {
            return id;
        };
        self.nodes[id].left = self.nodes[pivot].right;
        self.nodes[pivot].right = Some(id);
        self.update(id);
        self.update(pivot);
        pivot
    }

    fn rotate_left(&mut self, id: NodeId) -> NodeId {
        let Some(pivot) = self.nodes[id].right else {
            return id;
        };
        self.nodes[id].right = self.nodes[pivot].left;
        self.nodes[pivot].left = Some(id);
        self.update(id);
        self.update(pivot);
        pivot
    }

    fn rebalance(&mut self, id: NodeId) -> NodeId {
        self.update(id);
        let balance = self.balance_factor(id);
        if balance > 1 {
            if let Some(left) = self.nodes[id].left {
                if self.balance_factor(left) < 0 {
                    self.nodes[id].left = Some(self.rotate_left(left));
                }
            }
            return self.rotate_right(id);
        }
        if balance < -1 {
            if let Some(right) = self.nodes[id].right {
                if self.balance_factor(right) > 0 {
                    self.nodes[id].right = Some(self.rotate_right(right));
                }
            }
            return self.rotate_left(id);
        }
        id
    }

    fn insert_at<F>(&mut self, link: Option<NodeId>, new: NodeId, cmp: &mut F) -> NodeId
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let Some(id) = link else {
            return new;
        };
        if cmp(&self.nodes[new].value, &self.nodes[id].value) == Ordering::Less {
            let left = self.nodes[id].left;
            self.nodes[id].left = Some(self.insert_at(left, new, cmp));
        } else {
            let right = self.nodes[id].right;
            self.nodes[id].right = Some(self.insert_at(right, new, cmp));
        }
        self.rebalance(id)
    }

    fn remove_at<F>(
        &mut self,
        link: Option<NodeId>,
        value: &T,
        cmp: &mut F,
        removed: &mut Option<NodeId>,
    ) -> Option<NodeId>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let id = link?;
        if self.nodes[id].value == *value {
            *removed = Some(id);
            let (left, right) = (self.nodes[id].left, self.nodes[id].right);
            return match (left, right) {
                (None, None) => None,
                (Some(child), None) | (None, Some(child)) => Some(child),
                (Some(left), Some(right)) => {
                    let (rest, successor) = self.detach_min(right);
                    self.nodes[successor].left = Some(left);
                    self.nodes[successor].right = rest;
                    Some(self.rebalance(successor))
                }
            };
        }

        let (left, right) = (self.nodes[id].left, self.nodes[id].right);
        match cmp(&self.nodes[id].value, value) {
            Ordering::Greater => {
                self.nodes[id].left = self.remove_at(left, value, cmp, removed);
            }
            Ordering::Less => {
                self.nodes[id].right = self.remove_at(right, value, cmp, removed);
            }
            // Rotations can place an equal key on either side.
            Ordering::Equal => {
                self.nodes[id].right = self.remove_at(right, value, cmp, removed);
                if removed.is_none() {
                    self.nodes[id].left = self.remove_at(left, value, cmp, removed);
                }
            }
        }
        if removed.is_none() {
            return Some(id);
        }
        Some(self.rebalance(id))
    }

    /// Unlinks the leftmost node of the subtree, returning the new subtree root and the node.
    fn detach_min(&mut self, id: NodeId) -> (Option<NodeId>, NodeId) {
        match self.nodes[id].left {
            None => (self.nodes[id].right, id),
            Some(left) => {
                let (rest, min) = self.detach_min(left);
                self.nodes[id].left = rest;
                (Some(self.rebalance(id)), min)
            }
        }
    }
}

/// In-order iterator over a [`StatusTree`].
#[cfg(test)]
pub(crate) struct Iter<'a, T> {
    tree: &'a StatusTree<T>,
    stack: Vec<NodeId>,
}

#[cfg(test)]
impl<T> Iter<'_, T> {
    fn push_left(&mut self, mut link: Option<NodeId>) {
        while let Some(id) = link {
            self.stack.push(id);
            link = self.tree.nodes[id].left;
        }
    }
}

#[cfg(test)]
impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = &self.tree.nodes[id];
        self.push_left(node.right);
        Some(&node.value)
    }
}
