use crate::arena::{Arena, Handle};
use crate::splay_tree::node::{Entry, Node};
use log::trace;
use serde_derive::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::convert::TryFrom;
use std::mem;
use thiserror::Error;

/// Reasons a deserialized tree is rejected.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("root {0:?} is out of bounds or has a parent")]
    InvalidRoot(Handle),
    #[error("child handle {0:?} is out of bounds")]
    DanglingHandle(Handle),
    #[error("node {0:?} does not link back to its parent")]
    InconsistentParent(Handle),
    #[error("node {0:?} breaks the search order")]
    OutOfOrder(Handle),
    #[error("{reachable} nodes are reachable from the root but the tree holds {len}")]
    UnreachableNodes { reachable: usize, len: usize },
}

#[derive(Serialize, Deserialize)]
#[serde(
    try_from = "RawTree<T, U>",
    bound(deserialize = "T: serde::Deserialize<'de> + Ord, U: serde::Deserialize<'de>")
)]
pub struct Tree<T, U> {
    arena: Arena<Node<T, U>>,
    root: Option<Handle>,
}

impl<T, U> Tree<T, U> {
    pub fn new(chunk_size: usize) -> Self {
        Tree {
            arena: Arena::new(chunk_size),
            root: None,
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
    }

    pub fn root(&self) -> Option<Handle> {
        self.root
    }

    pub fn entry(&self, handle: Handle) -> &Entry<T, U> {
        &self.arena[handle].entry
    }

    pub fn entry_mut(&mut self, handle: Handle) -> &mut Entry<T, U> {
        &mut self.arena[handle].entry
    }

    // Descends without restructuring the tree.
    pub fn locate<V>(&self, key: &V) -> Option<Handle>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let mut curr = self.root;
        while let Some(handle) = curr {
            let node = &self.arena[handle];
            curr = match key.cmp(node.entry.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(handle),
            };
        }
        None
    }

    // Returns the handle of the node holding `key` and the value it replaced, if any.
    pub fn insert(&mut self, key: T, value: U) -> (Handle, Option<U>)
    where
        T: Ord,
    {
        let mut curr = match self.root {
            Some(root) => root,
            None => {
                let root = self.arena.allocate(Node::new(key, value, None));
                self.root = Some(root);
                return (root, None);
            },
        };

        let mut depth = 1;
        let is_left = loop {
            let node = &mut self.arena[curr];
            let (is_left, next) = match key.cmp(&node.entry.key) {
                Ordering::Less => (true, node.left),
                Ordering::Greater => (false, node.right),
                Ordering::Equal => {
                    return (curr, Some(mem::replace(&mut node.entry.value, value)));
                },
            };
            match next {
                Some(child) => {
                    curr = child;
                    depth += 1;
                },
                None => break is_left,
            }
        };

        let new_node = self.arena.allocate(Node::new(key, value, Some(curr)));
        if is_left {
            self.arena[curr].left = Some(new_node);
        } else {
            self.arena[curr].right = Some(new_node);
        }
        trace!("attached new node at depth {}", depth);
        (new_node, None)
    }

    // Locates `key` and splays its node to the root.
    pub fn find<V>(&mut self, key: &V) -> Option<Handle>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let handle = self.locate(key)?;
        self.splay(handle);
        Some(handle)
    }

    fn is_left_child(&self, parent: Handle, child: Handle) -> bool {
        let parent_node = &self.arena[parent];
        debug_assert!(parent_node.left == Some(child) || parent_node.right == Some(child));
        parent_node.left == Some(child)
    }

    // Points whatever referenced `old` (its parent's child slot, or the root) at `new`.
    fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Handle) {
        match parent {
            None => self.root = Some(new),
            Some(parent) => {
                if self.is_left_child(parent, old) {
                    self.arena[parent].left = Some(new);
                } else {
                    self.arena[parent].right = Some(new);
                }
            },
        }
    }

    fn rotate_left(&mut self, handle: Handle) {
        let child = self.arena[handle]
            .right
            .expect("Expected right child node to be `Some`.");
        let grandchild = self.arena[child].left;

        self.arena[handle].right = grandchild;
        if let Some(grandchild) = grandchild {
            self.arena[grandchild].parent = Some(handle);
        }

        let parent = self.arena[handle].parent;
        self.arena[child].parent = parent;
        self.replace_child(parent, handle, child);

        self.arena[child].left = Some(handle);
        self.arena[handle].parent = Some(child);
    }

    fn rotate_right(&mut self, handle: Handle) {
        let child = self.arena[handle]
            .left
            .expect("Expected left child node to be `Some`.");
        let grandchild = self.arena[child].right;

        self.arena[handle].left = grandchild;
        if let Some(grandchild) = grandchild {
            self.arena[grandchild].parent = Some(handle);
        }

        let parent = self.arena[handle].parent;
        self.arena[child].parent = parent;
        self.replace_child(parent, handle, child);

        self.arena[child].right = Some(handle);
        self.arena[handle].parent = Some(child);
    }

    fn splay(&mut self, handle: Handle) {
        let mut rotations = 0;
        while let Some(parent) = self.arena[handle].parent {
            let is_left = self.is_left_child(parent, handle);
            match self.arena[parent].parent {
                // zig
                None => {
                    if is_left {
                        self.rotate_right(parent);
                    } else {
                        self.rotate_left(parent);
                    }
                    rotations += 1;
                },
                Some(grandparent) => {
                    match (is_left, self.is_left_child(grandparent, parent)) {
                        // zig-zig
                        (true, true) => {
                            self.rotate_right(grandparent);
                            self.rotate_right(parent);
                        },
                        (false, false) => {
                            self.rotate_left(grandparent);
                            self.rotate_left(parent);
                        },
                        // zig-zag
                        (true, false) => {
                            self.rotate_right(parent);
                            self.rotate_left(grandparent);
                        },
                        (false, true) => {
                            self.rotate_left(parent);
                            self.rotate_right(grandparent);
                        },
                    }
                    rotations += 2;
                },
            }
        }
        debug_assert_eq!(self.root, Some(handle));
        trace!("splayed node to the root in {} rotations", rotations);
    }

    pub fn min(&self) -> Option<Handle> {
        self.root.map(|root| self.leftmost(root))
    }

    pub fn max(&self) -> Option<Handle> {
        self.root.map(|root| {
            let mut curr = root;
            while let Some(right) = self.arena[curr].right {
                curr = right;
            }
            curr
        })
    }

    fn leftmost(&self, handle: Handle) -> Handle {
        let mut curr = handle;
        while let Some(left) = self.arena[curr].left {
            curr = left;
        }
        curr
    }

    // In-order successor, found through parent links.
    pub fn successor(&self, handle: Handle) -> Option<Handle> {
        if let Some(right) = self.arena[handle].right {
            return Some(self.leftmost(right));
        }
        let mut curr = handle;
        while let Some(parent) = self.arena[curr].parent {
            if self.is_left_child(parent, curr) {
                return Some(parent);
            }
            curr = parent;
        }
        None
    }

    pub fn height(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = Vec::new();
        if let Some(root) = self.root {
            stack.push((root, 1));
        }
        while let Some((handle, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            let node = &self.arena[handle];
            for child in node.left.iter().chain(node.right.iter()) {
                stack.push((*child, depth + 1));
            }
        }
        max_depth
    }

    // Walks every node from the root and checks handle bounds, parent links, search order, and
    // that every node in the arena is reachable exactly once.
    pub fn validate(&self) -> Result<(), Error>
    where
        T: Ord,
    {
        let root = match self.root {
            Some(root) => root,
            None if self.arena.is_empty() => return Ok(()),
            None => {
                return Err(Error::UnreachableNodes {
                    reachable: 0,
                    len: self.len(),
                })
            },
        };
        match self.arena.get(root) {
            Some(node) if node.parent.is_none() => {},
            _ => return Err(Error::InvalidRoot(root)),
        }

        let mut reachable = 0;
        let mut stack: Vec<(Handle, Option<&T>, Option<&T>)> = vec![(root, None, None)];
        while let Some((handle, lower, upper)) = stack.pop() {
            reachable += 1;
            if reachable > self.len() {
                return Err(Error::UnreachableNodes {
                    reachable,
                    len: self.len(),
                });
            }
            let node = &self.arena[handle];
            let key = &node.entry.key;
            let in_order = lower.map_or(true, |lower| lower < key)
                && upper.map_or(true, |upper| key < upper);
            if !in_order {
                return Err(Error::OutOfOrder(handle));
            }
            if node.left.is_some() && node.left == node.right {
                return Err(Error::InconsistentParent(handle));
            }
            let children = [(node.left, lower, Some(key)), (node.right, Some(key), upper)];
            for &(child, lower, upper) in children.iter() {
                if let Some(child) = child {
                    match self.arena.get(child) {
                        None => return Err(Error::DanglingHandle(child)),
                        Some(child_node) if child_node.parent != Some(handle) => {
                            return Err(Error::InconsistentParent(child));
                        },
                        Some(_) => stack.push((child, lower, upper)),
                    }
                }
            }
        }
        if reachable != self.len() {
            return Err(Error::UnreachableNodes {
                reachable,
                len: self.len(),
            });
        }
        Ok(())
    }
}

// Unchecked shape of a serialized `Tree<T, U>`.
#[derive(Deserialize)]
#[serde(rename = "Tree")]
struct RawTree<T, U> {
    arena: Arena<Node<T, U>>,
    root: Option<Handle>,
}

impl<T, U> TryFrom<RawTree<T, U>> for Tree<T, U>
where
    T: Ord,
{
    type Error = Error;

    fn try_from(raw: RawTree<T, U>) -> Result<Self, Self::Error> {
        let tree = Tree {
            arena: raw.arena,
            root: raw.root,
        };
        tree.validate()?;
        Ok(tree)
    }
}
