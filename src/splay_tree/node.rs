use crate::arena::Handle;
use serde_derive::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct Entry<T, U> {
    pub key: T,
    pub value: U,
}

/// A node of the splay tree. Children and parent are handles into the arena that owns every node
/// of the tree, so the parent link never owns anything.
#[derive(Serialize, Deserialize, Debug)]
pub struct Node<T, U> {
    pub entry: Entry<T, U>,
    pub parent: Option<Handle>,
    pub left: Option<Handle>,
    pub right: Option<Handle>,
}

impl<T, U> Node<T, U> {
    pub fn new(key: T, value: U, parent: Option<Handle>) -> Self {
        Node {
            entry: Entry { key, value },
            parent,
            left: None,
            right: None,
        }
    }
}
