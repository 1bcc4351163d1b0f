//! A self-adjusting splay tree map and an explicit memoization cache built on top of it.
//!
//! `SplayMap` keeps recently found keys near the root of the tree, which makes it a good fit for
//! caches whose workloads revisit the same keys. `Memo` wraps a `SplayMap` with hit and miss
//! counters and is passed around by the caller like any other value.

pub mod arena;
pub mod memo;
pub mod splay_tree;
