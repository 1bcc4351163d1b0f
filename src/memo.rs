//! Explicit memoization caches backed by a splay tree.
//!
//! Recently used results stay near the root of the tree, so workloads that repeatedly ask for the
//! same handful of keys are served in close to constant time. The cache is an ordinary value owned
//! by the caller rather than hidden global state.

use crate::arena::DEFAULT_CHUNK_SIZE;
use crate::splay_tree::SplayMap;
use log::debug;
use std::borrow::Borrow;
use std::result;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("fibonacci number at index {index} does not fit in 128 bits")]
    Overflow { index: u64 },
}

pub type Result<T> = result::Result<T, Error>;

/// Hit and miss counters of a `Memo<T, U>`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Stats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl Stats {
    /// Returns the fraction of lookups that were hits, or `0.0` if there were no lookups.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_memo::memo::Stats;
    ///
    /// let stats = Stats { hits: 3, misses: 1, entries: 1 };
    /// assert_eq!(stats.hit_ratio(), 0.75);
    /// ```
    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            return 0.0;
        }
        self.hits as f64 / lookups as f64
    }
}

/// A memoization cache that remembers computed values by key.
///
/// Every lookup goes through `SplayMap::find`, so a hit moves the key to the root of the tree.
/// Storing a value never restructures the tree.
///
/// # Examples
///
/// ```
/// use splay_memo::memo::Memo;
///
/// let mut memo: Memo<u32, u32> = Memo::new();
/// assert_eq!(memo.lookup(&2), None);
/// memo.store(2, 4);
/// assert_eq!(memo.lookup(&2), Some(&4));
///
/// let stats = memo.stats();
/// assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
/// ```
pub struct Memo<T, U> {
    map: SplayMap<T, U>,
    hits: u64,
    misses: u64,
}

impl<T, U> Memo<T, U>
where
    T: Ord,
{
    /// Constructs a new, empty `Memo<T, U>`.
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Constructs a new, empty `Memo<T, U>` whose underlying map allocates `chunk_size` nodes at a
    /// time.
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Memo {
            map: SplayMap::with_chunk_size(chunk_size),
            hits: 0,
            misses: 0,
        }
    }

    /// Returns the memoized value for a key and records a hit, or records a miss and returns
    /// `None`.
    pub fn lookup<V>(&mut self, key: &V) -> Option<&U>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let entries = self.map.len();
        match self.map.find(key) {
            Some(value) => {
                self.hits += 1;
                Some(value)
            },
            None => {
                self.misses += 1;
                debug!("memo miss with {} entries cached", entries);
                None
            },
        }
    }

    /// Memoizes a value for a key, replacing any value stored before.
    pub fn store(&mut self, key: T, value: U) {
        self.map.insert(key, value);
    }

    /// Returns the memoized value for a key, computing and storing it with `f` on a miss.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_memo::memo::Memo;
    ///
    /// let mut memo = Memo::new();
    /// assert_eq!(*memo.get_or_insert_with(3, || 9), 9);
    /// assert_eq!(*memo.get_or_insert_with(3, || unreachable!()), 9);
    /// assert_eq!(memo.stats().hits, 1);
    /// ```
    pub fn get_or_insert_with<F>(&mut self, key: T, f: F) -> &U
    where
        F: FnOnce() -> U,
    {
        if self.lookup(&key).is_none() {
            return self.map.insert_and_get(key, f());
        }
        self.map
            .root()
            .map(|(_, value)| value)
            .expect("Expected found key to be at the root.")
    }

    /// Returns the current hit and miss counts and the number of memoized entries.
    pub fn stats(&self) -> Stats {
        Stats {
            hits: self.hits,
            misses: self.misses,
            entries: self.map.len(),
        }
    }

    /// Returns the map holding the memoized values.
    pub fn map(&self) -> &SplayMap<T, U> {
        &self.map
    }

    /// Forgets every memoized value and resets the statistics.
    pub fn clear(&mut self) {
        self.map.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

impl<T, U> Default for Memo<T, U>
where
    T: Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Computes the `n`th Fibonacci number, with `fibonacci(0) == 0` and `fibonacci(1) == 1`,
/// memoizing every intermediate value in `memo`.
///
/// The values are built bottom-up, so the call stack does not grow with `n`. Indices that are
/// already memoized are looked up instead of recomputed.
///
/// # Errors
///
/// Returns `Error::Overflow` if the result does not fit in a `u128`, which happens for every `n`
/// above 186. Values below the overflowing index remain memoized.
///
/// # Examples
///
/// ```
/// use splay_memo::memo::{fibonacci, Memo};
///
/// let mut memo = Memo::new();
/// assert_eq!(fibonacci(10, &mut memo), Ok(55));
/// assert_eq!(memo.stats().entries, 11);
/// ```
pub fn fibonacci(n: u64, memo: &mut Memo<u64, u128>) -> Result<u128> {
    if n < 2 {
        memo.store(n, u128::from(n));
        return Ok(u128::from(n));
    }
    let misses = memo.stats().misses;
    if let Some(value) = memo.lookup(&n) {
        return Ok(*value);
    }

    let mut prev = memoized_base(0, memo);
    let mut curr = memoized_base(1, memo);
    for index in 2..n {
        let next = match memo.lookup(&index) {
            Some(value) => *value,
            None => {
                let value = prev.checked_add(curr).ok_or(Error::Overflow { index })?;
                memo.store(index, value);
                value
            },
        };
        prev = curr;
        curr = next;
    }

    let value = prev.checked_add(curr).ok_or(Error::Overflow { index: n })?;
    memo.store(n, value);
    debug!(
        "computed fibonacci({}) with {} new cache misses",
        n,
        memo.stats().misses - misses,
    );
    Ok(value)
}

fn memoized_base(index: u64, memo: &mut Memo<u64, u128>) -> u128 {
    if memo.lookup(&index).is_none() {
        memo.store(index, u128::from(index));
    }
    u128::from(index)
}

#[cfg(test)]
mod tests {
    use super::{fibonacci, Error, Memo, Stats};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_lookup_counts() {
        let mut memo: Memo<u32, &str> = Memo::new();
        assert_eq!(memo.lookup(&1), None);
        memo.store(1, "one");
        assert_eq!(memo.lookup(&1), Some(&"one"));
        assert_eq!(memo.lookup(&1), Some(&"one"));
        assert_eq!(
            memo.stats(),
            Stats {
                hits: 2,
                misses: 1,
                entries: 1,
            },
        );
    }

    #[test]
    fn test_hit_ratio_empty() {
        let memo: Memo<u32, u32> = Memo::new();
        assert_eq!(memo.stats().hit_ratio(), 0.0);
    }

    #[test]
    fn test_get_or_insert_with() {
        let mut memo = Memo::with_chunk_size(2);
        for key in &[5, 3, 8, 1, 4] {
            assert_eq!(*memo.get_or_insert_with(*key, || key * 2), key * 2);
        }
        assert_eq!(*memo.get_or_insert_with(1, || 0), 2);
        assert_eq!(memo.map().root(), Some((&1, &2)));
        assert_eq!(memo.stats().hits, 1);
        assert_eq!(memo.stats().misses, 5);
    }

    #[test]
    fn test_clear() {
        let mut memo = Memo::new();
        memo.store(1, 1);
        memo.lookup(&1);
        memo.clear();
        assert_eq!(memo.stats(), Stats::default());
    }

    #[test]
    fn test_fibonacci_small() {
        init_logger();
        let mut memo = Memo::new();
        let expected = [0, 1, 1, 2, 3, 5, 8, 13, 21, 34, 55];
        for (n, value) in expected.iter().enumerate() {
            assert_eq!(fibonacci(n as u64, &mut memo), Ok(*value));
        }
        assert_eq!(memo.stats().entries, 11);
    }

    #[test]
    fn test_fibonacci_reuses_memo() {
        init_logger();
        let mut memo = Memo::new();
        assert_eq!(fibonacci(50, &mut memo), Ok(12_586_269_025));
        let misses = memo.stats().misses;

        assert_eq!(fibonacci(50, &mut memo), Ok(12_586_269_025));
        assert_eq!(memo.stats().misses, misses);
        assert_eq!(memo.map().root(), Some((&50, &12_586_269_025)));
    }

    #[test]
    fn test_fibonacci_counts_each_index_once() {
        let mut memo = Memo::new();
        assert_eq!(fibonacci(10, &mut memo), Ok(55));
        assert_eq!(
            memo.stats(),
            Stats {
                hits: 0,
                misses: 11,
                entries: 11,
            },
        );

        // 0 through 10 are hits, 11 and 12 are the only misses.
        assert_eq!(fibonacci(12, &mut memo), Ok(144));
        assert_eq!(
            memo.stats(),
            Stats {
                hits: 11,
                misses: 13,
                entries: 13,
            },
        );
    }

    #[test]
    fn test_fibonacci_largest() {
        let mut memo = Memo::new();
        assert_eq!(
            fibonacci(186, &mut memo),
            Ok(332_825_110_087_067_562_321_196_029_789_634_457_848),
        );
    }

    #[test]
    fn test_fibonacci_overflow() {
        let mut memo = Memo::new();
        assert_eq!(fibonacci(200, &mut memo), Err(Error::Overflow { index: 187 }));
        assert_eq!(memo.stats().entries, 187);
        assert!(fibonacci(186, &mut memo).is_ok());
    }
}
