//! Allocation-only typed arena addressed by copyable handles.

use serde_derive::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::ops::{Index, IndexMut};
use thiserror::Error;

/// The number of objects stored per chunk when no chunk size is given.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// A struct representing the location of an object in an `Arena<T>`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Handle {
    chunk_index: usize,
    block_index: usize,
}

/// A typed arena that only allocates a single type of object and never frees individual objects.
///
/// Objects are stored in chunks of a fixed capacity. When the last chunk is full, a new chunk is
/// pushed so objects that were already allocated are never moved. All objects are destroyed when
/// the arena is dropped or cleared. The arena hands out `Handle`s instead of references, which
/// makes it possible to link objects to each other in any shape, including cycles, without
/// fighting the borrow checker.
///
/// # Examples
///
/// ```
/// use splay_memo::arena::Arena;
///
/// let mut arena = Arena::new(1024);
///
/// let x = arena.allocate(1);
/// assert_eq!(arena[x], 1);
///
/// arena[x] += 1;
/// assert_eq!(arena[x], 2);
/// assert_eq!(arena.len(), 1);
/// ```
#[derive(Serialize, Deserialize)]
#[serde(
    try_from = "RawArena<T>",
    bound(deserialize = "T: serde::Deserialize<'de>")
)]
pub struct Arena<T> {
    chunks: Vec<Vec<T>>,
    chunk_size: usize,
    len: usize,
}

/// Reasons a deserialized arena is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("arena chunk size must be positive")]
    ZeroChunkSize,
    #[error("chunk {chunk_index} holds {actual} objects but the chunk size is {chunk_size}")]
    ChunkSizeMismatch {
        chunk_index: usize,
        actual: usize,
        chunk_size: usize,
    },
    #[error("arena records {recorded} objects but stores {actual}")]
    LengthMismatch { recorded: usize, actual: usize },
}

// Unchecked shape of a serialized `Arena<T>`.
#[derive(Deserialize)]
#[serde(rename = "Arena")]
struct RawArena<T> {
    chunks: Vec<Vec<T>>,
    chunk_size: usize,
    len: usize,
}

// Every chunk but the last must be full, and no chunk may hold more than `chunk_size` objects,
// otherwise `allocate` would hand out handles that do not follow the chunk layout.
impl<T> TryFrom<RawArena<T>> for Arena<T> {
    type Error = Error;

    fn try_from(raw: RawArena<T>) -> Result<Self, Self::Error> {
        let RawArena {
            chunks,
            chunk_size,
            len,
        } = raw;
        if chunk_size == 0 {
            return Err(Error::ZeroChunkSize);
        }
        let last_index = chunks.len().saturating_sub(1);
        for (chunk_index, chunk) in chunks.iter().enumerate() {
            let is_valid = if chunk_index == last_index {
                !chunk.is_empty() && chunk.len() <= chunk_size
            } else {
                chunk.len() == chunk_size
            };
            if !is_valid {
                return Err(Error::ChunkSizeMismatch {
                    chunk_index,
                    actual: chunk.len(),
                    chunk_size,
                });
            }
        }
        let actual = chunks.iter().map(Vec::len).sum();
        if actual != len {
            return Err(Error::LengthMismatch {
                recorded: len,
                actual,
            });
        }
        Ok(Arena {
            chunks,
            chunk_size,
            len,
        })
    }
}

impl<T> Arena<T> {
    /// Constructs a new, empty `Arena<T>` with a specific number of objects per chunk. A chunk
    /// size of zero is treated as one.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_memo::arena::Arena;
    ///
    /// // creates a new Arena<T> that contains a maximum of 1024 u32's per chunk
    /// let arena: Arena<u32> = Arena::new(1024);
    /// ```
    pub fn new(chunk_size: usize) -> Self {
        Arena {
            chunks: Vec::new(),
            chunk_size: chunk_size.max(1),
            len: 0,
        }
    }

    /// Allocates an object in the arena and returns a `Handle` that can later be used to retrieve
    /// mutable and immutable references to the object.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_memo::arena::Arena;
    ///
    /// let mut arena = Arena::new(1024);
    /// let x = arena.allocate(0);
    /// assert_eq!(arena.get(x), Some(&0));
    /// ```
    pub fn allocate(&mut self, value: T) -> Handle {
        let needs_chunk = match self.chunks.last() {
            Some(chunk) => chunk.len() == self.chunk_size,
            None => true,
        };
        if needs_chunk {
            self.chunks.push(Vec::with_capacity(self.chunk_size));
        }

        let chunk_index = self.chunks.len() - 1;
        let last_chunk = &mut self.chunks[chunk_index];
        last_chunk.push(value);
        self.len += 1;
        Handle {
            chunk_index,
            block_index: last_chunk.len() - 1,
        }
    }

    /// Returns an immutable reference to an object in the arena. Returns `None` if the handle was
    /// not issued by this arena.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_memo::arena::Arena;
    ///
    /// let mut arena = Arena::new(1024);
    /// let x = arena.allocate(0);
    /// assert_eq!(arena.get(x), Some(&0));
    /// ```
    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.chunks
            .get(handle.chunk_index)
            .and_then(|chunk| chunk.get(handle.block_index))
    }

    /// Returns a mutable reference to an object in the arena. Returns `None` if the handle was
    /// not issued by this arena.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_memo::arena::Arena;
    ///
    /// let mut arena = Arena::new(1024);
    /// let x = arena.allocate(0);
    /// *arena.get_mut(x).unwrap() = 1;
    /// assert_eq!(arena.get(x), Some(&1));
    /// ```
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.chunks
            .get_mut(handle.chunk_index)
            .and_then(|chunk| chunk.get_mut(handle.block_index))
    }

    /// Returns the number of objects allocated in the arena.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing has been allocated in the arena.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Destroys every object in the arena. Handles issued before the call are invalidated and may
    /// be reissued by later allocations.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.len = 0;
    }
}

impl<T> Index<Handle> for Arena<T> {
    type Output = T;

    fn index(&self, handle: Handle) -> &Self::Output {
        self.get(handle).expect("Error: handle out of bounds.")
    }
}

impl<T> IndexMut<Handle> for Arena<T> {
    fn index_mut(&mut self, handle: Handle) -> &mut Self::Output {
        self.get_mut(handle).expect("Error: handle out of bounds.")
    }
}
