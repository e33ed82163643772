//! Chunk store: a sparse, index-addressed table of chunks.
//! A slot holds a chunk only once something has been written through it;
//! lookups never allocate, `chunk_at` allocates on first touch.

use alloc::vec::Vec;

use crate::chunk::{Chunk, ChunkAllocator};
use crate::{Error, Result, NUM_CHUNKS};

pub struct ChunkStore<A: ChunkAllocator> {
    allocator: A,
    chunks: Vec<Option<Chunk>>,
    allocated: usize,
}

impl<A: ChunkAllocator> ChunkStore<A> {
    pub fn new(allocator: A) -> Self {
        ChunkStore {
            allocator,
            chunks: Vec::new(),
            allocated: 0,
        }
    }

    /// Returns the chunk at `idx`, allocating it if absent.
    /// Fails with `OutOfRange` past the last addressable chunk and with
    /// `ResourceExhausted` if the allocator cannot provide memory.
    pub fn chunk_at(&mut self, idx: usize) -> Result<&mut Chunk> {
        if idx >= NUM_CHUNKS {
            return Err(Error::OutOfRange);
        }
        if idx >= self.chunks.len() {
            let grow = idx + 1 - self.chunks.len();
            self.chunks
                .try_reserve(grow)
                .map_err(|_| Error::ResourceExhausted)?;
            self.chunks.resize_with(idx + 1, || None);
        }

        let slot = &mut self.chunks[idx];
        let chunk = match slot.take() {
            Some(chunk) => chunk,
            None => {
                let chunk = self.allocator.allocate()?;
                self.allocated += 1;
                log::trace!("chunk {} allocated ({} live)", idx, self.allocated);
                chunk
            }
        };
        Ok(slot.insert(chunk))
    }

    /// Looks a chunk up without allocating.
    pub fn get(&self, idx: usize) -> Option<&Chunk> {
        self.chunks.get(idx).and_then(Option::as_ref)
    }

    pub fn contains(&self, idx: usize) -> bool {
        self.get(idx).is_some()
    }

    /// Number of chunks currently backed by memory.
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    /// Hands every chunk back to the allocator and empties the table.
    pub fn release(&mut self) {
        let released = self.allocated;
        for chunk in self.chunks.drain(..).flatten() {
            self.allocator.release(chunk);
        }
        self.allocated = 0;
        if released > 0 {
            log::debug!("released {} chunk(s)", released);
        }
    }
}

impl<A: ChunkAllocator> Drop for ChunkStore<A> {
    fn drop(&mut self) {
        self.release();
    }
}
