//! Chunks are the unit of backing storage. Where the memory comes from is
//! abstracted behind `ChunkAllocator`, so the store never assumes allocation succeeds.

use alloc::{boxed::Box, vec::Vec};
use core::fmt;

use crate::{Error, Result, CHUNK_SIZE};

/// A zero-initialized buffer of exactly `CHUNK_SIZE` bytes.
pub struct Chunk {
    data: Box<[u8]>,
}

impl Chunk {
    /// Allocates a zeroed chunk, reporting allocator failure instead of aborting.
    pub fn try_new() -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(CHUNK_SIZE)
            .map_err(|_| Error::ResourceExhausted)?;
        data.resize(CHUNK_SIZE, 0);
        Ok(Chunk { data: data.into_boxed_slice() })
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let used = self.data.iter().filter(|&&b| b != 0).count();
        f.debug_struct("Chunk")
            .field("len", &self.data.len())
            .field("nonzero", &used)
            .finish()
    }
}

pub trait ChunkAllocator: Send + Sync {
    /// Hands out a fresh zeroed chunk.
    fn allocate(&self) -> Result<Chunk>;

    /// Takes a chunk back when the store releases it.
    fn release(&self, chunk: Chunk) {
        drop(chunk);
    }
}

/// Default allocator backed by the global heap.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapAllocator;

impl ChunkAllocator for HeapAllocator {
    fn allocate(&self) -> Result<Chunk> {
        Chunk::try_new()
    }
}
