//! Common utilities for tests

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use fourmb::{Chunk, ChunkAllocator, Error, Result};

pub const ORANGE: &str = "\x1b[38;5;214m";
pub const RESET: &str = "\x1b[0m";

/// Provides a macro for logging messages during tests.
/// e.g. log!("placeholder {}", 1) -> println!("[test] placeholder 1");
#[macro_export]
macro_rules! log {
    ($msg:expr, $($arg:tt)*) => {
        println!("{}[test] {}{}", crate::common::ORANGE, format!($msg, $($arg)*), crate::common::RESET)
    };
}

/// Routes the crate's `log` output through env_logger (RUST_LOG=trace to see it).
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Counters shared between a test and the allocator it handed to a device.
#[derive(Debug, Default)]
pub struct AllocStats {
    pub allocated: AtomicUsize,
    pub released: AtomicUsize,
}

impl AllocStats {
    pub fn allocated(&self) -> usize {
        self.allocated.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

/// Heap allocator that refuses to hand out more than `limit` chunks in total.
pub struct LimitedAllocator {
    limit: usize,
    stats: Arc<AllocStats>,
}

impl LimitedAllocator {
    pub fn new(limit: usize) -> (Self, Arc<AllocStats>) {
        let stats = Arc::new(AllocStats::default());
        let allocator = LimitedAllocator {
            limit,
            stats: Arc::clone(&stats),
        };
        (allocator, stats)
    }
}

impl ChunkAllocator for LimitedAllocator {
    fn allocate(&self) -> Result<Chunk> {
        if self.stats.allocated() >= self.limit {
            return Err(Error::ResourceExhausted);
        }
        let chunk = Chunk::try_new()?;
        self.stats.allocated.fetch_add(1, Ordering::SeqCst);
        Ok(chunk)
    }

    fn release(&self, chunk: Chunk) {
        self.stats.released.fetch_add(1, Ordering::SeqCst);
        drop(chunk);
    }
}

/// Deterministic, non-trivial test pattern.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
