//! fourmb is a volatile pseudo block store: up to 4 MiB of bytes kept in
//! lazily allocated 512-byte chunks, reached through file-like sessions.
//!
//! Layers (from bottom to top):
//! 1. Chunk: fixed-size zeroed buffers, handed out by a `ChunkAllocator`.
//! 2. ChunkStore: index-addressed table of chunks, allocated on first write.
//! 3. Device: the single shared instance. Owns the store, the high-water mark
//!    (`size`) and a 20-byte control message slot, all behind one lock.
//! 4. Session: a per-open cursor. Read, write and seek go through the device;
//!    control codes reach the message slot directly.
//!
//! A single read or write never crosses a chunk boundary. Callers that need
//! more issue further calls, or use the `std::io` impls on `Session` together
//! with `read_exact`/`write_all`.

extern crate alloc;

mod config;
mod error;
mod chunk;
mod store;
mod message;
mod control;
mod device;
mod session;

pub use config::*;
pub use chunk::{Chunk, ChunkAllocator, HeapAllocator};
pub use store::ChunkStore;
pub use message::Message;
pub use control::*;
pub use device::Device;
pub use session::{OpenMode, Session, Whence};
pub use error::DeviceError as Error;
pub use error::{Result, EINVAL, EIO, ENOMEM, ENOTTY};
