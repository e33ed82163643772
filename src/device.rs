//! The shared device: one chunk store, the high-water mark, and the message slot.
//! All mutable state sits behind a single lock; sessions only carry a cursor.

use alloc::sync::Arc;
use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};

use spin::Mutex;

use crate::chunk::{ChunkAllocator, HeapAllocator};
use crate::control::Command;
use crate::session::{OpenMode, Session, Whence};
use crate::store::ChunkStore;
use crate::{Error, Message, Result, CAPACITY, CHUNK_SIZE};

struct DeviceState<A: ChunkAllocator> {
    store: ChunkStore<A>,
    size: u64, // High-water mark of bytes ever written
    message: Message,
}

pub struct Device<A: ChunkAllocator = HeapAllocator> {
    state: Mutex<DeviceState<A>>,
    opens: AtomicUsize,
    active: AtomicUsize,
}

impl Device {
    pub fn new() -> Self {
        Self::with_allocator(HeapAllocator)
    }
}

impl Default for Device {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ChunkAllocator> Device<A> {
    pub fn with_allocator(allocator: A) -> Self {
        log::info!(
            "initializing device: {} byte chunks, {} byte capacity",
            CHUNK_SIZE,
            CAPACITY
        );
        Self {
            state: Mutex::new(DeviceState {
                store: ChunkStore::new(allocator),
                size: 0,
                message: Message::EMPTY,
            }),
            opens: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
        }
    }

    /// Opens a session on the device. Write-only opens clear the storage first.
    pub fn open(self: &Arc<Self>, mode: OpenMode) -> Session<A> {
        if mode == OpenMode::WriteOnly {
            self.clear();
        }
        let opens = self.opens.fetch_add(1, Ordering::Relaxed) + 1;
        self.active.fetch_add(1, Ordering::Relaxed);
        log::info!("device opened {:?}, {} time(s)", mode, opens);
        Session::new(Arc::clone(self), mode)
    }

    pub(crate) fn close(&self) {
        let active = self.active.fetch_sub(1, Ordering::Relaxed) - 1;
        log::info!("device closed, {} session(s) still open", active);
    }

    /// Releases every chunk and resets the size to zero. The message slot is kept.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.store.release();
        state.size = 0;
        log::info!("device storage cleared");
    }

    /// Reads at `position` into `buf`, never past the high-water mark and never
    /// across a chunk boundary. Returns 0 at or past the end of written data.
    pub fn read_at(&self, position: u64, buf: &mut [u8]) -> Result<usize> {
        let state = self.state.lock();
        if position > state.size {
            return Ok(0);
        }

        let offset = (position % CHUNK_SIZE as u64) as usize;
        let count = (buf.len() as u64).min(state.size - position) as usize;
        let count = count.min(CHUNK_SIZE - offset);
        if count == 0 {
            return Ok(0);
        }

        let idx = (position / CHUNK_SIZE as u64) as usize;
        let chunk = state.store.get(idx).ok_or_else(|| {
            log::error!(
                "chunk {} missing below size {} (read at {})",
                idx,
                state.size,
                position
            );
            Error::Hole { position }
        })?;
        buf[..count].copy_from_slice(&chunk.as_slice()[offset..offset + count]);

        if count < buf.len() {
            log::trace!("short read at {}: {} of {} bytes", position, count, buf.len());
        }
        Ok(count)
    }

    /// Writes at `position`, allocating the target chunk on first touch.
    /// Only the part of `buf` that fits in that chunk is taken.
    pub fn write_at(&self, position: u64, buf: &[u8]) -> Result<usize> {
        if position >= CAPACITY as u64 {
            log::debug!("write at {} rejected, capacity is {}", position, CAPACITY);
            return Err(Error::OutOfRange);
        }
        if buf.is_empty() {
            return Ok(0);
        }

        let idx = (position / CHUNK_SIZE as u64) as usize;
        let offset = (position % CHUNK_SIZE as u64) as usize;
        let count = buf.len().min(CHUNK_SIZE - offset);

        let mut state = self.state.lock();
        let chunk = state.store.chunk_at(idx)?;
        chunk.as_mut_slice()[offset..offset + count].copy_from_slice(&buf[..count]);

        let end = position + count as u64;
        if end > state.size {
            state.size = end;
        }

        if count < buf.len() {
            log::trace!("short write at {}: {} of {} bytes", position, count, buf.len());
        }
        Ok(count)
    }

    /// Computes the position a seek lands on. No upper bound is applied here;
    /// a later write past capacity is what gets rejected.
    pub fn resolve_seek(&self, current: u64, offset: i64, whence: Whence) -> Result<u64> {
        let base = match whence {
            Whence::Start => 0,
            Whence::Current => current,
            Whence::End => self.size(),
        };
        base.checked_add_signed(offset).ok_or_else(|| {
            log::debug!("seek {:?}{:+} from {} rejected", whence, offset, base);
            Error::OutOfRange
        })
    }

    /// Runs a raw control code against the message slot.
    /// Returns the number of payload bytes transferred.
    pub fn control(&self, code: u32, payload: &mut [u8]) -> Result<usize> {
        let cmd = Command::decode(code).inspect_err(|e| {
            log::debug!("control code {:#x} rejected: {}", code, e);
        })?;
        log::debug!("control {:?}", cmd);

        match cmd {
            Command::Ping => {
                log::info!("ping");
                Ok(0)
            }
            Command::Set => {
                self.set_message(Message::from_payload(payload)?);
                Ok(cmd.payload_len())
            }
            Command::Get => {
                self.message().write_to(payload)?;
                Ok(cmd.payload_len())
            }
            Command::Exchange => {
                let new = Message::from_payload(payload)?;
                let mut state = self.state.lock();
                let old = core::mem::replace(&mut state.message, new);
                if let Err(e) = old.write_to(payload) {
                    state.message = old;
                    return Err(e);
                }
                Ok(cmd.payload_len())
            }
        }
    }

    pub fn message(&self) -> Message {
        self.state.lock().message
    }

    pub fn set_message(&self, message: Message) {
        self.state.lock().message = message;
    }

    /// Installs `message` and returns what the slot held before.
    pub fn exchange_message(&self, message: Message) -> Message {
        core::mem::replace(&mut self.state.lock().message, message)
    }

    pub fn size(&self) -> u64 {
        self.state.lock().size
    }

    pub fn allocated_chunks(&self) -> usize {
        self.state.lock().store.allocated()
    }

    pub fn is_allocated(&self, idx: usize) -> bool {
        self.state.lock().store.contains(idx)
    }

    /// Total number of opens since init.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::Relaxed)
    }

    pub fn active_sessions(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }
}

impl<A: ChunkAllocator> fmt::Debug for Device<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("Device");
        match self.state.try_lock() {
            Some(state) => dbg
                .field("size", &state.size)
                .field("chunks", &state.store.allocated())
                .field("message", &state.message),
            None => dbg.field("state", &"<locked>"),
        };
        dbg.field("opens", &self.open_count())
            .field("active", &self.active_sessions())
            .finish()
    }
}

impl<A: ChunkAllocator> Drop for Device<A> {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        log::info!(
            "unloading device, releasing {} chunk(s)",
            state.store.allocated()
        );
        state.store.release();
        state.size = 0;
    }
}
