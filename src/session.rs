//! Per-open handles. A session owns nothing but its cursor and the mode it
//! was opened with; all data lives in the shared `Device`.

use alloc::sync::Arc;
use core::fmt;
use std::io;

use crate::chunk::{ChunkAllocator, HeapAllocator};
use crate::control::{IOC_EXCHANGE_MSG, IOC_GET_MSG, IOC_PING, IOC_SET_MSG};
use crate::{Device, Error, Message, Result, MSG_LEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl OpenMode {
    /// Decodes the access-mode bits of POSIX open flags (`O_ACCMODE`).
    pub fn from_flags(flags: i32) -> Result<Self> {
        match flags & 0b11 {
            0 => Ok(OpenMode::ReadOnly),
            1 => Ok(OpenMode::WriteOnly),
            2 => Ok(OpenMode::ReadWrite),
            _ => Err(Error::InvalidArgument),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    Start,
    Current,
    End,
}

impl Whence {
    /// Splits a `std::io::SeekFrom` into a signed offset and its origin.
    pub fn from_seek(pos: io::SeekFrom) -> Result<(i64, Self)> {
        match pos {
            io::SeekFrom::Start(n) => {
                let offset = i64::try_from(n).map_err(|_| Error::OutOfRange)?;
                Ok((offset, Whence::Start))
            }
            io::SeekFrom::Current(n) => Ok((n, Whence::Current)),
            io::SeekFrom::End(n) => Ok((n, Whence::End)),
        }
    }
}

impl TryFrom<i32> for Whence {
    type Error = Error;

    /// `SEEK_SET`, `SEEK_CUR`, `SEEK_END`.
    fn try_from(raw: i32) -> Result<Self> {
        match raw {
            0 => Ok(Whence::Start),
            1 => Ok(Whence::Current),
            2 => Ok(Whence::End),
            _ => Err(Error::InvalidArgument),
        }
    }
}

pub struct Session<A: ChunkAllocator = HeapAllocator> {
    device: Arc<Device<A>>,
    position: u64,
    mode: OpenMode,
}

impl<A: ChunkAllocator> Session<A> {
    pub(crate) fn new(device: Arc<Device<A>>, mode: OpenMode) -> Self {
        Session {
            device,
            position: 0,
            mode,
        }
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    pub fn device(&self) -> &Arc<Device<A>> {
        &self.device
    }

    /// Reads from the cursor; transfers at most up to the end of the current chunk.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = self.device.read_at(self.position, buf)?;
        self.position += n as u64;
        Ok(n)
    }

    /// Writes at the cursor; accepts at most up to the end of the current chunk.
    pub fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let n = self.device.write_at(self.position, buf)?;
        self.position += n as u64;
        Ok(n)
    }

    /// Moves the cursor and returns the new absolute position.
    /// The cursor is left untouched on error.
    pub fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64> {
        let position = self.device.resolve_seek(self.position, offset, whence)?;
        log::trace!("seek {:?}{:+} -> {}", whence, offset, position);
        self.position = position;
        Ok(position)
    }

    /// Issues a raw control code. `payload` must be `MSG_LEN` bytes for the
    /// message commands and is ignored by ping.
    pub fn control(&self, code: u32, payload: &mut [u8]) -> Result<usize> {
        self.device.control(code, payload)
    }

    pub fn ping(&self) -> Result<()> {
        self.control(IOC_PING, &mut [])?;
        Ok(())
    }

    pub fn set_message(&self, message: &Message) -> Result<()> {
        let mut payload = *message.raw();
        self.control(IOC_SET_MSG, &mut payload)?;
        Ok(())
    }

    pub fn get_message(&self) -> Result<Message> {
        let mut payload = [0; MSG_LEN];
        self.control(IOC_GET_MSG, &mut payload)?;
        Ok(Message::from_raw(payload))
    }

    /// Swaps in `message` and returns the previous slot contents.
    pub fn exchange_message(&self, message: &Message) -> Result<Message> {
        let mut payload = *message.raw();
        self.control(IOC_EXCHANGE_MSG, &mut payload)?;
        Ok(Message::from_raw(payload))
    }

    /// Closes the session. Device storage is untouched.
    pub fn close(self) {}
}

impl<A: ChunkAllocator> fmt::Debug for Session<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("position", &self.position)
            .field("mode", &self.mode)
            .finish()
    }
}

impl<A: ChunkAllocator> Drop for Session<A> {
    fn drop(&mut self) {
        self.device.close();
    }
}

impl<A: ChunkAllocator> io::Read for Session<A> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(Session::read(self, buf)?)
    }
}

impl<A: ChunkAllocator> io::Write for Session<A> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(Session::write(self, buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<A: ChunkAllocator> io::Seek for Session<A> {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let (offset, whence) = Whence::from_seek(pos)?;
        Ok(Session::seek(self, offset, whence)?)
    }
}
