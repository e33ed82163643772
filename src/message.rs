//! The control message slot: a fixed-width, NUL-padded byte string.

use core::fmt;

use crate::{Error, Result, MSG_LEN};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Message {
    buf: [u8; MSG_LEN],
}

impl Message {
    pub const EMPTY: Self = Self { buf: [0; MSG_LEN] };

    /// Builds a message from up to `MSG_LEN` bytes, padding the rest with NUL.
    pub fn new(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > MSG_LEN {
            return Err(Error::OutOfRange);
        }
        let mut buf = [0; MSG_LEN];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(Self { buf })
    }

    /// Takes a control payload verbatim. The payload must be exactly `MSG_LEN` wide.
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        let buf: [u8; MSG_LEN] = payload.try_into().map_err(|_| Error::OutOfRange)?;
        Ok(Self { buf })
    }

    pub const fn from_raw(buf: [u8; MSG_LEN]) -> Self {
        Self { buf }
    }

    /// Copies the full slot, padding included, into a control payload.
    pub fn write_to(&self, payload: &mut [u8]) -> Result<()> {
        if payload.len() != MSG_LEN {
            return Err(Error::OutOfRange);
        }
        payload.copy_from_slice(&self.buf);
        Ok(())
    }

    /// Length of the content, up to the first NUL.
    pub fn len(&self) -> usize {
        self.buf.iter().position(|&b| b == 0).unwrap_or(MSG_LEN)
    }

    pub fn is_empty(&self) -> bool {
        self.buf[0] == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len()]
    }

    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(self.as_bytes()).ok()
    }

    pub fn raw(&self) -> &[u8; MSG_LEN] {
        &self.buf
    }
}

impl TryFrom<&str> for Message {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s.as_bytes())
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Message({:?})", alloc::string::String::from_utf8_lossy(self.as_bytes()))
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in self.as_bytes() {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}
