//! Control codes for the message channel, laid out like Linux ioctl numbers:
//! | dir (2) | size (14) | type (8) | nr (8) |

use crate::{Error, Result, IOC_MAGIC, IOC_MAXNR, MSG_LEN};

/// Bit layout of a control code.
mod ioc {
    pub const NRBITS: u32 = 8;
    pub const TYPEBITS: u32 = 8;
    pub const SIZEBITS: u32 = 14;

    pub const NRSHIFT: u32 = 0;
    pub const TYPESHIFT: u32 = NRSHIFT + NRBITS;
    pub const SIZESHIFT: u32 = TYPESHIFT + TYPEBITS;
    pub const DIRSHIFT: u32 = SIZESHIFT + SIZEBITS;

    pub const NRMASK: u32 = (1 << NRBITS) - 1;
    pub const TYPEMASK: u32 = (1 << TYPEBITS) - 1;
    pub const SIZEMASK: u32 = (1 << SIZEBITS) - 1;
    pub const DIRMASK: u32 = 0b11;
}

/// No payload
pub const IOC_NONE: u32 = 0b00;
/// Caller writes the payload into the device
pub const IOC_WRITE: u32 = 0b01;
/// Caller reads the payload out of the device
pub const IOC_READ: u32 = 0b10;

/// Packs a control code from its direction, type byte, number and payload size.
pub const fn encode(dir: u32, ty: u8, nr: u8, size: usize) -> u32 {
    (dir << ioc::DIRSHIFT)
        | (((size as u32) & ioc::SIZEMASK) << ioc::SIZESHIFT)
        | ((ty as u32) << ioc::TYPESHIFT)
        | ((nr as u32) << ioc::NRSHIFT)
}

pub const IOC_PING: u32 = encode(IOC_NONE, IOC_MAGIC, 1, 0);
pub const IOC_SET_MSG: u32 = encode(IOC_WRITE, IOC_MAGIC, 2, MSG_LEN);
pub const IOC_GET_MSG: u32 = encode(IOC_READ, IOC_MAGIC, 3, MSG_LEN);
pub const IOC_EXCHANGE_MSG: u32 = encode(IOC_READ | IOC_WRITE, IOC_MAGIC, 4, MSG_LEN);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    Set,
    Get,
    Exchange,
}

impl Command {
    /// Decodes a raw control code.
    pub fn decode(code: u32) -> Result<Self> {
        let ty = (code >> ioc::TYPESHIFT) & ioc::TYPEMASK;
        let nr = (code >> ioc::NRSHIFT) & ioc::NRMASK;
        if ty != IOC_MAGIC as u32 || nr > IOC_MAXNR as u32 {
            return Err(Error::Unsupported(code));
        }

        let cmd = match nr {
            1 => Command::Ping,
            2 => Command::Set,
            3 => Command::Get,
            4 => Command::Exchange,
            _ => return Err(Error::Unsupported(code)),
        };

        let expected = cmd.code();
        let dir = (code >> ioc::DIRSHIFT) & ioc::DIRMASK;
        if dir != (expected >> ioc::DIRSHIFT) & ioc::DIRMASK {
            return Err(Error::Unsupported(code));
        }
        let size = (code >> ioc::SIZESHIFT) & ioc::SIZEMASK;
        if size as usize != cmd.payload_len() {
            return Err(Error::OutOfRange);
        }
        Ok(cmd)
    }

    pub const fn code(self) -> u32 {
        match self {
            Command::Ping => IOC_PING,
            Command::Set => IOC_SET_MSG,
            Command::Get => IOC_GET_MSG,
            Command::Exchange => IOC_EXCHANGE_MSG,
        }
    }

    /// Payload width the command carries.
    pub const fn payload_len(self) -> usize {
        match self {
            Command::Ping => 0,
            _ => MSG_LEN,
        }
    }
}

impl TryFrom<u32> for Command {
    type Error = Error;

    fn try_from(code: u32) -> Result<Self> {
        Self::decode(code)
    }
}
