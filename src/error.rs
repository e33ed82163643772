use thiserror::Error;

// Linux errno values returned by a character driver for each failure class.
pub const EIO: i32 = 5;
pub const ENOMEM: i32 = 12;
pub const EINVAL: i32 = 22;
pub const ENOTTY: i32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// Position, chunk index or payload size outside what the device accepts.
    #[error("position or size out of range")]
    OutOfRange,
    /// `size` claims data at `position` but no chunk backs it.
    #[error("no chunk backs position {position} below the high-water mark")]
    Hole { position: u64 },
    #[error("chunk allocation failed")]
    ResourceExhausted,
    #[error("unsupported control code {0:#x}")]
    Unsupported(u32),
    #[error("invalid argument")]
    InvalidArgument,
}

impl DeviceError {
    /// The (positive) errno a driver would negate and hand back to the caller.
    pub fn errno(&self) -> i32 {
        match self {
            DeviceError::OutOfRange | DeviceError::InvalidArgument => EINVAL,
            DeviceError::Hole { .. } => EIO,
            DeviceError::ResourceExhausted => ENOMEM,
            DeviceError::Unsupported(_) => ENOTTY,
        }
    }
}

impl From<DeviceError> for std::io::Error {
    fn from(err: DeviceError) -> Self {
        use std::io::ErrorKind;

        let kind = match err {
            DeviceError::OutOfRange | DeviceError::InvalidArgument => ErrorKind::InvalidInput,
            DeviceError::Hole { .. } => ErrorKind::Other,
            DeviceError::ResourceExhausted => ErrorKind::OutOfMemory,
            DeviceError::Unsupported(_) => ErrorKind::Unsupported,
        };
        std::io::Error::new(kind, err)
    }
}

pub type Result<T> = core::result::Result<T, DeviceError>;
