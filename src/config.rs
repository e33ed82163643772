pub const CHUNK_SIZE: usize = 512;
pub const CAPACITY: usize = 4 * 1024 * 1024; // 4 MiB
pub const NUM_CHUNKS: usize = CAPACITY / CHUNK_SIZE; // Addressable chunks

pub const MSG_LEN: usize = 20; // Width of the control message slot

pub const IOC_MAGIC: u8 = b'k'; // Control code type byte
pub const IOC_MAXNR: u8 = 14; // Highest command number accepted by the decoder
