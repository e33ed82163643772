mod common;

use std::sync::Arc;

use common::{init_logger, pattern, LimitedAllocator};
use fourmb::{Device, Error, Whence, CAPACITY, CHUNK_SIZE};

#[test]
fn test_read_after_write() {
    init_logger();
    let dev = Device::new();
    assert_eq!(dev.write_at(37, &[0x5A]).unwrap(), 1);
    let mut buf = [0u8; 1];
    assert_eq!(dev.read_at(37, &mut buf).unwrap(), 1);
    assert_eq!(buf[0], 0x5A);

    // Bytes below the write in the same chunk read back as zero.
    let mut low = [0xFFu8; 37];
    assert_eq!(dev.read_at(0, &mut low).unwrap(), 37);
    assert!(low.iter().all(|&b| b == 0));
}

#[test]
fn test_capacity_bound() {
    init_logger();
    let dev = Device::new();
    dev.write_at(0, b"seed").unwrap();
    for position in [CAPACITY as u64, CAPACITY as u64 + 1, u64::MAX] {
        assert_eq!(dev.write_at(position, b"x").unwrap_err(), Error::OutOfRange);
        assert_eq!(dev.size(), 4);
    }
    assert_eq!(dev.allocated_chunks(), 1);

    // The last byte of capacity is still writable.
    assert_eq!(dev.write_at(CAPACITY as u64 - 1, b"yz").unwrap(), 1);
    assert_eq!(dev.size(), CAPACITY as u64);
}

#[test]
fn test_short_write_and_read() {
    let dev = Device::new();
    let data = pattern(100);
    let position = (CHUNK_SIZE - 10) as u64;
    assert_eq!(dev.write_at(position, &data).unwrap(), 10);
    assert_eq!(dev.size(), CHUNK_SIZE as u64);
    assert!(!dev.is_allocated(1));

    dev.write_at(CHUNK_SIZE as u64, &data[10..]).unwrap();
    let mut buf = vec![0u8; 100];
    assert_eq!(dev.read_at(position, &mut buf).unwrap(), 10);
    assert_eq!(&buf[..10], &data[..10]);
}

#[test]
fn test_read_clamped_to_size() {
    let dev = Device::new();
    dev.write_at(0, &pattern(20)).unwrap();
    let mut buf = [0u8; 64];
    assert_eq!(dev.read_at(5, &mut buf).unwrap(), 15);
    assert_eq!(&buf[..15], &pattern(20)[5..]);
}

#[test]
fn test_monotonic_size() {
    let dev = Device::new();
    dev.write_at(1000, &[1; 24]).unwrap();
    assert_eq!(dev.size(), 1024);
    // Rewriting lower data never shrinks the high-water mark.
    dev.write_at(0, &[2; 8]).unwrap();
    assert_eq!(dev.size(), 1024);
    dev.write_at(1020, &[3; 10]).unwrap();
    assert_eq!(dev.size(), 1030);
}

#[test]
fn test_eof_semantics() {
    let dev = Device::new();
    let mut buf = [0u8; 16];
    assert_eq!(dev.read_at(0, &mut buf).unwrap(), 0);

    dev.write_at(0, &[9; 10]).unwrap();
    assert_eq!(dev.read_at(10, &mut buf).unwrap(), 0);
    assert_eq!(dev.read_at(11, &mut buf).unwrap(), 0);
    assert_eq!(dev.read_at(u64::MAX, &mut buf).unwrap(), 0);
}

#[test]
fn test_empty_write_does_not_allocate() {
    let dev = Device::new();
    assert_eq!(dev.write_at(4096, &[]).unwrap(), 0);
    assert_eq!(dev.size(), 0);
    assert_eq!(dev.allocated_chunks(), 0);
}

#[test]
fn test_sparse_write_leaves_hole() {
    init_logger();
    let dev = Device::new();
    dev.write_at(0, b"head").unwrap();
    dev.write_at(3 * CHUNK_SIZE as u64, b"tail").unwrap();
    assert_eq!(dev.size(), 3 * CHUNK_SIZE as u64 + 4);
    assert_eq!(dev.allocated_chunks(), 2);

    let mut buf = [0u8; 4];
    let position = CHUNK_SIZE as u64 + 3;
    assert_eq!(
        dev.read_at(position, &mut buf).unwrap_err(),
        Error::Hole { position }
    );
    // Both ends remain readable.
    assert_eq!(dev.read_at(0, &mut buf).unwrap(), 4);
    assert_eq!(&buf, b"head");
    assert_eq!(dev.read_at(3 * CHUNK_SIZE as u64, &mut buf).unwrap(), 4);
    assert_eq!(&buf, b"tail");
}

#[test]
fn test_allocation_failure_leaves_size() {
    let (allocator, _) = LimitedAllocator::new(1);
    let dev = Device::with_allocator(allocator);
    dev.write_at(0, &[1; 4]).unwrap();
    assert_eq!(
        dev.write_at(CHUNK_SIZE as u64, &[1; 4]).unwrap_err(),
        Error::ResourceExhausted
    );
    assert_eq!(dev.size(), 4);
    // Writes into the existing chunk still work.
    assert_eq!(dev.write_at(4, &[1; 4]).unwrap(), 4);
}

#[test]
fn test_clear() {
    let (allocator, stats) = LimitedAllocator::new(16);
    let dev = Device::with_allocator(allocator);
    dev.write_at(0, &pattern(3 * CHUNK_SIZE)[..CHUNK_SIZE]).unwrap();
    dev.write_at(CHUNK_SIZE as u64, &[7; 10]).unwrap();
    assert_eq!(dev.allocated_chunks(), 2);

    dev.clear();
    assert_eq!(dev.size(), 0);
    assert_eq!(dev.allocated_chunks(), 0);
    assert_eq!(stats.released(), 2);

    let mut buf = [0u8; 8];
    assert_eq!(dev.read_at(0, &mut buf).unwrap(), 0);
}

#[test]
fn test_resolve_seek() {
    let dev = Device::new();
    dev.write_at(0, &[0; 100]).unwrap();
    assert_eq!(dev.resolve_seek(40, -1, Whence::End).unwrap(), 99);
    assert_eq!(dev.resolve_seek(40, 10, Whence::Current).unwrap(), 50);
    assert_eq!(dev.resolve_seek(40, 7, Whence::Start).unwrap(), 7);
    assert_eq!(dev.resolve_seek(40, -1, Whence::Start).unwrap_err(), Error::OutOfRange);
    assert_eq!(dev.resolve_seek(40, -41, Whence::Current).unwrap_err(), Error::OutOfRange);
    assert_eq!(dev.resolve_seek(40, -101, Whence::End).unwrap_err(), Error::OutOfRange);
    // No upper bound at seek time.
    assert_eq!(
        dev.resolve_seek(0, CAPACITY as i64 * 2, Whence::Start).unwrap(),
        CAPACITY as u64 * 2
    );
}

#[test]
fn test_teardown_releases_chunks() {
    let (allocator, stats) = LimitedAllocator::new(16);
    let dev = Arc::new(Device::with_allocator(allocator));
    dev.write_at(0, &[1; 600]).unwrap();
    dev.write_at(512, &[1; 88]).unwrap();
    let session = dev.open(fourmb::OpenMode::ReadOnly);
    drop(dev);
    // The session keeps the device alive.
    assert_eq!(stats.released(), 0);
    drop(session);
    assert_eq!(stats.released(), 2);
}

#[test]
fn test_errno_mapping() {
    assert_eq!(Error::OutOfRange.errno(), fourmb::EINVAL);
    assert_eq!(Error::InvalidArgument.errno(), fourmb::EINVAL);
    assert_eq!(Error::Hole { position: 0 }.errno(), fourmb::EIO);
    assert_eq!(Error::ResourceExhausted.errno(), fourmb::ENOMEM);
    assert_eq!(Error::Unsupported(0).errno(), fourmb::ENOTTY);
}
