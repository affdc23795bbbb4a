//! Tests for in-memory byte sources.

use crate::io::{ByteSource, MemoryProvider, SourceProvider};

#[test]
fn memory_source_reads_data() {
    let provider = MemoryProvider::from_string("id", "hello");
    let mut source = provider.open().expect("open in-memory source");

    let mut buf = [0u8; 16];
    let n = source.read(&mut buf).unwrap();

    assert_eq!(&buf[..n], b"hello");
    assert!(!source.ready().unwrap());
    assert_eq!(source.read(&mut buf).unwrap(), 0);
}

#[test]
fn appended_bytes_are_visible_to_open_sources() {
    let provider = MemoryProvider::from_string("id", "ab");
    let mut source = provider.open().unwrap();
    let mut buf = [0u8; 8];
    source.read(&mut buf).unwrap();
    assert!(!source.ready().unwrap());

    provider.append("cd");

    assert!(source.ready().unwrap());
    let n = source.read(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"cd");
    assert_eq!(provider.len(), 4);
}

#[test]
fn chunk_size_limits_each_read() {
    let provider = MemoryProvider::from_string("id", "abcdefg").with_chunk_size(3);
    let mut source = provider.open().unwrap();
    let mut buf = [0u8; 16];

    assert_eq!(source.read(&mut buf).unwrap(), 3);
    assert_eq!(source.read(&mut buf).unwrap(), 3);
    assert_eq!(source.read(&mut buf).unwrap(), 1);
}

#[test]
fn skip_is_bounded_by_available_bytes() {
    let provider = MemoryProvider::from_string("id", "abcdef");
    let mut source = provider.open().unwrap();

    assert_eq!(source.skip(4).unwrap(), 4);
    assert_eq!(source.skip(10).unwrap(), 2);
    assert_eq!(source.skip(1).unwrap(), 0);

    source.rewind().unwrap();
    let mut buf = [0u8; 2];
    source.read(&mut buf).unwrap();
    assert_eq!(&buf, b"ab");
}

#[test]
fn closed_source_is_not_ready_and_rejects_reads() {
    let provider = MemoryProvider::from_string("id", "abc");
    let mut source = provider.open().unwrap();
    source.close().unwrap();
    source.close().unwrap();

    assert!(!source.ready().unwrap());
    let mut buf = [0u8; 4];
    assert!(source.read(&mut buf).is_err());
}
