use super::{contents, open, reader_for};
use crate::config::ReaderConfig;
use crate::io::MemoryProvider;
use crate::reader::TextBlock;

#[test]
fn mixed_terminators_with_unterminated_tail() {
    let mut reader = reader_for("a,1\nb,2\r\nc,3");

    let blocks = reader.poll(10).unwrap();

    assert_eq!(
        blocks,
        vec![
            TextBlock::new("a,1", 0, 4, 3),
            TextBlock::new("b,2", 4, 9, 3),
            TextBlock::new("c,3", 9, 12, 3),
        ]
    );
    assert_eq!(reader.position(), 12);
    assert!(!reader.remaining());
}

#[test]
fn blocks_are_contiguous_and_reconstruct_the_stream() {
    let data = "one\r\ntwo\n\nthree\rfour\n";
    let provider = MemoryProvider::from_string("mem", data).with_chunk_size(3);
    let mut reader = open(&provider, &ReaderConfig::default());

    let blocks = reader.poll(100).unwrap();

    assert_eq!(contents(&blocks), vec!["one", "two", "", "three", "four"]);
    assert_eq!(blocks[0].start_offset(), 0);
    for pair in blocks.windows(2) {
        assert_eq!(pair[0].end_offset(), pair[1].start_offset());
    }
    assert_eq!(blocks.last().unwrap().end_offset(), data.len() as u64);

    let mut rebuilt = String::new();
    for block in &blocks {
        let start = block.start_offset() as usize;
        let end = block.end_offset() as usize;
        assert_eq!(&data[start..start + block.length()], block.content());
        rebuilt.push_str(&data[start..end]);
    }
    assert_eq!(rebuilt, data);
    assert_eq!(blocks[3].terminator_len(), 1);
    assert_eq!(blocks[0].terminator_len(), 2);
}

#[test]
fn crlf_split_across_reads_is_one_terminator() {
    let provider = MemoryProvider::from_string("mem", "ab\r\ncd").with_chunk_size(3);
    let mut reader = open(&provider, &ReaderConfig::default());

    let blocks = reader.poll(10).unwrap();

    assert_eq!(
        blocks,
        vec![TextBlock::new("ab", 0, 4, 2), TextBlock::new("cd", 4, 6, 2)]
    );
}

#[test]
fn trailing_cr_waits_for_more_bytes() {
    let provider = MemoryProvider::from_string("mem", "ab\r");
    let config = ReaderConfig::default().with_auto_flush(false);
    let mut reader = open(&provider, &config);

    assert!(reader.poll(10).unwrap().is_empty());
    assert!(reader.remaining());
    assert_eq!(reader.position(), 0);

    provider.append("\ncd\n");
    let blocks = reader.poll(10).unwrap();

    assert_eq!(
        blocks,
        vec![TextBlock::new("ab", 0, 4, 2), TextBlock::new("cd", 4, 7, 2)]
    );
}

#[test]
fn trailing_cr_is_a_terminator_when_flushed() {
    let mut reader = reader_for("x\r");

    let blocks = reader.poll(10).unwrap();

    assert_eq!(blocks, vec![TextBlock::new("x", 0, 2, 1)]);
    assert_eq!(reader.position(), 2);
}

#[test]
fn buffer_grows_to_fit_long_lines() {
    let line = "x".repeat(50);
    let provider = MemoryProvider::from_string("mem", format!("{line}\n"));
    let config = ReaderConfig::default().with_initial_capacity(8);
    let mut reader = open(&provider, &config);

    let blocks = reader.poll(10).unwrap();

    assert_eq!(blocks, vec![TextBlock::new(line, 0, 51, 50)]);
    assert_eq!(reader.capacity(), 64);
}

#[test]
fn auto_flush_emits_unterminated_tail() {
    let mut reader = reader_for("x\ny");

    let blocks = reader.poll(10).unwrap();

    assert_eq!(contents(&blocks), vec!["x", "y"]);
    assert_eq!(blocks[1], TextBlock::new("y", 2, 3, 1));
    assert!(!reader.remaining());
}

#[test]
fn without_auto_flush_the_tail_stays_buffered() {
    let provider = MemoryProvider::from_string("mem", "x\ny");
    let config = ReaderConfig::default().with_auto_flush(false);
    let mut reader = open(&provider, &config);

    assert_eq!(contents(&reader.poll(10).unwrap()), vec!["x"]);
    assert!(reader.poll(10).unwrap().is_empty());
    assert!(reader.remaining());
    assert_eq!(reader.position(), 2);

    provider.append("z\n");
    assert_eq!(
        reader.poll(10).unwrap(),
        vec![TextBlock::new("yz", 2, 5, 2)]
    );
}

#[test]
fn forced_flush_emits_tail_regardless_of_auto_flush() {
    let provider = MemoryProvider::from_string("mem", "x\ny");
    let config = ReaderConfig::default().with_auto_flush(false);
    let mut reader = open(&provider, &config);
    reader.poll(10).unwrap();

    let blocks = reader.flush().unwrap();

    assert_eq!(blocks, vec![TextBlock::new("y", 2, 3, 1)]);
    assert!(!reader.remaining());
    assert!(reader.flush().unwrap().is_empty());
}

#[test]
fn poll_respects_max_records() {
    let mut reader = reader_for("1\n2\n3\n4\n");

    assert_eq!(contents(&reader.poll(2).unwrap()), vec!["1", "2"]);
    assert_eq!(reader.position(), 4);
    assert_eq!(contents(&reader.poll(2).unwrap()), vec!["3", "4"]);
    assert!(reader.poll(2).unwrap().is_empty());
    assert_eq!(reader.position(), 8);
}

#[test]
fn poll_zero_does_not_touch_the_source() {
    let mut reader = reader_for("a\n");

    assert!(reader.poll(0).unwrap().is_empty());
    assert!(!reader.remaining());
    assert!(reader.has_more());
    assert_eq!(contents(&reader.poll(1).unwrap()), vec!["a"]);
}

#[test]
fn appended_lines_show_up_on_next_poll() {
    let provider = MemoryProvider::from_string("mem", "a\n");
    let mut reader = open(&provider, &ReaderConfig::default());

    assert_eq!(contents(&reader.poll(10).unwrap()), vec!["a"]);
    assert!(!reader.has_more());

    provider.append("b\n");
    assert!(reader.has_more());
    assert_eq!(
        reader.poll(10).unwrap(),
        vec![TextBlock::new("b", 2, 4, 1)]
    );
}

#[test]
fn empty_source_yields_nothing() {
    let mut reader = reader_for("");

    assert!(reader.poll(10).unwrap().is_empty());
    assert!(!reader.remaining());
    assert_eq!(reader.position(), 0);
}
