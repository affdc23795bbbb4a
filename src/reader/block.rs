use serde::Serialize;

/// One extracted line together with the byte span it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextBlock {
    content: String,
    start_offset: u64,
    end_offset: u64,
    length: usize,
}

impl TextBlock {
    pub fn new(content: impl Into<String>, start_offset: u64, end_offset: u64, length: usize) -> Self {
        debug_assert!(end_offset >= start_offset + length as u64);
        Self {
            content: content.into(),
            start_offset,
            end_offset,
            length,
        }
    }

    /// Decoded line text, terminator stripped.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Absolute offset of the first byte of the line.
    pub fn start_offset(&self) -> u64 {
        self.start_offset
    }

    /// Absolute offset just past the terminator; the offset to resume from.
    pub fn end_offset(&self) -> u64 {
        self.end_offset
    }

    /// Byte length of the line without its terminator.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Number of terminator bytes consumed after the content.
    pub fn terminator_len(&self) -> u64 {
        self.end_offset - self.start_offset - self.length as u64
    }

    pub fn into_content(self) -> String {
        self.content
    }
}
