// WHY: Type-safe offsets so byte and char positions never get mixed up
// The engine slices in bytes but reports offsets to callers in chars

use thiserror::Error;

/// 0-based byte position in source text
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub struct BytePos(pub usize);

/// 0-based character (Unicode scalar value) position in source text
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub struct CharPos(pub usize);

impl From<BytePos> for usize {
    fn from(pos: BytePos) -> Self {
        pos.0
    }
}

impl From<CharPos> for usize {
    fn from(pos: CharPos) -> Self {
        pos.0
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PositionError {
    #[error("cannot seek backwards: current {current} > target {target}")]
    Backwards { current: usize, target: usize },
    #[error("target byte position {target} exceeds text length {len}")]
    OutOfBounds { target: usize, len: usize },
    #[error("byte position {0} is not on a char boundary")]
    NotCharBoundary(usize),
}

/// Forward-only byte-to-char converter
/// WHY: highlights are converted in ascending order, so one pass over the text suffices
#[derive(Debug)]
pub struct PositionTracker<'a> {
    text: &'a str,
    byte_pos: usize,
    char_pos: usize,
}

impl<'a> PositionTracker<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            byte_pos: 0,
            char_pos: 0,
        }
    }

    /// Advance to `target`, counting the chars crossed on the way
    pub fn advance_to_byte(&mut self, target: BytePos) -> Result<CharPos, PositionError> {
        if target.0 < self.byte_pos {
            return Err(PositionError::Backwards {
                current: self.byte_pos,
                target: target.0,
            });
        }
        if target.0 > self.text.len() {
            return Err(PositionError::OutOfBounds {
                target: target.0,
                len: self.text.len(),
            });
        }
        let crossed = self
            .text
            .get(self.byte_pos..target.0)
            .ok_or(PositionError::NotCharBoundary(target.0))?;

        self.char_pos += crossed.chars().count();
        self.byte_pos = target.0;
        Ok(CharPos(self.char_pos))
    }
}
