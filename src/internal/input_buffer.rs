//! Module with the input buffer of a scanner.
//!
//! The buffer is a byte arena that is filled from the input source on demand. All positions are
//! offsets into the arena, so growing the arena never invalidates a position. Offsets only change
//! when consumed bytes are discarded by [`InputBuffer::compact`], which reports the shift to the
//! caller.

use std::io::{ErrorKind, Read};

use log::debug;

use crate::{LexError, LexErrorKind, Result};

/// The default number of bytes requested from the source per refill.
pub(crate) const DEFAULT_READ_SIZE: usize = 8192;

/// The settings of an input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BufferConfig {
    /// Refill line by line instead of in chunks.
    pub(crate) interactive: bool,
    /// Chunk size of a refill.
    pub(crate) read_size: usize,
    /// Capacity allocated up front.
    pub(crate) initial_capacity: usize,
    /// Upper limit of the capacity.
    pub(crate) max_capacity: Option<usize>,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            interactive: false,
            read_size: DEFAULT_READ_SIZE,
            initial_capacity: DEFAULT_READ_SIZE + 1,
            max_capacity: None,
        }
    }
}

/// A byte temporarily replaced by a terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HeldByte {
    offset: usize,
    byte: u8,
}

/// Invariant: `cursor <= filled < capacity`. The slot at `filled` is always available so that a
/// terminator can be placed directly behind the data.
pub(crate) struct InputBuffer<R> {
    source: R,
    data: Vec<u8>,
    filled: usize,
    cursor: usize,
    config: BufferConfig,
}

impl<R: Read> InputBuffer<R> {
    pub(crate) fn new(source: R, config: BufferConfig) -> Result<Self> {
        let mut buffer = Self {
            source,
            data: Vec::new(),
            filled: 0,
            cursor: 0,
            config: BufferConfig {
                read_size: config.read_size.max(1),
                ..config
            },
        };
        buffer.ensure_capacity(config.initial_capacity.max(1))?;
        Ok(buffer)
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub(crate) fn read_size(&self) -> usize {
        self.config.read_size
    }

    #[cfg(test)]
    pub(crate) fn filled(&self) -> usize {
        self.filled
    }

    /// Returns the bytes in `start..end`, clamped to the filled part.
    #[inline]
    pub(crate) fn slice(&self, start: usize, end: usize) -> &[u8] {
        let end = end.min(self.filled);
        &self.data[start.min(end)..end]
    }

    /// Returns the byte at `offset` if it has been read from the source.
    #[inline]
    pub(crate) fn byte_at(&self, offset: usize) -> Option<u8> {
        (offset < self.filled).then(|| self.data[offset])
    }

    /// Reads the next byte, refilling from the source when all buffered bytes are consumed.
    /// Returns `None` at the end of the input.
    pub(crate) fn read_char(&mut self) -> Result<Option<u8>> {
        if self.cursor >= self.filled && self.refill()? == 0 {
            return Ok(None);
        }
        let byte = self.data[self.cursor];
        self.cursor += 1;
        Ok(Some(byte))
    }

    /// Steps back one byte. Does nothing at the start of the buffer.
    #[inline]
    pub(crate) fn unread_char(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    /// Moves the cursor to an already buffered offset.
    #[inline]
    pub(crate) fn rewind_to(&mut self, offset: usize) {
        debug_assert!(offset <= self.filled);
        self.cursor = offset.min(self.filled);
    }

    /// Grows the arena to at least `min` bytes, doubling the capacity until it fits.
    /// Existing bytes keep their offsets.
    pub(crate) fn ensure_capacity(&mut self, min: usize) -> Result<()> {
        let old_capacity = self.data.len();
        if old_capacity >= min {
            return Ok(());
        }
        let alloc_failure = || LexError::new(LexErrorKind::AllocationFailure { requested: min });
        let mut new_capacity = old_capacity.max(1);
        while new_capacity < min {
            new_capacity = new_capacity.checked_mul(2).ok_or_else(alloc_failure)?;
        }
        if let Some(max) = self.config.max_capacity {
            if min > max {
                return Err(alloc_failure());
            }
            new_capacity = new_capacity.min(max);
        }
        self.data
            .try_reserve_exact(new_capacity - old_capacity)
            .map_err(|_| alloc_failure())?;
        self.data.resize(new_capacity, 0);
        debug!(
            "Grew input buffer from {} to {} bytes",
            old_capacity, new_capacity
        );
        Ok(())
    }

    /// Inserts `byte` at the cursor so that it is the next byte read.
    pub(crate) fn insert_at_cursor(&mut self, byte: u8) -> Result<()> {
        self.ensure_capacity(self.filled + 2)?;
        self.data.copy_within(self.cursor..self.filled, self.cursor + 1);
        self.data[self.cursor] = byte;
        self.filled += 1;
        Ok(())
    }

    /// Overwrites the byte at `offset` with a terminator and returns what was there.
    pub(crate) fn mark_boundary(&mut self, offset: usize) -> Option<HeldByte> {
        let slot = self.data.get_mut(offset)?;
        let held = HeldByte {
            offset,
            byte: *slot,
        };
        *slot = 0;
        Some(held)
    }

    /// Puts back a byte saved by [`InputBuffer::mark_boundary`].
    pub(crate) fn restore_boundary(&mut self, held: HeldByte) {
        if let Some(slot) = self.data.get_mut(held.offset) {
            *slot = held.byte;
        }
    }

    /// Discards the bytes before `keep_from` if that is worthwhile and returns the number of
    /// discarded bytes. All offsets held by the caller must be reduced by the returned shift.
    pub(crate) fn compact(&mut self, keep_from: usize) -> usize {
        let keep_from = keep_from.min(self.cursor);
        if keep_from == 0 || (keep_from < self.config.read_size && self.cursor < self.filled) {
            return 0;
        }
        self.data.copy_within(keep_from..self.filled, 0);
        self.filled -= keep_from;
        self.cursor -= keep_from;
        debug!(
            "Discarded {} consumed bytes, {} bytes remain buffered",
            keep_from, self.filled
        );
        keep_from
    }

    /// Switches to a new source and drops all buffered bytes.
    pub(crate) fn reset(&mut self, source: R) {
        self.source = source;
        self.filled = 0;
        self.cursor = 0;
    }

    // Appends bytes from the source behind the filled part and returns their number.
    fn refill(&mut self) -> Result<usize> {
        if self.config.interactive {
            let mut count = 0;
            loop {
                self.ensure_capacity(self.filled + 2)?;
                let read = read_retrying(
                    &mut self.source,
                    &mut self.data[self.filled..self.filled + 1],
                )?;
                if read == 0 {
                    break;
                }
                self.filled += 1;
                count += 1;
                if self.data[self.filled - 1] == b'\n' {
                    break;
                }
            }
            Ok(count)
        } else {
            let read_size = self.config.read_size;
            self.ensure_capacity(self.filled + read_size + 1)?;
            let read = read_retrying(
                &mut self.source,
                &mut self.data[self.filled..self.filled + read_size],
            )?;
            self.filled += read;
            Ok(read)
        }
    }
}

fn read_retrying<R: Read>(source: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    loop {
        match source.read(buf) {
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            result => return result,
        }
    }
}

impl<R> std::fmt::Debug for InputBuffer<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputBuffer")
            .field("capacity", &self.data.len())
            .field("filled", &self.filled)
            .field("cursor", &self.cursor)
            .finish()
    }
}
