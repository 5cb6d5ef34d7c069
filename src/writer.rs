use crate::diagnostics::{Diagnostic, DiagnosticSink, LogSink};

/// Result type for the `write_*` functions of `SpanWriter`.
pub type Result<T> = core::result::Result<T, WriterError>;

/// Controls what happens to the terminator slot of a null-terminated text field.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum TerminatorPolicy {
    /// The terminator slot is skipped over but not written. The field is only correctly
    /// terminated if the buffer was zeroed before the encode started. This matches the layout
    /// produced by existing servers byte for byte.
    #[default]
    Reserve,

    /// The terminator bytes are written as zeros. Use this when buffers are reused across
    /// messages without being cleared.
    Zero,
}

/// Writes big-endian binary values and text into a borrowed, fixed-capacity buffer.
///
/// The writer keeps two offsets:
///
/// * `position` is where the next write goes.
/// * `written_count` is the largest offset `position` has ever reached. The exported region is
///   always `[0, written_count)`, no matter where `position` currently is.
///
/// Moving `position` backward and writing again overwrites earlier bytes ("backpatching")
/// without shrinking the exported region.
///
/// Fixed-width writes are all-or-nothing. If a value does not fit in the remaining space, the
/// write fails with [`WriterError::Overflow`] and neither the buffer nor the cursor is modified.
/// The exception is [`write_bytes`](Self::write_bytes), which copies as much as fits.
pub struct SpanWriter<'a, D = LogSink> {
    buf: &'a mut [u8],
    position: usize,
    written: usize,
    terminators: TerminatorPolicy,
    sink: D,
}

impl<'a> SpanWriter<'a, LogSink> {
    /// Binds a writer to `buf`. Diagnostics are sent to the `log` crate.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self::with_sink(buf, LogSink)
    }
}

impl<'a, D: DiagnosticSink> SpanWriter<'a, D> {
    /// Binds a writer to `buf`, sending diagnostics to `sink`.
    pub fn with_sink(buf: &'a mut [u8], sink: D) -> Self {
        Self {
            buf,
            position: 0,
            written: 0,
            terminators: TerminatorPolicy::Reserve,
            sink,
        }
    }

    /// Sets the policy used for the terminator slot of null-terminated text.
    pub fn with_terminators(mut self, policy: TerminatorPolicy) -> Self {
        self.terminators = policy;
        self
    }

    /// The policy used for the terminator slot of null-terminated text.
    pub fn terminators(&self) -> TerminatorPolicy {
        self.terminators
    }

    /// Total length of the bound buffer.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Offset of the next write.
    #[inline(always)]
    pub fn position(&self) -> usize {
        self.position
    }

    /// The largest offset the cursor has reached. This is the length of the exported region.
    #[inline(always)]
    pub fn written_count(&self) -> usize {
        self.written
    }

    /// Number of bytes between the cursor and the end of the buffer.
    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.position
    }

    /// Moves the cursor to `position`.
    ///
    /// Moving forward past `written_count` extends it. Moving backward leaves it alone.
    pub fn set_position(&mut self, position: usize) -> Result<()> {
        if position > self.buf.len() {
            return Err(WriterError::PositionOutOfRange {
                requested: position,
                capacity: self.buf.len(),
            });
        }
        self.move_cursor(position);
        Ok(())
    }

    /// Moves the cursor by `delta` bytes, relative to the current position.
    pub fn seek(&mut self, delta: isize) -> Result<()> {
        match self.position.checked_add_signed(delta) {
            Some(target) if target <= self.buf.len() => {
                self.move_cursor(target);
                Ok(())
            }
            _ => Err(WriterError::SeekOutOfRange {
                position: self.position,
                delta,
                capacity: self.buf.len(),
            }),
        }
    }

    /// Skips over `len` bytes without writing them and returns the offset where they start.
    ///
    /// Pair this with [`write_u16_at`](Self::write_u16_at) or
    /// [`write_u32_at`](Self::write_u32_at) to fill in a length prefix once the rest of the
    /// message is known.
    pub fn reserve(&mut self, len: usize) -> Result<usize> {
        let start = self.position;
        self.claim(len)?;
        Ok(start)
    }

    /// Writes a small, fixed-size array of bytes.
    #[inline(always)]
    pub fn write_cbytes<const N: usize>(&mut self, value: [u8; N]) -> Result<()> {
        self.claim(N)?.copy_from_slice(&value);
        Ok(())
    }

    /// Writes a small, fixed-size array of bytes at `offset`, without moving the cursor.
    ///
    /// `written_count` is extended if the array ends beyond it.
    pub fn write_cbytes_at<const N: usize>(&mut self, offset: usize, value: [u8; N]) -> Result<()> {
        let end = match offset.checked_add(N) {
            Some(end) if end <= self.buf.len() => end,
            _ => return Err(self.overflow(offset, N)),
        };
        self.buf[offset..end].copy_from_slice(&value);
        if end > self.written {
            self.written = end;
        }
        Ok(())
    }

    /// Writes a `u16` in big-endian byte order at `offset`, without moving the cursor.
    pub fn write_u16_at(&mut self, offset: usize, value: u16) -> Result<()> {
        self.write_cbytes_at(offset, value.to_be_bytes())
    }

    /// Writes a `u32` in big-endian byte order at `offset`, without moving the cursor.
    pub fn write_u32_at(&mut self, offset: usize, value: u32) -> Result<()> {
        self.write_cbytes_at(offset, value.to_be_bytes())
    }

    /// Copies as much of `bytes` as fits in the remaining space and returns the number of bytes
    /// copied.
    ///
    /// This never fails. Callers that cannot accept a partial copy should compare the returned
    /// count with `bytes.len()`.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> usize {
        let size = bytes.len().min(self.remaining());
        let start = self.position;
        self.buf[start..start + size].copy_from_slice(&bytes[..size]);
        self.move_cursor(start + size);
        size
    }

    /// Writes `count` copies of `byte`.
    pub fn fill(&mut self, byte: u8, count: usize) -> Result<()> {
        self.claim(count)?.fill(byte);
        Ok(())
    }

    /// Writes a `bool` as a single byte. True is encoded as 1. False is encoded as 0.
    ///
    /// A Rust `bool` is always 0 or 1 in memory, so this is also its raw byte.
    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_u8(value as u8)
    }

    /// Writes a single `u8` value
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.write_cbytes([value])
    }

    /// Writes a single `i8` value
    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        self.write_cbytes([value as u8])
    }

    /// Writes a single `u16` value in big-endian byte order.
    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.write_cbytes(value.to_be_bytes())
    }

    /// Writes a single `i16` value in big-endian byte order.
    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        self.write_cbytes(value.to_be_bytes())
    }

    /// Writes a single `u32` value in big-endian byte order.
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write_cbytes(value.to_be_bytes())
    }

    /// Writes a single `i32` value in big-endian byte order.
    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.write_cbytes(value.to_be_bytes())
    }

    /// Writes a single `u64` value in big-endian byte order.
    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.write_cbytes(value.to_be_bytes())
    }

    /// Writes a single `i64` value in big-endian byte order.
    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.write_cbytes(value.to_be_bytes())
    }

    /// The written region, `[0, written_count)`. This does not copy.
    pub fn span(&self) -> &[u8] {
        &self.buf[..self.written]
    }

    /// The written region, mutably.
    pub fn span_mut(&mut self) -> &mut [u8] {
        &mut self.buf[..self.written]
    }

    /// The written region as a `BStr`, which is handy for `Debug` output of text-heavy messages.
    #[cfg(feature = "bstr")]
    pub fn as_bstr(&self) -> &bstr::BStr {
        bstr::BStr::new(self.span())
    }

    /// Copies the whole written region to the start of `destination` and returns its length.
    ///
    /// This does not change the writer, so it can be called any number of times.
    pub fn copy_to(&self, destination: &mut [u8]) -> Result<usize> {
        self.copy_to_count(destination, self.written)
    }

    /// Copies the first `min(count, written_count)` bytes of the written region to the start of
    /// `destination` and returns the number of bytes copied.
    pub fn copy_to_count(&self, destination: &mut [u8], count: usize) -> Result<usize> {
        let len = count.min(self.written);
        if destination.len() < len {
            return Err(WriterError::DestinationTooSmall {
                needed: len,
                available: destination.len(),
            });
        }
        destination[..len].copy_from_slice(&self.buf[..len]);
        Ok(len)
    }

    /// Ends the encode session and returns the written region with the buffer's lifetime.
    pub fn into_written(self) -> &'a mut [u8] {
        let Self { buf, written, .. } = self;
        &mut buf[..written]
    }

    /// Advances the cursor by `len` bytes and returns the slice it passed over.
    ///
    /// Fails, without moving the cursor, if fewer than `len` bytes remain.
    pub(crate) fn claim(&mut self, len: usize) -> Result<&mut [u8]> {
        let start = self.position;
        let end = match start.checked_add(len) {
            Some(end) if end <= self.buf.len() => end,
            _ => return Err(self.overflow(start, len)),
        };
        self.move_cursor(end);
        Ok(&mut self.buf[start..end])
    }

    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        self.sink.report(diagnostic);
    }

    fn move_cursor(&mut self, position: usize) {
        self.position = position;
        if position > self.written {
            self.written = position;
        }
    }

    fn overflow(&self, position: usize, needed: usize) -> WriterError {
        log::debug!(
            "write of {needed} bytes at offset {position} overflows buffer of {} bytes",
            self.buf.len()
        );
        WriterError::Overflow {
            position,
            needed,
            capacity: self.buf.len(),
        }
    }
}

impl<D> core::fmt::Debug for SpanWriter<'_, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpanWriter")
            .field("capacity", &self.buf.len())
            .field("position", &self.position)
            .field("written_count", &self.written)
            .field("terminators", &self.terminators)
            .finish()
    }
}

/// Writes go through the clamped [`SpanWriter::write_bytes`] path, the same way `&mut [u8]`
/// implements `Write`. A full buffer returns `Ok(0)`.
#[cfg(feature = "std")]
impl<D: DiagnosticSink> std::io::Write for SpanWriter<'_, D> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        Ok(self.write_bytes(buf))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Error type for the `write_*` functions of `SpanWriter`.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum WriterError {
    /// A write needed more bytes than the buffer has left. The message being encoded does not
    /// fit in its buffer and should be dropped.
    Overflow {
        /// Offset where the write would have started.
        position: usize,
        /// Number of bytes the write needed.
        needed: usize,
        /// Capacity of the buffer.
        capacity: usize,
    },

    /// `set_position` was asked to move the cursor past the end of the buffer.
    PositionOutOfRange {
        /// The requested position.
        requested: usize,
        /// Capacity of the buffer.
        capacity: usize,
    },

    /// `seek` was asked to move the cursor before the start or past the end of the buffer.
    SeekOutOfRange {
        /// Cursor position before the seek.
        position: usize,
        /// The requested relative move.
        delta: isize,
        /// Capacity of the buffer.
        capacity: usize,
    },

    /// An export destination is shorter than the data being copied into it.
    DestinationTooSmall {
        /// Number of bytes to copy.
        needed: usize,
        /// Length of the destination.
        available: usize,
    },
}

impl core::error::Error for WriterError {}

impl core::fmt::Display for WriterError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Overflow {
                position,
                needed,
                capacity,
            } => write!(
                f,
                "Writing {needed} bytes at offset {position} overflows a buffer of {capacity} bytes"
            ),
            Self::PositionOutOfRange {
                requested,
                capacity,
            } => write!(
                f,
                "Position {requested} is past the end of a buffer of {capacity} bytes"
            ),
            Self::SeekOutOfRange {
                position,
                delta,
                capacity,
            } => write!(
                f,
                "Seeking {delta} bytes from offset {position} moves outside a buffer of {capacity} bytes"
            ),
            Self::DestinationTooSmall { needed, available } => write!(
                f,
                "Destination holds {available} bytes but {needed} bytes must be copied"
            ),
        }
    }
}
