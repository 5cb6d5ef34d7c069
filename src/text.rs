//! Text encoding for [`SpanWriter`].
//!
//! Lengths are counted in UTF-16 code units for every mode, so a string takes the same number
//! of character slots whether it is written as ASCII or as UTF-16. ASCII modes write one byte per
//! code unit, and code units outside `0..=0x7F` are written as `?`.
//!
//! Null-terminated modes reserve a terminator slot after the text (1 byte for ASCII, 2 bytes for
//! UTF-16). Whether that slot is written depends on the writer's [`TerminatorPolicy`].
//! Fixed-length modes write at most `size` characters and never pad.
//!
//! String arguments accept `&str` or `Option<&str>`. `None` is written as an empty string and
//! reported to the writer's [`DiagnosticSink`].

use zerocopy::byteorder::{ByteOrder, BE, LE, U16};
use zerocopy::IntoBytes;

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::writer::{Result, SpanWriter, TerminatorPolicy};

impl<D: DiagnosticSink> SpanWriter<'_, D> {
    /// Writes a string as ASCII, one byte per character, with no terminator.
    pub fn write_ascii<'s>(&mut self, value: impl Into<Option<&'s str>>) -> Result<()> {
        let value = self.or_empty(value.into(), "write_ascii");
        let out = self.claim(utf16_len(value))?;
        encode_ascii(out, value);
        Ok(())
    }

    /// Writes at most `size` characters of a string as ASCII.
    ///
    /// Longer strings are truncated. Shorter strings are not padded: the cursor advances by the
    /// string's length only.
    pub fn write_ascii_fixed<'s>(
        &mut self,
        value: impl Into<Option<&'s str>>,
        size: usize,
    ) -> Result<()> {
        let value = self.or_empty(value.into(), "write_ascii_fixed");
        let out = self.claim(size.min(utf16_len(value)))?;
        encode_ascii(out, value);
        Ok(())
    }

    /// Writes a string as ASCII, followed by a 1-byte terminator slot.
    pub fn write_ascii_null<'s>(&mut self, value: impl Into<Option<&'s str>>) -> Result<()> {
        let value = self.or_empty(value.into(), "write_ascii_null");
        let len = utf16_len(value);
        let zero = self.terminators() == TerminatorPolicy::Zero;
        let (text, terminator) = self.claim(len + 1)?.split_at_mut(len);
        encode_ascii(text, value);
        if zero {
            terminator.fill(0);
        }
        Ok(())
    }

    /// Writes a string as little-endian UTF-16, followed by a 2-byte terminator slot.
    pub fn write_utf16le_null<'s>(&mut self, value: impl Into<Option<&'s str>>) -> Result<()> {
        self.utf16_null::<LE>(value.into(), "write_utf16le_null")
    }

    /// Writes at most `size` characters of a string as little-endian UTF-16, without padding.
    pub fn write_utf16le_fixed<'s>(
        &mut self,
        value: impl Into<Option<&'s str>>,
        size: usize,
    ) -> Result<()> {
        self.utf16_fixed::<LE>(value.into(), size, "write_utf16le_fixed")
    }

    /// Writes a string as big-endian UTF-16, followed by a 2-byte terminator slot.
    pub fn write_utf16be_null<'s>(&mut self, value: impl Into<Option<&'s str>>) -> Result<()> {
        self.utf16_null::<BE>(value.into(), "write_utf16be_null")
    }

    /// Writes at most `size` characters of a string as big-endian UTF-16, without padding.
    pub fn write_utf16be_fixed<'s>(
        &mut self,
        value: impl Into<Option<&'s str>>,
        size: usize,
    ) -> Result<()> {
        self.utf16_fixed::<BE>(value.into(), size, "write_utf16be_fixed")
    }

    /// Writes a string as UTF-16 in byte order `O`, followed by a 2-byte terminator slot.
    ///
    /// No byte-order mark is written.
    pub fn write_utf16_null<'s, O: ByteOrder>(
        &mut self,
        value: impl Into<Option<&'s str>>,
    ) -> Result<()> {
        self.utf16_null::<O>(value.into(), "write_utf16_null")
    }

    /// Writes at most `size` characters of a string as UTF-16 in byte order `O`, without padding.
    pub fn write_utf16_fixed<'s, O: ByteOrder>(
        &mut self,
        value: impl Into<Option<&'s str>>,
        size: usize,
    ) -> Result<()> {
        self.utf16_fixed::<O>(value.into(), size, "write_utf16_fixed")
    }

    fn utf16_null<O: ByteOrder>(
        &mut self,
        value: Option<&str>,
        operation: &'static str,
    ) -> Result<()> {
        let value = self.or_empty(value, operation);
        let len = utf16_len(value) * 2;
        let zero = self.terminators() == TerminatorPolicy::Zero;
        let (text, terminator) = self.claim(len + 2)?.split_at_mut(len);
        encode_utf16::<O>(text, value);
        if zero {
            terminator.fill(0);
        }
        Ok(())
    }

    fn utf16_fixed<O: ByteOrder>(
        &mut self,
        value: Option<&str>,
        size: usize,
        operation: &'static str,
    ) -> Result<()> {
        let value = self.or_empty(value, operation);
        let out = self.claim(size.min(utf16_len(value)) * 2)?;
        encode_utf16::<O>(out, value);
        Ok(())
    }

    fn or_empty<'s>(&mut self, value: Option<&'s str>, operation: &'static str) -> &'s str {
        match value {
            Some(value) => value,
            None => {
                self.report(Diagnostic::NullString { operation });
                ""
            }
        }
    }
}

fn utf16_len(value: &str) -> usize {
    value.encode_utf16().count()
}

/// Fills `out` with the leading code units of `value`, one byte each.
fn encode_ascii(out: &mut [u8], value: &str) {
    for (slot, unit) in out.iter_mut().zip(value.encode_utf16()) {
        *slot = if unit < 0x80 { unit as u8 } else { b'?' };
    }
}

/// Fills `out` with the leading code units of `value`, two bytes each.
fn encode_utf16<O: ByteOrder>(out: &mut [u8], value: &str) {
    for (slot, unit) in out.chunks_exact_mut(2).zip(value.encode_utf16()) {
        slot.copy_from_slice(U16::<O>::new(unit).as_bytes());
    }
}
