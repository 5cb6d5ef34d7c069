//! Encodes outgoing wire-protocol messages into a caller-supplied, fixed-capacity buffer.
//!
//! A [`SpanWriter`] borrows a byte slice for the duration of one message encode. It tracks a
//! write cursor and a high-water mark ("written count"), so callers can move the cursor back to
//! patch earlier fields (a length prefix, for example) without shrinking the exported region.
//!
//! Multi-byte integers are always big-endian. Text can be written as single-byte ASCII or as
//! UTF-16 in either byte order, with fixed-length or null-terminated layouts.
//!
//! The writer never allocates and never grows its buffer.

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![forbid(unsafe_code)]
#![forbid(unused_must_use)]
#![warn(missing_docs)]

mod diagnostics;
mod text;
mod writer;


pub use diagnostics::{Diagnostic, DiagnosticSink, LogSink, Silent};
pub use writer::{Result, SpanWriter, TerminatorPolicy, WriterError};
