/// A non-fatal condition observed while encoding.
///
/// Diagnostics never abort an encode. The writer substitutes a safe value and keeps going.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Diagnostic {
    /// A text write received a null string and wrote an empty string instead.
    NullString {
        /// Name of the writer method that received the null string.
        operation: &'static str,
    },
}

impl core::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NullString { operation } => {
                write!(f, "Attempted to {operation}() with null value")
            }
        }
    }
}

/// Receives diagnostics from a [`SpanWriter`](crate::SpanWriter).
///
/// Any `FnMut(Diagnostic)` closure is a sink, which is convenient for collecting diagnostics in
/// tests.
pub trait DiagnosticSink {
    /// Called once for each diagnostic.
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the `log` crate, at `warn` level with target `"network"`.
#[derive(Copy, Clone, Default, Debug)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        log::warn!(target: "network", "{diagnostic}");
    }
}

/// Discards all diagnostics.
#[derive(Copy, Clone, Default, Debug)]
pub struct Silent;

impl DiagnosticSink for Silent {
    fn report(&mut self, _diagnostic: Diagnostic) {}
}

impl<F: FnMut(Diagnostic)> DiagnosticSink for F {
    fn report(&mut self, diagnostic: Diagnostic) {
        self(diagnostic)
    }
}
