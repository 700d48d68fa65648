//! The diagnostics-sink collaborator: debug narration, nothing more.
use core::fmt::Arguments;

/// Receives debug narration from the allocator.
///
/// None of the allocators in the ALARM family reach for a logging crate this
/// close to the metal, so this stays a bare trait rather than pulling in
/// `log`'s macro/formatting machinery: implementors decide what, if
/// anything, happens with a line of narration.
pub trait DiagnosticsSink {
    /// Receive one line of debug narration.
    fn trace(&mut self, args: Arguments<'_>);
}

/// A `DiagnosticsSink` that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticsSink for NullSink {
    #[inline]
    fn trace(&mut self, _args: Arguments<'_>) {}
}

/// Narrate through a [`DiagnosticsSink`], in the same spirit as `log::trace!`.
#[macro_export]
macro_rules! trace {
    ($sink:expr, $($arg:tt)+) => {
        $crate::DiagnosticsSink::trace(&mut $sink, format_args!($($arg)+))
    };
}
