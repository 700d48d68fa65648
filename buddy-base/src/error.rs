//! The allocator's categorical error channel.
use spin::Mutex;

/// A domain error the allocator can recover from by returning `null`.
///
/// Corruption and misuse (an invalid pointer handed to `free`/`reallocate`)
/// are *not* represented here — those are fatal and abort the process
/// before ever touching the error channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// The requested size was zero or exceeded `MAX_BLOCK_SIZE - H`.
    InvalidArgument,
    /// No free block was available and the heap provider refused to grow.
    OutOfMemory,
}

/// A process-wide, lock-protected last-error slot.
///
/// Successful calls leave the slot unchanged; only a domain error updates
/// it. Encapsulated behind a lock (rather than a bare `static mut`) so that
/// an allocator instance, and its error slot, can be constructed fresh for
/// each test case.
#[derive(Debug, Default)]
pub struct LastError(Mutex<Option<AllocError>>);

impl LastError {
    /// Construct an empty error slot.
    pub const fn new() -> Self {
        Self(Mutex::new(None))
    }

    /// Record a domain error.
    pub fn set(&self, err: AllocError) {
        *self.0.lock() = Some(err);
    }

    /// Read the last recorded error without clearing it.
    pub fn peek(&self) -> Option<AllocError> {
        *self.0.lock()
    }

    /// Read and clear the last recorded error.
    pub fn take(&self) -> Option<AllocError> {
        self.0.lock().take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let e = LastError::new();
        assert_eq!(e.peek(), None);
    }

    #[test]
    fn set_then_take() {
        let e = LastError::new();
        e.set(AllocError::OutOfMemory);
        assert_eq!(e.peek(), Some(AllocError::OutOfMemory));
        assert_eq!(e.take(), Some(AllocError::OutOfMemory));
        assert_eq!(e.peek(), None);
    }
}
