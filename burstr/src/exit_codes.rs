#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// The run completed. Failed attempts are part of the result, not an error.
    Success = 0,

    /// Invalid CLI/config (bad flags, invalid durations, bad target URLs, etc.).
    InvalidInput = 30,

    /// Internal/runtime error (IO errors, unexpected invariants).
    RuntimeError = 40,
}

impl ExitCode {
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}
