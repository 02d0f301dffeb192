//! Error type for tileset operations.

use std::fmt;

/// Error returned by fallible tileset operations.
///
/// Every failure is reported synchronously through a `Result`; no operation
/// retries or logs internally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A caller-supplied argument was rejected before any state changed
    /// (negative codepoint, out-of-range tile id, wrong-length pixel block,
    /// non-positive geometry). The message names the offending argument.
    InvalidArgument(&'static str),
    /// Growing the pixel arena or the charmap failed to allocate. The
    /// structure that failed to grow is left unchanged.
    Allocation,
    /// The codepoint has no tile mapped for a read.
    NotFound,
    /// A change-notification hook aborted `set_tile` with this status.
    /// Observers visited before the aborting one stay notified.
    ObserverAbort(i32),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(what) => write!(f, "invalid argument: {what}"),
            Error::Allocation => write!(f, "allocation failure while growing tileset storage"),
            Error::NotFound => write!(f, "no tile mapped for codepoint"),
            Error::ObserverAbort(status) => {
                write!(f, "change observer aborted notification with status {status}")
            }
        }
    }
}

impl std::error::Error for Error {}
