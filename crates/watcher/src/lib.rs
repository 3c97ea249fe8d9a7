//! File system watching and burst debouncing for Settle
//!
//! Two pieces make up this crate:
//! - [`source`]: a recursive `notify` watch reduced to qualifying changes
//!   (directory-level noise stripped out) and delivered over a channel
//! - [`debounce`]: the state machine that decides when a burst of changes
//!   has settled and the action should run, exactly once per burst

pub mod debounce;
pub mod source;

use std::path::PathBuf;
use std::time::Instant;

pub use debounce::{DebounceState, Phase, DEFAULT_POLL_INTERVAL, DEFAULT_QUIET_THRESHOLD};
pub use source::{EventSource, SourceError};

/// One qualifying file system change.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    /// Path that changed
    pub path: PathBuf,
    /// What happened to it. Carried for diagnostics; every kind advances the
    /// debounce state the same way.
    pub kind: ChangeKind,
    /// Arrival time, stamped in the watch callback so quiet time is measured
    /// from delivery rather than from when the poll loop drained the channel.
    pub at: Instant,
}

/// Type of qualifying change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// File created
    Created,
    /// File deleted
    Removed,
    /// File renamed or moved
    Moved,
    /// File content written, including close-after-write
    Written,
}
