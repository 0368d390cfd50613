//! Remote quote sync.
//!
//! # Responsibility
//! - Fetch a small remote list and convert it into quote records.
//! - Merge remote quotes into the local store without touching local entries.
//! - Run the fetch+merge periodically as a stoppable, single-flight task.
//!
//! # Invariants
//! - The store lock is never held across a fetch.
//! - Remote failures are reported through status, never fatal.

use crate::store::quote_store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod merge;
pub mod remote;
pub mod scheduler;

pub use merge::{merge, DedupeKey};
pub use remote::{parse_remote_body, HttpRemoteSource, RemoteSource};
pub use scheduler::{SharedStore, SyncOutcome, SyncScheduler, SyncStatus};

pub type SyncResult<T> = Result<T, SyncError>;

/// Failures of one sync attempt.
#[derive(Debug)]
pub enum SyncError {
    /// HTTP client construction or request transport failure.
    Transport(reqwest::Error),
    /// Endpoint answered with a non-success status code.
    Status(u16),
    /// Body is not a JSON list of items with a string title.
    MalformedBody(String),
    /// Merged quotes could not be persisted.
    Store(StoreError),
    /// Store lock was poisoned by a panicking writer.
    Poisoned,
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "remote request failed: {err}"),
            Self::Status(code) => write!(f, "remote responded with status {code}"),
            Self::MalformedBody(details) => write!(f, "malformed remote body: {details}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Poisoned => write!(f, "quote store lock poisoned"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Status(_) | Self::MalformedBody(_) | Self::Poisoned => None,
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value)
    }
}

impl From<StoreError> for SyncError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
