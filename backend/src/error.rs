//! Error types for service startup and teardown.

use std::fmt;

use events::{DiscoveryError, ItemIndexError};

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors that surface to the service embedder.
///
/// Only startup and explicit teardown can fail; nothing in the packet
/// path ever produces one of these.
#[derive(Debug)]
pub enum ServiceError {
    /// The item index asset could not be loaded.
    ItemIndex(ItemIndexError),
    /// The discovery catalogue could not be saved.
    Discovery(DiscoveryError),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ItemIndex(err) => write!(f, "item index: {err}"),
            Self::Discovery(err) => write!(f, "discovery output: {err}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ItemIndex(err) => Some(err),
            Self::Discovery(err) => Some(err),
        }
    }
}

impl From<ItemIndexError> for ServiceError {
    fn from(err: ItemIndexError) -> Self {
        Self::ItemIndex(err)
    }
}

impl From<DiscoveryError> for ServiceError {
    fn from(err: DiscoveryError) -> Self {
        Self::Discovery(err)
    }
}
