//! Service configuration.

use std::path::PathBuf;

use crate::error::ServiceResult;
use crate::service::Service;

const DEFAULT_EVENT_BUFFER: usize = 100;
const DEFAULT_STATS_BUFFER: usize = 10;

/// Builder-style configuration for a [`Service`].
///
/// ```
/// use backend::ServiceConfig;
///
/// let service = ServiceConfig::new()
///     .discovery(true)
///     .event_buffer(256)
///     .start()
///     .unwrap();
/// service.stop();
/// ```
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub(crate) discovery: bool,
    pub(crate) item_index_path: Option<PathBuf>,
    pub(crate) discovery_output: Option<PathBuf>,
    pub(crate) event_buffer: usize,
    pub(crate) stats_buffer: usize,
    pub(crate) limits: photon::Limits,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            discovery: false,
            item_index_path: None,
            discovery_output: None,
            event_buffer: DEFAULT_EVENT_BUFFER,
            stats_buffer: DEFAULT_STATS_BUFFER,
            limits: photon::Limits::default(),
        }
    }
}

impl ServiceConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables discovery mode.
    #[must_use]
    pub fn discovery(mut self, discovery: bool) -> Self {
        self.discovery = discovery;
        self
    }

    /// Path of the item index asset to load at startup.
    #[must_use]
    pub fn item_index_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.item_index_path = Some(path.into());
        self
    }

    /// Where to save the discovery catalogue on [`Service::stop`].
    /// Implies discovery mode.
    #[must_use]
    pub fn discovery_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.discovery = true;
        self.discovery_output = Some(path.into());
        self
    }

    /// Capacity of the game-event channel.
    #[must_use]
    pub fn event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = capacity;
        self
    }

    /// Capacity of the stats-snapshot channel.
    #[must_use]
    pub fn stats_buffer(mut self, capacity: usize) -> Self {
        self.stats_buffer = capacity;
        self
    }

    /// Parser limits (fragment reassembly bounds).
    #[must_use]
    pub fn limits(mut self, limits: photon::Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Builds and starts the service.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ServiceError`] when the configured item index
    /// cannot be loaded.
    pub fn start(self) -> ServiceResult<Service> {
        Service::start(self)
    }
}
