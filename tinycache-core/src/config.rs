use std::time::Duration;

/// Sweep resolution used when none (or zero) is configured
pub const DEFAULT_SWEEP_RESOLUTION: Duration = Duration::from_secs(1);

/// Initial capacity reserved for the value and expiry maps
pub const DEFAULT_INITIAL_CAPACITY: usize = 16;

/// Configuration for a [`Store`](crate::Store) and its expiration sweeper
///
/// # Example
///
/// ```rust
/// use tinycache_core::StoreConfig;
/// use std::time::Duration;
///
/// let config = StoreConfig::default()
///     .with_sweep_resolution(Duration::from_millis(250))
///     .with_initial_capacity(1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Interval between active expiration passes (default: 1 second)
    pub sweep_resolution: Duration,
    /// Number of entries the maps are sized for up front (default: 16)
    pub initial_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sweep_resolution: DEFAULT_SWEEP_RESOLUTION,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how often the sweeper wakes up to drop expired entries.
    ///
    /// A zero resolution falls back to [`DEFAULT_SWEEP_RESOLUTION`].
    pub fn with_sweep_resolution(mut self, resolution: Duration) -> Self {
        self.sweep_resolution = resolution;
        self
    }

    /// Sets the initial capacity of the value and expiry maps
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// The resolution the sweeper actually runs with
    pub fn effective_sweep_resolution(&self) -> Duration {
        if self.sweep_resolution.is_zero() {
            DEFAULT_SWEEP_RESOLUTION
        } else {
            self.sweep_resolution
        }
    }
}
