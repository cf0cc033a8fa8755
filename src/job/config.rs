use std::time::Duration;

/// Batch job configuration
///
/// Defaults mirror the production job: commit every 5 records, at most 2
/// partitions in flight, grid hint 5 (clamped by the grade enumeration).
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Records per commit unit
    pub chunk_size: usize,

    /// Maximum number of partitions in flight at once
    pub throttle_limit: usize,

    /// Requested partition count; an upper bound, never a target
    pub grid_size: usize,

    /// Artificial per-item latency, for making interleaving visible in
    /// demos and tests. Off in production.
    pub item_delay: Duration,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            chunk_size: 5,
            throttle_limit: 2,
            grid_size: 5,
            item_delay: Duration::ZERO,
        }
    }
}

impl JobConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of records committed per chunk
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the maximum number of concurrently in-flight partitions
    pub fn throttle_limit(mut self, throttle_limit: usize) -> Self {
        self.throttle_limit = throttle_limit;
        self
    }

    /// Set the partition-count hint
    pub fn grid_size(mut self, grid_size: usize) -> Self {
        self.grid_size = grid_size;
        self
    }

    /// Set the simulated per-item processing delay
    pub fn item_delay(mut self, delay: Duration) -> Self {
        self.item_delay = delay;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be > 0".to_string());
        }

        if self.throttle_limit == 0 {
            return Err("throttle_limit must be > 0".to_string());
        }

        Ok(())
    }
}
