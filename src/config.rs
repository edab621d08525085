//! Engine construction configuration.

use crate::color::Channels;
use crate::error::{Result, SegmentError};
use crate::strategy::ExecutionMode;
use crate::update::EmptyClusterPolicy;

/// Segmentation configuration, validated once when an engine is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentConfig {
    /// Channels per pixel, 1 or 3
    pub channel_count: usize,
    /// Number of clusters K
    pub centroid_count: usize,
    /// Hard cap on assign/update iterations
    pub max_iterations: usize,
    /// Concurrency shape
    pub execution_mode: ExecutionMode,
    /// Threads for worker-pool and task-parallel execution
    pub worker_count: usize,
    /// Handling of clusters that receive no pixels
    pub empty_cluster_policy: EmptyClusterPolicy,
    /// Fixed seed for centroid sampling; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            channel_count: 1,
            centroid_count: 8,
            max_iterations: 30,
            execution_mode: ExecutionMode::Serial,
            worker_count: default_worker_count(),
            empty_cluster_policy: EmptyClusterPolicy::Retain,
            seed: None,
        }
    }
}

fn default_worker_count() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

impl SegmentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel_count(mut self, n: usize) -> Self {
        self.channel_count = n;
        self
    }

    pub fn channels(mut self, channels: Channels) -> Self {
        self.channel_count = channels.count();
        self
    }

    pub fn centroid_count(mut self, k: usize) -> Self {
        self.centroid_count = k;
        self
    }

    pub fn max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.execution_mode = mode;
        self
    }

    pub fn worker_count(mut self, n: usize) -> Self {
        self.worker_count = n;
        self
    }

    pub fn empty_cluster_policy(mut self, policy: EmptyClusterPolicy) -> Self {
        self.empty_cluster_policy = policy;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fails fast on the first invalid field.
    pub fn validate(&self) -> Result<Channels> {
        let channels = Channels::from_count(self.channel_count)
            .ok_or(SegmentError::InvalidChannelCount(self.channel_count))?;
        if self.centroid_count == 0 {
            return Err(SegmentError::InvalidCentroidCount);
        }
        if self.max_iterations == 0 {
            return Err(SegmentError::InvalidMaxIterations);
        }
        if self.execution_mode != ExecutionMode::Serial && self.worker_count == 0 {
            return Err(SegmentError::InvalidWorkerCount(self.execution_mode.as_str()));
        }
        Ok(channels)
    }
}
