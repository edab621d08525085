use thiserror::Error;

#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("channel_count must be 1 or 3, got {0}")]
    InvalidChannelCount(usize),

    #[error("centroid_count must be at least 1")]
    InvalidCentroidCount,

    #[error("max_iterations must be at least 1")]
    InvalidMaxIterations,

    #[error("worker_count must be at least 1 for {0} execution")]
    InvalidWorkerCount(&'static str),

    #[error("unknown execution mode {0:?}, expected serial, worker-pool or task-parallel")]
    UnknownExecutionMode(String),

    #[error("failed to build worker thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("image has {actual} channels but the engine is configured for {expected}")]
    ChannelMismatch { expected: usize, actual: usize },

    #[error("image dimensions cannot be zero")]
    ZeroDimension,

    #[error("pixel buffer length {len} does not match dimensions {width}x{height}x{channels}")]
    DimensionMismatch {
        len: usize,
        width: usize,
        height: usize,
        channels: usize,
    },

    #[error("expected {expected} seed centroids, got {actual}")]
    SeedCountMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, SegmentError>;
