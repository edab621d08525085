//! Execution strategies for the assignment, reduction and remap passes.
//!
//! Every strategy labels pixels through [`nearest_centroid`], so they only
//! differ in how work is split and how per-cluster totals are gathered:
//!
//! - [`SerialStrategy`] scans the grid on the calling thread.
//! - [`WorkerPoolStrategy`] splits the pixels into one contiguous chunk per
//!   worker of a fixed pool. Each chunk accumulates into its own replica of the
//!   accumulator; the end of the pool scope is the barrier before the fold.
//! - [`TaskParallelStrategy`] labels rows and columns with fork-join
//!   iterators, then reduces counts and sums per cluster in a second pass.

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::accumulator::Accumulator;
use crate::assign::{assign_accumulate, nearest_centroid, remap_pixels};
use crate::color::{Color, ColorAccumulator};
use crate::error::{Result, SegmentError};
use crate::grid::PixelGrid;

/// Concurrency shape, chosen once per engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ExecutionMode {
    #[default]
    Serial,
    WorkerPool,
    TaskParallel,
}

impl ExecutionMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            ExecutionMode::Serial => "serial",
            ExecutionMode::WorkerPool => "worker-pool",
            ExecutionMode::TaskParallel => "task-parallel",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionMode {
    type Err = SegmentError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "serial" => Ok(ExecutionMode::Serial),
            "worker-pool" | "worker_pool" => Ok(ExecutionMode::WorkerPool),
            "task-parallel" | "task_parallel" => Ok(ExecutionMode::TaskParallel),
            other => Err(SegmentError::UnknownExecutionMode(other.to_string())),
        }
    }
}

/// Shared assign/update contract of the three execution shapes.
pub trait ExecutionStrategy: Send + Sync {
    fn mode(&self) -> ExecutionMode;

    /// Accumulator replicas this strategy writes during assignment.
    fn replicas(&self) -> usize;

    /// Labels every pixel and leaves this iteration's per-cluster totals in `acc`.
    fn assign(&self, grid: &PixelGrid, centroids: &[Color], labels: &mut [u32], acc: &mut Accumulator);

    /// Overwrites every pixel with its labelled centroid color.
    fn remap(&self, grid: &mut PixelGrid, centroids: &[Color], labels: &[u32]);
}

/// Builds the strategy for `mode`. `workers` is ignored for serial execution.
pub fn build_strategy(mode: ExecutionMode, workers: usize) -> Result<Box<dyn ExecutionStrategy>> {
    Ok(match mode {
        ExecutionMode::Serial => Box::new(SerialStrategy),
        ExecutionMode::WorkerPool => Box::new(WorkerPoolStrategy::new(workers)?),
        ExecutionMode::TaskParallel => Box::new(TaskParallelStrategy::new(workers)?),
    })
}

fn build_pool(workers: usize, label: &'static str) -> Result<ThreadPool> {
    if workers == 0 {
        return Err(SegmentError::InvalidWorkerCount(label));
    }
    Ok(ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(move |i| format!("kmeans-{label}-{i}"))
        .build()?)
}

// =============================================================================
// Serial
// =============================================================================

#[derive(Clone, Copy, Debug, Default)]
pub struct SerialStrategy;

impl ExecutionStrategy for SerialStrategy {
    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Serial
    }

    fn replicas(&self) -> usize {
        1
    }

    fn assign(&self, grid: &PixelGrid, centroids: &[Color], labels: &mut [u32], acc: &mut Accumulator) {
        let channels = grid.channels().count();
        if let Some(slots) = acc.worker_slices_mut().next() {
            assign_accumulate(grid.data(), channels, centroids, labels, slots);
        }
    }

    fn remap(&self, grid: &mut PixelGrid, centroids: &[Color], labels: &[u32]) {
        let channels = grid.channels().count();
        remap_pixels(grid.data_mut(), channels, centroids, labels);
    }
}

// =============================================================================
// Worker pool
// =============================================================================

/// Fixed pool of OS threads with one private accumulator replica per worker.
pub struct WorkerPoolStrategy {
    pool: ThreadPool,
    workers: usize,
}

impl WorkerPoolStrategy {
    pub fn new(workers: usize) -> Result<Self> {
        Ok(Self {
            pool: build_pool(workers, "worker-pool")?,
            workers,
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Pixels per worker so that at most `workers` chunks cover `len` pixels.
    fn chunk_len(&self, len: usize) -> usize {
        len.div_ceil(self.workers).max(1)
    }
}

impl ExecutionStrategy for WorkerPoolStrategy {
    fn mode(&self) -> ExecutionMode {
        ExecutionMode::WorkerPool
    }

    fn replicas(&self) -> usize {
        self.workers
    }

    fn assign(&self, grid: &PixelGrid, centroids: &[Color], labels: &mut [u32], acc: &mut Accumulator) {
        let channels = grid.channels().count();
        let chunk = self.chunk_len(labels.len());
        let pixels = grid.data();

        // Every spawned task has joined once `scope` returns.
        self.pool.scope(|s| {
            let work = labels
                .chunks_mut(chunk)
                .zip(pixels.chunks(chunk * channels))
                .zip(acc.worker_slices_mut());
            for ((label_chunk, px_chunk), slots) in work {
                s.spawn(move |_| {
                    assign_accumulate(px_chunk, channels, centroids, label_chunk, slots);
                });
            }
        });
    }

    fn remap(&self, grid: &mut PixelGrid, centroids: &[Color], labels: &[u32]) {
        let channels = grid.channels().count();
        let chunk = self.chunk_len(labels.len());

        self.pool.scope(|s| {
            let work = grid
                .data_mut()
                .chunks_mut(chunk * channels)
                .zip(labels.chunks(chunk));
            for (px_chunk, label_chunk) in work {
                s.spawn(move |_| remap_pixels(px_chunk, channels, centroids, label_chunk));
            }
        });
    }
}

// =============================================================================
// Task parallel
// =============================================================================

/// Fork-join labelling followed by a per-cluster parallel reduction.
pub struct TaskParallelStrategy {
    pool: ThreadPool,
}

impl TaskParallelStrategy {
    pub fn new(workers: usize) -> Result<Self> {
        Ok(Self {
            pool: build_pool(workers, "task-parallel")?,
        })
    }
}

impl ExecutionStrategy for TaskParallelStrategy {
    fn mode(&self) -> ExecutionMode {
        ExecutionMode::TaskParallel
    }

    fn replicas(&self) -> usize {
        1
    }

    fn assign(&self, grid: &PixelGrid, centroids: &[Color], labels: &mut [u32], acc: &mut Accumulator) {
        let channels = grid.channels().count();
        let width = grid.width().max(1);
        let pixels = grid.data();
        let clusters = centroids.len();

        self.pool.install(|| {
            labels
                .par_chunks_mut(width)
                .zip(pixels.par_chunks(width * channels))
                .for_each(|(row_labels, row_px)| {
                    row_labels
                        .par_iter_mut()
                        .zip(row_px.par_chunks(channels))
                        .for_each(|(label, px)| *label = nearest_centroid(px, centroids) as u32);
                });

            let labels: &[u32] = &*labels;
            let totals: Vec<ColorAccumulator> = (0..clusters)
                .into_par_iter()
                .map(|cluster| {
                    labels
                        .par_iter()
                        .zip(pixels.par_chunks(channels))
                        .filter(|(label, _)| **label as usize == cluster)
                        .fold(ColorAccumulator::default, |mut total, (_, px)| {
                            total.add_pixel(px);
                            total
                        })
                        .reduce(ColorAccumulator::default, ColorAccumulator::merged)
                })
                .collect();
            acc.store_totals(&totals);
        });
    }

    fn remap(&self, grid: &mut PixelGrid, centroids: &[Color], labels: &[u32]) {
        let channels = grid.channels().count();
        let width = grid.width().max(1);

        self.pool.install(|| {
            grid.data_mut()
                .par_chunks_mut(width * channels)
                .zip(labels.par_chunks(width))
                .for_each(|(row_px, row_labels)| remap_pixels(row_px, channels, centroids, row_labels));
        });
    }
}
