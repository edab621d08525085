//! K-means segmentation engine.
//!
//! Seeds K centroids from the image, then repeats
//! assign → fold → update → convergence check → swap until the centroids stop
//! changing or the iteration cap is hit, and finally writes each pixel's
//! centroid color back into the grid.

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::accumulator::Accumulator;
use crate::centroid::CentroidSet;
use crate::color::{Channels, Color};
use crate::config::SegmentConfig;
use crate::error::{Result, SegmentError};
use crate::grid::{LabelBuffer, PixelGrid};
use crate::strategy::{build_strategy, ExecutionMode, ExecutionStrategy};
use crate::update::{apply_empty_policy, update_centroids};

/// Lifecycle of a single `process` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    /// Centroids seeded, label buffer allocated
    Initialized,
    Iterating,
    Converged,
    MaxIterReached,
    /// Image rewritten with centroid colors
    Remapped,
}

/// Outcome of a segmentation run.
#[derive(Clone, Debug)]
pub struct SegmentationResult {
    /// Assign/update iterations executed
    pub iterations: usize,
    /// Whether the last update left every centroid unchanged
    pub converged: bool,
    /// Final centroid colors, indexed by label
    pub centroids: Vec<Color>,
    /// Cluster index of each pixel from the last assignment
    pub labels: LabelBuffer,
    /// Total clusters found empty, summed over iterations
    pub empty_cluster_events: usize,
    /// Fewer pixels than centroids
    pub degenerate_input: bool,
}

impl SegmentationResult {
    pub fn cluster_sizes(&self) -> Vec<usize> {
        self.labels.cluster_sizes(self.centroids.len())
    }
}

pub struct SegmentationEngine<R = StdRng> {
    config: SegmentConfig,
    channels: Channels,
    strategy: Box<dyn ExecutionStrategy>,
    rng: R,
    state: EngineState,
}

impl SegmentationEngine<StdRng> {
    /// Validates `config` and builds the engine, seeding from `config.seed`
    /// when set and from OS entropy otherwise.
    pub fn new(config: SegmentConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> SegmentationEngine<R> {
    /// Same as [`SegmentationEngine::new`] with an explicit random source.
    pub fn with_rng(config: SegmentConfig, rng: R) -> Result<Self> {
        let channels = config.validate()?;
        let strategy = build_strategy(config.execution_mode, config.worker_count)?;
        Ok(Self {
            config,
            channels,
            strategy,
            rng,
            state: EngineState::Uninitialized,
        })
    }

    pub fn config(&self) -> &SegmentConfig {
        &self.config
    }

    pub fn mode(&self) -> ExecutionMode {
        self.strategy.mode()
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Quantizes `grid` in place, seeding centroids from random pixels.
    pub fn process(&mut self, grid: &mut PixelGrid) -> Result<SegmentationResult> {
        self.check_grid(grid)?;
        let centroids = CentroidSet::initialize(grid, self.config.centroid_count, &mut self.rng);
        self.run(grid, centroids)
    }

    /// Quantizes `grid` in place starting from the given centroids.
    pub fn process_with_seeds(&mut self, grid: &mut PixelGrid, seeds: &[Color]) -> Result<SegmentationResult> {
        self.check_grid(grid)?;
        if seeds.len() != self.config.centroid_count {
            return Err(SegmentError::SeedCountMismatch {
                expected: self.config.centroid_count,
                actual: seeds.len(),
            });
        }
        let seeds = seeds
            .iter()
            .map(|c| Color::from_slice(c.as_slice(self.channels)))
            .collect();
        self.run(grid, CentroidSet::from_seeds(seeds))
    }

    fn check_grid(&mut self, grid: &PixelGrid) -> Result<()> {
        self.state = EngineState::Uninitialized;
        if grid.channels() != self.channels {
            return Err(SegmentError::ChannelMismatch {
                expected: self.channels.count(),
                actual: grid.channels().count(),
            });
        }
        if grid.is_empty() {
            return Err(SegmentError::ZeroDimension);
        }
        Ok(())
    }

    fn run(&mut self, grid: &mut PixelGrid, mut centroids: CentroidSet) -> Result<SegmentationResult> {
        let k = self.config.centroid_count;
        let degenerate_input = grid.len() < k;
        if degenerate_input {
            warn!(
                "image has {} pixels but {} centroids were requested, duplicate centroids are likely",
                grid.len(),
                k
            );
        }

        let mut labels = LabelBuffer::new(grid.width(), grid.height());
        let mut acc = Accumulator::new(k, self.strategy.replicas());
        self.state = EngineState::Initialized;

        let mut converged = false;
        let mut iterations = 0;
        let mut empty_cluster_events = 0;

        while !converged && iterations < self.config.max_iterations {
            self.state = EngineState::Iterating;
            self.strategy
                .assign(grid, centroids.active(), labels.as_mut_slice(), &mut acc);

            let totals = acc.fold();
            let empty = update_centroids(&totals, &mut centroids, self.channels);
            if !empty.is_empty() {
                debug!("iteration {}: empty clusters {:?}", iterations + 1, empty);
                empty_cluster_events += empty.len();
                apply_empty_policy(
                    self.config.empty_cluster_policy,
                    &empty,
                    &mut centroids,
                    grid,
                    &mut self.rng,
                );
            }

            converged = centroids.equals_exact();
            centroids.swap();
            iterations += 1;
            debug!("iteration {}: converged={}", iterations, converged);
        }

        self.state = if converged {
            EngineState::Converged
        } else {
            EngineState::MaxIterReached
        };
        info!(
            "Finished in {} iterations ({}, {} centroids, {})",
            iterations,
            if converged { "converged" } else { "iteration cap reached" },
            k,
            self.strategy.mode()
        );

        self.strategy
            .remap(grid, centroids.active(), labels.as_slice());
        self.state = EngineState::Remapped;

        Ok(SegmentationResult {
            iterations,
            converged,
            centroids: centroids.into_colors(),
            labels,
            empty_cluster_events,
            degenerate_input,
        })
    }
}

/// One-shot segmentation with a freshly built engine.
pub fn segment(grid: &mut PixelGrid, config: &SegmentConfig) -> Result<SegmentationResult> {
    SegmentationEngine::new(config.clone())?.process(grid)
}

/// Simple convenience function for decoded images (requires 'native' feature)
#[cfg(feature = "native")]
pub fn quantize(
    img: &image::DynamicImage,
    channels: Channels,
    centroid_count: usize,
) -> Result<image::DynamicImage> {
    let mut grid = PixelGrid::from_dynamic(img, channels);
    let config = SegmentConfig::new()
        .channels(channels)
        .centroid_count(centroid_count);
    segment(&mut grid, &config)?;
    grid.to_dynamic()
}
