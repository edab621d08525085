//! K-Means Color Segmentation Library
//!
//! Quantizes 1- or 3-channel 8-bit images to K colors with Lloyd's k-means,
//! running the assignment pass serially, on a fixed worker pool, or as
//! fork-join tasks.

pub mod accumulator;
pub mod assign;
pub mod centroid;
pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod strategy;
pub mod update;

// Re-export key types for easy usage
pub use centroid::CentroidSet;
pub use color::{Channels, Color, ColorAccumulator};
pub use config::SegmentConfig;
pub use engine::{segment, EngineState, SegmentationEngine, SegmentationResult};
#[cfg(feature = "native")]
pub use engine::quantize;
pub use error::{Result, SegmentError};
pub use grid::{LabelBuffer, PixelGrid};
pub use strategy::{ExecutionMode, ExecutionStrategy};
pub use update::EmptyClusterPolicy;

pub mod prelude {
    pub use crate::color::{Channels, Color};
    pub use crate::config::SegmentConfig;
    pub use crate::engine::{segment, SegmentationEngine, SegmentationResult};
    pub use crate::error::SegmentError;
    pub use crate::grid::{LabelBuffer, PixelGrid};
    pub use crate::strategy::ExecutionMode;
    pub use crate::update::EmptyClusterPolicy;
}
