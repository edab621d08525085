//! Centroid recomputation from folded accumulator totals.

use rand::Rng;

use crate::centroid::CentroidSet;
use crate::color::{Channels, ColorAccumulator};
use crate::grid::PixelGrid;

/// What to do with a cluster that received no pixels in an iteration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmptyClusterPolicy {
    /// Keep the previous centroid unchanged
    #[default]
    Retain,
    /// Replace the centroid with a uniformly random pixel of the image
    Reseed,
}

/// Writes `trunc(sum / count)` per channel into the candidate set.
///
/// Empty clusters get their previous centroid; their indices are returned
/// in ascending order.
pub fn update_centroids(
    totals: &[ColorAccumulator],
    centroids: &mut CentroidSet,
    channels: Channels,
) -> Vec<usize> {
    debug_assert_eq!(totals.len(), centroids.len());
    let mut empty = Vec::new();
    for (i, total) in totals.iter().enumerate() {
        let previous = centroids.get(i);
        centroids.candidate_mut()[i] = match total.mean(channels) {
            Some(mean) => mean,
            None => {
                empty.push(i);
                previous
            }
        };
    }
    empty
}

/// Applies `policy` to the clusters reported empty by [`update_centroids`].
pub fn apply_empty_policy<R: Rng + ?Sized>(
    policy: EmptyClusterPolicy,
    empty: &[usize],
    centroids: &mut CentroidSet,
    grid: &PixelGrid,
    rng: &mut R,
) {
    if policy == EmptyClusterPolicy::Retain || grid.is_empty() {
        return;
    }
    for &i in empty {
        let idx = rng.gen_range(0..grid.len());
        centroids.candidate_mut()[i] = grid.color(idx);
    }
}
