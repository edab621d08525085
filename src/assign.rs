//! Nearest-centroid assignment.
//!
//! Ties resolve to the highest-indexed centroid: the scan runs in ascending
//! index order and replaces the current best on `<=`. Duplicate centroids
//! therefore always collect their pixels in the last duplicate, and every
//! execution strategy goes through this same function.

use crate::color::{Color, ColorAccumulator};

/// Index of the centroid closest to `px`.
#[inline(always)]
pub fn nearest_centroid(px: &[u8], centroids: &[Color]) -> usize {
    let mut best_idx = 0;
    let mut best_dist = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let dist = c.distance_to_pixel(px);
        if dist <= best_dist {
            best_dist = dist;
            best_idx = i;
        }
    }
    best_idx
}

/// Labels a run of pixels and accumulates them into one worker's slots.
///
/// `pixels` holds `labels.len()` interleaved pixels of `channels` bytes each;
/// `slots` has one entry per centroid.
pub fn assign_accumulate(
    pixels: &[u8],
    channels: usize,
    centroids: &[Color],
    labels: &mut [u32],
    slots: &mut [ColorAccumulator],
) {
    debug_assert_eq!(pixels.len(), labels.len() * channels);
    debug_assert_eq!(slots.len(), centroids.len());
    for (px, label) in pixels.chunks_exact(channels).zip(labels.iter_mut()) {
        let idx = nearest_centroid(px, centroids);
        *label = idx as u32;
        slots[idx].add_pixel(px);
    }
}

/// Writes each label's centroid color over its pixel.
pub fn remap_pixels(pixels: &mut [u8], channels: usize, centroids: &[Color], labels: &[u32]) {
    for (px, &label) in pixels.chunks_exact_mut(channels).zip(labels) {
        px.copy_from_slice(&centroids[label as usize].values[..channels]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_gray() {
        let centroids = [Color::gray(0), Color::gray(100), Color::gray(255)];
        assert_eq!(nearest_centroid(&[10], &centroids), 0);
        assert_eq!(nearest_centroid(&[120], &centroids), 1);
        assert_eq!(nearest_centroid(&[250], &centroids), 2);
    }

    #[test]
    fn test_tie_goes_to_last_index() {
        // 50 is equidistant from 0 and 100
        let centroids = [Color::gray(0), Color::gray(100)];
        assert_eq!(nearest_centroid(&[50], &centroids), 1);

        let dupes = [Color::rgb(5, 5, 5), Color::rgb(5, 5, 5), Color::rgb(5, 5, 5)];
        assert_eq!(nearest_centroid(&[200, 0, 0], &dupes), 2);
    }

    #[test]
    fn test_nearest_rgb_uses_all_channels() {
        let centroids = [Color::rgb(255, 0, 0), Color::rgb(0, 0, 255)];
        assert_eq!(nearest_centroid(&[10, 10, 200], &centroids), 1);
        assert_eq!(nearest_centroid(&[200, 10, 10], &centroids), 0);
    }

    #[test]
    fn test_assign_accumulate() {
        let centroids = [Color::gray(10), Color::gray(200)];
        let pixels = [10u8, 12, 200, 210];
        let mut labels = [0u32; 4];
        let mut slots = [ColorAccumulator::default(); 2];
        assign_accumulate(&pixels, 1, &centroids, &mut labels, &mut slots);
        assert_eq!(labels, [0, 0, 1, 1]);
        assert_eq!(slots[0].count, 2.0);
        assert_eq!(slots[0].sum[0], 22.0);
        assert_eq!(slots[1].sum[0], 410.0);
    }

    #[test]
    fn test_remap() {
        let centroids = [Color::rgb(1, 2, 3), Color::rgb(9, 8, 7)];
        let mut pixels = [0u8; 6];
        remap_pixels(&mut pixels, 3, &centroids, &[1, 0]);
        assert_eq!(pixels, [9, 8, 7, 1, 2, 3]);
    }
}
