//! Active and candidate centroid sequences.

use rand::Rng;

use crate::color::Color;
use crate::grid::PixelGrid;

/// The K current centroids plus the candidate set the update step writes.
#[derive(Clone, Debug)]
pub struct CentroidSet {
    active: Vec<Color>,
    candidate: Vec<Color>,
}

impl CentroidSet {
    /// Samples `k` pixels uniformly at random, with replacement.
    ///
    /// `grid` must contain at least one pixel.
    pub fn initialize<R: Rng + ?Sized>(grid: &PixelGrid, k: usize, rng: &mut R) -> Self {
        let active: Vec<Color> = (0..k)
            .map(|_| {
                let row = rng.gen_range(0..grid.height());
                let col = rng.gen_range(0..grid.width());
                grid.get(col, row)
            })
            .collect();
        Self::from_seeds(active)
    }

    pub fn from_seeds(seeds: Vec<Color>) -> Self {
        let candidate = seeds.clone();
        Self { active: seeds, candidate }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    #[inline(always)]
    pub fn get(&self, i: usize) -> Color {
        self.active[i]
    }

    pub fn active(&self) -> &[Color] {
        &self.active
    }

    pub fn candidate(&self) -> &[Color] {
        &self.candidate
    }

    pub fn candidate_mut(&mut self) -> &mut [Color] {
        &mut self.candidate
    }

    /// Exact per-channel equality of active and candidate centroids.
    pub fn equals_exact(&self) -> bool {
        self.active == self.candidate
    }

    /// Candidate becomes active; the old active vector is reused as the next candidate.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.active, &mut self.candidate);
    }

    pub fn into_colors(self) -> Vec<Color> {
        self.active
    }
}
