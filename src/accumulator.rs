//! Per-cluster running sums, optionally replicated once per worker.
//!
//! Slots are laid out worker-major: worker `w` owns
//! `slots[w * clusters..(w + 1) * clusters]` and is the only writer of that
//! slice during assignment. Folding sums the replicas per cluster and clears
//! every slot, so totals always cover exactly the pixels assigned since the
//! previous fold.

use std::slice::ChunksMut;

use crate::color::ColorAccumulator;

#[derive(Clone, Debug)]
pub struct Accumulator {
    clusters: usize,
    replicas: usize,
    slots: Vec<ColorAccumulator>,
}

impl Accumulator {
    pub fn new(clusters: usize, replicas: usize) -> Self {
        let replicas = replicas.max(1);
        Self {
            clusters,
            replicas,
            slots: vec![ColorAccumulator::default(); clusters * replicas],
        }
    }

    pub fn clusters(&self) -> usize {
        self.clusters
    }

    pub fn replicas(&self) -> usize {
        self.replicas
    }

    /// Slot for (`worker`, `cluster`).
    #[inline(always)]
    pub fn slot_mut(&mut self, worker: usize, cluster: usize) -> &mut ColorAccumulator {
        &mut self.slots[worker * self.clusters + cluster]
    }

    /// Disjoint per-worker slices, in worker order.
    pub fn worker_slices_mut(&mut self) -> ChunksMut<'_, ColorAccumulator> {
        self.slots.chunks_mut(self.clusters.max(1))
    }

    /// Overwrites the first replica with externally reduced totals.
    pub fn store_totals(&mut self, totals: &[ColorAccumulator]) {
        debug_assert_eq!(totals.len(), self.clusters);
        self.slots[..self.clusters].copy_from_slice(totals);
    }

    /// Sums all replicas per cluster, then zeroes every slot.
    pub fn fold(&mut self) -> Vec<ColorAccumulator> {
        let mut totals = vec![ColorAccumulator::default(); self.clusters];
        for cluster in 0..self.clusters {
            for worker in 0..self.replicas {
                let slot = &mut self.slots[worker * self.clusters + cluster];
                totals[cluster].merge(slot);
                slot.reset();
            }
        }
        totals
    }

    /// Total pixels currently accumulated across all replicas.
    pub fn pixel_count(&self) -> f64 {
        self.slots.iter().map(|s| s.count).sum()
    }
}
