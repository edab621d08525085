//! Pixel color vectors, channel layouts and the two built-in distance forms.

use std::fmt;

/// Largest channel count a pixel can carry.
pub const MAX_CHANNELS: usize = 3;

/// Channel layout of a pixel grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Channels {
    /// Single luminance channel
    #[default]
    Gray,
    /// Three interleaved color channels
    Rgb,
}

impl Channels {
    #[inline(always)]
    pub const fn count(self) -> usize {
        match self {
            Channels::Gray => 1,
            Channels::Rgb => 3,
        }
    }

    /// Maps a raw channel count onto a layout. Only 1 and 3 are supported.
    pub const fn from_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(Channels::Gray),
            3 => Some(Channels::Rgb),
            _ => None,
        }
    }
}

impl fmt::Display for Channels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channels::Gray => write!(f, "gray"),
            Channels::Rgb => write!(f, "rgb"),
        }
    }
}

// =============================================================================
// Color
// =============================================================================

/// Fixed-size channel vector used both for pixels and centroids.
///
/// Channels beyond the layout's count are kept at zero, so equality and
/// hashing over the whole array match equality over the used channels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct Color {
    pub values: [u8; MAX_CHANNELS],
}

impl Color {
    #[inline(always)]
    pub const fn gray(v: u8) -> Self {
        Self { values: [v, 0, 0] }
    }

    #[inline(always)]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { values: [r, g, b] }
    }

    /// Builds a color from an interleaved pixel slice (1 or 3 bytes).
    #[inline(always)]
    pub fn from_slice(px: &[u8]) -> Self {
        let mut values = [0u8; MAX_CHANNELS];
        let n = px.len().min(MAX_CHANNELS);
        values[..n].copy_from_slice(&px[..n]);
        Self { values }
    }

    #[inline(always)]
    pub fn channel(self, ch: usize) -> u8 {
        self.values[ch]
    }

    /// Used channels only.
    #[inline(always)]
    pub fn as_slice(&self, channels: Channels) -> &[u8] {
        &self.values[..channels.count()]
    }

    /// Distance from a raw pixel to this color.
    ///
    /// One channel uses the absolute difference, three channels the
    /// Euclidean norm of the per-channel differences.
    #[inline(always)]
    pub fn distance_to_pixel(self, px: &[u8]) -> f64 {
        match px.len() {
            1 => (px[0] as f64 - self.values[0] as f64).abs(),
            _ => {
                let mut sq = 0.0f64;
                for (ch, &v) in px.iter().enumerate() {
                    let d = v as f64 - self.values[ch] as f64;
                    sq += d * d;
                }
                sq.sqrt()
            }
        }
    }

    /// Distance between two colors under a given layout.
    pub fn distance(self, other: Color, channels: Channels) -> f64 {
        self.distance_to_pixel(other.as_slice(channels))
    }
}

impl From<u8> for Color {
    fn from(v: u8) -> Self {
        Color::gray(v)
    }
}

impl From<[u8; 3]> for Color {
    fn from(values: [u8; 3]) -> Self {
        Self { values }
    }
}

// =============================================================================
// Accumulators
// =============================================================================

/// Running per-cluster channel sum and pixel count.
///
/// Counts are kept as `f64` alongside the sums. Every value added is an
/// integer, so both stay exact well past any realistic image size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ColorAccumulator {
    pub sum: [f64; MAX_CHANNELS],
    pub count: f64,
}

impl ColorAccumulator {
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn add_pixel(&mut self, px: &[u8]) {
        for (s, &v) in self.sum.iter_mut().zip(px) {
            *s += v as f64;
        }
        self.count += 1.0;
    }

    /// Adds another partial result into this one.
    #[inline(always)]
    pub fn merge(&mut self, other: &ColorAccumulator) {
        for (s, o) in self.sum.iter_mut().zip(other.sum.iter()) {
            *s += o;
        }
        self.count += other.count;
    }

    /// Associative, commutative combine for parallel reductions.
    #[inline(always)]
    pub fn merged(mut self, other: ColorAccumulator) -> ColorAccumulator {
        self.merge(&other);
        self
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.count == 0.0
    }

    #[inline(always)]
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Per-channel mean truncated toward zero, `None` for an empty cluster.
    pub fn mean(&self, channels: Channels) -> Option<Color> {
        if self.is_empty() {
            return None;
        }
        let mut values = [0u8; MAX_CHANNELS];
        for (ch, v) in values.iter_mut().enumerate().take(channels.count()) {
            *v = clamp_u8_f64((self.sum[ch] / self.count).trunc());
        }
        Some(Color { values })
    }
}

// =============================================================================
// Utils
// =============================================================================

#[inline(always)]
pub fn clamp_u8_f64(v: f64) -> u8 {
    v.max(0.0).min(255.0) as u8
}
