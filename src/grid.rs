//! In-memory pixel grid and per-pixel label buffer.

use std::collections::{HashMap, HashSet};

use crate::color::{Channels, Color};
use crate::error::{Result, SegmentError};

/// Row-major H×W grid of interleaved 8-bit pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    channels: Channels,
    data: Vec<u8>,
}

impl PixelGrid {
    pub fn new(width: usize, height: usize, channels: Channels, data: Vec<u8>) -> Result<Self> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(channels.count()));
        if expected != Some(data.len()) {
            return Err(SegmentError::DimensionMismatch {
                len: data.len(),
                width,
                height,
                channels: channels.count(),
            });
        }
        Ok(Self { width, height, channels, data })
    }

    /// Grid with every pixel set to `color`.
    pub fn filled(width: usize, height: usize, channels: Channels, color: Color) -> Self {
        let px = color.as_slice(channels);
        let data = px.iter().copied().cycle().take(width * height * px.len()).collect();
        Self { width, height, channels, data }
    }

    pub fn from_colors(width: usize, height: usize, channels: Channels, colors: &[Color]) -> Result<Self> {
        let data: Vec<u8> = colors
            .iter()
            .flat_map(|c| c.as_slice(channels).to_vec())
            .collect();
        Self::new(width, height, channels, data)
    }

    /// Single-channel grid from rows of equal length.
    pub fn from_gray_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut data = Vec::new();
        for row in rows {
            let row = row.as_ref();
            if row.len() != width {
                return Err(SegmentError::DimensionMismatch {
                    len: data.len() + row.len(),
                    width,
                    height,
                    channels: 1,
                });
            }
            data.extend_from_slice(row);
        }
        Self::new(width, height, Channels::Gray, data)
    }

    #[inline(always)]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline(always)]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline(always)]
    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Number of pixels.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Raw channels of pixel `idx` in row-major order.
    #[inline(always)]
    pub fn pixel(&self, idx: usize) -> &[u8] {
        let c = self.channels.count();
        &self.data[idx * c..(idx + 1) * c]
    }

    #[inline(always)]
    pub fn color(&self, idx: usize) -> Color {
        Color::from_slice(self.pixel(idx))
    }

    pub fn get(&self, x: usize, y: usize) -> Color {
        self.color(y * self.width + x)
    }

    /// Number of distinct colors present.
    pub fn unique_colors(&self) -> usize {
        (0..self.len()).map(|idx| self.color(idx)).collect::<HashSet<_>>().len()
    }
}

#[cfg(feature = "native")]
impl PixelGrid {
    pub fn from_gray_image(img: &image::GrayImage) -> Self {
        Self {
            width: img.width() as usize,
            height: img.height() as usize,
            channels: Channels::Gray,
            data: img.as_raw().clone(),
        }
    }

    pub fn from_rgb_image(img: &image::RgbImage) -> Self {
        Self {
            width: img.width() as usize,
            height: img.height() as usize,
            channels: Channels::Rgb,
            data: img.as_raw().clone(),
        }
    }

    /// Converts any decoded image into the requested layout.
    pub fn from_dynamic(img: &image::DynamicImage, channels: Channels) -> Self {
        match channels {
            Channels::Gray => Self::from_gray_image(&img.to_luma8()),
            Channels::Rgb => Self::from_rgb_image(&img.to_rgb8()),
        }
    }

    /// Convert back to an `image::DynamicImage` for encoding.
    pub fn to_dynamic(&self) -> Result<image::DynamicImage> {
        let (w, h) = (self.width as u32, self.height as u32);
        let mismatch = || SegmentError::DimensionMismatch {
            len: self.data.len(),
            width: self.width,
            height: self.height,
            channels: self.channels.count(),
        };
        match self.channels {
            Channels::Gray => image::GrayImage::from_raw(w, h, self.data.clone())
                .map(image::DynamicImage::ImageLuma8)
                .ok_or_else(mismatch),
            Channels::Rgb => image::RgbImage::from_raw(w, h, self.data.clone())
                .map(image::DynamicImage::ImageRgb8)
                .ok_or_else(mismatch),
        }
    }
}

// =============================================================================
// Labels
// =============================================================================

/// Cluster index of every pixel, same shape as the grid it labels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelBuffer {
    pub width: usize,
    pub height: usize,
    pub labels: Vec<u32>,
}

impl LabelBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            labels: vec![0; width * height],
        }
    }

    pub fn get_label(&self, x: usize, y: usize) -> usize {
        self.labels[y * self.width + x] as usize
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.labels
    }

    pub fn as_mut_slice(&mut self) -> &mut [u32] {
        &mut self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Pixel count of each of `k` clusters.
    pub fn cluster_sizes(&self, k: usize) -> Vec<usize> {
        let mut sizes = vec![0usize; k];
        for &l in &self.labels {
            sizes[l as usize] += 1;
        }
        sizes
    }

    /// True when both buffers group pixels identically, up to a renaming of
    /// cluster indices.
    pub fn same_partition(&self, other: &LabelBuffer) -> bool {
        if self.labels.len() != other.labels.len() {
            return false;
        }
        let mut forward: HashMap<u32, u32> = HashMap::new();
        let mut backward: HashMap<u32, u32> = HashMap::new();
        for (&a, &b) in self.labels.iter().zip(&other.labels) {
            if *forward.entry(a).or_insert(b) != b || *backward.entry(b).or_insert(a) != a {
                return false;
            }
        }
        true
    }
}
