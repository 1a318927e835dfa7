// Color reduction: median cut for deriving palettes, nearest-color search
// for mapping pixels onto a fixed palette.
use std::cmp::Reverse;

use hashbrown::HashMap;
use itertools::Itertools;

use crate::common::{ColorIdx, ColorRGB};

/// Distinct colors with their pixel counts, ordered by color.
pub type Histogram = Vec<(ColorRGB, u32)>;

pub fn histogram(pixels: impl IntoIterator<Item = ColorRGB>) -> Histogram {
    let mut counts: HashMap<ColorRGB, u32> = HashMap::new();
    for c in pixels {
        *counts.entry(c).or_insert(0) += 1;
    }
    // HashMap iteration order is not stable across runs; sort so that the
    // derived palette is reproducible.
    counts.into_iter().sorted().collect()
}

struct ColorBox {
    colors: Histogram,
    pixel_count: u64,
}

impl ColorBox {
    fn new(colors: Histogram) -> Self {
        let pixel_count = colors.iter().map(|&(_, n)| n as u64).sum();
        ColorBox {
            colors,
            pixel_count,
        }
    }

    fn channel_range(&self, channel: usize) -> u8 {
        self.colors
            .iter()
            .map(|(c, _)| c[channel])
            .minmax()
            .into_option()
            .map_or(0, |(lo, hi)| hi - lo)
    }

    // Lowest channel index wins ties (red, then green, then blue).
    fn widest_channel(&self) -> usize {
        (0..3)
            .max_by_key(|&ch| (self.channel_range(ch), Reverse(ch)))
            .unwrap_or(0)
    }

    fn is_splittable(&self) -> bool {
        self.colors.len() > 1
    }

    // Split at the pixel-weighted median of the widest channel. Both halves
    // are guaranteed to hold at least one distinct color.
    fn split(self) -> (ColorBox, ColorBox) {
        let channel = self.widest_channel();
        let half = self.pixel_count.div_ceil(2);
        let mut colors = self.colors;
        colors.sort_by_key(|&(c, _)| (c[channel], c));

        let mut cut = colors.len() - 1;
        let mut acc = 0u64;
        for (i, &(_, n)) in colors.iter().enumerate() {
            acc += n as u64;
            if acc >= half {
                cut = i + 1;
                break;
            }
        }
        let cut = cut.clamp(1, colors.len() - 1);
        let upper = colors.split_off(cut);
        (ColorBox::new(colors), ColorBox::new(upper))
    }

    fn mean(&self) -> ColorRGB {
        let total = self.pixel_count.max(1);
        let mut sums = [0u64; 3];
        for &(c, n) in &self.colors {
            for ch in 0..3 {
                sums[ch] += c[ch] as u64 * n as u64;
            }
        }
        sums.map(|s| ((s + total / 2) / total) as u8)
    }
}

/// Reduces a histogram to at most `max_colors` representative colors.
///
/// Boxes are split while fewer than `max_colors` exist and some box still
/// holds more than one distinct color; the most populated splittable box
/// goes first. An image with fewer distinct colors than requested yields
/// exactly its distinct colors.
pub fn median_cut(histogram: Histogram, max_colors: usize) -> Vec<ColorRGB> {
    if histogram.is_empty() || max_colors == 0 {
        return vec![];
    }
    let mut boxes = vec![ColorBox::new(histogram)];
    while boxes.len() < max_colors {
        let Some(idx) = boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_splittable())
            .max_by_key(|&(i, b)| (b.pixel_count, Reverse(i)))
            .map(|(i, _)| i)
        else {
            break;
        };
        let (lower, upper) = boxes.remove(idx).split();
        boxes.insert(idx, upper);
        boxes.insert(idx, lower);
    }
    boxes.iter().map(ColorBox::mean).collect()
}

pub fn distance2(a: ColorRGB, b: ColorRGB) -> u32 {
    (0..3)
        .map(|ch| {
            let d = a[ch] as i32 - b[ch] as i32;
            (d * d) as u32
        })
        .sum()
}

/// Nearest-color lookup against a fixed palette, memoized per color.
///
/// Distance is squared Euclidean in RGB; ties go to the lowest index.
pub struct NearestColor<'a> {
    palette: &'a [ColorRGB],
    cache: HashMap<ColorRGB, ColorIdx>,
}

impl<'a> NearestColor<'a> {
    pub fn new(palette: &'a [ColorRGB]) -> Self {
        assert!(!palette.is_empty() && palette.len() <= 256);
        NearestColor {
            palette,
            cache: HashMap::new(),
        }
    }

    pub fn lookup(&mut self, color: ColorRGB) -> ColorIdx {
        let palette = self.palette;
        *self.cache.entry(color).or_insert_with(|| {
            palette
                .iter()
                .enumerate()
                .min_by_key(|&(_, &p)| distance2(p, color))
                .map_or(0, |(i, _)| i as ColorIdx)
        })
    }
}
