use glam::Vec3A;

use super::bc1::Texels;

/// Colors closer than this in every channel are merged.
const TOLERANCE: f32 = 1.0 / 256.0;

/// The unique colors of a block, each with the summed weight of all pixels
/// that have that color.
pub(crate) struct ColorSet {
    colors: [Vec3A; 16],
    weights: [f32; 16],
    count: usize,
}
impl ColorSet {
    /// Deduplicates the pixels of a block. Pixels with a weight of 0 are
    /// ignored.
    pub fn reduce(texels: &Texels) -> Self {
        let mut colors = [Vec3A::ZERO; 16];
        let mut weights = [0.0; 16];
        let mut count = 0;

        for (&color, &weight) in texels.colors.iter().zip(&texels.weights) {
            if !(weight > 0.0) {
                continue;
            }

            let existing = colors[..count]
                .iter()
                .position(|&c| (c - color).abs().max_element() <= TOLERANCE);
            match existing {
                Some(j) => weights[j] += weight,
                None => {
                    debug_assert!(count < 16);
                    colors[count] = color;
                    weights[count] = weight;
                    count += 1;
                }
            }
        }

        Self {
            colors,
            weights,
            count,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }
    pub fn colors(&self) -> &[Vec3A] {
        &self.colors[..self.count]
    }
    pub fn weights(&self) -> &[f32] {
        &self.weights[..self.count]
    }

    /// Returns whether all weights are exactly 1 and there are 16 colors,
    /// which is the layout the precomputed cluster fit tables are made for.
    pub fn is_16_unit_weights(&self) -> bool {
        self.count == 16 && self.weights.iter().all(|&w| w == 1.0)
    }

    /// Returns the per-channel `(min, max)` of all colors.
    pub fn bounding_box(&self) -> (Vec3A, Vec3A) {
        let mut min = Vec3A::ONE;
        let mut max = Vec3A::ZERO;
        for &c in self.colors() {
            min = min.min(c);
            max = max.max(c);
        }
        (min, max)
    }
}
