#![allow(clippy::needless_range_loop)]

use glam::Vec3A;

use crate::block::IndexList;
use crate::{evaluate_palette, BlockDxt1, Color16, Decoder};

use super::EncodeOptions;

/// The 16 pixels of a block as seen by the encoder.
pub(crate) struct Texels {
    pub colors: [Vec3A; 16],
    /// Per-pixel importance. Always >= 0.
    pub weights: [f32; 16],
    /// Per-channel weights of the error metric.
    pub metric: Vec3A,
    pub alpha_map: AlphaMap,
    pub decoder: Decoder,
}
impl Texels {
    pub fn new(pixels: &[[f32; 4]; 16], weights: &[f32; 16], options: &EncodeOptions) -> Self {
        let colors = pixels.map(|[r, g, b, _]| Vec3A::new(r, g, b).clamp(Vec3A::ZERO, Vec3A::ONE));
        // negative and NaN weights are treated as 0
        let weights = weights.map(|w| if w > 0.0 { w } else { 0.0 });

        let mut alpha_map = AlphaMap::ALL_OPAQUE;
        if options.three_color_mode {
            for (i, &w) in weights.iter().enumerate() {
                if w == 0.0 {
                    alpha_map.set_transparent(i);
                }
            }
        }

        Self {
            colors,
            weights,
            metric: options.channel_weights.to_vec(),
            alpha_map,
            decoder: options.decoder,
        }
    }

    /// Returns the weighted error of the given block.
    pub fn block_error(&self, block: &BlockDxt1) -> f32 {
        let palette = Palette::new(block.color0, block.color1, self.decoder);
        let mut error = 0.0;
        for i in 0..16 {
            let p = palette.colors[block.index(i) as usize];
            error += self.weights[i] * evaluate_mse(p, self.colors[i], self.metric);
        }
        error
    }
}

/// Marks which pixels are transparent in an alpha-tested block.
///
/// Transparent pixels must use index 3 of a 3-color palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AlphaMap {
    data: u16,
}
impl AlphaMap {
    pub const ALL_OPAQUE: Self = Self { data: u16::MAX };

    pub fn set_transparent(&mut self, index: usize) {
        self.data &= !(1 << index);
    }

    pub fn is_transparent(&self, index: usize) -> bool {
        (self.data & (1 << index)) == 0
    }
    pub fn is_opaque(&self, index: usize) -> bool {
        !self.is_transparent(index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PaletteMode {
    FourColor,
    ThreeColor,
}

/// The palette modes a block may be encoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PaletteModes {
    FourColor,
    /// The block has transparent pixels, so only 3-color mode can represent it.
    ThreeColor,
    Both,
}
impl PaletteModes {
    pub fn new(texels: &Texels, options: &EncodeOptions) -> Self {
        if !options.three_color_mode {
            PaletteModes::FourColor
        } else if texels.alpha_map != AlphaMap::ALL_OPAQUE {
            PaletteModes::ThreeColor
        } else {
            PaletteModes::Both
        }
    }

    pub fn allows(self, mode: PaletteMode) -> bool {
        match self {
            PaletteModes::FourColor => mode == PaletteMode::FourColor,
            PaletteModes::ThreeColor => mode == PaletteMode::ThreeColor,
            PaletteModes::Both => true,
        }
    }

    /// The mode the single-mode estimators (bounding box, least squares)
    /// should produce.
    pub fn preferred(self) -> PaletteMode {
        match self {
            PaletteModes::ThreeColor => PaletteMode::ThreeColor,
            _ => PaletteMode::FourColor,
        }
    }
}

/// Returns the squared error between a palette color and a pixel, in 0-255
/// units and weighted per channel.
#[inline(always)]
pub(crate) fn evaluate_mse(palette_color: Vec3A, color: Vec3A, metric: Vec3A) -> f32 {
    let d = (palette_color - color) * metric * 255.0;
    d.dot(d)
}

/// The decoded palette of an endpoint pair, normalized to [0, 1].
pub(crate) struct Palette {
    colors: [Vec3A; 4],
    mode: PaletteMode,
}
impl Palette {
    pub fn new(c0: Color16, c1: Color16, decoder: Decoder) -> Self {
        let colors = evaluate_palette(c0, c1, decoder)
            .map(|[r, g, b]| Vec3A::new(r as f32, g as f32, b as f32) / 255.0);
        let mode = if c0 > c1 {
            PaletteMode::FourColor
        } else {
            PaletteMode::ThreeColor
        };
        Self { colors, mode }
    }

    pub fn mode(&self) -> PaletteMode {
        self.mode
    }

    /// Returns:
    /// 0: The index value of the closest color in the palette
    /// 1: The squared error to that color
    ///
    /// Ties go to the lowest index. The black entry of a 3-color palette is
    /// reserved for transparent pixels and never returned.
    pub fn closest(&self, color: Vec3A, metric: Vec3A) -> (u8, f32) {
        let n = match self.mode {
            PaletteMode::FourColor => 4,
            PaletteMode::ThreeColor => 3,
        };

        let mut best_index = 0;
        let mut min_error = evaluate_mse(self.colors[0], color, metric);
        for i in 1..n {
            let error = evaluate_mse(self.colors[i], color, metric);
            if error < min_error {
                best_index = i as u8;
                min_error = error;
            }
        }

        (best_index, min_error)
    }

    /// Returns the index list of the colors in the palette that together
    /// minimize the weighted error.
    ///
    /// Returns:
    /// 0: The index list
    /// 1: The total weighted error of the block
    pub fn block_closest(&self, texels: &Texels) -> (IndexList, f32) {
        let mut total_error = 0.0;
        let mut index_list = IndexList::new_empty();
        for pixel_index in 0..16 {
            if self.mode == PaletteMode::ThreeColor && texels.alpha_map.is_transparent(pixel_index)
            {
                index_list.set(pixel_index, 3);
                continue;
            }

            let (index_value, error) = self.closest(texels.colors[pixel_index], texels.metric);
            index_list.set(pixel_index, index_value);
            total_error += texels.weights[pixel_index] * error;
        }

        (index_list, total_error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EndPoints {
    pub c0: Color16,
    pub c1: Color16,
}
impl EndPoints {
    pub fn new(mode: PaletteMode, c0: Color16, c1: Color16) -> Self {
        match mode {
            PaletteMode::FourColor => Self::new_p4(c0, c1),
            PaletteMode::ThreeColor => Self::new_p3(c0, c1),
        }
    }
    fn new_p4(mut c0: Color16, mut c1: Color16) -> Self {
        #[allow(clippy::comparison_chain)]
        if c0 < c1 {
            std::mem::swap(&mut c0, &mut c1);
        } else if c0 == c1 {
            // change the b channel
            if c1.b() == 0 {
                c0 = Color16::new(c0.r(), c0.g(), 1);
            } else {
                c1 = Color16::new(c1.r(), c1.g(), c1.b() - 1);
            }
        }

        debug_assert!(c0 > c1);
        Self { c0, c1 }
    }
    fn new_p3(mut c0: Color16, mut c1: Color16) -> Self {
        if c0 > c1 {
            std::mem::swap(&mut c0, &mut c1);
        }

        debug_assert!(c0 <= c1);
        Self { c0, c1 }
    }

    /// Quantizes two continuous endpoints and orders them for the given mode.
    pub fn quantize(mode: PaletteMode, v0: Vec3A, v1: Vec3A) -> Self {
        Self::new(mode, Color16::quantize(v0), Color16::quantize(v1))
    }

    /// Assigns every pixel its closest palette entry.
    ///
    /// Returns the resulting block and its weighted error.
    pub fn evaluate(&self, texels: &Texels) -> (BlockDxt1, f32) {
        let palette = Palette::new(self.c0, self.c1, texels.decoder);
        let (indexes, error) = palette.block_closest(texels);
        (BlockDxt1::new(self.c0, self.c1, indexes.data()), error)
    }
}

/// The stage of the encoder that produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    Trivial,
    SingleColor,
    BoundingBox,
    LeastSquares,
    ClusterFit4,
    ClusterFit3,
    Exhaustive,
    LocalRefinement,
}

/// Keeps track of the best block seen so far.
pub(crate) struct CandidateList {
    block: BlockDxt1,
    error: f32,
    stage: Stage,
}
impl CandidateList {
    pub fn new((block, error): (BlockDxt1, f32), stage: Stage) -> Self {
        Self {
            block,
            error,
            stage,
        }
    }

    pub fn block(&self) -> &BlockDxt1 {
        &self.block
    }
    pub fn error(&self) -> f32 {
        self.error
    }
    pub fn stage(&self) -> Stage {
        self.stage
    }
    pub fn get_best(self) -> (BlockDxt1, f32) {
        (self.block, self.error)
    }

    /// Replaces the current best if the candidate has a strictly lower error.
    pub fn add(&mut self, (block, error): (BlockDxt1, f32), stage: Stage) -> bool {
        if error < self.error {
            self.block = block;
            self.error = error;
            self.stage = stage;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texels(colors: [Vec3A; 16]) -> Texels {
        Texels {
            colors,
            weights: [1.0; 16],
            metric: Vec3A::ONE,
            alpha_map: AlphaMap::ALL_OPAQUE,
            decoder: Decoder::D3D10,
        }
    }

    #[test]
    fn p4_endpoints_are_never_equal() {
        let c = Color16::new(3, 4, 0);
        let e = EndPoints::new(PaletteMode::FourColor, c, c);
        assert!(e.c0 > e.c1);
        let c = Color16::new(3, 4, 5);
        let e = EndPoints::new(PaletteMode::FourColor, c, c);
        assert!(e.c0 > e.c1);
    }

    #[test]
    fn closest_prefers_lowest_index_on_ties() {
        let c = Color16::new(10, 20, 10);
        let palette = Palette::new(c, c, Decoder::D3D10);
        // 3-color mode with all 3 colors equal
        let (index, error) = palette.closest(c.to_color(), Vec3A::ONE);
        assert_eq!(index, 0);
        assert_eq!(error, 0.0);
    }

    #[test]
    fn three_color_palette_reserves_index_3() {
        let mut t = texels([Vec3A::ZERO; 16]);
        t.alpha_map.set_transparent(5);
        t.weights[5] = 0.0;

        let e = EndPoints::new(PaletteMode::ThreeColor, Color16::BLACK, Color16::WHITE);
        let (block, error) = e.evaluate(&t);
        for i in 0..16 {
            // black pixels map to endpoint 0 instead of the black entry 3
            let expected = if i == 5 { 3 } else { 0 };
            assert_eq!(block.index(i), expected);
        }
        assert_eq!(error, 0.0);
    }

    #[test]
    fn block_error_matches_evaluation() {
        let colors: [Vec3A; 16] = std::array::from_fn(|i| Vec3A::splat(i as f32 / 15.0));
        let t = texels(colors);
        let e = EndPoints::new(PaletteMode::FourColor, Color16::WHITE, Color16::BLACK);
        let (block, error) = e.evaluate(&t);
        assert_eq!(t.block_error(&block), error);
    }

    #[test]
    fn candidate_list_keeps_minimum() {
        let a = BlockDxt1::new(Color16::WHITE, Color16::BLACK, 0);
        let b = BlockDxt1::new(Color16::WHITE, Color16::BLACK, 1);
        let mut list = CandidateList::new((a, 2.0), Stage::BoundingBox);
        assert!(!list.add((b, 2.0), Stage::ClusterFit4));
        assert!(list.add((b, 1.0), Stage::ClusterFit4));
        assert_eq!(list.stage(), Stage::ClusterFit4);
        assert_eq!(list.get_best(), (b, 1.0));
    }
}
