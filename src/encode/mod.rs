use glam::Vec3A;

use crate::color::to_rgb8;
use crate::{BlockDxt1, ChannelWeightsError, Decoder};

mod bc1;
mod box_fit;
mod cluster_fit;
mod color_set;
mod exhaustive;
mod least_squares;
mod refine;
mod single_color;

use bc1::*;
use cluster_fit::DefaultClusterFit;
use color_set::ColorSet;

pub(crate) use single_color::init as init_single_color;

/// Options for compressing blocks.
///
/// ## See also
///
/// - [`compress_dxt1`](crate::compress_dxt1)
/// - [`compress_dxt1_fast`](crate::compress_dxt1_fast)
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct EncodeOptions {
    /// The per-channel weights of the error metric.
    ///
    /// Default: [`ChannelWeights::UNIFORM`]
    pub channel_weights: ChannelWeights,
    /// Whether blocks may use 3-color mode.
    ///
    /// If enabled, pixels with a weight of 0 are treated as transparent
    /// (alpha-tested) and always decode to transparent black. Blocks with
    /// transparent pixels are always encoded in 3-color mode. Opaque blocks
    /// use whichever mode gives the lower error.
    ///
    /// Only enable this if the decoder of the compressed texture supports
    /// 1-bit alpha.
    ///
    /// Default: `false`
    pub three_color_mode: bool,
    /// The compression quality.
    ///
    /// Default: [`CompressionQuality::Normal`]
    pub quality: CompressionQuality,
    /// The decoder whose palette interpolation is emulated when measuring
    /// the error of a block.
    ///
    /// Default: [`Decoder::D3D10`]
    pub decoder: Decoder,
    /// The maximum number of 5:6:5 colors in the search box of the
    /// exhaustive search. Blocks with larger boxes skip the search.
    ///
    /// The search takes time quadratic in this number. It is only used with
    /// [`CompressionQuality::High`].
    ///
    /// Default: `1400`
    pub exhaustive_budget: u32,
}
impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            channel_weights: ChannelWeights::UNIFORM,
            three_color_mode: false,
            quality: CompressionQuality::Normal,
            decoder: Decoder::D3D10,
            exhaustive_budget: 1400,
        }
    }
}

/// The level of trade-off between compression quality and speed.
///
/// - `Fast`: Bounding box endpoints refined with least squares.
/// - `Normal`: Additionally runs a cluster fit. This is almost always
///   significantly better than `Fast`.
/// - `High`: Additionally runs an exhaustive search for blocks with few
///   colors and a greedy local search around the best endpoints.
///
/// Higher qualities never produce blocks with a higher error than lower
/// qualities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum CompressionQuality {
    Fast,
    #[default]
    Normal,
    High,
}

/// Per-channel weights of the error metric.
///
/// The error of a pixel is `sum((w_c * (decoded_c - input_c))^2)` over the
/// RGB channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelWeights {
    weights: [f32; 3],
}
impl ChannelWeights {
    /// All channels are weighted equally.
    pub const UNIFORM: Self = Self {
        weights: [1.0, 1.0, 1.0],
    };
    /// The `3:4:2` weighting, normalized. This is closer to human perception
    /// than uniform weights without neglecting blue as much as luma weights.
    pub const PERCEPTUAL: Self = Self {
        weights: [3.0 / 9.0, 4.0 / 9.0, 2.0 / 9.0],
    };

    /// Creates new channel weights.
    ///
    /// Returns an error if any weight is negative, NaN, or infinite.
    pub fn new(weights: [f32; 3]) -> Result<Self, ChannelWeightsError> {
        for (channel, &value) in weights.iter().enumerate() {
            if !value.is_finite() {
                return Err(ChannelWeightsError::NotFinite { channel });
            }
            if value < 0.0 {
                return Err(ChannelWeightsError::Negative { channel, value });
            }
        }
        Ok(Self { weights })
    }

    pub const fn get(self) -> [f32; 3] {
        self.weights
    }

    pub(crate) fn to_vec(self) -> Vec3A {
        Vec3A::from_array(self.weights)
    }
}
impl Default for ChannelWeights {
    fn default() -> Self {
        Self::UNIFORM
    }
}
impl TryFrom<[f32; 3]> for ChannelWeights {
    type Error = ChannelWeightsError;

    fn try_from(weights: [f32; 3]) -> Result<Self, Self::Error> {
        Self::new(weights)
    }
}

/// Compresses a block and returns it together with its weighted error, in
/// 0-255 units squared.
pub(crate) fn compress_block(
    pixels: &[[f32; 4]; 16],
    weights: &[f32; 16],
    options: &EncodeOptions,
) -> (BlockDxt1, f32) {
    let texels = Texels::new(pixels, weights, options);
    let modes = PaletteModes::new(&texels, options);
    let set = ColorSet::reduce(&texels);

    let mut best = match set.len() {
        0 => CandidateList::new((trivial_block(options), 0.0), Stage::Trivial),
        1 => single_color(&texels, &set, modes),
        _ => {
            let mut best = baseline(&texels, &set, modes);

            if options.quality >= CompressionQuality::Normal {
                if let Some((candidate, stage)) =
                    cluster_fit::compress::<DefaultClusterFit>(&texels, &set, modes)
                {
                    best.add(candidate, stage);
                }
            }

            if options.quality >= CompressionQuality::High {
                if let Some(candidate) =
                    exhaustive::compress(&texels, &set, modes, options.exhaustive_budget)
                {
                    best.add(candidate, Stage::Exhaustive);
                }

                let current = (*best.block(), best.error());
                if let Some(candidate) = refine::refine(&texels, modes, current) {
                    best.add(candidate, Stage::LocalRefinement);
                }
            }

            best
        }
    };

    tracing::trace!(stage = ?best.stage(), error = best.error(), "compressed block");
    best.get_best()
}

/// The block for blocks without any pixel of interest.
fn trivial_block(options: &EncodeOptions) -> BlockDxt1 {
    if options.three_color_mode {
        // fully transparent, with distinct endpoints since some decoders
        // mishandle color0 == color1
        BlockDxt1::new(
            crate::Color16::BLACK,
            crate::Color16::WHITE,
            crate::block::IndexList::ALL_3.data(),
        )
    } else {
        BlockDxt1::new(crate::Color16::BLACK, crate::Color16::BLACK, 0)
    }
}

fn single_color(texels: &Texels, set: &ColorSet, modes: PaletteModes) -> CandidateList {
    let color = to_rgb8(set.colors()[0]);

    let evaluate = |block: BlockDxt1| (block, texels.block_error(&block));
    let p4 = || evaluate(single_color::compress_p4(color, texels.decoder));
    let p3 = || {
        evaluate(single_color::compress_p3(
            color,
            texels.alpha_map,
            texels.decoder,
            texels.metric,
        ))
    };

    match modes {
        PaletteModes::FourColor => CandidateList::new(p4(), Stage::SingleColor),
        PaletteModes::ThreeColor => CandidateList::new(p3(), Stage::SingleColor),
        PaletteModes::Both => {
            let mut best = CandidateList::new(p4(), Stage::SingleColor);
            best.add(p3(), Stage::SingleColor);
            best
        }
    }
}

/// Bounding box endpoints refined with least squares.
fn baseline(texels: &Texels, set: &ColorSet, modes: PaletteModes) -> CandidateList {
    let mut best = CandidateList::new(
        box_fit::compress(texels, set, modes.preferred()),
        Stage::BoundingBox,
    );
    if let Some(refined) = least_squares::refine(texels, best.block()) {
        best.add(refined, Stage::LeastSquares);
    }
    best
}
