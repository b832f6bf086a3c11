//! A BC1 (DXT1) block encoder.
//!
//! Blocks are 4x4 pixels given as 16 interleaved RGBA values. Only the RGB
//! channels are encoded; the importance of each pixel is given by a separate
//! weight. See [`compress_dxt1`] and [`EncodeOptions`] for details.
#![forbid(unsafe_code)]

mod block;
mod cast;
mod color;
mod decoder;
mod encode;
mod error;

use std::time::Instant;

pub use block::*;
pub use color::Color16;
pub use decoder::*;
pub use encode::{ChannelWeights, CompressionQuality, EncodeOptions};
pub use error::*;

/// The internal error is in 8-bit units squared.
const ERROR_SCALE: f32 = 1.0 / (255.0 * 255.0);

/// Builds all lookup tables.
///
/// Calling this is optional. Tables are built on first use otherwise, which
/// makes the first few compressed blocks slower.
pub fn init() {
    let start = Instant::now();
    for decoder in Decoder::ALL {
        encode::init_single_color(decoder);
    }
    tracing::debug!(elapsed = ?start.elapsed(), "initialized lookup tables");
}

/// Compresses a block of 16 RGBA pixels.
///
/// `colors` holds the pixels in row-major order with channel values in
/// `[0, 1]`. Alpha is ignored; use `weights` to mark pixels that matter more
/// or less. Negative and NaN weights count as 0. Values outside `[0, 1]` are
/// clamped.
///
/// Returns the block and its weighted squared error, where channel values
/// are in `[0, 1]`.
pub fn compress_dxt1(
    colors: &[f32; 64],
    weights: &[f32; 16],
    options: &EncodeOptions,
) -> (BlockDxt1, f32) {
    let (block, error) = encode::compress_block(cast::as_pixels(colors), weights, options);
    (block, error * ERROR_SCALE)
}

/// Same as [`compress_dxt1`] with [`CompressionQuality::Fast`].
///
/// The returned error is never lower than the error of [`compress_dxt1`] for
/// the same inputs.
pub fn compress_dxt1_fast(
    colors: &[f32; 64],
    weights: &[f32; 16],
    options: &EncodeOptions,
) -> (BlockDxt1, f32) {
    let options = EncodeOptions {
        quality: CompressionQuality::Fast,
        ..options.clone()
    };
    compress_dxt1(colors, weights, &options)
}

/// Compresses an opaque block of 16 8-bit RGBA pixels with uniform weights
/// and default options.
pub fn compress_dxt1_fast_u8(rgba: &[u8; 64]) -> BlockDxt1 {
    let colors: [f32; 64] = rgba.map(|v| v as f32 / 255.0);
    compress_dxt1_fast(&colors, &[1.0; 16], &EncodeOptions::default()).0
}

/// The sum of squared RGB differences between the given pixels and the
/// block decoded with the given decoder, in 8-bit units.
///
/// Alpha is ignored.
pub fn evaluate_dxt1_error(rgba: &[u8; 64], block: &BlockDxt1, decoder: Decoder) -> f32 {
    let palette = evaluate_palette(block.color0, block.color1, decoder);

    let mut error = 0_u32;
    for (i, pixel) in cast::as_pixels(rgba).iter().enumerate() {
        let decoded = palette[block.index(i) as usize];
        for c in 0..3 {
            let d = pixel[c].abs_diff(decoded[c]) as u32;
            error += d * d;
        }
    }
    error as f32
}
