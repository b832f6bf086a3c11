#![no_main]

use bc1enc::{CompressionQuality, Decoder, EncodeOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // 64 colors, 16 weights and 1 byte of options
    if data.len() < (64 + 16) * 4 + 1 {
        return;
    }

    let floats: Vec<f32> = data[1..]
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    let mut colors = [0.0; 64];
    colors.copy_from_slice(&floats[..64]);
    let mut weights = [0.0; 16];
    weights.copy_from_slice(&floats[64..80]);

    let flags = data[0];
    let mut options = EncodeOptions::default();
    options.three_color_mode = flags & 1 != 0;
    options.decoder = Decoder::ALL[(flags >> 1) as usize % 4];
    options.quality = match (flags >> 3) % 3 {
        0 => CompressionQuality::Fast,
        1 => CompressionQuality::Normal,
        _ => CompressionQuality::High,
    };

    let (block, error) = bc1enc::compress_dxt1(&colors, &weights, &options);
    let (_, fast_error) = bc1enc::compress_dxt1_fast(&colors, &weights, &options);
    assert!(!(error > fast_error), "{error} > {fast_error}");

    if !options.three_color_mode {
        assert!(block.is_four_color() || block.color0 == block.color1);
    }
    if block.is_four_color() {
        assert!(block.color0 > block.color1);
    }
});
