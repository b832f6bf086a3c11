#![allow(unused)]

use rand::{Rng, SeedableRng};

pub fn create_rng() -> impl Rng {
    rand_chacha::ChaChaRng::seed_from_u64(123456789)
}

/// 16 RGBA pixels with random colors and opaque alpha.
pub fn random_colors(rng: &mut impl Rng) -> [f32; 64] {
    std::array::from_fn(|i| if i % 4 == 3 { 1.0 } else { rng.gen() })
}

/// A block with only a few distinct colors, like most real-world blocks.
pub fn random_few_colors(rng: &mut impl Rng) -> [f32; 64] {
    let count = rng.gen_range(2..=4);
    let palette: Vec<[f32; 3]> = (0..count).map(|_| rng.gen()).collect();

    let mut colors = [1.0; 64];
    for pixel in colors.chunks_exact_mut(4) {
        let [r, g, b] = palette[rng.gen_range(0..count)];
        pixel[..3].copy_from_slice(&[r, g, b]);
    }
    colors
}

/// Random weights in `[0, 1)`. About 1 in 8 weights is 0.
pub fn random_weights(rng: &mut impl Rng) -> [f32; 16] {
    std::array::from_fn(|_| {
        if rng.gen_ratio(1, 8) {
            0.0
        } else {
            rng.gen()
        }
    })
}

pub fn to_rgba8(colors: &[f32; 64]) -> [u8; 64] {
    colors.map(|c| (c.clamp(0.0, 1.0) * 255.0 + 0.5) as u8)
}

pub fn to_rgba_f32(pixels: &[[u8; 4]; 16]) -> [f32; 64] {
    std::array::from_fn(|i| pixels[i / 4][i % 4] as f32 / 255.0)
}
