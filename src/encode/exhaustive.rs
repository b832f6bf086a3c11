//! Brute force search over all endpoint pairs near the colors.

use crate::{BlockDxt1, Color16};

use super::bc1::{EndPoints, Palette, PaletteMode, PaletteModes, Texels};
use super::color_set::ColorSet;

const GRID: [f32; 3] = [31.0, 63.0, 31.0];

/// The 5:6:5 box around the colors, padded by half its size in every
/// direction.
///
/// Returns `(min, max)` per channel, inclusive.
fn search_box(set: &ColorSet) -> ([i32; 3], [i32; 3]) {
    let (min_color, max_color) = set.bounding_box();

    let mut min = [0; 3];
    let mut max = [0; 3];
    for c in 0..3 {
        let lo = (GRID[c] * min_color[c]) as i32;
        let hi = (GRID[c] * max_color[c] + 1.0) as i32;
        let range = hi - lo;
        min[c] = (lo - range / 2 - 2).max(0);
        max[c] = (hi + range / 2 + 2).min(GRID[c] as i32);
    }
    (min, max)
}

fn volume(min: [i32; 3], max: [i32; 3]) -> u64 {
    (0..3).map(|c| (max[c] - min[c] + 1) as u64).product()
}

fn box_colors(min: [i32; 3], max: [i32; 3]) -> Vec<Color16> {
    let mut colors = Vec::with_capacity(volume(min, max) as usize);
    for r in min[0]..=max[0] {
        for g in min[1]..=max[1] {
            for b in min[2]..=max[2] {
                colors.push(Color16::new(r as u8, g as u8, b as u8));
            }
        }
    }
    colors
}

/// Tries every endpoint pair in the search box. Pairs are scored against all
/// 16 pixels with the same metric as every other stage.
///
/// Returns `None` if the box has more than `budget` colors. The search is
/// quadratic in the volume of the box.
pub(crate) fn compress(
    texels: &Texels,
    set: &ColorSet,
    modes: PaletteModes,
    budget: u32,
) -> Option<(BlockDxt1, f32)> {
    let (min, max) = search_box(set);
    let volume = volume(min, max);
    if volume > budget as u64 {
        tracing::trace!(volume, budget, "exhaustive search over budget");
        return None;
    }

    let candidates = box_colors(min, max);
    let mut best_error = f32::INFINITY;
    let mut best = None;
    for &c0 in &candidates {
        for &c1 in &candidates {
            let mode = if c0 > c1 {
                PaletteMode::FourColor
            } else {
                PaletteMode::ThreeColor
            };
            if !modes.allows(mode) {
                continue;
            }

            let error = bounded_error(texels, &Palette::new(c0, c1, texels.decoder), best_error);
            if error < best_error {
                best_error = error;
                best = Some(EndPoints { c0, c1 });
            }
        }
    }

    best.map(|endpoints| endpoints.evaluate(texels))
}

/// The weighted error of the block with the closest palette entry for every
/// pixel, as `Palette::block_closest` computes it.
///
/// Stops early once the error reaches `bound`.
fn bounded_error(texels: &Texels, palette: &Palette, bound: f32) -> f32 {
    let mut error = 0.0;
    for i in 0..16 {
        if palette.mode() == PaletteMode::ThreeColor && texels.alpha_map.is_transparent(i) {
            continue;
        }

        error += texels.weights[i] * palette.closest(texels.colors[i], texels.metric).1;
        if error >= bound {
            break;
        }
    }
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::bc1::AlphaMap;
    use crate::{evaluate_palette, Decoder};
    use glam::Vec3A;
    use rand::{Rng, SeedableRng};

    fn texels(colors: [Vec3A; 16]) -> Texels {
        Texels {
            colors,
            weights: [1.0; 16],
            metric: Vec3A::ONE,
            alpha_map: AlphaMap::ALL_OPAQUE,
            decoder: Decoder::D3D10,
        }
    }

    fn palette_block(c0: Color16, c1: Color16) -> [Vec3A; 16] {
        let palette = evaluate_palette(c0, c1, Decoder::D3D10);
        std::array::from_fn(|i| {
            let [r, g, b] = palette[i % 4];
            Vec3A::new(r as f32, g as f32, b as f32) / 255.0
        })
    }

    #[test]
    fn over_budget_is_not_attempted() {
        let mut colors = [Vec3A::ZERO; 16];
        colors[0] = Vec3A::ONE;
        let t = texels(colors);
        let set = ColorSet::reduce(&t);

        let (min, max) = search_box(&set);
        assert_eq!((min, max), ([0; 3], [31, 63, 31]));
        assert!(compress(&t, &set, PaletteModes::FourColor, 1400).is_none());
    }

    #[test]
    fn finds_exact_endpoints() {
        let c0 = Color16::new(12, 25, 10);
        let c1 = Color16::new(11, 23, 10);
        let t = texels(palette_block(c0, c1));
        let set = ColorSet::reduce(&t);

        let (min, max) = search_box(&set);
        assert!(volume(min, max) <= 1400, "{min:?} {max:?}");

        let (block, error) = compress(&t, &set, PaletteModes::FourColor, 1400).unwrap();
        assert_eq!((block.color0, block.color1), (c0, c1));
        assert!(error < 1e-6, "{error}");
    }

    #[test]
    fn respects_three_color_mode() {
        let c0 = Color16::new(12, 25, 10);
        let c1 = Color16::new(11, 23, 10);
        let t = texels(palette_block(c0, c1));
        let set = ColorSet::reduce(&t);

        let (block, error) = compress(&t, &set, PaletteModes::ThreeColor, 1400).unwrap();
        assert!(!block.is_four_color());
        assert!(error > 0.0);
        for i in 0..16 {
            assert_ne!(block.index(i), 3);
        }
    }

    #[test]
    fn matches_brute_force_minimum() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);

        let mut tried = 0;
        for _ in 0..10 {
            // noisy solid colors keep the search box small
            let base: [f32; 3] = rng.gen();
            let colors = std::array::from_fn(|_| {
                let c = base.map(|c| c + rng.gen_range(-0.005..0.005));
                Vec3A::from_array(c).clamp(Vec3A::ZERO, Vec3A::ONE)
            });
            let t = Texels {
                colors,
                weights: std::array::from_fn(|_| rng.gen_range(0.5..2.0)),
                metric: Vec3A::new(1.0, 0.8, 0.5),
                alpha_map: AlphaMap::ALL_OPAQUE,
                decoder: Decoder::D3D10,
            };
            let set = ColorSet::reduce(&t);

            let (min, max) = search_box(&set);
            if volume(min, max) > 400 {
                continue;
            }
            tried += 1;

            let (block, error) = compress(&t, &set, PaletteModes::FourColor, 400).unwrap();
            assert!(block.is_four_color());

            let box_colors = box_colors(min, max);
            let mut best = f32::INFINITY;
            for &c0 in &box_colors {
                for &c1 in &box_colors {
                    if c0 > c1 {
                        best = best.min(EndPoints { c0, c1 }.evaluate(&t).1);
                    }
                }
            }
            assert!(error <= best, "{error} > {best}");
        }
        assert!(tried > 0);
    }
}
