//! Cluster fit: the exact least squares optimizer for sorted colors.
//!
//! The colors of a block are sorted along their principal axis. Every way to
//! split the sorted sequence into 4 (or 3) contiguous runs is then an index
//! assignment, and the optimal endpoints of each assignment have a closed
//! form. The error of those endpoints can be computed from a few running sums
//! without decoding the palette, which makes trying all `O(n^3)` splits
//! affordable.

mod scalar;
mod simd;
mod tables;

use glam::Vec3A;

use crate::BlockDxt1;

use super::bc1::{EndPoints, PaletteMode, PaletteModes, Stage, Texels};
use super::color_set::ColorSet;

pub(crate) use scalar::ScalarClusterFit;
pub(crate) use simd::SimdClusterFit;

#[cfg(feature = "simd")]
pub(crate) type DefaultClusterFit = SimdClusterFit;
#[cfg(not(feature = "simd"))]
pub(crate) type DefaultClusterFit = ScalarClusterFit;

/// 5:6:5 quantization grid.
const GRID: [f32; 3] = [31.0, 63.0, 31.0];
const GRID_RCP: [f32; 3] = [1.0 / 31.0, 1.0 / 63.0, 1.0 / 31.0];

pub(crate) trait ClusterFit: Sized {
    fn new(set: &ColorSet, metric: Vec3A) -> Self;

    /// Searches all 4-cluster partitions.
    ///
    /// Returns the best `(start, end)` endpoints if they beat the best error
    /// found so far.
    fn compress4(&mut self) -> Option<(Vec3A, Vec3A)>;

    /// Searches all 3-cluster partitions.
    ///
    /// Returns the best `(start, end)` endpoints if they are at least as good
    /// as the best error found so far.
    fn compress3(&mut self) -> Option<(Vec3A, Vec3A)>;

    /// The error of the best solution so far, up to a constant offset.
    fn best_error(&self) -> f32;
}

/// The colors of a set in order of their projection on the principal axis.
struct SortedColors {
    colors: [Vec3A; 16],
    weights: [f32; 16],
    count: usize,
}
impl SortedColors {
    fn new(set: &ColorSet) -> Self {
        let axis = principal_axis(set.colors(), set.weights());

        let count = set.len();
        let mut dots = [0.0_f32; 16];
        let mut order = [0_usize; 16];
        for (i, &color) in set.colors().iter().enumerate() {
            dots[i] = color.dot(axis);
            order[i] = i;
        }
        // stable, so ties keep their input order
        order[..count].sort_by(|&a, &b| dots[a].total_cmp(&dots[b]));

        let mut colors = [Vec3A::ZERO; 16];
        let mut weights = [0.0; 16];
        for (i, &o) in order[..count].iter().enumerate() {
            colors[i] = set.colors()[o];
            weights[i] = set.weights()[o];
        }

        Self {
            colors,
            weights,
            count,
        }
    }
}

/// Approximates the dominant eigenvector of the weighted covariance matrix
/// with a few rounds of power iteration.
///
/// Returns the zero vector if all colors are the same.
fn principal_axis(colors: &[Vec3A], weights: &[f32]) -> Vec3A {
    debug_assert_eq!(colors.len(), weights.len());

    let mut total = 0.0;
    let mut centroid = Vec3A::ZERO;
    for (&c, &w) in colors.iter().zip(weights) {
        total += w;
        centroid += c * w;
    }
    if !(total > 0.0) {
        return Vec3A::ZERO;
    }
    centroid *= 1.0 / total;

    let mut cov = [Vec3A::ZERO; 3];
    for (&c, &w) in colors.iter().zip(weights) {
        let d = c - centroid;
        let wd = d * w;
        cov[0] += wd * d.x;
        cov[1] += wd * d.y;
        cov[2] += wd * d.z;
    }

    if cov[0].x == 0.0 && cov[1].y == 0.0 && cov[2].z == 0.0 {
        return Vec3A::ZERO;
    }

    // start with the row of the largest magnitude
    let mut v = cov[0];
    for row in &cov[1..] {
        if row.length_squared() > v.length_squared() {
            v = *row;
        }
    }

    for _ in 0..8 {
        v = Vec3A::new(cov[0].dot(v), cov[1].dot(v), cov[2].dot(v)).normalize_or_zero();
    }
    v
}

/// Encodes the block with the best cluster fit endpoints for the allowed
/// palette modes.
pub(crate) fn compress<F: ClusterFit>(
    texels: &Texels,
    set: &ColorSet,
    modes: PaletteModes,
) -> Option<((BlockDxt1, f32), Stage)> {
    debug_assert!(set.len() >= 2);

    let mut fit = F::new(set, texels.metric);

    let mut best = None;
    if modes.allows(PaletteMode::FourColor) {
        if let Some((start, end)) = fit.compress4() {
            best = Some((PaletteMode::FourColor, start, end));
        }
    }
    if modes.allows(PaletteMode::ThreeColor) {
        if let Some((start, end)) = fit.compress3() {
            best = Some((PaletteMode::ThreeColor, start, end));
        }
    }

    best.map(|(mode, start, end)| {
        let stage = match mode {
            PaletteMode::FourColor => Stage::ClusterFit4,
            PaletteMode::ThreeColor => Stage::ClusterFit3,
        };
        (EndPoints::quantize(mode, start, end).evaluate(texels), stage)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::bc1::AlphaMap;
    use crate::Decoder;
    use rand::{Rng, SeedableRng};
    use rstest::rstest;

    fn texels(colors: [Vec3A; 16], weights: [f32; 16]) -> Texels {
        Texels {
            colors,
            weights,
            metric: Vec3A::ONE,
            alpha_map: AlphaMap::ALL_OPAQUE,
            decoder: Decoder::D3D10,
        }
    }

    fn random_block(seed: u64, unit_weights: bool) -> Texels {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
        // colors scattered around a line, like most real blocks
        let a = Vec3A::new(rng.gen(), rng.gen(), rng.gen());
        let b = Vec3A::new(rng.gen(), rng.gen(), rng.gen());
        let colors = std::array::from_fn(|_| {
            let t: f32 = rng.gen();
            let noise = Vec3A::new(rng.gen(), rng.gen(), rng.gen()) * 0.1;
            (a.lerp(b, t) + noise).clamp(Vec3A::ZERO, Vec3A::ONE)
        });
        let weights = std::array::from_fn(|_| if unit_weights { 1.0 } else { rng.gen_range(0.1..2.0) });
        texels(colors, weights)
    }

    fn run<F: ClusterFit>(set: &ColorSet) -> [Option<(Vec3A, Vec3A)>; 2] {
        let mut fit = F::new(set, Vec3A::new(0.5, 1.0, 0.25));
        [fit.compress4(), fit.compress3()]
    }

    #[rstest]
    fn scalar_and_simd_are_identical(#[values(false, true)] unit_weights: bool) {
        let mut table_blocks = 0;
        for seed in 0..200 {
            let texels = random_block(seed, unit_weights);
            let set = ColorSet::reduce(&texels);
            if set.is_16_unit_weights() {
                table_blocks += 1;
            }

            let scalar = run::<ScalarClusterFit>(&set);
            let simd = run::<SimdClusterFit>(&set);
            assert_eq!(scalar, simd, "seed {seed}");

            let mut scalar = ScalarClusterFit::new(&set, Vec3A::ONE);
            let mut simd = SimdClusterFit::new(&set, Vec3A::ONE);
            scalar.compress4();
            simd.compress4();
            assert_eq!(scalar.best_error().to_bits(), simd.best_error().to_bits());
        }
        // the precomputed tables are only used for unit weights
        assert_eq!(table_blocks > 100, unit_weights);
    }

    #[test]
    fn principal_axis_of_a_line() {
        let colors: Vec<Vec3A> = (0..8)
            .map(|i| Vec3A::new(i as f32, 7.0 - i as f32, 3.0) / 7.0)
            .collect();
        let axis = principal_axis(&colors, &[1.0; 8]);
        let expected = Vec3A::new(1.0, -1.0, 0.0).normalize();
        assert!(axis.dot(expected).abs() > 0.999, "{axis:?}");

        assert_eq!(principal_axis(&[Vec3A::ONE; 3], &[1.0; 3]), Vec3A::ZERO);
    }

    #[test]
    fn sorted_along_axis() {
        let mut colors = [Vec3A::ZERO; 16];
        for (i, c) in colors.iter_mut().enumerate() {
            let t = ((i * 7) % 16) as f32 / 15.0;
            *c = Vec3A::new(t, t, 0.5);
        }
        let set = ColorSet::reduce(&texels(colors, [1.0; 16]));
        let sorted = SortedColors::new(&set);
        assert_eq!(sorted.count, 16);

        let projected: Vec<f32> = sorted.colors.iter().map(|c| c.x).collect();
        let ascending = projected.windows(2).all(|w| w[0] <= w[1]);
        let descending = projected.windows(2).all(|w| w[0] >= w[1]);
        assert!(ascending || descending, "{projected:?}");
    }

    type Runner = fn(&Texels, &ColorSet, PaletteModes) -> Option<((BlockDxt1, f32), Stage)>;

    #[rstest]
    fn exact_palette_is_found(
        #[values(compress::<ScalarClusterFit> as Runner, compress::<SimdClusterFit> as Runner)]
        compress: Runner,
    ) {
        // the colors of a 4-color palette with endpoints on the quantization grid
        let c0 = crate::Color16::new(28, 50, 4);
        let c1 = crate::Color16::new(3, 10, 25);
        let (e0, e1) = (c0.to_color(), c1.to_color());
        let colors = std::array::from_fn(|i| match i % 4 {
            0 => e0,
            1 => e1,
            2 => e0.lerp(e1, 1.0 / 3.0),
            _ => e0.lerp(e1, 2.0 / 3.0),
        });
        let texels = texels(colors, [1.0; 16]);
        let set = ColorSet::reduce(&texels);

        let ((block, error), stage) = compress(&texels, &set, PaletteModes::FourColor).unwrap();
        assert_eq!(stage, Stage::ClusterFit4);
        assert!(block.is_four_color());
        // only the rounding of the interpolated entries remains
        assert!(error < 16.0 * 3.0, "{error}");
    }

    #[rstest]
    fn three_color_only(
        #[values(compress::<ScalarClusterFit> as Runner, compress::<SimdClusterFit> as Runner)]
        compress: Runner,
    ) {
        let texels = random_block(7, false);
        let set = ColorSet::reduce(&texels);
        let ((block, _), stage) = compress(&texels, &set, PaletteModes::ThreeColor).unwrap();
        assert_eq!(stage, Stage::ClusterFit3);
        assert!(!block.is_four_color());
    }
}
