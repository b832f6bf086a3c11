use glam::Vec3A;

use crate::block::IndexList;
use crate::BlockDxt1;

use super::bc1::{EndPoints, PaletteMode, Texels};

/// The blend fraction of endpoint 1 for each index in 4-color mode.
const BETA4: [f32; 4] = [0.0, 1.0, 1.0 / 3.0, 2.0 / 3.0];
/// The blend fraction of endpoint 1 for each index in 3-color mode. Index 3 is
/// transparent and takes no part in the fit.
const BETA3: [f32; 4] = [0.0, 1.0, 0.5, f32::NAN];

/// Relative to `a * c`, determinants below this are treated as 0.
const SINGULAR_THRESHOLD: f32 = 1e-4;

/// This stores the result of `E = inv(A^T * W * A)`, where `A` is the n-by-2
/// blend matrix with rows `[1 - beta_i, beta_i]` and `W` is the diagonal
/// matrix of pixel weights.
///
/// ```txt
/// D = A^T*W*A = (a b)
///               (b c)
/// ```
struct NormalMatrix {
    e00: f32,
    e01: f32,
    e11: f32,
}
impl NormalMatrix {
    fn from_d(a: f32, b: f32, c: f32) -> Option<Self> {
        let d_det = a * c - b * b;
        // If all pixels use the same blend fraction, the rows of A are
        // linearly dependent and D is singular (up to rounding)
        if !(d_det > SINGULAR_THRESHOLD * a * c) {
            return None;
        }
        // E = D^-1 = ( c/det  -b/det)
        //            (-b/det   a/det)
        let d_det_rep = 1.0 / d_det;
        Some(Self {
            e00: c * d_det_rep,
            e01: -b * d_det_rep,
            e11: a * d_det_rep,
        })
    }
}

/// Solves for the continuous endpoints that minimize the weighted error of
/// the given index assignment.
///
/// Returns `None` if the system is singular, e.g. when every pixel uses the
/// same index.
pub(crate) fn solve(texels: &Texels, indexes: IndexList, mode: PaletteMode) -> Option<(Vec3A, Vec3A)> {
    let betas = match mode {
        PaletteMode::FourColor => &BETA4,
        PaletteMode::ThreeColor => &BETA3,
    };

    // First, compute D = A^T*W*A and the right-hand side X = A^T*W*B, where
    // B is the n-by-3 matrix of pixel colors.
    let (mut a, mut b, mut c) = (0.0f32, 0.0f32, 0.0f32);
    let (mut x0, mut x1) = (Vec3A::ZERO, Vec3A::ZERO);
    for i in 0..16 {
        let index = indexes.get(i);
        if mode == PaletteMode::ThreeColor && index == 3 {
            continue;
        }

        let w = texels.weights[i];
        let beta = betas[index as usize];
        let alpha = 1.0 - beta;
        a += w * alpha * alpha;
        b += w * alpha * beta;
        c += w * beta * beta;

        let color = texels.colors[i] * w;
        x0 += color * alpha;
        x1 += color * beta;
    }

    // Second, find E = D^-1 and the endpoints E * X
    let NormalMatrix { e00, e01, e11 } = NormalMatrix::from_d(a, b, c)?;
    let e0 = x0 * e00 + x1 * e01;
    let e1 = x0 * e01 + x1 * e11;

    Some((e0, e1))
}

/// Re-fits the endpoints of a block to its own indexes.
///
/// Returns the re-quantized block and its error, or `None` if the fit is
/// degenerate. The caller decides whether the result is an improvement.
pub(crate) fn refine(texels: &Texels, block: &BlockDxt1) -> Option<(BlockDxt1, f32)> {
    let mode = if block.is_four_color() {
        PaletteMode::FourColor
    } else {
        PaletteMode::ThreeColor
    };

    let (e0, e1) = solve(texels, IndexList::from(block.indices), mode)?;
    Some(EndPoints::quantize(mode, e0, e1).evaluate(texels))
}
