//! Fast initial endpoints from the bounding box of the colors.

use glam::Vec3A;

use crate::BlockDxt1;

use super::bc1::{EndPoints, PaletteMode, Texels};
use super::color_set::ColorSet;

/// Returns the two (continuous) endpoints of the inset bounding box diagonal
/// that best follows the colors.
pub(crate) fn fit(set: &ColorSet) -> (Vec3A, Vec3A) {
    debug_assert!(set.len() > 0);

    let (min, max) = set.bounding_box();
    let (c0, c1) = inset(max, min);
    select_diagonal(set, c0, c1)
}

/// Shrinks the box a little. Extreme colors are often outliers and rarely
/// representable exactly anyway.
fn inset(c0: Vec3A, c1: Vec3A) -> (Vec3A, Vec3A) {
    let bias = (8.0 / 255.0) / 16.0;
    let inset = (c0 - c1) / 16.0 - Vec3A::splat(bias);
    (
        (c0 - inset).clamp(Vec3A::ZERO, Vec3A::ONE),
        (c1 + inset).clamp(Vec3A::ZERO, Vec3A::ONE),
    )
}

/// The box has 4 diagonals. Picks the one along which the colors spread by
/// flipping the x and y coordinates of the endpoints when they correlate
/// negatively with z.
fn select_diagonal(set: &ColorSet, mut c0: Vec3A, mut c1: Vec3A) -> (Vec3A, Vec3A) {
    let center = (c0 + c1) * 0.5;

    let mut cov_xz = 0.0;
    let mut cov_yz = 0.0;
    for &color in set.colors() {
        let t = color - center;
        cov_xz += t.x * t.z;
        cov_yz += t.y * t.z;
    }

    if cov_xz < 0.0 {
        std::mem::swap(&mut c0.x, &mut c1.x);
    }
    if cov_yz < 0.0 {
        std::mem::swap(&mut c0.y, &mut c1.y);
    }

    (c0, c1)
}

/// Encodes the block with the bounding box endpoints.
pub(crate) fn compress(texels: &Texels, set: &ColorSet, mode: PaletteMode) -> (BlockDxt1, f32) {
    let (c0, c1) = fit(set);
    EndPoints::quantize(mode, c0, c1).evaluate(texels)
}
