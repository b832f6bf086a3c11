//! Greedy local search around the endpoints of a block.

use crate::BlockDxt1;

use super::bc1::{EndPoints, PaletteMode, PaletteModes, Texels};

/// Unit and diagonal steps in 5:6:5 space.
const DELTAS: [[i8; 3]; 16] = [
    [1, 0, 0],
    [0, 1, 0],
    [0, 0, 1],
    [-1, 0, 0],
    [0, -1, 0],
    [0, 0, -1],
    [1, 1, 0],
    [1, 0, 1],
    [0, 1, 1],
    [-1, -1, 0],
    [-1, 0, -1],
    [0, -1, -1],
    [-1, 1, 0],
    [1, -1, 0],
    [0, -1, 1],
    [0, 1, -1],
];

const MAX_STEPS: usize = 256;
/// Stop after this many steps without an improvement.
const PATIENCE: usize = 32;

/// Moves one endpoint at a time by one step and keeps every change that
/// lowers the error. Endpoint 1 is moved for the first 16 steps, then
/// endpoint 0, and so on.
///
/// Returns the improved block, or `None` if no step helped.
pub(crate) fn refine(
    texels: &Texels,
    modes: PaletteModes,
    (block, error): (BlockDxt1, f32),
) -> Option<(BlockDxt1, f32)> {
    let mut best = (block, error);
    let mut improved = false;

    let mut last_improvement = 0;
    for i in 0..MAX_STEPS {
        let delta = DELTAS[i % DELTAS.len()];
        let (mut c0, mut c1) = (best.0.color0, best.0.color1);
        if (i / 16) & 1 == 1 {
            c0 = c0.offset(delta);
        } else {
            c1 = c1.offset(delta);
        }

        let endpoints = match modes {
            PaletteModes::FourColor => EndPoints::new(PaletteMode::FourColor, c0, c1),
            PaletteModes::ThreeColor => EndPoints::new(PaletteMode::ThreeColor, c0, c1),
            // the order decides the mode
            PaletteModes::Both => EndPoints { c0, c1 },
        };

        let candidate = endpoints.evaluate(texels);
        if candidate.1 < best.1 {
            best = candidate;
            improved = true;
            last_improvement = i;
        }

        if i - last_improvement > PATIENCE {
            break;
        }
    }

    improved.then_some(best)
}
