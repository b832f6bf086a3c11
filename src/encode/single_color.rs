//! Optimal endpoints for blocks with a single color.
//!
//! For every 8-bit channel value, the tables store the endpoint pairs whose
//! blend (as computed by the decoder) is closest to that value. Since the
//! blend of each channel only depends on the same channel of both endpoints,
//! the 3 channels can be optimized independently, except for the order of
//! the two packed endpoints.

use std::cmp::Ordering;
use std::sync::OnceLock;
use std::time::Instant;

use glam::Vec3A;

use crate::block::IndexList;
use crate::{BlockDxt1, Color16, Decoder};

use super::bc1::AlphaMap;

/// The closest endpoint pair found for one target value.
#[derive(Debug, Clone, Copy)]
struct Match {
    /// `[color0 field, color1 field]`
    pair: [u8; 2],
    /// `|blend - target|`
    error: u32,
}
impl Match {
    const NONE: Self = Self {
        pair: [0; 2],
        error: u32::MAX,
    };

    /// The endpoint distance only breaks ties between equally close blends.
    fn score(&self) -> u64 {
        ((self.error as u64) << 8) | self.pair[0].abs_diff(self.pair[1]) as u64
    }

    fn min(self, other: Self) -> Self {
        if other.score() < self.score() {
            other
        } else {
            self
        }
    }
}

/// The best pairs of one target value, by the order of the two fields.
#[derive(Debug, Clone, Copy)]
struct Matches {
    less: Match,
    equal: Match,
    greater: Match,
}
impl Matches {
    const NONE: Self = Self {
        less: Match::NONE,
        equal: Match::NONE,
        greater: Match::NONE,
    };

    fn get_mut(&mut self, order: Ordering) -> &mut Match {
        match order {
            Ordering::Less => &mut self.less,
            Ordering::Equal => &mut self.equal,
            Ordering::Greater => &mut self.greater,
        }
    }

    fn any(&self) -> Match {
        self.equal.min(self.less).min(self.greater)
    }
    /// The best pair with `color0 <= color1`.
    fn at_most(&self) -> Match {
        self.equal.min(self.less)
    }
}

struct Table {
    match5: [Matches; 256],
    match6: [Matches; 256],
}
impl Table {
    fn build(blend: impl Fn(u8, u8, u32) -> u8) -> Self {
        Self {
            match5: build_matches(5, &blend),
            match6: build_matches(6, &blend),
        }
    }

    /// The best endpoints when their order doesn't matter.
    fn endpoints(&self, [r, g, b]: [u8; 3]) -> (Color16, Color16) {
        let r = self.match5[r as usize].any().pair;
        let g = self.match6[g as usize].any().pair;
        let b = self.match5[b as usize].any().pair;
        (
            Color16::new(r[0], g[0], b[0]),
            Color16::new(r[1], g[1], b[1]),
        )
    }

    /// The best endpoints with `color0 <= color1` as packed values.
    ///
    /// Red is compared first, so green and blue may be in any order if
    /// `r0 < r1`. Channels are weighted by `metric` when choosing between
    /// the orders.
    fn endpoints_at_most(&self, [r, g, b]: [u8; 3], metric: Vec3A) -> (Color16, Color16) {
        let r = &self.match5[r as usize];
        let g = &self.match6[g as usize];
        let b = &self.match5[b as usize];

        let metric = (metric * metric).to_array();
        let cost = |m: &[Match; 3]| -> f32 {
            (0..3)
                .map(|c| {
                    let e = m[c].error as f32;
                    e * e * metric[c]
                })
                .sum()
        };

        let candidates = [
            [r.less, g.any(), b.any()],
            [r.equal, g.less, b.any()],
            [r.equal, g.equal, b.at_most()],
        ];
        let mut best = &candidates[0];
        for candidate in &candidates[1..] {
            if cost(candidate) < cost(best) {
                best = candidate;
            }
        }

        let [r, g, b] = best.map(|m| m.pair);
        (
            Color16::new(r[0], g[0], b[0]),
            Color16::new(r[1], g[1], b[1]),
        )
    }
}

/// Finds the pairs `(a, b)` whose blend is closest to each target value, for
/// `a < b`, `a == b` and `a > b` separately.
///
/// Among equally close pairs, pairs with closer endpoints win. Remaining ties
/// keep the first pair found.
fn build_matches(bits: u32, blend: impl Fn(u8, u8, u32) -> u8) -> [Matches; 256] {
    let max = (1_u8 << bits) - 1;

    let mut matches = [Matches::NONE; 256];
    for b in 0..=max {
        for a in 0..=max {
            let value = blend(a, b, bits) as i32;
            for (target, m) in matches.iter_mut().enumerate() {
                let candidate = Match {
                    pair: [a, b],
                    error: (value - target as i32).unsigned_abs(),
                };
                let best = m.get_mut(a.cmp(&b));
                *best = best.min(candidate);
            }
        }
    }

    matches
}

struct SingleColorTables {
    /// 2:1 blends for 4-color mode.
    p4: Table,
    /// 1:1 blends for 3-color mode.
    p3: Table,
}

static TABLES: [OnceLock<SingleColorTables>; 4] = [const { OnceLock::new() }; 4];

fn tables(decoder: Decoder) -> &'static SingleColorTables {
    let index = match decoder {
        Decoder::D3D10 => 0,
        Decoder::D3D9 => 1,
        Decoder::Nvidia => 2,
        Decoder::Amd => 3,
    };
    TABLES[index].get_or_init(|| {
        let start = Instant::now();
        let tables = SingleColorTables {
            p4: Table::build(|a, b, bits| decoder.blend_2_1(a, b, bits)),
            p3: Table::build(|a, b, bits| decoder.blend_1_1(a, b, bits)),
        };
        tracing::debug!(?decoder, elapsed = ?start.elapsed(), "built single-color tables");
        tables
    })
}

/// Builds the tables of the given decoder if they haven't been built yet.
pub(crate) fn init(decoder: Decoder) {
    tables(decoder);
}

/// Encodes a solid color in 4-color mode. All pixels use the 2:1 blend.
pub(crate) fn compress_p4(color: [u8; 3], decoder: Decoder) -> BlockDxt1 {
    let (mut c0, mut c1) = tables(decoder).p4.endpoints(color);

    let mut indexes = IndexList::ALL_2;
    if c0 < c1 {
        std::mem::swap(&mut c0, &mut c1);
        indexes = indexes.swap_endpoints();
    }

    BlockDxt1::new(c0, c1, indexes.data())
}

/// Encodes a solid color in 3-color mode. Opaque pixels use the midpoint and
/// transparent pixels use index 3.
///
/// The endpoints stay in the order the table chose them, since some decoders
/// don't blend symmetrically.
pub(crate) fn compress_p3(
    color: [u8; 3],
    alpha_map: AlphaMap,
    decoder: Decoder,
    metric: Vec3A,
) -> BlockDxt1 {
    let (c0, c1) = tables(decoder).p3.endpoints_at_most(color, metric);
    debug_assert!(c0 <= c1);

    let mut indexes = IndexList::new_empty();
    for i in 0..16 {
        indexes.set(i, if alpha_map.is_opaque(i) { 2 } else { 3 });
    }

    BlockDxt1::new(c0, c1, indexes.data())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate_palette;
    use rstest::rstest;

    /// The minimal achievable score `256 * |blend - target| + |a - b|` of a
    /// single channel, by brute force.
    fn brute_force_score(target: u8, bits: u32, blend: impl Fn(u8, u8, u32) -> u8) -> u32 {
        let max = (1_u8 << bits) - 1;
        let mut best = u32::MAX;
        for a in 0..=max {
            for b in 0..=max {
                best = best.min(score(blend(a, b, bits), target, a, b));
            }
        }
        best
    }

    fn score(decoded: u8, target: u8, a: u8, b: u8) -> u32 {
        decoded.abs_diff(target) as u32 * 256 + a.abs_diff(b) as u32
    }

    /// The smallest squared error of a 1:1 blend over the pairs of one channel
    /// accepted by `keep`.
    fn min_midpoint_error(
        target: u8,
        bits: u32,
        decoder: Decoder,
        keep: impl Fn(u8, u8) -> bool,
    ) -> u32 {
        let max = (1_u8 << bits) - 1;
        let mut best = u32::MAX;
        for a in 0..=max {
            for b in 0..=max {
                if keep(a, b) {
                    let d = decoder.blend_1_1(a, b, bits).abs_diff(target) as u32;
                    best = best.min(d * d);
                }
            }
        }
        best
    }

    /// The smallest squared error of any 3-color block of a single color.
    fn best_p3_error([r, g, b]: [u8; 3], decoder: Decoder) -> u32 {
        let any = |_: u8, _: u8| true;
        let g_any = min_midpoint_error(g, 6, decoder, any);
        let b_any = min_midpoint_error(b, 5, decoder, any);

        // color0 <= color1 compares red, then green, then blue
        let red_less = min_midpoint_error(r, 5, decoder, |a, b| a < b) + g_any + b_any;
        let green_less = min_midpoint_error(g, 6, decoder, |a, b| a < b) + b_any;
        let green_equal = min_midpoint_error(g, 6, decoder, |a, b| a == b)
            + min_midpoint_error(b, 5, decoder, |a, b| a <= b);
        let red_equal =
            min_midpoint_error(r, 5, decoder, |a, b| a == b) + green_less.min(green_equal);

        red_less.min(red_equal)
    }

    #[rstest]
    fn p4_matches_brute_force(
        #[values(Decoder::D3D10, Decoder::D3D9, Decoder::Nvidia, Decoder::Amd)] decoder: Decoder,
    ) {
        let blend = |a, b, bits| decoder.blend_2_1(a, b, bits);
        for v in (0..=255).step_by(7) {
            let block = compress_p4([v, v, v], decoder);
            assert!(block.is_four_color() || block.color0 == block.color1);

            let palette = evaluate_palette(block.color0, block.color1, decoder);
            let decoded = palette[block.index(0) as usize];
            let (c0, c1) = (block.color0, block.color1);

            let expected_5 = brute_force_score(v, 5, blend);
            let expected_6 = brute_force_score(v, 6, blend);
            assert_eq!(score(decoded[0], v, c0.r(), c1.r()), expected_5, "{decoder:?} red {v}");
            assert_eq!(score(decoded[1], v, c0.g(), c1.g()), expected_6, "{decoder:?} green {v}");
            assert_eq!(score(decoded[2], v, c0.b(), c1.b()), expected_5, "{decoder:?} blue {v}");
        }
    }

    #[rstest]
    fn p3_matches_brute_force(
        #[values(Decoder::D3D10, Decoder::D3D9, Decoder::Nvidia, Decoder::Amd)] decoder: Decoder,
    ) {
        let mut alpha_map = AlphaMap::ALL_OPAQUE;
        alpha_map.set_transparent(3);

        let mut targets = vec![[0, 62, 0], [4, 62, 0], [255, 255, 255], [100, 150, 200]];
        targets.extend((0..=255_u8).step_by(15).map(|v| [v, 255 - v, v / 2]));
        targets.extend((0..=255_u8).step_by(17).map(|v| [128, v, 255 - v]));
        for color in targets {
            let block = compress_p3(color, alpha_map, decoder, Vec3A::ONE);
            assert!(!block.is_four_color(), "{decoder:?} {color:?}");

            let palette = evaluate_palette(block.color0, block.color1, decoder);
            let error: u32 = (0..3)
                .map(|c| {
                    let d = palette[2][c].abs_diff(color[c]) as u32;
                    d * d
                })
                .sum();
            assert_eq!(error, best_p3_error(color, decoder), "{decoder:?} {color:?}");
        }
    }

    #[test]
    fn p3_keeps_asymmetric_green_blend() {
        // green 62 needs color0.g > color1.g, which red 4 (0 and 1) allows
        let block = compress_p3([4, 62, 0], AlphaMap::ALL_OPAQUE, Decoder::Nvidia, Vec3A::ONE);
        assert!(!block.is_four_color());
        let palette = evaluate_palette(block.color0, block.color1, Decoder::Nvidia);
        assert_eq!(palette[2], [4, 62, 0]);
    }

    #[test]
    fn d3d10_reference_values() {
        // (2 * 123 + 140) / 3 = 128 with endpoints 15 and 17
        let block = compress_p4([128, 64, 200], Decoder::D3D10);
        let palette = evaluate_palette(block.color0, block.color1, Decoder::D3D10);
        for i in 0..16 {
            assert_eq!(palette[block.index(i) as usize], [128, 64, 200]);
        }
    }

    #[test]
    fn p3_uses_midpoint_and_transparent_index() {
        let mut alpha_map = AlphaMap::ALL_OPAQUE;
        alpha_map.set_transparent(0);

        let block = compress_p3([100, 150, 200], alpha_map, Decoder::D3D10, Vec3A::ONE);
        assert!(!block.is_four_color());
        assert_eq!(block.index(0), 3);
        for i in 1..16 {
            assert_eq!(block.index(i), 2);
        }
    }
}
