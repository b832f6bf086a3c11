use glam::{Vec3A, Vec4};

use super::tables::{Coefficients, FOUR_CLUSTER, THREE_CLUSTER};
use super::{ClusterFit, SortedColors, GRID, GRID_RCP};
use crate::encode::color_set::ColorSet;

const GRID4: Vec4 = Vec4::new(GRID[0], GRID[1], GRID[2], 0.0);
const GRID_RCP4: Vec4 = Vec4::new(GRID_RCP[0], GRID_RCP[1], GRID_RCP[2], 0.0);

/// Cluster fit with 4-wide vectors.
///
/// Every vector holds a weighted color in xyz and the weight in w, so color
/// and weight sums are accumulated together.
pub(crate) struct SimdClusterFit {
    count: usize,
    /// Weighted colors in sorted order, plus a trailing zero.
    weighted: [Vec4; 17],
    xsum: Vec4,
    metric_sqr: Vec4,
    /// Whether the precomputed partition tables apply.
    use_tables: bool,
    best_error: f32,
}

impl SimdClusterFit {
    #[inline(always)]
    fn solve(&self, coefficients: &Coefficients, alphax: Vec4, betax: Vec4) -> (Vec4, Vec4, f32) {
        let Coefficients {
            alpha2,
            beta2,
            alphabeta,
            factor,
        } = *coefficients;

        let a = ((alphax * beta2 - betax * alphabeta) * factor).clamp(Vec4::ZERO, Vec4::ONE);
        let b = ((betax * alpha2 - alphax * alphabeta) * factor).clamp(Vec4::ZERO, Vec4::ONE);
        let a = (GRID4 * a + 0.5).floor() * GRID_RCP4;
        let b = (GRID4 * b + 0.5).floor() * GRID_RCP4;

        let e1 = a * a * alpha2 + b * b * beta2;
        let e2 = a * b * alphabeta - a * alphax;
        let e3 = e2 - b * betax;
        let e4 = e3 * 2.0 + e1;
        let m = self.metric_sqr;
        let error = e4.x * m.x + e4.y * m.y + e4.z * m.z;

        (a, b, error)
    }

    #[inline(always)]
    fn coefficients4(&self, i: usize, x0: Vec4, x1: Vec4, x2: Vec4, x3: Vec4) -> Coefficients {
        if self.use_tables {
            FOUR_CLUSTER[i]
        } else {
            Coefficients::four(x0.w, x1.w, x2.w, x3.w)
        }
    }
    #[inline(always)]
    fn coefficients3(&self, i: usize, x0: Vec4, x1: Vec4, x2: Vec4) -> Coefficients {
        if self.use_tables {
            THREE_CLUSTER[i]
        } else {
            Coefficients::three(x0.w, x1.w, x2.w)
        }
    }
}

fn to_vec3a(v: Vec4) -> Vec3A {
    Vec3A::from(v.truncate())
}

impl ClusterFit for SimdClusterFit {
    fn new(set: &ColorSet, metric: Vec3A) -> Self {
        let sorted = SortedColors::new(set);

        let mut weighted = [Vec4::ZERO; 17];
        let mut xsum = Vec4::ZERO;
        for i in 0..sorted.count {
            let c = sorted.colors[i];
            weighted[i] = Vec4::new(c.x, c.y, c.z, 1.0) * sorted.weights[i];
            xsum += weighted[i];
        }

        let metric = metric.extend(0.0);
        Self {
            count: sorted.count,
            weighted,
            xsum,
            metric_sqr: metric * metric,
            use_tables: set.is_16_unit_weights(),
            best_error: f32::MAX,
        }
    }

    fn compress4(&mut self) -> Option<(Vec3A, Vec3A)> {
        let count = self.count;
        let mut best: Option<(Vec4, Vec4)> = None;
        let mut best_error = f32::MAX;

        let mut i = 0;
        let mut x0 = Vec4::ZERO;
        for c0 in 0..=count {
            let mut x1 = Vec4::ZERO;
            for c1 in 0..=count - c0 {
                let mut x2 = Vec4::ZERO;
                for c2 in 0..=count - c0 - c1 {
                    let c3 = count - c0 - c1 - c2;
                    if c0 != count && c1 != count && c2 != count && c3 != count {
                        let x3 = self.xsum - x2 - x1 - x0;

                        let coefficients = self.coefficients4(i, x0, x1, x2, x3);
                        if coefficients.is_solvable() {
                            let alphax = x0 + x1 * (2.0 / 3.0) + x2 * (1.0 / 3.0);
                            let betax = x3 + x2 * (2.0 / 3.0) + x1 * (1.0 / 3.0);

                            let (a, b, error) = self.solve(&coefficients, alphax, betax);
                            if error < best_error {
                                best_error = error;
                                best = Some((a, b));
                            }
                        }
                    }

                    i += 1;
                    x2 += self.weighted[c0 + c1 + c2];
                }

                x1 += self.weighted[c0 + c1];
            }

            x0 += self.weighted[c0];
        }

        match best {
            Some((a, b)) if best_error < self.best_error => {
                self.best_error = best_error;
                Some((to_vec3a(a), to_vec3a(b)))
            }
            _ => None,
        }
    }

    fn compress3(&mut self) -> Option<(Vec3A, Vec3A)> {
        let count = self.count;
        let mut best: Option<(Vec4, Vec4)> = None;
        let mut best_error = f32::MAX;

        let mut i = 0;
        let mut x0 = Vec4::ZERO;
        for c0 in 0..=count {
            let mut x1 = Vec4::ZERO;
            for c1 in 0..=count - c0 {
                let c2 = count - c0 - c1;
                if c0 != count && c1 != count && c2 != count {
                    let x2 = self.xsum - x1 - x0;

                    let coefficients = self.coefficients3(i, x0, x1, x2);
                    if coefficients.is_solvable() {
                        let alphax = x0 + x1 * 0.5;
                        let betax = x2 + x1 * 0.5;

                        let (a, b, error) = self.solve(&coefficients, alphax, betax);
                        if error < best_error {
                            best_error = error;
                            best = Some((a, b));
                        }
                    }
                }

                i += 1;
                x1 += self.weighted[c0 + c1];
            }

            x0 += self.weighted[c0];
        }

        match best {
            Some((a, b)) if best_error <= self.best_error => {
                self.best_error = best_error;
                Some((to_vec3a(a), to_vec3a(b)))
            }
            _ => None,
        }
    }

    fn best_error(&self) -> f32 {
        self.best_error
    }
}
