use glam::{Vec3, Vec3A};

use super::tables::Coefficients;
use super::{ClusterFit, SortedColors, GRID, GRID_RCP};
use crate::encode::color_set::ColorSet;

/// Cluster fit with scalar math. Partition coefficients are always computed
/// on the fly.
pub(crate) struct ScalarClusterFit {
    count: usize,
    /// Weighted colors in sorted order. The extra trailing zero lets the
    /// loops advance their running sums past the last color.
    weighted: [Vec3; 17],
    weights: [f32; 17],
    xsum: Vec3,
    wsum: f32,
    metric_sqr: Vec3,
    best_error: f32,
}

impl ScalarClusterFit {
    #[inline(always)]
    fn solve(&self, coefficients: &Coefficients, alphax: Vec3, betax: Vec3) -> (Vec3, Vec3, f32) {
        let Coefficients {
            alpha2,
            beta2,
            alphabeta,
            factor,
        } = *coefficients;

        let grid = Vec3::from_array(GRID);
        let grid_rcp = Vec3::from_array(GRID_RCP);

        let a = ((alphax * beta2 - betax * alphabeta) * factor).clamp(Vec3::ZERO, Vec3::ONE);
        let b = ((betax * alpha2 - alphax * alphabeta) * factor).clamp(Vec3::ZERO, Vec3::ONE);
        let a = (grid * a + 0.5).floor() * grid_rcp;
        let b = (grid * b + 0.5).floor() * grid_rcp;

        // the sum of squared colors is the same for all partitions, so it's
        // left out
        let e1 = a * a * alpha2 + b * b * beta2;
        let e2 = a * b * alphabeta - a * alphax;
        let e3 = e2 - b * betax;
        let e4 = e3 * 2.0 + e1;
        let m = self.metric_sqr;
        let error = e4.x * m.x + e4.y * m.y + e4.z * m.z;

        (a, b, error)
    }
}

impl ClusterFit for ScalarClusterFit {
    fn new(set: &ColorSet, metric: Vec3A) -> Self {
        let sorted = SortedColors::new(set);

        let mut weighted = [Vec3::ZERO; 17];
        let mut weights = [0.0; 17];
        let mut xsum = Vec3::ZERO;
        let mut wsum = 0.0;
        for i in 0..sorted.count {
            let w = sorted.weights[i];
            weighted[i] = Vec3::from(sorted.colors[i]) * w;
            weights[i] = w;
            xsum += weighted[i];
            wsum += w;
        }

        let metric = Vec3::from(metric);
        Self {
            count: sorted.count,
            weighted,
            weights,
            xsum,
            wsum,
            metric_sqr: metric * metric,
            best_error: f32::MAX,
        }
    }

    fn compress4(&mut self) -> Option<(Vec3A, Vec3A)> {
        let count = self.count;
        let mut best: Option<(Vec3, Vec3)> = None;
        let mut best_error = f32::MAX;

        let mut x0 = Vec3::ZERO;
        let mut w0 = 0.0;
        for c0 in 0..=count {
            let mut x1 = Vec3::ZERO;
            let mut w1 = 0.0;
            for c1 in 0..=count - c0 {
                let mut x2 = Vec3::ZERO;
                let mut w2 = 0.0;
                for c2 in 0..=count - c0 - c1 {
                    let c3 = count - c0 - c1 - c2;
                    if c0 != count && c1 != count && c2 != count && c3 != count {
                        let x3 = self.xsum - x2 - x1 - x0;
                        let w3 = self.wsum - w2 - w1 - w0;

                        let coefficients = Coefficients::four(w0, w1, w2, w3);
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

                    let i = c0 + c1 + c2;
                    x2 += self.weighted[i];
                    w2 += self.weights[i];
                }

                x1 += self.weighted[c0 + c1];
                w1 += self.weights[c0 + c1];
            }

            x0 += self.weighted[c0];
            w0 += self.weights[c0];
        }

        match best {
            Some((a, b)) if best_error < self.best_error => {
                self.best_error = best_error;
                Some((a.into(), b.into()))
            }
            _ => None,
        }
    }

    fn compress3(&mut self) -> Option<(Vec3A, Vec3A)> {
        let count = self.count;
        let mut best: Option<(Vec3, Vec3)> = None;
        let mut best_error = f32::MAX;

        let mut x0 = Vec3::ZERO;
        let mut w0 = 0.0;
        for c0 in 0..=count {
            let mut x1 = Vec3::ZERO;
            let mut w1 = 0.0;
            for c1 in 0..=count - c0 {
                let c2 = count - c0 - c1;
                if c0 != count && c1 != count && c2 != count {
                    let x2 = self.xsum - x1 - x0;
                    let w2 = self.wsum - w1 - w0;

                    let coefficients = Coefficients::three(w0, w1, w2);
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

                x1 += self.weighted[c0 + c1];
                w1 += self.weights[c0 + c1];
            }

            x0 += self.weighted[c0];
            w0 += self.weights[c0];
        }

        // ties go to 3-color blocks
        match best {
            Some((a, b)) if best_error <= self.best_error => {
                self.best_error = best_error;
                Some((a.into(), b.into()))
            }
            _ => None,
        }
    }

    fn best_error(&self) -> f32 {
        self.best_error
    }
}
