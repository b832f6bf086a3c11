//! Partition coefficients for blocks of 16 colors with unit weights.
//!
//! The coefficients of a partition only depend on the cluster sizes, so for
//! the common case of 16 distinct, equally weighted colors they can be
//! computed once at compile time. Entries are stored in the order the cluster
//! fit loops visit them, including partitions the fit skips.

/// The 2x2 normal matrix of a partition and the reciprocal of its
/// determinant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Coefficients {
    pub alpha2: f32,
    pub beta2: f32,
    pub alphabeta: f32,
    pub factor: f32,
}
impl Coefficients {
    const ZERO: Self = Self {
        alpha2: 0.0,
        beta2: 0.0,
        alphabeta: 0.0,
        factor: 0.0,
    };

    /// Coefficients for the 4 clusters `{1, 2/3, 1/3, 0}` with the given
    /// total weights.
    #[inline(always)]
    pub const fn four(w0: f32, w1: f32, w2: f32, w3: f32) -> Self {
        let alpha2 = w0 + w1 * (4.0 / 9.0) + w2 * (1.0 / 9.0);
        let beta2 = w3 + w2 * (4.0 / 9.0) + w1 * (1.0 / 9.0);
        let alphabeta = (w1 + w2) * (2.0 / 9.0);
        let factor = 1.0 / (alpha2 * beta2 - alphabeta * alphabeta);
        Self {
            alpha2,
            beta2,
            alphabeta,
            factor,
        }
    }

    /// Coefficients for the 3 clusters `{1, 1/2, 0}` with the given total
    /// weights.
    #[inline(always)]
    pub const fn three(w0: f32, w1: f32, w2: f32) -> Self {
        let alpha2 = w0 + w1 * 0.25;
        let beta2 = w2 + w1 * 0.25;
        let alphabeta = w1 * 0.25;
        let factor = 1.0 / (alpha2 * beta2 - alphabeta * alphabeta);
        Self {
            alpha2,
            beta2,
            alphabeta,
            factor,
        }
    }

    /// Whether the partition has a unique least squares solution.
    #[inline(always)]
    pub fn is_solvable(&self) -> bool {
        self.factor.is_finite() && self.factor > 0.0
    }
}

const COUNT: usize = 16;
/// The number of ways to split 16 sorted colors into 4 ordered runs.
pub(crate) const FOUR_CLUSTER_LEN: usize = 969;
/// The number of ways to split 16 sorted colors into 3 ordered runs.
pub(crate) const THREE_CLUSTER_LEN: usize = 153;

pub(crate) static FOUR_CLUSTER: [Coefficients; FOUR_CLUSTER_LEN] = build_four_cluster();
pub(crate) static THREE_CLUSTER: [Coefficients; THREE_CLUSTER_LEN] = build_three_cluster();

const fn build_four_cluster() -> [Coefficients; FOUR_CLUSTER_LEN] {
    let mut table = [Coefficients::ZERO; FOUR_CLUSTER_LEN];
    let mut i = 0;
    let mut c0 = 0;
    while c0 <= COUNT {
        let mut c1 = 0;
        while c1 <= COUNT - c0 {
            let mut c2 = 0;
            while c2 <= COUNT - c0 - c1 {
                let c3 = COUNT - c0 - c1 - c2;
                table[i] = Coefficients::four(c0 as f32, c1 as f32, c2 as f32, c3 as f32);
                i += 1;
                c2 += 1;
            }
            c1 += 1;
        }
        c0 += 1;
    }
    assert!(i == FOUR_CLUSTER_LEN);
    table
}

const fn build_three_cluster() -> [Coefficients; THREE_CLUSTER_LEN] {
    let mut table = [Coefficients::ZERO; THREE_CLUSTER_LEN];
    let mut i = 0;
    let mut c0 = 0;
    while c0 <= COUNT {
        let mut c1 = 0;
        while c1 <= COUNT - c0 {
            let c2 = COUNT - c0 - c1;
            table[i] = Coefficients::three(c0 as f32, c1 as f32, c2 as f32);
            i += 1;
            c1 += 1;
        }
        c0 += 1;
    }
    assert!(i == THREE_CLUSTER_LEN);
    table
}
