//! Precomputed scatter-angle CDFs
//!
//! Both coherent and incoherent scattering sample their polar angle from
//! tabulated differential cross sections. The tables are integrated once per
//! material into per-energy CDFs over a fixed `cos(theta)` grid, and sampling
//! is an inverse-CDF lookup.

/// Number of points on the `cos(theta)` grid the CDFs are binned over
pub(crate) const NUM_SCATTER_ANGLES: usize = 1024;

/// Clamped linear interpolation over a tabulated function
pub(crate) fn lerp_table(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[xs.len() - 1] {
        return ys[ys.len() - 1];
    }
    let upper = xs.partition_point(|&probe| probe < x);
    let (x0, x1) = (xs[upper - 1], xs[upper]);
    let alpha = (x - x0) / (x1 - x0);
    ys[upper - 1] * (1.0 - alpha) + ys[upper] * alpha
}

/// Uniformly spaced `cos(theta)` grid on `[-1, 1]`
pub(crate) fn costheta_grid() -> Vec<f64> {
    (0..NUM_SCATTER_ANGLES)
        .map(|i| -1.0 + 2.0 * i as f64 / (NUM_SCATTER_ANGLES - 1) as f64)
        .collect()
}

/// Per-energy inverse CDFs of a differential cross section
#[derive(Debug, Clone, Default)]
pub(crate) struct ScatterCdf {
    energies: Vec<f64>,
    costhetas: Vec<f64>,
    cdfs: Vec<Vec<f64>>,
}

impl ScatterCdf {
    /// Bin `dsigma(energy, cos_theta)` into normalised CDFs, one row per
    /// tabulated energy
    pub(crate) fn new(
        energies: &[f64],
        dsigma: impl Fn(f64, f64) -> f64,
    ) -> Self {
        let costhetas = costheta_grid();
        let cdfs = energies
            .iter()
            .map(|&energy| {
                let values: Vec<f64> = costhetas
                    .iter()
                    .map(|&cos_theta| dsigma(energy, cos_theta))
                    .collect();
                let mut cdf = vec![0.0; costhetas.len()];
                for i in 1..costhetas.len() {
                    cdf[i] = cdf[i - 1]
                        + 0.5 * (values[i] + values[i - 1]) * (costhetas[i] - costhetas[i - 1]);
                }
                let total = cdf[costhetas.len() - 1];
                if total > 0.0 {
                    for value in cdf.iter_mut() {
                        *value /= total;
                    }
                } else {
                    // degenerate cross section, fall back to isotropic
                    for (i, value) in cdf.iter_mut().enumerate() {
                        *value = i as f64 / (costhetas.len() - 1) as f64;
                    }
                }
                cdf
            })
            .collect();

        Self {
            energies: energies.to_vec(),
            costhetas,
            cdfs,
        }
    }

    /// Map a uniform variate onto a scattering cosine at the given energy
    ///
    /// The energy row is chosen nearest-neighbour, then the inverse CDF is
    /// linearly interpolated to convert `u` into `cos(theta)`.
    pub(crate) fn scatter_angle(&self, energy: f64, u: f64) -> f64 {
        let upper = self.energies.partition_point(|&probe| probe < energy);
        let row = if upper == 0 {
            0
        } else if upper >= self.energies.len() {
            self.energies.len() - 1
        } else if energy - self.energies[upper - 1] <= self.energies[upper] - energy {
            upper - 1
        } else {
            upper
        };

        let cdf = &self.cdfs[row];
        let bin = cdf.partition_point(|&probe| probe < u);
        if bin == 0 {
            return self.costhetas[0];
        }
        if bin >= cdf.len() {
            return self.costhetas[cdf.len() - 1];
        }
        let span = cdf[bin] - cdf[bin - 1];
        let alpha = if span > 0.0 { (u - cdf[bin - 1]) / span } else { 0.0 };
        self.costhetas[bin - 1] + alpha * (self.costhetas[bin] - self.costhetas[bin - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_clamps_and_interpolates() {
        let xs = [0.0, 1.0, 2.0];
        let ys = [10.0, 20.0, 40.0];
        assert_eq!(lerp_table(&xs, &ys, -1.0), 10.0);
        assert_eq!(lerp_table(&xs, &ys, 3.0), 40.0);
        assert!((lerp_table(&xs, &ys, 1.5) - 30.0).abs() < 1e-12);
    }

    #[test]
    fn isotropic_cdf_inverts_linearly() {
        // a flat dsigma over cos(theta) means u maps linearly onto [-1, 1]
        let cdf = ScatterCdf::new(&[0.511], |_, _| 1.0);
        assert!((cdf.scatter_angle(0.511, 0.5) - 0.0).abs() < 1e-9);
        assert!((cdf.scatter_angle(0.511, 0.25) + 0.5).abs() < 1e-9);
        assert!((cdf.scatter_angle(0.511, 1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn sampled_cosines_stay_in_range() {
        let cdf = ScatterCdf::new(&[0.1, 0.5, 1.0], |energy, cos_theta| {
            (1.0 + cos_theta * cos_theta) * energy
        });
        for i in 0..100 {
            let u = i as f64 / 99.0;
            let cos_theta = cdf.scatter_angle(0.3, u);
            assert!((-1.0..=1.0).contains(&cos_theta));
        }
    }
}
