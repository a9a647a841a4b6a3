//! Per-rank sampling façade

// crate modules
use crate::mt19937::Mt19937;
use crate::transform;
use crate::FWHM_TO_SIGMA;

// external crates
use gray_vrmath::Vec3;
use rand::Rng;
use rand_distr::{Distribution, Exp, StandardNormal};

/// Owned random number source for a single simulation rank
///
/// Wraps the [Mt19937] engine with the distributions and vector samplers the
/// physics code draws from. Each rank owns exactly one of these; there is no
/// process-global generator.
#[derive(Debug, Clone)]
pub struct GrayRng {
    engine: Mt19937,
    seed: u64,
}

impl GrayRng {
    /// Engine seeded with the reference default
    pub fn new() -> Self {
        Self::from_seed(u64::from(Mt19937::DEFAULT_SEED))
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            engine: Mt19937::new(seed as u32),
            seed,
        }
    }

    /// The seed this rank is currently running on
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Decorrelate a parallel rank from the base seed
    ///
    /// Rank 0 keeps the base stream. Every other rank discards `rank` values
    /// and reseeds from the next engine output, so sibling ranks share no
    /// prefix of the base sequence.
    pub fn rank_reseed(&mut self, rank: usize) {
        if rank > 0 {
            self.engine.discard(rank as u64);
            let new_seed = u64::from(self.engine.next_value());
            self.engine.reseed(new_seed as u32);
            self.seed = new_seed;
        }
    }

    /// Raw engine output
    pub fn int(&mut self) -> u32 {
        self.engine.next_value()
    }

    /// Uniform variate in `[0, 1)`
    pub fn uniform(&mut self) -> f64 {
        self.engine.gen()
    }

    /// Standard normal variate
    pub fn gaussian(&mut self) -> f64 {
        StandardNormal.sample(&mut self.engine)
    }

    /// Exponential variate with rate `lambda`
    ///
    /// A non-positive rate means the process never fires.
    pub fn exponential(&mut self, lambda: f64) -> f64 {
        match Exp::new(lambda) {
            Ok(distribution) => distribution.sample(&mut self.engine),
            Err(_) => f64::INFINITY,
        }
    }

    /// Bernoulli trial
    pub fn selection(&mut self, probability: f64) -> bool {
        self.uniform() < probability
    }

    pub fn uniform_sphere(&mut self) -> Vec3 {
        let u = self.uniform();
        let v = self.uniform();
        transform::uniform_sphere(u, v)
    }

    pub fn uniform_sphere_filled(&mut self) -> Vec3 {
        let u = self.uniform();
        let v = self.uniform();
        let w = self.uniform();
        transform::uniform_sphere_filled(u, v, w)
    }

    /// Scattering deflection at a given polar cosine
    pub fn deflection(&mut self, reference: &Vec3, cos_theta: f64) -> Vec3 {
        let u_phi = self.uniform();
        transform::deflection(reference, cos_theta, u_phi)
    }

    /// Gaussian angular deviation from a reference direction
    pub fn acolinearity(&mut self, reference: &Vec3, sigma_radians: f64) -> Vec3 {
        if sigma_radians == 0.0 {
            return *reference;
        }
        let u_phi = self.uniform();
        let gaussian = self.gaussian();
        transform::acolinearity(reference, sigma_radians, u_phi, gaussian)
    }

    pub fn uniform_cylinder(&mut self, height: f64, radius: f64) -> Vec3 {
        let u = self.uniform();
        let v = self.uniform();
        let w = self.uniform();
        transform::uniform_cylinder(height, radius, u, v, w)
    }

    pub fn uniform_annulus_cylinder(&mut self, height: f64, radius: f64) -> Vec3 {
        let u = self.uniform();
        let v = self.uniform();
        transform::uniform_annulus_cylinder(height, radius, u, v)
    }

    pub fn uniform_rectangle(&mut self, size: &Vec3) -> Vec3 {
        let u = self.uniform();
        let v = self.uniform();
        let w = self.uniform();
        transform::uniform_rectangle(size, u, v, w)
    }

    /// Gaussian energy blur with a fixed fractional FWHM
    pub fn gaussian_energy_blur(&mut self, energy: f64, fwhm_fraction: f64) -> f64 {
        energy * (1.0 + fwhm_fraction / FWHM_TO_SIGMA * self.gaussian())
    }

    /// Energy blur whose fractional width scales as `1/sqrt(E / E_ref)`
    pub fn gaussian_energy_blur_inverse_sqrt(
        &mut self,
        energy: f64,
        fwhm_fraction: f64,
        ref_energy: f64,
    ) -> f64 {
        let width = fwhm_fraction / (energy / ref_energy).sqrt();
        energy * (1.0 + width / FWHM_TO_SIGMA * self.gaussian())
    }

    /// Gaussian time blur, rejection-truncated to `|delta| <= max_blur`
    pub fn gaussian_blur_time_trunc(&mut self, time: f64, fwhm: f64, max_blur: f64) -> f64 {
        let sigma = fwhm / FWHM_TO_SIGMA;
        loop {
            let delta = sigma * self.gaussian();
            if delta.abs() <= max_blur {
                return time + delta;
            }
        }
    }

    /// Isotropic Gaussian positron range, truncated at `max` centimetres
    pub fn truncated_gaussian_range(&mut self, sigma_cm: f64, max_cm: f64) -> Vec3 {
        loop {
            let range = Vec3::new(
                sigma_cm * self.gaussian(),
                sigma_cm * self.gaussian(),
                sigma_cm * self.gaussian(),
            );
            if range.norm() <= max_cm {
                return range;
            }
        }
    }

    /// Double-exponential (Levin) positron range, truncated at `max`
    ///
    /// Radial distance from the two-exponential mixture, direction uniform
    /// on the sphere.
    pub fn truncated_levin_double_exp(&mut self, c: f64, k1: f64, k2: f64, max_cm: f64) -> Vec3 {
        let direction = self.uniform_sphere();
        loop {
            let radius = if self.selection(c) {
                self.exponential(k1)
            } else {
                self.exponential(k2)
            };
            if radius <= max_cm {
                return direction * radius;
            }
        }
    }
}

impl Default for GrayRng {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_stays_in_unit_interval() {
        let mut rng = GrayRng::from_seed(17);
        for _ in 0..1000 {
            let u = rng.uniform();
            assert!((0.0..1.0).contains(&u));
        }
    }

    #[test]
    fn time_blur_respects_truncation() {
        let mut rng = GrayRng::from_seed(99);
        for _ in 0..1000 {
            let blurred = rng.gaussian_blur_time_trunc(10.0, 2.0, 0.5);
            assert!((blurred - 10.0).abs() <= 0.5);
        }
    }

    #[test]
    fn truncated_ranges_respect_bounds() {
        let mut rng = GrayRng::from_seed(7);
        for _ in 0..200 {
            assert!(rng.truncated_gaussian_range(0.1, 0.2).norm() <= 0.2);
            assert!(rng.truncated_levin_double_exp(0.5, 10.0, 50.0, 0.3).norm() <= 0.3);
        }
    }

    #[test]
    fn rank_reseed_diverges_from_base() {
        let mut base = GrayRng::from_seed(1000);
        let mut rank = GrayRng::from_seed(1000);
        rank.rank_reseed(3);
        assert_ne!(base.int(), rank.int());
    }
}
