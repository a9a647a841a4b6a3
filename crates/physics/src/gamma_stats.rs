//! Tabulated gamma cross sections and angle sampling

// crate modules
use crate::compton;
use crate::rayleigh;
use crate::scatter::ScatterCdf;

// standard library
use std::sync::atomic::{AtomicUsize, Ordering};

/// Linear attenuation coefficients at one energy, in 1/cm
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AttenLengths {
    pub photoelectric: f64,
    pub compton: f64,
    pub rayleigh: f64,
}

impl AttenLengths {
    pub fn total(&self) -> f64 {
        self.photoelectric + self.compton + self.rayleigh
    }
}

/// Energy-indexed cross-section tables for one material
///
/// Channels are interpolated log-log on a shared monotonic energy grid and
/// saturate to the boundary values outside it. The scatter-angle CDFs are
/// precomputed once at construction; per-interaction sampling is a pair of
/// binary searches.
#[derive(Debug)]
pub struct GammaStats {
    energy: Vec<f64>,
    photoelectric: Vec<f64>,
    compton: Vec<f64>,
    rayleigh: Vec<f64>,
    log_energy: Vec<f64>,
    log_photoelectric: Vec<f64>,
    log_compton: Vec<f64>,
    log_rayleigh: Vec<f64>,
    xray_escape: Vec<f64>,
    xray_probs: Vec<f64>,
    auger_probs: Vec<f64>,
    compton_cdf: ScatterCdf,
    rayleigh_cdf: ScatterCdf,
    // cache for the repeated nearby lookups of a photon random walk
    cache_idx: AtomicUsize,
}

impl Clone for GammaStats {
    fn clone(&self) -> Self {
        Self {
            energy: self.energy.clone(),
            photoelectric: self.photoelectric.clone(),
            compton: self.compton.clone(),
            rayleigh: self.rayleigh.clone(),
            log_energy: self.log_energy.clone(),
            log_photoelectric: self.log_photoelectric.clone(),
            log_compton: self.log_compton.clone(),
            log_rayleigh: self.log_rayleigh.clone(),
            xray_escape: self.xray_escape.clone(),
            xray_probs: self.xray_probs.clone(),
            auger_probs: self.auger_probs.clone(),
            compton_cdf: self.compton_cdf.clone(),
            rayleigh_cdf: self.rayleigh_cdf.clone(),
            cache_idx: AtomicUsize::new(self.cache_idx.load(Ordering::Relaxed)),
        }
    }
}

impl GammaStats {
    /// Build the stats from validated tables
    ///
    /// The caller (material loading) has already checked lengths, energy
    /// monotonicity, and sign constraints.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        energy: Vec<f64>,
        photoelectric: Vec<f64>,
        compton: Vec<f64>,
        rayleigh: Vec<f64>,
        x: Vec<f64>,
        form_factor: Vec<f64>,
        scattering_func: Vec<f64>,
        xray_escape: Vec<f64>,
        xray_probs: Vec<f64>,
        auger_probs: Vec<f64>,
    ) -> Self {
        let log = |values: &[f64]| values.iter().map(|v| v.max(f64::MIN_POSITIVE).ln()).collect();
        let compton_cdf = ScatterCdf::new(&energy, |e, cos_theta| {
            compton::dsigma(e, cos_theta, &x, &scattering_func)
        });
        let rayleigh_cdf = ScatterCdf::new(&energy, |e, cos_theta| {
            rayleigh::dsigma(e, cos_theta, &x, &form_factor)
        });

        Self {
            log_energy: log(&energy),
            log_photoelectric: log(&photoelectric),
            log_compton: log(&compton),
            log_rayleigh: log(&rayleigh),
            energy,
            photoelectric,
            compton,
            rayleigh,
            xray_escape,
            xray_probs,
            auger_probs,
            compton_cdf,
            rayleigh_cdf,
            cache_idx: AtomicUsize::new(0),
        }
    }

    /// Attenuation coefficients at `energy`, log-log interpolated
    ///
    /// At or below the grid minimum and at or above the maximum the values
    /// saturate to the boundary entries.
    pub fn get_atten_lengths(&self, energy: f64) -> AttenLengths {
        let last = self.energy.len() - 1;
        if energy <= self.energy[0] {
            return AttenLengths {
                photoelectric: self.photoelectric[0],
                compton: self.compton[0],
                rayleigh: self.rayleigh[0],
            };
        }
        if energy >= self.energy[last] {
            return AttenLengths {
                photoelectric: self.photoelectric[last],
                compton: self.compton[last],
                rayleigh: self.rayleigh[last],
            };
        }

        let idx = self.index(energy);
        let alpha = (energy.ln() - self.log_energy[idx])
            / (self.log_energy[idx + 1] - self.log_energy[idx]);
        AttenLengths {
            photoelectric: self.channel(&self.photoelectric, &self.log_photoelectric, idx, alpha),
            compton: self.channel(&self.compton, &self.log_compton, idx, alpha),
            rayleigh: self.channel(&self.rayleigh, &self.log_rayleigh, idx, alpha),
        }
    }

    /// Sample a Compton scattering cosine
    pub fn comp_scatter_angle(&self, energy: f64, u: f64) -> f64 {
        self.compton_cdf.scatter_angle(energy, u)
    }

    /// Sample a Rayleigh scattering cosine
    pub fn rayl_scatter_angle(&self, energy: f64, u: f64) -> f64 {
        self.rayleigh_cdf.scatter_angle(energy, u)
    }

    /// Draw the x-ray fluorescence outcome of a photoelectric absorption
    ///
    /// Walks the escape lines below the photon energy, weighting each by its
    /// emission probability net of internal (Auger) conversion. `None` means
    /// the full photon energy is absorbed.
    pub fn get_escape(&self, u: f64, photon_energy: f64) -> Option<f64> {
        let mut cumulative = 0.0;
        for (line, (&escape_energy, &prob)) in
            self.xray_escape.iter().zip(&self.xray_probs).enumerate()
        {
            if escape_energy >= photon_energy {
                continue;
            }
            let auger = self.auger_probs.get(line).copied().unwrap_or(0.0);
            cumulative += prob * (1.0 - auger);
            if u < cumulative {
                return Some(escape_energy);
            }
        }
        None
    }

    pub fn num_escape_lines(&self) -> usize {
        self.xray_escape.len()
    }

    /// Cached-index search for the grid interval containing `energy`
    fn index(&self, energy: f64) -> usize {
        let cached = self.cache_idx.load(Ordering::Relaxed);
        if energy >= self.energy[cached] && energy < self.energy[cached + 1] {
            return cached;
        }
        let idx = self
            .energy
            .partition_point(|&probe| probe < energy)
            .saturating_sub(1)
            .min(self.energy.len() - 2);
        self.cache_idx.store(idx, Ordering::Relaxed);
        idx
    }

    /// Log-log interpolation of one channel, falling back to linear when a
    /// tabulated value is zero
    fn channel(&self, values: &[f64], log_values: &[f64], idx: usize, alpha: f64) -> f64 {
        if values[idx] > 0.0 && values[idx + 1] > 0.0 {
            (log_values[idx] * (1.0 - alpha) + log_values[idx + 1] * alpha).exp()
        } else {
            values[idx] * (1.0 - alpha) + values[idx + 1] * alpha
        }
    }
}
