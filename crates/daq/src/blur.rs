//! Energy and time blurring stages

// crate modules
use crate::process::Process;
use crate::stats::ProcessStats;

// external crates
use gray_physics::Interaction;
use gray_random::GrayRng;

/// Which field gets smeared, and how
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlurFunctor {
    /// Fractional FWHM applied to the deposited energy
    Energy { fwhm_fraction: f64 },
    /// Fractional FWHM that scales as `1/sqrt(E / E_ref)`
    EnergyReferenced { fwhm_fraction: f64, ref_energy: f64 },
    /// Gaussian time smear, rejection-truncated to `max_blur` seconds
    Time { fwhm: f64, max_blur: f64 },
}

impl BlurFunctor {
    fn apply(&self, event: &mut Interaction, rng: &mut GrayRng) {
        match *self {
            Self::Energy { fwhm_fraction } => {
                event.energy = rng.gaussian_energy_blur(event.energy, fwhm_fraction);
            }
            Self::EnergyReferenced {
                fwhm_fraction,
                ref_energy,
            } => {
                event.energy =
                    rng.gaussian_energy_blur_inverse_sqrt(event.energy, fwhm_fraction, ref_energy);
            }
            Self::Time { fwhm, max_blur } => {
                event.time = rng.gaussian_blur_time_trunc(event.time, fwhm, max_blur);
            }
        }
    }
}

/// Stateless smearing stage; commits everything it sees
#[derive(Debug, Clone, Copy)]
pub struct BlurProcess {
    blur: BlurFunctor,
}

impl BlurProcess {
    pub fn new(blur: BlurFunctor) -> Self {
        Self { blur }
    }
}

impl Process for BlurProcess {
    fn name(&self) -> &'static str {
        match self.blur {
            BlurFunctor::Energy { .. } | BlurFunctor::EnergyReferenced { .. } => "blur-energy",
            BlurFunctor::Time { .. } => "blur-time",
        }
    }

    fn process(
        &mut self,
        events: &mut [Interaction],
        stats: &mut ProcessStats,
        rng: &mut GrayRng,
    ) -> usize {
        for event in events.iter_mut() {
            if !event.dropped {
                stats.no_kept += 1;
                self.blur.apply(event, rng);
            }
        }
        events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_at(time: f64, energy: f64) -> Interaction {
        Interaction {
            time,
            energy,
            det_id: 0,
            ..Default::default()
        }
    }

    #[test]
    fn commits_the_whole_slice() {
        let mut blur = BlurProcess::new(BlurFunctor::Energy { fwhm_fraction: 0.1 });
        let mut events = vec![event_at(0.0, 0.511), event_at(1.0, 0.511)];
        let mut stats = ProcessStats::default();
        let mut rng = GrayRng::from_seed(1);

        let horizon = blur.process(&mut events, &mut stats, &mut rng);
        assert_eq!(horizon, 2);
        assert_eq!(stats.no_kept, 2);
        assert!(events.iter().all(|e| e.energy != 0.511));
    }

    #[test]
    fn skips_dropped_events() {
        let mut blur = BlurProcess::new(BlurFunctor::Energy { fwhm_fraction: 0.1 });
        let mut events = vec![event_at(0.0, 0.511)];
        events[0].dropped = true;
        let mut stats = ProcessStats::default();
        let mut rng = GrayRng::from_seed(1);

        blur.process(&mut events, &mut stats, &mut rng);
        assert_eq!(stats.no_kept, 0);
        assert_eq!(events[0].energy, 0.511);
    }

    #[test]
    fn time_blur_is_bounded() {
        let mut blur = BlurProcess::new(BlurFunctor::Time {
            fwhm: 10e-9,
            max_blur: 3e-9,
        });
        let mut events: Vec<Interaction> = (0..200).map(|i| event_at(i as f64, 0.511)).collect();
        let mut stats = ProcessStats::default();
        let mut rng = GrayRng::from_seed(2);

        blur.process(&mut events, &mut stats, &mut rng);
        for (i, event) in events.iter().enumerate() {
            assert!((event.time - i as f64).abs() <= 3e-9);
        }
    }
}
