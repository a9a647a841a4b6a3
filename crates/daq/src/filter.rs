//! Energy gating stages

// crate modules
use crate::process::Process;
use crate::stats::ProcessStats;

// external crates
use gray_physics::Interaction;
use gray_random::GrayRng;

/// Keep-or-drop predicate on a single event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterFunctor {
    /// Keep events with energy at or above the threshold
    EnergyGateLow { threshold: f64 },
    /// Keep events with energy at or below the threshold
    EnergyGateHigh { threshold: f64 },
}

impl FilterFunctor {
    fn keep(&self, event: &Interaction) -> bool {
        match *self {
            Self::EnergyGateLow { threshold } => event.energy >= threshold,
            Self::EnergyGateHigh { threshold } => event.energy <= threshold,
        }
    }
}

/// Marks events outside the gate as dropped; commits everything it sees
#[derive(Debug, Clone, Copy)]
pub struct FilterProcess {
    filter: FilterFunctor,
}

impl FilterProcess {
    pub fn new(filter: FilterFunctor) -> Self {
        Self { filter }
    }
}

impl Process for FilterProcess {
    fn name(&self) -> &'static str {
        "filter-energy"
    }

    fn process(
        &mut self,
        events: &mut [Interaction],
        stats: &mut ProcessStats,
        _rng: &mut GrayRng,
    ) -> usize {
        for event in events.iter_mut() {
            if event.dropped {
                continue;
            }
            if self.filter.keep(event) {
                stats.no_kept += 1;
            } else {
                event.dropped = true;
                stats.no_dropped += 1;
            }
        }
        events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn event_with_energy(energy: f64) -> Interaction {
        Interaction {
            energy,
            ..Default::default()
        }
    }

    #[rstest]
    #[case(FilterFunctor::EnergyGateLow { threshold: 0.35 }, vec![false, true, true])]
    #[case(FilterFunctor::EnergyGateHigh { threshold: 0.65 }, vec![true, true, false])]
    fn gates_mark_out_of_window_events(
        #[case] functor: FilterFunctor,
        #[case] expected_kept: Vec<bool>,
    ) {
        let mut filter = FilterProcess::new(functor);
        let mut events = vec![
            event_with_energy(0.2),
            event_with_energy(0.511),
            event_with_energy(0.8),
        ];
        let mut stats = ProcessStats::default();
        let mut rng = GrayRng::from_seed(1);

        let horizon = filter.process(&mut events, &mut stats, &mut rng);
        assert_eq!(horizon, 3);
        let kept: Vec<bool> = events.iter().map(|e| !e.dropped).collect();
        assert_eq!(kept, expected_kept);
        assert_eq!(
            stats.no_kept as usize,
            expected_kept.iter().filter(|&&k| k).count()
        );
    }
}
