//! Detector deadtime emulation

// crate modules
use crate::process::{mapped_id, IdLookup, Process};
use crate::stats::ProcessStats;

// external crates
use gray_physics::Interaction;
use gray_random::GrayRng;

/// Suppresses events arriving within the deadtime of an earlier live event
/// on the same component
///
/// Non-paralyzable: the window is fixed at `tau` from the live event.
/// Paralyzable: every suppressed arrival restarts the window from its own
/// time, so a busy component can stay dead indefinitely.
///
/// The horizon is the earliest live event whose window is still open at the
/// end of the slice; later arrivals may still fall inside it.
#[derive(Debug, Clone)]
pub struct DeadtimeProcess {
    id_lookup: IdLookup,
    deadtime: f64,
    paralyzable: bool,
}

impl DeadtimeProcess {
    pub fn new(id_lookup: IdLookup, deadtime: f64, paralyzable: bool) -> Self {
        Self {
            id_lookup,
            deadtime,
            paralyzable,
        }
    }
}

impl Process for DeadtimeProcess {
    fn name(&self) -> &'static str {
        "deadtime"
    }

    fn process(
        &mut self,
        events: &mut [Interaction],
        stats: &mut ProcessStats,
        _rng: &mut GrayRng,
    ) -> usize {
        let len = events.len();
        let mut current = 0;
        while current < len {
            if events[current].dropped {
                current += 1;
                continue;
            }
            let current_id = mapped_id(&self.id_lookup, &events[current]);
            let mut window = events[current].time + self.deadtime;
            let mut next = current + 1;
            let mut closed = false;
            while next < len {
                if events[next].dropped {
                    next += 1;
                    continue;
                }
                let next_time = events[next].time;
                if next_time >= window {
                    stats.no_kept += 1;
                    closed = true;
                    break;
                }
                if current_id == mapped_id(&self.id_lookup, &events[next]) {
                    events[next].dropped = true;
                    stats.no_dropped += 1;
                    if self.paralyzable {
                        window = next_time + self.deadtime;
                    }
                }
                next += 1;
            }
            if !closed {
                // window still open at end of slice
                return current;
            }
            current += 1;
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events_at(times: &[f64]) -> Vec<Interaction> {
        times
            .iter()
            .map(|&time| Interaction {
                time,
                det_id: 0,
                ..Default::default()
            })
            .collect()
    }

    fn surviving_times(events: &[Interaction]) -> Vec<f64> {
        events
            .iter()
            .filter(|e| !e.dropped)
            .map(|e| e.time)
            .collect()
    }

    /// All events on one component, tau = 100 ns
    const TIMES_NS: [f64; 5] = [0.0, 40e-9, 90e-9, 110e-9, 250e-9];

    #[test]
    fn non_paralyzable_reference_pattern() {
        let mut process = DeadtimeProcess::new(vec![1], 100e-9, false);
        let mut events = events_at(&TIMES_NS);
        let mut stats = ProcessStats::default();
        let mut rng = GrayRng::from_seed(1);

        process.stop(&mut events, &mut stats, &mut rng);
        assert_eq!(surviving_times(&events), vec![0.0, 110e-9, 250e-9]);
    }

    #[test]
    fn paralyzable_reference_pattern() {
        let mut process = DeadtimeProcess::new(vec![1], 100e-9, true);
        let mut events = events_at(&TIMES_NS);
        let mut stats = ProcessStats::default();
        let mut rng = GrayRng::from_seed(1);

        // 40 and 90 extend the window to 190, swallowing 110 as well
        process.stop(&mut events, &mut stats, &mut rng);
        assert_eq!(surviving_times(&events), vec![0.0, 250e-9]);
    }

    #[test]
    fn different_components_do_not_interfere() {
        let mut process = DeadtimeProcess::new(vec![0, 1], 100e-9, false);
        let mut events = events_at(&[0.0, 10e-9]);
        events[1].det_id = 1;
        let mut stats = ProcessStats::default();
        let mut rng = GrayRng::from_seed(1);

        process.stop(&mut events, &mut stats, &mut rng);
        assert_eq!(surviving_times(&events).len(), 2);
    }

    #[test]
    fn horizon_holds_the_open_window() {
        let mut process = DeadtimeProcess::new(vec![1], 100e-9, false);
        let mut events = events_at(&[0.0, 40e-9]);
        let mut stats = ProcessStats::default();
        let mut rng = GrayRng::from_seed(1);

        // the window of the first event is still open, nothing commits
        let horizon = process.process(&mut events, &mut stats, &mut rng);
        assert_eq!(horizon, 0);
        assert!(events[1].dropped);
    }
}
