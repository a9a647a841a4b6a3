//! Terminal coincidence sorting

// crate modules
use crate::stats::ProcessStats;

// external crates
use gray_physics::Interaction;
use log::debug;

/// What to do when more than two singles share a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MultiplesPolicy {
    /// Drop the whole group
    #[default]
    KeepIfOnlyTwo,
    /// Pair the first two, drop the rest
    KeepFirstTwo,
    /// Keep the whole group under one coincidence id
    KeepAll,
}

/// Pairs singles within a timing window into coincidences
///
/// Terminal stage: it consumes the finalized singles stream and its output
/// goes straight to one coincidence file. Events that never pair are
/// dropped. A non-zero `delay` offsets the window to estimate randoms from
/// a delayed coincidence channel.
#[derive(Debug, Clone)]
pub struct CoincProcess {
    window: f64,
    delay: f64,
    policy: MultiplesPolicy,
    next_coinc_id: i32,
}

impl CoincProcess {
    pub fn new(window: f64, delay: f64, policy: MultiplesPolicy) -> Self {
        Self {
            window,
            delay,
            policy,
            next_coinc_id: 0,
        }
    }

    /// Whether this process uses a delayed window
    pub fn is_delayed(&self) -> bool {
        self.delay > 0.0
    }

    /// Sweep the events, pairing closed windows
    ///
    /// Returns the index of the first event whose window is still open; the
    /// caller re-offers it (with later arrivals appended) next sweep.
    pub fn process(&mut self, events: &mut [Interaction], stats: &mut ProcessStats) -> usize {
        self.sweep(events, stats, false)
    }

    /// Finalize every remaining window at end-of-stream
    pub fn stop(&mut self, events: &mut [Interaction], stats: &mut ProcessStats) {
        self.sweep(events, stats, true);
    }

    fn sweep(
        &mut self,
        events: &mut [Interaction],
        stats: &mut ProcessStats,
        finalize: bool,
    ) -> usize {
        let len = events.len();
        let last_time = events.iter().rev().find(|e| !e.dropped).map(|e| e.time);
        let mut current = 0;
        while current < len {
            // paired events carry their id already; both they and dropped
            // events are settled
            if events[current].dropped || events[current].coinc_id >= 0 {
                current += 1;
                continue;
            }
            let open = events[current].time + self.delay;
            let close = open + self.window;
            // the group might still grow while the stream sits inside it
            if !finalize && last_time.map(|t| close >= t).unwrap_or(true) {
                return current;
            }

            let mut group = vec![current];
            for (offset, event) in events[current + 1..].iter().enumerate() {
                if event.dropped || event.coinc_id >= 0 {
                    continue;
                }
                if event.time > close {
                    break;
                }
                if event.time >= open {
                    group.push(current + 1 + offset);
                }
            }
            self.resolve(events, &group, stats);
            current += 1;
        }
        len
    }

    fn resolve(&mut self, events: &mut [Interaction], group: &[usize], stats: &mut ProcessStats) {
        match group.len() {
            1 => {
                events[group[0]].dropped = true;
                stats.no_dropped += 1;
            }
            2 => self.pair(events, group, stats),
            _ => match self.policy {
                MultiplesPolicy::KeepIfOnlyTwo => {
                    debug!("dropping multiple coincidence of {} events", group.len());
                    for &idx in group {
                        events[idx].dropped = true;
                        stats.no_dropped += 1;
                    }
                }
                MultiplesPolicy::KeepFirstTwo => {
                    self.pair(events, &group[..2], stats);
                    for &idx in &group[2..] {
                        events[idx].dropped = true;
                        stats.no_dropped += 1;
                    }
                }
                MultiplesPolicy::KeepAll => self.pair(events, group, stats),
            },
        }
    }

    fn pair(&mut self, events: &mut [Interaction], group: &[usize], stats: &mut ProcessStats) {
        let coinc_id = self.next_coinc_id;
        self.next_coinc_id += 1;
        for &idx in group {
            events[idx].coinc_id = coinc_id;
            stats.no_kept += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn singles_at(times: &[f64]) -> Vec<Interaction> {
        times
            .iter()
            .map(|&time| Interaction {
                time,
                energy: 0.511,
                det_id: 0,
                ..Default::default()
            })
            .collect()
    }

    fn paired(events: &[Interaction]) -> Vec<(f64, i32)> {
        events
            .iter()
            .filter(|e| !e.dropped && e.coinc_id >= 0)
            .map(|e| (e.time, e.coinc_id))
            .collect()
    }

    #[test]
    fn isolated_pairs_share_an_id() {
        let mut coinc = CoincProcess::new(10e-9, 0.0, MultiplesPolicy::KeepIfOnlyTwo);
        let mut events = singles_at(&[0.0, 4e-9, 1.0, 1.0 + 6e-9]);
        let mut stats = ProcessStats::default();

        coinc.stop(&mut events, &mut stats);
        let pairs = paired(&events);
        assert_eq!(pairs.len(), 4);
        assert_eq!(pairs[0].1, pairs[1].1);
        assert_eq!(pairs[2].1, pairs[3].1);
        assert_ne!(pairs[0].1, pairs[2].1);
    }

    #[test]
    fn lone_singles_are_dropped() {
        let mut coinc = CoincProcess::new(10e-9, 0.0, MultiplesPolicy::KeepIfOnlyTwo);
        let mut events = singles_at(&[0.0, 1.0, 1.0 + 2e-9]);
        let mut stats = ProcessStats::default();

        coinc.stop(&mut events, &mut stats);
        assert!(events[0].dropped);
        assert_eq!(paired(&events).len(), 2);
        assert_eq!(stats.no_dropped, 1);
    }

    #[test]
    fn triples_resolve_by_policy() {
        let times = [0.0, 3e-9, 6e-9];
        for (policy, expected_live) in [
            (MultiplesPolicy::KeepIfOnlyTwo, 0),
            (MultiplesPolicy::KeepFirstTwo, 2),
            (MultiplesPolicy::KeepAll, 3),
        ] {
            let mut coinc = CoincProcess::new(10e-9, 0.0, policy);
            let mut events = singles_at(&times);
            let mut stats = ProcessStats::default();
            coinc.stop(&mut events, &mut stats);
            assert_eq!(paired(&events).len(), expected_live, "{policy:?}");
        }
    }

    #[test]
    fn open_windows_hold_the_horizon() {
        let mut coinc = CoincProcess::new(10e-9, 0.0, MultiplesPolicy::KeepIfOnlyTwo);
        let mut events = singles_at(&[0.0, 4e-9]);
        let mut stats = ProcessStats::default();

        // stream has not advanced past the window; nothing commits
        assert_eq!(coinc.process(&mut events, &mut stats), 0);
        assert_eq!(paired(&events).len(), 0);
    }

    #[test]
    fn delayed_window_pairs_across_the_offset() {
        let delay = 500e-9;
        let mut coinc = CoincProcess::new(10e-9, delay, MultiplesPolicy::KeepIfOnlyTwo);
        // the partner sits in the delayed window, not the prompt one
        let mut events = singles_at(&[0.0, delay + 4e-9]);
        let mut stats = ProcessStats::default();

        coinc.stop(&mut events, &mut stats);
        assert_eq!(paired(&events).len(), 2);
    }
}
