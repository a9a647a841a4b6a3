//! Time-ordering stage

// crate modules
use crate::process::Process;
use crate::stats::ProcessStats;

// external crates
use gray_physics::Interaction;
use gray_random::GrayRng;
use gray_utils::SortExt;

/// Restores strict time order on the nearly-sorted stream
///
/// Insertion sort is fast on nearly-sorted data and stable, so equal-time
/// events keep their arrival order. Only events older than `max_wait`
/// behind the newest are committed; anything younger could still be
/// overtaken by a late arrival upstream.
#[derive(Debug, Clone, Copy)]
pub struct SortProcess {
    max_wait: f64,
}

impl SortProcess {
    pub fn new(max_wait: f64) -> Self {
        Self { max_wait }
    }
}

impl Process for SortProcess {
    fn name(&self) -> &'static str {
        "sort"
    }

    fn process(
        &mut self,
        events: &mut [Interaction],
        stats: &mut ProcessStats,
        _rng: &mut GrayRng,
    ) -> usize {
        if events.is_empty() {
            return 0;
        }
        events.insertion_sort_by(|a, b| a.time.total_cmp(&b.time));

        // commit what has timed out; the newest event stays behind as the
        // horizon marker
        let out_time = events[events.len() - 1].time - self.max_wait;
        let timed_out = events
            .partition_point(|e| e.time <= out_time)
            .min(events.len() - 1);
        stats.no_kept += events[..timed_out].iter().filter(|e| !e.dropped).count() as u64;
        timed_out
    }

    fn stop(&mut self, events: &mut [Interaction], stats: &mut ProcessStats, _rng: &mut GrayRng) {
        events.insertion_sort_by(|a, b| a.time.total_cmp(&b.time));
        stats.no_kept += events.iter().filter(|e| !e.dropped).count() as u64;
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
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn commits_only_past_the_wait_horizon() {
        let mut sort = SortProcess::new(1.0);
        let mut events = events_at(&[0.5, 0.1, 0.3, 2.0, 1.8]);
        let mut stats = ProcessStats::default();
        let mut rng = GrayRng::from_seed(1);

        let horizon = sort.process(&mut events, &mut stats, &mut rng);
        // newest is 2.0, so only events at or before 1.0 commit
        let committed: Vec<f64> = events[..horizon].iter().map(|e| e.time).collect();
        assert_eq!(committed, vec![0.1, 0.3, 0.5]);
        // the committed prefix is sorted and the rest is retained
        assert_eq!(events[horizon..].len(), 2);
    }

    #[test]
    fn committed_events_are_in_order() {
        let mut sort = SortProcess::new(0.0);
        let mut events = events_at(&[3.0, 1.0, 2.0, 5.0, 4.0]);
        let mut stats = ProcessStats::default();
        let mut rng = GrayRng::from_seed(1);

        let horizon = sort.process(&mut events, &mut stats, &mut rng);
        let committed: Vec<f64> = events[..horizon].iter().map(|e| e.time).collect();
        assert!(committed.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn young_stream_commits_nothing() {
        let mut sort = SortProcess::new(10.0);
        let mut events = events_at(&[0.5, 0.1, 0.3]);
        let mut stats = ProcessStats::default();
        let mut rng = GrayRng::from_seed(1);

        assert_eq!(sort.process(&mut events, &mut stats, &mut rng), 0);
    }

    #[test]
    fn stop_sorts_everything() {
        let mut sort = SortProcess::new(10.0);
        let mut events = events_at(&[0.5, 0.1, 0.3]);
        let mut stats = ProcessStats::default();
        let mut rng = GrayRng::from_seed(1);

        sort.stop(&mut events, &mut stats, &mut rng);
        let times: Vec<f64> = events.iter().map(|e| e.time).collect();
        assert_eq!(times, vec![0.1, 0.3, 0.5]);
        assert_eq!(stats.no_kept, 3);
    }
}
