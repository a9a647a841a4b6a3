//! The pipeline stage contract

// crate modules
use crate::stats::ProcessStats;

// external crates
use gray_physics::Interaction;
use gray_random::GrayRng;

/// Lookup from detector id to the electronics component it belongs to
pub type IdLookup = Vec<i32>;

/// One stage of the DAQ pipeline
///
/// `process` receives the events its upstream neighbour has committed but
/// this stage has not, mutates them in place (dropping means setting
/// `dropped`, never removing), and returns the commit horizon: the index of
/// the first event that later arrivals could still affect. Everything before
/// the horizon is handed downstream; everything at or after it is offered
/// again on the next sweep, extended with whatever arrived since.
///
/// `stop` is called once at end-of-stream and must finalize every remaining
/// event, since nothing further will arrive.
pub trait Process: std::fmt::Debug + Send {
    /// Short name for logs and stats displays
    fn name(&self) -> &'static str;

    fn process(
        &mut self,
        events: &mut [Interaction],
        stats: &mut ProcessStats,
        rng: &mut GrayRng,
    ) -> usize;

    /// Finalize the remaining events at end-of-stream
    ///
    /// The default runs one last `process` sweep and counts the live tail as
    /// kept, which suits every stage whose horizon only waits for later
    /// arrivals.
    fn stop(&mut self, events: &mut [Interaction], stats: &mut ProcessStats, rng: &mut GrayRng) {
        let horizon = self.process(events, stats, rng);
        stats.no_kept += events[horizon..].iter().filter(|e| !e.dropped).count() as u64;
    }
}

/// Component id of an event under a lookup
///
/// Events outside the table (phantom hits would be -1) map to themselves so
/// they can never collide with a real component.
pub(crate) fn mapped_id(lookup: &IdLookup, event: &Interaction) -> i32 {
    usize::try_from(event.det_id)
        .ok()
        .and_then(|idx| lookup.get(idx).copied())
        .unwrap_or(event.det_id)
}
