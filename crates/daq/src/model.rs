//! The pipeline driver

// crate modules
use crate::coinc::CoincProcess;
use crate::process::Process;
use crate::stats::{DaqStats, ProcessStats};

// external crates
use gray_physics::Interaction;
use gray_random::GrayRng;
use log::debug;

/// Everything the DAQ sweep finalized: live singles and, per coincidence
/// channel, the paired events
#[derive(Debug, Default)]
pub struct DrainedEvents {
    pub singles: Vec<Interaction>,
    pub coincidences: Vec<Vec<Interaction>>,
}

/// Ordered stages over one shared in-flight buffer
///
/// The driver owns the buffer; each stage only remembers how far into it
/// that stage has committed. On every [tick](Self::tick), stage `s` is
/// offered the events its upstream neighbour committed but it has not, and
/// the buffer prefix everyone has committed is drained. Finalized live
/// singles are copied into each terminal coincidence channel's own buffer
/// and swept the same way.
#[derive(Debug)]
pub struct DaqModel {
    processes: Vec<Box<dyn Process>>,
    coinc_processes: Vec<CoincProcess>,
    buffer: Vec<Interaction>,
    /// Per-stage commit horizon into `buffer`
    horizons: Vec<usize>,
    coinc_buffers: Vec<Vec<Interaction>>,
    stats: DaqStats,
}

impl DaqModel {
    pub fn new() -> Self {
        Self {
            processes: Vec::new(),
            coinc_processes: Vec::new(),
            buffer: Vec::new(),
            horizons: Vec::new(),
            coinc_buffers: Vec::new(),
            stats: DaqStats::default(),
        }
    }

    pub fn add_process(&mut self, process: Box<dyn Process>) {
        debug!("pipeline stage {}: {}", self.processes.len(), process.name());
        self.processes.push(process);
        self.horizons.push(0);
        self.stats.stages.push(ProcessStats::default());
    }

    pub fn add_coinc_process(&mut self, process: CoincProcess) {
        self.coinc_processes.push(process);
        self.coinc_buffers.push(Vec::new());
        self.stats.coinc.push(ProcessStats::default());
    }

    pub fn no_coinc_processes(&self) -> usize {
        self.coinc_processes.len()
    }

    /// Events currently in flight
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn stats(&self) -> &DaqStats {
        &self.stats
    }

    pub fn add_event(&mut self, event: Interaction) {
        self.buffer.push(event);
    }

    /// Sweep every stage once and drain what became final
    pub fn tick(&mut self, rng: &mut GrayRng) -> DrainedEvents {
        let mut upstream = self.buffer.len();
        for (idx, process) in self.processes.iter_mut().enumerate() {
            let begin = self.horizons[idx];
            if begin < upstream {
                let committed =
                    process.process(&mut self.buffer[begin..upstream], &mut self.stats.stages[idx], rng);
                self.horizons[idx] = begin + committed;
            }
            upstream = self.horizons[idx];
        }
        self.drain(upstream, false)
    }

    /// End-of-stream: every stage finalizes its remainder, then the buffer
    /// drains completely
    pub fn stop(&mut self, rng: &mut GrayRng) -> DrainedEvents {
        for (idx, process) in self.processes.iter_mut().enumerate() {
            let begin = self.horizons[idx];
            process.stop(&mut self.buffer[begin..], &mut self.stats.stages[idx], rng);
            self.horizons[idx] = self.buffer.len();
        }
        let final_horizon = self.buffer.len();
        self.drain(final_horizon, true)
    }

    /// Release `finalized` events from the front of the buffer and push the
    /// live ones through the coincidence channels
    fn drain(&mut self, finalized: usize, finalize_coinc: bool) -> DrainedEvents {
        let mut drained = DrainedEvents {
            coincidences: vec![Vec::new(); self.coinc_processes.len()],
            ..Default::default()
        };
        if finalized > 0 {
            for event in self.buffer.drain(..finalized) {
                if event.dropped {
                    self.stats.dropped_out += 1;
                    continue;
                }
                self.stats.singles_out += 1;
                for coinc_buffer in self.coinc_buffers.iter_mut() {
                    coinc_buffer.push(event.clone());
                }
                drained.singles.push(event);
            }
            for horizon in self.horizons.iter_mut() {
                *horizon -= finalized;
            }
        }

        for (idx, process) in self.coinc_processes.iter_mut().enumerate() {
            let buffer = &mut self.coinc_buffers[idx];
            let committed = if finalize_coinc {
                process.stop(buffer, &mut self.stats.coinc[idx]);
                buffer.len()
            } else {
                process.process(buffer, &mut self.stats.coinc[idx])
            };
            drained.coincidences[idx].extend(
                buffer
                    .drain(..committed)
                    .filter(|event| !event.dropped && event.coinc_id >= 0),
            );
        }
        drained
    }
}

impl Default for DaqModel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coinc::MultiplesPolicy;
    use crate::filter::{FilterFunctor, FilterProcess};
    use crate::sort::SortProcess;

    fn deposit(time: f64, energy: f64, det_id: i32) -> Interaction {
        Interaction {
            time,
            energy,
            det_id,
            ..Default::default()
        }
    }

    #[test]
    fn events_stream_through_in_order() {
        let mut model = DaqModel::new();
        model.add_process(Box::new(SortProcess::new(1e-6)));
        let mut rng = GrayRng::from_seed(1);

        // slightly out of order, far enough apart to commit early events
        for &time in &[1e-6, 0.5e-6, 10e-6, 9e-6, 30e-6] {
            model.add_event(deposit(time, 0.511, 0));
        }
        let drained = model.tick(&mut rng);
        let times: Vec<f64> = drained.singles.iter().map(|e| e.time).collect();
        assert_eq!(times, vec![0.5e-6, 1e-6, 9e-6, 10e-6]);

        let rest = model.stop(&mut rng);
        assert_eq!(rest.singles.len(), 1);
        assert_eq!(model.buffered(), 0);
    }

    #[test]
    fn dropped_events_are_suppressed_and_counted() {
        let mut model = DaqModel::new();
        model.add_process(Box::new(FilterProcess::new(FilterFunctor::EnergyGateLow {
            threshold: 0.4,
        })));
        let mut rng = GrayRng::from_seed(1);

        model.add_event(deposit(0.0, 0.511, 0));
        model.add_event(deposit(1e-9, 0.2, 0));
        let drained = model.stop(&mut rng);

        assert_eq!(drained.singles.len(), 1);
        assert_eq!(model.stats().dropped_out, 1);
        assert_eq!(model.stats().singles_out, 1);
    }

    #[test]
    fn coincidence_channel_receives_finalized_singles() {
        let mut model = DaqModel::new();
        model.add_coinc_process(CoincProcess::new(
            10e-9,
            0.0,
            MultiplesPolicy::KeepIfOnlyTwo,
        ));
        let mut rng = GrayRng::from_seed(1);

        model.add_event(deposit(0.0, 0.511, 0));
        model.add_event(deposit(4e-9, 0.511, 12));
        model.add_event(deposit(1.0, 0.511, 3));
        let drained = model.stop(&mut rng);

        assert_eq!(drained.singles.len(), 3);
        let pairs = &drained.coincidences[0];
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].coinc_id, pairs[1].coinc_id);
    }

    #[test]
    fn stage_horizons_shift_with_the_drain() {
        let mut model = DaqModel::new();
        model.add_process(Box::new(SortProcess::new(1e-6)));
        let mut rng = GrayRng::from_seed(1);

        model.add_event(deposit(0.0, 0.511, 0));
        model.add_event(deposit(10e-6, 0.511, 0));
        let first = model.tick(&mut rng);
        assert_eq!(first.singles.len(), 1);

        // later events keep flowing after the earlier drain
        model.add_event(deposit(20e-6, 0.511, 0));
        let second = model.tick(&mut rng);
        assert_eq!(second.singles.len(), 1);
        assert_eq!(model.stop(&mut rng).singles.len(), 1);
    }
}
