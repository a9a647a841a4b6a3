//! The decay scheduler

// crate modules
use crate::error::Result;
use crate::isotopes;
use crate::source::Source;

// standard library
use std::collections::BTreeMap;
use std::path::Path;

// external crates
use gray_physics::{Isotope, NuclearDecay};
use gray_random::GrayRng;
use log::{debug, info, warn};

/// Becquerels per microcurie
pub const MICRO_CURIE: f64 = 37.0e3;

/// Consecutive negative-source rejections tolerated before complaining
pub const MAX_REJECT_COUNTER: usize = 100_000;

/// Relative tolerance of the equal-photon split bisection
const SPLIT_TOLERANCE: f64 = 1e-6;

/// Time key with an insertion sequence tiebreak
///
/// Decay times can collide; the sequence keeps the index stable and the
/// ordering total without caring how, matching insertion order.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DecayKey {
    time: f64,
    seq: u64,
}

impl Eq for DecayKey {}

impl Ord for DecayKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.time
            .total_cmp(&other.time)
            .then(self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for DecayKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Time-ordered, activity-weighted decay scheduler
///
/// Positive sources each keep a next-decay time in a time-ordered index.
/// Popping the earliest reinserts that source with a fresh exponential
/// inter-arrival, so the merged stream is the superposition of every
/// source's Poisson process. Negative sources never schedule; they carve
/// activity out of positive ones by rejecting sampled positions.
#[derive(Debug, Clone, Default)]
pub struct SourceList {
    sources: Vec<Source>,
    neg_sources: Vec<Source>,
    isotopes: BTreeMap<String, Isotope>,
    decay_number: i32,
    simulation_time: f64,
    start_time: f64,
    /// Global time origin the isotope decay curves reference; rank time
    /// splits move `start_time` but never this
    activity_origin: f64,
    simulate_isotope_half_life: bool,
    decay_list: BTreeMap<DecayKey, usize>,
    insert_seq: u64,
    reject_counter: usize,
    initialized: bool,
}

impl SourceList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the isotope table the sources refer to by name
    pub fn load_isotopes<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.isotopes = isotopes::load_isotopes(path)?;
        Ok(())
    }

    /// Look up a named isotope from the loaded table
    pub fn isotope(&self, name: &str) -> Result<Isotope> {
        isotopes::lookup(&self.isotopes, name)
    }

    /// Register a source, assigning its number
    pub fn add_source(&mut self, mut source: Source) {
        if source.negative {
            source.source_num = -(self.neg_sources.len() as i32 + 1);
            debug!("negative source {} registered", source.source_num);
            self.neg_sources.push(source);
        } else {
            source.source_num = self.sources.len() as i32;
            self.sources.push(source);
        }
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Total simulated seconds for this rank
    pub fn set_simulation_time(&mut self, time: f64) {
        self.simulation_time = time;
    }

    pub fn simulation_time(&self) -> f64 {
        self.simulation_time
    }

    pub fn set_start_time(&mut self, time: f64) {
        self.start_time = time;
        self.activity_origin = time;
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn end_time(&self) -> f64 {
        self.start_time + self.simulation_time
    }

    /// Whether source activities follow the isotope half-life curves
    pub fn set_simulate_isotope_half_life(&mut self, value: bool) {
        self.simulate_isotope_half_life = value;
    }

    /// Expected photons emitted in `[from, from + duration]`
    ///
    /// Sums each positive source's decaying activity integral times its
    /// isotope's photons per decay.
    pub fn expected_photons(&self, from: f64, duration: f64) -> f64 {
        self.sources
            .iter()
            .map(|source| {
                let integral = if self.simulate_isotope_half_life {
                    source
                        .isotope
                        .fraction_integral(from - self.activity_origin, duration)
                } else {
                    duration
                };
                source.activity_uci * MICRO_CURIE * integral * source.isotope.expected_no_photons()
            })
            .sum()
    }

    /// Restrict this list to rank `idx` of `n` equal-photon intervals
    ///
    /// Intervals have equal expected photon counts, not equal lengths, so
    /// early ranks of a decaying simulation get shorter windows. The split
    /// lengths always sum to the full simulation time.
    pub fn adjust_time_for_split(&mut self, idx: usize, n: usize) {
        let splits = self.calculate_equal_photon_time_splits(n);
        let (start, length) = splits[idx];
        info!(
            "rank {idx}/{n} simulating [{start:.6}, {:.6}]",
            start + length
        );
        self.start_time = start;
        self.simulation_time = length;
    }

    /// Split `[start_time, start_time + simulation_time]` into `n` intervals
    /// of equal expected photon count
    pub fn calculate_equal_photon_time_splits(&self, n: usize) -> Vec<(f64, f64)> {
        let full_start = self.start_time;
        let full_time = self.simulation_time;
        let total_photons = self.expected_photons(full_start, full_time);
        let per_split = total_photons / n as f64;

        let mut splits = Vec::with_capacity(n);
        let mut split_start = full_start;
        for k in 0..n {
            let split_end = if k == n - 1 {
                full_start + full_time
            } else {
                self.search_split_time(split_start, full_start + full_time, per_split)
            };
            splits.push((split_start, split_end - split_start));
            split_start = split_end;
        }
        splits
    }

    /// Bisect for the time where the expected photons since `split_start`
    /// reach `target`
    fn search_split_time(&self, split_start: f64, full_end: f64, target: f64) -> f64 {
        let mut low = split_start;
        let mut high = full_end;
        for _ in 0..200 {
            let mid = 0.5 * (low + high);
            let photons = self.expected_photons(split_start, mid - split_start);
            if ((photons - target) / target).abs() <= SPLIT_TOLERANCE {
                return mid;
            }
            if photons < target {
                low = mid;
            } else {
                high = mid;
            }
        }
        0.5 * (low + high)
    }

    /// Pop the next decay, or `None` once the window is exhausted
    ///
    /// Every candidate consumes a decay number even when a negative source
    /// rejects it, so decay ids are comparable across configurations with
    /// and without the negative geometry.
    pub fn next_decay(&mut self, rng: &mut GrayRng) -> Option<(usize, NuclearDecay)> {
        if self.sources.is_empty() {
            return None;
        }
        if !self.initialized {
            self.init_sources(rng);
        }
        loop {
            let (key, source_idx) = self.pop_next()?;
            if key.time > self.end_time() {
                return None;
            }
            let next_time = self.calculate_time(source_idx, key.time, rng);
            self.schedule(source_idx, next_time);

            let decay_number = self.decay_number;
            self.decay_number += 1;

            let position = self.sources[source_idx].shape.decay_position(rng);
            if self.inside_negative(&position) {
                self.reject_counter += 1;
                if self.reject_counter >= MAX_REJECT_COUNTER {
                    warn!(
                        "{MAX_REJECT_COUNTER} consecutive decays rejected by negative sources; \
                         check the source geometry"
                    );
                    self.reject_counter = 0;
                }
                continue;
            }
            self.reject_counter = 0;

            let source = &self.sources[source_idx];
            let decay = source.isotope.decay(
                decay_number,
                key.time,
                source.source_num,
                position,
                rng,
            );
            return Some((source_idx, decay));
        }
    }

    /// Seed the schedule with every positive source's first decay
    fn init_sources(&mut self, rng: &mut GrayRng) {
        self.initialized = true;
        self.decay_list.clear();
        for idx in 0..self.sources.len() {
            let time = self.calculate_time(idx, self.start_time, rng);
            self.schedule(idx, time);
        }
        info!(
            "scheduler initialised: {} positive, {} negative sources",
            self.sources.len(),
            self.neg_sources.len()
        );
    }

    fn pop_next(&mut self) -> Option<(DecayKey, usize)> {
        let (&key, &idx) = self.decay_list.iter().next()?;
        self.decay_list.remove(&key);
        Some((key, idx))
    }

    fn schedule(&mut self, source_idx: usize, time: f64) {
        if !time.is_finite() {
            // decayed away entirely; the source never fires again
            return;
        }
        let key = DecayKey {
            time,
            seq: self.insert_seq,
        };
        self.insert_seq += 1;
        self.decay_list.insert(key, source_idx);
    }

    /// Draw the next decay time for a source
    ///
    /// With half-life simulation the inter-arrival comes from the inverse
    /// CDF of the decaying-exponential rate integral, so the thinning of an
    /// aging source is exact rather than stepwise.
    fn calculate_time(&self, source_idx: usize, base_time: f64, rng: &mut GrayRng) -> f64 {
        let source = &self.sources[source_idx];
        let activity_bq = source.activity_uci * MICRO_CURIE;
        if !self.simulate_isotope_half_life {
            return base_time + rng.exponential(activity_bq);
        }

        let half_life = source.isotope.half_life();
        if half_life.is_infinite() {
            return base_time + rng.exponential(activity_bq);
        }
        let target = rng.exponential(1.0);
        let elapsed = base_time - self.activity_origin;
        let remaining = 0.5_f64.powf(elapsed / half_life)
            - target * std::f64::consts::LN_2 / (activity_bq * half_life);
        if remaining <= 0.0 {
            return f64::INFINITY;
        }
        self.activity_origin - half_life * remaining.log2()
    }

    fn inside_negative(&self, position: &gray_vrmath::Vec3) -> bool {
        self.neg_sources
            .iter()
            .any(|source| source.inside(position))
    }
}
