//! Interaction (energy deposit) records

// crate modules
use crate::decay::NuclearDecay;
use crate::photon::Photon;

// standard library
use std::collections::BTreeMap;

/// What produced a deposit record
///
/// Negative variants are in-band transport errors; they travel down the
/// output stream like any other record instead of aborting the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum InteractionType {
    Compton = 0,
    Photoelectric = 1,
    Rayleigh = 2,
    NuclearDecay = 3,
    #[default]
    ErrorEmpty = -1,
    ErrorTraceDepth = -2,
    ErrorMatch = -3,
}

impl InteractionType {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => Self::Compton,
            1 => Self::Photoelectric,
            2 => Self::Rayleigh,
            3 => Self::NuclearDecay,
            -2 => Self::ErrorTraceDepth,
            -3 => Self::ErrorMatch,
            _ => Self::ErrorEmpty,
        }
    }

    /// Whether this record is a physical energy deposit
    pub fn is_deposit(self) -> bool {
        matches!(self, Self::Compton | Self::Photoelectric | Self::Rayleigh)
    }
}

/// Scatter history folded in from merged events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergedEventsInfo {
    pub scatter_compton_phantom: i32,
    pub scatter_compton_detector: i32,
    pub scatter_rayleigh_phantom: i32,
    pub scatter_rayleigh_detector: i32,
    pub xray_flouresence: i32,
}

impl MergedEventsInfo {
    fn accumulate(&mut self, other: &Self) {
        self.scatter_compton_phantom += other.scatter_compton_phantom;
        self.scatter_compton_detector += other.scatter_compton_detector;
        self.scatter_rayleigh_phantom += other.scatter_rayleigh_phantom;
        self.scatter_rayleigh_detector += other.scatter_rayleigh_detector;
        self.xray_flouresence += other.xray_flouresence;
    }
}

/// A fully-typed deposit record
///
/// Produced by the transport engine, mutated in place by the DAQ stages, and
/// finally encoded by the output writers. DAQ stages never remove events
/// from the stream; they mark them `dropped` and the terminal writer
/// suppresses them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Interaction {
    pub type_: InteractionType,
    pub decay_id: i32,
    pub time: f64,
    pub pos: gray_vrmath::Vec3,
    pub energy: f64,
    pub color: i32,
    pub src_id: i32,
    pub mat_id: i32,
    pub det_id: i32,
    pub scatter_compton_phantom: i32,
    pub scatter_compton_detector: i32,
    pub scatter_rayleigh_phantom: i32,
    pub scatter_rayleigh_detector: i32,
    pub xray_flouresence: i32,
    /// Coincidence pair id, -1 when unpaired
    pub coinc_id: i32,
    pub dropped: bool,
    /// Scatter history of events merged into this one, keyed by
    /// (detector id, source id) of the absorbed event
    pub merged_hits: BTreeMap<(i32, i32), MergedEventsInfo>,
}

impl Interaction {
    /// Error record carrying whatever state the photon had
    pub fn error(type_: InteractionType, photon: &Photon) -> Self {
        Self {
            type_,
            decay_id: photon.id,
            time: photon.time,
            pos: photon.pos,
            energy: photon.energy,
            color: photon.color.as_i32(),
            src_id: photon.src_id,
            mat_id: -1,
            det_id: photon.det_id,
            coinc_id: -1,
            ..Default::default()
        }
    }

    /// Physical deposit left by a photon in a material
    pub fn deposit(type_: InteractionType, photon: &Photon, mat_id: i32, deposit: f64) -> Self {
        Self {
            type_,
            decay_id: photon.id,
            time: photon.time,
            pos: photon.pos,
            energy: deposit,
            color: photon.color.as_i32(),
            src_id: photon.src_id,
            mat_id,
            det_id: photon.det_id,
            scatter_compton_phantom: photon.scatter_compton_phantom,
            scatter_compton_detector: photon.scatter_compton_detector,
            scatter_rayleigh_phantom: photon.scatter_rayleigh_phantom,
            scatter_rayleigh_detector: photon.scatter_rayleigh_detector,
            xray_flouresence: photon.xray_flouresence,
            coinc_id: -1,
            ..Default::default()
        }
    }

    /// Record marking the decay itself
    pub fn from_decay(decay: &NuclearDecay, mat_id: i32) -> Self {
        Self {
            type_: InteractionType::NuclearDecay,
            decay_id: decay.decay_number(),
            time: decay.time(),
            pos: decay.position(),
            energy: decay.energy(),
            src_id: decay.src_id(),
            mat_id,
            det_id: -1,
            coinc_id: -1,
            ..Default::default()
        }
    }

    /// Fold the scatter history of `other` into this event
    ///
    /// Called by the merge stages when `other` is absorbed into `self`. The
    /// absorbed event's counters land in the `merged_hits` map under its own
    /// (detector, source) key, and any history it had already absorbed is
    /// carried across too.
    pub fn merge_stats(&mut self, other: &Interaction) {
        let entry = self
            .merged_hits
            .entry((other.det_id, other.src_id))
            .or_default();
        entry.accumulate(&MergedEventsInfo {
            scatter_compton_phantom: other.scatter_compton_phantom,
            scatter_compton_detector: other.scatter_compton_detector,
            scatter_rayleigh_phantom: other.scatter_rayleigh_phantom,
            scatter_rayleigh_detector: other.scatter_rayleigh_detector,
            xray_flouresence: other.xray_flouresence,
        });
        for (key, info) in &other.merged_hits {
            self.merged_hits.entry(*key).or_default().accumulate(info);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_stats_accumulates_by_key() {
        let mut kept = Interaction {
            det_id: 1,
            ..Default::default()
        };
        let absorbed = Interaction {
            det_id: 2,
            src_id: 0,
            scatter_compton_detector: 3,
            ..Default::default()
        };
        kept.merge_stats(&absorbed);
        kept.merge_stats(&absorbed);

        let info = kept.merged_hits.get(&(2, 0)).unwrap();
        assert_eq!(info.scatter_compton_detector, 6);
    }

    #[test]
    fn merge_stats_carries_nested_history() {
        let mut first = Interaction {
            det_id: 1,
            ..Default::default()
        };
        let mut second = Interaction {
            det_id: 2,
            xray_flouresence: 1,
            ..Default::default()
        };
        let third = Interaction {
            det_id: 3,
            scatter_rayleigh_phantom: 2,
            ..Default::default()
        };
        second.merge_stats(&third);
        first.merge_stats(&second);

        assert_eq!(first.merged_hits.get(&(2, 0)).unwrap().xray_flouresence, 1);
        assert_eq!(
            first.merged_hits.get(&(3, 0)).unwrap().scatter_rayleigh_phantom,
            2
        );
    }
}
