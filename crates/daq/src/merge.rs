//! Hit merging within detector components

// crate modules
use crate::process::{mapped_id, IdLookup, Process};
use crate::stats::ProcessStats;

// external crates
use gray_physics::Interaction;
use gray_random::GrayRng;

/// How two coincident hits on the same component combine
#[derive(Debug, Clone)]
pub enum MergeFunctor {
    /// Keep the first hit, accumulating the energy and scatter history of
    /// later ones
    First,
    /// Keep whichever hit deposited more energy
    Max,
    /// Energy-weighted centroid over the block crystal coordinates,
    /// resolved back to a detector id through the reverse map
    Anger {
        block: Vec<i32>,
        bx: Vec<i32>,
        by: Vec<i32>,
        bz: Vec<i32>,
        no_bx: i32,
        no_by: i32,
        no_bz: i32,
        reverse_map: Vec<i32>,
    },
}

impl MergeFunctor {
    /// Anger logic built from the block coordinate mappings
    pub fn anger(block: Vec<i32>, bx: Vec<i32>, by: Vec<i32>, bz: Vec<i32>) -> Self {
        let no_bx = bx.iter().copied().max().unwrap_or(0) + 1;
        let no_by = by.iter().copied().max().unwrap_or(0) + 1;
        let no_bz = bz.iter().copied().max().unwrap_or(0) + 1;
        let no_blocks = block.iter().copied().max().unwrap_or(0) + 1;

        let mut reverse_map = vec![-1; (no_blocks * no_bx * no_by * no_bz) as usize];
        for detector in 0..block.len() {
            let index = flat_index(
                block[detector],
                bx[detector],
                by[detector],
                bz[detector],
                no_bx,
                no_by,
                no_bz,
            );
            reverse_map[index] = detector as i32;
        }
        Self::Anger {
            block,
            bx,
            by,
            bz,
            no_bx,
            no_by,
            no_bz,
            reverse_map,
        }
    }

    /// Merge `next` into `kept`
    fn apply(&self, kept: &mut Interaction, next: &mut Interaction) {
        match self {
            Self::First => {
                kept.energy += next.energy;
                kept.merge_stats(next);
                next.dropped = true;
            }
            Self::Max => {
                if next.energy > kept.energy {
                    // the larger hit wins the identity, the first arrival
                    // keeps the timestamp
                    let time = kept.time;
                    std::mem::swap(kept, next);
                    kept.time = time;
                }
                kept.energy += next.energy;
                kept.merge_stats(next);
                next.dropped = true;
            }
            Self::Anger {
                block,
                bx,
                by,
                bz,
                no_bx,
                no_by,
                no_bz,
                reverse_map,
            } => {
                let total = kept.energy + next.energy;
                let weighted = |coords: &Vec<i32>| -> i32 {
                    let kept_c = lookup_coord(coords, kept.det_id);
                    let next_c = lookup_coord(coords, next.det_id);
                    ((kept_c * kept.energy + next_c * next.energy) / total).round() as i32
                };
                let centroid_x = weighted(bx);
                let centroid_y = weighted(by);
                let centroid_z = weighted(bz);
                let blk = lookup_coord(block, kept.det_id) as i32;
                let index = flat_index(blk, centroid_x, centroid_y, centroid_z, *no_bx, *no_by, *no_bz);
                if let Some(&detector) = reverse_map.get(index) {
                    kept.det_id = detector;
                }
                kept.energy = total;
                kept.merge_stats(next);
                next.dropped = true;
            }
        }
    }
}

fn lookup_coord(coords: &[i32], det_id: i32) -> f64 {
    usize::try_from(det_id)
        .ok()
        .and_then(|idx| coords.get(idx).copied())
        .unwrap_or(0) as f64
}

fn flat_index(block: i32, x: i32, y: i32, z: i32, no_bx: i32, no_by: i32, no_bz: i32) -> usize {
    (((block * no_bx + x) * no_by + y) * no_bz + z) as usize
}

/// Combines hits sharing a component within a rolling time window
///
/// The horizon is the earliest live event whose window reaches past the end
/// of the slice; later arrivals could still merge into it.
#[derive(Debug, Clone)]
pub struct MergeProcess {
    id_lookup: IdLookup,
    time_window: f64,
    merge: MergeFunctor,
}

impl MergeProcess {
    pub fn new(id_lookup: IdLookup, time_window: f64, merge: MergeFunctor) -> Self {
        Self {
            id_lookup,
            time_window,
            merge,
        }
    }
}

impl Process for MergeProcess {
    fn name(&self) -> &'static str {
        "merge"
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
            let window = events[current].time + self.time_window;
            let mut next = current + 1;
            let mut closed = false;
            while next < len {
                if events[next].dropped {
                    next += 1;
                    continue;
                }
                if events[next].time >= window {
                    closed = true;
                    break;
                }
                if current_id == mapped_id(&self.id_lookup, &events[next]) {
                    let (head, tail) = events.split_at_mut(next);
                    self.merge.apply(&mut head[current], &mut tail[0]);
                    stats.no_merged += 1;
                }
                next += 1;
            }
            if !closed {
                return current;
            }
            stats.no_kept += 1;
            current += 1;
        }
        current
    }
}
