//! Per-stage and pipeline-wide tallies

/// Counters one stage accumulates while processing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessStats {
    /// Events committed live past this stage
    pub no_kept: u64,
    /// Events this stage marked dropped
    pub no_dropped: u64,
    /// Events absorbed into another by a merge
    pub no_merged: u64,
}

impl std::ops::AddAssign for ProcessStats {
    fn add_assign(&mut self, rhs: Self) {
        self.no_kept += rhs.no_kept;
        self.no_dropped += rhs.no_dropped;
        self.no_merged += rhs.no_merged;
    }
}

/// Tallies for a whole pipeline, mergeable across ranks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaqStats {
    /// One entry per stage, in pipeline order
    pub stages: Vec<ProcessStats>,
    /// One entry per terminal coincidence stage
    pub coinc: Vec<ProcessStats>,
    /// Singles that reached the end of the pipeline live
    pub singles_out: u64,
    /// Events suppressed at the terminal because a stage dropped them
    pub dropped_out: u64,
}

impl std::ops::AddAssign for DaqStats {
    fn add_assign(&mut self, rhs: Self) {
        if self.stages.len() < rhs.stages.len() {
            self.stages.resize(rhs.stages.len(), ProcessStats::default());
        }
        for (mine, theirs) in self.stages.iter_mut().zip(rhs.stages.iter()) {
            *mine += *theirs;
        }
        if self.coinc.len() < rhs.coinc.len() {
            self.coinc.resize(rhs.coinc.len(), ProcessStats::default());
        }
        for (mine, theirs) in self.coinc.iter_mut().zip(rhs.coinc.iter()) {
            *mine += *theirs;
        }
        self.singles_out += rhs.singles_out;
        self.dropped_out += rhs.dropped_out;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merging_ranks_sums_stage_counters() {
        let mut a = DaqStats {
            stages: vec![ProcessStats {
                no_kept: 10,
                no_dropped: 1,
                no_merged: 0,
            }],
            singles_out: 9,
            ..Default::default()
        };
        let b = DaqStats {
            stages: vec![
                ProcessStats {
                    no_kept: 5,
                    no_dropped: 2,
                    no_merged: 1,
                },
                ProcessStats::default(),
            ],
            singles_out: 3,
            ..Default::default()
        };
        a += b;
        assert_eq!(a.stages.len(), 2);
        assert_eq!(a.stages[0].no_kept, 15);
        assert_eq!(a.stages[0].no_dropped, 3);
        assert_eq!(a.singles_out, 12);
    }
}
