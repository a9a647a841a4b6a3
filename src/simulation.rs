//! The per-rank simulation driver

// crate modules
use crate::config::Config;
use crate::error::Result;
use crate::scene_file::load_scene_file;
use crate::trace::{GammaRayTrace, GammaRayTraceStats};

// standard library
use std::path::PathBuf;

// external crates
use gray_daq::{build_daq_model, DaqStats};
use gray_output::{combine_files, Output};
use gray_physics::Interaction;
use gray_random::GrayRng;
use gray_scene::SceneDescription;
use gray_sources::SourceList;
use log::{info, warn};
use rayon::prelude::*;

/// How many decays run between DAQ sweeps
const TICK_INTERVAL: u64 = 1024;

/// Combined tallies of one run, mergeable across ranks
#[derive(Debug, Clone, Default)]
pub struct SimulationStats {
    pub physics: GammaRayTraceStats,
    pub daq: DaqStats,
}

impl std::ops::AddAssign for SimulationStats {
    fn add_assign(&mut self, rhs: Self) {
        self.physics += rhs.physics;
        self.daq += rhs.daq;
    }
}

/// One rank's worth of simulation
///
/// Owns its scheduler, RNG, DAQ pipeline, and output files; shares the
/// immutable scene by reference with every other rank.
pub struct Simulation<'a> {
    config: &'a Config,
    scene: &'a SceneDescription,
    sources: SourceList,
    daq_lines: &'a [String],
    rank: usize,
    no_ranks: usize,
}

impl<'a> Simulation<'a> {
    pub fn new(
        config: &'a Config,
        scene: &'a SceneDescription,
        sources: SourceList,
        daq_lines: &'a [String],
        rank: usize,
        no_ranks: usize,
    ) -> Self {
        Self {
            config,
            scene,
            sources,
            daq_lines,
            rank,
            no_ranks,
        }
    }

    /// Run this rank to completion
    pub fn run(mut self) -> Result<SimulationStats> {
        let mut rng = GrayRng::from_seed(self.config.seed);
        rng.rank_reseed(self.rank);
        self.sources.adjust_time_for_split(self.rank, self.no_ranks);

        let mappings = self.scene.detectors().default_mapping();
        let mut daq = build_daq_model(self.daq_lines, &mappings)?;
        if self.config.coinc_paths.len() != daq.no_coinc_processes() {
            return Err(crate::Error::Config(format!(
                "{} coincidence outputs requested but the pipeline defines {} coincidence stages",
                self.config.coinc_paths.len(),
                daq.no_coinc_processes()
            )));
        }

        let mut hits = self.open_output(&self.config.hits_path)?;
        let mut singles = self.open_output(&self.config.singles_path)?;
        let mut coinc: Vec<Output> = Vec::new();
        for path in &self.config.coinc_paths {
            coinc.push(Output::new(
                rank_path(path, self.rank, self.no_ranks),
                self.config.format,
                self.config.flags,
            )?);
        }

        let tracer = GammaRayTrace::new(self.config.max_trace_depth);
        let mut stats = SimulationStats::default();
        let mut records: Vec<Interaction> = Vec::new();
        let mut decays: u64 = 0;

        if self.sources.is_empty() {
            warn!("no sources registered; writing a single empty-error record");
            if let Some(output) = hits.as_mut() {
                output.write(&Interaction::default())?;
            }
        }

        while let Some((source_idx, mut decay)) = self.sources.next_decay(&mut rng) {
            records.clear();
            let source_material = self.sources.sources()[source_idx].material_id;
            tracer.trace_decay(
                &mut decay,
                self.scene,
                source_material,
                &mut records,
                &mut stats.physics,
                &mut rng,
            );

            for record in records.drain(..) {
                if let Some(output) = hits.as_mut() {
                    output.write(&record)?;
                }
                // the electronics only see energy deposited inside a
                // detector crystal
                if record.det_id >= 0 && record.type_.is_deposit() && record.energy > 0.0 {
                    daq.add_event(record);
                }
            }

            decays += 1;
            if decays % TICK_INTERVAL == 0 {
                let drained = daq.tick(&mut rng);
                write_drained(&drained, &mut singles, &mut coinc)?;
            }
        }

        let drained = daq.stop(&mut rng);
        write_drained(&drained, &mut singles, &mut coinc)?;

        for output in hits
            .iter_mut()
            .chain(singles.iter_mut())
            .chain(coinc.iter_mut())
        {
            output.flush()?;
        }
        stats.daq = daq.stats().clone();
        info!(
            "rank {} finished: {} decays, {} photons, {} singles",
            self.rank, stats.physics.decays, stats.physics.photons, stats.daq.singles_out
        );
        Ok(stats)
    }

    fn open_output(&self, path: &Option<PathBuf>) -> Result<Option<Output>> {
        match path {
            Some(path) => Ok(Some(Output::new(
                rank_path(path, self.rank, self.no_ranks),
                self.config.format,
                self.config.flags,
            )?)),
            None => Ok(None),
        }
    }
}

fn write_drained(
    drained: &gray_daq::DrainedEvents,
    singles: &mut Option<Output>,
    coinc: &mut [Output],
) -> Result<()> {
    if let Some(output) = singles.as_mut() {
        for event in &drained.singles {
            output.write(event)?;
        }
    }
    for (channel, output) in coinc.iter_mut().enumerate() {
        for event in &drained.coincidences[channel] {
            output.write(event)?;
        }
    }
    Ok(())
}

/// Per-rank file name; rank 0 of a single-rank run keeps the final name
fn rank_path(path: &PathBuf, rank: usize, no_ranks: usize) -> PathBuf {
    if no_ranks == 1 {
        path.clone()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(format!(".rank{rank}"));
        PathBuf::from(name)
    }
}

/// Run every rank and stitch the outputs back together
///
/// Ranks split the simulation into intervals of equal expected photon
/// count, each with a decorrelated RNG stream, and run in parallel. Rank 0
/// concatenates the per-rank files afterwards.
pub fn run_simulation(config: &Config) -> Result<SimulationStats> {
    config.validate()?;
    let (scene, sources, daq_lines) = load_scene_file(config)?;

    let no_ranks = config.threads;
    let results: Vec<Result<SimulationStats>> = (0..no_ranks)
        .into_par_iter()
        .map(|rank| {
            Simulation::new(config, &scene, sources.clone(), &daq_lines, rank, no_ranks).run()
        })
        .collect();

    let mut stats = SimulationStats::default();
    for result in results {
        stats += result?;
    }

    if no_ranks > 1 {
        for path in config
            .hits_path
            .iter()
            .chain(config.singles_path.iter())
            .chain(config.coinc_paths.iter())
        {
            let rank_paths: Vec<PathBuf> = (0..no_ranks)
                .map(|rank| rank_path(path, rank, no_ranks))
                .collect();
            combine_files(&rank_paths, path, config.format)?;
            for rank_file in &rank_paths {
                std::fs::remove_file(rank_file)?;
            }
        }
    }
    Ok(stats)
}
