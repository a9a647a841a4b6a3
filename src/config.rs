//! Runtime configuration of a simulation

// crate modules
use crate::error::{Error, Result};

// standard library
use std::path::{Path, PathBuf};

// external crates
use gray_output::{Format, WriteFlags};
use log::debug;

/// Environment variable listing extra directories to search for data files
pub const INCLUDE_ENV: &str = "GRAY_INCLUDE";

/// Everything the driver needs to run one simulation
///
/// Produced by the CLI (or a test harness) and consumed read-only by every
/// rank.
#[derive(Debug, Clone)]
pub struct Config {
    /// Scene description document
    pub scene_path: PathBuf,
    /// Materials table override; the scene file names one otherwise
    pub materials_path: Option<PathBuf>,
    /// Isotope table override
    pub isotopes_path: Option<PathBuf>,
    /// Raw pre-DAQ hit stream output
    pub hits_path: Option<PathBuf>,
    /// Post-DAQ singles output
    pub singles_path: Option<PathBuf>,
    /// One output per terminal coincidence stage
    pub coinc_paths: Vec<PathBuf>,
    pub format: Format,
    pub flags: WriteFlags,
    pub seed: u64,
    pub threads: usize,
    /// Simulated seconds
    pub time: f64,
    pub start_time: f64,
    pub simulate_isotope_half_life: bool,
    pub max_trace_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scene_path: PathBuf::new(),
            materials_path: None,
            isotopes_path: None,
            hits_path: None,
            singles_path: None,
            coinc_paths: Vec::new(),
            format: Format::VariableBinary,
            flags: WriteFlags::all(),
            seed: 0,
            threads: 1,
            time: 1.0,
            start_time: 0.0,
            simulate_isotope_half_life: true,
            max_trace_depth: crate::trace::DEFAULT_MAX_TRACE_DEPTH,
        }
    }
}

impl Config {
    /// Check the knobs that have no sensible fallback
    pub fn validate(&self) -> Result<()> {
        if self.time <= 0.0 || !self.time.is_finite() {
            return Err(Error::Config(format!(
                "simulation time must be positive, got {}",
                self.time
            )));
        }
        if self.threads == 0 {
            return Err(Error::Config("at least one thread is required".into()));
        }
        if self.coinc_paths.is_empty() && self.singles_path.is_none() && self.hits_path.is_none() {
            return Err(Error::Config("no outputs requested".into()));
        }
        Ok(())
    }
}

/// Resolve a data file against the working directory and `GRAY_INCLUDE`
///
/// Relative names are tried as-is first, then under each `:`-separated
/// include directory.
pub fn find_file(name: impl AsRef<Path>) -> Result<PathBuf> {
    let name = name.as_ref();
    if name.exists() {
        return Ok(name.to_path_buf());
    }
    if let Ok(include) = std::env::var(INCLUDE_ENV) {
        for dir in include.split(':').filter(|d| !d.is_empty()) {
            let candidate = Path::new(dir).join(name);
            debug!("searching for {} at {}", name.display(), candidate.display());
            if candidate.exists() {
                return Ok(candidate);
            }
        }
    }
    Err(Error::FileNotFound(name.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_needs_an_output() {
        let config = Config::default();
        assert!(config.validate().is_err());

        let config = Config {
            singles_path: Some(PathBuf::from("singles.dat")),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn bad_time_is_rejected() {
        let config = Config {
            singles_path: Some(PathBuf::from("singles.dat")),
            time: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn find_file_prefers_existing_paths() {
        let mut path = std::env::temp_dir();
        path.push(format!("gray_findfile_{}.txt", std::process::id()));
        std::fs::write(&path, "x").unwrap();
        assert_eq!(find_file(&path).unwrap(), path);
        std::fs::remove_file(&path).ok();
        assert!(find_file("definitely_not_a_real_file.xyz").is_err());
    }
}
