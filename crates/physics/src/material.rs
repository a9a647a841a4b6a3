//! Gamma materials and material-table loading

// crate modules
use crate::error::{Error, Result};
use crate::gamma_stats::{AttenLengths, GammaStats};

// standard library
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

// external crates
use log::{debug, info};
use serde::Deserialize;

/// One material entry as it appears in the materials file
///
/// Attenuation tables are in MeV and 1/cm. The `x`, `form_factor`, and
/// `scattering_func` columns share their own momentum-transfer grid in
/// inverse Angstroms. X-ray escape data is optional and defaults to none.
#[derive(Debug, Deserialize)]
struct MaterialEntry {
    density: f64,
    energy: Vec<f64>,
    matten_comp: Vec<f64>,
    matten_phot: Vec<f64>,
    matten_rayl: Vec<f64>,
    x: Vec<f64>,
    form_factor: Vec<f64>,
    scattering_func: Vec<f64>,
    #[serde(default)]
    xray_escape: Vec<f64>,
    #[serde(default)]
    xray_probs: Vec<f64>,
    #[serde(default)]
    auger_probs: Vec<f64>,
    #[serde(default = "default_rayleigh")]
    rayleigh: bool,
}

fn default_rayleigh() -> bool {
    true
}

/// A material as seen by the transport engine
///
/// Couples an id and density with the [GammaStats] cross-section tables.
/// Rayleigh scattering may be disabled per material, which zeroes its channel
/// in the sampled attenuation lengths.
#[derive(Debug, Clone)]
pub struct GammaMaterial {
    pub index: i32,
    pub name: String,
    pub density: f64,
    pub rayleigh_enabled: bool,
    stats: GammaStats,
}

impl GammaMaterial {
    pub fn new(
        index: i32,
        name: impl Into<String>,
        density: f64,
        rayleigh_enabled: bool,
        stats: GammaStats,
    ) -> Self {
        Self {
            index,
            name: name.into(),
            density,
            rayleigh_enabled,
            stats,
        }
    }

    /// Attenuation coefficients at `energy`, with rayleigh zeroed when the
    /// channel is disabled for this material
    pub fn atten_lengths(&self, energy: f64) -> AttenLengths {
        let mut lengths = self.stats.get_atten_lengths(energy);
        if !self.rayleigh_enabled {
            lengths.rayleigh = 0.0;
        }
        lengths
    }

    pub fn comp_scatter_angle(&self, energy: f64, u: f64) -> f64 {
        self.stats.comp_scatter_angle(energy, u)
    }

    pub fn rayl_scatter_angle(&self, energy: f64, u: f64) -> f64 {
        self.stats.rayl_scatter_angle(energy, u)
    }

    /// X-ray fluorescence outcome of a photoelectric absorption
    pub fn get_escape(&self, u: f64, photon_energy: f64) -> Option<f64> {
        self.stats.get_escape(u, photon_energy)
    }
}

/// Load and validate a materials file
///
/// The file is a JSON map of material name to entry. Materials are indexed
/// in name order, so ids are stable across runs for the same file.
pub fn load_materials<P: AsRef<Path>>(path: P) -> Result<Vec<GammaMaterial>> {
    let file = File::open(path.as_ref())?;
    let entries: BTreeMap<String, MaterialEntry> = serde_json::from_reader(BufReader::new(file))?;
    info!(
        "loaded {} materials from {}",
        entries.len(),
        path.as_ref().display()
    );

    entries
        .into_iter()
        .enumerate()
        .map(|(index, (name, entry))| {
            validate(&name, &entry)?;
            debug!("material {index} \"{name}\" density {}", entry.density);
            let stats = GammaStats::new(
                entry.energy,
                entry.matten_phot,
                entry.matten_comp,
                entry.matten_rayl,
                entry.x,
                entry.form_factor,
                entry.scattering_func,
                entry.xray_escape,
                entry.xray_probs,
                entry.auger_probs,
            );
            Ok(GammaMaterial::new(
                index as i32,
                name,
                entry.density,
                entry.rayleigh,
                stats,
            ))
        })
        .collect()
}

/// Look a material up by name, yielding its index
pub fn material_index(materials: &[GammaMaterial], name: &str) -> Result<i32> {
    materials
        .iter()
        .find(|material| material.name == name)
        .map(|material| material.index)
        .ok_or_else(|| Error::UnknownMaterial(name.to_string()))
}

fn validate(name: &str, entry: &MaterialEntry) -> Result<()> {
    let grid = entry.energy.len();
    if grid < 2 {
        return Err(Error::TableTooShort(name.to_string()));
    }
    for (table, found) in [
        ("matten_comp", entry.matten_comp.len()),
        ("matten_phot", entry.matten_phot.len()),
        ("matten_rayl", entry.matten_rayl.len()),
    ] {
        if found != grid {
            return Err(Error::InconsistentTableLength {
                material: name.to_string(),
                table,
                expected: grid,
                found,
            });
        }
    }
    let momentum = entry.x.len();
    for (table, found) in [
        ("form_factor", entry.form_factor.len()),
        ("scattering_func", entry.scattering_func.len()),
    ] {
        if found != momentum {
            return Err(Error::InconsistentTableLength {
                material: name.to_string(),
                table,
                expected: momentum,
                found,
            });
        }
    }
    if entry.xray_probs.len() != entry.xray_escape.len()
        || entry.auger_probs.len() != entry.xray_escape.len()
    {
        return Err(Error::InconsistentTableLength {
            material: name.to_string(),
            table: "xray_probs",
            expected: entry.xray_escape.len(),
            found: entry.xray_probs.len(),
        });
    }
    if !entry.energy.windows(2).all(|pair| pair[0] < pair[1]) {
        return Err(Error::NonMonotonicEnergy(name.to_string()));
    }
    let negative = entry
        .matten_comp
        .iter()
        .chain(&entry.matten_phot)
        .chain(&entry.matten_rayl)
        .any(|&value| value < 0.0);
    if negative {
        return Err(Error::NegativeCrossSection(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_materials(json: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("gray_materials_{}.json", std::process::id()));
        let mut file = File::create(&path).unwrap();
        file.write_all(json.as_bytes()).unwrap();
        path
    }

    const GOOD: &str = r#"{
        "water": {
            "density": 1.0,
            "energy": [0.01, 0.1, 1.0],
            "matten_comp": [0.05, 0.17, 0.07],
            "matten_phot": [5.0, 0.03, 0.00005],
            "matten_rayl": [0.2, 0.005, 0.00005],
            "x": [0.0, 10.0, 100.0],
            "form_factor": [10.0, 1.0, 0.01],
            "scattering_func": [0.0, 8.0, 10.0]
        }
    }"#;

    #[test]
    fn loads_and_indexes_materials() {
        let path = write_materials(GOOD);
        let materials = load_materials(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(materials.len(), 1);
        assert_eq!(materials[0].name, "water");
        assert_eq!(material_index(&materials, "water").unwrap(), 0);
        assert!(material_index(&materials, "lead").is_err());
    }

    #[test]
    fn rejects_ragged_tables() {
        let ragged = GOOD.replace("[0.05, 0.17, 0.07]", "[0.05, 0.17]");
        let path = write_materials(&ragged);
        let result = load_materials(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(
            result,
            Err(Error::InconsistentTableLength { .. })
        ));
    }

    #[test]
    fn disabled_rayleigh_zeroes_the_channel() {
        let disabled = GOOD.replace(
            "\"scattering_func\": [0.0, 8.0, 10.0]",
            "\"scattering_func\": [0.0, 8.0, 10.0], \"rayleigh\": false",
        );
        let path = write_materials(&disabled);
        let materials = load_materials(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(materials[0].atten_lengths(0.1).rayleigh, 0.0);
    }
}
