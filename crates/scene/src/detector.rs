//! Detector crystals and the detector array

// crate modules
use crate::error::Result;

// standard library
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

// external crates
use gray_utils::ValueExt;
use gray_vrmath::{RigidMap, Vec3};
use log::info;

/// One detector crystal placed in the scene
///
/// Produced only while the scene is loaded; read-only at simulation time.
#[derive(Debug, Clone, PartialEq)]
pub struct Detector {
    pub id: i32,
    pub size: Vec3,
    pub pos: Vec3,
    pub map: RigidMap,
    /// Block-local (x, y, z) crystal indices
    pub idx: [i32; 3],
    pub block: i32,
}

/// All detectors of the scene, in id order
#[derive(Debug, Clone, Default)]
pub struct DetectorArray {
    pub detectors: Vec<Detector>,
}

impl DetectorArray {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a detector, returning its id
    pub fn add_detector(
        &mut self,
        pos: Vec3,
        size: Vec3,
        map: RigidMap,
        idx: [i32; 3],
        block: i32,
    ) -> i32 {
        let id = self.detectors.len() as i32;
        self.detectors.push(Detector {
            id,
            size,
            pos,
            map,
            idx,
            block,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// The standard id mappings the DAQ stages key off
    ///
    /// `detector` is the identity, `block` groups crystals into their block,
    /// and `bx`/`by`/`bz` are the block-local coordinates. Each map is a
    /// lookup from detector id to component id.
    pub fn default_mapping(&self) -> BTreeMap<String, Vec<i32>> {
        let mut mapping = BTreeMap::new();
        mapping.insert(
            "detector".to_string(),
            self.detectors.iter().map(|d| d.id).collect(),
        );
        mapping.insert(
            "block".to_string(),
            self.detectors.iter().map(|d| d.block).collect(),
        );
        for (name, axis) in [("bx", 0), ("by", 1), ("bz", 2)] {
            mapping.insert(
                name.to_string(),
                self.detectors.iter().map(|d| d.idx[axis]).collect(),
            );
        }
        mapping
    }

    /// Write one line per detector: id, position, size, indices, block
    pub fn write_positions<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        for detector in &self.detectors {
            writeln!(
                writer,
                "{} {} {} {} {} {} {} {} {} {} {}",
                detector.id,
                detector.pos.x.sci(8, 2),
                detector.pos.y.sci(8, 2),
                detector.pos.z.sci(8, 2),
                detector.size.x.sci(8, 2),
                detector.size.y.sci(8, 2),
                detector.size.z.sci(8, 2),
                detector.idx[0],
                detector.idx[1],
                detector.idx[2],
                detector.block,
            )?;
        }
        info!(
            "wrote {} detector positions to {}",
            self.detectors.len(),
            path.as_ref().display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn array_with_blocks() -> DetectorArray {
        let mut array = DetectorArray::new();
        for block in 0..2 {
            for x in 0..2 {
                array.add_detector(
                    Vec3::new(f64::from(x), 0.0, f64::from(block)),
                    Vec3::repeat(0.3),
                    RigidMap::identity(),
                    [x, 0, 0],
                    block,
                );
            }
        }
        array
    }

    #[test]
    fn ids_are_sequential() {
        let array = array_with_blocks();
        let ids: Vec<i32> = array.detectors.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn default_mapping_covers_every_detector() {
        let array = array_with_blocks();
        let mapping = array.default_mapping();
        assert_eq!(mapping["detector"], vec![0, 1, 2, 3]);
        assert_eq!(mapping["block"], vec![0, 0, 1, 1]);
        assert_eq!(mapping["bx"], vec![0, 1, 0, 1]);
        assert_eq!(mapping["by"], vec![0, 0, 0, 0]);
    }
}
