//! Voxelised activity distributions

// crate modules
use crate::error::{Error, Result};

// standard library
use std::fs::read_to_string;
use std::path::Path;

// external crates
use gray_random::GrayRng;
use gray_vrmath::Vec3;
use log::info;

// nom parser combinators
use nom::character::complete::{multispace0, u32 as nom_u32};
use nom::number::complete::double;
use nom::sequence::preceded;
use nom::IResult;

/// Activity laid out on a regular voxel grid
///
/// The grid origin sits at `position` (the low corner) and voxels are
/// `scale` on a side. Sampling picks a voxel from the cumulative activity
/// distribution by binary search, then a uniform point within it.
#[derive(Debug, Clone)]
pub struct VoxelGrid {
    position: Vec3,
    dims: [usize; 3],
    scale: Vec3,
    /// Cumulative probability per voxel, x-fastest order, last entry 1
    cdf: Vec<f64>,
}

impl VoxelGrid {
    /// Load a grid from the plain-text activity file
    ///
    /// First three integers are `nx ny nz`, followed by `nx * ny * nz`
    /// activity values in x-fastest order. Whitespace and line breaks are
    /// interchangeable.
    pub fn load<P: AsRef<Path>>(path: P, position: Vec3, scale: Vec3) -> Result<Self> {
        let content = read_to_string(path.as_ref())?;
        let (rest, dims) =
            parse_dimensions(&content).map_err(|e| Error::VoxelParse(e.to_string()))?;

        let expected = dims[0] * dims[1] * dims[2];
        let mut activities = Vec::with_capacity(expected);
        let mut remaining = rest;
        for _ in 0..expected {
            let (next, value) =
                parse_activity(remaining).map_err(|e| Error::VoxelParse(e.to_string()))?;
            activities.push(value);
            remaining = next;
        }
        info!(
            "loaded {}x{}x{} voxel source from {}",
            dims[0],
            dims[1],
            dims[2],
            path.as_ref().display()
        );
        Self::new(position, dims, scale, &activities)
    }

    /// Build from in-memory activities in x-fastest order
    pub fn new(position: Vec3, dims: [usize; 3], scale: Vec3, activities: &[f64]) -> Result<Self> {
        let total: f64 = activities.iter().filter(|&&a| a > 0.0).sum();
        if total <= 0.0 || activities.len() != dims[0] * dims[1] * dims[2] {
            return Err(Error::EmptyVoxelSource);
        }
        let mut cdf = Vec::with_capacity(activities.len());
        let mut running = 0.0;
        for &activity in activities {
            running += activity.max(0.0) / total;
            cdf.push(running);
        }
        // close any floating point shortfall so search never runs off the end
        if let Some(last) = cdf.last_mut() {
            *last = 1.0;
        }
        Ok(Self {
            position,
            dims,
            scale,
            cdf,
        })
    }

    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|v| v.is_finite()) && self.scale.iter().all(|v| v.is_finite())
    }

    /// Sample a position weighted by voxel activity
    pub fn sample(&self, rng: &mut GrayRng) -> Vec3 {
        let u = rng.uniform();
        let flat = self.cdf.partition_point(|&cum| cum < u).min(self.cdf.len() - 1);

        let i = flat % self.dims[0];
        let j = (flat / self.dims[0]) % self.dims[1];
        let k = flat / (self.dims[0] * self.dims[1]);
        self.position
            + Vec3::new(
                (i as f64 + rng.uniform()) * self.scale.x,
                (j as f64 + rng.uniform()) * self.scale.y,
                (k as f64 + rng.uniform()) * self.scale.z,
            )
    }

    /// Whether `pos` is within the grid bounding box
    pub fn inside(&self, pos: &Vec3) -> bool {
        let local = pos - self.position;
        (0..3).all(|axis| {
            local[axis] >= 0.0 && local[axis] <= self.dims[axis] as f64 * self.scale[axis]
        })
    }
}

fn parse_dimensions(i: &str) -> IResult<&str, [usize; 3]> {
    let (i, nx) = preceded(multispace0, nom_u32)(i)?;
    let (i, ny) = preceded(multispace0, nom_u32)(i)?;
    let (i, nz) = preceded(multispace0, nom_u32)(i)?;
    Ok((i, [nx as usize, ny as usize, nz as usize]))
}

fn parse_activity(i: &str) -> IResult<&str, f64> {
    preceded(multispace0, double)(i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_and_samples_active_voxels() {
        let mut path = std::env::temp_dir();
        path.push(format!("gray_voxels_{}.txt", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        // only the second voxel in x carries activity
        writeln!(file, "2 1 1").unwrap();
        writeln!(file, "0.0 5.0").unwrap();
        drop(file);

        let grid = VoxelGrid::load(&path, Vec3::zeros(), Vec3::repeat(1.0)).unwrap();
        std::fs::remove_file(&path).ok();

        let mut rng = GrayRng::from_seed(5);
        for _ in 0..100 {
            let pos = grid.sample(&mut rng);
            assert!(pos.x >= 1.0 && pos.x <= 2.0);
            assert!(grid.inside(&pos));
        }
    }

    #[test]
    fn empty_activity_is_rejected() {
        let result = VoxelGrid::new(
            Vec3::zeros(),
            [2, 2, 1],
            Vec3::repeat(1.0),
            &[0.0, 0.0, 0.0, 0.0],
        );
        assert!(matches!(result, Err(Error::EmptyVoxelSource)));
    }

    #[test]
    fn sampling_respects_weights() {
        let grid = VoxelGrid::new(
            Vec3::zeros(),
            [2, 1, 1],
            Vec3::repeat(1.0),
            &[1.0, 3.0],
        )
        .unwrap();
        let mut rng = GrayRng::from_seed(123);
        let heavy = (0..2000)
            .filter(|_| grid.sample(&mut rng).x >= 1.0)
            .count();
        // expect about 75% in the heavier voxel
        assert!((1300..1700).contains(&heavy));
    }
}
