//! Photon value type

use gray_vrmath::Vec3;

/// Which member of a decay's photon set this is
///
/// Blue/red are the two annihilation photons, yellow any prompt gamma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum Color {
    #[default]
    Blue = 0,
    Red = 1,
    Yellow = 2,
}

impl Color {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => Self::Red,
            2 => Self::Yellow,
            _ => Self::Blue,
        }
    }
}

/// A gamma photon in flight
///
/// Created by a [NuclearDecay](crate::NuclearDecay), moved through the
/// transport engine, and destroyed on absorption, escape, or the trace-depth
/// cap. The scatter counters ride along so every recorded interaction knows
/// the photon's history up to that point.
#[derive(Debug, Clone, PartialEq)]
pub struct Photon {
    pub pos: Vec3,
    /// Unit direction of travel
    pub dir: Vec3,
    /// Current energy in MeV
    pub energy: f64,
    /// Elapsed time in seconds
    pub time: f64,
    /// Decay number this photon came from
    pub id: i32,
    pub color: Color,
    /// Detector the photon is currently inside, -1 outside detectors
    pub det_id: i32,
    pub src_id: i32,
    pub scatter_compton_phantom: i32,
    pub scatter_compton_detector: i32,
    pub scatter_rayleigh_phantom: i32,
    pub scatter_rayleigh_detector: i32,
    pub xray_flouresence: i32,
}

impl Photon {
    pub fn new(pos: Vec3, dir: Vec3, energy: f64, time: f64, id: i32, color: Color, src_id: i32) -> Self {
        Self {
            pos,
            dir,
            energy,
            time,
            id,
            color,
            det_id: -1,
            src_id,
            scatter_compton_phantom: 0,
            scatter_compton_detector: 0,
            scatter_rayleigh_phantom: 0,
            scatter_rayleigh_detector: 0,
            xray_flouresence: 0,
        }
    }

    /// Record a Compton scatter, classified by where the photon is
    pub fn set_scatter_compton(&mut self) {
        if self.det_id == -1 {
            self.scatter_compton_phantom += 1;
        } else {
            self.scatter_compton_detector += 1;
        }
    }

    /// Record a Rayleigh scatter, classified by where the photon is
    pub fn set_scatter_rayleigh(&mut self) {
        if self.det_id == -1 {
            self.scatter_rayleigh_phantom += 1;
        } else {
            self.scatter_rayleigh_detector += 1;
        }
    }

    pub fn set_xray_flouresence(&mut self) {
        self.xray_flouresence += 1;
    }
}

impl Default for Photon {
    fn default() -> Self {
        Self::new(
            Vec3::zeros(),
            Vec3::z(),
            -1.0,
            0.0,
            0,
            Color::Blue,
            -1,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scatter_counters_split_by_location() {
        let mut photon = Photon::default();
        photon.set_scatter_compton();
        photon.set_scatter_rayleigh();
        photon.det_id = 4;
        photon.set_scatter_compton();
        photon.set_scatter_rayleigh();

        assert_eq!(photon.scatter_compton_phantom, 1);
        assert_eq!(photon.scatter_compton_detector, 1);
        assert_eq!(photon.scatter_rayleigh_phantom, 1);
        assert_eq!(photon.scatter_rayleigh_detector, 1);
    }
}
