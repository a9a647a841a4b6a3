//! Nuclear decay bundles

// crate modules
use crate::photon::Photon;

// external crates
use gray_vrmath::Vec3;

/// The photons and metadata of one radioactive decay
///
/// Immutable once produced by an isotope model. Photons are popped newest
/// first, matching the order the decay model added them.
#[derive(Debug, Clone, Default)]
pub struct NuclearDecay {
    decay_number: i32,
    time: f64,
    src_id: i32,
    position: Vec3,
    energy: f64,
    photons: Vec<Photon>,
}

impl NuclearDecay {
    pub fn new(decay_number: i32, time: f64, src_id: i32, position: Vec3, energy: f64) -> Self {
        Self {
            decay_number,
            time,
            src_id,
            position,
            energy,
            photons: Vec::new(),
        }
    }

    pub fn add_photon(&mut self, photon: Photon) {
        self.photons.push(photon);
    }

    /// Remove and return the most recently added photon
    pub fn next_photon(&mut self) -> Option<Photon> {
        self.photons.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.photons.is_empty()
    }

    /// Iterate photons newest to oldest without consuming them
    pub fn photons(&self) -> impl Iterator<Item = &Photon> {
        self.photons.iter().rev()
    }

    pub fn decay_number(&self) -> i32 {
        self.decay_number
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn src_id(&self) -> i32 {
        self.src_id
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photon::Color;

    #[test]
    fn photons_pop_newest_first() {
        let mut decay = NuclearDecay::new(1, 0.0, 0, Vec3::zeros(), 0.0);
        for color in [Color::Blue, Color::Red, Color::Yellow] {
            decay.add_photon(Photon::new(
                Vec3::zeros(),
                Vec3::z(),
                0.511,
                0.0,
                1,
                color,
                0,
            ));
        }

        assert_eq!(decay.next_photon().unwrap().color, Color::Yellow);
        assert_eq!(decay.next_photon().unwrap().color, Color::Red);
        assert_eq!(decay.next_photon().unwrap().color, Color::Blue);
        assert!(decay.is_empty());
    }
}
