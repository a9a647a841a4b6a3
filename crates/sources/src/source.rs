//! A source: shape, activity, and isotope

// crate modules
use crate::error::{Error, Result};
use crate::shape::SourceShape;

// external crates
use gray_physics::{Isotope, NuclearDecay};
use gray_random::GrayRng;
use gray_vrmath::Vec3;

/// One emission source in the simulation
///
/// Activity is kept in microcuries as given in scene files; the scheduler
/// converts to becquerels. A negative activity marks a subtractive source:
/// it never emits, it only rejects positions sampled from positive sources.
#[derive(Debug, Clone)]
pub struct Source {
    pub shape: SourceShape,
    /// Activity in microcuries; negative for subtractive sources
    pub activity_uci: f64,
    pub negative: bool,
    pub source_num: i32,
    pub isotope: Isotope,
    /// Material the source volume sits in, an index into the scene table
    pub material_id: i32,
}

impl Source {
    /// Validate and build a source
    ///
    /// Beam-point shapes require a beam isotope, and the annulus shapes make
    /// no sense as negative sources since their containment covers the whole
    /// enclosed cylinder. Both are attach-time errors.
    pub fn new(shape: SourceShape, activity_uci: f64, isotope: Isotope) -> Result<Self> {
        if matches!(shape, SourceShape::BeamPoint { .. })
            && !matches!(isotope, Isotope::Beam { .. })
        {
            return Err(Error::BeamPointNeedsBeam);
        }
        let negative = activity_uci < 0.0;
        if negative
            && matches!(
                shape,
                SourceShape::AnnulusCylinder { .. } | SourceShape::AnnulusEllipticCylinder { .. }
            )
        {
            return Err(Error::NegativeAnnulus);
        }
        if !shape.is_finite() {
            return Err(Error::NonFiniteExtent);
        }
        Ok(Self {
            shape,
            activity_uci,
            negative,
            source_num: 0,
            isotope,
            material_id: 0,
        })
    }

    pub fn with_material(mut self, material_id: i32) -> Self {
        self.material_id = material_id;
        self
    }

    /// Whether `pos` lies inside the source volume
    pub fn inside(&self, pos: &Vec3) -> bool {
        self.shape.inside(pos)
    }

    /// Produce one decay at the given time
    pub fn decay(&self, decay_number: i32, time: f64, rng: &mut GrayRng) -> NuclearDecay {
        let position = self.shape.decay_position(rng);
        self.isotope
            .decay(decay_number, time, self.source_num, position, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gray_physics::PositronRange;

    #[test]
    fn beam_point_requires_beam_isotope() {
        let shape = SourceShape::BeamPoint {
            position: Vec3::zeros(),
        };
        assert!(matches!(
            Source::new(shape.clone(), 1.0, Isotope::BackBack),
            Err(Error::BeamPointNeedsBeam)
        ));
        assert!(Source::new(shape, 1.0, Isotope::beam(Vec3::z(), 0.0, 0.511)).is_ok());
    }

    #[test]
    fn negative_annulus_is_refused() {
        let shape = SourceShape::annulus_cylinder(Vec3::zeros(), 1.0, Vec3::new(0.0, 0.0, 2.0));
        assert!(matches!(
            Source::new(shape, -1.0, Isotope::BackBack),
            Err(Error::NegativeAnnulus)
        ));
    }

    #[test]
    fn negative_activity_marks_subtractive() {
        let shape = SourceShape::Sphere {
            center: Vec3::zeros(),
            radius: 1.0,
        };
        let source = Source::new(shape, -0.5, Isotope::BackBack).unwrap();
        assert!(source.negative);
    }

    #[test]
    fn non_finite_extent_is_fatal() {
        let shape = SourceShape::Sphere {
            center: Vec3::zeros(),
            radius: f64::INFINITY,
        };
        assert!(matches!(
            Source::new(shape, 1.0, Isotope::BackBack),
            Err(Error::NonFiniteExtent)
        ));
    }

    #[test]
    fn decay_carries_source_identity() {
        let mut rng = GrayRng::from_seed(77);
        let shape = SourceShape::Point {
            position: Vec3::new(0.0, 0.0, 1.0),
        };
        let isotope = Isotope::positron(0.0, 6586.2, 0.0, 1.0, PositronRange::None);
        let mut source = Source::new(shape, 1.0, isotope).unwrap();
        source.source_num = 4;

        let decay = source.decay(12, 3.5, &mut rng);
        assert_eq!(decay.decay_number(), 12);
        assert_eq!(decay.src_id(), 4);
        assert_eq!(decay.position(), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(decay.time(), 3.5);
    }
}
