//! Photon transport through the scene

// crate modules
use crate::material_stack::{MaterialStack, MaterialStackResult};

// external crates
use gray_physics::{
    klein_nishina_energy, Interaction, InteractionType, NuclearDecay, Photon,
};
use gray_random::GrayRng;
use gray_scene::SceneDescription;
use log::trace;

/// Scatter events allowed per photon before it is dropped
pub const DEFAULT_MAX_TRACE_DEPTH: usize = 500;

/// Nudge past a crossed surface so the next query starts on the far side
const EPSILON: f64 = 1e-6;

/// Inverse speed of light in s/cm, for path-length time accumulation
const INVERSE_SPEED_OF_LIGHT: f64 = 1.0 / 2.99792458e10;

/// Transport tallies, mergeable across ranks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GammaRayTraceStats {
    pub decays: u64,
    pub photons: u64,
    /// Photons that left the scene without interacting with anything
    pub escaped: u64,
    pub compton: u64,
    pub rayleigh: u64,
    pub photoelectric: u64,
    pub xray_escapes: u64,
    pub errors: u64,
}

impl std::ops::AddAssign for GammaRayTraceStats {
    fn add_assign(&mut self, rhs: Self) {
        self.decays += rhs.decays;
        self.photons += rhs.photons;
        self.escaped += rhs.escaped;
        self.compton += rhs.compton;
        self.rayleigh += rhs.rayleigh;
        self.photoelectric += rhs.photoelectric;
        self.xray_escapes += rhs.xray_escapes;
        self.errors += rhs.errors;
    }
}

/// The transport engine
///
/// Stateless apart from its depth cap; per-photon state is the photon
/// itself and a local [MaterialStack].
#[derive(Debug, Clone, Copy)]
pub struct GammaRayTrace {
    max_trace_depth: usize,
}

impl GammaRayTrace {
    pub fn new(max_trace_depth: usize) -> Self {
        Self { max_trace_depth }
    }

    /// Trace every photon of a decay, appending interaction records
    ///
    /// The first record marks the decay itself; the rest are whatever the
    /// photons deposit on their way out.
    pub fn trace_decay(
        &self,
        decay: &mut NuclearDecay,
        scene: &SceneDescription,
        source_material: i32,
        out: &mut Vec<Interaction>,
        stats: &mut GammaRayTraceStats,
        rng: &mut GrayRng,
    ) {
        stats.decays += 1;
        out.push(Interaction::from_decay(decay, source_material));
        while let Some(mut photon) = decay.next_photon() {
            stats.photons += 1;
            let mut stack = MaterialStack::new(scene.default_material());
            if source_material != scene.default_material() {
                stack.push_material(source_material);
            }
            self.trace_photon(&mut photon, scene, &mut stack, out, stats, rng);
        }
    }

    fn trace_photon(
        &self,
        photon: &mut Photon,
        scene: &SceneDescription,
        stack: &mut MaterialStack,
        out: &mut Vec<Interaction>,
        stats: &mut GammaRayTraceStats,
        rng: &mut GrayRng,
    ) {
        let mut avoid_id = None;
        let mut interacted = false;
        for _ in 0..self.max_trace_depth {
            let material_id = match stack.cur_material() {
                MaterialStackResult::Ok(id) => id,
                MaterialStackResult::Match => {
                    out.push(Interaction::error(InteractionType::ErrorMatch, photon));
                    stats.errors += 1;
                    return;
                }
                MaterialStackResult::TraceDepth => {
                    out.push(Interaction::error(InteractionType::ErrorTraceDepth, photon));
                    stats.errors += 1;
                    return;
                }
            };
            let material = match scene.material(material_id) {
                Ok(material) => material,
                Err(_) => {
                    out.push(Interaction::error(InteractionType::ErrorEmpty, photon));
                    stats.errors += 1;
                    return;
                }
            };

            let atten = material.atten_lengths(photon.energy);
            let interaction_dist = if atten.total() > 0.0 {
                rng.exponential(atten.total())
            } else {
                f64::INFINITY
            };

            let hit = scene.seek_intersection(&photon.pos, &photon.dir, avoid_id);
            match hit {
                Some(hit) if hit.distance < interaction_dist => {
                    // surface first: step through it and swap materials
                    let step = hit.distance + EPSILON;
                    photon.pos += photon.dir * step;
                    photon.time += step * INVERSE_SPEED_OF_LIGHT;
                    avoid_id = Some(hit.object_id);

                    let result = if hit.point.is_front_facing() {
                        photon.det_id = hit.point.detector_id;
                        stack.push_material(hit.point.material_id)
                    } else {
                        photon.det_id = -1;
                        stack.pop_material()
                    };
                    match result {
                        MaterialStackResult::Ok(_) => {}
                        MaterialStackResult::TraceDepth => {
                            out.push(Interaction::error(
                                InteractionType::ErrorTraceDepth,
                                photon,
                            ));
                            stats.errors += 1;
                            return;
                        }
                        MaterialStackResult::Match => {
                            out.push(Interaction::error(InteractionType::ErrorMatch, photon));
                            stats.errors += 1;
                            return;
                        }
                    }
                }
                Some(_) | None if interaction_dist.is_finite() => {
                    // interaction point first
                    photon.pos += photon.dir * interaction_dist;
                    photon.time += interaction_dist * INVERSE_SPEED_OF_LIGHT;
                    avoid_id = None;
                    interacted = true;

                    let channel = rng.uniform() * atten.total();
                    if channel < atten.compton {
                        self.compton_scatter(photon, material, material_id, out, stats, rng);
                    } else if channel < atten.compton + atten.photoelectric {
                        let absorbed =
                            self.photoelectric(photon, material, material_id, out, stats, rng);
                        if absorbed {
                            return;
                        }
                    } else {
                        self.rayleigh_scatter(photon, material, material_id, out, stats, rng);
                    }
                }
                _ => {
                    // nothing ahead and no interaction: the photon escapes
                    if !interacted {
                        stats.escaped += 1;
                    }
                    trace!("photon {} escaped at {:?}", photon.id, photon.pos);
                    return;
                }
            }
        }
        out.push(Interaction::error(InteractionType::ErrorTraceDepth, photon));
        stats.errors += 1;
    }

    fn compton_scatter(
        &self,
        photon: &mut Photon,
        material: &gray_physics::GammaMaterial,
        material_id: i32,
        out: &mut Vec<Interaction>,
        stats: &mut GammaRayTraceStats,
        rng: &mut GrayRng,
    ) {
        let u = rng.uniform();
        let cos_theta = material.comp_scatter_angle(photon.energy, u);
        let scattered = klein_nishina_energy(photon.energy, cos_theta);
        let deposit = photon.energy - scattered;

        photon.set_scatter_compton();
        out.push(Interaction::deposit(
            InteractionType::Compton,
            photon,
            material_id,
            deposit,
        ));
        photon.dir = rng.deflection(&photon.dir, cos_theta);
        photon.energy = scattered;
        stats.compton += 1;
    }

    fn rayleigh_scatter(
        &self,
        photon: &mut Photon,
        material: &gray_physics::GammaMaterial,
        material_id: i32,
        out: &mut Vec<Interaction>,
        stats: &mut GammaRayTraceStats,
        rng: &mut GrayRng,
    ) {
        let u = rng.uniform();
        let cos_theta = material.rayl_scatter_angle(photon.energy, u);

        photon.set_scatter_rayleigh();
        out.push(Interaction::deposit(
            InteractionType::Rayleigh,
            photon,
            material_id,
            0.0,
        ));
        // elastic: direction changes, energy does not
        photon.dir = rng.deflection(&photon.dir, cos_theta);
        stats.rayleigh += 1;
    }

    /// Returns true when the photon was fully absorbed
    fn photoelectric(
        &self,
        photon: &mut Photon,
        material: &gray_physics::GammaMaterial,
        material_id: i32,
        out: &mut Vec<Interaction>,
        stats: &mut GammaRayTraceStats,
        rng: &mut GrayRng,
    ) -> bool {
        stats.photoelectric += 1;
        let u = rng.uniform();
        match material.get_escape(u, photon.energy) {
            None => {
                out.push(Interaction::deposit(
                    InteractionType::Photoelectric,
                    photon,
                    material_id,
                    photon.energy,
                ));
                photon.energy = 0.0;
                true
            }
            Some(xray_energy) => {
                // the characteristic x-ray escapes the atom and carries on;
                // everything else is absorbed on the spot
                let deposit = photon.energy - xray_energy;
                photon.set_xray_flouresence();
                out.push(Interaction::deposit(
                    InteractionType::Photoelectric,
                    photon,
                    material_id,
                    deposit,
                ));
                photon.energy = xray_energy;
                photon.dir = rng.uniform_sphere();
                stats.xray_escapes += 1;
                false
            }
        }
    }
}

impl Default for GammaRayTrace {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TRACE_DEPTH)
    }
}
