//! Auxiliary Compton mean-free-path lookup
//!
//! Material-generation side table: mean free path against energy in keV for
//! the reference tissue parameterisation. Nothing in the simulation path
//! calls this; it is kept for the data-preparation tooling.

const ENERGIES_KEV: [f64; 16] = [
    10.0, 15.0, 20.0, 30.0, 40.0, 50.0, 60.0, 80.0, 100.0, 150.0, 200.0, 300.0, 400.0, 500.0,
    511.0, 600.0,
];

const MFP_CM: [f64; 16] = [
    6.731, 6.679, 6.628, 6.532, 6.442, 6.356, 6.273, 6.121, 5.982, 5.677, 5.420, 5.006, 4.682,
    4.417, 4.390, 4.194,
];

/// Interpolate the mean free path at `energy_kev`
///
/// Linear between tabulated points, clamped to the table ends.
pub fn interpolate(energy_kev: f64) -> f64 {
    if energy_kev <= ENERGIES_KEV[0] {
        return MFP_CM[0];
    }
    if energy_kev >= ENERGIES_KEV[ENERGIES_KEV.len() - 1] {
        return MFP_CM[MFP_CM.len() - 1];
    }
    let upper = ENERGIES_KEV.partition_point(|&probe| probe < energy_kev);
    let delta = ENERGIES_KEV[upper] - ENERGIES_KEV[upper - 1];
    let alpha = (energy_kev - ENERGIES_KEV[upper - 1]) / delta;
    (1.0 - alpha) * MFP_CM[upper - 1] + alpha * MFP_CM[upper]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(15.0, 6.679)]
    #[case(9.0, 6.731)]
    #[case(600.0, 4.194)]
    #[case(25.0, 6.580)]
    #[case(1000.0, 4.194)]
    fn reference_values(#[case] energy_kev: f64, #[case] expected: f64) {
        assert!((interpolate(energy_kev) - expected).abs() < 1e-9);
    }
}
