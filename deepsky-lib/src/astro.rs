//! Photometry and coordinate helpers.
//!
//! Distances are in light years, magnitudes use the usual astronomical scale where smaller values
//! are brighter.

use std::f64::consts::{PI, TAU};

use glam::{DQuat, DVec3};

/// Light years per parsec.
pub const LY_PER_PARSEC: f64 = 3.26167;

/// The distance at which apparent and absolute magnitude are equal by definition.
pub const ABSOLUTE_MAGNITUDE_DISTANCE: f64 = 10.0 * LY_PER_PARSEC;

/// Absolute magnitude of the sun.
pub const SOLAR_ABSOLUTE_MAGNITUDE: f32 = 4.83;

/// `2.5 / ln(10)`; converts between natural log luminosity and magnitudes.
const LN_MAG: f32 = 1.085_736_2;

/// Obliquity of the ecliptic at the J2000 epoch, in radians.
pub const J2000_OBLIQUITY: f64 = 23.439_291_1 * PI / 180.0;

/// The apparent magnitude of an object with the given absolute magnitude seen from `ly` away.
pub fn abs_to_app_mag(abs_mag: f32, ly: f64) -> f32 {
    (f64::from(abs_mag) - 5.0 + 5.0 * (ly / LY_PER_PARSEC).log10()) as f32
}

/// The absolute magnitude of an object that appears with `app_mag` from `ly` away.
pub fn app_to_abs_mag(app_mag: f32, ly: f64) -> f32 {
    (f64::from(app_mag) + 5.0 - 5.0 * (ly / LY_PER_PARSEC).log10()) as f32
}

/// Luminosity in solar units.
pub fn abs_mag_to_lum(abs_mag: f32) -> f32 {
    ((SOLAR_ABSOLUTE_MAGNITUDE - abs_mag) / LN_MAG).exp()
}

/// Absolute magnitude of a luminosity in solar units.
pub fn lum_to_abs_mag(lum: f32) -> f32 {
    SOLAR_ABSOLUTE_MAGNITUDE - lum.ln() * LN_MAG
}

/// The apparent magnitude used for visibility tests.
///
/// Extended objects do not get brighter than their absolute magnitude when approached closer than
/// [`ABSOLUTE_MAGNITUDE_DISTANCE`], so the apparent magnitude is clamped there.
pub fn apparent_magnitude(abs_mag: f32, ly: f64) -> f32 {
    if ly >= ABSOLUTE_MAGNITUDE_DISTANCE {
        abs_to_app_mag(abs_mag, ly)
    } else {
        abs_mag
    }
}

/// Converts equatorial coordinates into the ecliptic cartesian frame used by catalogs.
///
/// `ra` is in hours, `dec` in degrees and `distance` in light years. The resulting frame has its Y
/// axis pointing at the ecliptic north pole and its X axis at the vernal equinox.
pub fn equatorial_to_cartesian(ra: f64, dec: f64, distance: f64) -> DVec3 {
    let theta = ra / 24.0 * TAU + PI;
    let phi = (dec / 90.0 - 1.0) * PI / 2.0;
    let equatorial = DVec3::new(
        theta.cos() * phi.sin(),
        phi.cos(),
        -theta.sin() * phi.sin(),
    ) * distance;
    DQuat::from_rotation_x(-J2000_OBLIQUITY) * equatorial
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn magnitude_equal_at_ten_parsecs() {
        assert_relative_eq!(abs_to_app_mag(-3.0, ABSOLUTE_MAGNITUDE_DISTANCE), -3.0, epsilon = 1e-5);
        assert_relative_eq!(app_to_abs_mag(6.0, ABSOLUTE_MAGNITUDE_DISTANCE), 6.0, epsilon = 1e-5);
    }

    #[rstest]
    #[case(-20.0, 1.0e6)]
    #[case(1.5, 100.0)]
    #[case(8.0, 1.0e10)]
    fn app_and_abs_are_inverse(#[case] mag: f32, #[case] ly: f64) {
        assert_relative_eq!(app_to_abs_mag(abs_to_app_mag(mag, ly), ly), mag, epsilon = 1e-4);
    }

    #[test]
    fn ten_times_farther_is_five_magnitudes_fainter() {
        let near = abs_to_app_mag(0.0, 1000.0);
        let far = abs_to_app_mag(0.0, 10_000.0);
        assert_relative_eq!(far - near, 5.0, epsilon = 1e-5);
    }

    #[test]
    fn quarter_luminosity_is_fainter() {
        let mag = -10.0;
        let quarter = lum_to_abs_mag(abs_mag_to_lum(mag) / 4.0);
        assert_relative_eq!(quarter - mag, 2.5 * 4.0f32.log10(), epsilon = 1e-3);
        assert_relative_eq!(lum_to_abs_mag(1.0), SOLAR_ABSOLUTE_MAGNITUDE);
    }

    #[test]
    fn apparent_magnitude_is_clamped_nearby() {
        assert_eq!(apparent_magnitude(-5.0, 1.0), -5.0);
        assert!(abs_to_app_mag(-5.0, 1.0) < -5.0);
        assert_relative_eq!(
            apparent_magnitude(-5.0, 1000.0),
            abs_to_app_mag(-5.0, 1000.0)
        );
    }

    #[test]
    fn vernal_equinox_lies_on_x() {
        let position = equatorial_to_cartesian(0.0, 0.0, 10.0);
        assert_relative_eq!(position.x, 10.0, epsilon = 1e-9);
        assert_relative_eq!(position.y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(position.z, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn celestial_pole_is_tilted_by_obliquity() {
        let pole = equatorial_to_cartesian(0.0, 90.0, 1.0);
        assert_relative_eq!(pole.y, J2000_OBLIQUITY.cos(), epsilon = 1e-9);
        assert_relative_eq!(pole.x, 0.0, epsilon = 1e-9);
    }

    #[rstest]
    #[case(5.5, -69.75, 163_000.0)]
    #[case(0.71, 41.27, 2.5e6)]
    #[case(18.0, 0.0, 1.0)]
    fn conversion_keeps_distance(#[case] ra: f64, #[case] dec: f64, #[case] distance: f64) {
        let position = equatorial_to_cartesian(ra, dec, distance);
        assert_relative_eq!(position.length(), distance, max_relative = 1e-9);
    }
}
