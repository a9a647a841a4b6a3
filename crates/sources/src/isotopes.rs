//! Isotope table loading
//!
//! Plain-text rows of
//! `name half_life_s acolinearity_fwhm_deg positron_emission_prob
//! gamma_decay_energy_mev range_model range_params...` with `#` comments.
//! Range models are `none`, `dbexp c k1 k2 max_cm`, or
//! `gauss fwhm_mm max_mm`.

// crate modules
use crate::error::{Error, Result};

// standard library
use std::collections::BTreeMap;
use std::fs::read_to_string;
use std::path::Path;

// external crates
use gray_physics::{Isotope, PositronRange};
use log::info;

// nom parser combinators
use nom::branch::alt;
use nom::bytes::complete::{tag, take_till1};
use nom::character::complete::multispace0;
use nom::combinator::value;
use nom::number::complete::double;
use nom::sequence::preceded;
use nom::IResult;

/// Parse an isotope table file into named positron models
///
/// Lines are independent; blank lines and `#` comments are skipped. Any
/// malformed row is a fatal load error carrying the line number.
pub fn load_isotopes<P: AsRef<Path>>(path: P) -> Result<BTreeMap<String, Isotope>> {
    let content = read_to_string(path.as_ref())?;
    let mut isotopes = BTreeMap::new();
    for (number, raw) in content.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let (name, isotope) = parse_isotope_row(line).ok_or_else(|| Error::IsotopeParse {
            line: number + 1,
            content: raw.to_string(),
        })?;
        isotopes.insert(name, isotope);
    }
    info!(
        "loaded {} isotopes from {}",
        isotopes.len(),
        path.as_ref().display()
    );
    Ok(isotopes)
}

/// Look up an isotope by name, with the degenerate back-to-back emitter
/// always available
pub fn lookup(isotopes: &BTreeMap<String, Isotope>, name: &str) -> Result<Isotope> {
    if name.eq_ignore_ascii_case("backback") {
        return Ok(Isotope::BackBack);
    }
    isotopes
        .get(name)
        .cloned()
        .ok_or_else(|| Error::UnknownIsotope(name.to_string()))
}

fn parse_isotope_row(line: &str) -> Option<(String, Isotope)> {
    let (_, (name, isotope)) = row(line).ok()?;
    Some((name, isotope))
}

fn row(i: &str) -> IResult<&str, (String, Isotope)> {
    let (i, name) = preceded(multispace0, take_till1(char::is_whitespace))(i)?;
    let (i, half_life) = number_or_inf(i)?;
    let (i, acolinearity_fwhm_deg) = spaced_double(i)?;
    let (i, positron_emission_prob) = spaced_double(i)?;
    let (i, gamma_decay_energy_mev) = spaced_double(i)?;
    let (i, range) = range_model(i)?;

    let isotope = Isotope::positron(
        acolinearity_fwhm_deg,
        half_life,
        gamma_decay_energy_mev,
        positron_emission_prob,
        range,
    );
    Ok((i, (name.to_string(), isotope)))
}

fn range_model(i: &str) -> IResult<&str, PositronRange> {
    preceded(
        multispace0,
        alt((
            value(PositronRange::None, tag("none")),
            double_exp_range,
            gauss_range,
        )),
    )(i)
}

fn double_exp_range(i: &str) -> IResult<&str, PositronRange> {
    let (i, _) = tag("dbexp")(i)?;
    let (i, c) = spaced_double(i)?;
    let (i, k1) = spaced_double(i)?;
    let (i, k2) = spaced_double(i)?;
    let (i, max_cm) = spaced_double(i)?;
    Ok((i, PositronRange::DoubleExp { c, k1, k2, max_cm }))
}

fn gauss_range(i: &str) -> IResult<&str, PositronRange> {
    let (i, _) = tag("gauss")(i)?;
    let (i, fwhm_mm) = spaced_double(i)?;
    let (i, max_mm) = spaced_double(i)?;
    Ok((i, PositronRange::gaussian_from_fwhm_mm(fwhm_mm, max_mm)))
}

/// Double, with `inf` accepted for stable isotopes
fn number_or_inf(i: &str) -> IResult<&str, f64> {
    preceded(
        multispace0,
        alt((value(f64::INFINITY, tag("inf")), double)),
    )(i)
}

fn spaced_double(i: &str) -> IResult<&str, f64> {
    preceded(multispace0, double)(i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TABLE: &str = "\
# name  half_life  acol_fwhm_deg  beta_prob  gamma_mev  range
F18     6586.2     0.57           0.9686     0.0        dbexp 0.519 27.9 2.91 3.0
O15     122.24     0.57           0.9990     0.0        gauss 4.14 5.0
ZR89    282280.0   0.57           0.227      0.90915    none
";

    fn write_table() -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("gray_isotopes_{}.txt", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(TABLE.as_bytes()).unwrap();
        path
    }

    #[test]
    fn parses_all_range_models() {
        let path = write_table();
        let isotopes = load_isotopes(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(isotopes.len(), 3);
        match &isotopes["F18"] {
            Isotope::Positron {
                half_life_s,
                positron_range,
                ..
            } => {
                assert_eq!(*half_life_s, 6586.2);
                assert!(matches!(positron_range, PositronRange::DoubleExp { .. }));
            }
            other => panic!("unexpected isotope {other:?}"),
        }
        match &isotopes["ZR89"] {
            Isotope::Positron {
                gamma_decay_energy_mev,
                positron_range,
                ..
            } => {
                assert_eq!(*gamma_decay_energy_mev, 0.90915);
                assert_eq!(*positron_range, PositronRange::None);
            }
            other => panic!("unexpected isotope {other:?}"),
        }
    }

    #[test]
    fn malformed_rows_are_fatal_with_line_numbers() {
        let mut path = std::env::temp_dir();
        path.push(format!("gray_isotopes_bad_{}.txt", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "F18 6586.2 0.57 0.9686 0.0 dbexp 0.519").unwrap();
        drop(file);

        let result = load_isotopes(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(Error::IsotopeParse { line: 1, .. })));
    }

    #[test]
    fn backback_is_built_in() {
        let isotopes = BTreeMap::new();
        assert_eq!(lookup(&isotopes, "BackBack").unwrap(), Isotope::BackBack);
        assert!(lookup(&isotopes, "C11").is_err());
    }
}
