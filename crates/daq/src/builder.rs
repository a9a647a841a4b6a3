//! Building a pipeline from stage descriptions

// crate modules
use crate::blur::{BlurFunctor, BlurProcess};
use crate::coinc::{CoincProcess, MultiplesPolicy};
use crate::deadtime::DeadtimeProcess;
use crate::error::{Error, Result};
use crate::filter::{FilterFunctor, FilterProcess};
use crate::merge::{MergeFunctor, MergeProcess};
use crate::model::DaqModel;
use crate::sort::SortProcess;

// standard library
use std::collections::BTreeMap;

// external crates
use log::info;

/// Build a [DaqModel] from one stage description per line
///
/// Recognized stages, one per line, parameters in seconds and MeV:
///
/// ```text
/// blur energy 0.13
/// blur energy 0.13 ref 0.511
/// blur time 2e-9 max 10e-9
/// filter elow 0.350
/// filter ehigh 0.650
/// merge <mapping> 300e-9 [first|max|anger]
/// deadtime <mapping> 200e-9 [paralyzable]
/// sort 500e-9
/// coinc window 10e-9 [delay <s>] [keep_all|keep_if_only_two|keep_first_two]
/// ```
///
/// `<mapping>` names one of the detector-array id maps (`detector`,
/// `block`, `bx`, `by`, `bz`).
pub fn build_daq_model(
    lines: &[String],
    mappings: &BTreeMap<String, Vec<i32>>,
) -> Result<DaqModel> {
    let mut model = DaqModel::new();
    for line in lines {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        match tokens[0] {
            "blur" => model.add_process(Box::new(parse_blur(line, &tokens)?)),
            "filter" => model.add_process(Box::new(parse_filter(line, &tokens)?)),
            "merge" => model.add_process(Box::new(parse_merge(line, &tokens, mappings)?)),
            "deadtime" => model.add_process(Box::new(parse_deadtime(line, &tokens, mappings)?)),
            "sort" => {
                let max_wait = parse_number(line, tokens.get(1))?;
                model.add_process(Box::new(SortProcess::new(max_wait)));
            }
            "coinc" => model.add_coinc_process(parse_coinc(line, &tokens)?),
            other => return Err(Error::UnknownStage(other.to_string())),
        }
    }
    info!(
        "daq pipeline built: {} stage lines, {} coincidence channels",
        lines.len(),
        model.no_coinc_processes()
    );
    Ok(model)
}

fn parse_blur(line: &str, tokens: &[&str]) -> Result<BlurProcess> {
    let blur = match tokens.get(1) {
        Some(&"energy") => {
            let fwhm_fraction = parse_number(line, tokens.get(2))?;
            if tokens.get(3) == Some(&"ref") {
                BlurFunctor::EnergyReferenced {
                    fwhm_fraction,
                    ref_energy: parse_number(line, tokens.get(4))?,
                }
            } else {
                BlurFunctor::Energy { fwhm_fraction }
            }
        }
        Some(&"time") => {
            let fwhm = parse_number(line, tokens.get(2))?;
            let max_blur = if tokens.get(3) == Some(&"max") {
                parse_number(line, tokens.get(4))?
            } else {
                // without an explicit bound, truncate at three sigma-widths
                3.0 * fwhm
            };
            BlurFunctor::Time { fwhm, max_blur }
        }
        _ => return Err(bad(line, "expected \"energy\" or \"time\"")),
    };
    Ok(BlurProcess::new(blur))
}

fn parse_filter(line: &str, tokens: &[&str]) -> Result<FilterProcess> {
    let threshold = parse_number(line, tokens.get(2))?;
    let filter = match tokens.get(1) {
        Some(&"elow") => FilterFunctor::EnergyGateLow { threshold },
        Some(&"ehigh") => FilterFunctor::EnergyGateHigh { threshold },
        _ => return Err(bad(line, "expected \"elow\" or \"ehigh\"")),
    };
    Ok(FilterProcess::new(filter))
}

fn parse_merge(
    line: &str,
    tokens: &[&str],
    mappings: &BTreeMap<String, Vec<i32>>,
) -> Result<MergeProcess> {
    let lookup = mapping(line, tokens.get(1), mappings)?;
    let window = parse_number(line, tokens.get(2))?;
    let merge = match tokens.get(3) {
        None | Some(&"first") => MergeFunctor::First,
        Some(&"max") => MergeFunctor::Max,
        Some(&"anger") => MergeFunctor::anger(
            named_mapping(line, "block", mappings)?,
            named_mapping(line, "bx", mappings)?,
            named_mapping(line, "by", mappings)?,
            named_mapping(line, "bz", mappings)?,
        ),
        Some(other) => return Err(bad(line, &format!("unknown merge type \"{other}\""))),
    };
    Ok(MergeProcess::new(lookup, window, merge))
}

fn parse_deadtime(
    line: &str,
    tokens: &[&str],
    mappings: &BTreeMap<String, Vec<i32>>,
) -> Result<DeadtimeProcess> {
    let lookup = mapping(line, tokens.get(1), mappings)?;
    let deadtime = parse_number(line, tokens.get(2))?;
    let paralyzable = match tokens.get(3) {
        None => false,
        Some(&"paralyzable") => true,
        Some(&"nonparalyzable") => false,
        Some(other) => return Err(bad(line, &format!("unknown deadtime flag \"{other}\""))),
    };
    Ok(DeadtimeProcess::new(lookup, deadtime, paralyzable))
}

fn parse_coinc(line: &str, tokens: &[&str]) -> Result<CoincProcess> {
    if tokens.get(1) != Some(&"window") {
        return Err(bad(line, "expected \"coinc window <s>\""));
    }
    let window = parse_number(line, tokens.get(2))?;
    let mut delay = 0.0;
    let mut policy = MultiplesPolicy::KeepIfOnlyTwo;
    let mut rest = &tokens[3..];
    while let Some(&token) = rest.first() {
        match token {
            "delay" => {
                delay = parse_number(line, rest.get(1))?;
                rest = &rest[2..];
            }
            "keep_all" => {
                policy = MultiplesPolicy::KeepAll;
                rest = &rest[1..];
            }
            "keep_if_only_two" => {
                policy = MultiplesPolicy::KeepIfOnlyTwo;
                rest = &rest[1..];
            }
            "keep_first_two" => {
                policy = MultiplesPolicy::KeepFirstTwo;
                rest = &rest[1..];
            }
            other => return Err(bad(line, &format!("unknown coinc option \"{other}\""))),
        }
    }
    Ok(CoincProcess::new(window, delay, policy))
}

fn mapping(
    line: &str,
    name: Option<&&str>,
    mappings: &BTreeMap<String, Vec<i32>>,
) -> Result<Vec<i32>> {
    let name = name.ok_or_else(|| bad(line, "missing mapping name"))?;
    named_mapping(line, name, mappings)
}

fn named_mapping(
    _line: &str,
    name: &str,
    mappings: &BTreeMap<String, Vec<i32>>,
) -> Result<Vec<i32>> {
    mappings
        .get(name)
        .cloned()
        .ok_or_else(|| Error::UnknownMapping(name.to_string()))
}

fn parse_number(line: &str, token: Option<&&str>) -> Result<f64> {
    token
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| bad(line, "missing or malformed number"))
}

fn bad(line: &str, reason: &str) -> Error {
    Error::BadStageParameter {
        stage: line.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mappings() -> BTreeMap<String, Vec<i32>> {
        let mut map = BTreeMap::new();
        map.insert("detector".to_string(), vec![0, 1, 2, 3]);
        map.insert("block".to_string(), vec![0, 0, 1, 1]);
        map.insert("bx".to_string(), vec![0, 1, 0, 1]);
        map.insert("by".to_string(), vec![0, 0, 0, 0]);
        map.insert("bz".to_string(), vec![0, 0, 0, 0]);
        map
    }

    #[test]
    fn builds_a_full_pipeline() {
        let lines: Vec<String> = [
            "blur energy 0.13 ref 0.511",
            "blur time 2e-9 max 10e-9",
            "merge block 300e-9 anger",
            "filter elow 0.350",
            "filter ehigh 0.650",
            "deadtime detector 200e-9 paralyzable",
            "sort 500e-9",
            "coinc window 10e-9 delay 500e-9 keep_first_two",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let model = build_daq_model(&lines, &mappings()).unwrap();
        assert_eq!(model.no_coinc_processes(), 1);
    }

    #[test]
    fn unknown_stage_is_an_error() {
        let lines = vec!["integrate 5".to_string()];
        assert!(matches!(
            build_daq_model(&lines, &mappings()),
            Err(Error::UnknownStage(_))
        ));
    }

    #[test]
    fn unknown_mapping_is_an_error() {
        let lines = vec!["merge ring 300e-9".to_string()];
        assert!(matches!(
            build_daq_model(&lines, &mappings()),
            Err(Error::UnknownMapping(_))
        ));
    }

    #[test]
    fn malformed_number_is_an_error() {
        let lines = vec!["sort fast".to_string()];
        assert!(matches!(
            build_daq_model(&lines, &mappings()),
            Err(Error::BadStageParameter { .. })
        ));
    }
}
