//! Derived session metrics
//!
//! Calculations the viewer runs over a sample's measurement columns. Inputs
//! are per-row values where `None` marks a missing or non-numeric cell, as
//! produced by [`SheetTable::numeric_column`](crate::sheet::SheetTable::numeric_column).

use once_cell::sync::Lazy;
use regex::Regex;
use std::str::FromStr;
use tracing::debug;

/// Puff interval used when a row's count is missing or unusable
pub const DEFAULT_PUFFS: f64 = 10.0;

/// Puff duration in seconds used when the regime does not give one
pub const DEFAULT_PUFF_TIME: f64 = 3.0;

static REGIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*mL\s*/\s*(\d+(?:\.\d+)?)\s*s\s*/\s*(\d+(?:\.\d+)?)\s*s")
        .expect("Invalid puffing regime regex")
});

/// Puffs taken since the previous row, from cumulative puff counts
///
/// The first row's interval is its own count. A later row whose count does
/// not increase falls back to its own count, or to [`DEFAULT_PUFFS`] when
/// that count is missing or zero.
pub fn puffing_intervals(puffs: &[Option<f64>]) -> Vec<f64> {
    let mut intervals = Vec::with_capacity(puffs.len());
    for (i, current) in puffs.iter().enumerate() {
        if i == 0 {
            intervals.push(current.unwrap_or(DEFAULT_PUFFS));
            continue;
        }

        let previous = puffs[i - 1].unwrap_or(0.0);
        let interval = current.unwrap_or(0.0) - previous;
        let interval = match current {
            _ if interval > 0.0 => interval,
            Some(count) if *count != 0.0 => *count,
            _ => DEFAULT_PUFFS,
        };
        intervals.push(interval);
    }
    intervals
}

/// TPM in mg/puff from before/after weights in grams
///
/// Rows where either weight is missing come back as `None`.
pub fn tpm_from_weights(
    puffs: &[Option<f64>],
    before_g: &[Option<f64>],
    after_g: &[Option<f64>],
) -> Vec<Option<f64>> {
    let intervals = puffing_intervals(puffs);
    let tpm: Vec<Option<f64>> = intervals
        .iter()
        .enumerate()
        .map(|(i, &interval)| {
            let before = before_g.get(i).copied().flatten()?;
            let after = after_g.get(i).copied().flatten()?;
            (interval > 0.0).then(|| (before - after) * 1000.0 / interval)
        })
        .collect();

    debug!(
        "Calculated TPM for {}/{} rows",
        tpm.iter().flatten().count(),
        tpm.len()
    );
    tpm
}

/// Puffing regime such as `55mL/3s/30s`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PuffingRegime {
    /// Puff volume in mL
    pub volume_ml: f64,
    /// Puff duration in seconds
    pub duration_s: f64,
    /// Time between puffs in seconds
    pub interval_s: f64,
}

impl PuffingRegime {
    /// Find a regime anywhere in `text`
    pub fn parse(text: &str) -> Option<Self> {
        let caps = REGIME_PATTERN.captures(text)?;
        Some(Self {
            volume_ml: caps[1].parse().ok()?,
            duration_s: caps[2].parse().ok()?,
            interval_s: caps[3].parse().ok()?,
        })
    }
}

impl FromStr for PuffingRegime {
    type Err = crate::error::Vap3Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            crate::error::Vap3Error::InvalidFormat(format!("Not a puffing regime: {:?}", s))
        })
    }
}

/// Puff duration from a regime cell, if it holds one
pub fn puff_time_from_regime(text: &str) -> Option<f64> {
    PuffingRegime::parse(text).map(|regime| regime.duration_s)
}

/// TPM per second of puffing (mg/s)
///
/// Falls back to [`DEFAULT_PUFF_TIME`] when `puff_time` is unknown or not
/// positive.
pub fn normalized_tpm(tpm: &[Option<f64>], puff_time: Option<f64>) -> Vec<Option<f64>> {
    let puff_time = puff_time
        .filter(|t| *t > 0.0)
        .unwrap_or(DEFAULT_PUFF_TIME);
    tpm.iter().map(|v| v.map(|tpm| tpm / puff_time)).collect()
}

/// Share of the initial oil mass that was delivered as aerosol, in percent
///
/// Missing cells are dropped from each column before the columns are paired
/// row by row. Returns `None` without an initial mass or without data.
pub fn usage_efficiency(
    puffs: &[Option<f64>],
    tpm: &[Option<f64>],
    initial_oil_mass_g: Option<f64>,
) -> Option<f64> {
    let initial_mg = initial_oil_mass_g.filter(|m| *m != 0.0)? * 1000.0;

    let puffs: Vec<f64> = puffs.iter().flatten().copied().collect();
    let tpm: Vec<f64> = tpm.iter().flatten().copied().collect();
    if puffs.is_empty() || tpm.is_empty() {
        return None;
    }

    let total_mg: f64 = puffs
        .iter()
        .zip(&tpm)
        .enumerate()
        .map(|(i, (count, tpm))| match i {
            0 => tpm * count,
            _ => tpm * (count - puffs[i - 1]),
        })
        .sum();

    if initial_mg <= 0.0 {
        return None;
    }
    debug!("Total aerosol mass {:.2}mg of {}mg oil", total_mg, initial_mg);
    Some(total_mg / initial_mg * 100.0)
}

/// TPM per watt, with power from `V²/R`
///
/// Returns `None` when voltage or resistance is missing or not positive.
pub fn power_efficiency(
    tpm: &[Option<f64>],
    voltage: Option<f64>,
    resistance: Option<f64>,
) -> Option<Vec<Option<f64>>> {
    let voltage = voltage.filter(|v| *v > 0.0)?;
    let resistance = resistance.filter(|r| *r > 0.0)?;
    let power = voltage * voltage / resistance;
    Some(tpm.iter().map(|v| v.map(|tpm| tpm / power)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_puffing_intervals() {
        let puffs = [Some(10.0), Some(20.0), Some(20.0), None, Some(50.0)];
        assert_eq!(puffing_intervals(&puffs), vec![10.0, 10.0, 20.0, 10.0, 50.0]);
    }

    #[test]
    fn test_first_interval_defaults() {
        assert_eq!(puffing_intervals(&[None, Some(30.0)]), vec![DEFAULT_PUFFS, 30.0]);
        assert!(puffing_intervals(&[]).is_empty());
    }

    #[test]
    fn test_tpm_from_weights() {
        let puffs = [Some(10.0), Some(20.0), Some(30.0)];
        let before = [Some(20.0), Some(19.9), None];
        let after = [Some(19.9), Some(19.85), Some(19.8)];

        let tpm = tpm_from_weights(&puffs, &before, &after);
        assert!(approx(tpm[0].unwrap(), 10.0));
        assert!(approx(tpm[1].unwrap(), 5.0));
        assert_eq!(tpm[2], None);
    }

    #[test]
    fn test_parse_regime() {
        let regime = PuffingRegime::parse("55mL/3s/30s").unwrap();
        assert_eq!(regime.volume_ml, 55.0);
        assert_eq!(regime.duration_s, 3.0);
        assert_eq!(regime.interval_s, 30.0);

        assert_eq!(puff_time_from_regime("Regime: 80ml/4.5s/20s"), Some(4.5));
        assert_eq!(puff_time_from_regime("standard"), None);
        assert!("nonsense".parse::<PuffingRegime>().is_err());
    }

    #[test]
    fn test_normalized_tpm() {
        let tpm = [Some(6.0), None];
        assert_eq!(normalized_tpm(&tpm, Some(2.0)), vec![Some(3.0), None]);
        assert_eq!(normalized_tpm(&tpm, None), vec![Some(2.0), None]);
        assert_eq!(normalized_tpm(&tpm, Some(0.0)), vec![Some(2.0), None]);
    }

    #[test]
    fn test_usage_efficiency() {
        let puffs = [Some(10.0), Some(20.0)];
        let tpm = [Some(5.0), Some(4.0)];
        // 5*10 + 4*10 = 90mg of 1000mg
        let efficiency = usage_efficiency(&puffs, &tpm, Some(1.0)).unwrap();
        assert!(approx(efficiency, 9.0));

        assert_eq!(usage_efficiency(&puffs, &tpm, None), None);
        assert_eq!(usage_efficiency(&puffs, &tpm, Some(0.0)), None);
        assert_eq!(usage_efficiency(&[], &tpm, Some(1.0)), None);
    }

    #[test]
    fn test_power_efficiency() {
        let tpm = [Some(8.0), None];
        // 4V across 2 ohms is 8W
        let efficiency = power_efficiency(&tpm, Some(4.0), Some(2.0)).unwrap();
        assert_eq!(efficiency, vec![Some(1.0), None]);

        assert_eq!(power_efficiency(&tpm, None, Some(2.0)), None);
        assert_eq!(power_efficiency(&tpm, Some(4.0), Some(0.0)), None);
    }
}
