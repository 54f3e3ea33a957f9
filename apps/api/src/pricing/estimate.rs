//! Price formula — closed-form banding for a single yard job.
//!
//! core   = sqft × base_rate × complexity × risk_mult × admin_multiplier
//! target = max(round5(core), minimum_charge)
//! low    = round5(target × (1 − band_low_pct))
//! high   = round5(target × (1 + band_high_pct))
//!
//! Pure and deterministic: no I/O, no clock, no randomness.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Price increase per risk point (risk 30 → ×1.12).
const RISK_MULT_PER_POINT: f64 = 0.004;

// ────────────────────────────────────────────────────────────────────────────
// Job types and complexity
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    Mowing,
    Mulch,
    Cleanup,
    Leaves,
    Hedges,
    Aeration,
    General,
}

impl JobType {
    pub const ALL: [JobType; 7] = [
        JobType::Mowing,
        JobType::Mulch,
        JobType::Cleanup,
        JobType::Leaves,
        JobType::Hedges,
        JobType::Aeration,
        JobType::General,
    ];

    /// Dollars per square foot.
    pub fn base_rate(self) -> f64 {
        match self {
            JobType::Mowing => 0.01,
            JobType::Mulch => 0.75,
            JobType::Cleanup => 0.15,
            JobType::Leaves => 0.05,
            JobType::Hedges => 0.30,
            JobType::Aeration => 0.02,
            JobType::General => 0.10,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobType::Mowing => "mowing",
            JobType::Mulch => "mulch",
            JobType::Cleanup => "cleanup",
            JobType::Leaves => "leaves",
            JobType::Hedges => "hedges",
            JobType::Aeration => "aeration",
            JobType::General => "general",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobType {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_lowercase().replace(['-', '_'], " ");
        let job = match normalized.as_str() {
            "mowing" | "mow" | "lawn" => JobType::Mowing,
            "mulch" | "mulching" => JobType::Mulch,
            "cleanup" | "clean up" | "yard cleanup" | "spring cleanup" => JobType::Cleanup,
            "leaves" | "leaf" => JobType::Leaves,
            "hedges" | "hedge" | "trimming" => JobType::Hedges,
            "aeration" => JobType::Aeration,
            "general" => JobType::General,
            _ => {
                let known: Vec<&str> = JobType::ALL.iter().map(|j| j.as_str()).collect();
                return Err(AppError::Validation(format!(
                    "Unknown job type '{}'. Expected one of: {}",
                    raw.trim(),
                    known.join(", ")
                )));
            }
        };
        Ok(job)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Easy,
    #[default]
    Normal,
    Hard,
    Extreme,
}

impl Complexity {
    /// Absent or blank input means `Normal`.
    pub fn from_optional(value: Option<&str>) -> Result<Self, AppError> {
        value
            .map(str::parse::<Complexity>)
            .transpose()
            .map(Option::unwrap_or_default)
    }

    pub fn multiplier(self) -> f64 {
        match self {
            Complexity::Easy => 0.9,
            Complexity::Normal => 1.0,
            Complexity::Hard => 1.25,
            Complexity::Extreme => 1.5,
        }
    }
}

impl FromStr for Complexity {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "easy" | "simple" => Ok(Complexity::Easy),
            "normal" | "standard" | "" => Ok(Complexity::Normal),
            "hard" | "difficult" => Ok(Complexity::Hard),
            "extreme" => Ok(Complexity::Extreme),
            other => Err(AppError::Validation(format!(
                "Unknown complexity '{other}'. Expected easy, normal, hard or extreme"
            ))),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Admin configuration
// ────────────────────────────────────────────────────────────────────────────

/// Operator-level pricing knobs. Read-only once the server has started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminConfig {
    pub admin_multiplier: f64,
    pub band_low_pct: f64,
    pub band_high_pct: f64,
    /// Floor applied to the target; keep it a multiple of 5.
    pub minimum_charge: u32,
    /// Share of the target offered as an add-on at 100% upsell likelihood.
    pub upsell_share: f64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            admin_multiplier: 1.0,
            band_low_pct: 0.15,
            band_high_pct: 0.20,
            minimum_charge: 45,
            upsell_share: 0.25,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Formula
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceInput {
    pub sqft: f64,
    pub job_type: JobType,
    pub complexity: Complexity,
    pub risk_level: f64,
    pub upsell_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBand {
    pub low: u32,
    pub target: u32,
    pub high: u32,
    pub upsell_add_on: u32,
}

/// The individual factors that produced a band, echoed back for transparency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Multipliers {
    pub base_rate: f64,
    pub complexity: f64,
    pub risk: f64,
    pub admin: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceEstimate {
    pub band: PriceBand,
    pub core_price: f64,
    pub multipliers: Multipliers,
}

/// Square footage must be finite and positive.
pub fn validate_sqft(sqft: f64) -> Result<f64, AppError> {
    if sqft.is_finite() && sqft > 0.0 {
        Ok(sqft)
    } else {
        Err(AppError::Validation(
            "sqft must be a positive number".to_string(),
        ))
    }
}

/// Computes the price band. Rejects non-finite or non-positive square footage.
pub fn estimate_price(input: &PriceInput, admin: &AdminConfig) -> Result<PriceEstimate, AppError> {
    validate_sqft(input.sqft)?;

    let risk_level = clamp_score(input.risk_level);
    let upsell_score = clamp_score(input.upsell_score);

    let multipliers = Multipliers {
        base_rate: input.job_type.base_rate(),
        complexity: input.complexity.multiplier(),
        risk: 1.0 + risk_level * RISK_MULT_PER_POINT,
        admin: admin.admin_multiplier,
    };

    let core_price = input.sqft
        * multipliers.base_rate
        * multipliers.complexity
        * multipliers.risk
        * multipliers.admin;

    let target = round_to_nearest_5(core_price).max(admin.minimum_charge);
    let target_f = f64::from(target);

    let band = PriceBand {
        low: round_to_nearest_5(target_f * (1.0 - admin.band_low_pct)),
        target,
        high: round_to_nearest_5(target_f * (1.0 + admin.band_high_pct)),
        upsell_add_on: round_to_nearest_5(target_f * (upsell_score / 100.0) * admin.upsell_share),
    };

    Ok(PriceEstimate {
        band,
        core_price,
        multipliers,
    })
}

/// Rounds half away from zero to the nearest multiple of 5. Negative input floors at 0.
pub fn round_to_nearest_5(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let steps = (value / 5.0).round();
    (steps * 5.0).min(f64::from(u32::MAX)) as u32
}

/// Non-finite scores fall back to 0; everything else lands in [0, 100].
fn clamp_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(sqft: f64, job_type: JobType, complexity: Complexity) -> PriceInput {
        PriceInput {
            sqft,
            job_type,
            complexity,
            risk_level: 30.0,
            upsell_score: 40.0,
        }
    }

    #[test]
    fn test_worked_example_mulch_1000_sqft() {
        let estimate = estimate_price(
            &input(1000.0, JobType::Mulch, Complexity::Normal),
            &AdminConfig::default(),
        )
        .unwrap();

        // 1000 × 0.75 × 1.0 × 1.12 × 1.0 = 840
        assert_eq!(estimate.band.target, 840);
        assert_eq!(estimate.band.low, 715);
        assert_eq!(estimate.band.high, 1010);
        assert_eq!(estimate.band.upsell_add_on, 85);
        assert!((estimate.multipliers.risk - 1.12).abs() < 1e-9);
    }

    #[test]
    fn test_band_is_ordered_and_target_multiple_of_5() {
        let admin = AdminConfig::default();
        for job in JobType::ALL {
            for complexity in [
                Complexity::Easy,
                Complexity::Normal,
                Complexity::Hard,
                Complexity::Extreme,
            ] {
                for sqft in [1.0, 137.0, 850.5, 4321.0, 20000.0] {
                    for risk in [0.0, 30.0, 77.0, 100.0] {
                        let i = PriceInput {
                            sqft,
                            job_type: job,
                            complexity,
                            risk_level: risk,
                            upsell_score: 45.0,
                        };
                        let band = estimate_price(&i, &admin).unwrap().band;
                        assert!(band.low <= band.target, "{i:?} -> {band:?}");
                        assert!(band.target <= band.high, "{i:?} -> {band:?}");
                        assert_eq!(band.target % 5, 0, "{i:?} -> {band:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_minimum_charge_applies_to_tiny_jobs() {
        let estimate = estimate_price(
            &input(100.0, JobType::Mowing, Complexity::Normal),
            &AdminConfig::default(),
        )
        .unwrap();
        assert_eq!(estimate.band.target, 45);
        assert!(estimate.core_price < 45.0);
    }

    #[test]
    fn test_admin_multiplier_scales_target() {
        let admin = AdminConfig {
            admin_multiplier: 1.5,
            ..AdminConfig::default()
        };
        let estimate =
            estimate_price(&input(1000.0, JobType::Mulch, Complexity::Normal), &admin).unwrap();
        assert_eq!(estimate.band.target, 1260);
    }

    #[test]
    fn test_complexity_raises_price() {
        let admin = AdminConfig::default();
        let normal =
            estimate_price(&input(2000.0, JobType::Cleanup, Complexity::Normal), &admin).unwrap();
        let extreme =
            estimate_price(&input(2000.0, JobType::Cleanup, Complexity::Extreme), &admin).unwrap();
        assert!(extreme.band.target > normal.band.target);
    }

    #[test]
    fn test_out_of_range_scores_are_clamped() {
        let admin = AdminConfig::default();
        let mut i = input(1000.0, JobType::Mulch, Complexity::Normal);
        i.risk_level = 500.0;
        i.upsell_score = -20.0;
        let estimate = estimate_price(&i, &admin).unwrap();
        assert!((estimate.multipliers.risk - 1.4).abs() < 1e-9);
        assert_eq!(estimate.band.upsell_add_on, 0);
    }

    #[test]
    fn test_rejects_non_positive_sqft() {
        let admin = AdminConfig::default();
        for sqft in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let result = estimate_price(&input(sqft, JobType::Mulch, Complexity::Normal), &admin);
            assert!(
                matches!(result, Err(AppError::Validation(_))),
                "sqft {sqft} should be rejected"
            );
        }
    }

    #[test]
    fn test_round_to_nearest_5() {
        assert_eq!(round_to_nearest_5(0.0), 0);
        assert_eq!(round_to_nearest_5(2.4), 0);
        assert_eq!(round_to_nearest_5(2.5), 5);
        assert_eq!(round_to_nearest_5(714.0), 715);
        assert_eq!(round_to_nearest_5(1008.0), 1010);
        assert_eq!(round_to_nearest_5(-3.0), 0);
    }

    #[test]
    fn test_job_type_parsing_accepts_aliases() {
        assert_eq!("Mulch".parse::<JobType>().unwrap(), JobType::Mulch);
        assert_eq!("lawn".parse::<JobType>().unwrap(), JobType::Mowing);
        assert_eq!("spring-cleanup".parse::<JobType>().unwrap(), JobType::Cleanup);
        assert_eq!(" hedge ".parse::<JobType>().unwrap(), JobType::Hedges);
    }

    #[test]
    fn test_unknown_job_type_lists_known_types() {
        let err = "pool cleaning".parse::<JobType>().unwrap_err();
        match err {
            AppError::Validation(msg) => {
                assert!(msg.contains("pool cleaning"));
                assert!(msg.contains("mulch"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_complexity_parsing() {
        assert_eq!("HARD".parse::<Complexity>().unwrap(), Complexity::Hard);
        assert_eq!("".parse::<Complexity>().unwrap(), Complexity::Normal);
        assert!("brutal".parse::<Complexity>().is_err());
        assert_eq!(Complexity::from_optional(None).unwrap(), Complexity::Normal);
        assert_eq!(
            Complexity::from_optional(Some("easy")).unwrap(),
            Complexity::Easy
        );
    }
}
