//! Heuristic scorer — nudges close/upsell/risk percentages from yard-condition prose.
//!
//! The input is free text, usually the vision model's description of a yard photo.
//! Three regex cue categories fire at most once each:
//!
//! | Category     | Effect                                   |
//! |--------------|------------------------------------------|
//! | cleanliness  | close +15 (strong cues: +20 instead)     |
//! | degradation  | risk +25, close −10                      |
//! | upsell       | upsell +25                               |
//!
//! Results are clamped: close ∈ [5, 98], upsell ∈ [5, 98], risk ∈ [3, 95].

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const BASE_CLOSE: i32 = 60;
pub const BASE_UPSELL: i32 = 45;
pub const BASE_RISK: i32 = 30;

const CLOSE_RANGE: (i32, i32) = (5, 98);
const UPSELL_RANGE: (i32, i32) = (5, 98);
const RISK_RANGE: (i32, i32) = (3, 95);

const CLEAN_CLOSE_DELTA: i32 = 15;
const STRONG_CLEAN_CLOSE_DELTA: i32 = 20;
const DEGRADATION_RISK_DELTA: i32 = 25;
const DEGRADATION_CLOSE_DELTA: i32 = -10;
const UPSELL_DELTA: i32 = 25;

static STRONG_CLEAN_CUES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(pristine|immaculate|manicured|spotless)\b").expect("valid regex")
});

static CLEAN_CUES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(clean|tidy|neat|well[- ]kept|well[- ]maintained|healthy|mowed|trimmed)\b")
        .expect("valid regex")
});

static DEGRADATION_CUES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(overgrown|weeds?|weedy|dead|bare|patchy|neglected|debris|erosion|damaged|brown)\b",
    )
    .expect("valid regex")
});

static UPSELL_CUES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(mulch|edging|flower ?beds?|hedges?|shrubs?|aeration|overseed(?:ing)?|landscap(?:e|ing)|cleanup|leaves)\b",
    )
    .expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cleanliness {
    None,
    Clean,
    Pristine,
}

/// Which cue categories fired for a piece of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cues {
    pub cleanliness: Cleanliness,
    pub degradation: bool,
    pub upsell: bool,
}

/// Bounded percentage scores reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scores {
    pub close_pct: u8,
    pub upsell_pct: u8,
    pub risk_pct: u8,
}

impl Default for Scores {
    fn default() -> Self {
        Self {
            close_pct: BASE_CLOSE as u8,
            upsell_pct: BASE_UPSELL as u8,
            risk_pct: BASE_RISK as u8,
        }
    }
}

pub fn detect_cues(text: &str) -> Cues {
    let cleanliness = if STRONG_CLEAN_CUES.is_match(text) {
        Cleanliness::Pristine
    } else if CLEAN_CUES.is_match(text) {
        Cleanliness::Clean
    } else {
        Cleanliness::None
    };

    Cues {
        cleanliness,
        degradation: DEGRADATION_CUES.is_match(text),
        upsell: UPSELL_CUES.is_match(text),
    }
}

/// Applies the fixed cue deltas to the base scores and clamps the result.
pub fn apply_cues(cues: &Cues) -> Scores {
    let mut close = BASE_CLOSE;
    let mut upsell = BASE_UPSELL;
    let mut risk = BASE_RISK;

    match cues.cleanliness {
        Cleanliness::Pristine => close += STRONG_CLEAN_CLOSE_DELTA,
        Cleanliness::Clean => close += CLEAN_CLOSE_DELTA,
        Cleanliness::None => {}
    }

    if cues.degradation {
        risk += DEGRADATION_RISK_DELTA;
        close += DEGRADATION_CLOSE_DELTA;
    }

    if cues.upsell {
        upsell += UPSELL_DELTA;
    }

    Scores {
        close_pct: clamp_pct(close, CLOSE_RANGE),
        upsell_pct: clamp_pct(upsell, UPSELL_RANGE),
        risk_pct: clamp_pct(risk, RISK_RANGE),
    }
}

/// Convenience: `apply_cues(&detect_cues(text))`.
pub fn score_summary(text: &str) -> Scores {
    apply_cues(&detect_cues(text))
}

fn clamp_pct(value: i32, (lo, hi): (i32, i32)) -> u8 {
    value.clamp(lo, hi) as u8
}
