use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Standard proportions, in lookup order. Ties resolve to the earlier entry.
pub const STANDARD_RATIOS: &[(&str, f64)] = &[
    ("1:1", 1.0),
    ("5:4", 1.25),
    ("4:3", 1.333),
    ("3:2", 1.5),
    ("16:10", 1.6),
    ("16:9", 1.778),
    ("2:1", 2.0),
    // portrait
    ("4:5", 0.8),
    ("3:4", 0.75),
    ("2:3", 0.667),
    ("10:16", 0.625),
    ("9:16", 0.5625),
    ("1:2", 0.5),
];

/// Reduced `w:h` pairs that have a more familiar display name.
const REDUCED_LABELS: &[(&str, &str)] = &[
    ("8:5", "16:10"),
    ("5:8", "10:16"),
    ("64:27", "21:9"),
    ("27:64", "9:21"),
    ("43:18", "21:9"),
    ("256:135", "17:9"),
];

/// Returns the label of the standard ratio closest to `width / height`.
///
/// A zero height produces an infinite (or NaN) ratio; the lookup still
/// returns a label rather than failing.
pub fn closest_standard_ratio(width: u32, height: u32) -> &'static str {
    let actual = width as f64 / height as f64;

    let mut best = STANDARD_RATIOS[0];
    let mut best_diff = (best.1 - actual).abs();
    for &(label, value) in &STANDARD_RATIOS[1..] {
        let diff = (value - actual).abs();
        if diff < best_diff {
            best = (label, value);
            best_diff = diff;
        }
    }
    best.0
}

/// Reduces `width:height` by their GCD and maps well-known results to a label.
pub fn reduced_ratio(width: u32, height: u32) -> String {
    let divisor = gcd(width, height).max(1);
    let reduced = format!("{}:{}", width / divisor, height / divisor);

    REDUCED_LABELS
        .iter()
        .find(|(key, _)| *key == reduced)
        .map(|(_, label)| (*label).to_string())
        .unwrap_or(reduced)
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// How the `ratio` label of a record is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioStrategy {
    /// Nearest entry of [`STANDARD_RATIOS`]
    #[default]
    Nearest,
    /// GCD-reduced ratio with a small label table
    Reduced,
}

impl RatioStrategy {
    pub fn classify(&self, width: u32, height: u32) -> String {
        match self {
            RatioStrategy::Nearest => closest_standard_ratio(width, height).to_string(),
            RatioStrategy::Reduced => reduced_ratio(width, height),
        }
    }
}

impl FromStr for RatioStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" => Ok(RatioStrategy::Nearest),
            "reduced" | "gcd" => Ok(RatioStrategy::Reduced),
            other => Err(format!("unknown ratio strategy '{}'", other)),
        }
    }
}
