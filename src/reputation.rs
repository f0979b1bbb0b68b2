//! Reputation display helpers
//!
//! Users carry a raw 0-100 trustability score. The map shows a 0-5
//! "karma" derived from it, with a badge colour and a lighter fill for the
//! comment card. Both colours come from the same tier so they never
//! disagree about which bucket a score is in.

use serde::Serialize;

pub const MAX_REPUTATION: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReputationTier {
    Red,
    Orange,
    Yellow,
    Lime,
    Green,
}

impl ReputationTier {
    /// Bucket a 0-5 score. Lower bounds are inclusive; anything out of
    /// range (or NaN) lands in the nearest end bucket.
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 4.0 => Self::Green,
            s if s >= 3.0 => Self::Lime,
            s if s >= 2.0 => Self::Yellow,
            s if s >= 1.0 => Self::Orange,
            _ => Self::Red,
        }
    }

    /// Badge foreground (Tailwind 500 shades)
    pub fn color(self) -> &'static str {
        match self {
            Self::Green => "#22C55E",
            Self::Lime => "#84CC16",
            Self::Yellow => "#EAB308",
            Self::Orange => "#F97316",
            Self::Red => "#EF4444",
        }
    }

    /// Card fill (Tailwind 100 shades)
    pub fn background_color(self) -> &'static str {
        match self {
            Self::Green => "#D1FAE5",
            Self::Lime => "#ECFCCB",
            Self::Yellow => "#FEF9C3",
            Self::Orange => "#FFEDD5",
            Self::Red => "#FEE2E2",
        }
    }
}

/// Scale a 0-100 trustability score onto the 0-5 reputation range.
pub fn normalize_reputation(trustability: f64) -> f64 {
    (trustability / 100.0 * MAX_REPUTATION).clamp(0.0, MAX_REPUTATION)
}

pub fn reputation_color(score: f64) -> &'static str {
    ReputationTier::from_score(score).color()
}

pub fn reputation_background_color(score: f64) -> &'static str {
    ReputationTier::from_score(score).background_color()
}

/// "4.2/5" style label shown beside a commenter's name
pub fn format_reputation(score: f64) -> String {
    format!("{:.1}/5", score)
}
