//! Health score aggregation.
//!
//! Detectors hand the aggregator a [`ScoreSignal`] each: a sub-score for one
//! weighted component, a flat penalty, or nothing. The aggregator never looks
//! at which detector produced a signal, so a new detector only has to emit
//! one.

use crate::config::{ScoreWeights, ScoringConfig};
use crate::utils::round_to;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Weighted components of the health score, in breakdown order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreComponent {
    Completeness,
    Uniqueness,
    Outliers,
    Imbalance,
    DateValidity,
}

impl ScoreComponent {
    pub const ALL: [ScoreComponent; 5] = [
        Self::Completeness,
        Self::Uniqueness,
        Self::Outliers,
        Self::Imbalance,
        Self::DateValidity,
    ];

    pub fn weight(&self, weights: &ScoreWeights) -> f64 {
        match self {
            Self::Completeness => weights.completeness,
            Self::Uniqueness => weights.uniqueness,
            Self::Outliers => weights.outliers,
            Self::Imbalance => weights.imbalance,
            Self::DateValidity => weights.date_validity,
        }
    }
}

/// What a detector contributes to the health score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreSignal {
    /// Sub-score (0 - 100) for one weighted component.
    SubScore {
        component: ScoreComponent,
        value: f64,
    },
    /// Points subtracted after weighting.
    Penalty(f64),
    /// The detector is informational only.
    None,
}

/// Qualitative band of a health score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthLabel {
    Excellent,
    Good,
    Fair,
    Poor,
    #[serde(rename = "Need Attention")]
    NeedAttention,
}

impl HealthLabel {
    pub fn from_score(score: u8) -> Self {
        if score >= 90 {
            Self::Excellent
        } else if score >= 75 {
            Self::Good
        } else if score >= 60 {
            Self::Fair
        } else if score >= 40 {
            Self::Poor
        } else {
            Self::NeedAttention
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::NeedAttention => "Need Attention",
        }
    }
}

impl fmt::Display for HealthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the health score was computed.
///
/// A component is `None` when its section is unavailable; its weight is then
/// spread over the remaining components, as shown in `weights`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub completeness: Option<f64>,
    pub uniqueness: Option<f64>,
    pub outliers: Option<f64>,
    pub imbalance: Option<f64>,
    pub date_validity: Option<f64>,
    pub type_penalty: f64,
    /// Effective weights used for this report.
    pub weights: ScoreWeights,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HealthScore {
    pub score: u8,
    pub label: HealthLabel,
    pub breakdown: ScoreBreakdown,
}

/// Combines detector signals into one 0 - 100 score.
pub struct HealthScoreAggregator;

impl HealthScoreAggregator {
    pub fn aggregate(signals: &[ScoreSignal], scoring: &ScoringConfig) -> HealthScore {
        let mut sub_scores: [Option<f64>; 5] = [None; 5];
        let mut penalty = 0.0;

        for signal in signals {
            match *signal {
                ScoreSignal::SubScore { component, value } => {
                    sub_scores[component as usize] = Some(value.clamp(0.0, 100.0));
                }
                ScoreSignal::Penalty(points) => penalty += points.max(0.0),
                ScoreSignal::None => {}
            }
        }

        let weights = effective_weights(&sub_scores, &scoring.weights);
        let weighted: f64 = ScoreComponent::ALL
            .iter()
            .zip(sub_scores.iter())
            .filter_map(|(component, score)| score.map(|s| component.weight(&weights) * s))
            .sum();

        let score = (weighted - penalty).round().clamp(0.0, 100.0) as u8;

        HealthScore {
            score,
            label: HealthLabel::from_score(score),
            breakdown: ScoreBreakdown {
                completeness: sub_scores[0].map(|s| round_to(s, 2)),
                uniqueness: sub_scores[1].map(|s| round_to(s, 2)),
                outliers: sub_scores[2].map(|s| round_to(s, 2)),
                imbalance: sub_scores[3].map(|s| round_to(s, 2)),
                date_validity: sub_scores[4].map(|s| round_to(s, 2)),
                type_penalty: penalty,
                weights,
            },
        }
    }
}

/// Configured weights when every component is present; otherwise the
/// weights of missing components are zeroed and the rest rescaled to sum
/// to 1.
fn effective_weights(sub_scores: &[Option<f64>; 5], configured: &ScoreWeights) -> ScoreWeights {
    if sub_scores.iter().all(Option::is_some) {
        return *configured;
    }

    let available: f64 = ScoreComponent::ALL
        .iter()
        .zip(sub_scores.iter())
        .filter(|(_, score)| score.is_some())
        .map(|(component, _)| component.weight(configured))
        .sum();

    let scaled = |index: usize, weight: f64| {
        if sub_scores[index].is_some() && available > 0.0 {
            weight / available
        } else {
            0.0
        }
    };

    ScoreWeights {
        completeness: scaled(0, configured.completeness),
        uniqueness: scaled(1, configured.uniqueness),
        outliers: scaled(2, configured.outliers),
        imbalance: scaled(3, configured.imbalance),
        date_validity: scaled(4, configured.date_validity),
    }
}
