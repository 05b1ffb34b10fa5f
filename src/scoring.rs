// Composite priority scoring.
//
// Weighted linear blend of four subscores plus a conditional bonus, then a
// batch-wide rescale to [0,100]. The published score is batch-dependent:
// adding or removing buildings changes every other building's value. That
// matches the per-run semantics of the exported tables.
use crate::features::FeatureVector;
use crate::util::min_max_scale;

pub const ENERGY_WEIGHT: f64 = 0.40;
pub const CLIMATE_WEIGHT: f64 = 0.30;
pub const SOCIAL_WEIGHT: f64 = 0.20;
pub const SIZE_WEIGHT: f64 = 0.10;

/// Flat bonus for old buildings in high climate risk areas. Applied before
/// rescaling, so raw scores can exceed 1.0.
pub const AGE_CLIMATE_BONUS: f64 = 0.15;

/// Average GES conversion factor, tonnes CO2 per year per 100 m² weighted by
/// the energy and age subscores.
const GES_CONVERSION_FACTOR: f64 = 2.5;
const AREA_FALLBACK: f64 = 1000.0;

/// Raw composite score: 40% energy, 30% climate, 20% social, 10% size, plus
/// the 0.15 bonus iff age_risk > 0.7 and climate_risk > 0.6.
pub fn raw_priority(fv: &FeatureVector) -> f64 {
    let mut score = fv.energy_risk * ENERGY_WEIGHT
        + fv.climate_risk * CLIMATE_WEIGHT
        + fv.social_vulnerability * SOCIAL_WEIGHT
        + fv.size_impact * SIZE_WEIGHT;
    if fv.age_risk > 0.7 && fv.climate_risk > 0.6 {
        score += AGE_CLIMATE_BONUS;
    }
    score
}

/// Batch scores rescaled to [0,100]: the batch maximum lands on 100 and the
/// minimum on 0 (a constant batch collapses to all zeros).
pub fn priority_scores(features: &[FeatureVector]) -> Vec<f64> {
    let raw: Vec<f64> = features.iter().map(raw_priority).collect();
    min_max_scale(&raw, 100.0)
}

/// Priority band of a rescaled score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityLevel {
    Low,      // [0, 40)
    Medium,   // [40, 60)
    High,     // [60, 80)
    Critical, // [80, 100]
}

impl PriorityLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            PriorityLevel::Critical
        } else if score >= 60.0 {
            PriorityLevel::High
        } else if score >= 40.0 {
            PriorityLevel::Medium
        } else {
            PriorityLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityLevel::Low => "Low",
            PriorityLevel::Medium => "Medium",
            PriorityLevel::High => "High",
            PriorityLevel::Critical => "Critical",
        }
    }
}

/// Estimated GES reduction potential in tonnes CO2/year:
/// `area/100 * energy_risk * age_risk * 2.5`, with a 1000 m² fallback for
/// buildings with no recorded area.
pub fn ges_reduction_potential(area: Option<f64>, energy_risk: f64, age_risk: f64) -> f64 {
    area.unwrap_or(AREA_FALLBACK) / 100.0 * energy_risk * age_risk * GES_CONVERSION_FACTOR
}
