use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Raw serde view of `batiments-municipaux.csv`. Everything is optional
/// text; the loader resolves the typed contract once, so downstream code
/// never re-checks which of the alternate columns was populated.
#[derive(Debug, Deserialize)]
pub struct RawBuildingRow {
    #[serde(rename = "buildingId")]
    pub building_id: Option<String>,
    #[serde(rename = "buildingName")]
    pub building_name: Option<String>,
    #[serde(rename = "address")]
    pub address: Option<String>,
    #[serde(rename = "boroughName")]
    pub borough_name: Option<String>,
    #[serde(rename = "buildingConstrYear")]
    pub building_constr_year: Option<String>,
    #[serde(rename = "buildingArea")]
    pub building_area: Option<String>,
    #[serde(rename = "builtArea")]
    pub built_area: Option<String>,
    #[serde(rename = "floorAmount")]
    pub floor_amount: Option<String>,
    #[serde(rename = "basementAmount")]
    pub basement_amount: Option<String>,
    #[serde(rename = "usageName")]
    pub usage_name: Option<String>,
}

/// Clean building record. Fields that the sources leave blank stay `None`
/// here; every numeric default lives in the feature heuristics, not in the
/// record itself.
#[derive(Debug, Clone)]
pub struct Building {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    /// Borough as it appears in the source file.
    pub borough_raw: Option<String>,
    pub construction_year: Option<i32>,
    /// Resolved once at ingestion: `buildingArea`, falling back to
    /// `builtArea` when the former is blank.
    pub area: Option<f64>,
    pub floor_count: Option<f64>,
    /// Missing basement amounts are treated as 0 (no basement).
    pub basement_area: f64,
    pub usage: Option<String>,
}

/// Building plus everything the enrichment stage derives for it.
#[derive(Debug, Clone)]
pub struct EnrichedBuilding {
    pub building: Building,
    pub postal_code: Option<String>,
    pub street_number: Option<String>,
    pub street_name: Option<String>,
    /// Canonical borough, resolved once here so scoring and the social
    /// vulnerability lookup agree on the same name.
    pub borough: Option<String>,
    pub postal_prefix: Option<String>,
    pub postal_flood_risk: f64,
    pub postal_heat_risk: f64,
    /// Borough-count proximity proxies from the flood/heat tables;
    /// 0.0 when the source table has no borough column or no match.
    pub flood_zone_risk_score: f64,
    pub heat_island_risk_score: f64,
    pub location_fingerprint: String,
}

/// Flat CSV row for `output_buildings_enriched.csv`. Also deserializable so
/// the prioritize stage can start from the file when no in-process batch is
/// cached.
#[derive(Debug, Serialize, Deserialize)]
pub struct EnrichedRow {
    #[serde(rename = "buildingId")]
    pub building_id: String,
    #[serde(rename = "buildingName")]
    pub building_name: String,
    #[serde(rename = "address")]
    pub address: Option<String>,
    #[serde(rename = "boroughName")]
    pub borough_name: Option<String>,
    #[serde(rename = "borough")]
    pub borough: Option<String>,
    #[serde(rename = "buildingConstrYear")]
    pub building_constr_year: Option<i32>,
    #[serde(rename = "buildingArea")]
    pub building_area: Option<f64>,
    #[serde(rename = "floorAmount")]
    pub floor_amount: Option<f64>,
    #[serde(rename = "basementAmount")]
    pub basement_amount: f64,
    #[serde(rename = "usageName")]
    pub usage_name: Option<String>,
    pub postal_code: Option<String>,
    pub street_number: Option<String>,
    pub street_name: Option<String>,
    pub postal_prefix: Option<String>,
    pub postal_flood_risk: f64,
    pub postal_heat_risk: f64,
    pub flood_zone_risk_score: f64,
    pub heat_island_risk_score: f64,
    pub location_fingerprint: String,
}

/// Flat CSV row for `output_buildings_prioritized.csv` and the top-100
/// variant: every enriched column plus the scoring outputs.
#[derive(Debug, Serialize)]
pub struct PrioritizedRow {
    #[serde(rename = "buildingId")]
    pub building_id: String,
    #[serde(rename = "buildingName")]
    pub building_name: String,
    #[serde(rename = "address")]
    pub address: Option<String>,
    #[serde(rename = "boroughName")]
    pub borough_name: Option<String>,
    #[serde(rename = "borough")]
    pub borough: Option<String>,
    #[serde(rename = "buildingConstrYear")]
    pub building_constr_year: Option<i32>,
    #[serde(rename = "buildingArea")]
    pub building_area: Option<f64>,
    #[serde(rename = "floorAmount")]
    pub floor_amount: Option<f64>,
    #[serde(rename = "basementAmount")]
    pub basement_amount: f64,
    #[serde(rename = "usageName")]
    pub usage_name: Option<String>,
    pub postal_code: Option<String>,
    pub street_number: Option<String>,
    pub street_name: Option<String>,
    pub postal_prefix: Option<String>,
    pub postal_flood_risk: f64,
    pub postal_heat_risk: f64,
    pub flood_zone_risk_score: f64,
    pub heat_island_risk_score: f64,
    pub location_fingerprint: String,
    pub priority_score: f64,
    pub priority_level: String,
    pub risk_cluster: usize,
    pub score_age_risk: f64,
    pub score_size_impact: f64,
    pub score_energy_risk: f64,
    pub score_climate_risk: f64,
    pub score_social_vulnerability: f64,
    pub score_floor_count_norm: f64,
    pub score_has_basement: f64,
    pub estimated_ges_reduction_potential: f64,
    pub recommendations: String,
}

/// Console preview row for the top-priority table.
#[derive(Debug, Tabled, Clone)]
pub struct TopBuildingRow {
    #[tabled(rename = "Building")]
    pub name: String,
    #[tabled(rename = "Borough")]
    pub borough: String,
    #[tabled(rename = "Score")]
    pub score: String,
    #[tabled(rename = "Level")]
    pub level: String,
    #[tabled(rename = "Energy")]
    pub energy: String,
    #[tabled(rename = "Climate")]
    pub climate: String,
    #[tabled(rename = "Social")]
    pub social: String,
    #[tabled(rename = "GES t/yr")]
    pub ges: String,
}

/// Console preview row for per-cluster standardized feature means.
#[derive(Debug, Tabled, Clone)]
pub struct ClusterProfileRow {
    #[tabled(rename = "Cluster")]
    pub cluster: usize,
    #[tabled(rename = "N")]
    pub count: usize,
    #[tabled(rename = "Age")]
    pub age_risk: String,
    #[tabled(rename = "Size")]
    pub size_impact: String,
    #[tabled(rename = "Energy")]
    pub energy_risk: String,
    #[tabled(rename = "Climate")]
    pub climate_risk: String,
    #[tabled(rename = "Social")]
    pub social_vulnerability: String,
    #[tabled(rename = "Floors")]
    pub floor_count_norm: String,
    #[tabled(rename = "Basement")]
    pub has_basement: String,
}

/// Run summary written to `summary.json`.
#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub total_buildings: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub total_ges_reduction_potential: f64,
    pub top_100_ges_reduction_potential: f64,
    pub vulnerable_high_priority_count: usize,
    pub vulnerable_high_priority_ges: f64,
    pub generated_at: String,
}
