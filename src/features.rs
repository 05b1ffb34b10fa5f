// Feature engineering.
//
// Seven features per building, all in [0,1]. Five are pure per-row
// heuristics; `floor_count_norm` is batch-dependent (median imputation then
// min-max over the whole batch), so recomputing on a different subset moves
// every building's value. That per-batch semantics is intentional.
use crate::types::{Building, EnrichedBuilding};
use crate::util::{median, min_max_scale};

/// Usage categories that drive consumption up regardless of building age.
pub const HIGH_CONSUMPTION_USAGES: &[&str] = &[
    "PISCINE",
    "ARÉNA",
    "ARENA",
    "CENTRE SPORTIF",
    "BIBLIOTHÈQUE",
    "CASERNE",
    "HÔPITAL",
    "CENTRE COMMUNAUTAIRE",
];

/// Social vulnerability proxy per canonical borough, in [0.2, 0.9]. The two
/// slash-style spellings are legacy keys kept verbatim from the source data.
pub const VULNERABILITY_BY_BOROUGH: &[(&str, f64)] = &[
    ("MONTREAL-NORD", 0.9),
    ("MERCIER-HOCHELAGA-MAISONNEUVE", 0.8),
    ("VILLERAY-SAINT-MICHEL-PARC-EXTENSION", 0.8),
    ("RIVIERE-DES-PRAIRIES-POINTE-AUX-TREMBLES", 0.7),
    ("R-D-P / P-A-T", 0.7),
    ("ROSEMONT-PETITE-PATRIE", 0.6),
    ("PLATEAU-MONT-ROYAL", 0.4),
    ("AHUNTSIC-CARTIERVILLE", 0.6),
    ("SUD-OUEST", 0.7),
    ("SAINT-LEONARD", 0.6),
    ("LASALLE", 0.6),
    ("VERDUN", 0.6),
    ("LACHINE", 0.6),
    ("VILLE-MARIE", 0.5),
    ("COTE-DES-NEIGES-NOTRE-DAME-DE-GRACE", 0.7),
    ("COTE-DES-NEIGES / N-D-DE-GRACE", 0.7),
    ("OUTREMONT", 0.2),
    ("ANJOU", 0.5),
    ("SAINT-LAURENT", 0.6),
    ("ILE-BIZARD-SAINTE-GENEVIEVE", 0.3),
    ("PIERREFONDS-ROXBORO", 0.4),
];

/// The full feature vector for one building. Every field is populated after
/// `build_features`; missing inputs resolve to the documented defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub age_risk: f64,
    pub size_impact: f64,
    pub energy_risk: f64,
    pub climate_risk: f64,
    pub social_vulnerability: f64,
    pub floor_count_norm: f64,
    pub has_basement: f64,
}

impl FeatureVector {
    pub fn as_array(&self) -> [f64; 7] {
        [
            self.age_risk,
            self.size_impact,
            self.energy_risk,
            self.climate_risk,
            self.social_vulnerability,
            self.floor_count_norm,
            self.has_basement,
        ]
    }
}

/// Step-function age risk. Older buildings are less efficient and more
/// vulnerable; an unknown or zero construction year lands on 0.7.
pub fn age_risk(construction_year: Option<i32>, reference_year: i32) -> f64 {
    let year = match construction_year {
        Some(y) if y > 0 => y,
        _ => return 0.7,
    };
    let age = reference_year - year;
    if age < 10 {
        0.1
    } else if age < 30 {
        0.3
    } else if age < 50 {
        0.6
    } else if age < 75 {
        0.8
    } else {
        1.0
    }
}

/// Log-normalized footprint impact: `min(1, log10(area+1)/6)`. Unknown or
/// zero area is medium impact.
pub fn size_impact(area: Option<f64>) -> f64 {
    let area = match area {
        Some(a) if a > 0.0 => a,
        _ => return 0.5,
    };
    ((area + 1.0).log10() / 6.0).min(1.0)
}

fn usage_factor(usage: &str) -> f64 {
    let usage = usage.to_uppercase();
    if HIGH_CONSUMPTION_USAGES.iter().any(|k| usage.contains(k)) {
        0.8
    } else {
        0.3
    }
}

fn floor_factor(floors: f64) -> f64 {
    if floors > 10.0 {
        0.9
    } else if floors > 5.0 {
        0.7
    } else if floors > 2.0 {
        0.5
    } else {
        0.3
    }
}

/// Estimated energy consumption risk: unweighted mean over the factors whose
/// inputs are present. The age factor always contributes (its own unknown
/// default covers a missing year); size, usage and floor factors only count
/// when their field is set. The denominator is the number of contributing
/// factors, never a fixed 4.
pub fn energy_risk(building: &Building, reference_year: i32) -> f64 {
    let mut score = 0.0;
    let mut factors = 0usize;

    score += age_risk(building.construction_year, reference_year);
    factors += 1;

    if building.area.is_some() {
        score += size_impact(building.area);
        factors += 1;
    }
    if let Some(usage) = &building.usage {
        score += usage_factor(usage);
        factors += 1;
    }
    if let Some(floors) = building.floor_count {
        score += floor_factor(floors);
        factors += 1;
    }

    if factors > 0 {
        score / factors as f64
    } else {
        0.5
    }
}

/// Equal-weight blend of the two postal climate proxies.
pub fn climate_risk(flood_risk: f64, heat_risk: f64) -> f64 {
    flood_risk * 0.5 + heat_risk * 0.5
}

/// Borough-level deprivation proxy; unmatched boroughs are medium.
pub fn social_vulnerability(borough: Option<&str>) -> f64 {
    let Some(borough) = borough else {
        return 0.5;
    };
    VULNERABILITY_BY_BOROUGH
        .iter()
        .find(|(b, _)| *b == borough)
        .map(|(_, v)| *v)
        .unwrap_or(0.5)
}

/// Build the feature matrix for a batch. The two batch-wide steps (median
/// imputation of floor counts, min-max of the imputed column) run after all
/// per-row values are known.
pub fn build_features(batch: &[EnrichedBuilding], reference_year: i32) -> Vec<FeatureVector> {
    let known_floors: Vec<f64> = batch
        .iter()
        .filter_map(|eb| eb.building.floor_count)
        .collect();
    let floor_median = median(known_floors);

    let imputed_floors: Vec<f64> = batch
        .iter()
        .map(|eb| eb.building.floor_count.unwrap_or(floor_median))
        .collect();
    let floor_norm = min_max_scale(&imputed_floors, 1.0);

    batch
        .iter()
        .zip(floor_norm)
        .map(|(eb, floor_count_norm)| {
            let b = &eb.building;
            FeatureVector {
                age_risk: age_risk(b.construction_year, reference_year),
                size_impact: size_impact(b.area),
                energy_risk: energy_risk(b, reference_year),
                climate_risk: climate_risk(eb.postal_flood_risk, eb.postal_heat_risk),
                social_vulnerability: social_vulnerability(eb.borough.as_deref()),
                floor_count_norm,
                has_basement: if b.basement_area > 0.0 { 1.0 } else { 0.0 },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const YEAR: i32 = 2024;

    fn building(year: Option<i32>, area: Option<f64>, floors: Option<f64>) -> Building {
        Building {
            id: "B1".into(),
            name: "Test".into(),
            address: None,
            borough_raw: None,
            construction_year: year,
            area,
            floor_count: floors,
            basement_area: 0.0,
            usage: None,
        }
    }

    #[test]
    fn age_risk_is_monotonic_across_bands() {
        let bands = [
            age_risk(Some(YEAR - 5), YEAR),
            age_risk(Some(YEAR - 20), YEAR),
            age_risk(Some(YEAR - 40), YEAR),
            age_risk(Some(YEAR - 60), YEAR),
            age_risk(Some(YEAR - 100), YEAR),
        ];
        assert_eq!(bands, [0.1, 0.3, 0.6, 0.8, 1.0]);
        for pair in bands.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
    }

    #[test]
    fn age_risk_unknown_or_zero_year_is_medium_high() {
        assert_eq!(age_risk(None, YEAR), 0.7);
        assert_eq!(age_risk(Some(0), YEAR), 0.7);
    }

    #[test]
    fn size_impact_defaults_and_caps() {
        assert_eq!(size_impact(None), 0.5);
        assert_eq!(size_impact(Some(0.0)), 0.5);
        assert!(size_impact(Some(100.0)) < size_impact(Some(10_000.0)));
        assert_eq!(size_impact(Some(1_000_000.0)), 1.0);
        assert_eq!(size_impact(Some(5_000_000.0)), 1.0);
    }

    #[test]
    fn climate_risk_is_the_even_blend() {
        assert!((climate_risk(0.8, 0.6) - 0.70).abs() < 1e-12);
    }

    #[test]
    fn energy_risk_divides_by_present_factors_only() {
        // Only the age factor is available: unknown year -> 0.7 / 1.
        let b = building(None, None, None);
        assert!((energy_risk(&b, YEAR) - 0.7).abs() < 1e-12);

        // Age (unknown -> 0.7) plus a high-consumption usage (0.8): mean of 2.
        let mut b = building(None, None, None);
        b.usage = Some("Piscine intérieure".into());
        assert!((energy_risk(&b, YEAR) - 0.75).abs() < 1e-12);

        // All four factors present.
        let mut b = building(Some(YEAR - 60), Some(999_999.0), Some(12.0));
        b.usage = Some("Bureau".into());
        let expected = (0.8 + size_impact(Some(999_999.0)) + 0.3 + 0.9) / 4.0;
        assert!((energy_risk(&b, YEAR) - expected).abs() < 1e-12);
    }

    #[test]
    fn social_vulnerability_uses_canonical_borough() {
        assert_eq!(
            social_vulnerability(Some("COTE-DES-NEIGES-NOTRE-DAME-DE-GRACE")),
            0.7
        );
        assert_eq!(social_vulnerability(Some("OUTREMONT")), 0.2);
        assert_eq!(social_vulnerability(Some("WESTMOUNT")), 0.5);
        assert_eq!(social_vulnerability(None), 0.5);
    }

    fn enriched(year: Option<i32>, floors: Option<f64>, basement: f64) -> EnrichedBuilding {
        let mut b = building(year, Some(2_000.0), floors);
        b.basement_area = basement;
        EnrichedBuilding {
            building: b,
            postal_code: None,
            street_number: None,
            street_name: None,
            borough: Some("VERDUN".into()),
            postal_prefix: None,
            postal_flood_risk: 0.5,
            postal_heat_risk: 0.5,
            flood_zone_risk_score: 0.0,
            heat_island_risk_score: 0.0,
            location_fingerprint: "UNKNOWN".into(),
        }
    }

    #[test]
    fn all_features_stay_in_unit_interval() {
        let batch = vec![
            enriched(Some(1910), Some(2.0), 120.0),
            enriched(None, None, 0.0),
            enriched(Some(2020), Some(14.0), 0.0),
        ];
        for fv in build_features(&batch, YEAR) {
            for v in fv.as_array() {
                assert!((0.0..=1.0).contains(&v), "feature out of range: {}", v);
            }
        }
    }

    #[test]
    fn missing_floor_counts_take_the_batch_median() {
        let batch = vec![
            enriched(None, Some(2.0), 0.0),
            enriched(None, Some(10.0), 0.0),
            enriched(None, None, 0.0), // imputed with median 6 of {2, 10}
        ];
        let features = build_features(&batch, YEAR);
        // min-max over {2, 10, 6}: imputed row lands at 0.5.
        assert!((features[2].floor_count_norm - 0.5).abs() < 1e-12);
        assert_eq!(features[0].floor_count_norm, 0.0);
        assert_eq!(features[1].floor_count_norm, 1.0);
    }

    #[test]
    fn basement_flag_is_binary_on_amount() {
        let batch = vec![enriched(None, Some(1.0), 35.0), enriched(None, Some(1.0), 0.0)];
        let features = build_features(&batch, YEAR);
        assert_eq!(features[0].has_basement, 1.0);
        assert_eq!(features[1].has_basement, 0.0);
    }
}
