// Intervention recommendations.
//
// An explicit ordered rule list, evaluated in a fixed sequence so the output
// text is reproducible run to run. The banner depends on the final rescaled
// priority score and is prepended, not appended.
use crate::features::FeatureVector;

pub const SEPARATOR: &str = " | ";
pub const DEFAULT_RECOMMENDATION: &str = "Suivi régulier";

const INSULATION: &str = "Isolation thermique et remplacement des fenêtres";
const HEATING_UPGRADE: &str = "Mise à niveau du système de chauffage";
const ENERGY_AUDIT: &str = "Audit énergétique complet";
const SOLAR_PANELS: &str = "Installation de panneaux solaires si possible";
const FLOOD_PROTECTION: &str = "Mesures de protection contre les inondations";
const BASEMENT_WATERPROOFING: &str = "Imperméabilisation du sous-sol";
const GREEN_ROOF: &str = "Installation de toits verts ou toits blancs";
const PERIMETER_VEGETATION: &str = "Augmentation de la végétation périmétrique";
const EFFICIENT_COOLING: &str = "Système de climatisation efficace";
const SOCIAL_PRIORITY: &str = "PRIORITÉ SOCIALE - Financement public recommandé";

const BANNER_URGENT: &str = "⚠️ HAUTE PRIORITÉ - Intervention urgente recommandée";
const BANNER_MEDIUM_HIGH: &str = "⚡ PRIORITÉ MOYENNE-HAUTE";
const BANNER_MEDIUM: &str = "📋 PRIORITÉ MOYENNE";

/// Generate the recommendation text for one building.
///
/// `postal_flood_risk`/`postal_heat_risk` branch the climate rule further
/// than the blended `climate_risk` subscore can; `priority_score` is the
/// rescaled 0-100 value.
pub fn recommendations(
    fv: &FeatureVector,
    postal_flood_risk: f64,
    postal_heat_risk: f64,
    priority_score: f64,
) -> String {
    let mut texts: Vec<&'static str> = Vec::new();

    // Energy efficiency
    if fv.age_risk > 0.6 {
        texts.push(INSULATION);
        texts.push(HEATING_UPGRADE);
    }
    if fv.energy_risk > 0.7 {
        texts.push(ENERGY_AUDIT);
        texts.push(SOLAR_PANELS);
    }

    // Climate adaptation
    if fv.climate_risk > 0.6 {
        if postal_flood_risk > 0.6 {
            texts.push(FLOOD_PROTECTION);
            if fv.has_basement == 1.0 {
                texts.push(BASEMENT_WATERPROOFING);
            }
        }
        if postal_heat_risk > 0.6 {
            texts.push(GREEN_ROOF);
            texts.push(PERIMETER_VEGETATION);
            texts.push(EFFICIENT_COOLING);
        }
    }

    // Social priority
    if fv.social_vulnerability > 0.7 {
        texts.push(SOCIAL_PRIORITY);
    }

    if priority_score > 80.0 {
        texts.insert(0, BANNER_URGENT);
    } else if priority_score > 60.0 {
        texts.insert(0, BANNER_MEDIUM_HIGH);
    } else if priority_score > 40.0 {
        texts.insert(0, BANNER_MEDIUM);
    }

    if texts.is_empty() {
        DEFAULT_RECOMMENDATION.to_string()
    } else {
        texts.join(SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fv(age: f64, energy: f64, climate: f64, social: f64, basement: f64) -> FeatureVector {
        FeatureVector {
            age_risk: age,
            size_impact: 0.5,
            energy_risk: energy,
            climate_risk: climate,
            social_vulnerability: social,
            floor_count_norm: 0.0,
            has_basement: basement,
        }
    }

    #[test]
    fn high_risk_profile_fires_rules_in_fixed_order() {
        let text = recommendations(&fv(0.8, 0.75, 0.65, 0.75, 1.0), 0.7, 0.5, 85.0);
        let expected_order = [
            BANNER_URGENT,
            INSULATION,
            HEATING_UPGRADE,
            ENERGY_AUDIT,
            FLOOD_PROTECTION,
            BASEMENT_WATERPROOFING,
            SOCIAL_PRIORITY,
        ];
        let mut last = 0;
        for part in expected_order {
            let pos = text[last..]
                .find(part)
                .unwrap_or_else(|| panic!("missing or out of order: {}", part));
            last += pos + part.len();
        }
    }

    #[test]
    fn heat_branch_adds_cooling_measures() {
        let text = recommendations(&fv(0.0, 0.0, 0.7, 0.0, 0.0), 0.3, 0.9, 10.0);
        assert!(text.contains(GREEN_ROOF));
        assert!(text.contains(PERIMETER_VEGETATION));
        assert!(text.contains(EFFICIENT_COOLING));
        assert!(!text.contains(FLOOD_PROTECTION));
    }

    #[test]
    fn basement_waterproofing_needs_flood_and_basement() {
        let with = recommendations(&fv(0.0, 0.0, 0.7, 0.0, 1.0), 0.8, 0.0, 10.0);
        assert!(with.contains(BASEMENT_WATERPROOFING));
        let without = recommendations(&fv(0.0, 0.0, 0.7, 0.0, 0.0), 0.8, 0.0, 10.0);
        assert!(!without.contains(BASEMENT_WATERPROOFING));
    }

    #[test]
    fn quiet_profile_gets_routine_monitoring() {
        let text = recommendations(&fv(0.1, 0.2, 0.3, 0.2, 0.0), 0.3, 0.3, 10.0);
        assert_eq!(text, DEFAULT_RECOMMENDATION);
    }

    #[test]
    fn banner_alone_survives_when_only_the_score_is_high() {
        // No subscore rule fires, but the batch placed this building high.
        let text = recommendations(&fv(0.1, 0.2, 0.3, 0.2, 0.0), 0.3, 0.3, 65.0);
        assert_eq!(text, BANNER_MEDIUM_HIGH);
    }

    #[test]
    fn banner_is_prepended_not_appended() {
        let text = recommendations(&fv(0.8, 0.0, 0.0, 0.0, 0.0), 0.0, 0.0, 45.0);
        assert!(text.starts_with(BANNER_MEDIUM));
        assert!(text.ends_with(HEATING_UPGRADE));
    }
}
