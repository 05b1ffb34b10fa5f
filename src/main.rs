// Entry point and high-level CLI flow.
//
// The pipeline has three stages, runnable one at a time or end to end:
// - Option [1] explores the five source datasets and prints diagnostics.
// - Option [2] enriches the buildings table (addresses, boroughs, postal
//   risk, fingerprints) and exports the enriched CSV.
// - Option [3] scores, clusters and annotates the enriched batch and
//   exports the prioritized tables plus a JSON summary.
// - Option [4] runs all three in order, aborting on the first failure.
mod address;
mod borough;
mod cluster;
mod enrich;
mod explore;
mod features;
mod loader;
mod output;
mod postal;
mod recommend;
mod scoring;
mod types;
mod util;

use chrono::{Datelike, Utc};
use once_cell::sync::Lazy;
use scoring::PriorityLevel;
use std::cmp::Ordering;
use std::error::Error;
use std::io::{self, Write};
use std::sync::Mutex;
use types::{ClusterProfileRow, EnrichedBuilding, PrioritizedRow, SummaryStats, TopBuildingRow};
use util::{format_int, format_number};

pub const ENRICHED_FILE: &str = "output_buildings_enriched.csv";
pub const PRIORITIZED_FILE: &str = "output_buildings_prioritized.csv";
pub const TOP_100_FILE: &str = "output_top_100_priorities.csv";
pub const SUMMARY_FILE: &str = "summary.json";

// Simple in-memory app state so the enriched batch survives between menu
// choices; the prioritize stage falls back to the exported CSV when a run
// starts cold.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { enriched: None }));

struct AppState {
    enriched: Option<Vec<EnrichedBuilding>>,
}

/// Read a single line of input after printing the common "Enter choice:"
/// prompt.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Handle option [1]: dataset exploration. Diagnostic only; failing sources
/// are reported as empty, never fatal.
fn handle_explore() {
    explore::run();
}

/// Handle option [2]: enrich the buildings table and export it.
fn handle_enrich() -> Result<(), Box<dyn Error>> {
    let (buildings, report) = loader::load_buildings(loader::BUILDINGS_FILE)?;
    println!(
        "Processing buildings... ({} rows loaded, {} kept)",
        format_int(report.total_rows as i64),
        format_int(report.kept_rows as i64)
    );
    if report.parse_errors > 0 {
        println!(
            "Note: {} rows skipped due to parse errors.",
            format_int(report.parse_errors as i64)
        );
    }
    if buildings.is_empty() {
        return Err("buildings table is empty, nothing to enrich".into());
    }

    let flood = loader::load_flood();
    let heat = loader::load_heat();
    let enriched = enrich::enrich_buildings(&buildings, &flood, &heat);

    let with_postal = enriched.iter().filter(|e| e.postal_code.is_some()).count();
    println!(
        "Postal code extracted for {} of {} buildings.",
        format_int(with_postal as i64),
        format_int(enriched.len() as i64)
    );

    let rows = enrich::to_rows(&enriched);
    output::write_csv(ENRICHED_FILE, &rows)?;
    println!("Saved enriched buildings to {}\n", ENRICHED_FILE);

    let mut state = APP_STATE.lock().unwrap();
    state.enriched = Some(enriched);
    Ok(())
}

/// Handle option [3]: features, scores, clusters, recommendations, exports.
fn handle_prioritize() -> Result<(), Box<dyn Error>> {
    let cached = {
        let state = APP_STATE.lock().unwrap();
        state.enriched.clone()
    };
    let enriched = match cached {
        Some(batch) => batch,
        None => {
            println!(
                "No enriched batch in memory; reading {} from disk.",
                ENRICHED_FILE
            );
            enrich::from_rows(loader::load_enriched(ENRICHED_FILE)?)
        }
    };
    if enriched.is_empty() {
        return Err("no enriched buildings to prioritize, run enrichment first".into());
    }

    let reference_year = Utc::now().year();
    println!(
        "Building feature matrix for {} buildings...",
        format_int(enriched.len() as i64)
    );
    let features = features::build_features(&enriched, reference_year);
    let scores = scoring::priority_scores(&features);

    println!(
        "Clustering buildings into {} groups...",
        cluster::DEFAULT_CLUSTERS
    );
    let (clusters, profiles) = cluster::cluster_buildings(&features, cluster::DEFAULT_CLUSTERS);

    let mut rows: Vec<PrioritizedRow> = Vec::with_capacity(enriched.len());
    for (i, eb) in enriched.iter().enumerate() {
        let fv = &features[i];
        let score = scores[i];
        let level = PriorityLevel::from_score(score);
        rows.push(PrioritizedRow {
            building_id: eb.building.id.clone(),
            building_name: eb.building.name.clone(),
            address: eb.building.address.clone(),
            borough_name: eb.building.borough_raw.clone(),
            borough: eb.borough.clone(),
            building_constr_year: eb.building.construction_year,
            building_area: eb.building.area,
            floor_amount: eb.building.floor_count,
            basement_amount: eb.building.basement_area,
            usage_name: eb.building.usage.clone(),
            postal_code: eb.postal_code.clone(),
            street_number: eb.street_number.clone(),
            street_name: eb.street_name.clone(),
            postal_prefix: eb.postal_prefix.clone(),
            postal_flood_risk: eb.postal_flood_risk,
            postal_heat_risk: eb.postal_heat_risk,
            flood_zone_risk_score: eb.flood_zone_risk_score,
            heat_island_risk_score: eb.heat_island_risk_score,
            location_fingerprint: eb.location_fingerprint.clone(),
            priority_score: score,
            priority_level: level.as_str().to_string(),
            risk_cluster: clusters[i],
            score_age_risk: fv.age_risk,
            score_size_impact: fv.size_impact,
            score_energy_risk: fv.energy_risk,
            score_climate_risk: fv.climate_risk,
            score_social_vulnerability: fv.social_vulnerability,
            score_floor_count_norm: fv.floor_count_norm,
            score_has_basement: fv.has_basement,
            estimated_ges_reduction_potential: scoring::ges_reduction_potential(
                eb.building.area,
                fv.energy_risk,
                fv.age_risk,
            ),
            recommendations: recommend::recommendations(
                fv,
                eb.postal_flood_risk,
                eb.postal_heat_risk,
                score,
            ),
        });
    }
    rows.sort_by(|a, b| {
        b.priority_score
            .partial_cmp(&a.priority_score)
            .unwrap_or(Ordering::Equal)
    });

    output::write_csv_with_bom(PRIORITIZED_FILE, &rows)?;
    let top_count = rows.len().min(100);
    output::write_csv_with_bom(TOP_100_FILE, &rows[..top_count])?;

    println!("\nCluster profiles (standardized feature means):");
    let profile_rows: Vec<ClusterProfileRow> = profiles
        .iter()
        .map(|p| ClusterProfileRow {
            cluster: p.cluster,
            count: p.count,
            age_risk: format_number(p.means[0], 3),
            size_impact: format_number(p.means[1], 3),
            energy_risk: format_number(p.means[2], 3),
            climate_risk: format_number(p.means[3], 3),
            social_vulnerability: format_number(p.means[4], 3),
            floor_count_norm: format_number(p.means[5], 3),
            has_basement: format_number(p.means[6], 3),
        })
        .collect();
    output::preview_table(&profile_rows, profile_rows.len());

    println!("Top 20 priority buildings:");
    let preview: Vec<TopBuildingRow> = rows
        .iter()
        .take(20)
        .map(|r| TopBuildingRow {
            name: r.building_name.clone(),
            borough: r.borough.clone().unwrap_or_else(|| "-".to_string()),
            score: format_number(r.priority_score, 1),
            level: r.priority_level.clone(),
            energy: format_number(r.score_energy_risk, 2),
            climate: format_number(r.score_climate_risk, 2),
            social: format_number(r.score_social_vulnerability, 2),
            ges: format_number(r.estimated_ges_reduction_potential, 1),
        })
        .collect();
    output::preview_table(&preview, 20);

    println!(
        "Average priority score: {}",
        format_number(util::average(&scores), 1)
    );
    let critical = rows.iter().filter(|r| r.priority_level == "Critical").count();
    let high = rows.iter().filter(|r| r.priority_level == "High").count();
    let medium = rows.iter().filter(|r| r.priority_level == "Medium").count();
    let low = rows.iter().filter(|r| r.priority_level == "Low").count();
    println!("Priority level distribution:");
    println!("  Critical: {}", format_int(critical as i64));
    println!("  High:     {}", format_int(high as i64));
    println!("  Medium:   {}", format_int(medium as i64));
    println!("  Low:      {}", format_int(low as i64));

    let total_ges: f64 = rows
        .iter()
        .map(|r| r.estimated_ges_reduction_potential)
        .sum();
    let top_100_ges: f64 = rows[..top_count]
        .iter()
        .map(|r| r.estimated_ges_reduction_potential)
        .sum();
    let vulnerable: Vec<&PrioritizedRow> = rows
        .iter()
        .filter(|r| r.priority_score > 60.0 && r.score_social_vulnerability > 0.7)
        .collect();
    let vulnerable_ges: f64 = vulnerable
        .iter()
        .map(|r| r.estimated_ges_reduction_potential)
        .sum();

    println!(
        "\nTotal estimated GES reduction potential: {} tonnes CO2/year",
        format_number(total_ges, 1)
    );
    println!(
        "Top 100 buildings GES potential: {} tonnes CO2/year",
        format_number(top_100_ges, 1)
    );
    println!(
        "High-priority buildings in vulnerable areas: {} ({} tonnes CO2/year)",
        format_int(vulnerable.len() as i64),
        format_number(vulnerable_ges, 1)
    );

    let summary = SummaryStats {
        total_buildings: rows.len(),
        critical,
        high,
        medium,
        low,
        total_ges_reduction_potential: total_ges,
        top_100_ges_reduction_potential: top_100_ges,
        vulnerable_high_priority_count: vulnerable.len(),
        vulnerable_high_priority_ges: vulnerable_ges,
        generated_at: Utc::now().to_rfc3339(),
    };
    output::write_json(SUMMARY_FILE, &summary)?;

    println!("\nResults saved to {}", PRIORITIZED_FILE);
    println!("Top 100 priorities saved to {}", TOP_100_FILE);
    println!("Run summary saved to {}\n", SUMMARY_FILE);
    Ok(())
}

/// Handle option [4]: the full pipeline, aborting on the first stage error.
fn handle_pipeline() {
    handle_explore();
    if let Err(e) = handle_enrich() {
        eprintln!("[ABORT] Pipeline stopped during enrichment: {}", e);
        return;
    }
    if let Err(e) = handle_prioritize() {
        eprintln!("[ABORT] Pipeline stopped during prioritization: {}", e);
        return;
    }
    println!("{}", "=".repeat(80));
    println!("[COMPLETE] Pipeline executed successfully!");
    println!("{}", "=".repeat(80));
    println!("Outputs generated:");
    println!("  - {}", ENRICHED_FILE);
    println!("  - {}", PRIORITIZED_FILE);
    println!("  - {}", TOP_100_FILE);
    println!("  - {}", SUMMARY_FILE);
}

fn main() {
    println!("Building Risk Prioritization — Montréal municipal buildings");
    println!("(text-intelligence pipeline, no geospatial data)\n");
    if !loader::source_present(loader::BUILDINGS_FILE) {
        println!(
            "Note: {} not found; place the source datasets under data/ first.\n",
            loader::BUILDINGS_FILE
        );
    }

    loop {
        println!("[1] Explore datasets");
        println!("[2] Enrich buildings");
        println!("[3] Prioritize buildings");
        println!("[4] Run full pipeline");
        println!("[5] Quit\n");
        match read_choice().as_str() {
            "1" => handle_explore(),
            "2" => {
                if let Err(e) = handle_enrich() {
                    eprintln!("Enrichment failed: {}\n", e);
                }
            }
            "3" => {
                if let Err(e) = handle_prioritize() {
                    eprintln!("Prioritization failed: {}\n", e);
                }
            }
            "4" => handle_pipeline(),
            "5" | "q" | "Q" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 1-5.\n"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::SourceTable;
    use crate::types::Building;

    fn building(
        id: &str,
        address: &str,
        borough: &str,
        year: i32,
        area: f64,
        usage: &str,
    ) -> Building {
        Building {
            id: id.to_string(),
            name: id.to_string(),
            address: Some(address.to_string()),
            borough_raw: Some(borough.to_string()),
            construction_year: Some(year),
            area: Some(area),
            floor_count: Some(3.0),
            basement_area: 50.0,
            usage: Some(usage.to_string()),
        }
    }

    #[test]
    fn core_pipeline_ranks_the_risky_building_first() {
        let buildings = vec![
            building(
                "B001",
                "3175 RUE ADAM, MONTREAL, H1W 3P4",
                "Mercier",
                1920,
                6_000.0,
                "BIBLIOTHÈQUE",
            ),
            building(
                "B002",
                "123 AVENUE DUROCHER, MONTREAL, H9A 1A1",
                "Outremont",
                2018,
                800.0,
                "Bureau",
            ),
        ];
        let enriched =
            enrich::enrich_buildings(&buildings, &SourceTable::default(), &SourceTable::default());
        // H1 prefix: river-side flood risk feeds the climate subscore.
        assert_eq!(enriched[0].postal_prefix.as_deref(), Some("H1"));
        assert_eq!(
            enriched[0].borough.as_deref(),
            Some("MERCIER-HOCHELAGA-MAISONNEUVE")
        );

        let features = features::build_features(&enriched, 2024);
        let scores = scoring::priority_scores(&features);
        // Batch of two: the old high-risk building pins the max.
        assert_eq!(scores[0], 100.0);
        assert_eq!(scores[1], 0.0);

        let rec = recommend::recommendations(
            &features[0],
            enriched[0].postal_flood_risk,
            enriched[0].postal_heat_risk,
            scores[0],
        );
        assert!(rec.contains("Isolation thermique"));
        assert!(rec.starts_with("⚠️"));
    }
}
