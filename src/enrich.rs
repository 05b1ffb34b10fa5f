// Enrichment stage: everything derived from text before scoring starts.
//
// Canonical borough, address components, postal risk pair, borough-count
// proximity proxies and the location fingerprint are all resolved here,
// once, so the feature builder never re-derives them.
use crate::address::{location_fingerprint, parse_address};
use crate::borough::normalize_borough;
use crate::loader::SourceTable;
use crate::postal::postal_risk;
use crate::types::{Building, EnrichedBuilding, EnrichedRow};
use std::collections::HashMap;

/// Borough-level risk proxy from a hazard table: the per-borough record
/// count normalized by the busiest borough. A table without a borough
/// column yields an empty map and every building scores 0.0 on this axis.
pub fn borough_risk_proxy(table: &SourceTable) -> HashMap<String, f64> {
    let Some(col) = table.column_index(&["borough", "boroughName"]) else {
        return HashMap::new();
    };

    let mut counts: HashMap<String, usize> = HashMap::new();
    for row in 0..table.len() {
        if let Some(value) = table.value(row, col) {
            let value = value.trim();
            if !value.is_empty() {
                *counts.entry(value.to_string()).or_insert(0) += 1;
            }
        }
    }

    let max = counts.values().copied().max().unwrap_or(1).max(1);
    counts
        .into_iter()
        .map(|(borough, count)| (borough, count as f64 / max as f64))
        .collect()
}

/// Enrich a building batch. `flood` and `heat` are the hazard tables used
/// for the proximity proxies; either may be empty.
pub fn enrich_buildings(
    buildings: &[Building],
    flood: &SourceTable,
    heat: &SourceTable,
) -> Vec<EnrichedBuilding> {
    let flood_proxy = borough_risk_proxy(flood);
    let heat_proxy = borough_risk_proxy(heat);

    buildings
        .iter()
        .map(|b| {
            let components = parse_address(b.address.as_deref());
            let borough = normalize_borough(b.borough_raw.as_deref());

            let postal_prefix = components
                .postal_code
                .as_ref()
                .map(|p| p.chars().take(2).collect::<String>());
            let (postal_flood_risk, postal_heat_risk) = postal_risk(postal_prefix.as_deref());

            let lookup = |proxy: &HashMap<String, f64>| {
                borough
                    .as_deref()
                    .and_then(|name| proxy.get(name))
                    .copied()
                    .unwrap_or(0.0)
            };

            EnrichedBuilding {
                location_fingerprint: location_fingerprint(borough.as_deref(), &components),
                flood_zone_risk_score: lookup(&flood_proxy),
                heat_island_risk_score: lookup(&heat_proxy),
                postal_code: components.postal_code,
                street_number: components.street_number,
                street_name: components.street_name,
                borough,
                postal_prefix,
                postal_flood_risk,
                postal_heat_risk,
                building: b.clone(),
            }
        })
        .collect()
}

/// Flatten enriched buildings into the export rows for
/// `output_buildings_enriched.csv`.
pub fn to_rows(enriched: &[EnrichedBuilding]) -> Vec<EnrichedRow> {
    enriched
        .iter()
        .map(|eb| EnrichedRow {
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
        })
        .collect()
}

/// Rebuild enriched buildings from rows read back off disk. Inverse of
/// `to_rows` for the fields the prioritize stage consumes.
pub fn from_rows(rows: Vec<EnrichedRow>) -> Vec<EnrichedBuilding> {
    rows.into_iter()
        .map(|row| EnrichedBuilding {
            building: Building {
                id: row.building_id,
                name: row.building_name,
                address: row.address,
                borough_raw: row.borough_name,
                construction_year: row.building_constr_year,
                area: row.building_area,
                floor_count: row.floor_amount,
                basement_area: row.basement_amount,
                usage: row.usage_name,
            },
            postal_code: row.postal_code,
            street_number: row.street_number,
            street_name: row.street_name,
            borough: row.borough,
            postal_prefix: row.postal_prefix,
            postal_flood_risk: row.postal_flood_risk,
            postal_heat_risk: row.postal_heat_risk,
            flood_zone_risk_score: row.flood_zone_risk_score,
            heat_island_risk_score: row.heat_island_risk_score,
            location_fingerprint: row.location_fingerprint,
        })
        .collect()
}
