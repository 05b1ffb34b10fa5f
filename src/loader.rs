// Dataset loading.
//
// Five sources, three text encodings, two delimiters and one GeoJSON file.
// The buildings table is the backbone and a failure to read it is fatal;
// every other source degrades to an empty table with a stderr warning so
// downstream stages can skip it gracefully.
use crate::types::{Building, EnrichedRow, RawBuildingRow};
use crate::util::{parse_f64_safe, parse_i32_safe};
use csv::ReaderBuilder;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use serde_json::Value;
use std::error::Error;
use std::path::Path;

pub const BUILDINGS_FILE: &str = "data/batiments-municipaux.csv";
pub const ENERGY_FILE: &str = "data/consommation-energetique-plus-2000m2-municipaux-2023.csv";
pub const FLOOD_FILE: &str = "data/vdq-zonesinondablesreglementees.csv";
pub const HEAT_FILE: &str = "data/ilots-de-chaleur-images-satellite-2023.geojson";
pub const VULNERABILITY_FILE: &str = "data/IndiceCanadienDeVulnérabilitéSociale.csv";

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub parse_errors: usize,
}

/// Untyped tabular view of a collaborator-produced source. Headers are kept
/// as-is; exploration and the borough proxies only need column lookup by
/// name.
#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SourceTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Index of the first column whose header matches any of `names`.
    pub fn column_index(&self, names: &[&str]) -> Option<usize> {
        names
            .iter()
            .find_map(|n| self.headers.iter().position(|h| h == n))
    }

    pub fn value(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
    }

    /// Per-column count of blank cells, for the exploration diagnostics.
    pub fn missing_counts(&self) -> Vec<(String, usize)> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let missing = self
                    .rows
                    .iter()
                    .filter(|r| r.get(i).map(|v| v.trim().is_empty()).unwrap_or(true))
                    .count();
                (h.clone(), missing)
            })
            .collect()
    }
}

/// Load and clean the municipal buildings inventory.
///
/// The optional-field contract is resolved here, once: construction year
/// through the forgiving integer parser, floor area from `buildingArea`
/// falling back to `builtArea`, missing basement amounts to 0. Rows the CSV
/// reader cannot decode are counted and skipped, never propagated.
pub fn load_buildings(path: &str) -> Result<(Vec<Building>, LoadReport), Box<dyn Error>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    let mut buildings: Vec<Building> = Vec::new();

    for result in rdr.deserialize::<RawBuildingRow>() {
        total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                parse_errors += 1;
                continue;
            }
        };

        let id = row
            .building_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("B{:05}", total_rows));
        let name = row
            .building_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| "Unknown".to_string());

        let area = parse_f64_safe(row.building_area.as_deref())
            .or_else(|| parse_f64_safe(row.built_area.as_deref()));

        buildings.push(Building {
            id,
            name,
            address: row.address.filter(|s| !s.trim().is_empty()),
            borough_raw: row.borough_name.filter(|s| !s.trim().is_empty()),
            construction_year: parse_i32_safe(row.building_constr_year.as_deref()),
            area,
            floor_count: parse_f64_safe(row.floor_amount.as_deref()),
            basement_area: parse_f64_safe(row.basement_amount.as_deref()).unwrap_or(0.0),
            usage: row.usage_name.filter(|s| !s.trim().is_empty()),
        });
    }

    let report = LoadReport {
        total_rows,
        kept_rows: buildings.len(),
        parse_errors,
    };
    Ok((buildings, report))
}

/// Read a delimited file into a `SourceTable`, decoding through the given
/// encoding. Rows that fail to parse are skipped; the flood-zone export in
/// particular carries the occasional short row.
fn read_table(
    path: &str,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<SourceTable, Box<dyn Error>> {
    let bytes = std::fs::read(path)?;
    let (text, _, _) = encoding.decode(&bytes);
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let Ok(record) = result else { continue };
        rows.push(record.iter().map(|v| v.to_string()).collect());
    }
    Ok(SourceTable { headers, rows })
}

/// Flatten a GeoJSON FeatureCollection into a table of feature properties.
/// Geometry is deliberately ignored; only the attribute payload is used.
fn read_geojson_properties(path: &str) -> Result<SourceTable, Box<dyn Error>> {
    let text = std::fs::read_to_string(path)?;
    let doc: Value = serde_json::from_str(&text)?;
    let features = doc
        .get("features")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut headers: Vec<String> = Vec::new();
    let mut props: Vec<&serde_json::Map<String, Value>> = Vec::new();
    for feature in &features {
        if let Some(obj) = feature.get("properties").and_then(Value::as_object) {
            for key in obj.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
            props.push(obj);
        }
    }

    let rows = props
        .iter()
        .map(|obj| {
            headers
                .iter()
                .map(|h| match obj.get(h) {
                    None | Some(Value::Null) => String::new(),
                    Some(Value::String(s)) => s.clone(),
                    Some(v) => v.to_string(),
                })
                .collect()
        })
        .collect();

    Ok(SourceTable { headers, rows })
}

fn warn_and_empty(label: &str, err: Box<dyn Error>) -> SourceTable {
    eprintln!("Warning: could not load {} data: {}", label, err);
    SourceTable::default()
}

/// Energy consumption declarations (UTF-8, comma).
pub fn load_energy() -> SourceTable {
    read_table(ENERGY_FILE, b',', UTF_8).unwrap_or_else(|e| warn_and_empty("energy", e))
}

/// Regulated flood zones (Latin-1, semicolon, bad rows skipped).
pub fn load_flood() -> SourceTable {
    read_table(FLOOD_FILE, b';', WINDOWS_1252).unwrap_or_else(|e| warn_and_empty("flood", e))
}

/// Heat island satellite polygons; only feature properties are kept.
pub fn load_heat() -> SourceTable {
    read_geojson_properties(HEAT_FILE).unwrap_or_else(|e| warn_and_empty("heat", e))
}

/// Canadian social vulnerability index (Latin-1), filtered to Québec.
pub fn load_vulnerability() -> SourceTable {
    let table = match read_table(VULNERABILITY_FILE, b',', WINDOWS_1252) {
        Ok(t) => t,
        Err(e) => return warn_and_empty("vulnerability", e),
    };
    match table.column_index(&["Province ou territoire"]) {
        Some(col) => {
            let rows = table
                .rows
                .into_iter()
                .filter(|r| r.get(col).map(|v| v == "Québec").unwrap_or(false))
                .collect();
            SourceTable {
                headers: table.headers,
                rows,
            }
        }
        None => table,
    }
}

/// Untyped view of the buildings file, for exploration diagnostics.
pub fn load_buildings_table() -> SourceTable {
    read_table(BUILDINGS_FILE, b',', UTF_8).unwrap_or_else(|e| warn_and_empty("buildings", e))
}

/// Read back the enriched export so a prioritize run can start cold from
/// disk instead of in-process state.
pub fn load_enriched(path: &str) -> Result<Vec<EnrichedRow>, Box<dyn Error>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut rows = Vec::new();
    for result in rdr.deserialize::<EnrichedRow>() {
        rows.push(result?);
    }
    Ok(rows)
}

/// True if the source file exists at all; used by the menu to hint at setup
/// problems before a stage runs.
pub fn source_present(path: &str) -> bool {
    Path::new(path).exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_table_finds_first_matching_column() {
        let table = SourceTable {
            headers: vec!["id".into(), "boroughName".into()],
            rows: vec![vec!["1".into(), "VERDUN".into()]],
        };
        assert_eq!(table.column_index(&["borough", "boroughName"]), Some(1));
        assert_eq!(table.column_index(&["missing"]), None);
        assert_eq!(table.value(0, 1), Some("VERDUN"));
    }

    #[test]
    fn missing_counts_treat_blank_and_short_rows_as_missing() {
        let table = SourceTable {
            headers: vec!["a".into(), "b".into()],
            rows: vec![vec!["x".into(), "".into()], vec!["y".into()]],
        };
        let counts = table.missing_counts();
        assert_eq!(counts[0], ("a".to_string(), 0));
        assert_eq!(counts[1], ("b".to_string(), 2));
    }
}
