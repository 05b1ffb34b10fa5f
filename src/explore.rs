// Dataset exploration.
//
// Prints shape, columns, blank-cell counts and a head preview for each of
// the five sources. Purely diagnostic: a source that fails to load is
// reported as empty and never aborts the run.
use crate::loader::{
    self, SourceTable, BUILDINGS_FILE, ENERGY_FILE, FLOOD_FILE, HEAT_FILE, VULNERABILITY_FILE,
};
use crate::util::format_int;
use tabled::{builder::Builder, settings::Style};

const PREVIEW_ROWS: usize = 5;
const PREVIEW_COLS: usize = 8;
const PREVIEW_CELL_WIDTH: usize = 24;

fn truncate_cell(value: &str) -> String {
    if value.chars().count() <= PREVIEW_CELL_WIDTH {
        value.to_string()
    } else {
        let head: String = value.chars().take(PREVIEW_CELL_WIDTH - 1).collect();
        format!("{}…", head)
    }
}

fn print_head(table: &SourceTable) {
    let cols = table.headers.len().min(PREVIEW_COLS);
    let mut builder = Builder::default();
    builder.push_record(table.headers.iter().take(cols).map(|h| truncate_cell(h)));
    for row in table.rows.iter().take(PREVIEW_ROWS) {
        builder.push_record(
            (0..cols).map(|c| truncate_cell(row.get(c).map(String::as_str).unwrap_or(""))),
        );
    }
    let rendered = builder.build().with(Style::markdown()).to_string();
    println!("{}", rendered);
    if table.headers.len() > cols {
        println!(
            "... and {} more columns",
            format_int((table.headers.len() - cols) as i64)
        );
    }
}

fn describe(name: &str, path: &str, table: &SourceTable) {
    println!("{}", "=".repeat(80));
    println!("Dataset: {} ({})", name, path);
    println!("{}", "=".repeat(80));

    if table.is_empty() && table.headers.is_empty() {
        println!("(empty — source missing or unreadable)\n");
        return;
    }

    println!(
        "Shape: {} rows x {} columns",
        format_int(table.len() as i64),
        table.headers.len()
    );
    println!("Columns: {}\n", table.headers.join(", "));

    print_head(table);

    let missing = table.missing_counts();
    let with_gaps: Vec<&(String, usize)> = missing.iter().filter(|(_, n)| *n > 0).collect();
    if with_gaps.is_empty() {
        println!("No missing values.\n");
    } else {
        println!("Missing values:");
        for (column, count) in with_gaps {
            println!("  {}: {}", column, format_int(*count as i64));
        }
        println!();
    }
}

/// Run the exploration pass over all five sources.
pub fn run() {
    describe(
        "batiments",
        BUILDINGS_FILE,
        &loader::load_buildings_table(),
    );
    describe("consommation", ENERGY_FILE, &loader::load_energy());
    describe("inondation", FLOOD_FILE, &loader::load_flood());
    describe("chaleur", HEAT_FILE, &loader::load_heat());
    describe(
        "vulnerabilite",
        VULNERABILITY_FILE,
        &loader::load_vulnerability(),
    );

    println!("{}", "=".repeat(80));
    println!("EXPLORATION COMPLETE");
    println!("{}", "=".repeat(80));
}
