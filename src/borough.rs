// Borough name normalization.
//
// Source files spell the same borough half a dozen ways (abbreviations,
// accents, slashes). Everything downstream keys on the canonical name, so
// the lookup table below is the single place where variants are resolved.
// Table order is the tie-break: the first matching entry wins.

/// Canonical Montreal boroughs with their known aliases. Aliases are matched
/// exactly first, then as substrings of the cleaned input.
pub const BOROUGH_ALIASES: &[(&str, &[&str])] = &[
    ("VILLE-MARIE", &["VILLE MARIE", "VILLEMARIE", "DOWNTOWN"]),
    ("PLATEAU-MONT-ROYAL", &["PLATEAU", "MONT ROYAL", "MONT-ROYAL"]),
    (
        "ROSEMONT-PETITE-PATRIE",
        &["ROSEMONT", "PETITE PATRIE", "PETITE-PATRIE"],
    ),
    (
        "MERCIER-HOCHELAGA-MAISONNEUVE",
        &["MERCIER", "HOCHELAGA", "MAISONNEUVE"],
    ),
    (
        "COTE-DES-NEIGES-NOTRE-DAME-DE-GRACE",
        &["CDN", "NDG", "COTE DES NEIGES"],
    ),
    (
        "VILLERAY-SAINT-MICHEL-PARC-EXTENSION",
        &["VILLERAY", "SAINT MICHEL", "PARC EXTENSION"],
    ),
    ("AHUNTSIC-CARTIERVILLE", &["AHUNTSIC", "CARTIERVILLE"]),
    ("SUD-OUEST", &["SUD OUEST", "SOUTHWEST"]),
    (
        "RIVIERE-DES-PRAIRIES-POINTE-AUX-TREMBLES",
        &["RDP", "POINTE AUX TREMBLES"],
    ),
    ("SAINT-LEONARD", &["ST LEONARD", "ST-LEONARD"]),
    ("SAINT-LAURENT", &["ST LAURENT", "ST-LAURENT"]),
    ("VERDUN", &["VERDUN"]),
    (
        "ILE-BIZARD-SAINTE-GENEVIEVE",
        &["ILE BIZARD", "SAINTE GENEVIEVE"],
    ),
    ("LACHINE", &["LACHINE"]),
    ("LASALLE", &["LASALLE", "LA SALLE"]),
    ("MONTREAL-NORD", &["MONTREAL NORD", "NORTH MONTREAL"]),
    ("OUTREMONT", &["OUTREMONT"]),
    ("PIERREFONDS-ROXBORO", &["PIERREFONDS", "ROXBORO"]),
    ("ANJOU", &["ANJOU"]),
];

/// Upper-case, trim, fold the accented characters that appear in borough
/// spellings, and normalize slashes/double spaces. The alias table is ASCII,
/// so folding has to happen before matching.
pub fn clean_borough(raw: &str) -> String {
    let upper = raw.trim().to_uppercase();
    let folded: String = upper
        .chars()
        .map(|c| match c {
            'É' | 'È' | 'Ê' => 'E',
            'À' | 'Â' => 'A',
            'Î' => 'I',
            'Ô' => 'O',
            'Ù' => 'U',
            '/' => '-',
            _ => c,
        })
        .collect();
    let mut collapsed = folded;
    while collapsed.contains("  ") {
        collapsed = collapsed.replace("  ", " ");
    }
    collapsed.trim().to_string()
}

/// Resolve a free-text borough to its canonical name.
///
/// Returns the cleaned input unchanged when no table entry matches, and
/// `None` only when the input itself is missing.
pub fn normalize_borough(raw: Option<&str>) -> Option<String> {
    let cleaned = clean_borough(raw?);
    for (canonical, aliases) in BOROUGH_ALIASES {
        if cleaned == *canonical || aliases.contains(&cleaned.as_str()) {
            return Some((*canonical).to_string());
        }
        for alias in *aliases {
            if cleaned.contains(alias) {
                return Some((*canonical).to_string());
            }
        }
    }
    Some(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_pass_through() {
        assert_eq!(
            normalize_borough(Some("VILLE-MARIE")).as_deref(),
            Some("VILLE-MARIE")
        );
    }

    #[test]
    fn abbreviation_and_accented_variant_resolve_to_same_borough() {
        let canonical = "COTE-DES-NEIGES-NOTRE-DAME-DE-GRACE";
        assert_eq!(normalize_borough(Some("CDN")).as_deref(), Some(canonical));
        assert_eq!(
            normalize_borough(Some("côte des neiges")).as_deref(),
            Some(canonical)
        );
    }

    #[test]
    fn substring_alias_matches() {
        assert_eq!(
            normalize_borough(Some("ARRONDISSEMENT DE LACHINE")).as_deref(),
            Some("LACHINE")
        );
    }

    #[test]
    fn unknown_borough_returns_cleaned_input() {
        assert_eq!(
            normalize_borough(Some("  westmount ")).as_deref(),
            Some("WESTMOUNT")
        );
        assert_eq!(normalize_borough(None), None);
    }

    #[test]
    fn table_order_breaks_ties() {
        // "MONT-ROYAL" is an alias of PLATEAU-MONT-ROYAL and must not be
        // claimed by a later entry.
        assert_eq!(
            normalize_borough(Some("Mont-Royal")).as_deref(),
            Some("PLATEAU-MONT-ROYAL")
        );
    }
}
