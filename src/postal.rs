// Postal-prefix climate risk table.
//
// Montreal postal codes encode geography in their first two characters
// (H1 east end near the river, H3 downtown heat island, H9 far west). The
// pairs below are a deliberately coarse stand-in for real flood/heat layers;
// callers must treat them as approximate.

/// (prefix, flood_risk, heat_risk). H6 is not assigned on the island.
pub const POSTAL_RISK: &[(&str, f64, f64)] = &[
    ("H1", 0.8, 0.6), // east end, near the river
    ("H2", 0.3, 0.7), // centre-north, dense urban
    ("H3", 0.4, 0.9), // downtown heat island
    ("H4", 0.5, 0.5), // west, greener
    ("H5", 0.2, 0.4), // north, residential
    ("H7", 0.7, 0.5), // southwest, industrial
    ("H8", 0.6, 0.6), // far east
    ("H9", 0.3, 0.4), // far west
];

/// Risk pair for unknown or missing prefixes: medium on both axes.
pub const DEFAULT_RISK: (f64, f64) = (0.5, 0.5);

/// Look up the (flood, heat) risk pair for a postal code prefix. Any prefix
/// outside the table, including a missing postal code, yields the medium
/// default.
pub fn postal_risk(prefix: Option<&str>) -> (f64, f64) {
    let Some(prefix) = prefix else {
        return DEFAULT_RISK;
    };
    POSTAL_RISK
        .iter()
        .find(|(p, _, _)| *p == prefix)
        .map(|(_, flood, heat)| (*flood, *heat))
        .unwrap_or(DEFAULT_RISK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_prefix_returns_its_pair() {
        for (prefix, flood, heat) in POSTAL_RISK {
            assert_eq!(postal_risk(Some(prefix)), (*flood, *heat));
        }
    }

    #[test]
    fn unknown_prefix_falls_back_to_medium() {
        assert_eq!(postal_risk(Some("H6")), DEFAULT_RISK);
        assert_eq!(postal_risk(Some("J4")), DEFAULT_RISK);
        assert_eq!(postal_risk(None), DEFAULT_RISK);
    }
}
