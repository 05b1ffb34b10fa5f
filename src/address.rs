// Address component extraction.
//
// Canadian civic addresses embed enough structure (postal code, leading
// street number) to stand in for coordinates. The three extractions are
// independent: one pattern failing to match never blocks the others.
use once_cell::sync::Lazy;
use regex::Regex;

static POSTAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z]\d[A-Z]\s*\d[A-Z]\d)").unwrap());
static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)[-\s]").unwrap());
// Street name sits between the street number and a comma or the start of a
// postal code. When neither marker is present the street name stays unset;
// that ambiguity is accepted rather than guessed at.
static STREET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+[-\s]+([A-Z\s'\-\.]+?)(?:\s*,|\s*H\d)").unwrap());

/// Components extracted from a free-text address. Any of them may be absent
/// independently of the others.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddressComponents {
    /// Six characters, upper-case, space removed (`H2X1A1`).
    pub postal_code: Option<String>,
    pub street_number: Option<String>,
    pub street_name: Option<String>,
}

/// Extract postal code, street number and street name from a raw address.
pub fn parse_address(raw: Option<&str>) -> AddressComponents {
    let Some(raw) = raw else {
        return AddressComponents::default();
    };
    let address = raw.to_uppercase();

    let postal_code = POSTAL_RE
        .captures(&address)
        .map(|c| c[1].replace(' ', ""));
    let street_number = NUMBER_RE.captures(&address).map(|c| c[1].to_string());
    let street_name = STREET_RE
        .captures(&address)
        .map(|c| c[1].trim().to_string());

    AddressComponents {
        postal_code,
        street_number,
        street_name,
    }
}

/// Coarse location key: borough, forward sortation area (first 3 postal
/// characters) and the street name truncated to 20 characters, joined with
/// `|`. Used only as a join key, never as a numeric feature.
pub fn location_fingerprint(borough: Option<&str>, components: &AddressComponents) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(b) = borough {
        parts.push(format!("B:{}", b));
    }
    if let Some(postal) = &components.postal_code {
        let fsa: String = postal.chars().take(3).collect();
        parts.push(format!("P:{}", fsa));
    }
    if let Some(street) = &components.street_name {
        let truncated: String = street.chars().take(20).collect();
        parts.push(format!("S:{}", truncated));
    }
    if parts.is_empty() {
        "UNKNOWN".to_string()
    } else {
        parts.join("|")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_address_yields_all_components() {
        let c = parse_address(Some("1234-A RUE SAINT-DENIS, MONTREAL, H2X 1A1"));
        assert_eq!(c.postal_code.as_deref(), Some("H2X1A1"));
        assert_eq!(c.street_number.as_deref(), Some("1234"));
        assert!(c.street_name.is_some());
    }

    #[test]
    fn postal_code_without_space_is_accepted() {
        let c = parse_address(Some("500 RUE NOTRE-DAME, H3C4J7"));
        assert_eq!(c.postal_code.as_deref(), Some("H3C4J7"));
    }

    #[test]
    fn extractions_are_independent() {
        // No street number, but the postal code still comes through.
        let c = parse_address(Some("PAVILLON LAFONTAINE, H2L 3A1"));
        assert_eq!(c.postal_code.as_deref(), Some("H2L3A1"));
        assert_eq!(c.street_number, None);
    }

    #[test]
    fn street_name_stays_unset_without_end_marker() {
        // Neither a comma nor a postal code follows the street text.
        let c = parse_address(Some("4100 AVENUE DU PARC"));
        assert_eq!(c.street_number.as_deref(), Some("4100"));
        assert_eq!(c.street_name, None);
    }

    #[test]
    fn missing_address_yields_empty_components() {
        assert_eq!(parse_address(None), AddressComponents::default());
    }

    #[test]
    fn fingerprint_combines_present_parts() {
        let c = parse_address(Some("1234 RUE OUIMET, MONTREAL, H4K 1A1"));
        let fp = location_fingerprint(Some("SAINT-LAURENT"), &c);
        assert!(fp.starts_with("B:SAINT-LAURENT|P:H4K"));
        let empty = location_fingerprint(None, &AddressComponents::default());
        assert_eq!(empty, "UNKNOWN");
    }
}
