//! Heuristic business-text parsing shared by the activation flows.
//!
//! These reproduce documented behavior over free-text appointment fields;
//! they are not validated or corrected beyond that behavior.

use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+(?:,\d+)*(?:\.\d+)?").unwrap_or_else(|err| {
        panic!("invalid leading-number pattern: {err}");
    })
});

/// First numeric token in `text`, tolerating thousands separators, e.g.
/// "500,000 shares" parses as 500000.0 and "$180,000 deferred" as 180000.0.
pub fn parse_leading_number(text: &str) -> Option<f64> {
    let token = LEADING_NUMBER.find(text)?.as_str().replace(',', "");
    token.parse().ok()
}

/// Case-sensitive CEO detection over the proposed title set.
pub fn is_ceo_title(titles: &[String]) -> bool {
    titles
        .iter()
        .any(|title| title.contains("CEO") || title.contains("Chief Executive Officer"))
}

/// Whether a compensation description marks the package as deferred.
pub fn is_deferred(text: &str) -> bool {
    text.to_lowercase().contains("deferred")
}

/// First proposed title, the one driving role and banking capability maps.
pub fn primary_title(titles: &[String]) -> &str {
    titles.first().map(String::as_str).unwrap_or("")
}

pub const ROLE_EXECUTIVE: &str = "OFFICER_EXECUTIVE";

/// Specific system role for a title; unknown titles get the generic
/// executive role.
pub fn title_to_role(title: &str) -> &'static str {
    match title.to_uppercase().as_str() {
        "CEO" => "OFFICER_CEO",
        "CFO" => "OFFICER_CFO",
        "CTO" => "OFFICER_CTO",
        "COO" => "OFFICER_COO",
        _ => ROLE_EXECUTIVE,
    }
}

/// Access-account role for a title.
pub fn access_role(title: &str) -> &'static str {
    match title.to_uppercase().as_str() {
        "CEO" => "ceo",
        "CFO" => "cfo",
        "CTO" => "cto",
        "COO" => "coo",
        _ => "executive",
    }
}

/// Banking capability flags derived from the uppercased title:
/// (can_sign_wires, can_sign_checks, can_access_treasury_portal).
pub fn banking_capabilities(title: &str) -> (bool, bool, bool) {
    let title = title.to_uppercase();
    let wires = matches!(title.as_str(), "CEO" | "CFO");
    let checks = matches!(title.as_str(), "CEO" | "CFO" | "COO");
    let treasury = matches!(title.as_str(), "CEO" | "CFO");
    (wires, checks, treasury)
}

#[cfg(test)]
mod tests {
    use super::{
        banking_capabilities, is_ceo_title, is_deferred, parse_leading_number, title_to_role,
    };

    fn titles(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn leading_number_strips_thousands_separators() {
        assert_eq!(parse_leading_number("500,000 shares"), Some(500_000.0));
        assert_eq!(parse_leading_number("$180,000 deferred"), Some(180_000.0));
        assert_eq!(parse_leading_number("2.5% of pool"), Some(2.5));
        assert_eq!(parse_leading_number("no numbers here"), None);
    }

    #[test]
    fn ceo_match_is_case_sensitive_substring() {
        assert!(is_ceo_title(&titles(&["CEO"])));
        assert!(is_ceo_title(&titles(&["Chief Executive Officer"])));
        assert!(is_ceo_title(&titles(&["CEO, Treasurer"])));
        assert!(!is_ceo_title(&titles(&["ceo"])));
        assert!(!is_ceo_title(&titles(&["CFO"])));
    }

    #[test]
    fn deferred_detection_is_case_insensitive() {
        assert!(is_deferred("$180,000 Deferred until funding"));
        assert!(!is_deferred("$180,000 immediate"));
    }

    #[test]
    fn unknown_titles_get_generic_executive_role() {
        assert_eq!(title_to_role("CEO"), "OFFICER_CEO");
        assert_eq!(title_to_role("cfo"), "OFFICER_CFO");
        assert_eq!(title_to_role("General Counsel"), "OFFICER_EXECUTIVE");
    }

    #[test]
    fn banking_capabilities_follow_the_title_table() {
        assert_eq!(banking_capabilities("CEO"), (true, true, true));
        assert_eq!(banking_capabilities("cfo"), (true, true, true));
        assert_eq!(banking_capabilities("COO"), (false, true, false));
        assert_eq!(banking_capabilities("CTO"), (false, false, false));
    }
}
