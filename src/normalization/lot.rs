use regex::Regex;
use std::sync::LazyLock;

static LOT_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(#\s*(\d+)\s*\)").expect("lot token regex"));

/// Extract the lot number from a free-text available-home address.
///
/// Addresses carry a parenthesized token, e.g. "549B N Legend (#467)".
/// Absence of the token is a resolution failure for the caller, not an
/// error here.
pub fn lot_number_from_address(address: &str) -> Option<String> {
    LOT_TOKEN
        .captures(address)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Normalized community key used by the lot and community identity tables.
pub fn community_key(community: &str) -> String {
    community.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_lot_token() {
        assert_eq!(
            lot_number_from_address("549B N Legend (#467)"),
            Some("467".to_string())
        );
        assert_eq!(
            lot_number_from_address("11252 N Regal Ridge Ct (#14)"),
            Some("14".to_string())
        );
    }

    #[test]
    fn tolerates_spacing_inside_token() {
        assert_eq!(
            lot_number_from_address("1722 S 4300 W (# 103 )"),
            Some("103".to_string())
        );
    }

    #[test]
    fn missing_token_is_none() {
        assert_eq!(lot_number_from_address("1722 S 4300 W"), None);
        assert_eq!(lot_number_from_address(""), None);
        // a bare number without the #-token is not a lot reference
        assert_eq!(lot_number_from_address("526 N Legend Way (429)"), None);
    }

    #[test]
    fn community_keys_fold_case() {
        assert_eq!(community_key(" Bella Vita "), "bella vita");
        assert_eq!(community_key("WINDFLOWER"), "windflower");
    }
}
