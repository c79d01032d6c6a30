/// Normalize a plan display name for identity lookups.
///
/// The console stores names like "The Balboa" while the external platforms
/// list "Balboa". Normalization steps:
/// - trim whitespace
/// - strip a single leading "the " token (case-insensitive)
/// - lowercase
///
/// The same function runs on both the table-build and lookup paths; if the
/// two ever diverged, resolution would silently fail closed (treated as
/// "not mapped"), so there is exactly one implementation.
pub fn normalize_plan_name(name: &str) -> String {
    let trimmed = name.trim();
    let stripped = strip_the_prefix(trimmed);
    stripped.trim().to_lowercase()
}

fn strip_the_prefix(name: &str) -> &str {
    match name.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("the ") => &name[4..],
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_leading_the() {
        assert_eq!(normalize_plan_name("The Balboa"), "balboa");
        assert_eq!(normalize_plan_name("the Balboa"), "balboa");
        assert_eq!(normalize_plan_name("THE BALBOA"), "balboa");
    }

    #[test]
    fn prefix_and_whitespace_insensitive() {
        // normalize(n) == normalize(" The " + n + " ") for any display name
        for n in ["Balboa", "Sophia Mountain Modern", "the balboa", "Willow "] {
            let wrapped = format!(" The {} ", n);
            assert_eq!(normalize_plan_name(n), normalize_plan_name(&wrapped));
        }
    }

    #[test]
    fn strips_only_one_prefix_token() {
        // "The The Willow" is a different plan than "The Willow"
        assert_eq!(normalize_plan_name("The The Willow"), "the willow");
    }

    #[test]
    fn keeps_interior_the() {
        assert_eq!(normalize_plan_name("Theodore"), "theodore");
        assert_eq!(normalize_plan_name("At The Lake"), "at the lake");
    }

    #[test]
    fn empty_and_whitespace() {
        assert_eq!(normalize_plan_name(""), "");
        assert_eq!(normalize_plan_name("   "), "");
        assert_eq!(normalize_plan_name("The "), "");
    }
}
