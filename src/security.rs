use subtle::ConstantTimeEq;

/// Header carrying the admin API key
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Constant-time string comparison to prevent timing attacks
/// Use this for comparing the admin API key and other sensitive values
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Check a presented admin key against the configured one.
///
/// When no key is configured the admin surface is open (local development).
pub fn admin_key_matches(configured: Option<&str>, presented: Option<&str>) -> bool {
    match (configured, presented) {
        (None, _) => true,
        (Some(expected), Some(given)) => constant_time_compare(expected, given),
        (Some(_), None) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("secret123", "secret123"));
        assert!(!constant_time_compare("secret123", "secret124"));
        assert!(!constant_time_compare("secret123", "secret12"));
        assert!(!constant_time_compare("", "secret"));
    }

    #[test]
    fn test_admin_key_open_when_unconfigured() {
        assert!(admin_key_matches(None, None));
        assert!(admin_key_matches(None, Some("anything")));
    }

    #[test]
    fn test_admin_key_required_when_configured() {
        assert!(admin_key_matches(Some("k"), Some("k")));
        assert!(!admin_key_matches(Some("k"), Some("x")));
        assert!(!admin_key_matches(Some("k"), None));
    }
}
