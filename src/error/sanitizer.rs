//! Redaction of credentials in error messages.
//!
//! Evaluation errors can carry text that came from the server or from the
//! HTTP stack. Before that text is stored on a [`FeatureFlagError`] or logged,
//! it is passed through [`sanitize_message`], which removes:
//!
//! - Environment API keys (`ff_` prefixed)
//! - Bearer tokens
//! - Email addresses (user ids are frequently emails)
//!
//! [`FeatureFlagError`]: super::FeatureFlagError

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PATTERNS: Vec<(Regex, &'static str)> = vec![
        // Environment API keys (e.g., ff_production_4f9a2c1b)
        (Regex::new(r"\bff_[a-zA-Z0-9_-]{8,}").unwrap(), "ff_[REDACTED]"),
        // Bearer tokens from the dashboard API
        (Regex::new(r"(?i)\bbearer\s+[a-zA-Z0-9._~+/=-]+").unwrap(), "Bearer [REDACTED]"),
        // Email addresses (including + for plus addressing)
        (Regex::new(r"[\w.+-]+@[\w.-]+\.\w+").unwrap(), "[EMAIL]"),
    ];
}

/// Sanitize an error message by removing credentials and addresses.
///
/// # Examples
///
/// ```
/// use featureflags::error::sanitizer::sanitize_message;
///
/// let message = "Rejected key ff_production_abc123xyz for jane@example.com";
/// let sanitized = sanitize_message(message);
/// assert_eq!(sanitized, "Rejected key ff_[REDACTED] for [EMAIL]");
/// ```
pub fn sanitize_message(message: &str) -> String {
    let mut result = message.to_string();

    for (pattern, replacement) in PATTERNS.iter() {
        result = pattern.replace_all(&result, *replacement).to_string();
    }

    result
}

/// Render an API key for display without exposing it.
///
/// Keys have the shape `prefix_environment_random`; the random part may itself
/// contain underscores. Only its first four characters are kept. Keys that do
/// not follow that shape are cut to their first 15 characters.
pub fn mask_api_key(api_key: &str) -> String {
    let parts: Vec<&str> = api_key.split('_').collect();
    if parts.len() < 3 {
        let visible: String = api_key.chars().take(15).collect();
        return format!("{}...", visible);
    }

    let random_part = parts[2..].join("_");
    let visible_random: String = random_part.chars().take(4).collect();

    format!("{}_{}_{}...", parts[0], parts[1], visible_random)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_api_key() {
        let message = "Authentication failed for ff_production_abc123xyz789";
        let sanitized = sanitize_message(message);
        assert_eq!(sanitized, "Authentication failed for ff_[REDACTED]");
        assert!(!sanitized.contains("abc123xyz"));
    }

    #[test]
    fn test_sanitize_short_api_key_not_redacted() {
        // Keys must have at least 8 characters after the prefix
        let sanitized = sanitize_message("Short key: ff_abc");
        assert_eq!(sanitized, "Short key: ff_abc");
    }

    #[test]
    fn test_sanitize_ignores_embedded_prefix() {
        let sanitized = sanitize_message("see diff_output_12345678");
        assert_eq!(sanitized, "see diff_output_12345678");
    }

    #[test]
    fn test_sanitize_bearer_token() {
        let sanitized = sanitize_message("header was bearer eyJhbGciOi.payload.sig");
        assert_eq!(sanitized, "header was Bearer [REDACTED]");
    }

    #[test]
    fn test_sanitize_email_address() {
        let sanitized = sanitize_message("No evaluation for user.name+tag@sub.example.com");
        assert_eq!(sanitized, "No evaluation for [EMAIL]");
    }

    #[test]
    fn test_sanitize_no_sensitive_data() {
        assert_eq!(sanitize_message("Flag not found"), "Flag not found");
        assert_eq!(sanitize_message(""), "");
    }

    #[test]
    fn test_mask_api_key() {
        assert_eq!(mask_api_key("ff_production_abc123xyz"), "ff_production_abc1...");
    }

    #[test]
    fn test_mask_api_key_random_part_with_underscores() {
        assert_eq!(mask_api_key("ff_staging_ab_cd_ef"), "ff_staging_ab_c...");
    }

    #[test]
    fn test_mask_api_key_unexpected_shape() {
        assert_eq!(mask_api_key("ff_short"), "ff_short...");
        assert_eq!(mask_api_key("abcdefghijklmnopqrstuvwxyz"), "abcdefghijklmno...");
    }
}
