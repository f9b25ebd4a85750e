//! Field-level validation rules for project input.
//!
//! Each validator returns `Err(message)` describing the first rule the value
//! breaks. Lengths are measured in characters, not bytes.

use std::sync::LazyLock;

use regex::Regex;

/// Minimum length of a project name.
pub const NAME_MIN_LEN: usize = 3;
/// Maximum length of a project name.
pub const NAME_MAX_LEN: usize = 100;
/// Minimum length of a project slug.
pub const SLUG_MIN_LEN: usize = 3;
/// Maximum length of a project slug.
pub const SLUG_MAX_LEN: usize = 100;
/// Maximum length of a project summary.
pub const SUMMARY_MAX_LEN: usize = 120;

/// Slugs are letters, digits, `_` and `-` in any script.
const SLUG_PATTERN: &str = r"^[\p{L}\p{N}_-]+$";

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SLUG_PATTERN).expect("valid regex"));

fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), String> {
    let len = value.chars().count();
    if len < min {
        return Err(format!("{field} must be at least {min} characters"));
    }
    if len > max {
        return Err(format!("{field} must be at most {max} characters"));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), String> {
    check_length("name", name, NAME_MIN_LEN, NAME_MAX_LEN)
}

pub fn validate_slug(slug: &str) -> Result<(), String> {
    check_length("slug", slug, SLUG_MIN_LEN, SLUG_MAX_LEN)?;
    if !SLUG_RE.is_match(slug) {
        return Err(format!("'{slug}' is not a valid slug"));
    }
    Ok(())
}

/// The empty string is accepted: on update it means "clear the summary".
pub fn validate_summary(summary: &str) -> Result<(), String> {
    check_length("summary", summary, 0, SUMMARY_MAX_LEN)
}

/// Icon URLs must be absolute `http(s)` URLs with a host. The empty string is
/// accepted and clears the icon on update.
pub fn validate_icon_url(url: &str) -> Result<(), String> {
    if url.is_empty() {
        return Ok(());
    }
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    let valid = match rest {
        Some(rest) => {
            !rest.is_empty() && !rest.starts_with('/') && !url.contains(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(format!("'{url}' is not a valid URL"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_length_bounds() {
        assert!(validate_name("ab").is_err());
        assert!(validate_name("abc").is_ok());
        assert!(validate_name(&"x".repeat(100)).is_ok());
        assert!(validate_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn name_length_counts_characters() {
        // Three characters, six bytes.
        assert!(validate_name("ÿÿÿ").is_ok());
    }

    #[test]
    fn slug_accepts_letters_digits_dash_underscore() {
        assert!(validate_slug("calamity-mod_2").is_ok());
        assert!(validate_slug("модуль").is_ok());
    }

    #[test]
    fn slug_rejects_spaces_and_punctuation() {
        assert!(validate_slug("has space").is_err());
        assert!(validate_slug("dots.not.allowed").is_err());
        assert!(validate_slug("slash/path").is_err());
    }

    #[test]
    fn slug_rejects_too_short() {
        let err = validate_slug("ab").unwrap_err();
        assert!(err.contains("at least 3"));
    }

    #[test]
    fn summary_allows_empty_and_caps_length() {
        assert!(validate_summary("").is_ok());
        assert!(validate_summary(&"s".repeat(120)).is_ok());
        assert!(validate_summary(&"s".repeat(121)).is_err());
    }

    #[test]
    fn icon_url_rules() {
        assert!(validate_icon_url("").is_ok());
        assert!(validate_icon_url("https://cdn.example.com/icon.png").is_ok());
        assert!(validate_icon_url("http://localhost:9000/i.png").is_ok());
        assert!(validate_icon_url("ftp://example.com/icon.png").is_err());
        assert!(validate_icon_url("https://").is_err());
        assert!(validate_icon_url("not a url").is_err());
    }
}
