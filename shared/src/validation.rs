use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

// local part, '@', domain with at least one dot; no whitespace anywhere
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || !EMAIL_RE.is_match(email) {
        return Err(ValidationError::new("invalid_email_format"));
    }
    Ok(())
}

pub fn is_valid_email(email: &str) -> bool {
    validate_email(email).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_addresses() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("First.Last@Example.COM"));
    }

    #[test]
    fn test_rejects_malformed() {
        for email in ["", "not-an-email", "a@b", "@b.co", "a@.", "a b@c.de", "a@b.co "] {
            assert!(!is_valid_email(email), "{:?} should be rejected", email);
        }
    }
}
