use once_cell::sync::Lazy;
use regex::Regex;

// Something, an `@`, something, a `.`, something. No whitespace, no second `@`.
static EMAIL_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Email pattern is a valid regex")
});

/// A newsletter address: trimmed, lower-cased, structurally plausible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    pub fn parse(s: &str) -> Result<Self, String> {
        let email = s.trim().to_lowercase();
        if email.is_empty() || !EMAIL_SHAPE.is_match(&email) {
            return Err(format!("{s} is not a valid subscriber email."));
        }
        Ok(Self(email))
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SubscriberEmail {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        SubscriberEmail::parse(&value)
    }
}

impl std::fmt::Display for SubscriberEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
