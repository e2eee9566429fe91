#[derive(serde::Deserialize, Debug, Default)]
pub struct NewsletterForm {
    #[serde(default)]
    pub newsletter_email: String,
    /// Hidden from people; only bots fill it in.
    #[serde(default)]
    pub hp: String,
    pub source: Option<String>,
}

/// Which branch a newsletter submission ended in. Sent back to the page as
/// `?newsletter=<code>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsletterOutcome {
    Spam,
    RateLimit,
    Invalid,
    Exists,
    Subscribed,
    Failed,
}

impl NewsletterOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            NewsletterOutcome::Spam => "spam",
            NewsletterOutcome::RateLimit => "rate_limit",
            NewsletterOutcome::Invalid => "invalid",
            NewsletterOutcome::Exists => "exists",
            NewsletterOutcome::Subscribed => "ok",
            NewsletterOutcome::Failed => "error",
        }
    }
}

impl std::fmt::Display for NewsletterOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
