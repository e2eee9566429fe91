use super::SubscriberEmail;

#[derive(Debug, Clone)]
pub struct NewSubscriber {
    pub email: SubscriberEmail,
    /// Where the signup form lives, stored as given.
    pub source: Option<String>,
}

impl NewSubscriber {
    pub fn parse(email: &str, source: Option<String>) -> Result<Self, String> {
        let email = SubscriberEmail::parse(email)?;
        let source = source.filter(|s| !s.is_empty());
        Ok(Self { email, source })
    }
}
