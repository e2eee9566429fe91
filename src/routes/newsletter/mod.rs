mod handler;
mod types;

pub use handler::{
    client_identifier, newsletter_form_config, newsletter_signup, register_subscriber,
    save_subscriber, screen_submission,
};
pub use types::{NewsletterForm, NewsletterOutcome};
