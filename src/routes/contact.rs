use actix_web::{HttpResponse, web};

use super::helpers::see_other;

#[derive(serde::Deserialize, Debug, Default)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

/// Contact messages are only logged; nothing is delivered.
#[tracing::instrument(
    name = "Contact message received",
    skip(form),
    fields(
        sender_name = %form.name,
        sender_email = %form.email,
    )
)]
pub async fn contact(form: web::Form<ContactForm>) -> HttpResponse {
    tracing::info!(
        subject = %form.subject,
        message = %form.message,
        "New contact message (not delivered)"
    );
    see_other("/contact")
}
