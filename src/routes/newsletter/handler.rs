use std::time::Instant;

use actix_web::{HttpRequest, HttpResponse, error::InternalError, http::header::REFERER, web};
use sqlx::PgPool;

use super::types::{NewsletterForm, NewsletterOutcome};
use crate::{
    domain::{NewSubscriber, SubscriberEmail},
    rate_limiter::RateLimiter,
    routes::helpers::see_other,
};

const UNKNOWN_CLIENT: &str = "unknown";

#[tracing::instrument(
    name = "Newsletter signup",
    skip_all,
    fields(client = tracing::field::Empty, outcome = tracing::field::Empty)
)]
pub async fn newsletter_signup(
    req: HttpRequest,
    form: web::Form<NewsletterForm>,
    db_pool: web::Data<PgPool>,
    rate_limiter: web::Data<RateLimiter>,
) -> HttpResponse {
    let client = client_identifier(&req);
    tracing::Span::current().record("client", tracing::field::display(&client));

    let outcome = match screen_submission(&form, &client, &rate_limiter, Instant::now()) {
        Ok(new_subscriber) => register_subscriber(&db_pool, &new_subscriber).await,
        Err(outcome) => outcome,
    };
    tracing::Span::current().record("outcome", tracing::field::display(outcome));

    see_other(&outcome_location(referer(&req), outcome))
}

/// Form settings for the signup route. A body that cannot be read as the
/// signup form is redirected like any other invalid submission.
pub fn newsletter_form_config() -> web::FormConfig {
    web::FormConfig::default().error_handler(|err, req| {
        tracing::warn!(error.message = %err, "Unreadable newsletter submission");
        let location = outcome_location(referer(req), NewsletterOutcome::Invalid);
        InternalError::from_response(err, see_other(&location)).into()
    })
}

/// The checks that need no storage: honeypot, then rate limit, then email
/// shape. The first one that fails decides the outcome.
///
/// Only submissions that get past the honeypot use up rate-limit budget.
pub fn screen_submission(
    form: &NewsletterForm,
    client: &str,
    rate_limiter: &RateLimiter,
    now: Instant,
) -> Result<NewSubscriber, NewsletterOutcome> {
    if !form.hp.trim().is_empty() {
        return Err(NewsletterOutcome::Spam);
    }

    if !rate_limiter.check_and_record(client, now) {
        return Err(NewsletterOutcome::RateLimit);
    }

    NewSubscriber::parse(&form.newsletter_email, form.source.clone())
        .map_err(|_| NewsletterOutcome::Invalid)
}

/// Stores `new_subscriber` unless the address is already on the list.
///
/// Storage failures are logged here and reported as `Failed`.
#[tracing::instrument(
    name = "Registering a newsletter subscriber",
    skip(pool, new_subscriber),
    fields(subscriber_email = %new_subscriber.email)
)]
pub async fn register_subscriber(
    pool: &PgPool,
    new_subscriber: &NewSubscriber,
) -> NewsletterOutcome {
    match find_subscriber_id(pool, &new_subscriber.email).await {
        Ok(Some(_)) => return NewsletterOutcome::Exists,
        Ok(None) => {}
        Err(e) => {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "Failed to look up an existing newsletter subscriber"
            );
            return NewsletterOutcome::Failed;
        }
    }

    save_subscriber(pool, new_subscriber).await
}

/// Inserts `new_subscriber` without looking it up first. A unique violation
/// means another submission stored the same address, which is `Exists`.
pub async fn save_subscriber(pool: &PgPool, new_subscriber: &NewSubscriber) -> NewsletterOutcome {
    match insert_subscriber(pool, new_subscriber).await {
        Ok(()) => NewsletterOutcome::Subscribed,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            tracing::warn!(
                error.message = %e,
                "Newsletter subscriber was inserted concurrently"
            );
            NewsletterOutcome::Exists
        }
        Err(e) => {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "Failed to save a new newsletter subscriber"
            );
            NewsletterOutcome::Failed
        }
    }
}

#[tracing::instrument(name = "Looking up newsletter subscriber by email", skip(pool))]
async fn find_subscriber_id(
    pool: &PgPool,
    email: &SubscriberEmail,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT id FROM newsletter_subscribers WHERE email = $1
        "#,
    )
    .bind(email.as_ref())
    .fetch_optional(pool)
    .await
}

#[tracing::instrument(name = "Saving new newsletter subscriber", skip(pool, new_subscriber))]
async fn insert_subscriber(
    pool: &PgPool,
    new_subscriber: &NewSubscriber,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO newsletter_subscribers (email, source)
        VALUES ($1, $2)
        "#,
    )
    .bind(new_subscriber.email.as_ref())
    .bind(new_subscriber.source.as_deref())
    .execute(pool)
    .await?;

    Ok(())
}

/// Peer address first, then the first `X-Forwarded-For` hop, then whatever the
/// connection info reports.
pub fn client_identifier(req: &HttpRequest) -> String {
    if let Some(addr) = req.peer_addr() {
        return addr.ip().to_string();
    }

    let forwarded_for = req
        .headers()
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(client) = forwarded_for {
        return client.to_owned();
    }

    req.connection_info()
        .peer_addr()
        .map(str::to_owned)
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_owned())
}

fn referer(req: &HttpRequest) -> &str {
    req.headers()
        .get(REFERER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or("/")
}

fn outcome_location(referer: &str, outcome: NewsletterOutcome) -> String {
    format!("{referer}?newsletter={}", outcome.as_str())
}
