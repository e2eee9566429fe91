use portfolio::domain::NewSubscriber;
use portfolio::routes::newsletter::{NewsletterOutcome, register_subscriber, save_subscriber};

use crate::helpers::{assert_is_redirect_to, spawn_app};

#[tokio::test]
async fn new_subscriber_is_stored_and_redirected_with_ok() {
    let app = spawn_app().await;

    let response = app
        .post_newsletter(
            &[("newsletter_email", "new@site.com"), ("source", "footer")],
            Some("/about"),
        )
        .await;

    assert_is_redirect_to(&response, "/about?newsletter=ok");

    let saved = sqlx::query_as::<_, (String, Option<String>)>(
        "SELECT email, source FROM newsletter_subscribers",
    )
    .fetch_one(&app.db_pool)
    .await
    .expect("Failed to fetch saved subscriber");

    assert_eq!(saved.0, "new@site.com");
    assert_eq!(saved.1.as_deref(), Some("footer"));
}

#[tokio::test]
async fn missing_source_is_stored_as_null() {
    let app = spawn_app().await;

    let response = app
        .post_newsletter(&[("newsletter_email", "new@site.com")], Some("/"))
        .await;
    assert_is_redirect_to(&response, "/?newsletter=ok");

    let source =
        sqlx::query_scalar::<_, Option<String>>("SELECT source FROM newsletter_subscribers")
            .fetch_one(&app.db_pool)
            .await
            .expect("Failed to fetch saved subscriber");
    assert!(source.is_none());
}

#[tokio::test]
async fn missing_referer_redirects_to_the_home_page() {
    let app = spawn_app().await;

    let response = app
        .post_newsletter(&[("newsletter_email", "new@site.com")], None)
        .await;

    assert_is_redirect_to(&response, "/?newsletter=ok");
}

#[tokio::test]
async fn subscribing_twice_yields_exists_and_a_single_row() {
    let app = spawn_app().await;

    let first = app.subscribe("twice@site.com").await;
    let second = app.subscribe("twice@site.com").await;

    assert_is_redirect_to(&first, "/?newsletter=ok");
    assert_is_redirect_to(&second, "/?newsletter=exists");
    assert_eq!(app.subscriber_emails().await, vec!["twice@site.com".to_string()]);
}

#[tokio::test]
async fn email_is_normalized_before_storage_and_duplicate_check() {
    let app = spawn_app().await;

    let first = app.subscribe("  USER@Example.com ").await;
    let second = app.subscribe("user@example.COM").await;

    assert_is_redirect_to(&first, "/?newsletter=ok");
    assert_is_redirect_to(&second, "/?newsletter=exists");
    assert_eq!(app.subscriber_emails().await, vec!["user@example.com".to_string()]);
}

#[tokio::test]
async fn malformed_emails_are_rejected_as_invalid() {
    let app = spawn_app().await;

    for email in ["", "no-at-sign", "a@b", "a@b."] {
        let response = app.subscribe(email).await;
        assert_is_redirect_to(&response, "/?newsletter=invalid");
    }

    assert!(app.subscriber_emails().await.is_empty());
}

#[tokio::test]
async fn filled_honeypot_is_treated_as_spam() {
    let app = spawn_app().await;

    let response = app
        .post_newsletter(
            &[("newsletter_email", "bot@site.com"), ("hp", "http://buy-now.example")],
            Some("/services"),
        )
        .await;

    assert_is_redirect_to(&response, "/services?newsletter=spam");
    assert!(app.subscriber_emails().await.is_empty());
}

#[tokio::test]
async fn sixth_submission_within_the_hour_is_rate_limited() {
    let app = spawn_app().await;

    for i in 0..5 {
        let response = app.subscribe(&format!("reader{i}@site.com")).await;
        assert_is_redirect_to(&response, "/?newsletter=ok");
    }

    let response = app.subscribe("reader5@site.com").await;
    assert_is_redirect_to(&response, "/?newsletter=rate_limit");
    assert_eq!(app.subscriber_emails().await.len(), 5);
}

#[tokio::test]
async fn honeypot_is_checked_before_the_rate_limit() {
    let app = spawn_app().await;
    for i in 0..5 {
        app.subscribe(&format!("reader{i}@site.com")).await;
    }

    let response = app
        .post_newsletter(
            &[("newsletter_email", "another@site.com"), ("hp", "filled")],
            Some("/"),
        )
        .await;

    assert_is_redirect_to(&response, "/?newsletter=spam");
}

#[tokio::test]
async fn rate_limit_is_checked_before_email_validation() {
    let app = spawn_app().await;
    for i in 0..5 {
        app.subscribe(&format!("reader{i}@site.com")).await;
    }

    let response = app.subscribe("not-an-email").await;

    assert_is_redirect_to(&response, "/?newsletter=rate_limit");
}

#[tokio::test]
async fn storage_failure_redirects_with_error() {
    let app = spawn_app().await;
    sqlx::query("DROP TABLE newsletter_subscribers")
        .execute(&app.db_pool)
        .await
        .unwrap();

    let response = app.subscribe("new@site.com").await;

    assert_is_redirect_to(&response, "/?newsletter=error");
}

#[tokio::test]
async fn concurrent_identical_submissions_store_a_single_row() {
    let app = spawn_app().await;

    let (first, second) = tokio::join!(
        app.subscribe("race@site.com"),
        app.subscribe("race@site.com")
    );

    let mut locations = [first, second]
        .iter()
        .map(|r| r.headers().get("Location").unwrap().to_str().unwrap().to_owned())
        .collect::<Vec<_>>();
    locations.sort();

    assert_eq!(locations, vec!["/?newsletter=exists", "/?newsletter=ok"]);
    assert_eq!(app.subscriber_emails().await, vec!["race@site.com".to_string()]);
}

#[tokio::test]
async fn insert_losing_the_race_is_reported_as_exists() {
    let app = spawn_app().await;
    let new_subscriber = NewSubscriber::parse("race@site.com", None).unwrap();

    // Both submissions found no row, so both go straight to the insert.
    let first = save_subscriber(&app.db_pool, &new_subscriber).await;
    let second = save_subscriber(&app.db_pool, &new_subscriber).await;

    assert_eq!(first, NewsletterOutcome::Subscribed);
    assert_eq!(second, NewsletterOutcome::Exists);
    assert_eq!(app.subscriber_emails().await, vec!["race@site.com".to_string()]);
}

#[tokio::test]
async fn other_insert_failures_are_reported_as_failed() {
    let app = spawn_app().await;
    sqlx::query(
        "ALTER TABLE newsletter_subscribers \
         ADD CONSTRAINT no_example CHECK (email NOT LIKE '%@example.com')",
    )
    .execute(&app.db_pool)
    .await
    .unwrap();
    let new_subscriber = NewSubscriber::parse("blocked@example.com", None).unwrap();

    assert_eq!(
        register_subscriber(&app.db_pool, &new_subscriber).await,
        NewsletterOutcome::Failed
    );
    assert_eq!(
        save_subscriber(&app.db_pool, &new_subscriber).await,
        NewsletterOutcome::Failed
    );
}

#[tokio::test]
async fn body_that_is_not_a_form_redirects_with_invalid() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .post(format!("{}/newsletter", &app.address))
        .header("Referer", "/services")
        .body("newsletter_email=new%40site.com")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_is_redirect_to(&response, "/services?newsletter=invalid");
    assert!(app.subscriber_emails().await.is_empty());
}
