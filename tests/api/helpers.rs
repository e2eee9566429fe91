use once_cell::sync::Lazy;
use portfolio::{
    configuration::{DatabaseSettings, get_configuration},
    startup::{Application, get_connection_pool},
    telemetry::{get_subscriber, init_subscriber},
};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use uuid::Uuid;

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub async fn post_newsletter<Body>(
        &self,
        body: &Body,
        referer: Option<&str>,
    ) -> reqwest::Response
    where
        Body: serde::Serialize + ?Sized,
    {
        let mut request = self
            .api_client
            .post(format!("{}/newsletter", &self.address))
            .form(body);
        if let Some(referer) = referer {
            request = request.header("Referer", referer);
        }
        request.send().await.expect("Failed to execute request.")
    }

    pub async fn subscribe(&self, email: &str) -> reqwest::Response {
        self.post_newsletter(
            &[("newsletter_email", email), ("hp", ""), ("source", "footer")],
            Some("/"),
        )
        .await
    }

    pub async fn post_contact<Body>(&self, body: &Body) -> reqwest::Response
    where
        Body: serde::Serialize + ?Sized,
    {
        self.api_client
            .post(format!("{}/contact", &self.address))
            .form(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.api_client
            .get(format!("{}{}", &self.address, path))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_html(&self, path: &str) -> String {
        self.get(path).await.text().await.unwrap()
    }

    pub async fn post_project(&self, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(format!("{}/api/projects", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn put_project(&self, id: i64, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .put(format!("{}/api/projects/{}", &self.address, id))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn delete_project(&self, id: i64) -> reqwest::Response {
        self.api_client
            .delete(format!("{}/api/projects/{}", &self.address, id))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Creates a project through the API and returns its id.
    pub async fn create_project(&self, name: &str, project_date: &str) -> i64 {
        let response = self
            .post_project(&serde_json::json!({
                "name": name,
                "description": "A project used in tests",
                "technologies": "Rust, Postgres",
                "project_date": project_date,
                "image_url": "/img/test.png"
            }))
            .await;
        assert_eq!(response.status().as_u16(), 201);

        let body: serde_json::Value = response.json().await.unwrap();
        body["id"].as_i64().expect("Created project has no id")
    }

    pub async fn subscriber_emails(&self) -> Vec<String> {
        sqlx::query_scalar::<_, String>("SELECT email FROM newsletter_subscribers ORDER BY id")
            .fetch_all(&self.db_pool)
            .await
            .expect("Failed to fetch saved subscribers")
    }
}

pub async fn configure_database(config: &DatabaseSettings) -> PgPool {
    let mut connection = PgConnection::connect_with(&config.without_db())
        .await
        .expect("Failed to connect to Postgres");

    connection
        .execute(format!(r#"CREATE DATABASE "{}";"#, config.database_name).as_str())
        .await
        .expect("Failed to create database");

    let connection_pool = PgPool::connect_with(config.with_db())
        .await
        .expect("Failed to connect to Postgres");

    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate database");

    connection_pool
}

pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    let config = {
        let mut config = get_configuration().expect("Failed to read configuration");
        config.database.database_name = Uuid::new_v4().to_string();
        config.app.port = 0;
        config
    };

    configure_database(&config.database).await;

    let application = Application::build(config.clone())
        .await
        .expect("Failed to build application.");
    let port = application.get_port();
    let _ = tokio::spawn(application.run_until_stopped());

    let api_client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        address: format!("http://127.0.0.1:{port}"),
        db_pool: get_connection_pool(&config.database),
        api_client,
    }
}

pub fn assert_is_redirect_to(response: &reqwest::Response, location: &str) {
    assert_eq!(response.status().as_u16(), 303);
    assert_eq!(response.headers().get("Location").unwrap(), location);
}
