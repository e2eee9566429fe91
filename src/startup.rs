use crate::configuration::{DatabaseSettings, Settings};
use crate::rate_limiter::RateLimiter;
use crate::routes::{
    Templates, about, contact, contact_page, create_project, delete_project, get_project,
    health_check, home, list_projects, newsletter_form_config, newsletter_signup, not_found,
    portfolio, project_detail, services, update_project,
};
use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;
use std::time::Duration;
use tracing_actix_web::TracingLogger;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, anyhow::Error> {
        let connection_pool = get_connection_pool(&config.database);
        let rate_limiter = RateLimiter::new(config.newsletter.policy());
        let templates = Templates::load(&config.app.views_dir)?;

        let address = format!("{}:{}", config.app.host, config.app.port);
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();
        tracing::info!(port, "Portfolio server listening");

        let server = run(listener, connection_pool, rate_limiter, templates)?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    db_pool: PgPool,
    rate_limiter: RateLimiter,
    templates: Templates,
) -> Result<Server, anyhow::Error> {
    let db_pool = web::Data::new(db_pool);
    // One limiter for every worker, so the per-client budget is process wide.
    let rate_limiter = web::Data::new(rate_limiter);
    let templates = web::Data::new(templates);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .route("/", web::get().to(home))
            .route("/about", web::get().to(about))
            .route("/portfolio", web::get().to(portfolio))
            .route("/services", web::get().to(services))
            .route("/contact", web::get().to(contact_page))
            .route("/contact", web::post().to(contact))
            .route("/projects/{id}", web::get().to(project_detail))
            .service(
                web::resource("/newsletter")
                    .app_data(newsletter_form_config())
                    .route(web::post().to(newsletter_signup)),
            )
            .service(
                web::scope("/api/projects")
                    .route("", web::get().to(list_projects))
                    .route("", web::post().to(create_project))
                    .route("/{id}", web::get().to(get_project))
                    .route("/{id}", web::put().to(update_project))
                    .route("/{id}", web::delete().to(delete_project)),
            )
            .default_service(web::route().to(not_found))
            .app_data(db_pool.clone())
            .app_data(rate_limiter.clone())
            .app_data(templates.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

pub fn get_connection_pool(db_config: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(2))
        .connect_lazy_with(db_config.with_db())
}
