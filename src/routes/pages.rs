use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse, http::StatusCode, web};
use sqlx::PgPool;

use super::helpers::Templates;
use super::projects::{fetch_project, fetch_projects};

type QueryParams = web::Query<HashMap<String, String>>;

fn page_context(query: &HashMap<String, String>) -> tera::Context {
    let mut ctx = tera::Context::new();
    ctx.insert("query", query);
    ctx
}

async fn static_page(
    template_name: &str,
    query: QueryParams,
    templates: web::Data<Templates>,
) -> Result<HttpResponse, actix_web::Error> {
    templates.render_page(StatusCode::OK, template_name, &page_context(&query))
}

pub async fn home(
    query: QueryParams,
    templates: web::Data<Templates>,
) -> Result<HttpResponse, actix_web::Error> {
    static_page("index.html", query, templates).await
}

pub async fn about(
    query: QueryParams,
    templates: web::Data<Templates>,
) -> Result<HttpResponse, actix_web::Error> {
    static_page("about.html", query, templates).await
}

pub async fn services(
    query: QueryParams,
    templates: web::Data<Templates>,
) -> Result<HttpResponse, actix_web::Error> {
    static_page("services.html", query, templates).await
}

pub async fn contact_page(
    query: QueryParams,
    templates: web::Data<Templates>,
) -> Result<HttpResponse, actix_web::Error> {
    static_page("contact.html", query, templates).await
}

#[tracing::instrument(name = "Portfolio page", skip_all)]
pub async fn portfolio(
    query: QueryParams,
    templates: web::Data<Templates>,
    db_pool: web::Data<PgPool>,
) -> Result<HttpResponse, actix_web::Error> {
    let projects = fetch_projects(&db_pool).await.unwrap_or_else(|e| {
        tracing::error!(
            error.cause_chain = ?e,
            error.message = %e,
            "Failed to load projects for the portfolio page"
        );
        Vec::new()
    });

    let mut ctx = page_context(&query);
    ctx.insert("projects", &projects);
    templates.render_page(StatusCode::OK, "portfolio.html", &ctx)
}

/// An id that is not a number names no project, same as an unknown one.
#[tracing::instrument(name = "Project detail page", skip(query, templates, db_pool))]
pub async fn project_detail(
    path: web::Path<String>,
    query: QueryParams,
    templates: web::Data<Templates>,
    db_pool: web::Data<PgPool>,
) -> Result<HttpResponse, actix_web::Error> {
    let project = match path.parse::<i64>() {
        Ok(id) => fetch_project(&db_pool, id).await.unwrap_or_else(|e| {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "Failed to load the project"
            );
            None
        }),
        Err(_) => None,
    };

    let mut ctx = page_context(&query);
    if let Some(project) = project {
        ctx.insert("project", &project);
    }
    templates.render_page(StatusCode::OK, "project.html", &ctx)
}

pub async fn not_found(
    req: HttpRequest,
    templates: web::Data<Templates>,
) -> Result<HttpResponse, actix_web::Error> {
    let query = QueryParams::from_query(req.query_string())
        .map(web::Query::into_inner)
        .unwrap_or_default();

    let mut ctx = page_context(&query);
    ctx.insert("error", "Page not found");
    templates.render_page(StatusCode::NOT_FOUND, "index.html", &ctx)
}
