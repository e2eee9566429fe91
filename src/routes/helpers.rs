use std::collections::HashMap;
use std::error::Error;

use actix_web::{
    HttpResponse,
    http::{StatusCode, header::ContentType, header::LOCATION},
};
use anyhow::Context;

pub fn error_chain_fmt(e: &impl Error, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    writeln!(f, "{e}\n")?;
    let mut current = e.source();

    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{cause}")?;
        current = cause.source();
    }

    Ok(())
}

pub fn e500<T>(e: T) -> actix_web::Error
where
    T: std::fmt::Debug + std::fmt::Display + 'static,
{
    actix_web::error::ErrorInternalServerError(e)
}

pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, location))
        .finish()
}

const SERVER_ERROR_MESSAGE: &str = "Internal server error";

/// Page templates, compiled once at startup.
pub struct Templates(tera::Tera);

impl Templates {
    pub fn load(views_dir: &str) -> Result<Self, anyhow::Error> {
        let glob = format!("{}/**/*", views_dir.trim_end_matches('/'));
        let tera = tera::Tera::new(&glob)
            .with_context(|| format!("Failed to load page templates from {views_dir}"))?;
        Ok(Self(tera))
    }

    pub fn render(&self, template_name: &str, ctx: &tera::Context) -> Result<String, tera::Error> {
        self.0.render(template_name, ctx)
    }

    /// Renders `template_name` with `status`. If that fails the home page is
    /// rendered instead, with an error banner and a 500.
    pub fn render_page(
        &self,
        status: StatusCode,
        template_name: &str,
        ctx: &tera::Context,
    ) -> Result<HttpResponse, actix_web::Error> {
        match self.render(template_name, ctx) {
            Ok(page) => Ok(html_page(status, page)),
            Err(e) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    template = template_name,
                    "Failed to render page"
                );
                self.server_error_page(ctx)
            }
        }
    }

    fn server_error_page(&self, ctx: &tera::Context) -> Result<HttpResponse, actix_web::Error> {
        let mut error_ctx = tera::Context::new();
        match ctx.get("query") {
            Some(query) => error_ctx.insert("query", query),
            None => error_ctx.insert("query", &HashMap::<String, String>::new()),
        }
        error_ctx.insert("error", SERVER_ERROR_MESSAGE);

        let page = self.render("index.html", &error_ctx).map_err(e500)?;
        Ok(html_page(StatusCode::INTERNAL_SERVER_ERROR, page))
    }
}

fn html_page(status: StatusCode, page: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(page)
}
