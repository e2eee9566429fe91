use actix_web::{HttpResponse, web};
use anyhow::Context;
use sqlx::PgPool;

use super::{
    errors::ProjectError,
    types::{ApiResponse, ProjectPayload},
};
use crate::domain::{NewProject, Project};

#[tracing::instrument(name = "List projects", skip(db_pool))]
pub async fn list_projects(db_pool: web::Data<PgPool>) -> Result<HttpResponse, ProjectError> {
    let projects = fetch_projects(&db_pool)
        .await
        .context("Failed to fetch projects.")?;

    Ok(HttpResponse::Ok().json(ApiResponse::data(projects)))
}

#[tracing::instrument(name = "Get project", skip(db_pool))]
pub async fn get_project(
    path: web::Path<i64>,
    db_pool: web::Data<PgPool>,
) -> Result<HttpResponse, ProjectError> {
    let project = fetch_project(&db_pool, path.into_inner())
        .await
        .context("Failed to fetch the project.")?
        .ok_or(ProjectError::NotFound)?;

    Ok(HttpResponse::Ok().json(ApiResponse::data(project)))
}

#[tracing::instrument(
    name = "Create project",
    skip(payload, db_pool),
    fields(project_name = tracing::field::Empty)
)]
pub async fn create_project(
    payload: web::Json<ProjectPayload>,
    db_pool: web::Data<PgPool>,
) -> Result<HttpResponse, ProjectError> {
    let new_project: NewProject = payload
        .into_inner()
        .try_into()
        .map_err(ProjectError::ValidationError)?;
    tracing::Span::current().record("project_name", new_project.name.as_ref());

    let id = insert_project(&db_pool, &new_project)
        .await
        .context("Failed to create the project.")?;

    Ok(HttpResponse::Created().json(ApiResponse::created("Project created", id)))
}

#[tracing::instrument(name = "Update project", skip(payload, db_pool))]
pub async fn update_project(
    path: web::Path<i64>,
    payload: web::Json<ProjectPayload>,
    db_pool: web::Data<PgPool>,
) -> Result<HttpResponse, ProjectError> {
    let project: NewProject = payload
        .into_inner()
        .try_into()
        .map_err(ProjectError::ValidationError)?;

    let affected = store_project(&db_pool, path.into_inner(), &project)
        .await
        .context("Failed to update the project.")?;
    if affected == 0 {
        return Err(ProjectError::NotFound);
    }

    Ok(HttpResponse::Ok().json(ApiResponse::message("Project updated")))
}

#[tracing::instrument(name = "Delete project", skip(db_pool))]
pub async fn delete_project(
    path: web::Path<i64>,
    db_pool: web::Data<PgPool>,
) -> Result<HttpResponse, ProjectError> {
    let affected = remove_project(&db_pool, path.into_inner())
        .await
        .context("Failed to delete the project.")?;
    if affected == 0 {
        return Err(ProjectError::NotFound);
    }

    Ok(HttpResponse::Ok().json(ApiResponse::message("Project deleted")))
}

#[tracing::instrument(name = "Fetching all projects", skip(pool))]
pub async fn fetch_projects(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        r#"
        SELECT id, name, description, technologies, status, project_date, image_url, created_at
        FROM projects
        ORDER BY project_date DESC, id DESC
        "#,
    )
    .fetch_all(pool)
    .await
}

#[tracing::instrument(name = "Fetching a project", skip(pool))]
pub async fn fetch_project(pool: &PgPool, id: i64) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        r#"
        SELECT id, name, description, technologies, status, project_date, image_url, created_at
        FROM projects
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

#[tracing::instrument(name = "Saving a new project", skip(pool, project))]
async fn insert_project(pool: &PgPool, project: &NewProject) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO projects (name, description, technologies, status, project_date, image_url)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(project.name.as_ref())
    .bind(&project.description)
    .bind(&project.technologies)
    .bind(&project.status)
    .bind(project.project_date)
    .bind(&project.image_url)
    .fetch_one(pool)
    .await
}

#[tracing::instrument(name = "Updating a project", skip(pool, project))]
async fn store_project(pool: &PgPool, id: i64, project: &NewProject) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE projects
        SET name = $1, description = $2, technologies = $3, status = $4,
            project_date = $5, image_url = $6
        WHERE id = $7
        "#,
    )
    .bind(project.name.as_ref())
    .bind(&project.description)
    .bind(&project.technologies)
    .bind(&project.status)
    .bind(project.project_date)
    .bind(&project.image_url)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

#[tracing::instrument(name = "Deleting a project", skip(pool))]
async fn remove_project(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
