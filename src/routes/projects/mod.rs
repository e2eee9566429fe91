mod errors;
mod handlers;
mod types;

pub use errors::ProjectError;
pub use handlers::{
    create_project, delete_project, fetch_project, fetch_projects, get_project, list_projects,
    update_project,
};
pub use types::{ApiResponse, ProjectPayload};
