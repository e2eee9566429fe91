mod contact;
mod health_check;
pub mod helpers;
pub mod newsletter;
mod pages;
pub mod projects;

pub use contact::{ContactForm, contact};
pub use health_check::health_check;
pub use helpers::{Templates, e500, error_chain_fmt, see_other};
pub use newsletter::{newsletter_form_config, newsletter_signup};
pub use pages::{about, contact_page, home, not_found, portfolio, project_detail, services};
pub use projects::{create_project, delete_project, get_project, list_projects, update_project};
