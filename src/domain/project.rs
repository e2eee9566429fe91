use chrono::{DateTime, NaiveDate, Utc};
use unicode_segmentation::UnicodeSegmentation;

pub const DEFAULT_PROJECT_STATUS: &str = "completed";

/// A stored portfolio entry.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub technologies: String,
    pub status: String,
    pub project_date: NaiveDate,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ProjectName(String);

impl ProjectName {
    pub fn parse(s: String) -> Result<Self, String> {
        let is_empty_or_whitespace = s.trim().is_empty();
        let is_too_long = s.graphemes(true).count() > 256;

        let forbidden_characters = ['"', '<', '>', '\\', '{', '}'];
        let contains_forbidden_characters = s.chars().any(|c| forbidden_characters.contains(&c));

        if is_empty_or_whitespace || is_too_long || contains_forbidden_characters {
            Err(format!("{s} is not a valid project name."))
        } else {
            Ok(Self(s))
        }
    }
}

impl AsRef<str> for ProjectName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated create/update request for a project.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: ProjectName,
    pub description: String,
    pub technologies: String,
    pub status: String,
    pub project_date: NaiveDate,
    pub image_url: String,
}
