use chrono::NaiveDate;

use crate::domain::{DEFAULT_PROJECT_STATUS, NewProject, ProjectName};

#[derive(serde::Deserialize, Debug, Default)]
pub struct ProjectPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub technologies: Option<String>,
    pub status: Option<String>,
    pub project_date: Option<NaiveDate>,
    pub image_url: Option<String>,
}

fn required(value: Option<String>) -> Result<String, String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| "Missing required fields".to_string())
}

impl TryFrom<ProjectPayload> for NewProject {
    type Error = String;

    fn try_from(value: ProjectPayload) -> Result<Self, Self::Error> {
        let name = required(value.name)?;
        let description = required(value.description)?;
        let technologies = required(value.technologies)?;
        let image_url = required(value.image_url)?;
        let project_date = value
            .project_date
            .ok_or_else(|| "Missing required fields".to_string())?;
        let status = value
            .status
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PROJECT_STATUS.to_string());

        Ok(Self {
            name: ProjectName::parse(name)?,
            description,
            technologies,
            status,
            project_date,
            image_url,
        })
    }
}

/// Envelope shared by every `/api/projects` response.
#[derive(serde::Serialize, Debug)]
pub struct ApiResponse<T: serde::Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            id: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            id: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            id: None,
        }
    }

    pub fn created(message: impl Into<String>, id: i64) -> Self {
        Self {
            id: Some(id),
            ..Self::message(message)
        }
    }
}
