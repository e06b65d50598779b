use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::jobmodel::ApplicationStatus;

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct CreateJobDto {
    #[validate(length(min = 1, max = 100, message = "Title must be between 1-100 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 2000, message = "Description is required"))]
    pub description: String,

    #[validate(length(min = 1, message = "At least one required skill is needed"))]
    pub required_skills: Vec<String>,

    #[validate(length(min = 1, max = 100, message = "Barangay is required"))]
    pub barangay: String,

    #[validate(range(min = 0.01, message = "Price must be positive"))]
    pub price: f64,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateJobDto {
    #[validate(length(min = 1, max = 100, message = "Title must be between 1-100 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 2000, message = "Description cannot be empty"))]
    pub description: Option<String>,

    #[validate(length(min = 1, message = "At least one required skill is needed"))]
    pub required_skills: Option<Vec<String>>,

    #[validate(length(min = 1, max = 100, message = "Barangay cannot be empty"))]
    pub barangay: Option<String>,

    #[validate(range(min = 0.01, message = "Price must be positive"))]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteWorkerDto {
    pub invitee_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignWorkerDto {
    pub worker_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateApplicantStatusDto {
    pub status: ApplicationStatus,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct SearchJobsDto {
    pub barangay: Option<String>,
    pub skill: Option<String>,
    pub keyword: Option<String>,
    #[validate(range(min = 1))]
    pub page: Option<i64>,
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<i64>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct MatchQueryDto {
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn message(message: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            status: "success".to_string(),
            message: message.into(),
            data: None,
        }
    }
}
