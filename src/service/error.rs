use crate::{error::HttpError, models::jobmodel::JobStatus};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Job {0} not found")]
    JobNotFound(Uuid),

    #[error("User {0} not found")]
    UserNotFound(Uuid),

    #[error("No application found for this worker on job {0}")]
    ApplicationNotFound(Uuid),

    #[error("You are not allowed to perform this action on job {0}")]
    Forbidden(Uuid),

    #[error("Job {0} is {}, this action needs an open job", .1.to_str())]
    InvalidJobStatus(Uuid, JobStatus),

    #[error("Job is no longer open")]
    JobClosed,

    #[error("You have already applied to this job")]
    AlreadyApplied,

    #[error("Your application to this job was rejected; you cannot reapply")]
    ReapplyAfterRejection,

    #[error("You cannot apply to your own job")]
    OwnJobApplication,

    #[error("Your role does not permit applying to jobs")]
    NotAWorker,

    #[error("Your role does not permit posting jobs")]
    NotAnEmployer,

    #[error("No invitation found for this job")]
    NoInvitation,

    #[error("This user cannot be invited to work")]
    NotInvitable,

    #[error("An invitation for this worker was already sent")]
    DuplicateInvitation,

    #[error("A worker is already assigned to this job")]
    AlreadyAssigned,

    #[error("Job is already completed")]
    AlreadyCompleted,

    #[error("No worker assigned")]
    NoWorkerAssigned,

    #[error("Payment proof is required to complete this job")]
    MissingPaymentProof,

    #[error("A payment for this job is already in progress")]
    DuplicateActivePayment,

    #[error("Only a pending application can be cancelled")]
    ApplicationNotPending,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payment gateway error: {message}")]
    Gateway { message: String, retryable: bool },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Notification error: {0}")]
    Notification(String),
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        match &error {
            ServiceError::JobNotFound(_)
            | ServiceError::UserNotFound(_)
            | ServiceError::ApplicationNotFound(_) => HttpError::not_found(error.to_string()),

            ServiceError::Forbidden(_)
            | ServiceError::NotAWorker
            | ServiceError::NotAnEmployer => HttpError::forbidden(error.to_string()),

            ServiceError::NoInvitation => HttpError::not_found(error.to_string()),

            ServiceError::InvalidJobStatus(_, _)
            | ServiceError::JobClosed
            | ServiceError::AlreadyApplied
            | ServiceError::ReapplyAfterRejection
            | ServiceError::OwnJobApplication
            | ServiceError::NotInvitable
            | ServiceError::DuplicateInvitation
            | ServiceError::AlreadyAssigned
            | ServiceError::AlreadyCompleted
            | ServiceError::NoWorkerAssigned
            | ServiceError::MissingPaymentProof
            | ServiceError::DuplicateActivePayment
            | ServiceError::ApplicationNotPending
            | ServiceError::Validation(_) => HttpError::bad_request(error.to_string()),

            ServiceError::Gateway { retryable, .. } => {
                HttpError::gateway(error.to_string(), *retryable)
            }

            _ => HttpError::server_error(error.to_string()),
        }
    }
}
