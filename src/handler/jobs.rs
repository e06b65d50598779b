use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::jobdb::JobExt,
    dtos::jobdtos::*,
    error::HttpError,
    middleware::JWTAuthMiddeware,
    service::matching_service::DEFAULT_MATCH_LIMIT,
    AppState,
};

pub fn jobs_handler() -> Router {
    Router::new()
        .route("/", post(create_job).get(list_jobs))
        .route("/search", get(search_jobs))
        .route("/my-matches", get(my_matches))
        .route("/my-jobs", get(my_jobs))
        .route("/:job_id/apply", post(apply_to_job))
        .route("/:job_id/cancel-application", delete(cancel_application))
        .route("/:job_id/invite", post(invite_worker))
        .route("/:job_id/accept-invitation", post(accept_invitation))
        .route("/:job_id/decline-invitation", post(decline_invitation))
        .route("/:job_id/assign", post(assign_worker))
        .route("/:job_id/reject", post(reject_application))
        .route("/:job_id/applicants/:user_id", put(update_applicant_status))
        .route("/:job_id/close", put(close_job))
        .route("/:job_id/complete", put(complete_job))
        .route("/:job_id", put(edit_job).delete(delete_job))
        .route(
            "/:job_id/payments",
            post(crate::handler::payments::initiate_payment),
        )
}

pub async fn create_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state.job_service.post_job(&auth.user, body).await?;

    Ok(Json(ApiResponse::success("Job posted successfully", job)))
}

pub async fn list_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let jobs = app_state
        .db_client
        .get_open_jobs()
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Open jobs", jobs)))
}

pub async fn search_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<SearchJobsDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let limit = query.limit.unwrap_or(20);
    let offset = (query.page.unwrap_or(1) - 1) * limit;

    let jobs = app_state
        .db_client
        .search_jobs(query.barangay, query.skill, query.keyword, limit, offset)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Search results", jobs)))
}

pub async fn my_matches(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<MatchQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let limit = query.limit.unwrap_or(DEFAULT_MATCH_LIMIT);
    let matches = app_state
        .matching_service
        .find_matching_jobs(&auth.user, limit)
        .await?;

    Ok(Json(ApiResponse::success("Matching jobs", matches)))
}

pub async fn my_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let jobs = app_state
        .db_client
        .get_jobs_by_employer(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Your jobs", jobs)))
}

pub async fn apply_to_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let application = app_state.job_service.apply(&auth.user, job_id).await?;

    Ok(Json(ApiResponse::success("Application sent", application)))
}

pub async fn cancel_application(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .job_service
        .cancel_application(&auth.user, job_id)
        .await?;

    Ok(Json(ApiResponse::<()>::message("Application cancelled")))
}

pub async fn invite_worker(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
    Json(body): Json<InviteWorkerDto>,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .job_service
        .invite(&auth.user, job_id, body.invitee_id)
        .await?;

    Ok(Json(ApiResponse::<()>::message("Invitation sent")))
}

pub async fn accept_invitation(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let application = app_state
        .job_service
        .accept_invitation(&auth.user, job_id)
        .await?;

    Ok(Json(ApiResponse::success("Invitation accepted", application)))
}

pub async fn decline_invitation(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .job_service
        .decline_invitation(&auth.user, job_id)
        .await?;

    Ok(Json(ApiResponse::<()>::message("Invitation declined")))
}

pub async fn assign_worker(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
    Json(body): Json<AssignWorkerDto>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state
        .job_service
        .assign_worker(&auth.user, job_id, body.worker_id)
        .await?;

    Ok(Json(ApiResponse::success("Worker assigned", job)))
}

pub async fn reject_application(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
    Json(body): Json<AssignWorkerDto>,
) -> Result<impl IntoResponse, HttpError> {
    let application = app_state
        .job_service
        .reject_application(&auth.user, job_id, body.worker_id)
        .await?;

    Ok(Json(ApiResponse::success("Application rejected", application)))
}

pub async fn update_applicant_status(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path((job_id, user_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateApplicantStatusDto>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state
        .job_service
        .update_applicant_status(&auth.user, job_id, user_id, body.status)
        .await?;

    Ok(Json(ApiResponse::success("Applicant status updated", job)))
}

pub async fn close_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.job_service.close_job(&auth.user, job_id).await?;

    Ok(Json(ApiResponse::success("Job closed", job)))
}

/// Completion takes an optional multipart `proof` image. With a file the
/// manual path runs; a bare PUT (no multipart body) relies on a settled
/// gateway payment already on record.
pub async fn complete_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
    multipart: Option<Multipart>,
) -> Result<impl IntoResponse, HttpError> {
    let proof_uri = match multipart {
        Some(multipart) => save_proof_upload(&app_state, job_id, multipart).await?,
        None => None,
    };

    let job = app_state
        .job_service
        .complete_job(&auth.user, job_id, proof_uri)
        .await?;

    Ok(Json(ApiResponse::success("Job completed", job)))
}

async fn save_proof_upload(
    app_state: &AppState,
    job_id: Uuid,
    mut multipart: Multipart,
) -> Result<Option<String>, HttpError> {
    let mut proof_uri = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HttpError::bad_request(e.to_string()))?
    {
        if field.name() != Some("proof") {
            continue;
        }

        let extension = field
            .file_name()
            .and_then(|f| f.rsplit('.').next().map(str::to_owned))
            .unwrap_or_else(|| "jpg".to_string());

        let data = field
            .bytes()
            .await
            .map_err(|e| HttpError::bad_request(e.to_string()))?;
        if data.is_empty() {
            continue;
        }

        let filename = format!("{}-{}.{}", job_id, Uuid::new_v4(), extension);
        let dir = &app_state.env.upload_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?;
        tokio::fs::write(format!("{}/{}", dir, filename), &data)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?;

        proof_uri = Some(format!("/uploads/{}", filename));
    }

    Ok(proof_uri)
}

pub async fn edit_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
    Json(body): Json<UpdateJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state
        .job_service
        .edit_job(&auth.user, job_id, body)
        .await?;

    Ok(Json(ApiResponse::success("Job updated", job)))
}

/// Always answers 200 on success, including repeat deletions.
pub async fn delete_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    app_state.job_service.delete_job(&auth.user, job_id).await?;

    Ok(Json(ApiResponse::<()>::message("Job deleted")))
}
