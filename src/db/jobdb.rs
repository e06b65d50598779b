// db/jobdb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::BigDecimal;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::jobmodel::*;

pub(crate) const JOB_COLUMNS: &str = r#"
    id, employer_id, title, description, required_skills, barangay, price,
    is_open, status, completed, assigned_to, payment_proof, completed_at,
    is_deleted, deleted_at, created_at, updated_at
"#;

/// Job and application persistence.
///
/// Soft-deleted jobs are filtered out of every read by an explicit
/// `is_deleted = FALSE` predicate in each query; the single override is
/// `get_job_any`, used by delete/admin paths that must see tombstones.
#[async_trait]
pub trait JobExt {
    async fn create_job(
        &self,
        employer_id: Uuid,
        title: String,
        description: String,
        required_skills: Vec<String>,
        barangay: String,
        price: BigDecimal,
    ) -> Result<Job, Error>;

    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, Error>;

    /// Includes soft-deleted rows. Call sites must opt in explicitly.
    async fn get_job_any(&self, job_id: Uuid) -> Result<Option<Job>, Error>;

    async fn get_open_jobs(&self) -> Result<Vec<Job>, Error>;

    async fn search_jobs(
        &self,
        barangay: Option<String>,
        skill: Option<String>,
        keyword: Option<String>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Job>, Error>;

    async fn get_jobs_by_employer(&self, employer_id: Uuid) -> Result<Vec<Job>, Error>;

    async fn update_job_fields(
        &self,
        job_id: Uuid,
        title: String,
        description: String,
        required_skills: Vec<String>,
        barangay: String,
        price: BigDecimal,
    ) -> Result<Job, Error>;

    async fn close_job(&self, job_id: Uuid) -> Result<Job, Error>;

    /// Assign a worker and dispose of the applicant ledger in one
    /// transaction. The job update is conditional on `assigned_to` still
    /// being NULL; returns `Ok(None)` when another assignment won the race.
    async fn assign_worker(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
        accepted_application_id: Uuid,
        rejected_application_ids: &[Uuid],
    ) -> Result<Option<Job>, Error>;

    /// Conditional completion: no-op (None) when the job is already
    /// completed or has no assigned worker.
    async fn complete_job(
        &self,
        job_id: Uuid,
        payment_proof: String,
        completed_at: DateTime<Utc>,
    ) -> Result<Option<Job>, Error>;

    /// Soft delete. Returns the job as it was if a live row was tombstoned;
    /// `Ok(None)` when the job was already deleted or never existed.
    async fn soft_delete_job(&self, job_id: Uuid) -> Result<Option<Job>, Error>;

    // Application sub-ledger
    async fn create_application(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
    ) -> Result<JobApplication, Error>;

    async fn get_applications(&self, job_id: Uuid) -> Result<Vec<JobApplication>, Error>;

    async fn get_application(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
    ) -> Result<Option<JobApplication>, Error>;

    async fn delete_application(&self, application_id: Uuid) -> Result<(), Error>;

    async fn set_application_status(
        &self,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<JobApplication, Error>;
}

#[async_trait]
impl JobExt for DBClient {
    async fn create_job(
        &self,
        employer_id: Uuid,
        title: String,
        description: String,
        required_skills: Vec<String>,
        barangay: String,
        price: BigDecimal,
    ) -> Result<Job, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            INSERT INTO jobs (employer_id, title, description, required_skills, barangay, price)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(employer_id)
        .bind(title)
        .bind(description)
        .bind(required_skills)
        .bind(barangay)
        .bind(price)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1 AND is_deleted = FALSE"#
        ))
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_job_any(&self, job_id: Uuid) -> Result<Option<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"#
        ))
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_open_jobs(&self) -> Result<Vec<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            SELECT {JOB_COLUMNS} FROM jobs
            WHERE is_open = TRUE AND is_deleted = FALSE
            ORDER BY created_at DESC
            "#
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn search_jobs(
        &self,
        barangay: Option<String>,
        skill: Option<String>,
        keyword: Option<String>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            SELECT {JOB_COLUMNS} FROM jobs
            WHERE is_deleted = FALSE
              AND is_open = TRUE
              AND ($1::TEXT IS NULL OR barangay = $1)
              AND ($2::TEXT IS NULL OR $2 = ANY(required_skills))
              AND ($3::TEXT IS NULL OR title ILIKE '%' || $3 || '%' OR description ILIKE '%' || $3 || '%')
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(barangay)
        .bind(skill)
        .bind(keyword)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_jobs_by_employer(&self, employer_id: Uuid) -> Result<Vec<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            SELECT {JOB_COLUMNS} FROM jobs
            WHERE employer_id = $1 AND is_deleted = FALSE
            ORDER BY created_at DESC
            "#
        ))
        .bind(employer_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_job_fields(
        &self,
        job_id: Uuid,
        title: String,
        description: String,
        required_skills: Vec<String>,
        barangay: String,
        price: BigDecimal,
    ) -> Result<Job, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET title = $2, description = $3, required_skills = $4,
                barangay = $5, price = $6, updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(job_id)
        .bind(title)
        .bind(description)
        .bind(required_skills)
        .bind(barangay)
        .bind(price)
        .fetch_one(&self.pool)
        .await
    }

    async fn close_job(&self, job_id: Uuid) -> Result<Job, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET is_open = FALSE, status = 'closed', updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(job_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn assign_worker(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
        accepted_application_id: Uuid,
        rejected_application_ids: &[Uuid],
    ) -> Result<Option<Job>, Error> {
        let mut tx = self.pool.begin().await?;

        let job = sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET assigned_to = $2, is_open = FALSE, status = 'assigned', updated_at = NOW()
            WHERE id = $1 AND assigned_to IS NULL AND is_deleted = FALSE
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(job_id)
        .bind(worker_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(job) = job else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            r#"UPDATE job_applications SET status = 'accepted' WHERE id = $1"#,
        )
        .bind(accepted_application_id)
        .execute(&mut *tx)
        .await?;

        if !rejected_application_ids.is_empty() {
            sqlx::query(
                r#"UPDATE job_applications SET status = 'rejected' WHERE id = ANY($1)"#,
            )
            .bind(rejected_application_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Some(job))
    }

    async fn complete_job(
        &self,
        job_id: Uuid,
        payment_proof: String,
        completed_at: DateTime<Utc>,
    ) -> Result<Option<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET completed = TRUE, completed_at = $3, status = 'completed',
                is_open = FALSE, payment_proof = $2, updated_at = NOW()
            WHERE id = $1 AND completed = FALSE AND assigned_to IS NOT NULL
              AND is_deleted = FALSE
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(job_id)
        .bind(payment_proof)
        .bind(completed_at)
        .fetch_optional(&self.pool)
        .await
    }

    async fn soft_delete_job(&self, job_id: Uuid) -> Result<Option<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET is_deleted = TRUE, deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_application(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
    ) -> Result<JobApplication, Error> {
        sqlx::query_as::<_, JobApplication>(
            r#"
            INSERT INTO job_applications (job_id, worker_id)
            VALUES ($1, $2)
            RETURNING id, job_id, worker_id, status, applied_at
            "#,
        )
        .bind(job_id)
        .bind(worker_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_applications(&self, job_id: Uuid) -> Result<Vec<JobApplication>, Error> {
        sqlx::query_as::<_, JobApplication>(
            r#"
            SELECT id, job_id, worker_id, status, applied_at
            FROM job_applications
            WHERE job_id = $1
            ORDER BY applied_at ASC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_application(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
    ) -> Result<Option<JobApplication>, Error> {
        sqlx::query_as::<_, JobApplication>(
            r#"
            SELECT id, job_id, worker_id, status, applied_at
            FROM job_applications
            WHERE job_id = $1 AND worker_id = $2
            "#,
        )
        .bind(job_id)
        .bind(worker_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_application(&self, application_id: Uuid) -> Result<(), Error> {
        sqlx::query(r#"DELETE FROM job_applications WHERE id = $1"#)
            .bind(application_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_application_status(
        &self,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<JobApplication, Error> {
        sqlx::query_as::<_, JobApplication>(
            r#"
            UPDATE job_applications
            SET status = $2
            WHERE id = $1
            RETURNING id, job_id, worker_id, status, applied_at
            "#,
        )
        .bind(application_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
    }
}
