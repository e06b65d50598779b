use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "job_status", rename_all = "snake_case")]
pub enum JobStatus {
    Open,
    Assigned,
    Closed,
    Completed,
}

impl JobStatus {
    pub fn to_str(&self) -> &str {
        match self {
            JobStatus::Open => "open",
            JobStatus::Assigned => "assigned",
            JobStatus::Closed => "closed",
            JobStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn to_str(&self) -> &str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Job {
    pub id: Uuid,
    pub employer_id: Uuid,
    pub title: String,
    pub description: String,
    pub required_skills: Vec<String>,
    pub barangay: String,
    pub price: BigDecimal,
    pub is_open: bool,
    pub status: JobStatus,
    pub completed: bool,
    pub assigned_to: Option<Uuid>,
    pub payment_proof: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Whole days since the job was posted, floored at zero.
    pub fn age_in_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_days().max(0)
    }

    /// Descriptive fields may change until the job is completed.
    pub fn is_editable(&self) -> bool {
        !self.completed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobApplication {
    pub id: Uuid,
    pub job_id: Uuid,
    pub worker_id: Uuid,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

/// Outcome of picking one winner among a job's applicants.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicantDisposition {
    pub accepted_application_id: Uuid,
    pub rejected_application_ids: Vec<Uuid>,
}

/// Accept exactly one applicant and reject every co-applicant.
///
/// Returns `None` when the winner has no application on the job. The result
/// always leaves at most one accepted record; applicants already rejected
/// stay rejected (their ids are not re-emitted).
pub fn accept_one_reject_rest(
    applicants: &[JobApplication],
    winner_user_id: Uuid,
) -> Option<ApplicantDisposition> {
    let winner = applicants.iter().find(|a| a.worker_id == winner_user_id)?;

    let rejected = applicants
        .iter()
        .filter(|a| a.worker_id != winner_user_id && a.status != ApplicationStatus::Rejected)
        .map(|a| a.id)
        .collect();

    Some(ApplicantDisposition {
        accepted_application_id: winner.id,
        rejected_application_ids: rejected,
    })
}

/// Why a worker may not apply to a job right now.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyBlock {
    AlreadyApplied,
    RejectedBefore,
}

/// A prior pending or accepted application blocks a duplicate; an explicit
/// rejection blocks reapplying. A cancelled application leaves no record and
/// therefore no block.
pub fn check_reapplication(
    applicants: &[JobApplication],
    worker_id: Uuid,
) -> Option<ApplyBlock> {
    applicants
        .iter()
        .find(|a| a.worker_id == worker_id)
        .map(|a| match a.status {
            ApplicationStatus::Rejected => ApplyBlock::RejectedBefore,
            _ => ApplyBlock::AlreadyApplied,
        })
}

/// Why a job cannot be completed right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompletionBlock {
    AlreadyCompleted,
    NoWorkerAssigned,
}

/// A job completes at most once, and only with a worker on it. Returns the
/// assigned worker when completion may proceed.
pub fn check_completion(job: &Job) -> Result<Uuid, CompletionBlock> {
    if job.completed {
        return Err(CompletionBlock::AlreadyCompleted);
    }
    job.assigned_to.ok_or(CompletionBlock::NoWorkerAssigned)
}

/// What a delete request should do with the job it found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeleteDisposition {
    /// Already tombstoned; a repeat delete succeeds without touching anything.
    AlreadyGone,
    /// Completed jobs back the payment record, so only an admin may
    /// tombstone them.
    AdminOnly,
    /// Live job; the poster or an admin may tombstone it.
    Delete,
}

pub fn delete_disposition(job: &Job) -> DeleteDisposition {
    if job.is_deleted {
        DeleteDisposition::AlreadyGone
    } else if job.completed {
        DeleteDisposition::AdminOnly
    } else {
        DeleteDisposition::Delete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(worker: Uuid, status: ApplicationStatus) -> JobApplication {
        JobApplication {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            worker_id: worker,
            status,
            applied_at: Utc::now(),
        }
    }

    #[test]
    fn test_accept_one_reject_rest() {
        let w1 = Uuid::new_v4();
        let w2 = Uuid::new_v4();
        let w3 = Uuid::new_v4();
        let apps = vec![
            app(w1, ApplicationStatus::Pending),
            app(w2, ApplicationStatus::Pending),
            app(w3, ApplicationStatus::Pending),
        ];

        let disposition = accept_one_reject_rest(&apps, w2).unwrap();
        assert_eq!(disposition.accepted_application_id, apps[1].id);
        assert_eq!(disposition.rejected_application_ids.len(), 2);
        assert!(disposition.rejected_application_ids.contains(&apps[0].id));
        assert!(disposition.rejected_application_ids.contains(&apps[2].id));
    }

    #[test]
    fn test_accept_skips_already_rejected() {
        let w1 = Uuid::new_v4();
        let w2 = Uuid::new_v4();
        let apps = vec![
            app(w1, ApplicationStatus::Rejected),
            app(w2, ApplicationStatus::Pending),
        ];

        let disposition = accept_one_reject_rest(&apps, w2).unwrap();
        assert!(disposition.rejected_application_ids.is_empty());
    }

    #[test]
    fn test_accept_unknown_worker_is_none() {
        let apps = vec![app(Uuid::new_v4(), ApplicationStatus::Pending)];
        assert!(accept_one_reject_rest(&apps, Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_reapplication_blocks() {
        let w = Uuid::new_v4();

        let pending = vec![app(w, ApplicationStatus::Pending)];
        assert_eq!(check_reapplication(&pending, w), Some(ApplyBlock::AlreadyApplied));

        let rejected = vec![app(w, ApplicationStatus::Rejected)];
        assert_eq!(check_reapplication(&rejected, w), Some(ApplyBlock::RejectedBefore));

        // Cancellation removed the row entirely, so nothing blocks.
        assert_eq!(check_reapplication(&[], w), None);
    }

    fn job(completed: bool, assigned_to: Option<Uuid>, is_deleted: bool) -> Job {
        let now = Utc::now();
        Job {
            id: Uuid::new_v4(),
            employer_id: Uuid::new_v4(),
            title: "Fix leaking faucet".to_string(),
            description: "Kitchen sink".to_string(),
            required_skills: vec!["Plumbing".to_string()],
            barangay: "Brgy 1".to_string(),
            price: BigDecimal::from(500),
            is_open: !completed && assigned_to.is_none(),
            status: if completed { JobStatus::Completed } else { JobStatus::Open },
            completed,
            assigned_to,
            payment_proof: None,
            completed_at: if completed { Some(now) } else { None },
            is_deleted,
            deleted_at: if is_deleted { Some(now) } else { None },
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_completion_requires_assigned_worker() {
        let unassigned = job(false, None, false);
        assert_eq!(
            check_completion(&unassigned),
            Err(CompletionBlock::NoWorkerAssigned)
        );

        let worker = Uuid::new_v4();
        let assigned = job(false, Some(worker), false);
        assert_eq!(check_completion(&assigned), Ok(worker));
    }

    #[test]
    fn test_completion_happens_at_most_once() {
        // A job that already completed cannot be completed again.
        let done = job(true, Some(Uuid::new_v4()), false);
        assert_eq!(
            check_completion(&done),
            Err(CompletionBlock::AlreadyCompleted)
        );
    }

    #[test]
    fn test_repeat_delete_is_a_noop() {
        let gone = job(false, None, true);
        assert_eq!(delete_disposition(&gone), DeleteDisposition::AlreadyGone);
    }

    #[test]
    fn test_delete_disposition_by_state() {
        let live = job(false, None, false);
        assert_eq!(delete_disposition(&live), DeleteDisposition::Delete);

        let done = job(true, Some(Uuid::new_v4()), false);
        assert_eq!(delete_disposition(&done), DeleteDisposition::AdminOnly);

        // A completed job that was already tombstoned still needs nothing.
        let done_and_gone = job(true, Some(Uuid::new_v4()), true);
        assert_eq!(
            delete_disposition(&done_and_gone),
            DeleteDisposition::AlreadyGone
        );
    }
}
