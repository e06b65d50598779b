// service/job_service.rs
//
// The job lifecycle state machine: open -> (applications accumulate) ->
// assigned -> completed, with closed reachable from open/assigned and a
// soft-delete tombstone reachable from anywhere. Every operation commits
// its primary mutation first and only then hands side effects to the
// dispatcher; sink failures never roll back a transition.
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::{
        db::DBClient,
        jobdb::JobExt,
        notificationdb::NotificationExt,
        paymentdb::PaymentExt,
        userdb::UserExt,
    },
    dtos::jobdtos::{CreateJobDto, UpdateJobDto},
    models::{
        jobmodel::{
            accept_one_reject_rest, check_completion, check_reapplication, delete_disposition,
            ApplicationStatus, ApplyBlock, CompletionBlock, DeleteDisposition, Job, JobApplication,
        },
        notificationmodel::NotificationKind,
        paymentmodel::{completion_proof, CompletionProof},
        usermodel::User,
    },
    service::{
        effects::{EffectDispatcher, SideEffect},
        error::ServiceError,
    },
};

const NEW_JOB_NOTIFY_CAP: i64 = 50;

#[derive(Debug, Clone)]
pub struct JobService {
    db_client: Arc<DBClient>,
    effects: Arc<EffectDispatcher>,
}

impl JobService {
    pub fn new(db_client: Arc<DBClient>, effects: Arc<EffectDispatcher>) -> Self {
        Self { db_client, effects }
    }

    async fn load_job(&self, job_id: Uuid) -> Result<Job, ServiceError> {
        self.db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))
    }

    fn ensure_poster_or_admin(job: &Job, actor: &User) -> Result<(), ServiceError> {
        if job.employer_id != actor.id && !actor.role.is_admin() {
            return Err(ServiceError::Forbidden(job.id));
        }
        Ok(())
    }

    fn ensure_poster(job: &Job, actor: &User) -> Result<(), ServiceError> {
        if job.employer_id != actor.id {
            return Err(ServiceError::Forbidden(job.id));
        }
        Ok(())
    }

    pub async fn post_job(&self, actor: &User, data: CreateJobDto) -> Result<Job, ServiceError> {
        if !actor.role.can_post() {
            return Err(ServiceError::NotAnEmployer);
        }
        if data.price <= 0.0 {
            return Err(ServiceError::Validation("Price must be positive".to_string()));
        }

        let price = bigdecimal::BigDecimal::try_from(data.price)
            .map_err(|_| ServiceError::Validation("Invalid price".to_string()))?;

        let job = self
            .db_client
            .create_job(
                actor.id,
                data.title,
                data.description,
                data.required_skills,
                data.barangay,
                price,
            )
            .await?;

        // Best-effort fan-out to workers in the same barangay with at
        // least one matching skill.
        let mut effects = Vec::new();
        match self
            .db_client
            .get_matching_workers(&job.barangay, &job.required_skills, NEW_JOB_NOTIFY_CAP)
            .await
        {
            Ok(workers) => {
                for worker in workers {
                    effects.push(SideEffect::notify(
                        worker.id,
                        NotificationKind::NewJob,
                        format!("New job in your barangay: {}", job.title),
                        Some(job.id),
                    ));
                }
            }
            Err(e) => tracing::warn!("worker fan-out lookup failed for job {}: {}", job.id, e),
        }
        self.effects.dispatch_all(effects).await;

        Ok(job)
    }

    pub async fn apply(&self, actor: &User, job_id: Uuid) -> Result<JobApplication, ServiceError> {
        if !actor.role.can_apply() {
            return Err(ServiceError::NotAWorker);
        }

        let job = self.load_job(job_id).await?;
        if !job.is_open {
            return Err(ServiceError::JobClosed);
        }
        if job.employer_id == actor.id {
            return Err(ServiceError::OwnJobApplication);
        }

        let applicants = self.db_client.get_applications(job_id).await?;
        match check_reapplication(&applicants, actor.id) {
            Some(ApplyBlock::AlreadyApplied) => return Err(ServiceError::AlreadyApplied),
            Some(ApplyBlock::RejectedBefore) => return Err(ServiceError::ReapplyAfterRejection),
            None => {}
        }

        let application = self.db_client.create_application(job_id, actor.id).await?;

        self.effects
            .dispatch_all(vec![
                SideEffect::notify(
                    job.employer_id,
                    NotificationKind::NewApplicant,
                    format!("{} applied to your job \"{}\"", actor.name, job.title),
                    Some(job.id),
                ),
                SideEffect::notify(
                    actor.id,
                    NotificationKind::ApplicationSent,
                    format!("Your application to \"{}\" was sent", job.title),
                    Some(job.id),
                ),
            ])
            .await;

        Ok(application)
    }

    /// Cancellation removes the pending record entirely: unlike a
    /// rejection it leaves nothing behind and the worker may apply again.
    pub async fn cancel_application(&self, actor: &User, job_id: Uuid) -> Result<(), ServiceError> {
        let job = self.load_job(job_id).await?;

        let application = self
            .db_client
            .get_application(job_id, actor.id)
            .await?
            .ok_or(ServiceError::ApplicationNotFound(job_id))?;

        if application.status != ApplicationStatus::Pending {
            return Err(ServiceError::ApplicationNotPending);
        }

        self.db_client.delete_application(application.id).await?;

        self.effects
            .dispatch_all(vec![
                SideEffect::notify(
                    job.employer_id,
                    NotificationKind::ApplicationCancelled,
                    format!("{} withdrew from \"{}\"", actor.name, job.title),
                    Some(job.id),
                ),
                SideEffect::notify(
                    actor.id,
                    NotificationKind::ApplicationCancelled,
                    format!("Your application to \"{}\" was cancelled", job.title),
                    Some(job.id),
                ),
            ])
            .await;

        Ok(())
    }

    pub async fn invite(
        &self,
        actor: &User,
        job_id: Uuid,
        invitee_id: Uuid,
    ) -> Result<(), ServiceError> {
        let job = self.load_job(job_id).await?;
        Self::ensure_poster(&job, actor)?;
        if !job.is_open {
            return Err(ServiceError::JobClosed);
        }

        let invitee = self
            .db_client
            .get_user(invitee_id)
            .await?
            .ok_or(ServiceError::UserNotFound(invitee_id))?;
        if !invitee.role.can_apply() {
            return Err(ServiceError::NotInvitable);
        }

        if self.db_client.has_invitation(job_id, invitee_id).await? {
            return Err(ServiceError::DuplicateInvitation);
        }

        // The stored notification is the invitation record itself, so it is
        // written synchronously; only the SMS leg is best-effort.
        self.db_client
            .create_notification(
                invitee_id,
                NotificationKind::JobInvite,
                format!("You were invited to work on \"{}\"", job.title),
                Some(job.id),
            )
            .await?;

        if invitee.wants_sms() {
            self.effects
                .dispatch_all(vec![SideEffect::Sms {
                    recipient_id: invitee.id,
                    message: format!("You were invited to a job: {}", job.title),
                }])
                .await;
        }

        Ok(())
    }

    pub async fn accept_invitation(
        &self,
        actor: &User,
        job_id: Uuid,
    ) -> Result<JobApplication, ServiceError> {
        let job = self.load_job(job_id).await?;
        if !job.is_open {
            return Err(ServiceError::JobClosed);
        }
        if !self.db_client.has_invitation(job_id, actor.id).await? {
            return Err(ServiceError::NoInvitation);
        }

        let applicants = self.db_client.get_applications(job_id).await?;
        match check_reapplication(&applicants, actor.id) {
            Some(ApplyBlock::AlreadyApplied) => return Err(ServiceError::AlreadyApplied),
            Some(ApplyBlock::RejectedBefore) => return Err(ServiceError::ReapplyAfterRejection),
            None => {}
        }

        let application = self.db_client.create_application(job_id, actor.id).await?;
        self.db_client.mark_invitation_read(job_id, actor.id).await?;

        self.effects
            .dispatch_all(vec![SideEffect::notify(
                job.employer_id,
                NotificationKind::InviteAccepted,
                format!("{} accepted your invitation to \"{}\"", actor.name, job.title),
                Some(job.id),
            )])
            .await;

        Ok(application)
    }

    pub async fn decline_invitation(&self, actor: &User, job_id: Uuid) -> Result<(), ServiceError> {
        let job = self.load_job(job_id).await?;
        if !self.db_client.has_invitation(job_id, actor.id).await? {
            return Err(ServiceError::NoInvitation);
        }

        self.db_client.mark_invitation_read(job_id, actor.id).await?;

        self.effects
            .dispatch_all(vec![SideEffect::notify(
                job.employer_id,
                NotificationKind::InviteDeclined,
                format!("{} declined your invitation to \"{}\"", actor.name, job.title),
                Some(job.id),
            )])
            .await;

        Ok(())
    }

    /// Accept one applicant and reject every co-applicant. The assignment
    /// is a conditional update keyed on `assigned_to IS NULL`, so two
    /// racing accepts cannot both win.
    pub async fn assign_worker(
        &self,
        actor: &User,
        job_id: Uuid,
        worker_id: Uuid,
    ) -> Result<Job, ServiceError> {
        let job = self.load_job(job_id).await?;
        Self::ensure_poster_or_admin(&job, actor)?;
        if job.completed {
            return Err(ServiceError::AlreadyCompleted);
        }
        if job.assigned_to.is_some() {
            return Err(ServiceError::AlreadyAssigned);
        }
        if !job.is_open {
            return Err(ServiceError::InvalidJobStatus(job_id, job.status));
        }

        let applicants = self.db_client.get_applications(job_id).await?;
        let disposition = accept_one_reject_rest(&applicants, worker_id)
            .ok_or(ServiceError::ApplicationNotFound(job_id))?;

        let assigned = self
            .db_client
            .assign_worker(
                job_id,
                worker_id,
                disposition.accepted_application_id,
                &disposition.rejected_application_ids,
            )
            .await?
            .ok_or(ServiceError::AlreadyAssigned)?;

        let mut effects = vec![SideEffect::notify(
            worker_id,
            NotificationKind::JobAssigned,
            format!("You were assigned to \"{}\"", assigned.title),
            Some(assigned.id),
        )];
        if let Ok(Some(worker)) = self.db_client.get_user(worker_id).await {
            if worker.wants_sms() {
                effects.push(SideEffect::Sms {
                    recipient_id: worker_id,
                    message: format!("You got the job: {}", assigned.title),
                });
            }
        }
        self.effects.dispatch_all(effects).await;

        Ok(assigned)
    }

    pub async fn reject_application(
        &self,
        actor: &User,
        job_id: Uuid,
        worker_id: Uuid,
    ) -> Result<JobApplication, ServiceError> {
        let job = self.load_job(job_id).await?;
        Self::ensure_poster(&job, actor)?;

        let application = self
            .db_client
            .get_application(job_id, worker_id)
            .await?
            .ok_or(ServiceError::ApplicationNotFound(job_id))?;

        if application.status == ApplicationStatus::Accepted {
            return Err(ServiceError::Validation(
                "Cannot reject an accepted application".to_string(),
            ));
        }

        let rejected = self
            .db_client
            .set_application_status(application.id, ApplicationStatus::Rejected)
            .await?;

        self.effects
            .dispatch_all(vec![SideEffect::notify(
                worker_id,
                NotificationKind::ApplicationRejected,
                format!("Your application to \"{}\" was not selected", job.title),
                Some(job.id),
            )])
            .await;

        Ok(rejected)
    }

    /// `PUT /jobs/:id/applicants/:user_id` maps here: accepted runs the
    /// assignment path, rejected the rejection path.
    pub async fn update_applicant_status(
        &self,
        actor: &User,
        job_id: Uuid,
        worker_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Job, ServiceError> {
        match status {
            ApplicationStatus::Accepted => self.assign_worker(actor, job_id, worker_id).await,
            ApplicationStatus::Rejected => {
                self.reject_application(actor, job_id, worker_id).await?;
                self.load_job(job_id).await
            }
            ApplicationStatus::Pending => Err(ServiceError::Validation(
                "Applications cannot be moved back to pending".to_string(),
            )),
        }
    }

    pub async fn close_job(&self, actor: &User, job_id: Uuid) -> Result<Job, ServiceError> {
        let job = self.load_job(job_id).await?;
        Self::ensure_poster(&job, actor)?;
        if job.completed {
            return Err(ServiceError::AlreadyCompleted);
        }

        Ok(self.db_client.close_job(job_id).await?)
    }

    /// Manual completion path. Proof is either the uploaded image URI or
    /// an already-settled gateway payment; the worker's goal is credited
    /// with the job price (manual) or the payment's worker share (gateway).
    pub async fn complete_job(
        &self,
        actor: &User,
        job_id: Uuid,
        proof_uri: Option<String>,
    ) -> Result<Job, ServiceError> {
        let job = self.load_job(job_id).await?;
        Self::ensure_poster_or_admin(&job, actor)?;
        let worker_id = check_completion(&job).map_err(|block| match block {
            CompletionBlock::AlreadyCompleted => ServiceError::AlreadyCompleted,
            CompletionBlock::NoWorkerAssigned => ServiceError::NoWorkerAssigned,
        })?;

        let payment = match proof_uri {
            Some(_) => None,
            None => self.db_client.get_active_payment_for_job(job_id).await?,
        };
        let CompletionProof {
            proof,
            worker_credit,
        } = completion_proof(&job.price, proof_uri, payment.as_ref())
            .ok_or(ServiceError::MissingPaymentProof)?;

        let completed = self
            .db_client
            .complete_job(job_id, proof, Utc::now())
            .await?
            .ok_or(ServiceError::AlreadyCompleted)?;

        self.effects
            .dispatch_all(Self::completion_effects(&completed, worker_id, worker_credit))
            .await;

        Ok(completed)
    }

    /// Post-commit leg of a gateway settlement: the payment and job rows
    /// have already been updated together, only the effects remain.
    pub async fn settlement_completed(&self, job: &Job, worker_amount: bigdecimal::BigDecimal) {
        let Some(worker_id) = job.assigned_to else {
            return;
        };
        self.effects
            .dispatch_all(Self::completion_effects(job, worker_id, worker_amount))
            .await;
    }

    fn completion_effects(
        job: &Job,
        worker_id: Uuid,
        credit: bigdecimal::BigDecimal,
    ) -> Vec<SideEffect> {
        vec![
            SideEffect::notify(
                worker_id,
                NotificationKind::JobCompleted,
                format!("\"{}\" was marked completed. Payment is on its way.", job.title),
                Some(job.id),
            ),
            SideEffect::notify(
                job.employer_id,
                NotificationKind::JobCompleted,
                format!("You marked \"{}\" as completed", job.title),
                Some(job.id),
            ),
            SideEffect::CreditGoal {
                worker_id,
                amount: credit,
                job_id: job.id,
            },
        ]
    }

    pub async fn edit_job(
        &self,
        actor: &User,
        job_id: Uuid,
        data: UpdateJobDto,
    ) -> Result<Job, ServiceError> {
        let job = self.load_job(job_id).await?;
        Self::ensure_poster_or_admin(&job, actor)?;
        if !job.is_editable() {
            return Err(ServiceError::AlreadyCompleted);
        }

        let price = match data.price {
            Some(p) if p <= 0.0 => {
                return Err(ServiceError::Validation("Price must be positive".to_string()))
            }
            Some(p) => bigdecimal::BigDecimal::try_from(p)
                .map_err(|_| ServiceError::Validation("Invalid price".to_string()))?,
            None => job.price.clone(),
        };

        Ok(self
            .db_client
            .update_job_fields(
                job_id,
                data.title.unwrap_or(job.title),
                data.description.unwrap_or(job.description),
                data.required_skills.unwrap_or(job.required_skills),
                data.barangay.unwrap_or(job.barangay),
                price,
            )
            .await?)
    }

    /// Deleting a missing or already-deleted job succeeds without doing
    /// anything, so clients can retry blindly.
    pub async fn delete_job(&self, actor: &User, job_id: Uuid) -> Result<(), ServiceError> {
        let Some(job) = self.db_client.get_job_any(job_id).await? else {
            return Ok(());
        };
        match delete_disposition(&job) {
            DeleteDisposition::AlreadyGone => return Ok(()),
            DeleteDisposition::AdminOnly => {
                if !actor.role.is_admin() {
                    return Err(ServiceError::Forbidden(job.id));
                }
            }
            DeleteDisposition::Delete => Self::ensure_poster_or_admin(&job, actor)?,
        }

        if self.db_client.soft_delete_job(job_id).await?.is_some() {
            self.effects
                .dispatch_all(vec![SideEffect::notify(
                    job.employer_id,
                    NotificationKind::JobDeleted,
                    format!("Your job \"{}\" was deleted", job.title),
                    Some(job.id),
                )])
                .await;
        }

        Ok(())
    }
}
