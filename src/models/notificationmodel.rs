use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
pub enum NotificationKind {
    NewJob,
    NewApplicant,
    ApplicationSent,
    ApplicationCancelled,
    JobInvite,
    InviteAccepted,
    InviteDeclined,
    JobAssigned,
    ApplicationRejected,
    JobCompleted,
    GoalCompleted,
    PaymentFailed,
    JobDeleted,
}

impl NotificationKind {
    pub fn to_str(&self) -> &str {
        match self {
            NotificationKind::NewJob => "new_job",
            NotificationKind::NewApplicant => "new_applicant",
            NotificationKind::ApplicationSent => "application_sent",
            NotificationKind::ApplicationCancelled => "application_cancelled",
            NotificationKind::JobInvite => "job_invite",
            NotificationKind::InviteAccepted => "invite_accepted",
            NotificationKind::InviteDeclined => "invite_declined",
            NotificationKind::JobAssigned => "job_assigned",
            NotificationKind::ApplicationRejected => "application_rejected",
            NotificationKind::JobCompleted => "job_completed",
            NotificationKind::GoalCompleted => "goal_completed",
            NotificationKind::PaymentFailed => "payment_failed",
            NotificationKind::JobDeleted => "job_deleted",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub related_job_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
