// db/notificationdb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::notificationmodel::{Notification, NotificationKind};

const NOTIFICATION_COLUMNS: &str = r#"
    id, recipient_id, kind, message, related_job_id, is_read, created_at
"#;

#[async_trait]
pub trait NotificationExt {
    async fn create_notification(
        &self,
        recipient_id: Uuid,
        kind: NotificationKind,
        message: String,
        related_job_id: Option<Uuid>,
    ) -> Result<Notification, Error>;

    /// Whether an invitation for (job, invitee) was already sent. Guards
    /// against duplicate invites.
    async fn has_invitation(&self, job_id: Uuid, invitee_id: Uuid) -> Result<bool, Error>;

    /// Mark the invitation notification(s) for (job, invitee) as read,
    /// used when an invitation is accepted or declined.
    async fn mark_invitation_read(&self, job_id: Uuid, invitee_id: Uuid) -> Result<(), Error>;

    async fn get_notifications(&self, recipient_id: Uuid) -> Result<Vec<Notification>, Error>;
}

#[async_trait]
impl NotificationExt for DBClient {
    async fn create_notification(
        &self,
        recipient_id: Uuid,
        kind: NotificationKind,
        message: String,
        related_job_id: Option<Uuid>,
    ) -> Result<Notification, Error> {
        sqlx::query_as::<_, Notification>(&format!(
            r#"
            INSERT INTO notifications (recipient_id, kind, message, related_job_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(recipient_id)
        .bind(kind)
        .bind(message)
        .bind(related_job_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn has_invitation(&self, job_id: Uuid, invitee_id: Uuid) -> Result<bool, Error> {
        let row: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM notifications
                WHERE related_job_id = $1 AND recipient_id = $2 AND kind = 'job_invite'
            )
            "#,
        )
        .bind(job_id)
        .bind(invitee_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    async fn mark_invitation_read(&self, job_id: Uuid, invitee_id: Uuid) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE notifications SET is_read = TRUE
            WHERE related_job_id = $1 AND recipient_id = $2 AND kind = 'job_invite'
            "#,
        )
        .bind(job_id)
        .bind(invitee_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_notifications(&self, recipient_id: Uuid) -> Result<Vec<Notification>, Error> {
        sqlx::query_as::<_, Notification>(&format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS} FROM notifications
            WHERE recipient_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(recipient_id)
        .fetch_all(&self.pool)
        .await
    }
}
