// service/notification_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    config::Config,
    db::{db::DBClient, notificationdb::NotificationExt, userdb::UserExt},
    mail::mails,
    models::notificationmodel::NotificationKind,
    service::error::ServiceError,
};

/// In-app notification store plus the SMS and email legs. Everything here
/// is a sink: callers treat failures as warnings, not operation failures.
#[derive(Debug, Clone)]
pub struct NotificationService {
    db_client: Arc<DBClient>,
    config: Config,
}

impl NotificationService {
    pub fn new(db_client: Arc<DBClient>, config: Config) -> Self {
        Self { db_client, config }
    }

    pub async fn notify(
        &self,
        recipient_id: Uuid,
        kind: NotificationKind,
        message: &str,
        related_job_id: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        tracing::info!(
            "notification [{}] for {}: {}",
            kind.to_str(),
            recipient_id,
            message
        );

        self.db_client
            .create_notification(recipient_id, kind, message.to_string(), related_job_id)
            .await?;

        // Email only the transitions a user is likely to act on.
        if matches!(
            kind,
            NotificationKind::JobInvite
                | NotificationKind::JobAssigned
                | NotificationKind::JobCompleted
        ) {
            if let Some(user) = self.db_client.get_user(recipient_id).await? {
                if let Err(e) =
                    mails::send_notification_email(&user.email, &user.name, message, &self.config.app_url)
                        .await
                {
                    tracing::warn!("notification email to {} failed: {}", user.email, e);
                }
            }
        }

        Ok(())
    }

    pub async fn send_sms(&self, recipient_id: Uuid, message: &str) -> Result<(), ServiceError> {
        let user = self
            .db_client
            .get_user(recipient_id)
            .await?
            .ok_or(ServiceError::UserNotFound(recipient_id))?;

        let Some(phone) = user.phone else {
            return Err(ServiceError::Notification(format!(
                "user {} has no phone number",
                recipient_id
            )));
        };

        if self.config.sms_api_key.is_empty() {
            tracing::debug!("SMS_API_KEY not configured, skipping SMS to {}", phone);
            return Ok(());
        }

        let client = reqwest::Client::new();
        let payload = serde_json::json!({
            "apikey": self.config.sms_api_key,
            "number": phone,
            "message": message,
            "sendername": self.config.sms_sender_name,
        });

        let response = client
            .post("https://api.semaphore.co/api/v4/messages")
            .json(&payload)
            .send()
            .await
            .map_err(|e| ServiceError::Notification(format!("sms send failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ServiceError::Notification(format!(
                "sms provider returned {}",
                response.status()
            )));
        }

        tracing::info!("SMS sent to {}", phone);
        Ok(())
    }
}
