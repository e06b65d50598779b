// service/effects.rs
//
// Lifecycle operations return a list of side-effect commands instead of
// calling the sinks inline. The dispatcher runs them after the primary
// mutation has committed; every failure downgrades to a warning so that
// notification or goal-channel trouble can never fail a job transition.
use std::sync::Arc;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::{
    models::notificationmodel::NotificationKind,
    service::{goal_service::GoalService, notification_service::NotificationService},
};

#[derive(Debug, Clone)]
pub enum SideEffect {
    Notify {
        recipient_id: Uuid,
        kind: NotificationKind,
        message: String,
        related_job_id: Option<Uuid>,
    },
    Sms {
        recipient_id: Uuid,
        message: String,
    },
    CreditGoal {
        worker_id: Uuid,
        amount: BigDecimal,
        job_id: Uuid,
    },
}

impl SideEffect {
    pub fn notify(
        recipient_id: Uuid,
        kind: NotificationKind,
        message: impl Into<String>,
        related_job_id: Option<Uuid>,
    ) -> Self {
        SideEffect::Notify {
            recipient_id,
            kind,
            message: message.into(),
            related_job_id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EffectDispatcher {
    notification_service: Arc<NotificationService>,
    goal_service: Arc<GoalService>,
}

impl EffectDispatcher {
    pub fn new(
        notification_service: Arc<NotificationService>,
        goal_service: Arc<GoalService>,
    ) -> Self {
        Self {
            notification_service,
            goal_service,
        }
    }

    /// Run every effect, best-effort. A goal credit that completes the
    /// worker's goal queues a secondary congratulation notification.
    pub async fn dispatch_all(&self, effects: Vec<SideEffect>) {
        let mut queue = effects;
        while !queue.is_empty() {
            let batch: Vec<SideEffect> = std::mem::take(&mut queue);
            for effect in batch {
                if let Some(follow_up) = self.dispatch_one(effect).await {
                    queue.push(follow_up);
                }
            }
        }
    }

    async fn dispatch_one(&self, effect: SideEffect) -> Option<SideEffect> {
        match effect {
            SideEffect::Notify {
                recipient_id,
                kind,
                message,
                related_job_id,
            } => {
                if let Err(e) = self
                    .notification_service
                    .notify(recipient_id, kind, &message, related_job_id)
                    .await
                {
                    tracing::warn!(
                        "notification dispatch failed for {}: {}",
                        recipient_id,
                        e
                    );
                }
                None
            }
            SideEffect::Sms {
                recipient_id,
                message,
            } => {
                if let Err(e) = self.notification_service.send_sms(recipient_id, &message).await {
                    tracing::warn!("sms dispatch failed for {}: {}", recipient_id, e);
                }
                None
            }
            SideEffect::CreditGoal {
                worker_id,
                amount,
                job_id,
            } => match self.goal_service.credit_goal(worker_id, &amount).await {
                Ok(Some(goal)) if goal.completed => Some(SideEffect::notify(
                    worker_id,
                    NotificationKind::GoalCompleted,
                    format!("Congratulations! Your goal \"{}\" is complete.", goal.title),
                    Some(job_id),
                )),
                Ok(_) => None,
                Err(e) => {
                    tracing::warn!(
                        "goal credit failed for worker {} (job {}): {}",
                        worker_id,
                        job_id,
                        e
                    );
                    None
                }
            },
        }
    }
}
