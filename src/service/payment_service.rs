// service/payment_service.rs
//
// Bridges the payment gateway to the job lifecycle. Settlement is the
// only place a gateway event can flip a job to completed, and every
// entry point (webhook, reconciliation sweep) funnels through the same
// idempotent conditional update.
use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::{Duration, Utc};
use num_traits::ToPrimitive;
use rand::{distr::Alphanumeric, Rng};
use uuid::Uuid;

use crate::{
    db::{db::DBClient, jobdb::JobExt, paymentdb::PaymentExt},
    models::{
        notificationmodel::NotificationKind,
        paymentmodel::{fee_split, Payment, PaymentStatus},
        usermodel::User,
    },
    service::{
        effects::{EffectDispatcher, SideEffect},
        error::ServiceError,
        job_service::JobService,
        payment_provider::{GatewayStatus, PaymentGatewayService},
    },
};

/// How long a payment may sit in pending/processing before the sweep
/// asks the gateway what actually happened to it.
const STUCK_PAYMENT_AGE_MINUTES: i64 = 30;

#[derive(Debug, Clone)]
pub struct PaymentService {
    db_client: Arc<DBClient>,
    gateway: Arc<PaymentGatewayService>,
    job_service: Arc<JobService>,
    effects: Arc<EffectDispatcher>,
}

#[derive(Debug)]
pub struct InitiatedPayment {
    pub payment: Payment,
    pub checkout_url: String,
}

impl PaymentService {
    pub fn new(
        db_client: Arc<DBClient>,
        gateway: Arc<PaymentGatewayService>,
        job_service: Arc<JobService>,
        effects: Arc<EffectDispatcher>,
    ) -> Self {
        Self {
            db_client,
            gateway,
            job_service,
            effects,
        }
    }

    fn generate_reference() -> String {
        let suffix: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(12)
            .map(char::from)
            .collect();
        format!("HB-{}", suffix.to_uppercase())
    }

    /// Start a gateway payment for an assigned, uncompleted job. The
    /// employer pays price plus the platform fee; one payment may occupy
    /// the job's slot at a time.
    pub async fn initiate_payment(
        &self,
        actor: &User,
        job_id: Uuid,
    ) -> Result<InitiatedPayment, ServiceError> {
        let job = self
            .db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        if job.employer_id != actor.id {
            return Err(ServiceError::Forbidden(job_id));
        }
        if job.completed {
            return Err(ServiceError::AlreadyCompleted);
        }
        let worker_id = job.assigned_to.ok_or(ServiceError::NoWorkerAssigned)?;

        if self
            .db_client
            .get_active_payment_for_job(job_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::DuplicateActivePayment);
        }

        let (total, worker_share, fee) = fee_split(&job.price);
        let reference = Self::generate_reference();

        let payment = self
            .db_client
            .create_payment(
                job_id,
                job.employer_id,
                worker_id,
                reference.clone(),
                total.clone(),
                worker_share,
                fee,
            )
            .await?;

        let centavos = (&total * BigDecimal::from(100))
            .to_i64()
            .ok_or_else(|| ServiceError::Validation("Amount too large".to_string()))?;

        let source = match self
            .gateway
            .create_source(centavos, &reference, &format!("Payment for \"{}\"", job.title))
            .await
        {
            Ok(source) => source,
            Err(e) => {
                // Free the slot so the employer can retry.
                self.db_client
                    .set_payment_status(payment.id, PaymentStatus::Failed)
                    .await?;
                return Err(e);
            }
        };

        let payment = self
            .db_client
            .set_gateway_source(payment.id, source.id)
            .await?;

        tracing::info!(
            "payment {} initiated for job {} ({} total)",
            payment.reference,
            job_id,
            payment.amount
        );

        Ok(InitiatedPayment {
            payment,
            checkout_url: source.checkout_url,
        })
    }

    /// Apply a settlement outcome reported by the gateway. Safe to call
    /// any number of times for the same reference: only an in-flight
    /// payment is moved, later deliveries are no-ops.
    pub async fn handle_gateway_event(
        &self,
        reference: &str,
        succeeded: bool,
    ) -> Result<(), ServiceError> {
        let Some(payment) = self.db_client.get_payment_by_reference(reference).await? else {
            tracing::warn!("gateway event for unknown payment reference {}", reference);
            return Ok(());
        };

        if succeeded {
            // Payment and job move together in one transaction; the effects
            // run after commit.
            let settled = self
                .db_client
                .settle_payment_and_complete_job(
                    payment.id,
                    format!("payment:{}", payment.reference),
                    Utc::now(),
                )
                .await?;

            let Some((settled, completed_job)) = settled else {
                tracing::debug!(
                    "payment {} already settled, ignoring duplicate event",
                    reference
                );
                return Ok(());
            };

            if let Some(job) = completed_job {
                self.job_service
                    .settlement_completed(&job, settled.worker_amount.clone())
                    .await;
            }
        } else {
            let Some(settled) = self
                .db_client
                .settle_payment_if_in_flight(payment.id, PaymentStatus::Failed)
                .await?
            else {
                tracing::debug!(
                    "payment {} already settled, ignoring duplicate event",
                    reference
                );
                return Ok(());
            };

            self.effects
                .dispatch_all(vec![SideEffect::notify(
                    settled.employer_id,
                    NotificationKind::PaymentFailed,
                    format!("Your payment {} did not go through", settled.reference),
                    Some(settled.job_id),
                )])
                .await;
        }

        Ok(())
    }

    /// Sweep payments stuck in pending/processing and ask the gateway for
    /// their real status. Run periodically; it covers webhook deliveries
    /// that never arrived.
    pub async fn reconcile_stuck_payments(&self) -> Result<usize, ServiceError> {
        let cutoff = Utc::now() - Duration::minutes(STUCK_PAYMENT_AGE_MINUTES);
        let stuck = self.db_client.get_stuck_payments(cutoff).await?;
        let mut reconciled = 0;

        for payment in stuck {
            let Some(ref source_id) = payment.gateway_source_id else {
                // Never reached the gateway; nothing to ask about.
                self.db_client
                    .set_payment_status(payment.id, PaymentStatus::Cancelled)
                    .await?;
                reconciled += 1;
                continue;
            };

            let status = match self.gateway.get_source_status(source_id).await {
                Ok(status) => status,
                Err(e) => {
                    tracing::warn!("reconciliation poll failed for {}: {}", payment.reference, e);
                    continue;
                }
            };

            match status {
                GatewayStatus::Paid => {
                    self.handle_gateway_event(&payment.reference, true).await?;
                    reconciled += 1;
                }
                GatewayStatus::Failed | GatewayStatus::Expired => {
                    self.handle_gateway_event(&payment.reference, false).await?;
                    reconciled += 1;
                }
                GatewayStatus::Pending => {}
            }
        }

        Ok(reconciled)
    }
}
