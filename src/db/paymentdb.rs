// db/paymentdb.rs
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::Error;
use uuid::Uuid;

use super::{db::DBClient, jobdb::JOB_COLUMNS};
use crate::models::{
    jobmodel::Job,
    paymentmodel::{Payment, PaymentStatus},
};

const PAYMENT_COLUMNS: &str = r#"
    id, job_id, employer_id, worker_id, reference, amount, worker_amount,
    platform_fee, status, gateway_source_id, created_at, updated_at
"#;

#[async_trait]
pub trait PaymentExt {
    async fn create_payment(
        &self,
        job_id: Uuid,
        employer_id: Uuid,
        worker_id: Uuid,
        reference: String,
        amount: BigDecimal,
        worker_amount: BigDecimal,
        platform_fee: BigDecimal,
    ) -> Result<Payment, Error>;

    /// The one payment currently occupying the job's slot, if any
    /// (pending, processing or succeeded).
    async fn get_active_payment_for_job(&self, job_id: Uuid) -> Result<Option<Payment>, Error>;

    async fn get_payment_by_reference(&self, reference: &str) -> Result<Option<Payment>, Error>;

    async fn set_payment_status(
        &self,
        payment_id: Uuid,
        status: PaymentStatus,
    ) -> Result<Payment, Error>;

    /// Conditional status move for idempotent webhook handling: only rows
    /// still pending or processing are touched. `Ok(None)` means the
    /// payment already reached a terminal state.
    async fn settle_payment_if_in_flight(
        &self,
        payment_id: Uuid,
        status: PaymentStatus,
    ) -> Result<Option<Payment>, Error>;

    /// Successful settlement: move the payment to succeeded and complete
    /// its job in one transaction. `Ok(None)` when the payment already left
    /// the in-flight states (duplicate delivery); the inner `Option<Job>`
    /// is `None` when the job was already completed through another path.
    async fn settle_payment_and_complete_job(
        &self,
        payment_id: Uuid,
        payment_proof: String,
        completed_at: DateTime<Utc>,
    ) -> Result<Option<(Payment, Option<Job>)>, Error>;

    async fn set_gateway_source(
        &self,
        payment_id: Uuid,
        source_id: String,
    ) -> Result<Payment, Error>;

    /// Payments sitting in pending/processing since before the cutoff,
    /// candidates for the reconciliation sweep.
    async fn get_stuck_payments(
        &self,
        older_than: DateTime<Utc>,
    ) -> Result<Vec<Payment>, Error>;
}

#[async_trait]
impl PaymentExt for DBClient {
    async fn create_payment(
        &self,
        job_id: Uuid,
        employer_id: Uuid,
        worker_id: Uuid,
        reference: String,
        amount: BigDecimal,
        worker_amount: BigDecimal,
        platform_fee: BigDecimal,
    ) -> Result<Payment, Error> {
        sqlx::query_as::<_, Payment>(&format!(
            r#"
            INSERT INTO payments
            (job_id, employer_id, worker_id, reference, amount, worker_amount, platform_fee)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(job_id)
        .bind(employer_id)
        .bind(worker_id)
        .bind(reference)
        .bind(amount)
        .bind(worker_amount)
        .bind(platform_fee)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_active_payment_for_job(&self, job_id: Uuid) -> Result<Option<Payment>, Error> {
        sqlx::query_as::<_, Payment>(&format!(
            r#"
            SELECT {PAYMENT_COLUMNS} FROM payments
            WHERE job_id = $1 AND status NOT IN ('failed', 'cancelled')
            ORDER BY created_at DESC
            LIMIT 1
            "#
        ))
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_payment_by_reference(&self, reference: &str) -> Result<Option<Payment>, Error> {
        sqlx::query_as::<_, Payment>(&format!(
            r#"SELECT {PAYMENT_COLUMNS} FROM payments WHERE reference = $1"#
        ))
        .bind(reference)
        .fetch_optional(&self.pool)
        .await
    }

    async fn set_payment_status(
        &self,
        payment_id: Uuid,
        status: PaymentStatus,
    ) -> Result<Payment, Error> {
        sqlx::query_as::<_, Payment>(&format!(
            r#"
            UPDATE payments SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(payment_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
    }

    async fn settle_payment_if_in_flight(
        &self,
        payment_id: Uuid,
        status: PaymentStatus,
    ) -> Result<Option<Payment>, Error> {
        sqlx::query_as::<_, Payment>(&format!(
            r#"
            UPDATE payments SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status IN ('pending', 'processing')
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(payment_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
    }

    async fn settle_payment_and_complete_job(
        &self,
        payment_id: Uuid,
        payment_proof: String,
        completed_at: DateTime<Utc>,
    ) -> Result<Option<(Payment, Option<Job>)>, Error> {
        let mut tx = self.pool.begin().await?;

        let payment = sqlx::query_as::<_, Payment>(&format!(
            r#"
            UPDATE payments SET status = 'succeeded', updated_at = NOW()
            WHERE id = $1 AND status IN ('pending', 'processing')
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(payment_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(payment) = payment else {
            tx.rollback().await?;
            return Ok(None);
        };

        let job = sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET completed = TRUE, completed_at = $3, status = 'completed',
                is_open = FALSE, payment_proof = $2, updated_at = NOW()
            WHERE id = $1 AND completed = FALSE AND assigned_to IS NOT NULL
              AND is_deleted = FALSE
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(payment.job_id)
        .bind(payment_proof)
        .bind(completed_at)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some((payment, job)))
    }

    async fn set_gateway_source(
        &self,
        payment_id: Uuid,
        source_id: String,
    ) -> Result<Payment, Error> {
        sqlx::query_as::<_, Payment>(&format!(
            r#"
            UPDATE payments SET gateway_source_id = $2, status = 'processing', updated_at = NOW()
            WHERE id = $1
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(payment_id)
        .bind(source_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_stuck_payments(
        &self,
        older_than: DateTime<Utc>,
    ) -> Result<Vec<Payment>, Error> {
        sqlx::query_as::<_, Payment>(&format!(
            r#"
            SELECT {PAYMENT_COLUMNS} FROM payments
            WHERE status IN ('pending', 'processing') AND created_at < $1
            ORDER BY created_at ASC
            "#
        ))
        .bind(older_than)
        .fetch_all(&self.pool)
        .await
    }
}
