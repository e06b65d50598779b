use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Succeeded,
    Failed,
    Cancelled,
}

impl PaymentStatus {
    pub fn to_str(&self) -> &str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Processing => "processing",
            PaymentStatus::Succeeded => "succeeded",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Cancelled => "cancelled",
        }
    }

    /// A failed or cancelled payment no longer occupies the job's payment
    /// slot; anything else does.
    pub fn is_active(&self) -> bool {
        !matches!(self, PaymentStatus::Failed | PaymentStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub job_id: Uuid,
    pub employer_id: Uuid,
    pub worker_id: Uuid,
    pub reference: String,
    pub amount: BigDecimal,
    pub worker_amount: BigDecimal,
    pub platform_fee: BigDecimal,
    pub status: PaymentStatus,
    pub gateway_source_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Platform fee charged on top of the job price, in percent.
pub const PLATFORM_FEE_PERCENT: i64 = 5;

/// Split a job price into (total charged to employer, worker share, fee).
/// The worker always receives the full job price; the fee is added on top.
pub fn fee_split(price: &BigDecimal) -> (BigDecimal, BigDecimal, BigDecimal) {
    let fee = price * BigDecimal::from(PLATFORM_FEE_PERCENT) / BigDecimal::from(100);
    let total = price + &fee;
    (total, price.clone(), fee)
}

/// What proves a job was paid, and how much the worker's goal is credited.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionProof {
    pub proof: String,
    pub worker_credit: BigDecimal,
}

/// An uploaded proof image credits the full job price. Without one, a
/// settled gateway payment stands in as proof and credits its worker
/// share. Anything else is no proof at all.
pub fn completion_proof(
    price: &BigDecimal,
    uploaded_uri: Option<String>,
    payment: Option<&Payment>,
) -> Option<CompletionProof> {
    match uploaded_uri {
        Some(uri) => Some(CompletionProof {
            proof: uri,
            worker_credit: price.clone(),
        }),
        None => payment
            .filter(|p| p.status == PaymentStatus::Succeeded)
            .map(|p| CompletionProof {
                proof: format!("payment:{}", p.reference),
                worker_credit: p.worker_amount.clone(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_fee_split() {
        let price = BigDecimal::from(1000);
        let (total, worker, fee) = fee_split(&price);
        assert_eq!(fee, BigDecimal::from(50));
        assert_eq!(worker, BigDecimal::from(1000));
        assert_eq!(total, BigDecimal::from(1050));
    }

    #[test]
    fn test_fee_split_fractional() {
        let price = BigDecimal::from_str("333.00").unwrap();
        let (total, worker, fee) = fee_split(&price);
        assert_eq!(fee, BigDecimal::from_str("16.65").unwrap());
        assert_eq!(worker, price);
        assert_eq!(total, BigDecimal::from_str("349.65").unwrap());
    }

    fn payment(status: PaymentStatus) -> Payment {
        let (total, worker, fee) = fee_split(&BigDecimal::from(500));
        let now = Utc::now();
        Payment {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            employer_id: Uuid::new_v4(),
            worker_id: Uuid::new_v4(),
            reference: "HB-TESTREF".to_string(),
            amount: total,
            worker_amount: worker,
            platform_fee: fee,
            status,
            gateway_source_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_uploaded_proof_credits_job_price() {
        let price = BigDecimal::from(500);
        let proof = completion_proof(&price, Some("/uploads/x.jpg".to_string()), None).unwrap();
        assert_eq!(proof.proof, "/uploads/x.jpg");
        assert_eq!(proof.worker_credit, price);
    }

    #[test]
    fn test_settled_payment_stands_in_as_proof() {
        let price = BigDecimal::from(500);
        let p = payment(PaymentStatus::Succeeded);
        let proof = completion_proof(&price, None, Some(&p)).unwrap();
        assert_eq!(proof.proof, "payment:HB-TESTREF");
        assert_eq!(proof.worker_credit, p.worker_amount);
    }

    #[test]
    fn test_no_proof_without_upload_or_settled_payment() {
        let price = BigDecimal::from(500);
        assert_eq!(completion_proof(&price, None, None), None);

        // An in-flight payment is not proof; it may still fail.
        let p = payment(PaymentStatus::Processing);
        assert_eq!(completion_proof(&price, None, Some(&p)), None);
    }

    #[test]
    fn test_active_statuses() {
        assert!(PaymentStatus::Pending.is_active());
        assert!(PaymentStatus::Processing.is_active());
        assert!(PaymentStatus::Succeeded.is_active());
        assert!(!PaymentStatus::Failed.is_active());
        assert!(!PaymentStatus::Cancelled.is_active());
    }
}
