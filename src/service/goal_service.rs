// service/goal_service.rs
use std::sync::Arc;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, goaldb::GoalExt},
    models::goalmodel::Goal,
    service::error::ServiceError,
};

/// Thin adapter over the goal ledger. Job completion credits the worker's
/// active goal; the rollover logic itself lives with the goal subsystem.
#[derive(Debug, Clone)]
pub struct GoalService {
    db_client: Arc<DBClient>,
}

impl GoalService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    /// Returns the credited goal, or `None` when the worker has no active
    /// goal (the credit is simply dropped in that case).
    pub async fn credit_goal(
        &self,
        worker_id: Uuid,
        amount: &BigDecimal,
    ) -> Result<Option<Goal>, ServiceError> {
        let goal = self.db_client.credit_active_goal(worker_id, amount).await?;
        if let Some(ref g) = goal {
            tracing::info!(
                "credited {} to goal \"{}\" for worker {}",
                amount,
                g.title,
                worker_id
            );
        }
        Ok(goal)
    }
}
