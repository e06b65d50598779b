// db/goaldb.rs
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::goalmodel::Goal;

const GOAL_COLUMNS: &str = r#"
    id, user_id, title, target_amount, current_amount, completed,
    created_at, updated_at
"#;

#[async_trait]
pub trait GoalExt {
    /// Add an amount to the worker's active (oldest uncompleted) goal and
    /// flip it to completed when the target is reached. `Ok(None)` when the
    /// worker has no active goal.
    async fn credit_active_goal(
        &self,
        user_id: Uuid,
        amount: &BigDecimal,
    ) -> Result<Option<Goal>, Error>;
}

#[async_trait]
impl GoalExt for DBClient {
    async fn credit_active_goal(
        &self,
        user_id: Uuid,
        amount: &BigDecimal,
    ) -> Result<Option<Goal>, Error> {
        sqlx::query_as::<_, Goal>(&format!(
            r#"
            UPDATE goals
            SET current_amount = current_amount + $2,
                completed = (current_amount + $2 >= target_amount),
                updated_at = NOW()
            WHERE id = (
                SELECT id FROM goals
                WHERE user_id = $1 AND completed = FALSE
                ORDER BY created_at ASC
                LIMIT 1
            )
            RETURNING {GOAL_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await
    }
}
