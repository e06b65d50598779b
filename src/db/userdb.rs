// db/userdb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::usermodel::User;

const USER_COLUMNS: &str = r#"
    id, name, email, phone, role, verified, barangay, skills, sms_opt_in,
    created_at, updated_at
"#;

#[async_trait]
pub trait UserExt {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, Error>;

    /// Workers in a barangay whose skills overlap the given set. Used to
    /// pick recipients for new-job notifications.
    async fn get_matching_workers(
        &self,
        barangay: &str,
        skills: &[String],
        limit: i64,
    ) -> Result<Vec<User>, Error>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"SELECT {USER_COLUMNS} FROM users WHERE id = $1"#
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_matching_workers(
        &self,
        barangay: &str,
        skills: &[String],
        limit: i64,
    ) -> Result<Vec<User>, Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE role IN ('employee', 'both')
              AND barangay = $1
              AND skills && $2
            LIMIT $3
            "#
        ))
        .bind(barangay)
        .bind(skills)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }
}
