use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;

/// Answers whether an interview belongs to a user.
#[async_trait]
pub trait InterviewOwnership: Send + Sync {
    async fn owns(&self, interview_id: Uuid, user_id: Uuid) -> Result<bool, AppError>;
}

/// Reads ownership from the `interviews` table.
pub struct PgInterviewOwnership(pub PgPool);

#[async_trait]
impl InterviewOwnership for PgInterviewOwnership {
    async fn owns(&self, interview_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let owned: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM interviews WHERE id = $1 AND user_id = $2)",
        )
        .bind(interview_id)
        .bind(user_id)
        .fetch_one(&self.0)
        .await?;
        Ok(owned)
    }
}

/// Someone else's interview is reported as missing.
pub async fn ensure_interview_owner(
    ownership: &dyn InterviewOwnership,
    interview_id: Uuid,
    user_id: Uuid,
) -> Result<(), AppError> {
    if !ownership.owns(interview_id, user_id).await? {
        return Err(AppError::NotFound(format!("Interview {interview_id} not found")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::KnownInterviews;

    #[tokio::test]
    async fn test_foreign_interview_is_not_found() {
        let (iv, owner, other) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let known = KnownInterviews::of(&[(iv, owner)]);

        assert!(ensure_interview_owner(&known, iv, owner).await.is_ok());
        assert!(matches!(
            ensure_interview_owner(&known, iv, other).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            ensure_interview_owner(&known, Uuid::new_v4(), owner).await,
            Err(AppError::NotFound(_))
        ));
    }
}
