use anyhow::Result;
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize)]
pub struct DeletionSummary {
    pub interviews: u64,
    pub cvs: u64,
    pub settings: u64,
}

/// Deletes every interview (with its questions and answers), CV and settings row of
/// the user in one transaction. The user row itself stays; the auth provider owns it.
pub async fn delete_account_data(pool: &PgPool, user_id: Uuid) -> Result<DeletionSummary> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "DELETE FROM interview_answers WHERE interview_id IN (SELECT id FROM interviews WHERE user_id = $1)",
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "DELETE FROM interview_questions WHERE interview_id IN (SELECT id FROM interviews WHERE user_id = $1)",
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    let interviews = sqlx::query("DELETE FROM interviews WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let cvs = sqlx::query("DELETE FROM cvs WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let settings = sqlx::query("DELETE FROM user_settings WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;

    info!("Deleted account data for user {user_id}: {interviews} interviews, {cvs} CVs");
    Ok(DeletionSummary {
        interviews,
        cvs,
        settings,
    })
}
