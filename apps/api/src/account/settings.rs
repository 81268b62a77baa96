use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::models::user::{Plan, UserSettingsRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UserSettings {
    pub plan: Plan,
    pub email_notif: bool,
    pub newsletter: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            plan: Plan::Starter,
            email_notif: true,
            newsletter: false,
        }
    }
}

impl From<UserSettingsRow> for UserSettings {
    fn from(row: UserSettingsRow) -> Self {
        let plan = row.plan.parse().unwrap_or_else(|e| {
            warn!("User {} has {e}; treating as Starter", row.user_id);
            Plan::Starter
        });
        Self {
            plan,
            email_notif: row.email_notif,
            newsletter: row.newsletter,
        }
    }
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    pub plan: Option<Plan>,
    pub email_notif: Option<bool>,
    pub newsletter: Option<bool>,
}

impl SettingsUpdate {
    pub fn apply(&self, current: UserSettings) -> UserSettings {
        UserSettings {
            plan: self.plan.unwrap_or(current.plan),
            email_notif: self.email_notif.unwrap_or(current.email_notif),
            newsletter: self.newsletter.unwrap_or(current.newsletter),
        }
    }
}

/// Stored settings, or the defaults when the user never saved any.
pub async fn get_settings(pool: &PgPool, user_id: Uuid) -> Result<UserSettings> {
    let row: Option<UserSettingsRow> =
        sqlx::query_as("SELECT * FROM user_settings WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(UserSettings::from).unwrap_or_default())
}

pub async fn update_settings(
    pool: &PgPool,
    user_id: Uuid,
    update: &SettingsUpdate,
) -> Result<UserSettings> {
    let next = update.apply(get_settings(pool, user_id).await?);

    sqlx::query(
        r#"
        INSERT INTO user_settings (user_id, plan, email_notif, newsletter)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id) DO UPDATE
            SET plan = EXCLUDED.plan,
                email_notif = EXCLUDED.email_notif,
                newsletter = EXCLUDED.newsletter
        "#,
    )
    .bind(user_id)
    .bind(next.plan.as_str())
    .bind(next.email_notif)
    .bind(next.newsletter)
    .execute(pool)
    .await?;

    Ok(next)
}
