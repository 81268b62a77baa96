use anyhow::Result;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::user::UserRow;

/// Identity as reported by the auth provider after sign-in.
pub struct SignedInUser<'a> {
    pub email: &'a str,
    pub name: Option<&'a str>,
    pub picture: Option<&'a str>,
}

/// Returns the user with this e-mail, creating it on first sign-in.
/// Name and picture are refreshed only when the provider sends them.
pub async fn ensure_user(pool: &PgPool, user: SignedInUser<'_>) -> Result<UserRow> {
    let row: UserRow = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, name, picture)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE
            SET name = COALESCE(EXCLUDED.name, users.name),
                picture = COALESCE(EXCLUDED.picture, users.picture)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.email)
    .bind(user.name)
    .bind(user.picture)
    .fetch_one(pool)
    .await?;

    info!("User {} signed in", row.id);
    Ok(row)
}

pub async fn find_user(pool: &PgPool, user_id: Uuid) -> Result<Option<UserRow>> {
    Ok(sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?)
}

/// Very small sanity check; the auth provider has already verified the address.
pub fn looks_like_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.ends_with('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_like_email() {
        assert!(looks_like_email("anna@example.com"));
        assert!(looks_like_email("  anna@example.hu "));
        assert!(!looks_like_email("anna"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("anna@localhost"));
        assert!(!looks_like_email("anna@example."));
    }
}
