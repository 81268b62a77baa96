use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::account::settings::{get_settings, UserSettings};
use crate::account::users::find_user;
use crate::models::cv::CvRow;
use crate::models::interview::{InterviewRow, InterviewStatus};
use crate::models::user::Plan;

#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub member_since: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CvItem {
    pub id: Uuid,
    pub name: String,
    pub language: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterviewItem {
    pub id: Uuid,
    pub cv_name: String,
    pub role: String,
    pub status: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub score: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub remaining_this_month: u32,
    pub total_interviews: u32,
    pub avg_score: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub user: UserInfo,
    pub settings: UserSettings,
    pub stats: UserStats,
    pub cvs: Vec<CvItem>,
    pub interviews: Vec<InterviewItem>,
}

/// Display name used when the auth provider never sent one.
const ANONYMOUS_NAME: &str = "Anonymous user";

/// Returns `None` when the user does not exist.
pub async fn load_dashboard(pool: &PgPool, user_id: Uuid) -> Result<Option<DashboardData>> {
    let Some(user) = find_user(pool, user_id).await? else {
        return Ok(None);
    };
    let settings = get_settings(pool, user_id).await?;

    let cvs: Vec<CvRow> =
        sqlx::query_as("SELECT * FROM cvs WHERE user_id = $1 ORDER BY created_at ASC")
            .bind(user_id)
            .fetch_all(pool)
            .await?;

    let interviews: Vec<InterviewRow> =
        sqlx::query_as("SELECT * FROM interviews WHERE user_id = $1 ORDER BY created_at ASC")
            .bind(user_id)
            .fetch_all(pool)
            .await?;

    let stats = compute_stats(&interviews, settings.plan);

    Ok(Some(DashboardData {
        user: UserInfo {
            id: user.id,
            name: user.name.unwrap_or_else(|| ANONYMOUS_NAME.to_string()),
            email: user.email,
            member_since: user.created_at,
        },
        settings,
        stats,
        cvs: cvs
            .into_iter()
            .map(|cv| CvItem {
                id: cv.id,
                name: cv.title,
                language: cv.language,
                created_at: cv.created_at,
            })
            .collect(),
        interviews: interviews
            .into_iter()
            .map(|iv| InterviewItem {
                id: iv.id,
                cv_name: iv.cv_name,
                role: iv.role,
                status: iv.status,
                scheduled_at: iv.scheduled_at,
                score: iv.score,
            })
            .collect(),
    }))
}

/// Average counts only finished interviews that carry a score.
pub fn compute_stats(interviews: &[InterviewRow], plan: Plan) -> UserStats {
    let total_interviews = interviews.len() as u32;

    let finished_scores: Vec<i32> = interviews
        .iter()
        .filter(|iv| iv.status.parse::<InterviewStatus>() == Ok(InterviewStatus::Finished))
        .filter_map(|iv| iv.score)
        .collect();

    let avg_score = if finished_scores.is_empty() {
        0
    } else {
        let sum: i64 = finished_scores.iter().map(|&s| i64::from(s)).sum();
        (sum as f64 / finished_scores.len() as f64).round().max(0.0) as u32
    };

    UserStats {
        remaining_this_month: plan.monthly_limit().saturating_sub(total_interviews),
        total_interviews,
        avg_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interview(status: &str, score: Option<i32>) -> InterviewRow {
        InterviewRow {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            cv_id: None,
            cv_name: "CV".to_string(),
            role: "Role".to_string(),
            status: status.to_string(),
            score,
            correct_count: None,
            total_questions: None,
            scheduled_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_average_ignores_unfinished_and_unscored() {
        let interviews = vec![
            interview("finished", Some(80)),
            interview("finished", Some(65)),
            interview("finished", None),
            interview("scheduled", Some(10)),
            interview("draft", None),
        ];
        let stats = compute_stats(&interviews, Plan::Pro);
        assert_eq!(stats.total_interviews, 5);
        assert_eq!(stats.avg_score, 73); // 72.5 rounds up
        assert_eq!(stats.remaining_this_month, 5);
    }

    #[test]
    fn test_remaining_never_goes_negative() {
        let interviews: Vec<_> = (0..5).map(|_| interview("draft", None)).collect();
        let stats = compute_stats(&interviews, Plan::Starter);
        assert_eq!(stats.remaining_this_month, 0);
        assert_eq!(stats.avg_score, 0);
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(
            compute_stats(&[], Plan::Premium),
            UserStats {
                remaining_this_month: 999,
                total_interviews: 0,
                avg_score: 0,
            }
        );
    }
}
