use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSettingsRow {
    pub user_id: Uuid,
    pub plan: String,
    pub email_notif: bool,
    pub newsletter: bool,
}

/// Subscription plan. Determines how many interviews a user may run per month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plan {
    #[default]
    Starter,
    Pro,
    Premium,
}

impl Plan {
    pub fn monthly_limit(self) -> u32 {
        match self {
            Plan::Starter => 3,
            Plan::Pro => 10,
            Plan::Premium => 999,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Plan::Starter => "Starter",
            Plan::Pro => "Pro",
            Plan::Premium => "Premium",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Starter" => Ok(Plan::Starter),
            "Pro" => Ok(Plan::Pro),
            "Premium" => Ok(Plan::Premium),
            other => Err(format!("unknown plan '{other}'")),
        }
    }
}
