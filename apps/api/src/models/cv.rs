use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CvRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub language: String,
    pub text_content: String,
    pub s3_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Interview / CV language. The product ships Hungarian and English.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Hu,
    En,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Hu => "hu",
            Language::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "hu" => Ok(Language::Hu),
            "en" => Ok(Language::En),
            other => Err(format!("unsupported language '{other}' (expected 'hu' or 'en')")),
        }
    }
}
