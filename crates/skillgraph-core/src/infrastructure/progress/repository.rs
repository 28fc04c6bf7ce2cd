//! PostgreSQL implementation of the ProgressSource

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{FromRow, PgPool};
use tracing::debug;

use crate::domain::progress::{ProgressSource, UserProgress, UserSkillRecord};
use crate::error::Result;
use crate::storage::timed;

const USER_PROGRESS_QUERY: &str = r#"
    SELECT s.id::bigint AS skill_id,
           s.name::text AS name,
           COALESCE(us.proficiency, 0)::bigint AS proficiency,
           us.status::text AS status,
           us.priority::bigint AS priority,
           us.start_date::timestamp AS start_date,
           us.end_date::timestamp AS end_date
    FROM user_skills us
    JOIN skills s ON s.id = us.id_skill
    WHERE us.id_user = $1
"#;

/// Reads `user_skills` joined with `skills`
#[derive(Clone)]
pub struct PgProgressRepository {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgProgressRepository {
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }
}

#[async_trait]
impl ProgressSource for PgProgressRepository {
    async fn load_user_progress(&self, user_id: i64) -> Result<UserProgress> {
        let rows: Vec<UserSkillRow> = timed(
            self.query_timeout,
            sqlx::query_as(USER_PROGRESS_QUERY)
                .bind(user_id)
                .fetch_all(&self.pool),
        )
        .await?;

        debug!(user_id, records = rows.len(), "Loaded user progress");
        Ok(UserProgress::new(
            rows.into_iter().map(UserSkillRow::into_record).collect(),
        ))
    }
}

#[derive(FromRow)]
struct UserSkillRow {
    skill_id: i64,
    name: String,
    proficiency: i64,
    status: Option<String>,
    priority: Option<i64>,
    start_date: Option<NaiveDateTime>,
    end_date: Option<NaiveDateTime>,
}

impl UserSkillRow {
    fn into_record(self) -> UserSkillRecord {
        UserSkillRecord {
            skill_id: self.skill_id,
            name: self.name,
            proficiency: self.proficiency,
            status: self.status.unwrap_or_default(),
            priority: self.priority,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}
