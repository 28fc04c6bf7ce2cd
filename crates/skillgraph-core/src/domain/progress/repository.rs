//! Source trait for user progress

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;

use super::record::{UserProgress, UserSkillRecord};

#[async_trait]
pub trait ProgressSource: Send + Sync {
    /// Every tracked skill of the user; an unknown user has empty progress
    async fn load_user_progress(&self, user_id: i64) -> Result<UserProgress>;
}

/// Progress held in memory, keyed by user id
#[derive(Debug, Clone, Default)]
pub struct InMemoryProgressSource {
    users: HashMap<i64, Vec<UserSkillRecord>>,
}

impl InMemoryProgressSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user_id: i64, records: Vec<UserSkillRecord>) -> Self {
        self.users.insert(user_id, records);
        self
    }
}

#[async_trait]
impl ProgressSource for InMemoryProgressSource {
    async fn load_user_progress(&self, user_id: i64) -> Result<UserProgress> {
        Ok(self
            .users
            .get(&user_id)
            .map(|records| UserProgress::new(records.clone()))
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::progress::record::SkillStatus;

    #[tokio::test]
    async fn test_in_memory_progress() {
        let source = InMemoryProgressSource::new()
            .with_user(7, vec![UserSkillRecord::new(1, "SQL", 3, SkillStatus::Process)]);
        assert_eq!(source.load_user_progress(7).await.unwrap().records().len(), 1);
        assert!(source.load_user_progress(8).await.unwrap().is_empty());
    }
}
