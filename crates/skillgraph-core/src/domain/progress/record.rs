//! User skill progress records
//!
//! Progress lives in the relational store, keyed by the relational skill id.
//! The coverage tree looks proficiency up by skill *name* while the status report
//! joins on skill *id*; [`UserProgress`] serves both views.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Tracking status of a user's skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillStatus {
    /// Currently being learned
    Process,
    /// Planned but not started
    Inactive,
    /// Finished
    Complete,
}

impl SkillStatus {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::Inactive => "inactive",
            Self::Complete => "complete",
        }
    }

    /// Parse from the stored status column
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "process" => Some(Self::Process),
            "inactive" => Some(Self::Inactive),
            "complete" => Some(Self::Complete),
            _ => None,
        }
    }

    pub fn all() -> &'static [SkillStatus] {
        &[Self::Process, Self::Inactive, Self::Complete]
    }
}

impl std::fmt::Display for SkillStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One tracked skill of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSkillRecord {
    pub skill_id: i64,
    /// Skill name from the relational `skills` table
    pub name: String,
    pub proficiency: i64,
    /// Raw status column; see [`SkillStatus::parse`]
    pub status: String,
    pub priority: Option<i64>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
}

impl UserSkillRecord {
    pub fn new(
        skill_id: i64,
        name: impl Into<String>,
        proficiency: i64,
        status: SkillStatus,
    ) -> Self {
        Self {
            skill_id,
            name: name.into(),
            proficiency,
            status: status.as_str().to_string(),
            priority: None,
            start_date: None,
            end_date: None,
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_dates(mut self, start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn with_raw_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn parsed_status(&self) -> Option<SkillStatus> {
        SkillStatus::parse(&self.status)
    }
}

/// All tracked skills of one user
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserProgress {
    records: Vec<UserSkillRecord>,
}

impl UserProgress {
    pub fn new(records: Vec<UserSkillRecord>) -> Self {
        Self { records }
    }

    /// Progress for a user with nothing tracked
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[UserSkillRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records keyed by relational skill id
    pub fn by_skill_id(&self) -> HashMap<i64, UserSkillRecord> {
        self.records
            .iter()
            .map(|r| (r.skill_id, r.clone()))
            .collect()
    }

    /// Proficiency keyed by skill name
    pub fn proficiency_by_name(&self) -> HashMap<String, i64> {
        self.records
            .iter()
            .map(|r| (r.name.clone(), r.proficiency))
            .collect()
    }
}
