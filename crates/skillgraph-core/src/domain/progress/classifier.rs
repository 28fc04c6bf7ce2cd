//! Four-way classification of a user's skills against a taxonomy

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::taxonomy::{CollectedSkill, coverage_percent};
use crate::error::{Error, Result};

use super::record::{SkillStatus, UserSkillRecord};

/// How to treat a progress record whose status is not a known [`SkillStatus`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownStatusPolicy {
    /// Leave the skill out of every bucket and list it in [`StatusReport::rejected`]
    #[default]
    Drop,
    /// Fail the whole classification
    Error,
}

impl UnknownStatusPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drop => "drop",
            Self::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "drop" => Some(Self::Drop),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// A taxonomy skill the user is tracking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedSkill {
    pub name: String,
    pub count: i64,
    pub proficiency: i64,
    pub percent: f64,
    pub priority: Option<i64>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub status: SkillStatus,
}

/// A taxonomy skill the user is not tracking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrayZoneSkill {
    pub name: String,
    pub count: i64,
}

/// A tracked skill left out of the buckets because of its status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedSkill {
    pub name: String,
    pub skill_id: i64,
    pub status: String,
}

/// Skills bucketed by tracking status
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub process: Vec<ClassifiedSkill>,
    pub inactive: Vec<ClassifiedSkill>,
    pub complete: Vec<ClassifiedSkill>,
    pub gray_zone: Vec<GrayZoneSkill>,
    #[serde(skip)]
    pub rejected: Vec<RejectedSkill>,
}

impl StatusReport {
    pub fn bucket(&self, status: SkillStatus) -> &[ClassifiedSkill] {
        match status {
            SkillStatus::Process => &self.process,
            SkillStatus::Inactive => &self.inactive,
            SkillStatus::Complete => &self.complete,
        }
    }

    fn bucket_mut(&mut self, status: SkillStatus) -> &mut Vec<ClassifiedSkill> {
        match status {
            SkillStatus::Process => &mut self.process,
            SkillStatus::Inactive => &mut self.inactive,
            SkillStatus::Complete => &mut self.complete,
        }
    }

    /// Number of skills across the four buckets
    pub fn total(&self) -> usize {
        self.process.len() + self.inactive.len() + self.complete.len() + self.gray_zone.len()
    }
}

/// Joins collected taxonomy skills with a user's progress, keyed by skill id
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusClassifier {
    policy: UnknownStatusPolicy,
}

impl StatusClassifier {
    pub fn new(policy: UnknownStatusPolicy) -> Self {
        Self { policy }
    }

    pub fn classify(
        &self,
        skills: &[CollectedSkill],
        progress: &HashMap<i64, UserSkillRecord>,
    ) -> Result<StatusReport> {
        let mut report = StatusReport::default();

        for skill in skills {
            let Some(record) = skill.skill_id.and_then(|id| progress.get(&id)) else {
                report.gray_zone.push(GrayZoneSkill {
                    name: skill.name.clone(),
                    count: skill.count,
                });
                continue;
            };

            let Some(status) = record.parsed_status() else {
                if self.policy == UnknownStatusPolicy::Error {
                    return Err(Error::InvalidInput(format!(
                        "skill '{}' ({}) has unknown status '{}'",
                        skill.name, record.skill_id, record.status
                    )));
                }
                warn!(
                    skill = %skill.name,
                    skill_id = record.skill_id,
                    status = %record.status,
                    "Dropping skill with unknown status"
                );
                report.rejected.push(RejectedSkill {
                    name: skill.name.clone(),
                    skill_id: record.skill_id,
                    status: record.status.clone(),
                });
                continue;
            };

            report.bucket_mut(status).push(ClassifiedSkill {
                name: skill.name.clone(),
                count: skill.count,
                proficiency: record.proficiency,
                percent: coverage_percent(record.proficiency, skill.count),
                priority: record.priority,
                start_date: record.start_date,
                end_date: record.end_date,
                status,
            });
        }

        debug!(
            process = report.process.len(),
            inactive = report.inactive.len(),
            complete = report.complete.len(),
            gray_zone = report.gray_zone.len(),
            rejected = report.rejected.len(),
            "Classified skills"
        );
        Ok(report)
    }
}
