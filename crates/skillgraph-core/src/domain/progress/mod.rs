//! User progress and status classification

mod classifier;
mod record;
mod repository;

pub use classifier::{
    ClassifiedSkill, GrayZoneSkill, RejectedSkill, StatusClassifier, StatusReport,
    UnknownStatusPolicy,
};
pub use record::{SkillStatus, UserProgress, UserSkillRecord};
pub use repository::{InMemoryProgressSource, ProgressSource};
