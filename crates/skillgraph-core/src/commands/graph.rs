//! Coverage-tree export and status classification commands
//!
//! Each command is one unit of work: fetch the profession's nodes, then its edges,
//! then compute in memory. The coverage tree matches progress to skills by name
//! and the status report matches by skill id.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::progress::{
    SkillStatus, StatusClassifier, StatusReport, UnknownStatusPolicy, UserProgress,
};
use crate::domain::taxonomy::{
    CollectedSkill, CoverageTree, DegradedRow, HierarchyBuilder, RESERVED_KEYS, SkillCollector,
    TaxonomyGraph, TaxonomySource,
};
use crate::error::Result;

/// A profession's taxonomy as fetched from the store
#[derive(Debug, Clone)]
pub struct TaxonomySnapshot {
    pub profession_id: i64,
    pub graph: TaxonomyGraph,
    /// Rows skipped while decoding nodes and edges
    pub degraded: Vec<DegradedRow>,
}

/// Result of [`export_coverage_tree`]
#[derive(Debug, Clone, Serialize)]
pub struct CoverageExport {
    #[serde(flatten)]
    pub tree: CoverageTree,
    #[serde(skip)]
    pub degraded: Vec<DegradedRow>,
}

/// Result of [`classify_profession_skills`]
#[derive(Debug, Clone, Serialize)]
pub struct StatusExport {
    #[serde(flatten)]
    pub report: StatusReport,
    #[serde(skip)]
    pub degraded: Vec<DegradedRow>,
}

/// Fetch nodes and edges of one profession, in that order
pub async fn load_taxonomy(
    source: &dyn TaxonomySource,
    profession_id: i64,
) -> Result<TaxonomySnapshot> {
    let nodes = source.fetch_nodes(profession_id).await?;
    let edges = source.fetch_edges(profession_id).await?;

    let mut degraded = nodes.degraded;
    degraded.extend(edges.degraded);
    if !degraded.is_empty() {
        warn!(profession_id, degraded = degraded.len(), "Taxonomy fetched with degraded rows");
    }

    let graph = TaxonomyGraph::new(nodes.items, &edges.items);
    info!(
        profession_id,
        nodes = graph.len(),
        edges = edges.items.len(),
        "Loaded taxonomy"
    );
    Ok(TaxonomySnapshot {
        profession_id,
        graph,
        degraded,
    })
}

/// Build the coverage tree of a profession annotated with a user's proficiency
///
/// Pass [`UserProgress::empty`] for a plain taxonomy export.
pub async fn export_coverage_tree(
    source: &dyn TaxonomySource,
    profession_id: i64,
    progress: &UserProgress,
) -> Result<CoverageExport> {
    let snapshot = load_taxonomy(source, profession_id).await?;
    coverage_tree_of(snapshot, progress)
}

/// In-memory half of [`export_coverage_tree`]
pub fn coverage_tree_of(
    snapshot: TaxonomySnapshot,
    progress: &UserProgress,
) -> Result<CoverageExport> {
    let skills = SkillCollector::new(&snapshot.graph).collect_all()?;
    warn_ambiguous_names(&skills);
    warn_reserved_names(&skills);

    let proficiency = progress.proficiency_by_name();
    let tree = HierarchyBuilder::new(&snapshot.graph, &proficiency).export()?;
    info!(
        profession_id = snapshot.profession_id,
        professions = tree.len(),
        "Exported coverage tree"
    );
    Ok(CoverageExport {
        tree,
        degraded: snapshot.degraded,
    })
}

/// Bucket a profession's skills by the user's tracking status
pub async fn classify_profession_skills(
    source: &dyn TaxonomySource,
    profession_id: i64,
    progress: &UserProgress,
    policy: UnknownStatusPolicy,
) -> Result<StatusExport> {
    let snapshot = load_taxonomy(source, profession_id).await?;
    classify_snapshot(snapshot, progress, policy)
}

/// In-memory half of [`classify_profession_skills`]
pub fn classify_snapshot(
    snapshot: TaxonomySnapshot,
    progress: &UserProgress,
    policy: UnknownStatusPolicy,
) -> Result<StatusExport> {
    let skills = SkillCollector::new(&snapshot.graph).collect_all()?;
    warn_ambiguous_names(&skills);
    warn_reserved_names(&skills);

    let report = StatusClassifier::new(policy).classify(&skills, &progress.by_skill_id())?;
    info!(
        profession_id = snapshot.profession_id,
        skills = skills.len(),
        process = report.bucket(SkillStatus::Process).len(),
        inactive = report.bucket(SkillStatus::Inactive).len(),
        complete = report.bucket(SkillStatus::Complete).len(),
        gray_zone = report.gray_zone.len(),
        "Classified profession skills"
    );
    Ok(StatusExport {
        report,
        degraded: snapshot.degraded,
    })
}

/// Skill names carried by more than one distinct skill id
pub fn ambiguous_skill_names(skills: &[CollectedSkill]) -> Vec<String> {
    let mut ids: BTreeMap<&str, BTreeSet<Option<i64>>> = BTreeMap::new();
    for skill in skills {
        ids.entry(skill.name.as_str()).or_default().insert(skill.skill_id);
    }
    ids.into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Skills whose name is a coverage-entry field
///
/// The coverage tree leaves these out while the status report still lists them.
pub fn reserved_skill_names(skills: &[CollectedSkill]) -> Vec<String> {
    let names: BTreeSet<&str> = skills
        .iter()
        .map(|s| s.name.as_str())
        .filter(|name| RESERVED_KEYS.contains(name))
        .collect();
    names.into_iter().map(str::to_string).collect()
}

fn warn_ambiguous_names(skills: &[CollectedSkill]) {
    for name in ambiguous_skill_names(skills) {
        warn!(
            skill = %name,
            "Skill name maps to several skill ids; proficiency lookup by name is ambiguous"
        );
    }
}

fn warn_reserved_names(skills: &[CollectedSkill]) {
    for name in reserved_skill_names(skills) {
        warn!(
            skill = %name,
            "Reserved skill name is left out of the coverage tree"
        );
    }
}
