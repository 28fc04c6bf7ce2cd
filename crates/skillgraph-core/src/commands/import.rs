//! Taxonomy import commands
//!
//! Documents are read and planned up front, so a bad file fails the run before
//! anything is written.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::taxonomy::{AppliedProfession, ImportPlan, TaxonomyWriter, plan_import_str};
use crate::error::{Error, Result};

/// A planned document
#[derive(Debug, Clone, Serialize)]
pub struct PlannedDocument {
    pub path: PathBuf,
    pub plan: ImportPlan,
}

/// Outcome of [`import_documents`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub graph_created: bool,
    pub professions: Vec<AppliedProfession>,
}

impl ImportSummary {
    pub fn node_count(&self) -> usize {
        self.professions.iter().map(|p| p.nodes).sum()
    }

    pub fn link_count(&self) -> usize {
        self.professions.iter().map(|p| p.links).sum()
    }
}

/// Read and plan one JSON document
pub fn plan_file(path: &Path) -> Result<PlannedDocument> {
    let contents = fs::read_to_string(path)?;
    let plan = plan_import_str(&contents).map_err(|e| {
        Error::InvalidInput(format!("{}: {}", path.display(), e))
    })?;
    debug!(
        path = %path.display(),
        professions = plan.professions.len(),
        nodes = plan.node_count(),
        "Planned document"
    );
    Ok(PlannedDocument {
        path: path.to_path_buf(),
        plan,
    })
}

/// Plan every `*.json` file of a directory, in file name order
pub fn plan_directory(dir: &Path) -> Result<Vec<PlannedDocument>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();
    paths.iter().map(|p| plan_file(p)).collect()
}

/// Write planned documents to the graph
pub async fn import_documents(
    writer: &dyn TaxonomyWriter,
    documents: &[PlannedDocument],
) -> Result<ImportSummary> {
    let mut summary = ImportSummary {
        graph_created: writer.ensure_graph().await?,
        ..Default::default()
    };

    for document in documents {
        for profession in &document.plan.professions {
            summary
                .professions
                .push(writer.apply_profession(profession).await?);
        }
    }

    info!(
        documents = documents.len(),
        professions = summary.professions.len(),
        nodes = summary.node_count(),
        links = summary.link_count(),
        "Import complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::taxonomy::ProfessionPlan;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingWriter {
        applied: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TaxonomyWriter for RecordingWriter {
        async fn ensure_graph(&self) -> Result<bool> {
            Ok(true)
        }

        async fn apply_profession(&self, plan: &ProfessionPlan) -> Result<AppliedProfession> {
            let mut applied = self.applied.lock().unwrap();
            applied.push(plan.name.clone());
            Ok(AppliedProfession {
                name: plan.name.clone(),
                profession_id: applied.len() as i64,
                nodes: plan.nodes.len() + 1,
                links: plan.links.len(),
            })
        }
    }

    #[test]
    fn test_plan_directory_reads_json_only() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.json"), r#"{"B": {"Go": {"count": 2}}}"#).unwrap();
        fs::write(dir.path().join("a.json"), r#"{"A": {}}"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let docs = plan_directory(dir.path()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].plan.professions[0].name, "A");
    }

    #[test]
    fn test_bad_file_names_the_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "[]").unwrap();
        let err = plan_file(&path).unwrap_err();
        assert!(err.to_string().contains("bad.json"));
    }

    #[tokio::test]
    async fn test_import_documents_applies_every_profession() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("t.json"),
            r#"{"B": {"SQL": {"count": 5}}, "A": {"tools": {"Git": {"count": 3}}}}"#,
        )
        .unwrap();
        let docs = plan_directory(dir.path()).unwrap();
        let writer = RecordingWriter::default();

        let summary = import_documents(&writer, &docs).await.unwrap();
        assert!(summary.graph_created);
        assert_eq!(*writer.applied.lock().unwrap(), vec!["B", "A"]);
        assert_eq!(summary.node_count(), 5);
        assert_eq!(summary.link_count(), 3);
    }
}
