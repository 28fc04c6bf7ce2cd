//! Commands module - all operations as library functions
//!
//! These commands are used by the CLI.

pub mod graph;
pub mod import;

pub use graph::{
    CoverageExport, StatusExport, TaxonomySnapshot, ambiguous_skill_names,
    classify_profession_skills, classify_snapshot, coverage_tree_of, export_coverage_tree,
    load_taxonomy, reserved_skill_names,
};
pub use import::{ImportSummary, PlannedDocument, import_documents, plan_directory, plan_file};
