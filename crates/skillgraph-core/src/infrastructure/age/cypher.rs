//! SQL text for `cypher()` calls
//!
//! AGE takes the Cypher body as a dollar-quoted string, so values cannot be bound
//! as parameters. Integers are formatted from typed values, strings go through
//! [`quote`], and the graph name is validated by the caller.

use crate::domain::taxonomy::{EdgeType, NodeLabel};

const CONTAINS: &str = EdgeType::Contains.as_str();

/// Wrap a Cypher body for a query returning `columns` agtype columns
///
/// Each column is rendered to text with `agtype_out` so it decodes as a plain string.
pub fn select(graph: &str, body: &str, columns: &[&str]) -> String {
    let rendered = columns
        .iter()
        .map(|c| format!("ag_catalog.agtype_out({c})::text AS {c}"))
        .collect::<Vec<_>>()
        .join(", ");
    let defs = columns
        .iter()
        .map(|c| format!("{c} agtype"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("SELECT {rendered} FROM cypher('{graph}', $${body}$$) AS ({defs})")
}

/// Wrap a Cypher body whose result is ignored
pub fn execute(graph: &str, body: &str) -> String {
    format!("SELECT * FROM cypher('{graph}', $${body}$$) AS (v agtype)")
}

/// Quote a string as a Cypher literal
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

pub fn nodes_of_profession(profession_id: i64) -> String {
    format!("MATCH (n) WHERE n.profession_id = {profession_id} RETURN n")
}

pub fn contains_edges_of_profession(profession_id: i64) -> String {
    format!(
        "MATCH (a)-[r:{CONTAINS}]->(b) \
         WHERE a.profession_id = {profession_id} AND b.profession_id = {profession_id} \
         RETURN a, r, b"
    )
}

pub fn merge_profession(profession_id: i64, name: &str) -> String {
    format!(
        "MERGE (p:Profession {{profession_id: {profession_id}}}) SET p.name = {}",
        quote(name)
    )
}

pub fn merge_category(profession_id: i64, name: &str) -> String {
    format!(
        "MERGE (c:Category {{name: {}, profession_id: {profession_id}}})",
        quote(name)
    )
}

pub fn merge_skill(profession_id: i64, skill_id: i64, name: &str, value: i64) -> String {
    format!(
        "MERGE (s:Skill {{skill_id: {skill_id}, profession_id: {profession_id}}}) \
         SET s.name = {}, s.value = {value}",
        quote(name)
    )
}

pub fn merge_contains(
    profession_id: i64,
    from: (NodeLabel, &str),
    to: (NodeLabel, &str),
) -> String {
    format!(
        "MATCH (a:{} {{name: {}, profession_id: {profession_id}}}) \
         MATCH (b:{} {{name: {}, profession_id: {profession_id}}}) \
         MERGE (a)-[:{CONTAINS}]->(b)",
        from.0.as_str(),
        quote(from.1),
        to.0.as_str(),
        quote(to.1)
    )
}
