use crate::ir::{FamilyGraph, Person};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot is empty")]
    Empty,
    #[error("snapshot is not valid JSON ({json}) nor JSON5 ({json5})")]
    Syntax { json: String, json5: String },
}

#[derive(Debug, Deserialize)]
struct SnapshotDocument {
    people: Vec<Person>,
    #[serde(default)]
    roots: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Snapshot {
    pub graph: FamilyGraph,
    /// Roots named by the snapshot itself, in order.
    pub roots: Vec<String>,
}

impl Snapshot {
    pub fn root_ids(&self) -> Vec<&str> {
        self.roots.iter().map(String::as_str).collect()
    }
}

/// Parses an upstream snapshot: a bare array of person records or an object
/// with `people` and optional `roots`. Hand-edited JSON5 is accepted too.
pub fn parse_snapshot(input: &str) -> Result<Snapshot, SnapshotError> {
    let Some(first) = first_token(input) else {
        return Err(SnapshotError::Empty);
    };
    let is_array = first == '[';
    let (people, roots) = match decode_json(input, is_array) {
        Ok(decoded) => decoded,
        Err(json_err) => decode_json5(input, is_array).map_err(|json5_err| {
            SnapshotError::Syntax {
                json: json_err.to_string(),
                json5: json5_err.to_string(),
            }
        })?,
    };
    tracing::debug!(people = people.len(), roots = roots.len(), "parsed snapshot");
    Ok(Snapshot {
        graph: FamilyGraph::new(people),
        roots,
    })
}

fn decode_json(input: &str, is_array: bool) -> serde_json::Result<(Vec<Person>, Vec<String>)> {
    if is_array {
        return Ok((serde_json::from_str(input)?, Vec::new()));
    }
    let document: SnapshotDocument = serde_json::from_str(input)?;
    Ok((document.people, document.roots))
}

fn decode_json5(input: &str, is_array: bool) -> Result<(Vec<Person>, Vec<String>), json5::Error> {
    if is_array {
        return Ok((json5::from_str(input)?, Vec::new()));
    }
    let document: SnapshotDocument = json5::from_str(input)?;
    Ok((document.people, document.roots))
}

/// First character that is not whitespace, a byte-order mark or a comment.
fn first_token(input: &str) -> Option<char> {
    let mut rest = input.trim_start_matches('\u{feff}');
    loop {
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix("//") {
            rest = after.split_once('\n').map_or("", |(_, tail)| tail);
        } else if let Some(after) = rest.strip_prefix("/*") {
            rest = after.split_once("*/").map_or("", |(_, tail)| tail);
        } else {
            return rest.chars().next();
        }
    }
}
