//! Father-line ancestor chains.
//!
//! The walk follows the first male parent of each person only. A person whose
//! recorded parents are all female has an empty chain even when the mother has
//! a recorded father: breadcrumbs show the patriline, not "any ancestor".

use crate::ir::{FamilyGraph, Gender};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainEntry {
    pub id: String,
    pub name: String,
}

/// Ancestors ordered from the most distant forefather to the immediate father.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HierarchyChain {
    pub entries: Vec<ChainEntry>,
}

impl HierarchyChain {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn forefather(&self) -> Option<&ChainEntry> {
        self.entries.first()
    }

    pub fn breadcrumbs(&self, separator: &str) -> String {
        self.entries
            .iter()
            .map(|entry| entry.name.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

pub fn hierarchy_chain(graph: &FamilyGraph, start_id: &str) -> HierarchyChain {
    let mut entries = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(start_id);

    let mut current = graph.lookup(start_id);
    while let Some(person) = current {
        let father = graph
            .parents_of(&person.id)
            .into_iter()
            .map(|(parent, _)| parent)
            .find(|parent| parent.gender == Gender::Male);
        let Some(father) = father else {
            break;
        };
        if !visited.insert(father.id.as_str()) {
            tracing::debug!(start = %start_id, at = %father.id, "patriline loops back, stopping");
            break;
        }
        entries.insert(
            0,
            ChainEntry {
                id: father.id.clone(),
                name: father.name.clone(),
            },
        );
        current = Some(father);
    }

    HierarchyChain { entries }
}

/// Top of the person's patriline, or the person itself when no father is recorded.
pub fn default_root<'a>(graph: &'a FamilyGraph, id: &str) -> Option<&'a str> {
    let person = graph.lookup(id)?;
    let chain = hierarchy_chain(graph, id);
    match chain.forefather() {
        Some(entry) => graph.lookup(&entry.id).map(|p| p.id.as_str()),
        None => Some(person.id.as_str()),
    }
}
