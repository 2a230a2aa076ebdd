use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[serde(alias = "m", alias = "man", alias = "M")]
    Male,
    #[serde(alias = "f", alias = "woman", alias = "F")]
    Female,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Gender {
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Male => "man",
            Self::Female => "woman",
            Self::Unknown => "unknown",
        }
    }
}

/// Subtype carried by every relation link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    #[default]
    Blood,
    Adopted,
    Married,
    Divorced,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRef {
    #[serde(alias = "relatedId")]
    pub id: String,
    #[serde(rename = "type", alias = "relationSubtype", default)]
    pub kind: Option<RelationKind>,
}

impl RelationRef {
    pub fn new(id: &str, kind: RelationKind) -> Self {
        Self {
            id: id.to_string(),
            kind: Some(kind),
        }
    }

    pub fn kind_or(&self, fallback: RelationKind) -> RelationKind {
        self.kind.unwrap_or(fallback)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub gender: Gender,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parents: Vec<RelationRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<RelationRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub spouses: Vec<RelationRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub siblings: Vec<RelationRef>,
    /// Number of invisible generations to insert above this person.
    #[serde(default)]
    pub depth_offset: Option<usize>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub text_class: Option<String>,
}

impl Person {
    pub fn new(id: &str, name: &str, gender: Gender) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            gender,
            ..Default::default()
        }
    }

    pub fn has_parent(&self, id: &str) -> bool {
        self.parents.iter().any(|link| link.id == id)
    }

    pub fn relation_to_parent(&self, id: &str) -> Option<RelationKind> {
        self.parents
            .iter()
            .find(|link| link.id == id)
            .map(|link| link.kind_or(RelationKind::Blood))
    }
}

/// Immutable snapshot of one family tree, indexed by person id.
#[derive(Debug, Clone, Default)]
pub struct FamilyGraph {
    people: Vec<Person>,
    index: HashMap<String, usize>,
}

impl FamilyGraph {
    pub fn new(people: Vec<Person>) -> Self {
        let mut kept = Vec::with_capacity(people.len());
        let mut index = HashMap::with_capacity(people.len());
        for person in people {
            if index.contains_key(&person.id) {
                tracing::warn!(id = %person.id, "duplicate person id in snapshot, keeping first record");
                continue;
            }
            index.insert(person.id.clone(), kept.len());
            kept.push(person);
        }
        Self {
            people: kept,
            index,
        }
    }

    pub fn lookup(&self, id: &str) -> Option<&Person> {
        self.index.get(id).map(|&idx| &self.people[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn parents_of(&self, id: &str) -> Vec<(&Person, RelationKind)> {
        self.resolve(id, |person| &person.parents, RelationKind::Blood)
    }

    pub fn children_of(&self, id: &str) -> Vec<(&Person, RelationKind)> {
        self.resolve(id, |person| &person.children, RelationKind::Blood)
    }

    pub fn spouses_of(&self, id: &str) -> Vec<(&Person, RelationKind)> {
        self.resolve(id, |person| &person.spouses, RelationKind::Married)
    }

    pub fn siblings_of(&self, id: &str) -> Vec<(&Person, RelationKind)> {
        self.resolve(id, |person| &person.siblings, RelationKind::Blood)
    }

    /// Resolves a relation list against the snapshot, returning the people
    /// found and the number of ids without a record.
    pub fn resolve_links(
        &self,
        links: &[RelationRef],
        fallback: RelationKind,
    ) -> (Vec<(&Person, RelationKind)>, usize) {
        let mut resolved = Vec::with_capacity(links.len());
        let mut pruned = 0;
        for link in links {
            match self.lookup(&link.id) {
                Some(related) => resolved.push((related, link.kind_or(fallback))),
                None => {
                    tracing::trace!(id = %link.id, "dropping dangling relation");
                    pruned += 1;
                }
            }
        }
        (resolved, pruned)
    }

    fn resolve<F>(&self, id: &str, links: F, fallback: RelationKind) -> Vec<(&Person, RelationKind)>
    where
        F: Fn(&Person) -> &Vec<RelationRef>,
    {
        match self.lookup(id) {
            Some(person) => self.resolve_links(links(person), fallback).0,
            None => Vec::new(),
        }
    }
}

/// Nullable columns in upstream exports read as the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
