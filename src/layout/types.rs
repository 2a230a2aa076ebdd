use serde::Serialize;

use crate::ir::{Gender, RelationKind};

pub type NodeId = usize;

#[derive(Debug, Clone)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SyntheticKind {
    SuperRoot,
    Marriage { person: String, spouse: String },
    Spacer { person: String },
}

/// What a tree slot stands for. Only `Person` slots resolve to a click target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeRef {
    Person(String),
    Synthetic(SyntheticKind),
}

impl NodeRef {
    pub fn person_id(&self) -> Option<&str> {
        match self {
            Self::Person(id) => Some(id.as_str()),
            Self::Synthetic(_) => None,
        }
    }

    pub fn is_marriage(&self) -> bool {
        matches!(self, Self::Synthetic(SyntheticKind::Marriage { .. }))
    }

    pub fn is_spacer(&self) -> bool {
        matches!(self, Self::Synthetic(SyntheticKind::Spacer { .. }))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Person(_) => "person",
            Self::Synthetic(SyntheticKind::SuperRoot) => "superRoot",
            Self::Synthetic(SyntheticKind::Marriage { .. }) => "marriage",
            Self::Synthetic(SyntheticKind::Spacer { .. }) => "spacer",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub id: NodeId,
    pub node_ref: NodeRef,
    pub name: String,
    pub gender: Option<Gender>,
    pub hidden: bool,
    pub no_direct_parent_link: bool,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Subtype of the link that placed this node under its parent.
    pub lineage: RelationKind,
    pub class: Option<String>,
    pub text_class: Option<String>,
}

impl TreeNode {
    pub fn is_marriage_node(&self) -> bool {
        self.node_ref.is_marriage()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpouseLink {
    pub person_a: String,
    pub person_b: String,
    pub source: NodeId,
    pub target: NodeId,
    pub marriage: NodeId,
    pub sequence_index: usize,
    pub kind: RelationKind,
}

/// Counters for everything the reconstructor silently dropped or synthesized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconstructStats {
    pub skipped_duplicates: usize,
    pub pruned_references: usize,
    pub missing_roots: usize,
    pub marriages: usize,
    pub spacers: usize,
}

#[derive(Debug, Clone)]
pub struct FamilyTree {
    pub nodes: Vec<TreeNode>,
    pub root: NodeId,
    pub spouse_links: Vec<SpouseLink>,
    pub stats: ReconstructStats,
}

impl FamilyTree {
    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    pub fn person_nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes
            .iter()
            .filter(|node| matches!(node.node_ref, NodeRef::Person(_)))
    }

    /// Person ids in node order; a person appears at most once.
    pub fn person_ids(&self) -> Vec<&str> {
        self.person_nodes()
            .filter_map(|node| node.node_ref.person_id())
            .collect()
    }

    pub fn find_person(&self, person_id: &str) -> Option<&TreeNode> {
        self.person_nodes()
            .find(|node| node.node_ref.person_id() == Some(person_id))
    }

    pub fn is_empty(&self) -> bool {
        self.nodes
            .get(self.root)
            .map(|root| root.children.is_empty())
            .unwrap_or(true)
    }
}

#[derive(Debug, Clone)]
pub struct LaidOutNode {
    pub id: NodeId,
    pub node_ref: NodeRef,
    pub name: String,
    pub label: TextBlock,
    pub gender: Option<Gender>,
    pub class: Option<String>,
    pub text_class: Option<String>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub depth: usize,
    pub subtree_width: f32,
    pub subtree_height: f32,
    pub hidden: bool,
    pub no_direct_parent_link: bool,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl LaidOutNode {
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_marriage_node(&self) -> bool {
        self.node_ref.is_marriage()
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

#[derive(Debug, Clone)]
pub struct TreeEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub points: Vec<(f32, f32)>,
    pub kind: RelationKind,
}

#[derive(Debug, Clone)]
pub struct SpouseLinkLayout {
    pub link: SpouseLink,
    pub points: Vec<(f32, f32)>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 && self.height <= 0.0
    }
}

#[derive(Debug, Clone)]
pub struct Layout {
    pub nodes: Vec<LaidOutNode>,
    pub root: NodeId,
    pub edges: Vec<TreeEdge>,
    pub spouse_links: Vec<SpouseLinkLayout>,
    pub bounds: Bounds,
    pub width: f32,
    pub height: f32,
    pub stats: ReconstructStats,
}

impl Layout {
    pub fn node(&self, id: NodeId) -> Option<&LaidOutNode> {
        self.nodes.get(id)
    }

    pub fn visible_nodes(&self) -> impl Iterator<Item = &LaidOutNode> {
        self.nodes.iter().filter(|node| !node.hidden)
    }

    pub fn person_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.node_ref.person_id().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.person_count() == 0
    }

    pub fn find_person(&self, person_id: &str) -> Option<&LaidOutNode> {
        self.nodes
            .iter()
            .find(|node| node.node_ref.person_id() == Some(person_id))
    }

    /// Person id behind a clicked node; synthetic nodes are not clickable.
    pub fn resolve_click(&self, node_id: NodeId) -> Option<&str> {
        self.node(node_id).and_then(|node| node.node_ref.person_id())
    }

    pub fn hit_test(&self, x: f32, y: f32) -> Option<&str> {
        self.nodes
            .iter()
            .filter(|node| !node.hidden)
            .find(|node| node.contains(x, y))
            .and_then(|node| node.node_ref.person_id())
    }
}
