use std::cmp::Ordering;
use std::collections::HashSet;

use crate::ir::{FamilyGraph, Person, RelationKind};

use super::types::{
    FamilyTree, NodeId, NodeRef, ReconstructStats, SpouseLink, SyntheticKind, TreeNode,
};

pub type Comparator<'a> = dyn Fn(&Person, &Person) -> Ordering + 'a;

pub struct ReconstructOptions<'a> {
    pub hide_marriage_nodes: bool,
    /// Orders children and marriages. `None` keeps snapshot order.
    pub comparator: Option<&'a Comparator<'a>>,
}

impl Default for ReconstructOptions<'_> {
    fn default() -> Self {
        Self {
            hide_marriage_nodes: true,
            comparator: None,
        }
    }
}

const SUPER_ROOT: NodeId = 0;

/// Smallest spacer chain a single record may ask for, whatever the snapshot size.
const DEPTH_OFFSET_FLOOR: usize = 16;

struct Reconstructor<'g, 'o, 'c> {
    graph: &'g FamilyGraph,
    options: &'o ReconstructOptions<'c>,
    nodes: Vec<TreeNode>,
    visited: HashSet<&'g str>,
    spouse_links: Vec<SpouseLink>,
    stats: ReconstructStats,
}

/// A spouse accepted for one marriage of the person being placed.
struct Marriage<'g> {
    spouse: &'g Person,
    kind: RelationKind,
    children: Vec<(&'g Person, RelationKind)>,
}

/// Pending step of the depth-first walk. Steps live on an explicit stack so
/// long lineages do not grow the call stack.
enum Task<'g> {
    Place {
        person: &'g Person,
        parent: NodeId,
        lineage: RelationKind,
    },
    Marriage {
        person: &'g Person,
        person_node: NodeId,
        slot: NodeId,
        index: usize,
        marriage: Marriage<'g>,
    },
    Link(SpouseLink),
}

pub fn reconstruct(
    graph: &FamilyGraph,
    roots: &[&str],
    options: &ReconstructOptions<'_>,
) -> FamilyTree {
    let mut builder = Reconstructor {
        graph,
        options,
        nodes: vec![TreeNode {
            id: SUPER_ROOT,
            node_ref: NodeRef::Synthetic(SyntheticKind::SuperRoot),
            name: String::new(),
            gender: None,
            hidden: true,
            no_direct_parent_link: true,
            parent: None,
            children: Vec::new(),
            lineage: RelationKind::Blood,
            class: None,
            text_class: None,
        }],
        visited: HashSet::new(),
        spouse_links: Vec::new(),
        stats: ReconstructStats::default(),
    };

    for root_id in roots {
        match graph.lookup(root_id) {
            Some(person) => builder.walk(person),
            None => {
                tracing::warn!(root = %root_id, "requested root not in snapshot");
                builder.stats.missing_roots += 1;
            }
        }
    }

    tracing::debug!(
        nodes = builder.nodes.len(),
        marriages = builder.stats.marriages,
        spacers = builder.stats.spacers,
        skipped_duplicates = builder.stats.skipped_duplicates,
        pruned_references = builder.stats.pruned_references,
        "reconstructed family tree"
    );

    FamilyTree {
        nodes: builder.nodes,
        root: SUPER_ROOT,
        spouse_links: builder.spouse_links,
        stats: builder.stats,
    }
}

impl<'g> Reconstructor<'g, '_, '_> {
    fn push_node(&mut self, parent: NodeId, mut node: TreeNode) -> NodeId {
        let id = self.nodes.len();
        node.id = id;
        node.parent = Some(parent);
        self.nodes.push(node);
        self.nodes[parent].children.push(id);
        id
    }

    fn sort(&self, people: &mut [(&'g Person, RelationKind)]) {
        if let Some(compare) = self.options.comparator {
            people.sort_by(|a, b| compare(a.0, b.0));
        }
    }

    fn resolve_links(
        &mut self,
        links: &[crate::ir::RelationRef],
        fallback: RelationKind,
    ) -> Vec<(&'g Person, RelationKind)> {
        let (resolved, pruned) = self.graph.resolve_links(links, fallback);
        self.stats.pruned_references += pruned;
        resolved
    }

    fn depth_offset(&self, person: &Person) -> usize {
        let requested = person.depth_offset.unwrap_or(0);
        let limit = self.graph.len().max(DEPTH_OFFSET_FLOOR);
        if requested > limit {
            tracing::warn!(
                id = %person.id,
                requested,
                limit,
                "depth offset exceeds snapshot size, clamping"
            );
            return limit;
        }
        requested
    }

    fn person_node(person: &Person, lineage: RelationKind, detached: bool) -> TreeNode {
        TreeNode {
            id: 0,
            node_ref: NodeRef::Person(person.id.clone()),
            name: person.name.clone(),
            gender: Some(person.gender),
            hidden: false,
            no_direct_parent_link: detached,
            parent: None,
            children: Vec::new(),
            lineage,
            class: person.class.clone(),
            text_class: person.text_class.clone(),
        }
    }

    fn synthetic_node(kind: SyntheticKind, hidden: bool, detached: bool) -> TreeNode {
        TreeNode {
            id: 0,
            node_ref: NodeRef::Synthetic(kind),
            name: String::new(),
            gender: None,
            hidden,
            no_direct_parent_link: detached,
            parent: None,
            children: Vec::new(),
            lineage: RelationKind::Blood,
            class: None,
            text_class: None,
        }
    }

    /// Places `root` and everything reachable below it. Direct children are
    /// finished before the first marriage group, and each marriage's children
    /// before its spouse link is recorded.
    fn walk(&mut self, root: &'g Person) {
        let mut stack = vec![Task::Place {
            person: root,
            parent: SUPER_ROOT,
            lineage: RelationKind::Blood,
        }];
        while let Some(task) = stack.pop() {
            match task {
                Task::Place {
                    person,
                    parent,
                    lineage,
                } => self.place_person(person, parent, lineage, &mut stack),
                Task::Marriage {
                    person,
                    person_node,
                    slot,
                    index,
                    marriage,
                } => self.place_marriage(person, person_node, slot, index, marriage, &mut stack),
                Task::Link(link) => self.spouse_links.push(link),
            }
        }
    }

    fn place_person(
        &mut self,
        person: &'g Person,
        parent: NodeId,
        lineage: RelationKind,
        stack: &mut Vec<Task<'g>>,
    ) {
        if !self.visited.insert(person.id.as_str()) {
            tracing::trace!(id = %person.id, "person already placed, skipping");
            self.stats.skipped_duplicates += 1;
            return;
        }

        let detached = parent == SUPER_ROOT;
        let mut slot = parent;
        for _ in 0..self.depth_offset(person) {
            let spacer = Self::synthetic_node(
                SyntheticKind::Spacer {
                    person: person.id.clone(),
                },
                true,
                detached,
            );
            slot = self.push_node(slot, spacer);
            self.stats.spacers += 1;
        }
        let node_id = self.push_node(slot, Self::person_node(person, lineage, detached));

        let mut marriages = self.collect_marriages(person);
        let children = self.resolve_links(&person.children, RelationKind::Blood);
        let mut direct = Vec::new();
        for (child, kind) in children {
            let lineage = child.relation_to_parent(&person.id).unwrap_or(kind);
            let shared = if child.has_parent(&person.id) {
                marriages
                    .iter_mut()
                    .find(|marriage| child.has_parent(&marriage.spouse.id))
            } else {
                None
            };
            match shared {
                Some(marriage) => marriage.children.push((child, lineage)),
                None => direct.push((child, lineage)),
            }
        }
        self.sort(&mut direct);

        // Pushed in reverse so they pop in display order.
        for (index, marriage) in marriages.into_iter().enumerate().rev() {
            stack.push(Task::Marriage {
                person,
                person_node: node_id,
                slot,
                index,
                marriage,
            });
        }
        for (child, lineage) in direct.into_iter().rev() {
            stack.push(Task::Place {
                person: child,
                parent: node_id,
                lineage,
            });
        }
    }

    fn place_marriage(
        &mut self,
        person: &'g Person,
        person_node: NodeId,
        slot: NodeId,
        index: usize,
        mut marriage: Marriage<'g>,
        stack: &mut Vec<Task<'g>>,
    ) {
        let marriage_id = self.push_node(
            slot,
            Self::synthetic_node(
                SyntheticKind::Marriage {
                    person: person.id.clone(),
                    spouse: marriage.spouse.id.clone(),
                },
                self.options.hide_marriage_nodes,
                true,
            ),
        );
        let spouse_id = self.push_node(slot, Self::person_node(marriage.spouse, marriage.kind, true));
        self.stats.marriages += 1;

        stack.push(Task::Link(SpouseLink {
            person_a: person.id.clone(),
            person_b: marriage.spouse.id.clone(),
            source: person_node,
            target: spouse_id,
            marriage: marriage_id,
            sequence_index: index,
            kind: marriage.kind,
        }));
        self.sort(&mut marriage.children);
        for (child, lineage) in marriage.children.into_iter().rev() {
            stack.push(Task::Place {
                person: child,
                parent: marriage_id,
                lineage,
            });
        }
    }

    /// Spouses that get a marriage group, in display order. Spouses are
    /// reserved in the visited set here so no descendant can claim them.
    fn collect_marriages(&mut self, person: &'g Person) -> Vec<Marriage<'g>> {
        let mut spouses = self.resolve_links(&person.spouses, RelationKind::Married);
        self.sort(&mut spouses);
        let mut marriages = Vec::with_capacity(spouses.len());
        for (spouse, kind) in spouses {
            if !self.visited.insert(spouse.id.as_str()) {
                tracing::trace!(
                    person = %person.id,
                    spouse = %spouse.id,
                    "spouse already placed, dropping marriage group"
                );
                self.stats.skipped_duplicates += 1;
                continue;
            }
            marriages.push(Marriage {
                spouse,
                kind,
                children: Vec::new(),
            });
        }
        marriages
    }
}
