mod reconstruct;
mod text;
mod tree;
pub(crate) mod types;
pub use reconstruct::{Comparator, ReconstructOptions, reconstruct};
pub use types::*;

use crate::config::{LayoutConfig, SiblingOrder};
use crate::ir::{FamilyGraph, Person};
use crate::theme::Theme;

/// Reconstructs the tree under `roots` and lays it out, ordering siblings by
/// `config.sibling_order`.
pub fn compute_layout(
    graph: &FamilyGraph,
    roots: &[&str],
    theme: &Theme,
    config: &LayoutConfig,
) -> Layout {
    let order = config.sibling_order;
    let by_order = move |a: &Person, b: &Person| order.compare(a, b);
    let comparator: Option<&Comparator<'_>> = match order {
        SiblingOrder::Input => None,
        _ => Some(&by_order),
    };
    compute_layout_with(graph, roots, theme, config, comparator)
}

pub fn compute_layout_with(
    graph: &FamilyGraph,
    roots: &[&str],
    theme: &Theme,
    config: &LayoutConfig,
    comparator: Option<&Comparator<'_>>,
) -> Layout {
    let options = ReconstructOptions {
        hide_marriage_nodes: config.hide_marriage_connector_nodes,
        comparator,
    };
    let family = reconstruct(graph, roots, &options);
    layout_family_tree(&family, theme, config)
}

/// Geometry for an already reconstructed tree.
pub fn layout_family_tree(family: &FamilyTree, theme: &Theme, config: &LayoutConfig) -> Layout {
    let layout = tree::layout_tree(family, theme, config);
    tracing::debug!(
        nodes = layout.nodes.len(),
        edges = layout.edges.len(),
        spouse_links = layout.spouse_links.len(),
        width = layout.width,
        height = layout.height,
        "computed family tree layout"
    );
    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Gender, RelationKind, RelationRef};
    use std::collections::HashSet;

    fn person(id: &str, gender: Gender) -> Person {
        Person::new(id, &id.to_uppercase(), gender)
    }

    fn marry(a: &mut Person, b: &mut Person) {
        a.spouses.push(RelationRef::new(&b.id, RelationKind::Married));
        b.spouses.push(RelationRef::new(&a.id, RelationKind::Married));
    }

    fn parent_of(parent: &mut Person, child: &mut Person) {
        parent.children.push(RelationRef::new(&child.id, RelationKind::Blood));
        child.parents.push(RelationRef::new(&parent.id, RelationKind::Blood));
    }

    /// Three generations, a remarriage and a few dangling ids.
    fn sample_family() -> FamilyGraph {
        let mut grandpa = person("grandpa", Gender::Male);
        let mut grandma = person("grandma", Gender::Female);
        let mut dad = person("dad", Gender::Male);
        let mut mom = person("mom", Gender::Female);
        let mut stepmom = person("stepmom", Gender::Female);
        let mut uncle = person("uncle", Gender::Male);
        let mut kid1 = person("kid1", Gender::Female);
        let mut kid2 = person("kid2", Gender::Male);
        let mut kid3 = person("kid3", Gender::Unknown);

        marry(&mut grandpa, &mut grandma);
        for child in [&mut dad, &mut uncle] {
            parent_of(&mut grandpa, child);
            parent_of(&mut grandma, child);
        }
        marry(&mut dad, &mut mom);
        marry(&mut dad, &mut stepmom);
        for child in [&mut kid1, &mut kid2] {
            parent_of(&mut dad, child);
            parent_of(&mut mom, child);
        }
        parent_of(&mut dad, &mut kid3);
        parent_of(&mut stepmom, &mut kid3);
        kid2.parents.push(RelationRef::new("ghost", RelationKind::Blood));
        uncle.children.push(RelationRef::new("ghost", RelationKind::Blood));

        FamilyGraph::new(vec![
            grandpa, grandma, dad, mom, stepmom, uncle, kid1, kid2, kid3,
        ])
    }

    fn layout_for(graph: &FamilyGraph, roots: &[&str]) -> Layout {
        compute_layout(graph, roots, &Theme::classic(), &LayoutConfig::default())
    }

    #[test]
    fn repeated_layout_is_identical() {
        let graph = sample_family();
        let first = layout_for(&graph, &["grandpa"]);
        let second = layout_for(&graph, &["grandpa"]);
        assert_eq!(first.nodes.len(), second.nodes.len());
        for (a, b) in first.nodes.iter().zip(&second.nodes) {
            assert_eq!(a.node_ref, b.node_ref);
            assert_eq!(a.x.to_bits(), b.x.to_bits());
            assert_eq!(a.y.to_bits(), b.y.to_bits());
            assert_eq!(a.width.to_bits(), b.width.to_bits());
            assert_eq!(a.height.to_bits(), b.height.to_bits());
        }
    }

    #[test]
    fn siblings_never_overlap() {
        let graph = sample_family();
        let layout = layout_for(&graph, &["grandpa"]);
        for node in &layout.nodes {
            let mut ranges: Vec<(f32, f32)> = node
                .children
                .iter()
                .map(|&child| {
                    let child = &layout.nodes[child];
                    (child.x, child.x + child.width)
                })
                .collect();
            ranges.sort_by(|a, b| a.0.total_cmp(&b.0));
            for pair in ranges.windows(2) {
                assert!(
                    pair[0].1 <= pair[1].0 + 1e-3,
                    "siblings under {} overlap: {:?}",
                    node.id,
                    pair
                );
            }
        }
    }

    #[test]
    fn every_person_placed_once() {
        let graph = sample_family();
        let layout = layout_for(&graph, &["grandpa", "dad", "kid3", "grandma"]);
        let mut seen = HashSet::new();
        for node in &layout.nodes {
            if let Some(id) = node.node_ref.person_id() {
                assert!(seen.insert(id), "{id} placed twice");
            }
        }
        assert_eq!(seen.len(), graph.len());
    }

    #[test]
    fn spouse_sits_right_of_person_on_same_row() {
        let graph = sample_family();
        let layout = layout_for(&graph, &["grandpa"]);
        let dad = layout.find_person("dad").expect("dad");
        for spouse in ["mom", "stepmom"] {
            let spouse = layout.find_person(spouse).expect("spouse");
            assert_eq!(spouse.depth, dad.depth);
            assert_eq!(spouse.y, dad.y);
            assert!(spouse.x >= dad.x + dad.width);
        }
        let kid = layout.find_person("kid1").expect("kid1");
        assert_eq!(kid.depth, dad.depth + 1);
        assert!(kid.y > dad.y + dad.height);
    }

    #[test]
    fn later_marriage_bar_is_raised() {
        let graph = sample_family();
        let layout = layout_for(&graph, &["dad"]);
        let first = &layout.spouse_links[0];
        let second = &layout.spouse_links[1];
        assert_eq!(first.points.len(), 2);
        assert_eq!(first.points[0].1, first.points[1].1);
        let row_y = second.points[0].1;
        let highest = second
            .points
            .iter()
            .map(|p| p.1)
            .fold(f32::MAX, f32::min);
        assert!(highest < row_y - LayoutConfig::default().node_height / 2.0);
    }

    #[test]
    fn tree_edges_skip_lateral_and_root_links() {
        let graph = sample_family();
        let layout = layout_for(&graph, &["grandpa"]);
        for edge in &layout.edges {
            assert_ne!(edge.from, layout.root);
            assert!(!layout.nodes[edge.to].no_direct_parent_link);
            assert!(edge.points.len() >= 2);
        }
        let kid3 = layout.find_person("kid3").expect("kid3");
        let edge = layout
            .edges
            .iter()
            .find(|edge| edge.to == kid3.id)
            .expect("edge into kid3");
        assert!(layout.nodes[edge.from].is_marriage_node());
    }

    #[test]
    fn unknown_roots_give_empty_layout() {
        let graph = sample_family();
        let layout = layout_for(&graph, &["nobody", "else"]);
        assert!(layout.is_empty());
        assert_eq!(layout.stats.missing_roots, 2);
        assert_eq!(layout.bounds, Bounds::default());
        assert!(layout.edges.is_empty());
    }

    #[test]
    fn dangling_references_are_pruned() {
        let graph = sample_family();
        let layout = layout_for(&graph, &["grandpa"]);
        assert!(layout.find_person("kid2").is_some());
        assert_eq!(layout.stats.pruned_references, 1);
    }

    #[test]
    fn clicks_resolve_only_to_people() {
        let graph = sample_family();
        let layout = layout_for(&graph, &["grandpa"]);
        let grandpa = layout.find_person("grandpa").expect("grandpa");
        assert_eq!(layout.resolve_click(grandpa.id), Some("grandpa"));
        let (cx, cy) = grandpa.center();
        assert_eq!(layout.hit_test(cx, cy), Some("grandpa"));
        let marriage = layout
            .nodes
            .iter()
            .find(|node| node.is_marriage_node())
            .expect("marriage node");
        assert_eq!(layout.resolve_click(marriage.id), None);
        assert_eq!(layout.resolve_click(layout.root), None);
        assert_eq!(layout.resolve_click(10_000), None);
    }

    #[test]
    fn hidden_synthetic_nodes_have_zero_size() {
        let graph = sample_family();
        let layout = layout_for(&graph, &["grandpa"]);
        for node in layout.nodes.iter().filter(|node| node.hidden) {
            assert_eq!((node.width, node.height), (0.0, 0.0));
        }
        let config = LayoutConfig {
            hide_marriage_connector_nodes: false,
            ..LayoutConfig::default()
        };
        let shown = compute_layout(&graph, &["grandpa"], &Theme::classic(), &config);
        let marker = shown
            .nodes
            .iter()
            .find(|node| node.is_marriage_node())
            .expect("marriage node");
        assert!(!marker.hidden);
        assert_eq!(marker.width, config.marriage_node_width);
    }

    #[test]
    fn root_is_centered_on_origin() {
        let graph = sample_family();
        let config = LayoutConfig {
            origin_x: 500.0,
            origin_y: 40.0,
            ..LayoutConfig::default()
        };
        let layout = compute_layout(&graph, &["grandpa"], &Theme::classic(), &config);
        let root = &layout.nodes[layout.root];
        assert_eq!(root.center(), (500.0, 40.0));
        let top_span: f32 = root.subtree_width;
        let left = root.center().0 - top_span / 2.0;
        for &child in &root.children {
            assert!(layout.nodes[child].x >= left - 1e-3);
        }
    }

    #[test]
    fn name_order_sorts_children() {
        let mut root = person("root", Gender::Male);
        let mut zed = Person::new("z", "Zed", Gender::Male);
        let mut amy = Person::new("a", "Amy", Gender::Female);
        parent_of(&mut root, &mut zed);
        parent_of(&mut root, &mut amy);
        let graph = FamilyGraph::new(vec![root, zed, amy]);
        let config = LayoutConfig {
            sibling_order: SiblingOrder::Name,
            ..LayoutConfig::default()
        };
        let layout = compute_layout(&graph, &["root"], &Theme::classic(), &config);
        let amy = layout.find_person("a").expect("amy");
        let zed = layout.find_person("z").expect("zed");
        assert!(amy.x < zed.x);

        let unsorted = layout_for(&graph, &["root"]);
        let amy = unsorted.find_person("a").expect("amy");
        let zed = unsorted.find_person("z").expect("zed");
        assert!(zed.x < amy.x);
    }

    #[test]
    fn oversized_depth_offset_is_clamped() {
        let snapshot = crate::parser::parse_snapshot(
            r#"[{"id": "far", "name": "Far", "gender": "male", "depthOffset": 300000}]"#,
        )
        .expect("snapshot parses");
        let layout = layout_for(&snapshot.graph, &["far"]);
        assert_eq!(layout.stats.spacers, 16);
        assert_eq!(layout.find_person("far").map(|node| node.depth), Some(17));
        assert!(layout.height.is_finite());
    }

    #[test]
    fn long_lineage_lays_out() {
        const GENERATIONS: usize = 20_000;
        let mut people: Vec<Person> = (0..GENERATIONS)
            .map(|generation| person(&format!("g{generation}"), Gender::Male))
            .collect();
        for generation in 1..GENERATIONS {
            let (older, younger) = people.split_at_mut(generation);
            parent_of(&mut older[generation - 1], &mut younger[0]);
        }
        let graph = FamilyGraph::new(people);
        let layout = layout_for(&graph, &["g0"]);

        assert_eq!(layout.person_count(), GENERATIONS);
        let first = layout.find_person("g0").expect("g0");
        let last = layout.find_person("g19999").expect("g19999");
        assert_eq!(last.depth, GENERATIONS);
        assert!((last.center().0 - first.center().0).abs() < 1e-2);
        assert_eq!(layout.edges.len(), GENERATIONS - 1);
    }
}
