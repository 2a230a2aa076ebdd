use std::collections::HashSet;
use std::path::Path;

use family_tree_layout::layout::{Layout, NodeRef, SyntheticKind};
use family_tree_layout::{
    LayoutConfig, LayoutDump, RenderConfig, SiblingOrder, Snapshot, Theme, ViewportController,
    Viewport, compute_layout, hierarchy_chain, parse_snapshot, render_svg, resolve_roots,
};

fn load_fixture(name: &str) -> Snapshot {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let input = std::fs::read_to_string(&path).expect("fixture read failed");
    parse_snapshot(&input).expect("parse failed")
}

fn layout_fixture(snapshot: &Snapshot, config: &LayoutConfig) -> Layout {
    let roots = resolve_roots(snapshot, &[]);
    let root_ids: Vec<&str> = roots.iter().map(String::as_str).collect();
    compute_layout(&snapshot.graph, &root_ids, &Theme::classic(), config)
}

fn assert_valid_svg(svg: &str, fixture: &str) {
    assert!(svg.contains("<svg"), "{fixture}: missing <svg tag");
    assert!(svg.contains("</svg>"), "{fixture}: missing </svg tag");
}

fn assert_unique_people(layout: &Layout, fixture: &str) {
    let mut seen = HashSet::new();
    for node in &layout.nodes {
        if let Some(id) = node.node_ref.person_id() {
            assert!(seen.insert(id), "{fixture}: {id} placed twice");
        }
    }
}

fn assert_siblings_disjoint(layout: &Layout, fixture: &str) {
    for node in &layout.nodes {
        let mut spans: Vec<(f32, f32)> = node
            .children
            .iter()
            .map(|&child| {
                let child = &layout.nodes[child];
                (child.x, child.x + child.width)
            })
            .collect();
        spans.sort_by(|a, b| a.0.total_cmp(&b.0));
        for pair in spans.windows(2) {
            assert!(
                pair[0].1 <= pair[1].0 + 1e-3,
                "{fixture}: children of node {} overlap: {pair:?}",
                node.id
            );
        }
    }
}

fn parent_kind<'a>(layout: &'a Layout, person: &str) -> Option<&'a NodeRef> {
    let node = layout.find_person(person)?;
    node.parent.map(|parent| &layout.nodes[parent].node_ref)
}

#[test]
fn lay_out_all_fixtures() {
    // Keep this list explicit so new fixtures must be added intentionally.
    let fixtures = [
        "basic.json",
        "remarriage.json",
        "cycles.json",
        "dangling.json",
        "depth_offset.json",
        "hand_written.json5",
    ];
    let config = LayoutConfig::default();

    for fixture in fixtures {
        let snapshot = load_fixture(fixture);
        let layout = layout_fixture(&snapshot, &config);
        let again = layout_fixture(&snapshot, &config);

        assert!(!layout.is_empty(), "{fixture}: nothing laid out");
        assert_unique_people(&layout, fixture);
        assert_siblings_disjoint(&layout, fixture);
        assert_eq!(layout.nodes.len(), again.nodes.len(), "{fixture}: node count drifted");
        for (a, b) in layout.nodes.iter().zip(&again.nodes) {
            assert_eq!(a.node_ref, b.node_ref, "{fixture}: node order drifted");
            assert_eq!(a.x.to_bits(), b.x.to_bits(), "{fixture}: x drifted");
            assert_eq!(a.y.to_bits(), b.y.to_bits(), "{fixture}: y drifted");
        }

        let svg = render_svg(&layout, &Theme::classic(), &config, &RenderConfig::default());
        assert_valid_svg(&svg, fixture);

        let dump = LayoutDump::from_layout(&layout, None);
        let json = dump.to_json().expect("dump serializes");
        assert!(json.contains("\"nodes\""), "{fixture}: dump missing nodes");
    }
}

#[test]
fn basic_family_groups_children_under_marriages() {
    let snapshot = load_fixture("basic.json");
    let layout = layout_fixture(&snapshot, &LayoutConfig::default());

    assert_eq!(layout.person_count(), 7);
    assert_eq!(layout.stats.marriages, 2);
    assert_eq!(layout.stats.pruned_references, 0);
    for (child, spouse) in [("vikram", "kamala"), ("anita", "kamala"), ("meera", "leela")] {
        match parent_kind(&layout, child) {
            Some(NodeRef::Synthetic(SyntheticKind::Marriage { spouse: s, .. })) => {
                assert_eq!(s, spouse, "{child} under the wrong marriage")
            }
            other => panic!("{child} should hang off a marriage node, got {other:?}"),
        }
    }

    let arjun = layout.find_person("arjun").expect("arjun");
    assert_eq!(arjun.class.as_deref(), Some("highlight"));
    let rajan = layout.find_person("rajan").expect("rajan");
    assert_eq!(arjun.depth, rajan.depth + 2);
}

#[test]
fn birth_date_order_puts_elder_sibling_first() {
    let snapshot = load_fixture("basic.json");
    let by_input = layout_fixture(&snapshot, &LayoutConfig::default());
    let config = LayoutConfig {
        sibling_order: SiblingOrder::BirthDate,
        ..LayoutConfig::default()
    };
    let by_birth = layout_fixture(&snapshot, &config);

    let x_of = |layout: &Layout, id: &str| layout.find_person(id).expect("person").x;
    assert!(x_of(&by_input, "vikram") < x_of(&by_input, "anita"));
    assert!(x_of(&by_birth, "anita") < x_of(&by_birth, "vikram"));
}

#[test]
fn remarriage_attributes_each_child_to_its_mother() {
    let snapshot = load_fixture("remarriage.json");
    let layout = layout_fixture(&snapshot, &LayoutConfig::default());

    for (child, mother) in [("c1", "s1"), ("c2", "s2")] {
        match parent_kind(&layout, child) {
            Some(NodeRef::Synthetic(SyntheticKind::Marriage { person, spouse })) => {
                assert_eq!(person, "p");
                assert_eq!(spouse, mother);
            }
            other => panic!("{child} should hang off a marriage node, got {other:?}"),
        }
    }
    assert_eq!(parent_kind(&layout, "c3"), Some(&NodeRef::Person("p".to_string())));

    let sequence: Vec<usize> = layout
        .spouse_links
        .iter()
        .map(|link| link.link.sequence_index)
        .collect();
    assert_eq!(sequence, vec![0, 1]);
    assert!(layout.visible_nodes().all(|node| !node.is_marriage_node()));
}

#[test]
fn cyclic_relations_terminate() {
    let snapshot = load_fixture("cycles.json");
    let layout = layout_fixture(&snapshot, &LayoutConfig::default());

    assert_eq!(layout.person_count(), 4);
    assert_eq!(layout.stats.skipped_duplicates, 3);

    let chain = hierarchy_chain(&snapshot.graph, "d");
    let ids: Vec<&str> = chain.entries.iter().map(|entry| entry.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[test]
fn dangling_references_are_pruned() {
    let snapshot = load_fixture("dangling.json");
    let layout = layout_fixture(&snapshot, &LayoutConfig::default());

    assert_eq!(layout.person_count(), 2);
    assert_eq!(layout.stats.missing_roots, 1);
    assert_eq!(layout.stats.pruned_references, 2);
    assert!(layout.spouse_links.is_empty());
    assert_eq!(parent_kind(&layout, "k"), Some(&NodeRef::Person("r".to_string())));
    assert_eq!(hierarchy_chain(&snapshot.graph, "k").breadcrumbs(" > "), "Ravi");
}

#[test]
fn depth_offset_pushes_people_down() {
    let snapshot = load_fixture("depth_offset.json");
    let config = LayoutConfig::default();
    let layout = layout_fixture(&snapshot, &config);

    assert_eq!(layout.stats.spacers, 3);
    let a = layout.find_person("a").expect("a");
    let b = layout.find_person("b").expect("b");
    assert_eq!(a.depth, 3);
    assert_eq!(b.depth, 5);
    assert!(a.no_direct_parent_link);
    assert!((b.y - a.y - 2.0 * config.row_step()).abs() < 1e-3);

    for spacer in layout.nodes.iter().filter(|node| node.node_ref.is_spacer()) {
        assert!(spacer.hidden);
        assert_eq!(spacer.width, 0.0);
        assert_eq!(layout.resolve_click(spacer.id), None);
    }
    assert_eq!(layout.edges.len(), 2);
}

#[test]
fn json5_snapshot_uses_upstream_aliases() {
    let snapshot = load_fixture("hand_written.json5");
    let layout = layout_fixture(&snapshot, &LayoutConfig::default());

    assert_eq!(layout.person_count(), 3);
    let hari = layout.find_person("hari").expect("hari");
    assert!(matches!(
        parent_kind(&layout, "hari"),
        Some(NodeRef::Synthetic(SyntheticKind::Marriage { .. }))
    ));
    assert_eq!(layout.resolve_click(hari.id), Some("hari"));
}

#[test]
fn viewport_fits_and_focuses_fixture() {
    let snapshot = load_fixture("basic.json");
    let layout = layout_fixture(&snapshot, &LayoutConfig::default());
    let viewport = Viewport {
        width: 1200.0,
        height: 800.0,
    };
    let controller = ViewportController::new(&layout, viewport);

    let fit = controller.zoom_to_fit();
    let (left, top) = fit.apply(layout.bounds.x, layout.bounds.y);
    let (right, bottom) = fit.apply(
        layout.bounds.x + layout.bounds.width,
        layout.bounds.y + layout.bounds.height,
    );
    assert!(left >= -1e-3 && top >= -1e-3);
    assert!(right <= viewport.width + 1e-3 && bottom <= viewport.height + 1e-3);

    let focus = controller.zoom_to_person("meera", 2.0).expect("meera laid out");
    let (cx, cy) = layout.find_person("meera").expect("meera").center();
    let (sx, sy) = focus.apply(cx, cy);
    assert!((sx - viewport.width / 2.0).abs() < 1e-3);
    assert!((sy - viewport.height / 2.0).abs() < 1e-3);
    assert!(controller.zoom_to_person("ghost", 1.0).is_none());
}
