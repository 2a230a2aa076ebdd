use crate::config::LayoutConfig;
use crate::theme::Theme;

use super::text::measure_label;
use super::{
    Bounds, FamilyTree, LaidOutNode, Layout, NodeId, NodeRef, SpouseLinkLayout, TextBlock,
    TreeEdge, TreeNode,
};

#[derive(Debug, Clone, Copy, Default)]
struct Extent {
    width: f32,
    height: f32,
}

#[derive(Debug, Clone, Copy, Default)]
struct Placement {
    center_x: f32,
    center_y: f32,
    depth: usize,
}

fn slot_width(node: &TreeNode, config: &LayoutConfig) -> f32 {
    match &node.node_ref {
        NodeRef::Person(_) => config.node_width,
        node_ref if node_ref.is_marriage() => config.marriage_node_width,
        _ => 0.0,
    }
}

fn rendered_size(node: &TreeNode, config: &LayoutConfig) -> (f32, f32) {
    match &node.node_ref {
        NodeRef::Person(_) => (config.node_width, config.node_height),
        node_ref if node_ref.is_marriage() && !node.hidden => {
            (config.marriage_node_width, config.marriage_node_width)
        }
        _ => (0.0, 0.0),
    }
}

fn children_span(children: &[NodeId], extents: &[Extent], spacing: f32) -> f32 {
    if children.is_empty() {
        return 0.0;
    }
    let total: f32 = children.iter().map(|&child| extents[child].width).sum();
    total + spacing * (children.len() as f32 - 1.0)
}

/// Post-order pass: every subtree's footprint. Walks an explicit stack so a
/// deep tree never grows the call stack.
fn measure_subtrees(tree: &FamilyTree, root: NodeId, config: &LayoutConfig, extents: &mut [Extent]) {
    let mut stack = vec![(root, false)];
    while let Some((id, children_done)) = stack.pop() {
        let node = &tree.nodes[id];
        if !children_done {
            stack.push((id, true));
            stack.extend(node.children.iter().map(|&child| (child, false)));
            continue;
        }
        let deepest = node
            .children
            .iter()
            .map(|&child| extents[child].height)
            .fold(0.0_f32, f32::max);
        let span = children_span(&node.children, extents, config.horizontal_spacing);
        let height = if node.children.is_empty() {
            config.node_height
        } else {
            config.node_height + config.vertical_spacing + deepest
        };
        extents[id] = Extent {
            width: slot_width(node, config).max(span),
            height,
        };
    }
}

/// Pre-order pass: children share the parent's slot left to right.
fn assign_positions(
    tree: &FamilyTree,
    root: NodeId,
    config: &LayoutConfig,
    extents: &[Extent],
    placements: &mut [Placement],
) {
    placements[root] = Placement {
        center_x: config.origin_x,
        center_y: config.origin_y,
        depth: 0,
    };
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        let Placement {
            center_x, depth, ..
        } = placements[id];
        let children = &tree.nodes[id].children;
        let span = children_span(children, extents, config.horizontal_spacing);
        let mut cursor = center_x - span / 2.0;
        for &child in children {
            let width = extents[child].width;
            placements[child] = Placement {
                center_x: cursor + width / 2.0,
                center_y: config.origin_y + (depth + 1) as f32 * config.row_step(),
                depth: depth + 1,
            };
            cursor += width + config.horizontal_spacing;
            stack.push(child);
        }
    }
}

fn empty_label() -> TextBlock {
    TextBlock {
        lines: Vec::new(),
        width: 0.0,
        height: 0.0,
    }
}

fn tree_edge(parent: &LaidOutNode, child: &LaidOutNode, config: &LayoutConfig) -> Vec<(f32, f32)> {
    let (parent_x, parent_y) = parent.center();
    let start = if parent.is_marriage_node() {
        (parent_x, parent_y)
    } else {
        (parent_x, parent.y + parent.height)
    };
    let end = (child.x + child.width / 2.0, child.y);
    if (start.0 - end.0).abs() < f32::EPSILON {
        return vec![start, end];
    }
    let elbow_y = (end.1 - config.vertical_spacing / 2.0).max(start.1);
    vec![start, (start.0, elbow_y), (end.0, elbow_y), end]
}

fn spouse_line(
    source: &LaidOutNode,
    target: &LaidOutNode,
    marriage: Option<&LaidOutNode>,
    sequence_index: usize,
    config: &LayoutConfig,
) -> Vec<(f32, f32)> {
    let (_, row_y) = source.center();
    let start = (source.x + source.width, row_y);
    let end = (target.x, target.center().1);
    if sequence_index == 0 {
        return vec![start, end];
    }
    // Later marriages arc over the spouses placed in between.
    let bar_y = row_y - config.node_height * config.remarriage_bar_offset;
    let jog_x = start.0 + config.horizontal_spacing / 2.0;
    let drop_x = marriage
        .map(|node| node.center().0)
        .unwrap_or(end.0 - config.horizontal_spacing / 2.0);
    vec![
        start,
        (jog_x, row_y),
        (jog_x, bar_y),
        (drop_x, bar_y),
        (drop_x, end.1),
        end,
    ]
}

pub(super) fn layout_tree(tree: &FamilyTree, theme: &Theme, config: &LayoutConfig) -> Layout {
    let count = tree.nodes.len();
    let mut extents = vec![Extent::default(); count];
    let mut placements = vec![Placement::default(); count];
    if count > 0 {
        measure_subtrees(tree, tree.root, config, &mut extents);
        assign_positions(tree, tree.root, config, &extents, &mut placements);
    }

    let nodes: Vec<LaidOutNode> = tree
        .nodes
        .iter()
        .map(|node| {
            let placement = placements[node.id];
            let (width, height) = rendered_size(node, config);
            let label = match node.node_ref {
                NodeRef::Person(_) => measure_label(&node.name, theme, config),
                NodeRef::Synthetic(_) => empty_label(),
            };
            LaidOutNode {
                id: node.id,
                node_ref: node.node_ref.clone(),
                name: node.name.clone(),
                label,
                gender: node.gender,
                class: node.class.clone(),
                text_class: node.text_class.clone(),
                x: placement.center_x - width / 2.0,
                y: placement.center_y - height / 2.0,
                width,
                height,
                depth: placement.depth,
                subtree_width: extents[node.id].width,
                subtree_height: extents[node.id].height,
                hidden: node.hidden,
                no_direct_parent_link: node.no_direct_parent_link,
                parent: node.parent,
                children: node.children.clone(),
            }
        })
        .collect();

    let mut edges = Vec::new();
    for node in &tree.nodes {
        let Some(parent_id) = node.parent else {
            continue;
        };
        if node.no_direct_parent_link || parent_id == tree.root {
            continue;
        }
        edges.push(TreeEdge {
            from: parent_id,
            to: node.id,
            points: tree_edge(&nodes[parent_id], &nodes[node.id], config),
            kind: node.lineage,
        });
    }

    let spouse_links: Vec<SpouseLinkLayout> = tree
        .spouse_links
        .iter()
        .filter_map(|link| {
            let source = nodes.get(link.source)?;
            let target = nodes.get(link.target)?;
            let marriage = nodes.get(link.marriage);
            Some(SpouseLinkLayout {
                link: link.clone(),
                points: spouse_line(source, target, marriage, link.sequence_index, config),
            })
        })
        .collect();

    let bounds = compute_bounds(&nodes, &spouse_links);

    Layout {
        nodes,
        root: tree.root,
        edges,
        spouse_links,
        bounds,
        width: bounds.width,
        height: bounds.height,
        stats: tree.stats,
    }
}

fn compute_bounds(nodes: &[LaidOutNode], spouse_links: &[SpouseLinkLayout]) -> Bounds {
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for node in nodes.iter().filter(|node| !node.hidden) {
        min_x = min_x.min(node.x);
        min_y = min_y.min(node.y);
        max_x = max_x.max(node.x + node.width);
        max_y = max_y.max(node.y + node.height);
    }
    for (x, y) in spouse_links.iter().flat_map(|link| link.points.iter().copied()) {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    if min_x == f32::MAX {
        return Bounds::default();
    }
    Bounds {
        x: min_x,
        y: min_y,
        width: max_x - min_x,
        height: max_y - min_y,
    }
}
