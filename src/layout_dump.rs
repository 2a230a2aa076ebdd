use crate::ir::RelationKind;
use crate::layout::{Bounds, Layout, ReconstructStats, SyntheticKind};
use crate::viewport::ViewTransform;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Renderer-facing view of a layout. Only real-person nodes carry a
/// `personId`, so click handlers cannot resolve synthetic slots.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub bounds: Bounds,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
    pub spouse_links: Vec<SpouseLinkDump>,
    pub stats: ReconstructStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<ViewTransform>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump {
    pub id: usize,
    pub kind: &'static str,
    pub person_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synthetic: Option<SyntheticKind>,
    pub name: String,
    pub label_lines: Vec<String>,
    pub class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_class: Option<String>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub depth: usize,
    pub hidden: bool,
    pub no_parent: bool,
    pub parent: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDump {
    pub from: usize,
    pub to: usize,
    pub kind: RelationKind,
    pub points: Vec<[f32; 2]>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpouseLinkDump {
    pub source: usize,
    pub target: usize,
    pub person_a: String,
    pub person_b: String,
    pub sequence_index: usize,
    pub kind: RelationKind,
    pub points: Vec<[f32; 2]>,
}

/// CSS classes for a node: the kind or gender class first, then caller hints.
pub fn node_class(node: &crate::layout::LaidOutNode) -> String {
    let base = match (&node.node_ref, node.gender) {
        (crate::layout::NodeRef::Person(_), Some(gender)) => gender.css_class(),
        (node_ref, _) => node_ref.kind_name(),
    };
    match node.class.as_deref() {
        Some(extra) if !extra.trim().is_empty() => format!("node {base} {}", extra.trim()),
        _ => format!("node {base}"),
    }
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout, viewport: Option<ViewTransform>) -> Self {
        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id,
                kind: node.node_ref.kind_name(),
                person_id: node.node_ref.person_id().map(str::to_string),
                synthetic: match &node.node_ref {
                    crate::layout::NodeRef::Synthetic(kind) => Some(kind.clone()),
                    crate::layout::NodeRef::Person(_) => None,
                },
                name: node.name.clone(),
                label_lines: node.label.lines.clone(),
                class: node_class(node),
                text_class: node.text_class.clone(),
                x: node.x,
                y: node.y,
                width: node.width,
                height: node.height,
                depth: node.depth,
                hidden: node.hidden,
                no_parent: node.no_direct_parent_link,
                parent: node.parent,
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| EdgeDump {
                from: edge.from,
                to: edge.to,
                kind: edge.kind,
                points: edge.points.iter().map(|(x, y)| [*x, *y]).collect(),
            })
            .collect();

        let spouse_links = layout
            .spouse_links
            .iter()
            .map(|resolved| SpouseLinkDump {
                source: resolved.link.source,
                target: resolved.link.target,
                person_a: resolved.link.person_a.clone(),
                person_b: resolved.link.person_b.clone(),
                sequence_index: resolved.link.sequence_index,
                kind: resolved.link.kind,
                points: resolved.points.iter().map(|(x, y)| [*x, *y]).collect(),
            })
            .collect();

        LayoutDump {
            width: layout.width,
            height: layout.height,
            bounds: layout.bounds,
            nodes,
            edges,
            spouse_links,
            stats: layout.stats,
            viewport,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub fn write_layout_dump(
    path: &Path,
    layout: &Layout,
    viewport: Option<ViewTransform>,
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, viewport);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
