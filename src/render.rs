use crate::config::{LayoutConfig, RenderConfig};
use crate::ir::RelationKind;
use crate::layout::{LaidOutNode, Layout};
use crate::layout_dump::node_class;
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

/// Static preview of a layout. Real-person nodes carry `data-person-id` so a
/// host page can wire click handlers; synthetic nodes carry none.
pub fn render_svg(layout: &Layout, theme: &Theme, config: &LayoutConfig, render: &RenderConfig) -> String {
    let mut svg = String::new();
    let pad = render.padding;
    let width = (layout.width + pad * 2.0).max(200.0);
    let height = (layout.height + pad * 2.0).max(200.0);
    let offset_x = pad - layout.bounds.x;
    let offset_y = pad - layout.bounds.y;

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"0 0 {width:.2} {height:.2}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        render.background
    ));
    svg.push_str(&format!(
        "<g class=\"family-tree\" transform=\"translate({offset_x:.2} {offset_y:.2})\">"
    ));

    for edge in &layout.edges {
        let dash = if edge.kind == RelationKind::Adopted {
            " stroke-dasharray=\"6 4\""
        } else {
            ""
        };
        svg.push_str(&format!(
            "<path class=\"lineage\" d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.4\"{dash}/>",
            points_to_path(&edge.points),
            theme.line_color
        ));
    }

    for resolved in &layout.spouse_links {
        let dash = if resolved.link.kind == RelationKind::Divorced {
            " stroke-dasharray=\"4 3\""
        } else {
            ""
        };
        svg.push_str(&format!(
            "<path class=\"marriage\" d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.6\"{dash}/>",
            points_to_path(&resolved.points),
            theme.spouse_line_color
        ));
    }

    for node in layout.visible_nodes() {
        if node.is_marriage_node() {
            let (cx, cy) = node.center();
            svg.push_str(&format!(
                "<circle class=\"{}\" cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{:.2}\" fill=\"{}\"/>",
                node_class(node),
                node.width / 2.0,
                theme.marriage_marker_fill
            ));
            continue;
        }
        svg.push_str(&person_svg(node, theme, config));
    }

    svg.push_str("</g></svg>");
    svg
}

fn person_svg(node: &LaidOutNode, theme: &Theme, config: &LayoutConfig) -> String {
    let person_attr = node
        .node_ref
        .person_id()
        .map(|id| format!(" data-person-id=\"{}\"", escape_xml(id)))
        .unwrap_or_default();
    let mut out = format!("<g class=\"{}\"{person_attr}>", escape_xml(&node_class(node)));
    out.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"6\" ry=\"6\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.2\"/>",
        node.x,
        node.y,
        node.width,
        node.height,
        theme.fill_for(node.gender),
        theme.node_border
    ));
    let (center_x, center_y) = node.center();
    out.push_str(&label_svg(center_x, center_y, node, theme, config));
    out.push_str("</g>");
    out
}

fn label_svg(x: f32, y: f32, node: &LaidOutNode, theme: &Theme, config: &LayoutConfig) -> String {
    let line_height = theme.font_size * config.label_line_height;
    let total_height = node.label.lines.len() as f32 * line_height;
    let start_y = y - total_height / 2.0 + theme.font_size;
    let class = node
        .text_class
        .as_deref()
        .map(|class| format!(" class=\"{}\"", escape_xml(class)))
        .unwrap_or_default();
    let mut text = format!(
        "<text{class} x=\"{x:.2}\" y=\"{start_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">",
        escape_xml(&theme.font_family),
        theme.font_size,
        theme.text_color
    );
    for (idx, line) in node.label.lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { line_height };
        text.push_str(&format!(
            "<tspan x=\"{x:.2}\" dy=\"{dy:.2}\">{}</tspan>",
            escape_xml(line)
        ));
    }
    text.push_str("</text>");
    text
}

fn points_to_path(points: &[(f32, f32)]) -> String {
    if points.is_empty() {
        return String::new();
    }
    let mut d = String::new();
    d.push_str(&format!("M {:.2} {:.2}", points[0].0, points[0].1));
    for point in points.iter().skip(1) {
        d.push_str(&format!(" L {:.2} {:.2}", point.0, point.1));
    }
    d
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .map(|family| family.trim().trim_matches('"').to_string())
        .unwrap_or_else(|| "sans-serif".to_string());
    let fallback = usvg::Size::from_wh(800.0, 600.0)
        .ok_or_else(|| anyhow::anyhow!("Invalid fallback size"))?;
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height).unwrap_or(fallback);

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig, _theme: &Theme) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
