use family_tree_layout::viewport::{Viewport, ViewportController};
use family_tree_layout::{
    LayoutDump, RenderOptions, SiblingOrder, layout_with_options, render_with_options,
};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FamilyTreeOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    roots: Option<Vec<String>>,
    hide_marriage_nodes: Option<bool>,
    sibling_order: Option<SiblingOrder>,
    viewport_width: Option<f32>,
    viewport_height: Option<f32>,
}

fn build_render_options(options: FamilyTreeOptions) -> RenderOptions {
    let mut render_options = if options.theme.as_deref() == Some("modern") {
        RenderOptions::modern()
    } else {
        RenderOptions::classic()
    };

    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        render_options.theme.font_size = font_size;
    }
    if let Some(roots) = options.roots {
        render_options.roots = roots;
    }
    if let Some(hide) = options.hide_marriage_nodes {
        render_options.layout.hide_marriage_connector_nodes = hide;
    }
    if let Some(order) = options.sibling_order {
        render_options.layout.sibling_order = order;
    }
    if let Some(width) = options.viewport_width {
        render_options.render.width = width;
    }
    if let Some(height) = options.viewport_height {
        render_options.render.height = height;
    }

    render_options
}

fn parse_options(options_json: Option<String>) -> Result<FamilyTreeOptions, JsValue> {
    match options_json {
        Some(raw_options) => serde_json::from_str::<FamilyTreeOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string())),
        None => Ok(FamilyTreeOptions::default()),
    }
}

fn layout_json(snapshot: &str, render_options: &RenderOptions) -> Result<String, String> {
    let layout = layout_with_options(snapshot, render_options).map_err(|error| error.to_string())?;
    let viewport = Viewport {
        width: render_options.render.width,
        height: render_options.render.height,
    };
    let fit = ViewportController::new(&layout, viewport).zoom_to_fit();
    LayoutDump::from_layout(&layout, Some(fit))
        .to_json()
        .map_err(|error| error.to_string())
}

#[wasm_bindgen]
pub fn render_family_tree_svg(snapshot: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let render_options = build_render_options(parse_options(options_json)?);
    render_with_options(snapshot, render_options).map_err(|error| JsValue::from_str(&error.to_string()))
}

/// Layout dump for hosts that draw the tree themselves.
#[wasm_bindgen]
pub fn layout_family_tree_json(snapshot: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let render_options = build_render_options(parse_options(options_json)?);
    layout_json(snapshot, &render_options).map_err(|error| JsValue::from_str(&error))
}
