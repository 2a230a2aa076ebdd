//! Pan and zoom transforms over a computed layout.
//!
//! A transform maps layout coordinates to screen coordinates as
//! `screen = layout * scale + translate`. Durations are passed through for the
//! host's animation layer and never affect the math.

use crate::layout::{Bounds, Layout, NodeId};
use serde::Serialize;

/// Margin factor applied by [`zoom_to_fit`].
pub const FIT_MARGIN: f32 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewTransform {
    pub translate_x: f32,
    pub translate_y: f32,
    pub scale: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u32>,
}

impl ViewTransform {
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.scale + self.translate_x,
            y * self.scale + self.translate_y,
        )
    }
}

pub fn zoom_to_point(
    viewport: Viewport,
    x: f32,
    y: f32,
    zoom: f32,
    duration_hint: Option<u32>,
) -> ViewTransform {
    ViewTransform {
        translate_x: viewport.width / 2.0 - x * zoom,
        translate_y: viewport.height / 2.0 - y * zoom,
        scale: zoom,
        duration_ms: duration_hint,
    }
}

pub fn zoom_to_fit(bounds: Bounds, viewport: Viewport) -> ViewTransform {
    let (center_x, center_y) = bounds.center();
    let ratio = (bounds.width / viewport.width).max(bounds.height / viewport.height);
    let scale = if ratio.is_finite() && ratio > 0.0 {
        FIT_MARGIN / ratio
    } else {
        1.0
    };
    zoom_to_point(viewport, center_x, center_y, scale, None)
}

pub struct ViewportController<'a> {
    layout: &'a Layout,
    viewport: Viewport,
}

impl<'a> ViewportController<'a> {
    pub fn new(layout: &'a Layout, viewport: Viewport) -> Self {
        Self { layout, viewport }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Scale 1 centred on the first top-level person, or on the drawing when
    /// nobody was placed.
    pub fn reset_view(&self) -> ViewTransform {
        let (x, y) = self
            .layout
            .nodes
            .iter()
            .find(|node| node.node_ref.person_id().is_some())
            .map(|node| node.center())
            .unwrap_or_else(|| self.layout.bounds.center());
        zoom_to_point(self.viewport, x, y, 1.0, None)
    }

    pub fn zoom_to_point(&self, x: f32, y: f32, zoom: f32, duration_hint: Option<u32>) -> ViewTransform {
        zoom_to_point(self.viewport, x, y, zoom, duration_hint)
    }

    pub fn zoom_to_node(&self, node_id: NodeId, zoom: f32) -> Option<ViewTransform> {
        let (x, y) = self.layout.node(node_id)?.center();
        Some(self.zoom_to_point(x, y, zoom, None))
    }

    pub fn zoom_to_person(&self, person_id: &str, zoom: f32) -> Option<ViewTransform> {
        let node = self.layout.find_person(person_id)?;
        self.zoom_to_node(node.id, zoom)
    }

    pub fn zoom_to_fit(&self) -> ViewTransform {
        zoom_to_fit(self.layout.bounds, self.viewport)
    }
}
