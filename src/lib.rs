#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod hierarchy;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod theme;
pub mod viewport;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, SiblingOrder, load_config};
pub use hierarchy::{HierarchyChain, default_root, hierarchy_chain};
pub use ir::{FamilyGraph, Gender, Person, RelationKind, RelationRef};
pub use layout::{Layout, compute_layout, compute_layout_with, reconstruct};
pub use layout_dump::LayoutDump;
pub use parser::{Snapshot, SnapshotError, parse_snapshot};
pub use render::render_svg;
pub use theme::Theme;
pub use viewport::{ViewTransform, Viewport, ViewportController};

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    /// Overrides the snapshot's own roots when non-empty.
    pub roots: Vec<String>,
}

impl RenderOptions {
    pub fn classic() -> Self {
        Self::from_config(Config::default())
    }

    pub fn modern() -> Self {
        let theme = Theme::modern();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..RenderConfig::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
            roots: Vec::new(),
        }
    }

    pub fn from_config(config: Config) -> Self {
        Self {
            theme: config.theme,
            layout: config.layout,
            render: config.render,
            roots: Vec::new(),
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::classic()
    }
}

/// Roots to draw: explicit request, then the snapshot's own list, then the
/// patriline top of the first person on record.
pub fn resolve_roots(snapshot: &Snapshot, requested: &[String]) -> Vec<String> {
    if !requested.is_empty() {
        return requested.to_vec();
    }
    if !snapshot.roots.is_empty() {
        return snapshot.roots.clone();
    }
    snapshot
        .graph
        .people()
        .first()
        .and_then(|first| default_root(&snapshot.graph, &first.id))
        .map(|root| vec![root.to_string()])
        .unwrap_or_default()
}

pub fn layout_with_options(input: &str, options: &RenderOptions) -> anyhow::Result<Layout> {
    let snapshot = parse_snapshot(input)?;
    let roots = resolve_roots(&snapshot, &options.roots);
    let root_ids: Vec<&str> = roots.iter().map(String::as_str).collect();
    Ok(compute_layout(
        &snapshot.graph,
        &root_ids,
        &options.theme,
        &options.layout,
    ))
}

pub fn render_with_options(input: &str, options: RenderOptions) -> anyhow::Result<String> {
    let layout = layout_with_options(input, &options)?;
    Ok(render_svg(
        &layout,
        &options.theme,
        &options.layout,
        &options.render,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"[
        {"id": "kid", "name": "Kid", "gender": "female", "parents": [{"id": "dad"}]},
        {"id": "dad", "name": "Dad", "gender": "male", "children": [{"id": "kid"}], "parents": [{"id": "grandpa"}]},
        {"id": "grandpa", "name": "Grandpa", "gender": "male", "children": [{"id": "dad"}]}
    ]"#;

    #[test]
    fn default_roots_follow_patriline_of_first_person() {
        let snapshot = parse_snapshot(SNAPSHOT).expect("snapshot");
        assert_eq!(resolve_roots(&snapshot, &[]), vec!["grandpa".to_string()]);
        assert_eq!(
            resolve_roots(&snapshot, &["dad".to_string()]),
            vec!["dad".to_string()]
        );
    }

    #[test]
    fn render_with_options_draws_whole_line() {
        let svg = render_with_options(SNAPSHOT, RenderOptions::modern()).expect("renders");
        for id in ["grandpa", "dad", "kid"] {
            assert!(svg.contains(&format!("data-person-id=\"{id}\"")), "{id} missing");
        }
    }

    #[test]
    fn bad_snapshot_is_reported() {
        assert!(render_with_options("", RenderOptions::default()).is_err());
    }
}
