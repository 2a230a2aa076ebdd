use crate::ir::Person;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::Path;

/// Ready-made sibling and marriage orders for the reconstructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SiblingOrder {
    /// Snapshot order.
    #[default]
    Input,
    Name,
    /// Oldest first; people without a date of birth go last.
    BirthDate,
}

impl SiblingOrder {
    pub fn compare(self, a: &Person, b: &Person) -> Ordering {
        match self {
            Self::Input => Ordering::Equal,
            Self::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            Self::BirthDate => match (a.dob.as_deref(), b.dob.as_deref()) {
                (Some(x), Some(y)) => x.cmp(y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub node_width: f32,
    pub node_height: f32,
    pub horizontal_spacing: f32,
    pub vertical_spacing: f32,
    pub marriage_node_width: f32,
    pub hide_marriage_connector_nodes: bool,
    pub sibling_order: SiblingOrder,
    pub origin_x: f32,
    pub origin_y: f32,
    /// Lift of later marriage bars, as a fraction of `node_height`.
    pub remarriage_bar_offset: f32,
    pub label_padding: f32,
    pub label_line_height: f32,
    pub max_label_lines: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 120.0,
            node_height: 40.0,
            horizontal_spacing: 20.0,
            vertical_spacing: 60.0,
            marriage_node_width: 16.0,
            hide_marriage_connector_nodes: true,
            sibling_order: SiblingOrder::Input,
            origin_x: 0.0,
            origin_y: 0.0,
            remarriage_bar_offset: 0.8,
            label_padding: 8.0,
            label_line_height: 1.3,
            max_label_lines: 2,
        }
    }
}

impl LayoutConfig {
    pub fn row_step(&self) -> f32 {
        self.node_height + self.vertical_spacing
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub padding: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            padding: 24.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ThemeVariables {
    pub font_family: Option<String>,
    pub font_size: Option<f32>,
    pub text_color: Option<String>,
    pub male_fill: Option<String>,
    pub female_fill: Option<String>,
    pub unknown_fill: Option<String>,
    pub node_border: Option<String>,
    pub line_color: Option<String>,
    pub spouse_line_color: Option<String>,
    pub marriage_marker_fill: Option<String>,
    pub background: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LayoutConfigFile {
    pub node_width: Option<f32>,
    pub node_height: Option<f32>,
    pub horizontal_spacing: Option<f32>,
    pub vertical_spacing: Option<f32>,
    pub marriage_node_width: Option<f32>,
    pub hide_marriage_connector_nodes: Option<bool>,
    pub sibling_order: Option<SiblingOrder>,
    pub origin_x: Option<f32>,
    pub origin_y: Option<f32>,
    pub remarriage_bar_offset: Option<f32>,
    pub label_padding: Option<f32>,
    pub label_line_height: Option<f32>,
    pub max_label_lines: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfigFile {
    pub theme: Option<String>,
    pub theme_variables: Option<ThemeVariables>,
    pub layout: Option<LayoutConfigFile>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub padding: Option<f32>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = serde_json::from_str(contents)?;
    Ok(apply_config_file(Config::default(), parsed))
}

pub(crate) fn apply_config_file(mut config: Config, parsed: ConfigFile) -> Config {
    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "modern" => config.theme = Theme::modern(),
            "classic" | "default" => config.theme = Theme::classic(),
            other => tracing::warn!(theme = %other, "unknown theme preset, keeping current"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        apply_theme_variables(&mut config.theme, vars);
    }

    if let Some(layout) = parsed.layout {
        let target = &mut config.layout;
        if let Some(v) = layout.node_width {
            target.node_width = v;
        }
        if let Some(v) = layout.node_height {
            target.node_height = v;
        }
        if let Some(v) = layout.horizontal_spacing {
            target.horizontal_spacing = v;
        }
        if let Some(v) = layout.vertical_spacing {
            target.vertical_spacing = v;
        }
        if let Some(v) = layout.marriage_node_width {
            target.marriage_node_width = v;
        }
        if let Some(v) = layout.hide_marriage_connector_nodes {
            target.hide_marriage_connector_nodes = v;
        }
        if let Some(v) = layout.sibling_order {
            target.sibling_order = v;
        }
        if let Some(v) = layout.origin_x {
            target.origin_x = v;
        }
        if let Some(v) = layout.origin_y {
            target.origin_y = v;
        }
        if let Some(v) = layout.remarriage_bar_offset {
            target.remarriage_bar_offset = v;
        }
        if let Some(v) = layout.label_padding {
            target.label_padding = v;
        }
        if let Some(v) = layout.label_line_height {
            target.label_line_height = v;
        }
        if let Some(v) = layout.max_label_lines {
            target.max_label_lines = v;
        }
    }

    if let Some(v) = parsed.width {
        config.render.width = v;
    }
    if let Some(v) = parsed.height {
        config.render.height = v;
    }
    if let Some(v) = parsed.padding {
        config.render.padding = v;
    }

    config.render.background = config.theme.background.clone();
    config
}

pub(crate) fn apply_theme_variables(theme: &mut Theme, vars: ThemeVariables) {
    if let Some(v) = vars.font_family {
        theme.font_family = v;
    }
    if let Some(v) = vars.font_size {
        theme.font_size = v;
    }
    if let Some(v) = vars.text_color {
        theme.text_color = v;
    }
    if let Some(v) = vars.male_fill {
        theme.male_fill = v;
    }
    if let Some(v) = vars.female_fill {
        theme.female_fill = v;
    }
    if let Some(v) = vars.unknown_fill {
        theme.unknown_fill = v;
    }
    if let Some(v) = vars.node_border {
        theme.node_border = v;
    }
    if let Some(v) = vars.line_color {
        theme.line_color = v;
    }
    if let Some(v) = vars.spouse_line_color {
        theme.spouse_line_color = v;
    }
    if let Some(v) = vars.marriage_marker_fill {
        theme.marriage_marker_fill = v;
    }
    if let Some(v) = vars.background {
        theme.background = v;
    }
}
