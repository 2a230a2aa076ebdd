use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub text_color: String,
    pub male_fill: String,
    pub female_fill: String,
    pub unknown_fill: String,
    pub node_border: String,
    pub line_color: String,
    pub spouse_line_color: String,
    pub marriage_marker_fill: String,
    pub background: String,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "\"trebuchet ms\", verdana, arial, sans-serif".to_string(),
            font_size: 14.0,
            text_color: "#333333".to_string(),
            male_fill: "#DCEBFF".to_string(),
            female_fill: "#FFE3EC".to_string(),
            unknown_fill: "#ECECEC".to_string(),
            node_border: "#6B7A90".to_string(),
            line_color: "#333333".to_string(),
            spouse_line_color: "#9370DB".to_string(),
            marriage_marker_fill: "#9370DB".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            text_color: "#1C2430".to_string(),
            male_fill: "#EEF4FF".to_string(),
            female_fill: "#FFF1F4".to_string(),
            unknown_fill: "#F7FAFF".to_string(),
            node_border: "#C7D2E5".to_string(),
            line_color: "#7A8AA6".to_string(),
            spouse_line_color: "#B07AA6".to_string(),
            marriage_marker_fill: "#B07AA6".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn fill_for(&self, gender: Option<crate::ir::Gender>) -> &str {
        match gender {
            Some(crate::ir::Gender::Male) => &self.male_fill,
            Some(crate::ir::Gender::Female) => &self.female_fill,
            _ => &self.unknown_fill,
        }
    }
}
