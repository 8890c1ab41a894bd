use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerShape {
    Circle,
    Square,
    Triangle,
    Diamond,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleStyle {
    pub color: String,
    pub shape: MarkerShape,
}

impl ModuleStyle {
    fn new(color: &str, shape: MarkerShape) -> Self {
        Self {
            color: color.to_string(),
            shape,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub text_color: String,
    pub institution_fill: String,
    pub institution_stroke: String,
    pub selected_institution_fill: String,
    pub researcher_stroke: String,
    pub link_color: String,
    pub highlight_link_color: String,
    pub unassigned: ModuleStyle,
    pub modules: BTreeMap<String, ModuleStyle>,
}

fn default_modules() -> BTreeMap<String, ModuleStyle> {
    [
        ("MRI", ModuleStyle::new("#1F77B4", MarkerShape::Circle)),
        ("EEG", ModuleStyle::new("#FF7F0E", MarkerShape::Square)),
        ("PET", ModuleStyle::new("#2CA02C", MarkerShape::Triangle)),
        ("SP", ModuleStyle::new("#D62728", MarkerShape::Diamond)),
        ("DS", ModuleStyle::new("#9467BD", MarkerShape::Circle)),
    ]
    .into_iter()
    .map(|(code, style)| (code.to_string(), style))
    .collect()
}

impl Theme {
    pub fn light() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            background: "#F4F1EA".to_string(),
            text_color: "#1C2430".to_string(),
            institution_fill: "#FFFFFF".to_string(),
            institution_stroke: "#005A8C".to_string(),
            selected_institution_fill: "#005A8C".to_string(),
            researcher_stroke: "#FFFFFF".to_string(),
            link_color: "#7A8AA6".to_string(),
            highlight_link_color: "#E4572E".to_string(),
            unassigned: ModuleStyle::new("#8C8C8C", MarkerShape::Circle),
            modules: default_modules(),
        }
    }

    pub fn dark() -> Self {
        let mut modules = default_modules();
        for (code, color) in [
            ("MRI", "#4EA8DE"),
            ("EEG", "#FFB347"),
            ("PET", "#77DD77"),
            ("SP", "#FF6961"),
            ("DS", "#C3B1E1"),
        ] {
            if let Some(style) = modules.get_mut(code) {
                style.color = color.to_string();
            }
        }
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            background: "#1B1F24".to_string(),
            text_color: "#E6EDF3".to_string(),
            institution_fill: "#2D333B".to_string(),
            institution_stroke: "#8DB4D9".to_string(),
            selected_institution_fill: "#8DB4D9".to_string(),
            researcher_stroke: "#1B1F24".to_string(),
            link_color: "#6E7681".to_string(),
            highlight_link_color: "#F2CC60".to_string(),
            unassigned: ModuleStyle::new("#8B949E", MarkerShape::Circle),
            modules,
        }
    }

    /// Style for a module code. Unknown codes and researchers without a
    /// module share the `unassigned` style.
    pub fn module_style(&self, module: Option<&str>) -> &ModuleStyle {
        module
            .and_then(|code| self.modules.get(code))
            .unwrap_or(&self.unassigned)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_modules_fall_back() {
        let theme = Theme::light();
        assert_eq!(theme.module_style(Some("EEG")).shape, MarkerShape::Square);
        assert_eq!(theme.module_style(Some("XYZ")), &theme.unassigned);
        assert_eq!(theme.module_style(None), &theme.unassigned);
    }
}
