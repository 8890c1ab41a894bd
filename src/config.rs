use crate::filter::{FIRST_YEAR, YearRange, current_year};
use crate::ir::GeoPoint;
use crate::projection::{MAX_ZOOM, Viewport};
use crate::theme::{MarkerShape, Theme};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Distance of every researcher from its institution, in planar units.
    pub radius: f64,
    pub same_module_links: bool,
    pub attribute_links: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            radius: 100.0,
            same_module_links: true,
            attribute_links: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f64,
    pub height: f64,
    pub researcher_radius: f64,
    pub institution_radius: f64,
    pub link_base_width: f64,
    pub link_max_width: f64,
    pub link_base_opacity: f64,
    pub link_max_opacity: f64,
    /// Link count at which stroke width and opacity stop growing.
    pub link_count_saturation: u32,
    pub show_year: bool,
    pub show_legend: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            researcher_radius: 5.0,
            institution_radius: 7.0,
            link_base_width: 1.0,
            link_max_width: 4.0,
            link_base_opacity: 0.35,
            link_max_opacity: 0.9,
            link_count_saturation: 5,
            show_year: true,
            show_legend: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Margin kept free around fitted bounds, in pixels.
    pub fit_padding: f64,
    pub first_year: i32,
    pub fit_on_highlight: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_lat: 46.51999710099841,
            center_lon: 6.569531292590334,
            zoom: 13.0,
            min_zoom: 1.0,
            max_zoom: 20.0,
            fit_padding: 40.0,
            first_year: FIRST_YEAR,
            fit_on_highlight: true,
        }
    }
}

impl MapConfig {
    pub fn year_range(&self) -> YearRange {
        YearRange::new(self.first_year, current_year())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    pub map: MapConfig,
}

impl Config {
    /// Initial viewport: the configured centre and zoom at the render size.
    pub fn initial_viewport(&self) -> Viewport {
        Viewport::new(
            GeoPoint::new(self.map.center_lat, self.map.center_lon),
            self.map.zoom,
            self.render.width,
            self.render.height,
        )
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    radius: Option<f64>,
    same_module_links: Option<bool>,
    attribute_links: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f64>,
    height: Option<f64>,
    researcher_radius: Option<f64>,
    institution_radius: Option<f64>,
    link_base_width: Option<f64>,
    link_max_width: Option<f64>,
    link_base_opacity: Option<f64>,
    link_max_opacity: Option<f64>,
    link_count_saturation: Option<u32>,
    show_year: Option<bool>,
    show_legend: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct MapConfigFile {
    center: Option<[f64; 2]>,
    zoom: Option<f64>,
    min_zoom: Option<f64>,
    max_zoom: Option<f64>,
    fit_padding: Option<f64>,
    first_year: Option<i32>,
    fit_on_highlight: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ModuleStyleFile {
    Color(String),
    Style {
        color: Option<String>,
        shape: Option<MarkerShape>,
    },
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    module_colors: Option<BTreeMap<String, ModuleStyleFile>>,
    layout: Option<LayoutConfigFile>,
    render: Option<RenderConfigFile>,
    map: Option<MapConfigFile>,
}

fn parse_config_file(contents: &str) -> anyhow::Result<ConfigFile> {
    match serde_json::from_str(contents) {
        Ok(parsed) => Ok(parsed),
        Err(json_err) => json5::from_str(contents)
            .map_err(|_| anyhow::anyhow!("invalid config file: {json_err}")),
    }
}

fn zoom_level(key: &str, value: f64) -> anyhow::Result<f64> {
    if value.is_finite() && (0.0..=MAX_ZOOM).contains(&value) {
        Ok(value)
    } else {
        Err(anyhow::anyhow!("{key} must be between 0 and {MAX_ZOOM}"))
    }
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed = parse_config_file(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "dark" => config.theme = Theme::dark(),
            "light" | "default" => config.theme = Theme::light(),
            other => return Err(anyhow::anyhow!("unknown theme `{other}`")),
        }
    }
    if let Some(v) = parsed.font_family {
        config.theme.font_family = v;
    }
    if let Some(v) = parsed.font_size {
        config.theme.font_size = v;
    }
    if let Some(colors) = parsed.module_colors {
        for (code, style) in colors {
            let code = code.trim().to_uppercase();
            let entry = config
                .theme
                .modules
                .entry(code)
                .or_insert_with(|| config.theme.unassigned.clone());
            match style {
                ModuleStyleFile::Color(color) => entry.color = color,
                ModuleStyleFile::Style { color, shape } => {
                    if let Some(color) = color {
                        entry.color = color;
                    }
                    if let Some(shape) = shape {
                        entry.shape = shape;
                    }
                }
            }
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.radius {
            if !(v.is_finite() && v >= 0.0) {
                return Err(anyhow::anyhow!("layout.radius must be a non-negative number"));
            }
            config.layout.radius = v;
        }
        if let Some(v) = layout.same_module_links {
            config.layout.same_module_links = v;
        }
        if let Some(v) = layout.attribute_links {
            config.layout.attribute_links = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
        if let Some(v) = render.researcher_radius {
            config.render.researcher_radius = v;
        }
        if let Some(v) = render.institution_radius {
            config.render.institution_radius = v;
        }
        if let Some(v) = render.link_base_width {
            config.render.link_base_width = v;
        }
        if let Some(v) = render.link_max_width {
            config.render.link_max_width = v;
        }
        if let Some(v) = render.link_base_opacity {
            config.render.link_base_opacity = v;
        }
        if let Some(v) = render.link_max_opacity {
            config.render.link_max_opacity = v;
        }
        if let Some(v) = render.link_count_saturation {
            config.render.link_count_saturation = v.max(1);
        }
        if let Some(v) = render.show_year {
            config.render.show_year = v;
        }
        if let Some(v) = render.show_legend {
            config.render.show_legend = v;
        }
    }

    if let Some(map) = parsed.map {
        if let Some([lat, lon]) = map.center {
            config.map.center_lat = lat;
            config.map.center_lon = lon;
        }
        if let Some(v) = map.zoom {
            config.map.zoom = zoom_level("map.zoom", v)?;
        }
        if let Some(v) = map.min_zoom {
            config.map.min_zoom = zoom_level("map.minZoom", v)?;
        }
        if let Some(v) = map.max_zoom {
            config.map.max_zoom = zoom_level("map.maxZoom", v)?;
        }
        if config.map.min_zoom > config.map.max_zoom {
            return Err(anyhow::anyhow!("map.minZoom must not exceed map.maxZoom"));
        }
        if let Some(v) = map.fit_padding {
            config.map.fit_padding = v;
        }
        if let Some(v) = map.first_year {
            let last = current_year();
            if v > last {
                return Err(anyhow::anyhow!("map.firstYear {v} is after the current year {last}"));
            }
            config.map.first_year = v;
        }
        if let Some(v) = map.fit_on_highlight {
            config.map.fit_on_highlight = v;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_lausanne_view() {
        let config = Config::default();
        assert_eq!(config.layout.radius, 100.0);
        assert_eq!(config.map.zoom, 13.0);
        assert_eq!(config.map.first_year, 2004);
        let view = config.initial_viewport();
        assert_eq!(view.width, 1200.0);
    }

    #[test]
    fn overlays_partial_file() {
        let config = parse_config(
            r##"{
                "theme": "dark",
                "moduleColors": {"mri": "#000000", "NIRS": {"color": "#123456", "shape": "square"}},
                "layout": {"radius": 60},
                "render": {"width": 640, "linkCountSaturation": 0},
                "map": {"center": [46.2, 6.1], "zoom": 9}
            }"##,
        )
        .unwrap();
        assert_eq!(config.layout.radius, 60.0);
        assert!(config.layout.same_module_links);
        assert_eq!(config.render.width, 640.0);
        assert_eq!(config.render.height, 800.0);
        assert_eq!(config.render.link_count_saturation, 1);
        assert_eq!(config.map.center_lat, 46.2);
        assert_eq!(config.theme.background, Theme::dark().background);
        assert_eq!(config.theme.modules["MRI"].color, "#000000");
        assert_eq!(config.theme.modules["NIRS"].shape, MarkerShape::Square);
    }

    #[test]
    fn accepts_json5() {
        let config = parse_config(
            r#"{
                // smaller clusters
                layout: { radius: 40, },
            }"#,
        )
        .unwrap();
        assert_eq!(config.layout.radius, 40.0);
    }

    #[test]
    fn rejects_out_of_range_zoom() {
        assert!(parse_config(r#"{"map": {"maxZoom": 1e17}}"#).is_err());
        assert!(parse_config(r#"{"map": {"minZoom": -2}}"#).is_err());
        assert!(parse_config(r#"{"map": {"zoom": 31}}"#).is_err());
        assert!(parse_config(r#"{"map": {"minZoom": 12, "maxZoom": 8}}"#).is_err());
        let config = parse_config(r#"{"map": {"minZoom": 3, "maxZoom": 18}}"#).unwrap();
        assert_eq!(config.map.max_zoom, 18.0);
    }

    #[test]
    fn rejects_first_year_in_the_future() {
        let next = current_year() + 1;
        assert!(parse_config(&format!(r#"{{"map": {{"firstYear": {next}}}}}"#)).is_err());
        let config = parse_config(r#"{"map": {"firstYear": 2010}}"#).unwrap();
        assert_eq!(config.map.year_range(), YearRange::new(2010, current_year()));
    }

    #[test]
    fn rejects_negative_radius_and_unknown_theme() {
        assert!(parse_config(r#"{"layout": {"radius": -1}}"#).is_err());
        assert!(parse_config(r#"{"theme": "neon"}"#).is_err());
    }
}
