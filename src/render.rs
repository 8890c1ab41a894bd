use crate::config::RenderConfig;
use crate::filter::FilterState;
use crate::ir::Institution;
use crate::layout::LayoutResult;
use crate::projection::Projector;
use crate::theme::{MarkerShape, ModuleStyle, Theme};
use anyhow::Result;
use std::collections::BTreeSet;
use std::path::Path;

/// Everything one frame needs. Rendering has no side effects on the engine.
pub struct Frame<'a, P: Projector + ?Sized> {
    pub layout: &'a LayoutResult,
    pub filter: &'a FilterState,
    pub institutions: &'a [Institution],
    pub projector: &'a P,
}

pub fn render_svg<P>(frame: &Frame<'_, P>, theme: &Theme, config: &RenderConfig) -> String
where
    P: Projector + ?Sized,
{
    let mut svg = String::new();
    let width = config.width.max(1.0);
    let height = config.height.max(1.0);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    svg.push_str("<g class=\"institutions\">");
    for institution in frame.institutions {
        let Some(point) = institution.coordinates() else {
            continue;
        };
        let p = frame.projector.project(point);
        let selected = frame.filter.selected_institutions.contains(&institution.name);
        let fill = if selected {
            theme.selected_institution_fill.as_str()
        } else {
            theme.institution_fill.as_str()
        };
        svg.push_str(&format!(
            "<circle class=\"institution\" cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"2\"><title>{}</title></circle>",
            p.x,
            p.y,
            config.institution_radius,
            fill,
            theme.institution_stroke,
            escape_xml(&institution.name)
        ));
    }
    svg.push_str("</g>");

    svg.push_str("<g class=\"links\">");
    for link in &frame.layout.module_links {
        let (stroke_width, opacity) = link_stroke(link.count, config);
        let color = theme
            .modules
            .get(&link.module)
            .map(|style| style.color.as_str())
            .unwrap_or(theme.link_color.as_str());
        svg.push_str(&format!(
            "<line class=\"link\" x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{:.2}\" stroke-opacity=\"{:.2}\"/>",
            link.x1,
            link.y1,
            link.x2,
            link.y2,
            color,
            stroke_width,
            opacity
        ));
    }
    for link in &frame.layout.attribute_links {
        svg.push_str(&format!(
            "<line class=\"highlight-link\" x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{:.2}\" stroke-dasharray=\"6 4\"/>",
            link.x1,
            link.y1,
            link.x2,
            link.y2,
            theme.highlight_link_color,
            config.link_max_width
        ));
    }
    svg.push_str("</g>");

    svg.push_str("<g class=\"researchers\">");
    for researcher in &frame.layout.researchers {
        let style = theme.module_style(researcher.module.as_deref());
        svg.push_str(&marker_svg(
            "researcher",
            researcher.x,
            researcher.y,
            config.researcher_radius,
            style,
            &theme.researcher_stroke,
            &researcher.name,
        ));
    }
    svg.push_str("</g>");

    if config.show_legend {
        svg.push_str(&legend_svg(frame, theme, config));
    }
    if config.show_year {
        svg.push_str(&format!(
            "<text id=\"year-label\" x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            width / 2.0,
            theme.font_size as f64 * 2.0,
            theme.font_family,
            theme.font_size * 1.5,
            theme.text_color,
            frame.filter.year
        ));
    }

    svg.push_str("</svg>");
    svg
}

/// Stroke width and opacity for a link emitted `count` times. Both grow
/// linearly with the count and stop at the configured saturation.
pub fn link_stroke(count: u32, config: &RenderConfig) -> (f64, f64) {
    let saturation = config.link_count_saturation.max(1);
    let t = if saturation == 1 {
        1.0
    } else {
        (count.clamp(1, saturation) - 1) as f64 / (saturation - 1) as f64
    };
    let width = config.link_base_width + (config.link_max_width - config.link_base_width) * t;
    let opacity = config.link_base_opacity + (config.link_max_opacity - config.link_base_opacity) * t;
    (width, opacity)
}

fn marker_svg(
    class: &str,
    x: f64,
    y: f64,
    r: f64,
    style: &ModuleStyle,
    stroke: &str,
    title: &str,
) -> String {
    let title = escape_xml(title);
    match style.shape {
        MarkerShape::Circle => format!(
            "<circle class=\"{class}\" cx=\"{x:.2}\" cy=\"{y:.2}\" r=\"{r:.2}\" fill=\"{}\" stroke=\"{stroke}\" stroke-width=\"1\"><title>{title}</title></circle>",
            style.color
        ),
        MarkerShape::Square => format!(
            "<rect class=\"{class}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{stroke}\" stroke-width=\"1\"><title>{title}</title></rect>",
            x - r,
            y - r,
            r * 2.0,
            r * 2.0,
            style.color
        ),
        MarkerShape::Triangle => {
            let points = [
                (x, y - r * 1.2),
                (x + r * 1.1, y + r * 0.8),
                (x - r * 1.1, y + r * 0.8),
            ];
            polygon_svg(class, &points, &style.color, stroke, &title)
        }
        MarkerShape::Diamond => {
            let points = [(x, y - r * 1.3), (x + r * 1.3, y), (x, y + r * 1.3), (x - r * 1.3, y)];
            polygon_svg(class, &points, &style.color, stroke, &title)
        }
    }
}

fn polygon_svg(
    class: &str,
    points: &[(f64, f64)],
    fill: &str,
    stroke: &str,
    escaped_title: &str,
) -> String {
    let pts: Vec<String> = points.iter().map(|(x, y)| format!("{x:.2},{y:.2}")).collect();
    format!(
        "<polygon class=\"{class}\" points=\"{}\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"1\"><title>{escaped_title}</title></polygon>",
        pts.join(" ")
    )
}

/// Legend of the selected modules, or of every module on screen when no
/// module filter is active.
fn legend_svg<P>(frame: &Frame<'_, P>, theme: &Theme, config: &RenderConfig) -> String
where
    P: Projector + ?Sized,
{
    let codes: BTreeSet<&str> = if frame.filter.selected_modules.is_empty() {
        frame
            .layout
            .researchers
            .iter()
            .filter_map(|r| r.module.as_deref())
            .collect()
    } else {
        frame.filter.selected_modules.iter().map(String::as_str).collect()
    };
    if codes.is_empty() {
        return String::new();
    }

    let row = theme.font_size as f64 + 8.0;
    let x = 16.0;
    let mut y = config.height - 16.0 - row * codes.len() as f64;
    let mut out = String::from("<g class=\"legend\">");
    for code in codes {
        let style = theme.module_style(Some(code));
        out.push_str(&marker_svg(
            "legend-marker",
            x,
            y,
            config.researcher_radius,
            style,
            &theme.researcher_stroke,
            code,
        ));
        out.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" dominant-baseline=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            x + config.researcher_radius * 2.0 + 4.0,
            y,
            theme.font_family,
            theme.font_size,
            theme.text_color,
            escape_xml(code)
        ));
        y += row;
    }
    out.push_str("</g>");
    out
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
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    if let Some(size) = usvg::Size::from_wh(render_cfg.width as f32, render_cfg.height as f32) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
