use crate::filter::FilterState;
use crate::layout::LayoutResult;
use crate::projection::Viewport;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// A frame as data, for renderers living outside this crate.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump<'a> {
    pub viewport: &'a Viewport,
    pub filter: &'a FilterState,
    pub researchers: Vec<ResearcherDump<'a>>,
    pub clusters: Vec<ClusterDump<'a>>,
    pub links: Vec<LinkDump<'a>>,
    pub skipped_institutions: &'a [String],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearcherDump<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub institution: &'a str,
    pub module: Option<&'a str>,
    pub point: [f64; 2],
    pub angle: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDump<'a> {
    pub institution: &'a str,
    pub center: [f64; 2],
    pub members: &'a [String],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDump<'a> {
    pub kind: &'static str,
    pub a_id: &'a str,
    pub b_id: &'a str,
    pub points: [[f64; 2]; 2],
    pub weight: u32,
}

impl<'a> LayoutDump<'a> {
    pub fn new(layout: &'a LayoutResult, filter: &'a FilterState, viewport: &'a Viewport) -> Self {
        let researchers = layout
            .researchers
            .iter()
            .map(|r| ResearcherDump {
                id: &r.id,
                name: &r.name,
                institution: &r.institution,
                module: r.module.as_deref(),
                point: [r.x, r.y],
                angle: r.angle,
            })
            .collect();

        let clusters = layout
            .clusters
            .iter()
            .map(|c| ClusterDump {
                institution: &c.institution,
                center: [c.x, c.y],
                members: &c.members,
            })
            .collect();

        let module_links = layout.module_links.iter().map(|l| LinkDump {
            kind: "module",
            a_id: &l.a_id,
            b_id: &l.b_id,
            points: [[l.x1, l.y1], [l.x2, l.y2]],
            weight: l.weight(),
        });
        let attribute_links = layout.attribute_links.iter().map(|l| LinkDump {
            kind: "attribute",
            a_id: &l.a_id,
            b_id: &l.b_id,
            points: [[l.x1, l.y1], [l.x2, l.y2]],
            weight: 1,
        });

        LayoutDump {
            viewport,
            filter,
            researchers,
            clusters,
            links: module_links.chain(attribute_links).collect(),
            skipped_institutions: &layout.skipped_institutions,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Writes the dump to `path`, or to stdout when no path is given.
pub fn write_layout_dump(
    path: Option<&Path>,
    layout: &LayoutResult,
    filter: &FilterState,
    viewport: &Viewport,
) -> anyhow::Result<()> {
    let dump = LayoutDump::new(layout, filter, viewport);
    match path {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, &dump)?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &dump)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}
