//! The interactive session: owner of the single mutable [`FilterState`] and
//! of the current viewport.
//!
//! Every `on_*` handler mutates the state and synchronously re-derives the
//! whole picture (select, resolve highlights, lay out) before returning, so a
//! renderer never observes a half-updated layout.

use crate::attributes::{institution_bounds, matching_researchers};
use crate::config::{Config, LayoutConfig};
use crate::filter::{FilterState, current_year};
use crate::ir::{Attribute, Highlight, Institution, Researcher};
use crate::layout::{LayoutResult, attach_attribute_links, compute_layout};
use crate::projection::{Projector, Viewport};
use crate::render::{Frame, render_svg};
use crate::select::select;
use crate::source::{LoadedRecords, Notice};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Researchers to place for one pass.
pub struct Displayed<'a> {
    /// Filter selection followed by highlighted matches outside it.
    pub researchers: Vec<&'a Researcher>,
    /// Researchers active in the selected year sharing every highlighted
    /// attribute, when any is active.
    pub matched: Option<Vec<&'a Researcher>>,
}

pub fn displayed<'a>(researchers: &'a [Researcher], filter: &FilterState) -> Displayed<'a> {
    let mut shown = select(researchers, filter);
    if filter.highlighted.is_empty() {
        return Displayed {
            researchers: shown,
            matched: None,
        };
    }
    let matched = active_matches(researchers, filter);
    let present: HashSet<&str> = shown.iter().map(|r| r.id.as_str()).collect();
    let extra: Vec<&Researcher> = matched
        .iter()
        .copied()
        .filter(|r| !present.contains(r.id.as_str()))
        .collect();
    shown.extend(extra);
    Displayed {
        researchers: shown,
        matched: Some(matched),
    }
}

/// Researchers sharing every highlighted attribute who are also active in
/// the selected year.
fn active_matches<'a>(researchers: &'a [Researcher], filter: &FilterState) -> Vec<&'a Researcher> {
    matching_researchers(researchers, &filter.highlighted)
        .into_iter()
        .filter(|r| r.is_active_in(filter.year))
        .collect()
}

/// One full derivation: `(records, filter, projector) -> LayoutResult`.
pub fn derive_layout<P>(
    researchers: &[Researcher],
    institutions: &[Institution],
    filter: &FilterState,
    projector: &P,
    config: &LayoutConfig,
) -> LayoutResult
where
    P: Projector + ?Sized,
{
    let shown = displayed(researchers, filter);
    let mut layout = compute_layout(&shown.researchers, institutions, projector, config);
    if config.attribute_links {
        if let Some(matched) = &shown.matched {
            attach_attribute_links(&mut layout, matched);
        }
    }
    layout
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributePill {
    pub attribute: Attribute,
    pub value: String,
    pub active: bool,
}

/// Content of the researcher popup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearcherDetail {
    pub id: String,
    pub name: String,
    pub institution: String,
    pub module: Option<String>,
    pub section: Option<String>,
    pub arrival_date: Option<NaiveDate>,
    pub departure_date: Option<NaiveDate>,
    pub pills: Vec<AttributePill>,
}

pub struct Session {
    researchers: Vec<Researcher>,
    institutions: Vec<Institution>,
    notices: Vec<Notice>,
    config: Config,
    filter: FilterState,
    viewport: Viewport,
    layout: LayoutResult,
}

impl Session {
    pub fn new(records: LoadedRecords, config: Config) -> Self {
        let viewport = config.initial_viewport();
        let year = config.map.year_range().clamp(current_year());
        let mut session = Self {
            researchers: records.researchers,
            institutions: records.institutions,
            notices: records.notices,
            config,
            filter: FilterState::new(year),
            viewport,
            layout: LayoutResult::default(),
        };
        session.recompute();
        session
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn layout(&self) -> &LayoutResult {
        &self.layout
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn researchers(&self) -> &[Researcher] {
        &self.researchers
    }

    pub fn institutions(&self) -> &[Institution] {
        &self.institutions
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn displayed(&self) -> Displayed<'_> {
        displayed(&self.researchers, &self.filter)
    }

    pub fn on_institution_click(&mut self, name: &str) -> &LayoutResult {
        debug!(institution = name, "institution clicked");
        self.filter.click_institution(name);
        self.recompute()
    }

    pub fn on_module_filter_change<I, S>(&mut self, modules: I) -> &LayoutResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.filter.set_modules(modules);
        debug!(modules = ?self.filter.selected_modules, "module filter changed");
        self.recompute()
    }

    pub fn on_module_toggle(&mut self, module: &str) -> &LayoutResult {
        let active = self.filter.toggle_module(module);
        debug!(module, active, "module toggled");
        self.recompute()
    }

    pub fn on_year_change(&mut self, year: i32) -> &LayoutResult {
        let range = self.config.map.year_range();
        self.filter.set_year(year, &range);
        debug!(requested = year, year = self.filter.year, "year changed");
        self.recompute()
    }

    /// Toggles a pill, then fits the view to the institutions of the
    /// researchers matching the remaining highlights.
    pub fn on_attribute_toggle(&mut self, highlight: Highlight) -> &LayoutResult {
        let active = self.filter.toggle_attribute(highlight);
        debug!(active, highlighted = self.filter.highlighted.len(), "attribute toggled");
        if self.config.map.fit_on_highlight && !self.filter.highlighted.is_empty() {
            let bounds = {
                let matched = active_matches(&self.researchers, &self.filter);
                institution_bounds(&matched, &self.institutions)
            };
            if let Some(bounds) = bounds {
                self.viewport = self.fit(&bounds);
            }
        }
        self.recompute()
    }

    pub fn on_reset(&mut self) -> &LayoutResult {
        let year = self.config.map.year_range().clamp(current_year());
        self.filter.reset(year);
        debug!(year, "filters reset");
        self.recompute()
    }

    /// Pan or zoom. Only the projection changes; group order and radius are
    /// kept, so every researcher keeps its angle around its institution.
    pub fn on_viewport_change(&mut self, viewport: Viewport) -> &LayoutResult {
        self.viewport = viewport;
        self.recompute()
    }

    /// Fits the view to the institutions of everything currently displayed.
    pub fn fit_to_selection(&mut self) -> &LayoutResult {
        let bounds = {
            let shown = self.displayed();
            institution_bounds(&shown.researchers, &self.institutions)
        };
        if let Some(bounds) = bounds {
            self.viewport = self.fit(&bounds);
        }
        self.recompute()
    }

    fn fit(&self, bounds: &crate::projection::GeoBounds) -> Viewport {
        let map = &self.config.map;
        self.viewport
            .fit_bounds(bounds, map.fit_padding, map.min_zoom, map.max_zoom)
    }

    fn recompute(&mut self) -> &LayoutResult {
        self.layout = derive_layout(
            &self.researchers,
            &self.institutions,
            &self.filter,
            &self.viewport,
            &self.config.layout,
        );
        &self.layout
    }

    pub fn researcher_details(&self, id: &str) -> Option<ResearcherDetail> {
        let researcher = self.researchers.iter().find(|r| r.id == id)?;
        let mut pills = Vec::new();
        for attribute in Attribute::SET_VALUED {
            for value in researcher.values(attribute) {
                let highlight = Highlight::new(attribute, value);
                pills.push(AttributePill {
                    active: self.filter.is_highlighted(&highlight),
                    attribute,
                    value: highlight.value,
                });
            }
        }
        Some(ResearcherDetail {
            id: researcher.id.clone(),
            name: researcher.name.clone(),
            institution: researcher.institution.clone(),
            module: researcher.module.clone(),
            section: researcher.section.clone(),
            arrival_date: researcher.arrival_date,
            departure_date: researcher.departure_date,
            pills,
        })
    }

    pub fn render_svg(&self) -> String {
        let mut render = self.config.render.clone();
        render.width = self.viewport.width;
        render.height = self.viewport.height;
        let frame = Frame {
            layout: &self.layout,
            filter: &self.filter,
            institutions: &self.institutions,
            projector: &self.viewport,
        };
        render_svg(&frame, &self.config.theme, &render)
    }
}
