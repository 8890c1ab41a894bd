use crate::ir::{Highlight, normalize_module};
use chrono::Datelike;
use serde::Serialize;
use std::collections::BTreeSet;

pub const FIRST_YEAR: i32 = 2004;

pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Bounds of the year slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    pub first: i32,
    pub last: i32,
}

impl YearRange {
    pub fn new(first: i32, last: i32) -> Self {
        Self {
            first: first.min(last),
            last: first.max(last),
        }
    }

    pub fn clamp(&self, year: i32) -> i32 {
        year.clamp(self.first, self.last)
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self::new(FIRST_YEAR, current_year())
    }
}

/// The only mutable state of a session. Every output is a function of the
/// record lists, this value and the viewport.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub selected_institutions: BTreeSet<String>,
    pub selected_modules: BTreeSet<String>,
    pub year: i32,
    pub highlighted: Vec<Highlight>,
}

impl FilterState {
    pub fn new(year: i32) -> Self {
        Self {
            selected_institutions: BTreeSet::new(),
            selected_modules: BTreeSet::new(),
            year,
            highlighted: Vec::new(),
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.selected_institutions.is_empty()
            && self.selected_modules.is_empty()
            && self.highlighted.is_empty()
    }

    /// Clicking a marker replaces the institution selection.
    pub fn click_institution(&mut self, name: &str) {
        self.selected_institutions.clear();
        self.selected_institutions.insert(name.to_string());
    }

    /// Returns whether the module is selected after the toggle.
    pub fn toggle_module(&mut self, module: &str) -> bool {
        let module = normalize_module(module);
        if self.selected_modules.remove(&module) {
            false
        } else {
            self.selected_modules.insert(module);
            true
        }
    }

    pub fn set_modules<I, S>(&mut self, modules: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.selected_modules = modules
            .into_iter()
            .map(|m| normalize_module(m.as_ref()))
            .filter(|m| !m.is_empty())
            .collect();
    }

    pub fn set_year(&mut self, year: i32, range: &YearRange) {
        self.year = range.clamp(year);
    }

    /// Adds the highlight, or removes it when an equivalent one is active.
    /// Insertion order of the remaining highlights is preserved. Returns
    /// whether the highlight is active after the toggle.
    pub fn toggle_attribute(&mut self, highlight: Highlight) -> bool {
        if let Some(pos) = self.highlighted.iter().position(|h| h.same_as(&highlight)) {
            self.highlighted.remove(pos);
            false
        } else {
            self.highlighted.push(highlight);
            true
        }
    }

    pub fn is_highlighted(&self, highlight: &Highlight) -> bool {
        self.highlighted.iter().any(|h| h.same_as(highlight))
    }

    pub fn reset(&mut self, year: i32) {
        self.selected_institutions.clear();
        self.selected_modules.clear();
        self.highlighted.clear();
        self.year = year;
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new(current_year())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Attribute;

    #[test]
    fn institution_click_replaces_selection() {
        let mut filter = FilterState::new(2024);
        filter.click_institution("EPFL");
        filter.click_institution("UNIGE");
        assert_eq!(filter.selected_institutions.len(), 1);
        assert!(filter.selected_institutions.contains("UNIGE"));
    }

    #[test]
    fn module_toggle_adds_and_removes() {
        let mut filter = FilterState::new(2024);
        assert!(filter.toggle_module("mri"));
        assert!(filter.selected_modules.contains("MRI"));
        assert!(!filter.toggle_module("MRI"));
        assert!(filter.selected_modules.is_empty());
    }

    #[test]
    fn year_is_clamped_to_slider_range() {
        let mut filter = FilterState::new(2024);
        let range = YearRange::new(2004, 2024);
        filter.set_year(1990, &range);
        assert_eq!(filter.year, 2004);
        filter.set_year(2100, &range);
        assert_eq!(filter.year, 2024);
        filter.set_year(2012, &range);
        assert_eq!(filter.year, 2012);
    }

    #[test]
    fn attribute_toggle_keeps_order_and_ignores_case() {
        let mut filter = FilterState::new(2024);
        filter.toggle_attribute(Highlight::new(Attribute::Keywords, "genetics"));
        filter.toggle_attribute(Highlight::new(Attribute::AgeGroup, "adult"));
        filter.toggle_attribute(Highlight::new(Attribute::Keywords, "neuroimaging"));
        assert!(!filter.toggle_attribute(Highlight::new(Attribute::Keywords, "GENETICS")));
        let values: Vec<&str> = filter.highlighted.iter().map(|h| h.value.as_str()).collect();
        assert_eq!(values, vec!["adult", "neuroimaging"]);
    }

    #[test]
    fn reset_clears_everything() {
        let mut filter = FilterState::new(2010);
        filter.click_institution("EPFL");
        filter.toggle_module("EEG");
        filter.toggle_attribute(Highlight::new(Attribute::Keywords, "genetics"));
        filter.reset(2024);
        assert!(filter.is_unfiltered());
        assert_eq!(filter.year, 2024);
    }
}
