//! Highlighted-attribute resolution: which researchers share every active
//! `{attribute, value}` pill, and where the map should look to show them.

use crate::ir::{Attribute, Highlight, Institution, Researcher, eq_ignore_case};
use crate::projection::GeoBounds;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use thiserror::Error;

static HIGHLIGHT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([A-Za-z]+)\s*[=:]\s*(.*?)\s*$").unwrap());

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttributeParseError {
    #[error("expected attribute=value, got `{0}`")]
    Syntax(String),
    #[error("unknown attribute `{0}`")]
    UnknownAttribute(String),
    #[error("empty value for attribute `{0}`")]
    EmptyValue(String),
}

impl FromStr for Highlight {
    type Err = AttributeParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let caps = HIGHLIGHT_RE
            .captures(input)
            .ok_or_else(|| AttributeParseError::Syntax(input.to_string()))?;
        let key = &caps[1];
        let value = &caps[2];
        let attribute = Attribute::from_key(key)
            .ok_or_else(|| AttributeParseError::UnknownAttribute(key.to_string()))?;
        if value.is_empty() {
            return Err(AttributeParseError::EmptyValue(key.to_string()));
        }
        Ok(Highlight::new(attribute, value))
    }
}

/// Scalar attributes must equal the value, set-valued ones must contain it.
/// Both comparisons ignore case.
pub fn matches_highlight(researcher: &Researcher, highlight: &Highlight) -> bool {
    researcher
        .values(highlight.attribute)
        .into_iter()
        .any(|value| eq_ignore_case(value, &highlight.value))
}

pub fn matches_all(researcher: &Researcher, highlights: &[Highlight]) -> bool {
    highlights.iter().all(|h| matches_highlight(researcher, h))
}

/// Researchers satisfying every highlight, in pool order. No highlights means
/// no constraint yet, and the whole pool is returned.
pub fn matching_researchers<'a>(pool: &'a [Researcher], highlights: &[Highlight]) -> Vec<&'a Researcher> {
    pool.iter().filter(|r| matches_all(r, highlights)).collect()
}

/// Geographic box around the institutions of `researchers`. Institutions
/// without coordinates do not contribute.
pub fn institution_bounds(researchers: &[&Researcher], institutions: &[Institution]) -> Option<GeoBounds> {
    let by_name: HashMap<&str, &Institution> = institutions
        .iter()
        .map(|inst| (inst.name.as_str(), inst))
        .collect();
    let mut seen = HashSet::new();
    let points = researchers
        .iter()
        .filter(|r| seen.insert(r.institution.as_str()))
        .filter_map(|r| by_name.get(r.institution.as_str()))
        .filter_map(|inst| inst.coordinates());
    GeoBounds::from_points(points)
}
