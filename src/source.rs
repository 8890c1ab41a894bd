//! Adapter between the upstream graph store export and the engine's record
//! types.
//!
//! Rows arrive flat and loosely typed: every field may be missing, ids may be
//! numbers or strings, and dates come as `{year, month, day}` triples. The
//! normalisers below turn them into [`Researcher`] and [`Institution`] values
//! that the selection and layout code can treat as total.

use crate::ir::{Institution, Researcher, normalize_module};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("record source unavailable: {0}")]
    Unavailable(String),
    #[error("malformed record data: {0}")]
    Malformed(String),
}

pub trait RecordSource {
    fn load_researchers(&self) -> Result<Vec<Researcher>, SourceError>;
    fn load_institutions(&self) -> Result<Vec<Institution>, SourceError>;
}

/// `{year, month, day}` as the store returns it. Any part may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateTriple {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl DateTriple {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self {
            year: Some(year),
            month: Some(month),
            day: Some(day),
        }
    }

    /// `None` unless all three parts are present and form a calendar date.
    pub fn to_date(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year?, self.month?, self.day?)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(f64),
    String(String),
}

impl NumberOrString {
    fn as_f64(&self) -> Option<f64> {
        match self {
            NumberOrString::Number(val) => Some(*val),
            NumberOrString::String(val) => val.trim().parse::<f64>().ok(),
        }
    }

    fn as_string(&self) -> String {
        match self {
            NumberOrString::Number(val) => format!("{}", val),
            NumberOrString::String(val) => val.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResearcherRow {
    pub id: Option<NumberOrString>,
    pub name: Option<String>,
    #[serde(alias = "mainInstitution")]
    pub institution: Option<String>,
    pub module: Option<String>,
    pub section: Option<String>,
    pub keywords: Option<Vec<Option<String>>>,
    pub population_type: Option<Vec<Option<String>>>,
    pub age_group: Option<Vec<Option<String>>>,
    pub health_status: Option<Vec<Option<String>>>,
    pub arrival_date: Option<DateTriple>,
    pub departure_date: Option<DateTriple>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct InstitutionRow {
    pub name: Option<String>,
    pub latitude: Option<NumberOrString>,
    pub longitude: Option<NumberOrString>,
}

/// Shape of a graph store export: the two read queries' rows side by side.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RecordDump {
    pub researchers: Vec<ResearcherRow>,
    pub institutions: Vec<InstitutionRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDump {
    researchers: Vec<serde_json::Value>,
    institutions: Vec<serde_json::Value>,
}

impl RecordDump {
    /// Parses an export. Only a document that is not a `{researchers,
    /// institutions}` object is malformed; a row that cannot be decoded is
    /// skipped with a warning and the rest of the export is kept.
    pub fn from_json(contents: &str) -> Result<Self, SourceError> {
        let raw: RawDump =
            serde_json::from_str(contents).map_err(|err| SourceError::Malformed(err.to_string()))?;
        Ok(Self {
            researchers: decode_rows("researcher", raw.researchers),
            institutions: decode_rows("institution", raw.institutions),
        })
    }
}

fn decode_rows<T: DeserializeOwned>(kind: &str, rows: Vec<serde_json::Value>) -> Vec<T> {
    rows.into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value(row) {
            Ok(row) => Some(row),
            Err(err) => {
                warn!(kind, index, error = %err, "skipping undecodable row");
                None
            }
        })
        .collect()
}

pub fn normalize_researchers(rows: &[ResearcherRow]) -> Vec<Researcher> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let name = clean(row.name.as_deref());
        let id = row
            .id
            .as_ref()
            .map(|id| id.as_string().trim().to_string())
            .filter(|id| !id.is_empty())
            .or_else(|| name.clone());
        let Some(id) = id else {
            warn!("dropping researcher row without id or name");
            continue;
        };
        if !seen.insert(id.clone()) {
            warn!(id = %id, "duplicate researcher id, keeping first row");
            continue;
        }
        let Some(institution) = clean(row.institution.as_deref()) else {
            warn!(id = %id, "dropping researcher row without institution");
            continue;
        };

        let arrival = row.arrival_date.and_then(DateTriple::to_date);
        let mut departure = row.departure_date.and_then(DateTriple::to_date);
        if let (Some(a), Some(d)) = (arrival, departure) {
            if d < a {
                warn!(id = %id, "departure before arrival, treating as still active");
                departure = None;
            }
        }

        out.push(Researcher {
            name: name.unwrap_or_else(|| id.clone()),
            id,
            institution,
            module: clean(row.module.as_deref()).map(|m| normalize_module(&m)),
            section: clean(row.section.as_deref()),
            keywords: clean_set(row.keywords.as_deref()),
            population_type: clean_set(row.population_type.as_deref()),
            age_group: clean_set(row.age_group.as_deref()),
            health_status: clean_set(row.health_status.as_deref()),
            arrival_date: arrival,
            departure_date: departure,
        });
    }
    out
}

/// Department rows share the institution label in the upstream store and
/// carry a `-` in their name; only the founding sites themselves are kept.
pub fn normalize_institutions(rows: &[InstitutionRow]) -> Vec<Institution> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(name) = clean(row.name.as_deref()) else {
            continue;
        };
        if name.contains('-') || !seen.insert(name.clone()) {
            continue;
        }
        out.push(Institution {
            name,
            latitude: row.latitude.as_ref().and_then(NumberOrString::as_f64),
            longitude: row.longitude.as_ref().and_then(NumberOrString::as_f64),
        });
    }
    out
}

fn clean(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn clean_set(values: Option<&[Option<String>]>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values.unwrap_or_default().iter().flatten() {
        let value = value.trim();
        if value.is_empty() || out.iter().any(|v| v == value) {
            continue;
        }
        out.push(value.to_string());
    }
    out
}

/// Reads an export file on every load; the session loads exactly once.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_dump(&self) -> Result<RecordDump, SourceError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|err| {
            SourceError::Unavailable(format!("{}: {}", self.path.display(), err))
        })?;
        RecordDump::from_json(&contents)
    }
}

impl RecordSource for JsonFileSource {
    fn load_researchers(&self) -> Result<Vec<Researcher>, SourceError> {
        Ok(normalize_researchers(&self.read_dump()?.researchers))
    }

    fn load_institutions(&self) -> Result<Vec<Institution>, SourceError> {
        Ok(normalize_institutions(&self.read_dump()?.institutions))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    dump: RecordDump,
}

impl MemorySource {
    pub fn new(dump: RecordDump) -> Self {
        Self { dump }
    }
}

impl RecordSource for MemorySource {
    fn load_researchers(&self) -> Result<Vec<Researcher>, SourceError> {
        Ok(normalize_researchers(&self.dump.researchers))
    }

    fn load_institutions(&self) -> Result<Vec<Institution>, SourceError> {
        Ok(normalize_institutions(&self.dump.institutions))
    }
}

/// Non-blocking message for the user, e.g. "data could not be loaded".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoadedRecords {
    pub researchers: Vec<Researcher>,
    pub institutions: Vec<Institution>,
    pub notices: Vec<Notice>,
}

impl LoadedRecords {
    pub fn new(researchers: Vec<Researcher>, institutions: Vec<Institution>) -> Self {
        Self {
            researchers,
            institutions,
            notices: Vec::new(),
        }
    }
}

/// Loads both record lists, degrading each to empty on failure. Errors never
/// escape this boundary.
pub fn load_or_empty(source: &dyn RecordSource) -> LoadedRecords {
    let mut records = LoadedRecords::default();
    match source.load_researchers() {
        Ok(researchers) => records.researchers = researchers,
        Err(err) => {
            warn!(error = %err, "researchers unavailable, continuing with empty list");
            records.notices.push(Notice {
                message: format!("Researchers could not be loaded ({err})"),
            });
        }
    }
    match source.load_institutions() {
        Ok(institutions) => records.institutions = institutions,
        Err(err) => {
            warn!(error = %err, "institutions unavailable, continuing with empty list");
            records.notices.push(Notice {
                message: format!("Institutions could not be loaded ({err})"),
            });
        }
    }
    info!(
        researchers = records.researchers.len(),
        institutions = records.institutions.len(),
        "records loaded"
    );
    records
}
