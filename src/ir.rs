use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A person with a research role at one of the network's institutions.
///
/// Loaded once per session. Set-valued attributes keep their upstream order
/// but never contain duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Researcher {
    pub id: String,
    pub name: String,
    pub institution: String,
    pub module: Option<String>,
    pub section: Option<String>,
    pub keywords: Vec<String>,
    pub population_type: Vec<String>,
    pub age_group: Vec<String>,
    pub health_status: Vec<String>,
    pub arrival_date: Option<NaiveDate>,
    pub departure_date: Option<NaiveDate>,
}

impl Researcher {
    pub fn new(id: impl Into<String>, name: impl Into<String>, institution: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            institution: institution.into(),
            module: None,
            section: None,
            keywords: Vec::new(),
            population_type: Vec::new(),
            age_group: Vec::new(),
            health_status: Vec::new(),
            arrival_date: None,
            departure_date: None,
        }
    }

    /// Module codes are stored trimmed and upper-cased, the form module
    /// filters compare against.
    pub fn with_module(mut self, module: impl AsRef<str>) -> Self {
        self.module = Some(normalize_module(module.as_ref()));
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dates(mut self, arrival: Option<NaiveDate>, departure: Option<NaiveDate>) -> Self {
        self.arrival_date = arrival;
        self.departure_date = departure;
        self
    }

    /// Whether the researcher was part of the network at some point in `year`.
    ///
    /// A missing arrival date places no lower bound; a missing departure date
    /// means the researcher is still active.
    pub fn is_active_in(&self, year: i32) -> bool {
        let arrived = self
            .arrival_date
            .map(|date| date.year() <= year)
            .unwrap_or(true);
        let not_departed = self
            .departure_date
            .map(|date| date.year() >= year)
            .unwrap_or(true);
        arrived && not_departed
    }

    /// Values of `attribute` for this researcher. Scalar attributes yield at
    /// most one value.
    pub fn values(&self, attribute: Attribute) -> Vec<&str> {
        match attribute {
            Attribute::Name => vec![self.name.as_str()],
            Attribute::Institution => vec![self.institution.as_str()],
            Attribute::Module => self.module.as_deref().into_iter().collect(),
            Attribute::Section => self.section.as_deref().into_iter().collect(),
            Attribute::Keywords => self.keywords.iter().map(String::as_str).collect(),
            Attribute::PopulationType => self.population_type.iter().map(String::as_str).collect(),
            Attribute::AgeGroup => self.age_group.iter().map(String::as_str).collect(),
            Attribute::HealthStatus => self.health_status.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A physical site. Institutions without both coordinates are kept in the
/// record list but cannot be placed on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Institution {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    pub fn without_coordinates(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            latitude: None,
            longitude: None,
        }
    }

    pub fn coordinates(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some(GeoPoint { lat, lon }),
            _ => None,
        }
    }
}

/// Researcher fields that can be highlighted from the detail popup or the
/// command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Attribute {
    Name,
    Institution,
    Module,
    Section,
    Keywords,
    PopulationType,
    AgeGroup,
    HealthStatus,
}

impl Attribute {
    pub const ALL: [Attribute; 8] = [
        Attribute::Name,
        Attribute::Institution,
        Attribute::Module,
        Attribute::Section,
        Attribute::Keywords,
        Attribute::PopulationType,
        Attribute::AgeGroup,
        Attribute::HealthStatus,
    ];

    /// Attributes offered as pills in the researcher detail view.
    pub const SET_VALUED: [Attribute; 4] = [
        Attribute::Keywords,
        Attribute::PopulationType,
        Attribute::AgeGroup,
        Attribute::HealthStatus,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Attribute::Name => "name",
            Attribute::Institution => "institution",
            Attribute::Module => "module",
            Attribute::Section => "section",
            Attribute::Keywords => "keywords",
            Attribute::PopulationType => "populationType",
            Attribute::AgeGroup => "ageGroup",
            Attribute::HealthStatus => "healthStatus",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|attr| attr.key().eq_ignore_ascii_case(key))
    }

    pub fn is_set_valued(self) -> bool {
        Self::SET_VALUED.contains(&self)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One `{attribute, value}` constraint. Highlights are AND-combined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub attribute: Attribute,
    pub value: String,
}

impl Highlight {
    pub fn new(attribute: Attribute, value: impl Into<String>) -> Self {
        Self {
            attribute,
            value: value.into(),
        }
    }

    /// Highlights are compared case-insensitively, so toggling `MRI` removes
    /// an active `mri`.
    pub fn same_as(&self, other: &Highlight) -> bool {
        self.attribute == other.attribute && eq_ignore_case(&self.value, &other.value)
    }
}

impl fmt::Display for Highlight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.attribute, self.value)
    }
}

pub(crate) fn normalize_module(module: &str) -> String {
    module.trim().to_uppercase()
}

pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}
