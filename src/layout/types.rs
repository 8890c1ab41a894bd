use serde::Serialize;

/// Planar position of one selected researcher, with a back-reference to the
/// institution it orbits.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedResearcher {
    pub id: String,
    pub name: String,
    pub institution: String,
    pub module: Option<String>,
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub group_index: usize,
}

/// Projected centre of an institution that has at least one placed
/// researcher.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterLayout {
    pub institution: String,
    pub x: f64,
    pub y: f64,
    pub members: Vec<String>,
}

/// Undirected link between two researchers of the same module inside one
/// cluster. `count` is the number of times the same segment was emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleLink {
    pub a_id: String,
    pub b_id: String,
    pub module: String,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub count: u32,
}

impl ModuleLink {
    pub fn weight(&self) -> u32 {
        self.count
    }
}

/// Link between two researchers sharing every highlighted attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeLink {
    pub a_id: String,
    pub b_id: String,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// The desired picture for one pass. Recomputed from scratch on every event.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    pub researchers: Vec<PlacedResearcher>,
    pub clusters: Vec<ClusterLayout>,
    pub module_links: Vec<ModuleLink>,
    pub attribute_links: Vec<AttributeLink>,
    pub skipped_institutions: Vec<String>,
}

impl LayoutResult {
    pub fn is_empty(&self) -> bool {
        self.researchers.is_empty()
    }

    pub fn researcher(&self, id: &str) -> Option<&PlacedResearcher> {
        self.researchers.iter().find(|r| r.id == id)
    }
}
