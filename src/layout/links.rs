use std::collections::{HashMap, HashSet};

use super::{AttributeLink, ModuleLink, PlacedResearcher};

// Endpoints are compared at 1/1000 of a planar unit.
const KEY_PRECISION: f64 = 1000.0;

type SegmentKey = (i64, i64, i64, i64);

fn quantize(value: f64) -> i64 {
    (value * KEY_PRECISION).round() as i64
}

/// Key of an undirected segment: both endpoint orders map to the same key.
fn segment_key(x1: f64, y1: f64, x2: f64, y2: f64) -> SegmentKey {
    let a = (quantize(x1), quantize(y1));
    let b = (quantize(x2), quantize(y2));
    if a <= b {
        (a.0, a.1, b.0, b.1)
    } else {
        (b.0, b.1, a.0, a.1)
    }
}

/// Module links coalesced by segment. Emitting a segment that is already
/// present bumps its `count` instead of adding a second link.
#[derive(Debug, Default)]
pub struct LinkSet {
    links: Vec<ModuleLink>,
    index: HashMap<SegmentKey, usize>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, link: ModuleLink) {
        let key = segment_key(link.x1, link.y1, link.x2, link.y2);
        match self.index.get(&key) {
            Some(&idx) => {
                let existing = &mut self.links[idx];
                existing.count = existing.count.saturating_add(link.count);
            }
            None => {
                self.index.insert(key, self.links.len());
                self.links.push(link);
            }
        }
    }

    pub fn link_between(&mut self, a: &PlacedResearcher, b: &PlacedResearcher, module: &str) {
        self.insert(ModuleLink {
            a_id: a.id.clone(),
            b_id: b.id.clone(),
            module: module.to_string(),
            x1: a.x,
            y1: a.y,
            x2: b.x,
            y2: b.y,
            count: 1,
        });
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn into_links(self) -> Vec<ModuleLink> {
        self.links
    }
}

/// Every unordered pair of placed researchers whose id is in `matched`, in
/// placement order.
pub fn attribute_links(placed: &[PlacedResearcher], matched: &HashSet<&str>) -> Vec<AttributeLink> {
    let members: Vec<&PlacedResearcher> = placed
        .iter()
        .filter(|r| matched.contains(r.id.as_str()))
        .collect();
    let mut links = Vec::new();
    for (i, a) in members.iter().enumerate() {
        for b in &members[i + 1..] {
            links.push(AttributeLink {
                a_id: a.id.clone(),
                b_id: b.id.clone(),
                x1: a.x,
                y1: a.y,
                x2: b.x,
                y2: b.y,
            });
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placed(id: &str, x: f64, y: f64) -> PlacedResearcher {
        PlacedResearcher {
            id: id.to_string(),
            name: id.to_string(),
            institution: "EPFL".to_string(),
            module: Some("MRI".to_string()),
            x,
            y,
            angle: 0.0,
            group_index: 0,
        }
    }

    #[test]
    fn identical_segments_coalesce() {
        let a = placed("a", 10.0, 20.0);
        let b = placed("b", 30.0, 40.0);
        let mut links = LinkSet::new();
        links.link_between(&a, &b, "MRI");
        links.link_between(&b, &a, "MRI");
        assert_eq!(links.len(), 1);
        assert_eq!(links.into_links()[0].count, 2);
    }

    #[test]
    fn distinct_segments_stay_separate() {
        let mut links = LinkSet::new();
        links.link_between(&placed("a", 0.0, 0.0), &placed("b", 1.0, 0.0), "MRI");
        links.link_between(&placed("a", 0.0, 0.0), &placed("c", 1.01, 0.0), "MRI");
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn attribute_links_pair_matched_only() {
        let nodes = vec![
            placed("a", 0.0, 0.0),
            placed("b", 1.0, 0.0),
            placed("c", 2.0, 0.0),
        ];
        let matched: HashSet<&str> = ["a", "c"].into_iter().collect();
        let links = attribute_links(&nodes, &matched);
        assert_eq!(links.len(), 1);
        assert_eq!((links[0].a_id.as_str(), links[0].b_id.as_str()), ("a", "c"));
    }
}
