use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;

use tracing::debug;

use crate::config::LayoutConfig;
use crate::ir::{Institution, Researcher};
use crate::projection::Projector;

use super::{ClusterLayout, LayoutResult, LinkSet, PlacedResearcher};

struct Group<'a> {
    institution: &'a str,
    members: Vec<&'a Researcher>,
}

/// Groups in order of first appearance; members keep selection order.
fn group_by_institution<'a>(selection: &[&'a Researcher]) -> Vec<Group<'a>> {
    let mut groups: Vec<Group<'a>> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut seen: HashSet<&'a str> = HashSet::new();
    for &researcher in selection {
        if !seen.insert(researcher.id.as_str()) {
            continue;
        }
        let key = researcher.institution.as_str();
        let idx = *index.entry(key).or_insert_with(|| {
            groups.push(Group {
                institution: key,
                members: Vec::new(),
            });
            groups.len() - 1
        });
        groups[idx].members.push(researcher);
    }
    groups
}

/// Angular distance between neighbours on a circle of `count` members.
pub fn angle_step(count: usize) -> Option<f64> {
    if count == 0 {
        None
    } else {
        Some(TAU / count as f64)
    }
}

pub(super) fn compute_radial_layout<P>(
    selection: &[&Researcher],
    institutions: &[Institution],
    projector: &P,
    config: &LayoutConfig,
) -> LayoutResult
where
    P: Projector + ?Sized,
{
    let by_name: HashMap<&str, &Institution> = institutions
        .iter()
        .map(|inst| (inst.name.as_str(), inst))
        .collect();
    let radius = config.radius;

    let mut result = LayoutResult::default();
    let mut links = LinkSet::new();

    for group in group_by_institution(selection) {
        let Some(step) = angle_step(group.members.len()) else {
            continue;
        };
        let Some(center) = by_name
            .get(group.institution)
            .and_then(|inst| inst.coordinates())
        else {
            debug!(
                institution = group.institution,
                researchers = group.members.len(),
                "institution has no coordinates, skipping its cluster"
            );
            result.skipped_institutions.push(group.institution.to_string());
            continue;
        };
        let c = projector.project(center);

        let first = result.researchers.len();
        for (i, researcher) in group.members.iter().enumerate() {
            let angle = i as f64 * step;
            result.researchers.push(PlacedResearcher {
                id: researcher.id.clone(),
                name: researcher.name.clone(),
                institution: researcher.institution.clone(),
                module: researcher.module.clone(),
                x: c.x + radius * angle.cos(),
                y: c.y + radius * angle.sin(),
                angle,
                group_index: i,
            });
        }

        let placed = &result.researchers[first..];
        if config.same_module_links {
            for (i, a) in placed.iter().enumerate() {
                let Some(module) = a.module.as_deref() else {
                    continue;
                };
                for b in &placed[i + 1..] {
                    if b.module.as_deref() == Some(module) {
                        links.link_between(a, b, module);
                    }
                }
            }
        }

        result.clusters.push(ClusterLayout {
            institution: group.institution.to_string(),
            x: c.x,
            y: c.y,
            members: placed.iter().map(|r| r.id.clone()).collect(),
        });
    }

    result.module_links = links.into_links();
    debug!(
        placed = result.researchers.len(),
        clusters = result.clusters.len(),
        links = result.module_links.len(),
        "radial layout pass"
    );
    result
}
