mod links;
mod radial;
pub(crate) mod types;
pub use links::{LinkSet, attribute_links};
pub use radial::angle_step;
pub use types::*;
use radial::*;

use crate::config::LayoutConfig;
use crate::ir::{Institution, Researcher};
use crate::projection::Projector;
use std::collections::HashSet;

/// Places the selection radially around each institution's projected point.
///
/// Output depends only on the arguments: the same selection order and the
/// same projector always give the same positions, so re-running with a new
/// projector after a pan or zoom keeps every researcher at the same angle.
pub fn compute_layout<P>(
    selection: &[&Researcher],
    institutions: &[Institution],
    projector: &P,
    config: &LayoutConfig,
) -> LayoutResult
where
    P: Projector + ?Sized,
{
    compute_radial_layout(selection, institutions, projector, config)
}

/// Adds a link between every pair of placed researchers in `matched`.
pub fn attach_attribute_links(layout: &mut LayoutResult, matched: &[&Researcher]) {
    let ids: HashSet<&str> = matched.iter().map(|r| r.id.as_str()).collect();
    layout.attribute_links = attribute_links(&layout.researchers, &ids);
}
