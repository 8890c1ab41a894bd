use crate::filter::FilterState;
use crate::ir::Researcher;

/// Researchers eligible for display under `filter`, in input order.
///
/// Institution and module restrictions are AND-combined; an empty set places
/// no restriction, so a filter with neither set yields every researcher. The
/// year restriction is applied last and always.
///
/// Highlighted attributes are not considered here; they select through
/// [`crate::attributes::matching_researchers`].
pub fn select<'a>(researchers: &'a [Researcher], filter: &FilterState) -> Vec<&'a Researcher> {
    researchers
        .iter()
        .filter(|r| institution_matches(r, filter))
        .filter(|r| module_matches(r, filter))
        .filter(|r| r.is_active_in(filter.year))
        .collect()
}

fn institution_matches(researcher: &Researcher, filter: &FilterState) -> bool {
    filter.selected_institutions.is_empty()
        || filter.selected_institutions.contains(&researcher.institution)
}

fn module_matches(researcher: &Researcher, filter: &FilterState) -> bool {
    if filter.selected_modules.is_empty() {
        return true;
    }
    researcher
        .module
        .as_ref()
        .map(|module| filter.selected_modules.contains(module))
        .unwrap_or(false)
}
