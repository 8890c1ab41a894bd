use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use research_atlas::attributes::matching_researchers;
use research_atlas::{
    Attribute, Config, FilterState, GeoPoint, Highlight, Institution, JsonFileSource, LayoutConfig,
    LoadedRecords, PlanarPoint, Researcher, Session, Viewport, compute_layout, derive_layout,
    load_or_empty, select,
};

fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("network.json")
}

fn fixture_records() -> LoadedRecords {
    let records = load_or_empty(&JsonFileSource::new(fixture_path()));
    assert!(records.notices.is_empty(), "fixture failed to load: {:?}", records.notices);
    records
}

fn ids<'a>(researchers: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    researchers.into_iter().collect()
}

#[test]
fn fixture_is_normalized() {
    let records = fixture_records();
    assert_eq!(records.researchers.len(), 11);
    assert_eq!(records.institutions.len(), 5);
    assert!(records.institutions.iter().all(|i| !i.name.contains('-')));
    let ken = records.researchers.iter().find(|r| r.name == "Ken Pittet").unwrap();
    assert_eq!(ken.id, "Ken Pittet");
    assert_eq!(ken.module.as_deref(), Some("DS"));
    let unil = records.institutions.iter().find(|i| i.name == "UNIL").unwrap();
    assert!(unil.coordinates().is_some());
}

#[test]
fn unfiltered_selection_is_everyone() {
    let researchers: Vec<Researcher> = fixture_records()
        .researchers
        .into_iter()
        .map(|r| r.with_dates(None, None))
        .collect();
    let filter = FilterState::new(2024);
    assert!(filter.is_unfiltered());
    assert_eq!(select(&researchers, &filter).len(), researchers.len());
}

#[test]
fn module_selection_never_leaks() {
    let records = fixture_records();
    for modules in [vec!["MRI"], vec!["SP", "PET"], vec!["DS"], vec!["NIRS"]] {
        let mut filter = FilterState::new(2024);
        filter.set_modules(&modules);
        let selected = select(&records.researchers, &filter);
        for r in &selected {
            let module = r.module.as_deref().unwrap();
            assert!(modules.contains(&module), "{module} leaked into {modules:?}");
        }
        let expected = records
            .researchers
            .iter()
            .filter(|r| r.is_active_in(2024))
            .filter(|r| r.module.as_deref().is_some_and(|m| modules.contains(&m)))
            .count();
        assert_eq!(selected.len(), expected);
    }
}

#[test]
fn time_window_follows_arrival_and_departure() {
    let records = fixture_records();
    let mut filter = FilterState::new(2024);
    let active = |filter: &FilterState| -> Vec<String> {
        select(&records.researchers, filter)
            .iter()
            .map(|r| r.id.clone())
            .collect()
    };
    assert!(active(&filter).contains(&"1".to_string()));
    assert!(!active(&filter).contains(&"3".to_string()));
    filter.year = 2005;
    let early = active(&filter);
    assert!(!early.contains(&"1".to_string()));
    assert!(early.contains(&"6".to_string()));
    filter.year = 2012;
    assert!(active(&filter).contains(&"3".to_string()));
}

#[test]
fn attribute_and_semantics() {
    let pool = vec![
        Researcher::new("A", "A", "EPFL").with_keywords(["genetics", "neuroimaging"]),
        Researcher::new("B", "B", "EPFL").with_keywords(["genetics"]),
    ];
    let mut filter = FilterState::new(2024);
    filter.toggle_attribute(Highlight::new(Attribute::Keywords, "genetics"));
    filter.toggle_attribute(Highlight::new(Attribute::Keywords, "neuroimaging"));
    let matched = matching_researchers(&pool, &filter.highlighted);
    assert_eq!(ids(matched.iter().map(|r| r.id.as_str())), vec!["A"]);
}

#[test]
fn clicking_epfl_places_a_linked_pair() {
    let records = LoadedRecords::new(
        vec![
            Researcher::new("1", "One", "EPFL").with_module("MRI"),
            Researcher::new("2", "Two", "EPFL").with_module("MRI"),
        ],
        vec![Institution::new("EPFL", 46.52, 6.5656)],
    );
    let mut session = Session::new(records, Config::default());
    let view = *session.viewport();
    let center = view.project(GeoPoint::new(46.52, 6.5656));
    let layout = session.on_institution_click("EPFL");

    assert_eq!(layout.researchers.len(), 2);
    let angles: Vec<f64> = layout.researchers.iter().map(|r| r.angle).collect();
    assert!(angles[0].abs() < 1e-12);
    assert!((angles[1] - PI).abs() < 1e-12);
    for r in &layout.researchers {
        let d = PlanarPoint::new(r.x, r.y).distance(&center);
        assert!((d - 100.0).abs() < 1e-9);
    }
    assert_eq!(layout.module_links.len(), 1);
    let link = &layout.module_links[0];
    assert_eq!(link.count, 1);
    assert_eq!((link.a_id.as_str(), link.b_id.as_str()), ("1", "2"));
}

#[test]
fn chuv_cluster_over_time() {
    let mut session = Session::new(fixture_records(), Config::default());
    let layout = session.on_institution_click("CHUV");
    assert_eq!(layout.researchers.len(), 3);
    assert_eq!(layout.module_links.len(), 3);
    assert!(layout.module_links.iter().all(|l| l.module == "SP" && l.count == 1));

    let layout = session.on_year_change(2020);
    assert_eq!(ids(layout.researchers.iter().map(|r| r.id.as_str())), vec!["6", "8"]);
    assert_eq!(layout.module_links.len(), 1);
}

#[test]
fn shared_attributes_link_across_institutions() {
    let mut config = Config::default();
    config.map.fit_on_highlight = false;
    let mut session = Session::new(fixture_records(), config);
    session.on_institution_click("CHUV");
    session.on_attribute_toggle(Highlight::new(Attribute::Keywords, "genetics"));
    let layout = session.on_attribute_toggle(Highlight::new(Attribute::Keywords, "neuroimaging"));

    let placed = ids(layout.researchers.iter().map(|r| r.id.as_str()));
    assert!(placed.contains(&"1"));
    assert!(placed.contains(&"5"));
    assert!(!placed.contains(&"9"));
    assert_eq!(layout.attribute_links.len(), 1);
    assert!(layout.skipped_institutions.contains(&"HUG".to_string()));
}

#[test]
fn highlight_fit_shows_matched_institutions() {
    let mut session = Session::new(fixture_records(), Config::default());
    session.on_attribute_toggle(Highlight::new(Attribute::Keywords, "neuroimaging"));
    let view = *session.viewport();
    for geo in [GeoPoint::new(46.5191, 6.5668), GeoPoint::new(46.2044, 6.1432)] {
        let p = view.project(geo);
        assert!(p.x > 0.0 && p.x < view.width && p.y > 0.0 && p.y < view.height);
    }
}

#[test]
fn layout_is_stable_across_sessions_and_zoom() {
    let records = fixture_records();
    let filter = FilterState::new(2024);
    let view = Viewport::new(GeoPoint::new(46.4, 6.4), 10.0, 1024.0, 768.0);
    let first = derive_layout(&records.researchers, &records.institutions, &filter, &view, &LayoutConfig::default());
    let second = derive_layout(&records.researchers, &records.institutions, &filter, &view, &LayoutConfig::default());
    assert_eq!(first, second);

    let zoomed = Viewport { zoom: 12.0, ..view };
    let third = derive_layout(&records.researchers, &records.institutions, &filter, &zoomed, &LayoutConfig::default());
    for (a, b) in first.researchers.iter().zip(&third.researchers) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.angle, b.angle);
    }
}

#[test]
fn custom_projector_and_radius() {
    let records = fixture_records();
    let filter = FilterState::new(2024);
    let selection = select(&records.researchers, &filter);
    let flat = |p: GeoPoint| PlanarPoint::new(p.lon * 100.0, -p.lat * 100.0);
    let config = LayoutConfig {
        radius: 12.5,
        ..LayoutConfig::default()
    };
    let layout = compute_layout(&selection, &records.institutions, &flat, &config);
    for r in &layout.researchers {
        let cluster = layout.clusters.iter().find(|c| c.institution == r.institution).unwrap();
        let d = PlanarPoint::new(r.x, r.y).distance(&PlanarPoint::new(cluster.x, cluster.y));
        assert!((d - 12.5).abs() < 1e-9);
    }
}

#[test]
fn render_shows_clusters_and_year() {
    let mut session = Session::new(fixture_records(), Config::default());
    session.on_year_change(2022);
    session.fit_to_selection();
    let svg = session.render_svg();
    assert!(svg.contains("<title>CHUV</title>"));
    assert!(svg.contains("<title>Margaret Jaquet</title>"));
    assert!(svg.contains(">2022</text>"));
}

#[test]
fn missing_store_yields_inert_map() {
    let records = load_or_empty(&JsonFileSource::new(fixture_path().with_file_name("absent.json")));
    assert_eq!(records.notices.len(), 2);
    let mut session = Session::new(records, Config::default());
    assert!(session.layout().is_empty());
    assert!(session.on_reset().is_empty());
}
