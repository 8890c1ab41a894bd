use research_atlas::source::Notice;
use research_atlas::{
    Attribute, Config, GeoPoint, Highlight, LoadedRecords, MemorySource, RecordDump, Session, Viewport,
    load_or_empty, parse_config,
};
use wasm_bindgen::prelude::*;

fn load_records(data_json: &str) -> LoadedRecords {
    match RecordDump::from_json(data_json) {
        Ok(dump) => load_or_empty(&MemorySource::new(dump)),
        Err(error) => LoadedRecords {
            notices: vec![Notice {
                message: format!("Records could not be loaded ({error})"),
            }],
            ..LoadedRecords::default()
        },
    }
}

fn build_session(data_json: &str, config_json: Option<&str>) -> Result<Session, String> {
    let config = match config_json {
        Some(raw) => parse_config(raw).map_err(|error| error.to_string())?,
        None => Config::default(),
    };
    Ok(Session::new(load_records(data_json), config))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|error| error.to_string())
}

fn parse_highlight(attribute: &str, value: &str) -> Result<Highlight, String> {
    let attribute =
        Attribute::from_key(attribute).ok_or_else(|| format!("unknown attribute `{attribute}`"))?;
    Ok(Highlight::new(attribute, value))
}

/// A map session driven by the browser's map widget and UI controls. Every
/// event returns the new layout as JSON.
#[wasm_bindgen]
pub struct AtlasMap {
    session: Session,
}

#[wasm_bindgen]
impl AtlasMap {
    #[wasm_bindgen(constructor)]
    pub fn new(data_json: &str, config_json: Option<String>) -> Result<AtlasMap, JsValue> {
        let session = build_session(data_json, config_json.as_deref()).map_err(|e| JsValue::from_str(&e))?;
        Ok(AtlasMap { session })
    }

    pub fn layout(&self) -> Result<String, JsValue> {
        to_json(self.session.layout()).map_err(|e| JsValue::from_str(&e))
    }

    pub fn filter(&self) -> Result<String, JsValue> {
        to_json(self.session.filter()).map_err(|e| JsValue::from_str(&e))
    }

    pub fn notices(&self) -> Result<String, JsValue> {
        to_json(&self.session.notices()).map_err(|e| JsValue::from_str(&e))
    }

    #[wasm_bindgen(js_name = onInstitutionClick)]
    pub fn on_institution_click(&mut self, name: &str) -> Result<String, JsValue> {
        self.session.on_institution_click(name);
        self.layout()
    }

    #[wasm_bindgen(js_name = onModuleFilterChange)]
    pub fn on_module_filter_change(&mut self, modules: Vec<String>) -> Result<String, JsValue> {
        self.session.on_module_filter_change(modules);
        self.layout()
    }

    #[wasm_bindgen(js_name = onModuleToggle)]
    pub fn on_module_toggle(&mut self, module: &str) -> Result<String, JsValue> {
        self.session.on_module_toggle(module);
        self.layout()
    }

    #[wasm_bindgen(js_name = onYearChange)]
    pub fn on_year_change(&mut self, year: i32) -> Result<String, JsValue> {
        self.session.on_year_change(year);
        self.layout()
    }

    #[wasm_bindgen(js_name = onAttributeToggle)]
    pub fn on_attribute_toggle(&mut self, attribute: &str, value: &str) -> Result<String, JsValue> {
        let highlight = parse_highlight(attribute, value).map_err(|e| JsValue::from_str(&e))?;
        self.session.on_attribute_toggle(highlight);
        self.layout()
    }

    #[wasm_bindgen(js_name = onReset)]
    pub fn on_reset(&mut self) -> Result<String, JsValue> {
        self.session.on_reset();
        self.layout()
    }

    #[wasm_bindgen(js_name = onViewportChange)]
    pub fn on_viewport_change(
        &mut self,
        center_lat: f64,
        center_lon: f64,
        zoom: f64,
        width: f64,
        height: f64,
    ) -> Result<String, JsValue> {
        let viewport = Viewport::new(GeoPoint::new(center_lat, center_lon), zoom, width, height);
        self.session.on_viewport_change(viewport);
        self.layout()
    }

    /// The viewport after a fit, so the widget can follow it.
    pub fn viewport(&self) -> Result<String, JsValue> {
        to_json(self.session.viewport()).map_err(|e| JsValue::from_str(&e))
    }

    #[wasm_bindgen(js_name = researcherDetails)]
    pub fn researcher_details(&self, id: &str) -> Result<String, JsValue> {
        to_json(&self.session.researcher_details(id)).map_err(|e| JsValue::from_str(&e))
    }

    #[wasm_bindgen(js_name = renderSvg)]
    pub fn render_svg(&self) -> String {
        self.session.render_svg()
    }
}
