//! Browser front end: binds a Plotly choropleth to the page and keeps it fed
//! from the statistics backend.
//!
//! The host page loads Plotly, then calls `start()` once. After that any
//! control may call `refresh(category)`, or let `bindCategorySelect` wire a
//! `<select>` to it.

use std::rc::Rc;

use choropleth_core::{AppConfig, CategoryIdentifier, ChoroplethApp, RefreshOutcome};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlElement, Window};

mod controls;
mod logging;
mod net;
mod plotly;
mod state;

pub use net::BrowserTransport;
pub use plotly::{PlotlyEngine, PlotlyError};

/// Config for this page: `window.__BASE_URL` prefixes the data path and
/// `?type=` picks the startup category.
fn page_config(window: &Window) -> AppConfig {
    let base = js_sys::Reflect::get(window, &JsValue::from_str("__BASE_URL"))
        .ok()
        .and_then(|v| v.as_string());
    let search = window.location().search().ok();
    AppConfig::from_page(base.as_deref(), search.as_deref())
}

/// Bind the map and request the startup category. Call once, after the map
/// element exists and Plotly is loaded.
#[wasm_bindgen]
pub fn start() -> Result<(), JsValue> {
    logging::init(log::LevelFilter::Info);
    if state::current().is_some() {
        return Err(JsValue::from_str("choropleth already started"));
    }
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let config = page_config(&window);
    let root = document
        .get_element_by_id(&config.element_id)
        .ok_or_else(|| JsValue::from_str(&format!("map element #{} not found", config.element_id)))?
        .dyn_into::<HtmlElement>()?;

    let app = ChoroplethApp::start(PlotlyEngine, root, BrowserTransport::new(window), config)?;
    let app = Rc::new(app);
    if !state::install(app.clone()) {
        return Err(JsValue::from_str("choropleth already started"));
    }
    // fire-and-forget; the placeholder stays up if this fails
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(err) = app.load_default().await {
            log::debug!("startup category not loaded: {}", err);
        }
    });
    Ok(())
}

pub(crate) async fn refresh_category(category: CategoryIdentifier) -> bool {
    let Some(app) = state::current() else {
        log::warn!("refresh('{}') ignored: map not started", category);
        return false;
    };
    matches!(app.refresh(&category).await, Ok(RefreshOutcome::Applied))
}

/// Load `category` into the map. Resolves `true` once the new data is drawn,
/// `false` if the request failed, was overtaken by a newer one, or the map
/// is not started. Never rejects.
#[wasm_bindgen]
pub async fn refresh(category: String) -> Result<bool, JsValue> {
    Ok(refresh_category(category.into()).await)
}

/// Wire the `<select id=select_id>` so each change refreshes the map.
#[wasm_bindgen(js_name = bindCategorySelect)]
pub fn bind_category_select(select_id: &str) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or("no document")?;
    controls::attach_category_select(&document, select_id)
}

/// JSON of the dataset currently on the map. `undefined` before `start` and
/// while Plotly is mid-redraw (e.g. from a `plotly_afterplot` listener).
#[wasm_bindgen(js_name = displayedDataset)]
pub fn displayed_dataset() -> Option<String> {
    let dataset = state::current()?.displayed_dataset()?;
    serde_json::to_string(&dataset).ok()
}
