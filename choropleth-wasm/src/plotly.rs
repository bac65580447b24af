use std::fmt;

use choropleth_core::{Dataset, RenderEngine, VisualizationConfig};
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = Plotly, js_name = newPlot)]
    fn new_plot(root: &HtmlElement, data: &JsValue, layout: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_namespace = Plotly)]
    fn react(root: &HtmlElement, data: &JsValue, layout: &JsValue) -> Result<JsValue, JsValue>;
}

/// Whatever Plotly threw, kept as the original JS value.
#[derive(Debug)]
pub struct PlotlyError(pub JsValue);

impl fmt::Display for PlotlyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(err) = self.0.dyn_ref::<js_sys::Error>() {
            write!(f, "{}", String::from(err.message()))
        } else if let Some(s) = self.0.as_string() {
            f.write_str(&s)
        } else {
            write!(f, "{:?}", self.0)
        }
    }
}

impl From<PlotlyError> for JsValue {
    fn from(e: PlotlyError) -> Self {
        e.0
    }
}

/// Plotly.js, loaded globally by the host page.
#[derive(Debug, Default)]
pub struct PlotlyEngine;

// Plotly takes plain JS objects; go through JSON so serde renames apply.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, PlotlyError> {
    let text = serde_json::to_string(value)
        .map_err(|e| PlotlyError(JsValue::from_str(&e.to_string())))?;
    js_sys::JSON::parse(&text).map_err(PlotlyError)
}

impl RenderEngine for PlotlyEngine {
    type Target = HtmlElement;
    type Error = PlotlyError;

    fn create(
        &mut self,
        target: &HtmlElement,
        data: &Dataset,
        layout: &VisualizationConfig,
    ) -> Result<(), PlotlyError> {
        new_plot(target, &to_js(data)?, &to_js(layout)?).map_err(PlotlyError)?;
        Ok(())
    }

    fn replace(
        &mut self,
        target: &HtmlElement,
        data: &Dataset,
        layout: &VisualizationConfig,
    ) -> Result<(), PlotlyError> {
        react(target, &to_js(data)?, &to_js(layout)?).map_err(PlotlyError)?;
        Ok(())
    }
}
