use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Event, HtmlSelectElement};

use crate::refresh_category;

/// Refresh the map whenever the `<select>` with `select_id` changes.
pub fn attach_category_select(document: &Document, select_id: &str) -> Result<(), JsValue> {
    let select: HtmlSelectElement = document
        .get_element_by_id(select_id)
        .ok_or_else(|| JsValue::from_str(&format!("select #{} not found", select_id)))?
        .dyn_into()?;
    let select_for_closure = select.clone();
    let onchange = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |_e: Event| {
        let category = select_for_closure.value();
        wasm_bindgen_futures::spawn_local(async move {
            refresh_category(category.into()).await;
        });
    }));
    select.add_event_listener_with_callback("change", onchange.as_ref().unchecked_ref())?;
    onchange.forget();
    log::debug!("category select #{} bound", select_id);
    Ok(())
}
