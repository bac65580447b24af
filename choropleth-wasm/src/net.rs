use choropleth_core::{FetchError, Transport};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Response, Window};

/// `Transport` over `window.fetch`. No timeout beyond the browser's own.
#[derive(Clone)]
pub struct BrowserTransport {
    window: Window,
}

impl BrowserTransport {
    pub fn new(window: Window) -> Self {
        BrowserTransport { window }
    }
}

fn network(url: &str, err: wasm_bindgen::JsValue) -> FetchError {
    FetchError::Network {
        url: url.to_string(),
        reason: err
            .as_string()
            .or_else(|| {
                err.dyn_ref::<js_sys::Error>()
                    .map(|e| String::from(e.message()))
            })
            .unwrap_or_else(|| format!("{:?}", err)),
    }
}

impl Transport for BrowserTransport {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        let resp_value = JsFuture::from(self.window.fetch_with_str(url))
            .await
            .map_err(|e| network(url, e))?;
        let resp: Response = resp_value.dyn_into().map_err(|e| network(url, e))?;
        if !resp.ok() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: resp.status(),
            });
        }
        let text_promise = resp.text().map_err(|e| network(url, e))?;
        let text = JsFuture::from(text_promise)
            .await
            .map_err(|e| network(url, e))?;
        Ok(text.as_string().unwrap_or_default())
    }
}
